//! Transport primitives for the token-authorization exchange.
//!
//! The module exposes [`AuthorityHttpClient`] as the crate's only dependency
//! on an HTTP stack. The default [`ReqwestHttpClient`] lives behind the
//! `reqwest` feature; custom transports implement the trait and hand the
//! client a raw [`HttpReply`] so error mapping stays in one place.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`AuthorityHttpClient::post_json`].
pub type HttpFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Raw HTTP reply surfaced to the authorization layer.
///
/// The transport resolves every completed exchange, including non-2xx
/// statuses; only network/IO failures surface as [`TransportError`]. The
/// authorization layer owns the interpretation of the payload.
#[derive(Clone, Debug)]
pub struct HttpReply {
	/// HTTP status code returned by the endpoint.
	pub status: u16,
	/// Raw response body bytes.
	pub body: Vec<u8>,
}

/// Abstraction over HTTP transports capable of executing the authorize POST.
///
/// Implementations must be `Send + Sync + 'static` so they can be shared
/// across client instances behind `Arc<C>`, and the futures they return must
/// be `Send` so proof flows can hop executors.
pub trait AuthorityHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Issues a single POST with the provided headers and JSON body.
	///
	/// No retry logic belongs here; a failed authorization propagates
	/// immediately to the caller.
	fn post_json<'a>(
		&'a self,
		url: &'a Url,
		headers: &'a BTreeMap<String, String>,
		body: &'a str,
	) -> HttpFuture<'a, HttpReply>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one
/// place. The authorize exchange is a single request/response round trip;
/// cancellation is whatever the underlying transport exposes.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl AuthorityHttpClient for ReqwestHttpClient {
	fn post_json<'a>(
		&'a self,
		url: &'a Url,
		headers: &'a BTreeMap<String, String>,
		body: &'a str,
	) -> HttpFuture<'a, HttpReply> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut request = client.post(url.clone());

			for (name, value) in headers {
				request = request.header(name.as_str(), value.as_str());
			}

			let response = request.body(body.to_owned()).send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(HttpReply { status, body })
		})
	}
}

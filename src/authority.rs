//! Token-authorization exchange against the payout authorize endpoint.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, SecretString},
	contract::ApiContract,
	error::AuthorizationError,
	http::AuthorityHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Shape of the authorize endpoint response.
#[derive(Debug, Deserialize)]
struct AuthorizeResponse {
	status: Option<String>,
	message: Option<String>,
	data: Option<AuthorizeData>,
}
#[derive(Debug, Deserialize)]
struct AuthorizeData {
	token: Option<String>,
}

const STATUS_SUCCESS: &str = "SUCCESS";

/// Exchanges long-lived credentials for a short-lived bearer token.
///
/// The exchange is a single authenticated POST; retries are a concern of the
/// caller, and the call is side-effecting so it must only run when a token is
/// genuinely needed (the cache decides that).
pub struct TokenAuthority<C>
where
	C: ?Sized + AuthorityHttpClient,
{
	http_client: Arc<C>,
}
impl<C> TokenAuthority<C>
where
	C: ?Sized + AuthorityHttpClient,
{
	/// Creates an authority that reuses the caller-provided transport.
	pub fn new(http_client: impl Into<Arc<C>>) -> Self {
		Self { http_client: http_client.into() }
	}

	/// Issues the authorize POST and returns the bearer token.
	///
	/// Success requires `status == "SUCCESS"` and a token in the body; any
	/// other shape fails with [`AuthorizationError`] carrying the
	/// server-reported message when present.
	pub async fn authorize(
		&self,
		contract: &ApiContract,
		credentials: &Credentials,
		signature: Option<&str>,
	) -> Result<SecretString> {
		const KIND: FlowKind = FlowKind::Authorize;

		let span = FlowSpan::new(KIND, "authorize");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut headers = BTreeMap::new();

				headers
					.insert(contract.client_id_header.clone(), credentials.client_id().to_owned());
				headers.insert(
					contract.client_secret_header.clone(),
					credentials.client_secret().expose().to_owned(),
				);
				headers.insert("Content-Type".into(), "application/json".into());

				if let Some(signature) = signature {
					headers.insert(contract.signature_header.clone(), signature.to_owned());
				}

				let reply = self
					.http_client
					.post_json(&contract.authorize_endpoint, &headers, "")
					.await
					.map_err(Error::from)?;
				let mut deserializer = serde_json::Deserializer::from_slice(&reply.body);
				let parsed: AuthorizeResponse = serde_path_to_error::deserialize(&mut deserializer)
					.map_err(|source| AuthorizationError::MalformedResponse {
						source,
						status: Some(reply.status),
					})?;

				if parsed.status.as_deref() != Some(STATUS_SUCCESS) {
					return Err(AuthorizationError::Rejected {
						message: parsed
							.message
							.unwrap_or_else(|| "no server message".into()),
						status: Some(reply.status),
					}
					.into());
				}

				match parsed.data.and_then(|data| data.token) {
					Some(token) => Ok(SecretString::new(token)),
					None => Err(AuthorizationError::MissingToken.into()),
				}
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
impl<C> Clone for TokenAuthority<C>
where
	C: ?Sized + AuthorityHttpClient,
{
	fn clone(&self) -> Self {
		Self { http_client: self.http_client.clone() }
	}
}
impl<C> Debug for TokenAuthority<C>
where
	C: ?Sized + AuthorityHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenAuthority").finish_non_exhaustive()
	}
}

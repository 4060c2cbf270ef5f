//! Zero-knowledge payout attestation client: prove that a payout API returned a given
//! transfer status or created a given transfer, without revealing the credentials
//! that authenticated the request.
//!
//! The crate owns the credential lifecycle (bearer-token exchange and cache,
//! time-bound RSA-OAEP signature) and the partitioning of every outbound request
//! into a proof-visible [`descriptor::PublicDescriptor`] and a proof-hidden
//! [`descriptor::SecretDescriptor`]. The zkTLS attestation engine itself is an
//! external collaborator behind [`engine::ProofEngine`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod authority;
pub mod cache;
pub mod client;
pub mod clock;
pub mod contract;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod http;
pub mod obs;
pub mod rules;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and test doubles for integration tests; enabled via
	//! `cfg(test)` or the `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::PayoutProofClient,
		contract::ApiContract,
		engine::{EngineFuture, Proof, ProofEngine, ProofRequest, WitnessEndpoint},
		http::ReqwestHttpClient,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = PayoutProofClient<ReqwestHttpClient>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Generates a throwaway RSA private key PEM for signature tests.
	pub fn test_signature_key_pem() -> String {
		// crates.io
		use rsa::pkcs8::EncodePrivateKey;

		let mut rng = rand::rngs::OsRng;

		rsa::RsaPrivateKey::new(&mut rng, 2048)
			.expect("Test key generation should succeed.")
			.to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
			.expect("Test key should encode to PEM.")
			.to_string()
	}

	/// Builds a contract profile pointed at mock endpoints.
	pub fn test_contract(authorize: &str, api_base: &str) -> ApiContract {
		ApiContract::builder()
			.authorize_endpoint(
				Url::parse(authorize).expect("Mock authorize endpoint should parse successfully."),
			)
			.api_base(Url::parse(api_base).expect("Mock API base should parse successfully."))
			.build()
			.expect("Mock contract should build successfully.")
	}

	/// Proof engine test double that simulates the remote response.
	///
	/// When configured with a response body, the double evaluates the secret
	/// descriptor's match rules against it, returning `None` whenever an
	/// assertion fails (exactly like the real engine), and otherwise produces
	/// a proof whose extracted values come from the redaction rules. Without
	/// a body every call resolves `None`.
	#[derive(Default)]
	pub struct FixtureProofEngine {
		body: Option<String>,
		requests: Mutex<Vec<ProofRequest>>,
	}
	impl FixtureProofEngine {
		/// Creates an engine that never produces a proof.
		pub fn unavailable() -> Self {
			Self::default()
		}

		/// Creates an engine simulating a remote that answers with `body`.
		pub fn with_response_body(body: impl Into<String>) -> Self {
			Self { body: Some(body.into()), requests: Mutex::new(Vec::new()) }
		}

		/// Snapshot of every request the engine received.
		pub fn requests(&self) -> Vec<ProofRequest> {
			self.requests.lock().clone()
		}
	}
	impl ProofEngine for FixtureProofEngine {
		fn generate_proof<'a>(
			&'a self,
			request: &'a ProofRequest,
		) -> EngineFuture<'a, Option<Proof>> {
			Box::pin(async move {
				self.requests.lock().push(request.clone());

				let Some(body) = self.body.as_deref() else {
					return Ok(None);
				};

				for rule in &request.secret.response_matches {
					if !rule.holds_for(body)? {
						return Ok(None);
					}
				}

				let mut extracted_values = HashMap::new();

				for rule in &request.secret.response_redactions {
					if let Some(value) = rule.locator.resolve(body)? {
						extracted_values.insert(rule.field.clone(), value);
					}
				}

				Ok(Some(Proof {
					identifier: "0xfixture-claim".into(),
					signatures: vec!["0xfixture-signature".into()],
					witnesses: vec![WitnessEndpoint {
						id: "fixture-witness".into(),
						url: "wss://witness.test".into(),
					}],
					extracted_values,
				}))
			})
		}
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use httpmock as _;
#[cfg(test)] use payout_prover as _;

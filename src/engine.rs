//! Boundary to the external zkTLS attestation engine.
//!
//! The engine performs the TLS interception, constructs the ZK proof, and
//! returns a signed claim; this crate only assembles its inputs and consumes
//! its outputs. Engines resolve `Ok(None)` when no proof could be produced
//! (a response-match assertion failed, or the requested retries were
//! exhausted) and reserve `Err` for internal failures.

// self
use crate::{
	_prelude::*,
	descriptor::{PublicDescriptor, SecretDescriptor},
};

/// Boxed future returned by [`ProofEngine::generate_proof`].
pub type EngineFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Fully assembled input for one proof generation call.
#[derive(Clone, Debug)]
pub struct ProofRequest {
	/// Target URL of the attested request.
	pub url: Url,
	/// Proof-visible request half.
	pub public: PublicDescriptor,
	/// Proof-hidden request half.
	pub secret: SecretDescriptor,
	/// Caller-requested retry count, delegated to the engine.
	pub retries: Option<u32>,
	/// Caller-requested retry interval, delegated to the engine.
	pub retry_interval: Option<Duration>,
}

/// External attestation engine contract.
///
/// Transport-level retry/backoff lives inside the engine; this crate never
/// retries around it beyond forwarding the caller's explicit request.
pub trait ProofEngine
where
	Self: Send + Sync,
{
	/// Generates a proof for the assembled request, or resolves `None` when
	/// the engine could not produce one.
	fn generate_proof<'a>(&'a self, request: &'a ProofRequest) -> EngineFuture<'a, Option<Proof>>;
}

/// Witness that attested the TLS session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessEndpoint {
	/// Witness identifier.
	pub id: String,
	/// Witness endpoint address.
	pub url: String,
}

/// Signed claim returned by the attestation engine.
///
/// Treated as read-only once received; the visible parameters derive from
/// the public descriptor only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
	/// Claim identifier assigned by the engine.
	pub identifier: String,
	/// Attestor signatures over the claim.
	pub signatures: Vec<String>,
	/// Witnesses that participated in the session.
	pub witnesses: Vec<WitnessEndpoint>,
	/// Extracted field name to string value mapping.
	pub extracted_values: HashMap<String, String>,
}
impl Proof {
	/// Returns one extracted value by field name.
	pub fn extracted(&self, field: &str) -> Option<&str> {
		self.extracted_values.get(field).map(String::as_str)
	}
}

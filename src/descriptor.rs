//! Public and secret request descriptors consumed by the proof engine.
//!
//! Every attested request is partitioned into a [`PublicDescriptor`]
//! (disclosed inside the generated proof) and a [`SecretDescriptor`]
//! (enforced by the engine but never surfaced in the proof's visible
//! parameters). The two are distinct, non-interchangeable types and the
//! builder is the only construction path for the public half, so secret
//! material cannot end up proof-visible by accident: the public half only
//! ever receives the content-type and api-version headers plus the caller's
//! context.

// self
use crate::{
	_prelude::*,
	contract::ApiContract,
	rules::{ExtractionRule, MatchRule},
};

/// HTTP method of the attested request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestMethod {
	/// Read-only status check.
	Get,
	/// Side-effecting creation call.
	Post,
}
impl RequestMethod {
	/// Returns the wire-format method name.
	pub const fn as_str(self) -> &'static str {
		match self {
			RequestMethod::Get => "GET",
			RequestMethod::Post => "POST",
		}
	}
}
impl Display for RequestMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Proof-visible half of an attested request.
///
/// Fully contained within (and derivable from) the generated proof; holding
/// secret material here is an invariant violation, not a style issue.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PublicDescriptor {
	/// HTTP method of the request.
	pub method: RequestMethod,
	/// Non-secret headers (content type + API version tag).
	pub headers: BTreeMap<String, String>,
	/// JSON body for creation requests.
	pub body: Option<serde_json::Value>,
	/// Caller-supplied context string embedded in the proof.
	pub context: Option<String>,
}

/// Proof-hidden half of an attested request.
///
/// Consumed by the proof engine to authenticate the request and to
/// assert/extract response fields; never surfaced in the returned proof.
#[derive(Clone, Serialize, Deserialize)]
pub struct SecretDescriptor {
	/// Authentication headers (bearer token, client pair, signature).
	pub headers: BTreeMap<String, String>,
	/// Response assertions the engine must enforce before proving.
	pub response_matches: Vec<MatchRule>,
	/// Response fields the engine extracts and keeps provable.
	pub response_redactions: Vec<ExtractionRule>,
}
impl Debug for SecretDescriptor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SecretDescriptor")
			.field("headers", &RedactedHeaders(&self.headers))
			.field("response_matches", &self.response_matches)
			.field("response_redactions", &self.response_redactions)
			.finish()
	}
}

struct RedactedHeaders<'a>(&'a BTreeMap<String, String>);
impl Debug for RedactedHeaders<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_map().entries(self.0.keys().map(|key| (key, "<redacted>"))).finish()
	}
}

/// Pure assembler for the two descriptor halves.
///
/// The builder never inspects or mutates credentials; it is handed
/// already-resolved header maps by the client.
#[derive(Clone, Debug)]
pub struct RequestDescriptorBuilder {
	api_version_header: String,
	api_version: String,
}
impl RequestDescriptorBuilder {
	/// Creates a builder bound to the contract's header names and the
	/// credential's API version tag.
	pub fn new(contract: &ApiContract, api_version: impl Into<String>) -> Self {
		Self {
			api_version_header: contract.api_version_header.clone(),
			api_version: api_version.into(),
		}
	}

	/// Assembles the proof-visible descriptor.
	///
	/// Deterministic; only the content-type and API-version headers are
	/// included alongside whatever context the caller supplied.
	pub fn public(
		&self,
		method: RequestMethod,
		body: Option<serde_json::Value>,
		context: Option<String>,
	) -> PublicDescriptor {
		let mut headers = BTreeMap::new();

		headers.insert("Content-Type".into(), "application/json".into());
		headers.insert(self.api_version_header.clone(), self.api_version.clone());

		PublicDescriptor { method, headers, body, context }
	}

	/// Assembles the proof-hidden descriptor from resolved parts.
	pub fn secret(
		&self,
		headers: BTreeMap<String, String>,
		response_matches: Vec<MatchRule>,
		response_redactions: Vec<ExtractionRule>,
	) -> SecretDescriptor {
		SecretDescriptor { headers, response_matches, response_redactions }
	}
}

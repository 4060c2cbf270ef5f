//! Crate-level error types shared across authorization, descriptors, and proof flows.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Error messages never embed bearer tokens, client secrets, or signature
/// values; only server-reported text and non-secret context flow through.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Bad key material or a failed encryption while computing a signature.
	#[error(transparent)]
	Crypto(#[from] CryptoError),
	/// The authorize endpoint rejected or mangled the token exchange.
	#[error(transparent)]
	Authorization(#[from] AuthorizationError),
	/// The proof engine produced no usable proof.
	#[error(transparent)]
	ProofGeneration(#[from] ProofGenerationError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Failures raised while deriving the time-bound request signature.
///
/// Crypto failures are fatal for the call and are never retried; stale or
/// malformed key material will not heal on its own.
#[derive(Debug, ThisError)]
pub enum CryptoError {
	/// Key material could not be parsed as an RSA key.
	#[error("Signature key material could not be parsed.")]
	InvalidKey {
		/// Underlying PEM/DER parsing failure.
		#[source]
		source: BoxError,
	},
	/// OAEP encryption of the signature plaintext failed.
	#[error("Signature plaintext could not be encrypted.")]
	Encrypt {
		/// Underlying RSA failure.
		#[source]
		source: rsa::Error,
	},
}
impl CryptoError {
	/// Wraps a key-parsing failure inside [`CryptoError`].
	pub fn invalid_key(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::InvalidKey { source: Box::new(src) }
	}
}

/// Failures raised by the token-authorization exchange.
#[derive(Debug, ThisError)]
pub enum AuthorizationError {
	/// The endpoint answered with a non-success status payload.
	#[error("Authorize endpoint rejected the request: {message}.")]
	Rejected {
		/// Server-reported message, or a stable placeholder when absent.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The endpoint responded with JSON that could not be parsed.
	#[error("Authorize endpoint returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The success payload omitted the token field.
	#[error("Authorize endpoint reported success without a token.")]
	MissingToken,
}

/// Failures raised around the external proof engine boundary.
#[derive(Debug, ThisError)]
pub enum ProofGenerationError {
	/// The engine returned no proof, e.g. a response-match assertion failed
	/// upstream or the requested retries were exhausted.
	#[error("Proof engine returned no proof for the {operation} operation.")]
	NoProof {
		/// Operation label (`transfer_status` or `transfer_creation`).
		operation: &'static str,
	},
	/// The engine reported an internal failure.
	#[error("Proof engine failed: {message}.")]
	Engine {
		/// Engine-supplied message summarizing the failure.
		message: String,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Contract contains an URL that cannot be parsed.
	#[error("Contract contains an invalid URL.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Contract builder was not given a mandatory endpoint.
	#[error("Contract is missing the {endpoint} endpoint.")]
	MissingEndpoint {
		/// Which endpoint was absent.
		endpoint: &'static str,
	},
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The contract mandates a signature header but no key was configured.
	#[error("Contract requires a request signature but no private key material is configured.")]
	MissingKeyMaterial,
	/// A fallback extraction pattern failed to compile.
	#[error("Extraction pattern is not a valid regular expression.")]
	InvalidPattern {
		/// Underlying regex compilation failure.
		#[source]
		source: Box<regex::Error>,
	},
	/// A safety window must be shorter than the token lifetime it guards.
	#[error("Token safety window must be positive and below the token lifetime.")]
	InvalidSafetyWindow,
	/// Credential builder validation failed.
	#[error("Unable to build credentials.")]
	InvalidCredentials(#[from] crate::auth::CredentialsError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<crate::auth::CredentialsError> for Error {
	fn from(e: crate::auth::CredentialsError) -> Self {
		Self::Config(e.into())
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the authorize endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the authorize endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

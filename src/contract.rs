//! Versioned payout API contract consumed by the proof flows.
//!
//! The remote API has shipped more than one endpoint/header shape for the
//! same conceptual operations, so the contract (paths, header names,
//! api-version tag, response field locations, token lifetimes) is data with
//! a validated builder rather than constants baked into flow logic. The
//! default profile matches the current revision; callers on another revision
//! override fields without touching code.

// self
use crate::{_prelude::*, error::ConfigError};

/// Target payout environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
	/// Live environment; transfers move real money.
	Production,
	/// Sandbox environment for integration testing.
	Sandbox,
}
impl Environment {
	/// Domain hosting the authorize endpoint.
	pub const fn auth_domain(self) -> &'static str {
		match self {
			Environment::Production => "https://api.cashfree.com",
			Environment::Sandbox => "https://sandbox.cashfree.com",
		}
	}

	/// Domain hosting the data (transfer) endpoints.
	pub const fn api_domain(self) -> &'static str {
		match self {
			Environment::Production => "https://api.cashfree.com",
			Environment::Sandbox => "https://sandbox.cashfree.com",
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Environment::Production => "production",
			Environment::Sandbox => "sandbox",
		}
	}
}
impl Display for Environment {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Response field locations for the transfer endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFields {
	/// Field holding the caller-assigned transfer identifier.
	pub transfer_id: String,
	/// Field holding the provider-side transfer identifier.
	pub provider_transfer_id: String,
	/// Field holding the transfer status.
	pub status: String,
	/// Field holding the transfer amount (status checks only).
	pub transfer_amount: String,
}
impl Default for ResponseFields {
	fn default() -> Self {
		Self {
			transfer_id: "transfer_id".into(),
			provider_transfer_id: "cf_transfer_id".into(),
			status: "status".into(),
			transfer_amount: "transfer_amount".into(),
		}
	}
}

/// Immutable contract describing one revision of the payout API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiContract {
	/// Full URL of the authorize endpoint.
	pub authorize_endpoint: Url,
	/// Base URL for the data endpoints.
	pub api_base: Url,
	/// Path of the transfer collection under [`Self::api_base`].
	pub transfers_path: String,
	/// Query parameter naming the transfer on status checks.
	pub transfer_id_param: String,
	/// Header carrying the API version tag on data requests.
	pub api_version_header: String,
	/// Header carrying the client identifier.
	pub client_id_header: String,
	/// Header carrying the client secret.
	pub client_secret_header: String,
	/// Header carrying the time-bound request signature.
	pub signature_header: String,
	/// Whether the API mandates the signature header on every request.
	pub signature_required: bool,
	/// Local cache lifetime granted to freshly issued tokens; strictly below
	/// the server-side token lifetime.
	pub token_safety_window: Duration,
	/// Conservative remaining lifetime assumed for pre-obtained tokens whose
	/// issuance instant is unknown.
	pub preset_token_lifetime: Duration,
	/// Response field locations for the transfer endpoints.
	pub response_fields: ResponseFields,
}
impl ApiContract {
	/// Authorize path of the default profile.
	pub const DEFAULT_AUTHORIZE_PATH: &'static str = "/payout/v1/authorize";
	/// Transfer collection path of the default profile.
	pub const DEFAULT_TRANSFERS_PATH: &'static str = "/payout/transfers";

	/// Returns the default contract profile for an environment.
	pub fn for_environment(environment: Environment) -> Result<Self, ConfigError> {
		let authorize = format!("{}{}", environment.auth_domain(), Self::DEFAULT_AUTHORIZE_PATH);

		Self::builder()
			.authorize_endpoint(parse_url(&authorize)?)
			.api_base(parse_url(environment.api_domain())?)
			.build()
	}

	/// Returns a builder seeded with the default profile fields.
	pub fn builder() -> ApiContractBuilder {
		ApiContractBuilder::new()
	}

	/// Resolves the transfer-collection URL used by creation requests.
	pub fn transfers_url(&self) -> Result<Url, ConfigError> {
		self.api_base
			.join(self.transfers_path.trim_start_matches('/'))
			.map_err(|source| ConfigError::InvalidEndpoint { source })
	}

	/// Resolves the status-check URL for one transfer.
	pub fn status_url(&self, transfer_id: &str) -> Result<Url, ConfigError> {
		let mut url = self.transfers_url()?;

		url.query_pairs_mut().append_pair(&self.transfer_id_param, transfer_id);

		Ok(url)
	}
}

/// Builder for [`ApiContract`] values.
#[derive(Clone, Debug)]
pub struct ApiContractBuilder {
	authorize_endpoint: Option<Url>,
	api_base: Option<Url>,
	transfers_path: String,
	transfer_id_param: String,
	api_version_header: String,
	client_id_header: String,
	client_secret_header: String,
	signature_header: String,
	signature_required: bool,
	token_safety_window: Duration,
	preset_token_lifetime: Duration,
	response_fields: ResponseFields,
}
impl ApiContractBuilder {
	// Issued tokens live ~600 seconds server side; cache for less so a
	// racing local clock never presents an expired token.
	const DEFAULT_SAFETY_WINDOW: Duration = Duration::seconds(540);
	// Pre-obtained tokens have an unknown issuance instant.
	const DEFAULT_PRESET_LIFETIME: Duration = Duration::seconds(300);

	fn new() -> Self {
		Self {
			authorize_endpoint: None,
			api_base: None,
			transfers_path: ApiContract::DEFAULT_TRANSFERS_PATH.into(),
			transfer_id_param: "transfer_id".into(),
			api_version_header: "x-api-version".into(),
			client_id_header: "x-client-id".into(),
			client_secret_header: "x-client-secret".into(),
			signature_header: "X-Cf-Signature".into(),
			signature_required: false,
			token_safety_window: Self::DEFAULT_SAFETY_WINDOW,
			preset_token_lifetime: Self::DEFAULT_PRESET_LIFETIME,
			response_fields: ResponseFields::default(),
		}
	}

	/// Sets the authorize endpoint URL.
	pub fn authorize_endpoint(mut self, url: Url) -> Self {
		self.authorize_endpoint = Some(url);

		self
	}

	/// Sets the data endpoint base URL.
	pub fn api_base(mut self, url: Url) -> Self {
		self.api_base = Some(url);

		self
	}

	/// Overrides the transfer collection path.
	pub fn transfers_path(mut self, path: impl Into<String>) -> Self {
		self.transfers_path = path.into();

		self
	}

	/// Overrides the status-check query parameter name.
	pub fn transfer_id_param(mut self, param: impl Into<String>) -> Self {
		self.transfer_id_param = param.into();

		self
	}

	/// Overrides the API version header name.
	pub fn api_version_header(mut self, header: impl Into<String>) -> Self {
		self.api_version_header = header.into();

		self
	}

	/// Overrides the client identifier header name.
	pub fn client_id_header(mut self, header: impl Into<String>) -> Self {
		self.client_id_header = header.into();

		self
	}

	/// Overrides the client secret header name.
	pub fn client_secret_header(mut self, header: impl Into<String>) -> Self {
		self.client_secret_header = header.into();

		self
	}

	/// Overrides the signature header name.
	pub fn signature_header(mut self, header: impl Into<String>) -> Self {
		self.signature_header = header.into();

		self
	}

	/// Marks the signature header as mandatory for this revision.
	pub fn require_signature(mut self, required: bool) -> Self {
		self.signature_required = required;

		self
	}

	/// Overrides the token safety window.
	pub fn token_safety_window(mut self, window: Duration) -> Self {
		self.token_safety_window = window;

		self
	}

	/// Overrides the assumed remaining lifetime for pre-obtained tokens.
	pub fn preset_token_lifetime(mut self, lifetime: Duration) -> Self {
		self.preset_token_lifetime = lifetime;

		self
	}

	/// Overrides the response field locations.
	pub fn response_fields(mut self, fields: ResponseFields) -> Self {
		self.response_fields = fields;

		self
	}

	/// Consumes the builder and validates the resulting contract.
	pub fn build(self) -> Result<ApiContract, ConfigError> {
		let authorize_endpoint = self
			.authorize_endpoint
			.ok_or(ConfigError::MissingEndpoint { endpoint: "authorize" })?;
		let api_base = self.api_base.ok_or(ConfigError::MissingEndpoint { endpoint: "api" })?;

		validate_endpoint("authorize", &authorize_endpoint)?;
		validate_endpoint("api", &api_base)?;

		if !self.token_safety_window.is_positive()
			|| !self.preset_token_lifetime.is_positive()
			|| self.preset_token_lifetime > self.token_safety_window
		{
			return Err(ConfigError::InvalidSafetyWindow);
		}

		Ok(ApiContract {
			authorize_endpoint,
			api_base,
			transfers_path: self.transfers_path,
			transfer_id_param: self.transfer_id_param,
			api_version_header: self.api_version_header,
			client_id_header: self.client_id_header,
			client_secret_header: self.client_secret_header,
			signature_header: self.signature_header,
			signature_required: self.signature_required,
			token_safety_window: self.token_safety_window,
			preset_token_lifetime: self.preset_token_lifetime,
			response_fields: self.response_fields,
		})
	}
}

fn parse_url(value: &str) -> Result<Url, ConfigError> {
	Url::parse(value).map_err(|source| ConfigError::InvalidEndpoint { source })
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	if url.scheme() != "https" {
		Err(ConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn environments_resolve_distinct_domains() {
		assert_eq!(Environment::Production.api_domain(), "https://api.cashfree.com");
		assert_eq!(Environment::Sandbox.api_domain(), "https://sandbox.cashfree.com");
		assert_ne!(Environment::Production.api_domain(), Environment::Sandbox.api_domain());
		assert_ne!(Environment::Production.auth_domain(), Environment::Sandbox.auth_domain());
	}

	#[test]
	fn default_profile_matches_current_revision() {
		let contract = ApiContract::for_environment(Environment::Sandbox)
			.expect("Default sandbox contract should build.");

		assert_eq!(
			contract.authorize_endpoint.as_str(),
			"https://sandbox.cashfree.com/payout/v1/authorize",
		);
		assert_eq!(
			contract.transfers_url().expect("Transfers URL should resolve.").as_str(),
			"https://sandbox.cashfree.com/payout/transfers",
		);
		assert_eq!(
			contract.status_url("txn_123").expect("Status URL should resolve.").as_str(),
			"https://sandbox.cashfree.com/payout/transfers?transfer_id=txn_123",
		);
		assert_eq!(contract.api_version_header, "x-api-version");
		assert_eq!(contract.signature_header, "X-Cf-Signature");
		assert!(!contract.signature_required);
	}

	#[test]
	fn builder_rejects_insecure_endpoints() {
		let err = ApiContract::builder()
			.authorize_endpoint(Url::parse("http://example.com/authorize").expect("URL fixture."))
			.api_base(Url::parse("https://example.com").expect("URL fixture."))
			.build()
			.expect_err("Insecure authorize endpoint should be rejected.");

		assert!(matches!(err, ConfigError::InsecureEndpoint { endpoint: "authorize", .. }));
	}

	#[test]
	fn builder_rejects_inverted_safety_windows() {
		let err = ApiContract::builder()
			.authorize_endpoint(Url::parse("https://example.com/authorize").expect("URL fixture."))
			.api_base(Url::parse("https://example.com").expect("URL fixture."))
			.token_safety_window(Duration::seconds(60))
			.preset_token_lifetime(Duration::seconds(120))
			.build()
			.expect_err("Preset lifetime above the safety window should be rejected.");

		assert!(matches!(err, ConfigError::InvalidSafetyWindow));
	}

	#[test]
	fn older_revision_remains_expressible() {
		let contract = ApiContract::builder()
			.authorize_endpoint(
				Url::parse("https://payout-api.cashfree.com/payout/v1/authorize")
					.expect("URL fixture."),
			)
			.api_base(Url::parse("https://payout-api.cashfree.com").expect("URL fixture."))
			.transfers_path("/payout/v1.2/requestTransfer")
			.signature_header("X-Cf-Signature")
			.require_signature(true)
			.build()
			.expect("Older revision profile should build.");

		assert!(contract.signature_required);
		assert_eq!(
			contract.transfers_url().expect("Transfers URL should resolve.").as_str(),
			"https://payout-api.cashfree.com/payout/v1.2/requestTransfer",
		);
	}
}

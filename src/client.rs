//! High-level payout proof flows.
//!
//! Each call walks the same states: acquire a fresh token, build the
//! public/secret descriptor pair, hand both to the attestation engine, and
//! map the proof's extracted values into a typed result. Multiple calls may
//! run concurrently against one client; they share the token cache, whose
//! single-flight guard keeps concurrent refreshes to one authorization.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, SecretString, SignatureGenerator},
	authority::TokenAuthority,
	cache::TokenCache,
	clock::{Clock, SystemClock},
	contract::ApiContract,
	descriptor::{RequestDescriptorBuilder, RequestMethod},
	engine::{Proof, ProofEngine, ProofRequest},
	error::{ConfigError, ProofGenerationError},
	http::AuthorityHttpClient,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	rules::{ExtractionRule, ExtractionRuleSet, MatchRule, RuleMechanism},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type ReqwestPayoutProofClient = PayoutProofClient<ReqwestHttpClient>;

/// Parameters for one transfer-status proof.
#[derive(Clone, Debug)]
pub struct TransferStatusRequest {
	/// Caller-assigned transfer identifier to check.
	pub transfer_id: String,
	/// Status the response must carry for the proof to succeed.
	pub expected_status: Option<String>,
	/// Extra extraction rules appended after the defaults.
	pub extra_redactions: Vec<ExtractionRule>,
	/// Extra response assertions appended after the defaults.
	pub extra_match_rules: Vec<MatchRule>,
	/// Context string embedded in the proof.
	pub context: Option<String>,
	/// Retry count delegated to the proof engine.
	pub retries: Option<u32>,
	/// Retry interval delegated to the proof engine.
	pub retry_interval: Option<Duration>,
}
impl TransferStatusRequest {
	/// Creates a request for the provided transfer identifier.
	pub fn new(transfer_id: impl Into<String>) -> Self {
		Self {
			transfer_id: transfer_id.into(),
			expected_status: None,
			extra_redactions: Vec::new(),
			extra_match_rules: Vec::new(),
			context: None,
			retries: None,
			retry_interval: None,
		}
	}

	/// Requires the remote status to equal the provided value.
	pub fn with_expected_status(mut self, status: impl Into<String>) -> Self {
		self.expected_status = Some(status.into());

		self
	}

	/// Appends extraction rules after the defaults.
	pub fn with_extra_redactions(
		mut self,
		rules: impl IntoIterator<Item = ExtractionRule>,
	) -> Self {
		self.extra_redactions.extend(rules);

		self
	}

	/// Appends response assertions after the defaults.
	pub fn with_extra_match_rules(mut self, rules: impl IntoIterator<Item = MatchRule>) -> Self {
		self.extra_match_rules.extend(rules);

		self
	}

	/// Embeds a context string in the proof.
	pub fn with_context(mut self, context: impl Into<String>) -> Self {
		self.context = Some(context.into());

		self
	}

	/// Delegates a retry count to the proof engine.
	pub fn with_retries(mut self, retries: u32) -> Self {
		self.retries = Some(retries);

		self
	}

	/// Delegates a retry interval to the proof engine.
	pub fn with_retry_interval(mut self, interval: Duration) -> Self {
		self.retry_interval = Some(interval);

		self
	}
}

/// Parameters for one transfer-creation proof.
///
/// Creation executes a real money transfer remotely; the call is not
/// idempotent, so no retry or dedup happens beyond what the caller
/// explicitly requests here.
#[derive(Clone, Debug)]
pub struct TransferCreationRequest {
	/// JSON transfer request forwarded as the POST body.
	pub body: serde_json::Value,
	/// Context string embedded in the proof.
	pub context: Option<String>,
	/// Retry count delegated to the proof engine.
	pub retries: Option<u32>,
	/// Retry interval delegated to the proof engine.
	pub retry_interval: Option<Duration>,
}
impl TransferCreationRequest {
	/// Creates a request for the provided transfer body.
	pub fn new(body: serde_json::Value) -> Self {
		Self { body, context: None, retries: None, retry_interval: None }
	}

	/// Embeds a context string in the proof.
	pub fn with_context(mut self, context: impl Into<String>) -> Self {
		self.context = Some(context.into());

		self
	}

	/// Delegates a retry count to the proof engine.
	pub fn with_retries(mut self, retries: u32) -> Self {
		self.retries = Some(retries);

		self
	}

	/// Delegates a retry interval to the proof engine.
	pub fn with_retry_interval(mut self, interval: Duration) -> Self {
		self.retry_interval = Some(interval);

		self
	}
}

/// Typed projection of a transfer-status proof.
#[derive(Clone, Debug)]
pub struct TransferStatusResult {
	/// Transfer identifier, extracted or falling back to the request's.
	pub transfer_id: String,
	/// Provider-side transfer identifier, when extracted.
	pub provider_transfer_id: Option<String>,
	/// Remote transfer status, when extracted.
	pub status: Option<String>,
	/// Transfer amount, when extracted.
	pub transfer_amount: Option<String>,
	/// Underlying signed claim.
	pub proof: Proof,
}

/// Typed projection of a transfer-creation proof.
#[derive(Clone, Debug)]
pub struct TransferCreationResult {
	/// Transfer identifier, extracted or falling back to the request body's.
	pub transfer_id: Option<String>,
	/// Provider-side transfer identifier, when extracted.
	pub provider_transfer_id: Option<String>,
	/// Remote transfer status, when extracted.
	pub status: Option<String>,
	/// Underlying signed claim.
	pub proof: Proof,
}

/// Orchestrates payout proof generation against one API contract.
///
/// The client owns the credentials, the token cache, the authority transport,
/// and the engine handle so individual flows can focus on descriptor and rule
/// assembly. Credentials are immutable once the client is built.
pub struct PayoutProofClient<C>
where
	C: ?Sized + AuthorityHttpClient,
{
	engine: Arc<dyn ProofEngine>,
	authority: TokenAuthority<C>,
	cache: TokenCache,
	credentials: Credentials,
	contract: ApiContract,
	signature: Option<SignatureGenerator>,
	clock: Arc<dyn Clock>,
	mechanism: RuleMechanism,
}
impl<C> PayoutProofClient<C>
where
	C: ?Sized + AuthorityHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	///
	/// Fails with [`CryptoError`](crate::error::CryptoError) when the
	/// credential's key material cannot be parsed, and with
	/// [`ConfigError::MissingKeyMaterial`] when the contract mandates the
	/// signature header but no key material was supplied.
	pub fn with_http_client(
		engine: Arc<dyn ProofEngine>,
		credentials: Credentials,
		contract: ApiContract,
		http_client: impl Into<Arc<C>>,
	) -> Result<Self> {
		let signature = match credentials.signature_key_pem() {
			Some(pem) => Some(SignatureGenerator::from_pem(pem.expose())?),
			None => None,
		};

		if contract.signature_required && signature.is_none() {
			return Err(ConfigError::MissingKeyMaterial.into());
		}

		let clock: Arc<dyn Clock> = Arc::new(SystemClock);
		let cache = match credentials.preset_token() {
			Some(token) => TokenCache::seeded(
				token,
				clock.now(),
				contract.preset_token_lifetime,
				contract.token_safety_window,
			),
			None => TokenCache::new(contract.token_safety_window),
		};

		Ok(Self {
			engine,
			authority: TokenAuthority::new(http_client),
			cache,
			credentials,
			contract,
			signature,
			clock,
			mechanism: RuleMechanism::Structural,
		})
	}

	/// Replaces the clock used for signature and expiry decisions.
	///
	/// The token cache is reseeded against the new clock when the
	/// credentials carry a pre-obtained token.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		if let Some(token) = self.credentials.preset_token() {
			self.cache = TokenCache::seeded(
				token,
				clock.now(),
				self.contract.preset_token_lifetime,
				self.contract.token_safety_window,
			);
		}

		self.clock = clock;

		self
	}

	/// Switches the rule mechanism, e.g. to [`RuleMechanism::Pattern`] when
	/// the engine lacks structural-path support at runtime.
	pub fn with_rule_mechanism(mut self, mechanism: RuleMechanism) -> Self {
		self.mechanism = mechanism;

		self
	}

	/// Proves that the remote API reports a given transfer status.
	pub async fn prove_transfer_status(
		&self,
		request: TransferStatusRequest,
	) -> Result<TransferStatusResult> {
		const KIND: FlowKind = FlowKind::TransferStatus;

		let span = FlowSpan::new(KIND, "prove_transfer_status");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let headers = self.resolve_secret_headers().await?;
				let builder =
					RequestDescriptorBuilder::new(&self.contract, self.credentials.api_version());
				let public = builder.public(RequestMethod::Get, None, request.context.clone());
				let (matches, redactions) = ExtractionRuleSet::status_check(
					&self.contract.response_fields,
					request.expected_status.as_deref(),
					self.mechanism,
				)?
				.with_extra_match_rules(request.extra_match_rules.clone())
				.with_extra_redactions(request.extra_redactions.clone())
				.into_parts();
				let secret = builder.secret(headers, matches, redactions);
				let proof_request = ProofRequest {
					url: self.contract.status_url(&request.transfer_id)?,
					public,
					secret,
					retries: request.retries,
					retry_interval: request.retry_interval,
				};
				let proof = self
					.engine
					.generate_proof(&proof_request)
					.await?
					.ok_or(ProofGenerationError::NoProof { operation: "transfer_status" })?;
				let fields = &self.contract.response_fields;

				Ok(TransferStatusResult {
					transfer_id: proof
						.extracted(&fields.transfer_id)
						.map(str::to_owned)
						.unwrap_or_else(|| request.transfer_id.clone()),
					provider_transfer_id: proof
						.extracted(&fields.provider_transfer_id)
						.map(str::to_owned),
					status: proof.extracted(&fields.status).map(str::to_owned),
					transfer_amount: proof.extracted(&fields.transfer_amount).map(str::to_owned),
					proof,
				})
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Proves that the remote API created a transfer.
	///
	/// Each invocation genuinely executes a money transfer remotely; the
	/// client forwards the caller's retry request verbatim and adds nothing.
	pub async fn prove_transfer_creation(
		&self,
		request: TransferCreationRequest,
	) -> Result<TransferCreationResult> {
		const KIND: FlowKind = FlowKind::TransferCreation;

		let span = FlowSpan::new(KIND, "prove_transfer_creation");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let headers = self.resolve_secret_headers().await?;
				let builder =
					RequestDescriptorBuilder::new(&self.contract, self.credentials.api_version());
				let public = builder.public(
					RequestMethod::Post,
					Some(request.body.clone()),
					request.context.clone(),
				);
				let (matches, redactions) =
					ExtractionRuleSet::creation(&self.contract.response_fields, self.mechanism)?
						.into_parts();
				let secret = builder.secret(headers, matches, redactions);
				let proof_request = ProofRequest {
					url: self.contract.transfers_url()?,
					public,
					secret,
					retries: request.retries,
					retry_interval: request.retry_interval,
				};
				let proof = self
					.engine
					.generate_proof(&proof_request)
					.await?
					.ok_or(ProofGenerationError::NoProof { operation: "transfer_creation" })?;
				let fields = &self.contract.response_fields;
				let requested_id = request
					.body
					.get(&fields.transfer_id)
					.and_then(serde_json::Value::as_str)
					.map(str::to_owned);

				Ok(TransferCreationResult {
					transfer_id: proof
						.extracted(&fields.transfer_id)
						.map(str::to_owned)
						.or(requested_id),
					provider_transfer_id: proof
						.extracted(&fields.provider_transfer_id)
						.map(str::to_owned),
					status: proof.extracted(&fields.status).map(str::to_owned),
					proof,
				})
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Base URL of the data endpoints for advanced callers.
	pub fn base_url(&self) -> &Url {
		&self.contract.api_base
	}

	/// Contract profile the client was built with.
	pub fn contract(&self) -> &ApiContract {
		&self.contract
	}

	/// Resolves and returns a defensive copy of the current secret headers.
	///
	/// Triggers a token refresh when the cached token is stale; the returned
	/// map is owned by the caller, never the client's live state.
	pub async fn secret_headers(&self) -> Result<BTreeMap<String, String>> {
		self.resolve_secret_headers().await
	}

	async fn resolve_secret_headers(&self) -> Result<BTreeMap<String, String>> {
		let token = self.cache.ensure_fresh(self.clock.as_ref(), || self.authorize_once()).await?;
		let mut headers = BTreeMap::new();

		headers.insert("Authorization".into(), format!("Bearer {}", token.expose()));
		headers
			.insert(self.contract.client_id_header.clone(), self.credentials.client_id().into());
		headers.insert(
			self.contract.client_secret_header.clone(),
			self.credentials.client_secret().expose().into(),
		);

		if let Some(generator) = &self.signature {
			headers.insert(
				self.contract.signature_header.clone(),
				generator.sign(self.credentials.client_id(), self.clock.now())?,
			);
		}

		Ok(headers)
	}

	async fn authorize_once(&self) -> Result<SecretString> {
		// The timestamp binds each signature to a narrow validity window,
		// so one is computed fresh per authorization attempt.
		let signature = match &self.signature {
			Some(generator) =>
				Some(generator.sign(self.credentials.client_id(), self.clock.now())?),
			None => None,
		};

		self.authority.authorize(&self.contract, &self.credentials, signature.as_deref()).await
	}
}
#[cfg(feature = "reqwest")]
impl PayoutProofClient<ReqwestHttpClient> {
	/// Creates a new client with the crate's default reqwest transport.
	pub fn new(
		engine: Arc<dyn ProofEngine>,
		credentials: Credentials,
		contract: ApiContract,
	) -> Result<Self> {
		Self::with_http_client(engine, credentials, contract, ReqwestHttpClient::default())
	}
}
impl<C> Debug for PayoutProofClient<C>
where
	C: ?Sized + AuthorityHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PayoutProofClient")
			.field("credentials", &self.credentials)
			.field("contract", &self.contract.api_base.as_str())
			.field("mechanism", &self.mechanism)
			.finish()
	}
}

// self
use payout_prover::{
	_preludet::*,
	auth::Credentials,
	client::{PayoutProofClient, TransferCreationRequest, TransferStatusRequest},
	contract::{ApiContract, Environment},
	engine::{EngineFuture, Proof, ProofEngine, ProofRequest},
	error::ProofGenerationError,
	rules::RuleMechanism,
};

const STATUS_BODY: &str = r#"{"transfer_id":"txn_123","cf_transfer_id":"CF456","status":"SUCCESS","transfer_amount":100.50}"#;

fn build_credentials() -> Credentials {
	Credentials::builder("client-proof", "secret-proof")
		.preset_token("preset-token")
		.build()
		.expect("Credentials fixture should be valid for proof tests.")
}

fn build_contract() -> ApiContract {
	ApiContract::for_environment(Environment::Sandbox)
		.expect("Sandbox contract should build for proof tests.")
}

fn build_client(engine: Arc<FixtureProofEngine>) -> ReqwestTestClient {
	PayoutProofClient::with_http_client(
		engine,
		build_credentials(),
		build_contract(),
		test_reqwest_http_client(),
	)
	.expect("Client should build with preset-token credentials.")
}

#[tokio::test]
async fn status_proof_maps_extracted_values_into_the_result() {
	let engine = Arc::new(FixtureProofEngine::with_response_body(STATUS_BODY));
	let client = build_client(engine.clone());
	let result = client
		.prove_transfer_status(TransferStatusRequest::new("txn_123"))
		.await
		.expect("Status proof should succeed against the sample response.");

	assert_eq!(result.transfer_id, "txn_123");
	assert_eq!(result.provider_transfer_id.as_deref(), Some("CF456"));
	assert_eq!(result.status.as_deref(), Some("SUCCESS"));
	assert_eq!(result.transfer_amount.as_deref(), Some("100.50"));
	assert_eq!(result.proof.identifier, "0xfixture-claim");
}

#[tokio::test]
async fn status_proof_rejects_when_the_expected_status_assertion_fails() {
	// The fixture engine, like the real one, yields no proof when a
	// response-match assertion fails upstream.
	let engine = Arc::new(FixtureProofEngine::with_response_body(STATUS_BODY));
	let client = build_client(engine);
	let err = client
		.prove_transfer_status(
			TransferStatusRequest::new("txn_123").with_expected_status("FAILED"),
		)
		.await
		.expect_err("A failed status assertion should reject the proof call.");

	assert!(matches!(
		err,
		Error::ProofGeneration(ProofGenerationError::NoProof { operation: "transfer_status" }),
	));
}

#[tokio::test]
async fn status_proof_tolerates_missing_optional_extractions() {
	let engine = Arc::new(FixtureProofEngine::with_response_body(
		r#"{"transfer_id":"t1","status":"PENDING","cf_transfer_id":"cf1"}"#,
	));
	let client = build_client(engine);
	let result = client
		.prove_transfer_status(TransferStatusRequest::new("t1"))
		.await
		.expect("Status proof should succeed without a transfer amount.");

	assert_eq!(result.transfer_id, "t1");
	assert_eq!(result.status.as_deref(), Some("PENDING"));
	assert_eq!(result.provider_transfer_id.as_deref(), Some("cf1"));
	assert_eq!(result.transfer_amount, None);
}

#[tokio::test]
async fn status_proof_never_leaks_secrets_into_the_public_descriptor() {
	let engine = Arc::new(FixtureProofEngine::with_response_body(STATUS_BODY));
	let client = build_client(engine.clone());

	client
		.prove_transfer_status(TransferStatusRequest::new("txn_123").with_context("audit-7"))
		.await
		.expect("Status proof should succeed for the descriptor inspection.");

	let requests = engine.requests();
	let request = requests.first().expect("Engine should have received one request.");
	let public_rendered = serde_json::to_string(&request.public)
		.expect("Public descriptor should serialize for inspection.");

	assert!(!public_rendered.contains("preset-token"));
	assert!(!public_rendered.contains("secret-proof"));
	assert!(!public_rendered.contains("Authorization"));
	assert_eq!(request.public.headers.len(), 2);
	assert_eq!(request.public.context.as_deref(), Some("audit-7"));
	assert_eq!(
		request.secret.headers.get("Authorization").map(String::as_str),
		Some("Bearer preset-token"),
	);
	assert_eq!(
		request.secret.headers.get("x-client-id").map(String::as_str),
		Some("client-proof"),
	);
	assert_eq!(
		request.url.as_str(),
		"https://sandbox.cashfree.com/payout/transfers?transfer_id=txn_123",
	);
}

#[tokio::test]
async fn pattern_mechanism_yields_the_same_result_as_structural() {
	let structural = {
		let engine = Arc::new(FixtureProofEngine::with_response_body(STATUS_BODY));

		build_client(engine)
			.prove_transfer_status(TransferStatusRequest::new("txn_123"))
			.await
			.expect("Structural-mechanism proof should succeed.")
	};
	let pattern = {
		let engine = Arc::new(FixtureProofEngine::with_response_body(STATUS_BODY));

		build_client(engine)
			.with_rule_mechanism(RuleMechanism::Pattern)
			.prove_transfer_status(TransferStatusRequest::new("txn_123"))
			.await
			.expect("Pattern-mechanism proof should succeed.")
	};

	assert_eq!(structural.transfer_id, pattern.transfer_id);
	assert_eq!(structural.provider_transfer_id, pattern.provider_transfer_id);
	assert_eq!(structural.status, pattern.status);
	assert_eq!(structural.transfer_amount, pattern.transfer_amount);
	assert_eq!(structural.transfer_amount.as_deref(), Some("100.50"));
}

#[tokio::test]
async fn creation_proof_maps_the_created_transfer() {
	let engine = Arc::new(FixtureProofEngine::with_response_body(
		r#"{"transfer_id":"txn_9","cf_transfer_id":"CF9","status":"RECEIVED"}"#,
	));
	let client = build_client(engine.clone());
	let body = serde_json::json!({
		"transfer_id": "txn_9",
		"transfer_amount": 1.00,
		"beneficiary_details": { "beneficiary_id": "bene_1" },
	});
	let result = client
		.prove_transfer_creation(TransferCreationRequest::new(body.clone()))
		.await
		.expect("Creation proof should succeed.");

	assert_eq!(result.transfer_id.as_deref(), Some("txn_9"));
	assert_eq!(result.provider_transfer_id.as_deref(), Some("CF9"));
	assert_eq!(result.status.as_deref(), Some("RECEIVED"));

	let requests = engine.requests();
	let request = requests.first().expect("Engine should have received one request.");

	assert_eq!(request.url.as_str(), "https://sandbox.cashfree.com/payout/transfers");
	assert_eq!(request.public.body.as_ref(), Some(&body));
}

#[tokio::test]
async fn creation_proof_falls_back_to_the_requested_transfer_id() {
	// Engines are not obliged to return every extraction; the typed result
	// then falls back to the identifier the caller supplied in the body.
	struct ScriptedEngine;
	impl ProofEngine for ScriptedEngine {
		fn generate_proof<'a>(
			&'a self,
			_request: &'a ProofRequest,
		) -> EngineFuture<'a, Option<Proof>> {
			Box::pin(async move {
				Ok(Some(Proof {
					identifier: "0xscripted".into(),
					signatures: Vec::new(),
					witnesses: Vec::new(),
					extracted_values: HashMap::from_iter([(
						"status".to_owned(),
						"RECEIVED".to_owned(),
					)]),
				}))
			})
		}
	}

	let client = PayoutProofClient::with_http_client(
		Arc::new(ScriptedEngine),
		build_credentials(),
		build_contract(),
		test_reqwest_http_client(),
	)
	.expect("Client should build with the scripted engine.");
	let result = client
		.prove_transfer_creation(TransferCreationRequest::new(serde_json::json!({
			"transfer_id": "txn_fallback",
			"transfer_amount": 5,
		})))
		.await
		.expect("Creation proof should succeed with partial extractions.");

	assert_eq!(result.transfer_id.as_deref(), Some("txn_fallback"));
	assert_eq!(result.status.as_deref(), Some("RECEIVED"));
	assert_eq!(result.provider_transfer_id, None);
}

#[tokio::test]
async fn unavailable_engine_surfaces_a_proof_generation_error() {
	let engine = Arc::new(FixtureProofEngine::unavailable());
	let client = build_client(engine);
	let err = client
		.prove_transfer_creation(TransferCreationRequest::new(serde_json::json!({
			"transfer_id": "txn_1",
		})))
		.await
		.expect_err("An engine without proofs should reject the call.");

	assert!(matches!(
		err,
		Error::ProofGeneration(ProofGenerationError::NoProof { operation: "transfer_creation" }),
	));
}

#[tokio::test]
async fn extra_redactions_append_after_the_defaults() {
	let engine = Arc::new(FixtureProofEngine::with_response_body(
		r#"{"transfer_id":"txn_123","cf_transfer_id":"CF456","status":"SUCCESS","transfer_amount":100.50,"transfer_utr":"UTR77"}"#,
	));
	let client = build_client(engine.clone());
	let extra = payout_prover::rules::ExtractionRule::for_field(
		"transfer_utr",
		RuleMechanism::Structural,
	)
	.expect("Extra extraction rule should build.");
	let result = client
		.prove_transfer_status(
			TransferStatusRequest::new("txn_123").with_extra_redactions([extra]),
		)
		.await
		.expect("Status proof with extra redactions should succeed.");

	assert_eq!(result.proof.extracted("transfer_utr"), Some("UTR77"));

	let requests = engine.requests();
	let request = requests.first().expect("Engine should have received one request.");

	assert_eq!(request.secret.response_redactions.len(), 5);
	assert_eq!(request.secret.response_redactions[4].field, "transfer_utr");
}

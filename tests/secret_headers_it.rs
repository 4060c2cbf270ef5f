// crates.io
use httpmock::prelude::*;
// self
use payout_prover::{
	_preludet::*,
	auth::Credentials,
	client::PayoutProofClient,
	clock::ManualClock,
	contract::ApiContract,
	error::ConfigError,
};

const AUTHORIZE_BODY: &str = "{\"status\":\"SUCCESS\",\"data\":{\"token\":\"issued-token\"}}";

fn build_contract(server: &MockServer) -> ApiContract {
	test_contract(&server.url("/payout/v1/authorize"), &server.url(""))
}

fn build_client(
	server: &MockServer,
	credentials: Credentials,
) -> ReqwestTestClient {
	PayoutProofClient::with_http_client(
		Arc::new(FixtureProofEngine::unavailable()),
		credentials,
		build_contract(server),
		test_reqwest_http_client(),
	)
	.expect("Client should build for secret-header tests.")
}

#[tokio::test]
async fn preset_token_resolves_headers_without_authorizing() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/payout/v1/authorize");
			then.status(200).header("content-type", "application/json").body(AUTHORIZE_BODY);
		})
		.await;
	let credentials = Credentials::builder("client-preset", "secret-preset")
		.preset_token("preset-token")
		.build()
		.expect("Preset credentials should be valid.");
	let client = build_client(&server, credentials);
	let headers =
		client.secret_headers().await.expect("Header resolution should use the preset token.");

	assert_eq!(
		headers.get("Authorization").map(String::as_str),
		Some("Bearer preset-token"),
	);

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn token_refreshes_only_after_the_safety_window_elapses() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/payout/v1/authorize")
				.header("x-client-id", "client-fresh")
				.header("x-client-secret", "secret-fresh");
			then.status(200).header("content-type", "application/json").body(AUTHORIZE_BODY);
		})
		.await;
	let credentials = Credentials::builder("client-fresh", "secret-fresh")
		.build()
		.expect("Fresh credentials should be valid.");
	let clock = Arc::new(ManualClock::starting_at(OffsetDateTime::UNIX_EPOCH));
	let client = build_client(&server, credentials).with_clock(clock.clone());
	let first = client.secret_headers().await.expect("First resolution should authorize.");

	assert_eq!(first.get("Authorization").map(String::as_str), Some("Bearer issued-token"));

	clock.advance(Duration::seconds(539));
	client.secret_headers().await.expect("In-window resolution should reuse the token.");
	mock.assert_calls_async(1).await;

	clock.advance(Duration::seconds(1));
	client.secret_headers().await.expect("Post-window resolution should authorize again.");
	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn concurrent_resolutions_coalesce_into_one_authorization() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/payout/v1/authorize");
			then.status(200).header("content-type", "application/json").body(AUTHORIZE_BODY);
		})
		.await;
	let credentials = Credentials::builder("client-guard", "secret-guard")
		.build()
		.expect("Guard credentials should be valid.");
	let client = build_client(&server, credentials);
	let (first, second) = tokio::join!(client.secret_headers(), client.secret_headers());
	let first = first.expect("First concurrent resolution should succeed.");
	let second = second.expect("Second concurrent resolution should succeed.");

	assert_eq!(first.get("Authorization"), second.get("Authorization"));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn signature_key_material_populates_the_signature_header() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/payout/v1/authorize").header_exists("X-Cf-Signature");
			then.status(200).header("content-type", "application/json").body(AUTHORIZE_BODY);
		})
		.await;
	let credentials = Credentials::builder("client-signed", "secret-signed")
		.signature_key_pem(test_signature_key_pem())
		.build()
		.expect("Signed credentials should be valid.");
	let contract = ApiContract::builder()
		.authorize_endpoint(
			Url::parse(&server.url("/payout/v1/authorize"))
				.expect("Mock authorize endpoint should parse."),
		)
		.api_base(Url::parse(&server.url("")).expect("Mock API base should parse."))
		.require_signature(true)
		.build()
		.expect("Signature-mandating contract should build.");
	let client = PayoutProofClient::with_http_client(
		Arc::new(FixtureProofEngine::unavailable()),
		credentials,
		contract,
		test_reqwest_http_client(),
	)
	.expect("Client should build with signature key material.");
	let headers =
		client.secret_headers().await.expect("Header resolution should succeed with a signature.");
	let signature =
		headers.get("X-Cf-Signature").expect("Signature header should be populated.");

	assert!(!signature.is_empty());
	assert_eq!(headers.len(), 4, "All four authentication headers should be present.");

	mock.assert_async().await;
}

#[tokio::test]
async fn signature_mandate_without_key_material_fails_at_construction() {
	let server = MockServer::start_async().await;
	let credentials = Credentials::builder("client-unsigned", "secret-unsigned")
		.build()
		.expect("Unsigned credentials should be valid.");
	let contract = ApiContract::builder()
		.authorize_endpoint(
			Url::parse(&server.url("/payout/v1/authorize"))
				.expect("Mock authorize endpoint should parse."),
		)
		.api_base(Url::parse(&server.url("")).expect("Mock API base should parse."))
		.require_signature(true)
		.build()
		.expect("Signature-mandating contract should build.");
	let err = PayoutProofClient::with_http_client(
		Arc::new(FixtureProofEngine::unavailable()),
		credentials,
		contract,
		test_reqwest_http_client(),
	)
	.expect_err("A signature mandate without key material should be rejected.");

	assert!(matches!(err, Error::Config(ConfigError::MissingKeyMaterial)));
}

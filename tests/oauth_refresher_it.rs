#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use time::{Duration, macros::datetime};
// self
use oauth2_rotator::{
	clock::ManualClock,
	error::{ConfigError, Error, TransientError},
	oauth::{ClientAuthMethod, OAuth2Refresher},
	refresher::Refresher,
	url::Url,
};

const CLIENT_ID: &str = "client-rotate";
const CLIENT_SECRET: &str = "secret-rotate";

fn build_refresher(server: &MockServer, clock: &ManualClock) -> OAuth2Refresher {
	OAuth2Refresher::builder(
		CLIENT_ID,
		Url::parse(&server.url("/token")).expect("Mock token endpoint should parse successfully."),
	)
	.client_secret(CLIENT_SECRET)
	.client_auth_method(ClientAuthMethod::ClientSecretPost)
	.clock(Arc::new(clock.clone()))
	.build()
	.expect("Refresher should build against the mock server.")
}

#[tokio::test]
async fn refresh_returns_rotated_credential() {
	let server = MockServer::start_async().await;
	let clock = ManualClock::new(datetime!(2025-04-01 10:00 UTC));
	let refresher = build_refresher(&server, &clock);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.form_urlencoded_tuple("grant_type", "refresh_token")
				.form_urlencoded_tuple("refresh_token", "refresh-old")
				.form_urlencoded_tuple("client_id", CLIENT_ID);
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-new\",\"refresh_token\":\"refresh-new\",\"token_type\":\"bearer\",\"expires_in\":43200}",
			);
		})
		.await;
	let credential =
		refresher.refresh("refresh-old").await.expect("Refresh against the mock should succeed.");

	mock.assert_async().await;

	assert_eq!(credential.access_token().expose(), "access-new");
	assert_eq!(credential.refresh_token().expose(), "refresh-new");
	assert_eq!(credential.expires_at(), datetime!(2025-04-01 22:00 UTC));
}

#[tokio::test]
async fn missing_refresh_token_keeps_the_submitted_one() {
	let server = MockServer::start_async().await;
	let clock = ManualClock::new(datetime!(2025-04-01 10:00 UTC));
	let refresher = build_refresher(&server, &clock);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"access-new\",\"token_type\":\"bearer\",\"expires_in\":600}",
			);
		})
		.await;
	let credential =
		refresher.refresh("refresh-stable").await.expect("Refresh against the mock should succeed.");

	mock.assert_calls_async(1).await;

	assert_eq!(credential.refresh_token().expose(), "refresh-stable");
	assert_eq!(credential.expires_at(), datetime!(2025-04-01 10:10 UTC));
}

#[tokio::test]
async fn response_without_expiry_is_rejected() {
	let server = MockServer::start_async().await;
	let clock = ManualClock::new(datetime!(2025-04-01 10:00 UTC));
	let refresher = build_refresher(&server, &clock);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-new\",\"token_type\":\"bearer\"}");
		})
		.await;

	let err = refresher.refresh("refresh-old").await.expect_err("Missing expires_in must fail.");

	assert!(matches!(err, Error::Config(ConfigError::MissingExpiresIn)));
}

#[tokio::test]
async fn invalid_grant_maps_to_revoked_refresh_token() {
	let server = MockServer::start_async().await;
	let clock = ManualClock::new(datetime!(2025-04-01 10:00 UTC));
	let refresher = build_refresher(&server, &clock);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400).header("content-type", "application/json").body(
				"{\"error\":\"invalid_grant\",\"error_description\":\"refresh token revoked\"}",
			);
		})
		.await;

	let err = refresher.refresh("refresh-revoked").await.expect_err("Revoked grant must fail.");

	match err {
		Error::InvalidGrant { reason } => assert!(reason.contains("refresh token revoked")),
		other => panic!("Expected InvalidGrant, got {other:?}."),
	}
}

#[tokio::test]
async fn unavailable_endpoint_is_transient_with_retry_hint() {
	let server = MockServer::start_async().await;
	let clock = ManualClock::new(datetime!(2025-04-01 10:00 UTC));
	let refresher = build_refresher(&server, &clock);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(503)
				.header("content-type", "application/json")
				.header("retry-after", "30")
				.body("{\"error\":\"temporarily_unavailable\"}");
		})
		.await;

	let err = refresher.refresh("refresh-old").await.expect_err("Outage must surface an error.");

	match err {
		Error::Transient(TransientError::TokenEndpoint { status, retry_after, .. }) => {
			assert_eq!(status, Some(503));
			assert_eq!(retry_after, Some(Duration::seconds(30)));
		},
		other => panic!("Expected a transient error, got {other:?}."),
	}
}

//! Runs a rotated provider against a mock token endpoint: the seeded credential is two seconds
//! away from its refresh point, the background loop rotates it, and every request built afterwards
//! carries the new bearer token.

// std
use std::{sync::Arc, time::Duration as StdDuration};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use time::{Duration, OffsetDateTime};
// self
use oauth2_rotator::{
	CancellationToken,
	credential::Credential,
	ext::BearerAuthExt,
	oauth::OAuth2Refresher,
	provider::{RotatedTokenProvider, RotatedTokenProviderConfig},
	reqwest::Client,
	store::MemoryStorage,
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token").form_urlencoded_tuple("refresh_token", "demo-refresh");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access-rotated\",\"refresh_token\":\"demo-refresh-2\",\"token_type\":\"bearer\",\"expires_in\":43200}",
			);
		})
		.await;
	let storage = MemoryStorage::with_credential(Credential::new(
		"demo-access",
		"demo-refresh",
		OffsetDateTime::now_utc() + Duration::HOUR + Duration::seconds(2),
	)?);
	let refresher = OAuth2Refresher::builder("demo-client", Url::parse(&server.url("/token"))?)
		.client_secret("super-secret")
		.build()?;
	let provider = Arc::new(
		RotatedTokenProvider::new(
			RotatedTokenProviderConfig::new(Arc::new(storage.clone()), Arc::new(refresher))
				.with_label("demo"),
		)
		.await?,
	);
	let cancel = CancellationToken::new();
	let handle = provider.clone().spawn_refresh_loop(cancel.clone());

	println!("Seeded access token: {}.", provider.access_token());
	println!("Next refresh in {}.", provider.next_refresh_delay());

	tokio::time::sleep(StdDuration::from_secs(3)).await;

	let request =
		Client::new().get(server.url("/api/ping")).bearer_from(provider.as_ref())?.build()?;

	println!("Rotated access token: {}.", provider.access_token());
	println!("Outgoing request carries {} header(s).", request.headers().len());
	println!("Stored credential: {:?}.", storage.snapshot());

	token_mock.assert_async().await;
	cancel.cancel();
	handle.await?;

	Ok(())
}

//! Self-renewing access token provider backed by persistent storage.
//!
//! [`RotatedTokenProvider::new`] loads the seeded credential once; afterwards foreground callers
//! read the cached access token behind a read lock while [`RotatedTokenProvider::refresh_loop`]
//! keeps it fresh. Each loop tick first re-reads the storage: if another instance already rotated
//! the credential and it is not yet due, the tick adopts it without calling the identity provider.
//! Otherwise the tick refreshes, persists, and only then swaps the cache, so the in-memory value
//! never runs ahead of what is durably stored. Failures are retried on a fixed interval forever;
//! callers keep seeing the last good token meanwhile.

mod config;
mod metrics;
pub mod schedule;

pub use config::*;
pub use metrics::RotationMetrics;
pub use schedule::MIN_REFRESH_DELAY;

// crates.io
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	clock::Clock,
	credential::Credential,
	obs::{self, RotationEvent, RotationSpan},
	provider::AccessTokenProvider,
	refresher::Refresher,
	store::Storage,
};

/// Access token provider that rotates its credential in the background.
pub struct RotatedTokenProvider {
	storage: Arc<dyn Storage>,
	refresher: Arc<dyn Refresher>,
	clock: Arc<dyn Clock>,
	retry_interval: Duration,
	retry_jitter: Duration,
	buffer_interval: Duration,
	label: String,
	cached: RwLock<Arc<Credential>>,
	metrics: RotationMetrics,
}
impl RotatedTokenProvider {
	/// Validates `config` and loads the seed credential from storage.
	///
	/// Fails with [`ConfigError`](crate::error::ConfigError) when a collaborator is missing and
	/// with [`Error::Unseeded`] when the storage holds no credential yet.
	pub async fn new(config: RotatedTokenProviderConfig) -> Result<Self> {
		let settings = config.check_and_set_defaults()?;
		let seed = settings.storage.get().await.map_err(Error::from_seed_load)?;

		Ok(Self {
			storage: settings.storage,
			refresher: settings.refresher,
			clock: settings.clock,
			retry_interval: settings.retry_interval,
			retry_jitter: settings.retry_jitter,
			buffer_interval: settings.buffer_interval,
			label: settings.label,
			cached: RwLock::new(Arc::new(seed)),
			metrics: RotationMetrics::default(),
		})
	}

	/// Returns the cached access token. Never touches the network.
	pub fn access_token(&self) -> String {
		self.cached.read().access_token().expose().to_owned()
	}

	/// Returns the cached credential snapshot.
	pub fn current(&self) -> Arc<Credential> {
		self.cached.read().clone()
	}

	/// Counters describing the loop's activity.
	pub fn metrics(&self) -> &RotationMetrics {
		&self.metrics
	}

	/// Delay until the cached credential becomes due, measured on the provider's clock.
	pub fn next_refresh_delay(&self) -> Duration {
		schedule::refresh_delay(&self.current(), self.buffer_interval, self.clock.now())
	}

	/// Runs the refresh loop until `cancel` fires.
	///
	/// Start it right after construction on a dedicated task (see
	/// [`spawn_refresh_loop`](Self::spawn_refresh_loop)). Cancellation interrupts both the wait
	/// and an in-flight tick: the pending storage or refresher future is dropped, and the cache
	/// keeps whatever it held before that tick.
	pub async fn refresh_loop(&self, cancel: CancellationToken) {
		let mut delay = self.next_refresh_delay();

		obs::record(&self.label, RotationEvent::Scheduled { delay });

		loop {
			tokio::select! {
				biased;
				_ = cancel.cancelled() => break,
				_ = self.clock.sleep(delay) => {},
			}

			let tick = RotationSpan::new(&self.label, "tick").instrument(self.tick());

			delay = tokio::select! {
				biased;
				_ = cancel.cancelled() => break,
				next = tick => next,
			};
		}

		obs::record(&self.label, RotationEvent::Stopped);
	}

	/// Spawns [`refresh_loop`](Self::refresh_loop) onto the current Tokio runtime.
	pub fn spawn_refresh_loop(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
		tokio::spawn(async move { self.refresh_loop(cancel).await })
	}

	/// Runs one wake-up and returns the delay until the next one.
	async fn tick(&self) -> Duration {
		match self.storage.get().await {
			Ok(stored) if !stored.is_due_at(self.clock.now(), self.buffer_interval) =>
				return self.adopt(stored),
			Ok(_) => {},
			Err(e) => {
				self.metrics.record_storage_read_failure();
				obs::record(&self.label, RotationEvent::StorageReadFailed { error: &e });
			},
		}

		let refresh_token = self.current().refresh_token().clone();
		let refreshed = match self.refresher.refresh(refresh_token.expose()).await {
			Ok(refreshed) => refreshed,
			Err(e) => {
				let retry_in = self.retry_delay();

				self.metrics.record_refresh_failure();
				obs::record(&self.label, RotationEvent::RefreshFailed { error: &e, retry_in });

				return retry_in;
			},
		};

		if let Err(e) = self.storage.put(refreshed.clone()).await {
			let retry_in = self.retry_delay();

			self.metrics.record_persist_failure();
			obs::record(&self.label, RotationEvent::PersistFailed { error: &e, retry_in });

			return retry_in;
		}

		let next_in = schedule::refresh_delay(&refreshed, self.buffer_interval, self.clock.now());

		self.metrics.record_refresh();
		obs::record(
			&self.label,
			RotationEvent::Refreshed {
				fingerprint: &refreshed.fingerprint(),
				expires_in: refreshed.expires_in_at(self.clock.now()),
				next_in,
			},
		);
		self.swap(refreshed);

		next_in
	}

	fn adopt(&self, stored: Credential) -> Duration {
		let next_in = schedule::refresh_delay(&stored, self.buffer_interval, self.clock.now());

		self.metrics.record_adoption();
		obs::record(
			&self.label,
			RotationEvent::Adopted {
				fingerprint: &stored.fingerprint(),
				expires_in: stored.expires_in_at(self.clock.now()),
				next_in,
			},
		);
		self.swap(stored);

		next_in
	}

	fn swap(&self, credential: Credential) {
		*self.cached.write() = Arc::new(credential);
	}

	fn retry_delay(&self) -> Duration {
		schedule::retry_delay(self.retry_interval, self.retry_jitter)
	}
}
impl AccessTokenProvider for RotatedTokenProvider {
	fn access_token(&self) -> Result<String> {
		Ok(RotatedTokenProvider::access_token(self))
	}
}
impl Debug for RotatedTokenProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RotatedTokenProvider")
			.field("label", &self.label)
			.field("credential", &self.current())
			.field("retry_interval", &self.retry_interval)
			.field("retry_jitter", &self.retry_jitter)
			.field("buffer_interval", &self.buffer_interval)
			.field("metrics", &self.metrics)
			.finish()
	}
}

//! Configuration and defaulting for [`RotatedTokenProvider`](super::RotatedTokenProvider).

// self
use crate::{
	_prelude::*,
	clock::{Clock, SystemClock},
	error::ConfigError,
	refresher::Refresher,
	store::Storage,
};

/// Retry interval applied after a failed refresh or persist when none is configured.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::MINUTE;
/// Lead time before expiry at which a proactive refresh fires when none is configured.
pub const DEFAULT_BUFFER_INTERVAL: Duration = Duration::HOUR;
/// Provider label used in logs and metrics when none is configured.
pub const DEFAULT_LABEL: &str = "oauth2";

/// Inputs for building a rotated provider.
///
/// Only the storage and refresher are mandatory. Zero intervals mean "use the default"; negative
/// ones are rejected.
#[derive(Clone, Default)]
pub struct RotatedTokenProviderConfig {
	/// Persistent store holding the seeded credential.
	pub storage: Option<Arc<dyn Storage>>,
	/// Token endpoint wrapper used for refreshes.
	pub refresher: Option<Arc<dyn Refresher>>,
	/// Time source; defaults to [`SystemClock`].
	pub clock: Option<Arc<dyn Clock>>,
	/// Delay before retrying after a failed refresh or persist.
	pub retry_interval: Duration,
	/// Upper bound of the random spread added to each retry delay.
	pub retry_jitter: Duration,
	/// Lead time before expiry at which the loop refreshes.
	pub buffer_interval: Duration,
	/// Label attached to every log span/event and metric of this provider.
	pub label: Option<String>,
}
impl RotatedTokenProviderConfig {
	/// Creates a config with both collaborators set.
	pub fn new(storage: Arc<dyn Storage>, refresher: Arc<dyn Refresher>) -> Self {
		Self { storage: Some(storage), refresher: Some(refresher), ..Default::default() }
	}

	/// Sets or replaces the storage backend.
	pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
		self.storage = Some(storage);

		self
	}

	/// Sets or replaces the refresher.
	pub fn with_refresher(mut self, refresher: Arc<dyn Refresher>) -> Self {
		self.refresher = Some(refresher);

		self
	}

	/// Injects a clock, typically a [`ManualClock`](crate::clock::ManualClock) in tests.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = Some(clock);

		self
	}

	/// Overrides the retry interval (defaults to one minute).
	pub fn with_retry_interval(mut self, interval: Duration) -> Self {
		self.retry_interval = interval;

		self
	}

	/// Adds up to `jitter` of random spread to every retry (defaults to none).
	pub fn with_retry_jitter(mut self, jitter: Duration) -> Self {
		self.retry_jitter = jitter;

		self
	}

	/// Overrides the pre-expiry buffer (defaults to one hour).
	pub fn with_buffer_interval(mut self, interval: Duration) -> Self {
		self.buffer_interval = interval;

		self
	}

	/// Overrides the label used in logs and metrics.
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());

		self
	}

	pub(crate) fn check_and_set_defaults(self) -> Result<Settings, ConfigError> {
		let storage = self.storage.ok_or(ConfigError::MissingStorage)?;
		let refresher = self.refresher.ok_or(ConfigError::MissingRefresher)?;

		Ok(Settings {
			storage,
			refresher,
			clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
			retry_interval: interval_or_default(
				"retry",
				self.retry_interval,
				DEFAULT_RETRY_INTERVAL,
			)?,
			retry_jitter: interval_or_default("retry jitter", self.retry_jitter, Duration::ZERO)?,
			buffer_interval: interval_or_default(
				"buffer",
				self.buffer_interval,
				DEFAULT_BUFFER_INTERVAL,
			)?,
			label: self.label.unwrap_or_else(|| DEFAULT_LABEL.to_owned()),
		})
	}
}
impl Debug for RotatedTokenProviderConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RotatedTokenProviderConfig")
			.field("storage_set", &self.storage.is_some())
			.field("refresher_set", &self.refresher.is_some())
			.field("clock_set", &self.clock.is_some())
			.field("retry_interval", &self.retry_interval)
			.field("retry_jitter", &self.retry_jitter)
			.field("buffer_interval", &self.buffer_interval)
			.field("label", &self.label)
			.finish()
	}
}

/// Validated configuration with every default applied.
pub(crate) struct Settings {
	pub(crate) storage: Arc<dyn Storage>,
	pub(crate) refresher: Arc<dyn Refresher>,
	pub(crate) clock: Arc<dyn Clock>,
	pub(crate) retry_interval: Duration,
	pub(crate) retry_jitter: Duration,
	pub(crate) buffer_interval: Duration,
	pub(crate) label: String,
}

fn interval_or_default(
	name: &'static str,
	value: Duration,
	default: Duration,
) -> Result<Duration, ConfigError> {
	if value.is_negative() {
		return Err(ConfigError::NegativeInterval { name });
	}

	Ok(if value.is_zero() { default } else { value })
}

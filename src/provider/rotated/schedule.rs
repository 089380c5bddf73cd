//! Wake-up interval computation for the refresh loop.

// crates.io
use rand::Rng;
// self
use crate::{_prelude::*, credential::Credential};

/// Smallest delay the loop ever arms a timer with.
///
/// A credential that is already due (or expired) schedules an immediate tick through this value
/// instead of a zero or negative timer.
pub const MIN_REFRESH_DELAY: Duration = Duration::milliseconds(1);

/// Delay until `credential` becomes due, i.e. `expires_at - now - buffer`, clamped to
/// [`MIN_REFRESH_DELAY`].
pub fn refresh_delay(credential: &Credential, buffer: Duration, now: OffsetDateTime) -> Duration {
	let delay = credential.refresh_at(buffer) - now;

	if delay < MIN_REFRESH_DELAY { MIN_REFRESH_DELAY } else { delay }
}

/// Delay before retrying a failed tick: the fixed interval plus up to `jitter` of random spread.
pub fn retry_delay(interval: Duration, jitter: Duration) -> Duration {
	let spread_ms = jitter.whole_milliseconds();

	if spread_ms <= 0 {
		return interval;
	}

	let spread_ms = i64::try_from(spread_ms).unwrap_or(i64::MAX);

	interval.saturating_add(Duration::milliseconds(rand::rng().random_range(0..=spread_ms)))
}

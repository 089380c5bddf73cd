//! Optional observability helpers for the rotation loop.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit a span named `oauth2_rotator.rotation` (fields `provider` and
//!   `stage`) around every refresh tick plus structured events for scheduling, adoption, rotation,
//!   failures, and shutdown. Tokens only ever appear as [`Credential::fingerprint`] digests.
//! - Enable `metrics` to increment the `oauth2_rotator_rotation_total` counter for every tick
//!   outcome, labeled by `provider` + `outcome`.
//!
//! [`Credential::fingerprint`]: crate::credential::Credential::fingerprint

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};

// self
use crate::_prelude::*;

/// Outcome labels recorded for each refresh tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RotationOutcome {
	/// A fresher credential written by a peer was adopted without calling the refresher.
	Adopted,
	/// The refresher succeeded and the result was persisted.
	Refreshed,
	/// The refresher failed.
	RefreshFailed,
	/// The refreshed credential could not be persisted.
	PersistFailed,
}
impl RotationOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RotationOutcome::Adopted => "adopted",
			RotationOutcome::Refreshed => "refreshed",
			RotationOutcome::RefreshFailed => "refresh_failed",
			RotationOutcome::PersistFailed => "persist_failed",
		}
	}
}
impl Display for RotationOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Notable moments in the life of a refresh loop.
#[derive(Clone, Copy)]
pub enum RotationEvent<'a> {
	/// The loop armed its first timer.
	Scheduled {
		/// Delay until the first tick.
		delay: Duration,
	},
	/// A peer-refreshed credential was adopted from storage.
	Adopted {
		/// Fingerprint of the adopted access token.
		fingerprint: &'a str,
		/// Remaining lifetime of the adopted credential.
		expires_in: Duration,
		/// Delay until the next tick.
		next_in: Duration,
	},
	/// The refresher produced a credential that is now persisted and cached.
	Refreshed {
		/// Fingerprint of the new access token.
		fingerprint: &'a str,
		/// Remaining lifetime of the new credential.
		expires_in: Duration,
		/// Delay until the next tick.
		next_in: Duration,
	},
	/// Re-reading storage failed; the tick falls through to a direct refresh.
	StorageReadFailed {
		/// Rendered storage error.
		error: &'a dyn Display,
	},
	/// The refresher failed.
	RefreshFailed {
		/// Rendered refresher error.
		error: &'a dyn Display,
		/// Delay until the retry.
		retry_in: Duration,
	},
	/// The refreshed credential could not be persisted and was discarded.
	PersistFailed {
		/// Rendered storage error.
		error: &'a dyn Display,
		/// Delay until the retry.
		retry_in: Duration,
	},
	/// Cancellation was observed and the loop exited.
	Stopped,
}
impl RotationEvent<'_> {
	/// Outcome label for tick-completing events.
	pub fn outcome(&self) -> Option<RotationOutcome> {
		match self {
			Self::Adopted { .. } => Some(RotationOutcome::Adopted),
			Self::Refreshed { .. } => Some(RotationOutcome::Refreshed),
			Self::RefreshFailed { .. } => Some(RotationOutcome::RefreshFailed),
			Self::PersistFailed { .. } => Some(RotationOutcome::PersistFailed),
			Self::Scheduled { .. } | Self::StorageReadFailed { .. } | Self::Stopped => None,
		}
	}
}

/// Logs the event and, for tick outcomes, bumps the rotation counter.
pub fn record(provider: &str, event: RotationEvent<'_>) {
	emit_event(provider, &event);

	if let Some(outcome) = event.outcome() {
		record_rotation_outcome(provider, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn only_tick_outcomes_carry_labels() {
		let error = "boom";

		assert_eq!(
			RotationEvent::RefreshFailed { error: &error, retry_in: Duration::MINUTE }.outcome(),
			Some(RotationOutcome::RefreshFailed),
		);
		assert_eq!(RotationEvent::Stopped.outcome(), None);
		assert_eq!(RotationEvent::StorageReadFailed { error: &error }.outcome(), None);
		assert_eq!(RotationOutcome::PersistFailed.to_string(), "persist_failed");
	}

	#[test]
	fn record_is_safe_without_subscribers() {
		record("test", RotationEvent::Scheduled { delay: Duration::HOUR });
		record("test", RotationEvent::Stopped);
	}
}

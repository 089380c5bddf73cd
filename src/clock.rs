//! Clock abstraction driving refresh scheduling.
//!
//! Production code uses [`SystemClock`]. [`ManualClock`] only moves when told to, which keeps the
//! refresh loop's timing deterministic under test: sleepers registered through
//! [`Clock::sleep`] fire exactly when [`ManualClock::advance`] crosses their deadline.

// crates.io
use tokio::sync::{Notify, oneshot};
// self
use crate::_prelude::*;

/// Boxed future returned by [`Clock::sleep`].
pub type SleepFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a + Send>>;

/// Time source plus timer primitive used by the rotated provider.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Current instant.
	fn now(&self) -> OffsetDateTime;

	/// Completes once `duration` has elapsed on this clock.
	///
	/// Implementations register the timer when called, not when first polled.
	fn sleep(&self, duration: Duration) -> SleepFuture<'_>;
}

/// Wall clock backed by the Tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}

	fn sleep(&self, duration: Duration) -> SleepFuture<'_> {
		let std_duration = std::time::Duration::try_from(duration).unwrap_or_default();

		Box::pin(tokio::time::sleep(std_duration))
	}
}

/// Manually driven clock for deterministic tests.
///
/// Clones share the same timeline.
#[derive(Clone)]
pub struct ManualClock(Arc<ManualClockInner>);
impl ManualClock {
	/// Creates a clock frozen at `start`.
	pub fn new(start: OffsetDateTime) -> Self {
		Self(Arc::new(ManualClockInner {
			state: Mutex::new(ManualClockState { now: start, sleepers: Vec::new() }),
			registered: Notify::new(),
		}))
	}

	/// Moves the clock forward and wakes every sleeper whose deadline has been reached.
	pub fn advance(&self, by: Duration) {
		let fired = {
			let mut state = self.0.state.lock();

			state.now = state.now.saturating_add(by);

			let now = state.now;
			let (fired, pending) =
				state.sleepers.drain(..).partition::<Vec<_>, _>(|sleeper| sleeper.deadline <= now);

			state.sleepers = pending;

			fired
		};

		for sleeper in fired {
			let _ = sleeper.wake.send(());
		}
	}

	/// Number of live sleepers still waiting on this clock.
	pub fn sleepers(&self) -> usize {
		let mut state = self.0.state.lock();

		state.sleepers.retain(|sleeper| !sleeper.wake.is_closed());

		state.sleepers.len()
	}

	/// Earliest deadline among the live sleepers.
	pub fn next_deadline(&self) -> Option<OffsetDateTime> {
		let mut state = self.0.state.lock();

		state.sleepers.retain(|sleeper| !sleeper.wake.is_closed());

		state.sleepers.iter().map(|sleeper| sleeper.deadline).min()
	}

	/// Resolves once at least `count` sleepers are waiting on the clock.
	pub async fn wait_for_sleepers(&self, count: usize) {
		loop {
			let registered = self.0.registered.notified();
			let mut registered = std::pin::pin!(registered);

			registered.as_mut().enable();

			if self.sleepers() >= count {
				return;
			}

			registered.await;
		}
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		self.0.state.lock().now
	}

	fn sleep(&self, duration: Duration) -> SleepFuture<'_> {
		if !duration.is_positive() {
			return Box::pin(async {});
		}

		let (wake, fired) = oneshot::channel();

		{
			let mut state = self.0.state.lock();
			let deadline = state.now.saturating_add(duration);

			state.sleepers.push(Sleeper { deadline, wake });
		}

		self.0.registered.notify_waiters();

		Box::pin(async move {
			let _ = fired.await;
		})
	}
}
impl Debug for ManualClock {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.0.state.lock();

		f.debug_struct("ManualClock")
			.field("now", &state.now)
			.field("sleepers", &state.sleepers.len())
			.finish()
	}
}

struct ManualClockInner {
	state: Mutex<ManualClockState>,
	registered: Notify,
}

struct ManualClockState {
	now: OffsetDateTime,
	sleepers: Vec<Sleeper>,
}

struct Sleeper {
	deadline: OffsetDateTime,
	wake: oneshot::Sender<()>,
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::{PrimitiveDateTime, macros};
	// self
	use super::*;

	#[tokio::test]
	async fn manual_clock_fires_sleepers_at_their_deadline() {
		let start = macros::datetime!(2025-01-01 00:00 UTC);
		let clock = ManualClock::new(start);
		let sleeping = clock.sleep(Duration::minutes(10));

		assert_eq!(clock.sleepers(), 1);
		assert_eq!(clock.next_deadline(), Some(start + Duration::minutes(10)));

		clock.advance(Duration::minutes(9));

		assert_eq!(clock.sleepers(), 1);

		clock.advance(Duration::minutes(1));

		assert_eq!(clock.sleepers(), 0);
		assert_eq!(clock.now(), start + Duration::minutes(10));

		sleeping.await;
	}

	#[tokio::test]
	async fn huge_durations_saturate_instead_of_overflowing() {
		let clock = ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC));
		let sleeping = clock.sleep(Duration::MAX);

		assert_eq!(clock.next_deadline(), Some(PrimitiveDateTime::MAX.assume_utc()));

		clock.advance(Duration::MAX);

		assert_eq!(clock.now(), PrimitiveDateTime::MAX.assume_utc());
		assert_eq!(clock.sleepers(), 0);

		sleeping.await;
	}

	#[tokio::test]
	async fn non_positive_sleeps_complete_without_registering() {
		let clock = ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC));

		clock.sleep(Duration::ZERO).await;
		clock.sleep(Duration::seconds(-5)).await;

		assert_eq!(clock.sleepers(), 0);
	}

	#[tokio::test]
	async fn dropped_sleepers_are_not_counted() {
		let clock = ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC));
		let sleeping = clock.sleep(Duration::seconds(1));

		drop(sleeping);

		assert_eq!(clock.sleepers(), 0);
		assert_eq!(clock.next_deadline(), None);
	}

	#[tokio::test]
	async fn wait_for_sleepers_observes_later_registrations() {
		let clock = ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC));
		let sleeper_clock = clock.clone();
		let handle = tokio::spawn(async move {
			sleeper_clock.sleep(Duration::hours(1)).await;
		});

		clock.wait_for_sleepers(1).await;
		clock.advance(Duration::hours(1));

		handle.await.expect("Sleeper task should complete once the clock advances.");
	}

	#[test]
	fn system_clock_tracks_wall_time() {
		let before = OffsetDateTime::now_utc();
		let now = SystemClock.now();

		assert!(now >= before);
	}
}

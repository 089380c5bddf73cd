// self
use crate::{_prelude::*, obs::RotationEvent};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedRotation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedRotation<F> = F;

/// A span builder used by the refresh loop.
#[derive(Clone, Debug)]
pub struct RotationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RotationSpan {
	/// Creates a new span tagged with the provider label + stage.
	pub fn new(provider: &str, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_rotator.rotation", provider, stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (provider, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedRotation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a structured log line for a rotation event.
pub fn emit_event(provider: &str, event: &RotationEvent<'_>) {
	#[cfg(feature = "tracing")]
	match *event {
		RotationEvent::Scheduled { delay } => {
			tracing::info!(provider, delay = %delay, "Scheduled first credential refresh.");
		},
		RotationEvent::Adopted { fingerprint, expires_in, next_in } => {
			tracing::info!(
				provider,
				fingerprint,
				expires_in = %expires_in,
				next_in = %next_in,
				"Adopted credential refreshed by a peer."
			);
		},
		RotationEvent::Refreshed { fingerprint, expires_in, next_in } => {
			tracing::info!(
				provider,
				fingerprint,
				expires_in = %expires_in,
				next_in = %next_in,
				"Refreshed credential."
			);
		},
		RotationEvent::StorageReadFailed { error } => {
			tracing::debug!(provider, error = %error, "Failed to re-read stored credential.");
		},
		RotationEvent::RefreshFailed { error, retry_in } => {
			tracing::warn!(
				provider,
				error = %error,
				retry_in = %retry_in,
				"Failed to refresh credential."
			);
		},
		RotationEvent::PersistFailed { error, retry_in } => {
			tracing::warn!(
				provider,
				error = %error,
				retry_in = %retry_in,
				"Failed to persist refreshed credential."
			);
		},
		RotationEvent::Stopped => {
			tracing::info!(provider, "Refresh loop stopped.");
		},
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (provider, event);
	}
}

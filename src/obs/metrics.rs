// self
use crate::obs::RotationOutcome;

/// Records a tick outcome via the global metrics recorder (when enabled).
pub fn record_rotation_outcome(provider: &str, outcome: RotationOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_rotator_rotation_total",
			"provider" => provider.to_owned(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (provider, outcome);
	}
}

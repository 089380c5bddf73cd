//! Fixed-token provider for deployments that pin a long-lived API key.

// self
use crate::{_prelude::*, credential::TokenSecret, provider::AccessTokenProvider};

/// Provider that always returns the same token and never rotates it.
#[derive(Clone, Debug)]
pub struct StaticTokenProvider(TokenSecret);
impl StaticTokenProvider {
	/// Wraps a fixed token.
	pub fn new(token: impl Into<String>) -> Self {
		Self(TokenSecret::new(token))
	}
}
impl AccessTokenProvider for StaticTokenProvider {
	fn access_token(&self) -> Result<String> {
		Ok(self.0.expose().to_owned())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn returns_the_pinned_token_every_time() {
		let provider = StaticTokenProvider::new("api-key");

		for _ in 0..3 {
			assert_eq!(provider.access_token().expect("Static provider never fails."), "api-key");
		}

		assert_eq!(format!("{provider:?}"), "StaticTokenProvider(TokenSecret(\"<redacted>\"))");
	}

	#[test]
	fn works_behind_a_trait_object() {
		let provider: Arc<dyn AccessTokenProvider> = Arc::new(StaticTokenProvider::new("pinned"));

		assert_eq!(provider.access_token().expect("Static provider never fails."), "pinned");
	}
}

//! Glue for attaching provider-issued tokens to outgoing reqwest requests.

// crates.io
use reqwest::RequestBuilder;
// self
use crate::{_prelude::*, provider::AccessTokenProvider};

/// Extension trait that sets `Authorization: Bearer <token>` from an [`AccessTokenProvider`].
pub trait BearerAuthExt
where
	Self: Sized,
{
	/// Reads the provider's current token and attaches it as a bearer credential.
	fn bearer_from(self, provider: &dyn AccessTokenProvider) -> Result<Self>;
}
impl BearerAuthExt for RequestBuilder {
	fn bearer_from(self, provider: &dyn AccessTokenProvider) -> Result<Self> {
		let token = provider.access_token()?;

		Ok(self.bearer_auth(token))
	}
}

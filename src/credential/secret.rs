//! Access and refresh tokens as they travel through the rotator.
//!
//! Both halves of a [`Credential`](super::Credential) are bearer material: anyone holding the
//! refresh token can mint new access tokens. Formatting therefore never prints them, and the
//! only way to the raw string is [`TokenSecret::expose`], used when the value leaves the crate
//! (an `Authorization` header, a refresh request body, or a storage write).

// self
use crate::_prelude::*;

/// Opaque token string serialized as a bare JSON string and redacted everywhere else.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a token issued by the identity provider.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Raw token, for the header, request, or store it is headed to.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Empty tokens are how an unseeded or half-written snapshot shows up.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

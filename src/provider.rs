//! Bearer-token providers consumed by outgoing HTTP/gRPC clients.
//!
//! `static_token` pins a single long-lived token. `rotated` owns a cached
//! [`Credential`](crate::credential::Credential), refreshes it in the background before it
//! expires, and persists every rotation back to the injected storage.

pub mod rotated;
pub mod static_token;

pub use rotated::*;
pub use static_token::*;

// self
use crate::_prelude::*;

/// Source of the bearer token attached to outgoing requests.
pub trait AccessTokenProvider
where
	Self: Send + Sync,
{
	/// Returns the access token to use right now.
	///
	/// Implementations must not block on network I/O.
	fn access_token(&self) -> Result<String>;
}

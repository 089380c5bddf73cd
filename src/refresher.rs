//! Refresher contract wrapping an identity provider's token endpoint.
//!
//! The rotated provider only needs "exchange this refresh token for a new credential". Any error
//! is treated as transient and retried on the provider's retry interval; the variants of
//! [`Error`] only feed logs. The crate ships [`OAuth2Refresher`](crate::oauth::OAuth2Refresher)
//! behind the `reqwest` feature.

// self
use crate::{_prelude::*, credential::Credential};

/// Boxed future returned by [`Refresher::refresh`].
pub type RefreshFuture<'a> = Pin<Box<dyn Future<Output = Result<Credential>> + 'a + Send>>;

/// Exchanges a refresh token for a brand-new credential.
pub trait Refresher
where
	Self: Send + Sync,
{
	/// Performs the refresh exchange.
	fn refresh<'a>(&'a self, refresh_token: &'a str) -> RefreshFuture<'a>;
}

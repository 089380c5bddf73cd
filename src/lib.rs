//! Self-renewing OAuth 2.0 bearer tokens—background rotation, pluggable persistent stores, and
//! HA-aware refresh in one crate built for production.
//!
//! The crate centers on [`provider::RotatedTokenProvider`]: it loads a seeded
//! [`credential::Credential`] from a [`store::Storage`], serves the access token to foreground
//! callers behind a read lock, and runs a background loop that refreshes the credential through a
//! [`refresher::Refresher`] shortly before it expires. Peers sharing the same backing store are
//! tolerated: the loop re-reads the store before every refresh and adopts a credential another
//! instance already rotated.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod clock;
pub mod credential;
pub mod error;
#[cfg(feature = "reqwest")] pub mod ext;
#[cfg(feature = "reqwest")] pub mod http;
#[cfg(feature = "reqwest")] pub mod oauth;
pub mod obs;
pub mod provider;
pub mod refresher;
pub mod store;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	#[cfg(feature = "reqwest")] pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
#[cfg(feature = "reqwest")] pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

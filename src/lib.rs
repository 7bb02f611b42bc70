//! Token supplier and caching layer for identity-management API clients—client-credentials
//! issuance, leeway-aware caching, and per-request credential binding in one crate built for
//! production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod binder;
pub mod cache;
pub mod credential;
pub mod error;
pub mod issuer;
pub mod obs;
pub mod supplier;

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};

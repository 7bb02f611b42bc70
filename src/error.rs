//! Error types shared across credentials, the token cache, the issuer, and the binder.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential descriptor or authentication configuration problem.
	#[error(transparent)]
	Credential(#[from] CredentialError),
	/// Token issuance against the authorization server failed.
	#[error(transparent)]
	Acquisition(#[from] AcquisitionError),
}

/// Credential validation and configuration failures.
///
/// These are never retried; they surface immediately at configuration or first-use time.
#[derive(Debug, ThisError)]
pub enum CredentialError {
	/// Base URL was empty or whitespace.
	#[error("Base URL cannot be empty.")]
	EmptyBaseUrl,
	/// Base URL could not be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL must use HTTPS.
	#[error("Base URL must use HTTPS: {url}.")]
	InsecureBaseUrl {
		/// Base URL that failed validation.
		url: String,
	},
	/// Static bearer token was empty.
	#[error("Static bearer token cannot be empty.")]
	EmptyToken,
	/// Client identifier was empty.
	#[error("Client id cannot be empty.")]
	EmptyClientId,
	/// Client secret was empty.
	#[error("Client secret cannot be empty.")]
	EmptyClientSecret,
	/// Audience override was empty.
	#[error("Audience cannot be empty.")]
	EmptyAudience,

	/// Descriptor mixes a static token with a client-credentials tuple.
	#[error("Descriptor cannot combine a static token with client credentials.")]
	AmbiguousAuthentication,
	/// No authentication method was configured at all.
	#[error("No authentication method is configured; supply a static token or client credentials.")]
	MissingAuthentication,
	/// A managed supplier requires a client-credentials descriptor.
	#[error("Static-token descriptors cannot be refreshed; use the static supplier.")]
	StaticTokenNotRefreshable,
}

/// Token issuance failures.
///
/// Not retried by this crate; retry policy, if any, belongs to the transport layer. A failed
/// issuance never evicts or corrupts a still-valid previously cached token.
#[derive(Debug, ThisError)]
pub enum AcquisitionError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Token endpoint answered with a non-2xx status.
	#[error("Token endpoint returned HTTP {status}: {body}.")]
	Endpoint {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Response body preserved for diagnostics.
		body: String,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// 2xx response carried no usable access token.
	#[error("Token endpoint response did not contain an access token.")]
	MissingAccessToken,
	/// Token endpoint reported a non-positive token lifetime.
	#[error("The expires_in value must be positive: {value}.")]
	InvalidExpiresIn {
		/// The rejected lifetime in seconds.
		value: i64,
	},
}
impl AcquisitionError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for AcquisitionError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

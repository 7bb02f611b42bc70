//! Credential descriptors consumed by suppliers and the request binder.
//!
//! A [`CredentialDescriptor`] is an immutable value describing how a client authenticates
//! against the management API: either a fixed bearer token, or a client-credentials tuple
//! exchanged for short-lived access tokens. Construction goes through a validating builder
//! that fails fast on missing or malformed fields.

/// Redacting secret wrapper.
pub mod secret;

pub use secret::TokenSecret;

// self
use crate::{_prelude::*, error::CredentialError};

/// Path appended to the base URL to reach the token endpoint.
const TOKEN_ENDPOINT_PATH: &str = "/oauth/token";
/// Path suffix of the canonical management-API audience for a tenant.
const MANAGEMENT_AUDIENCE_PATH: &str = "/api/v2/";

/// Immutable description of how a client authenticates against the management API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialDescriptor {
	/// Normalized tenant base URL (HTTPS, no trailing slash).
	pub base_url: String,
	/// Token endpoint derived from the base URL.
	pub token_endpoint: Url,
	/// Authentication material bound to the base URL.
	pub grant: CredentialGrant,
}
impl CredentialDescriptor {
	/// Creates a new builder seeded with the provided base URL.
	pub fn builder(base_url: impl Into<String>) -> CredentialDescriptorBuilder {
		CredentialDescriptorBuilder::new(base_url)
	}

	/// Convenience constructor for a static-bearer-token descriptor.
	pub fn static_token(
		base_url: impl Into<String>,
		token: impl Into<String>,
	) -> Result<Self, CredentialError> {
		Self::builder(base_url).static_token(token).build()
	}

	/// Convenience constructor for a client-credentials descriptor with the default audience.
	pub fn client_credentials(
		base_url: impl Into<String>,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Result<Self, CredentialError> {
		Self::builder(base_url).client_credentials(client_id, client_secret).build()
	}

	/// Returns `true` when the descriptor carries a client-credentials tuple.
	pub fn has_client_credentials(&self) -> bool {
		matches!(self.grant, CredentialGrant::ClientCredentials { .. })
	}
}

/// Authentication material variants supported by descriptors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialGrant {
	/// Fixed bearer token supplied at configuration time; never refreshed.
	StaticToken {
		/// The bearer token value.
		token: TokenSecret,
	},
	/// Client-credentials tuple exchanged for short-lived access tokens.
	ClientCredentials {
		/// OAuth client identifier.
		client_id: String,
		/// OAuth client secret.
		client_secret: TokenSecret,
		/// Audience the issued tokens must target.
		audience: String,
	},
}

/// Builder for [`CredentialDescriptor`] values.
#[derive(Clone, Debug)]
pub struct CredentialDescriptorBuilder {
	/// Tenant base URL as supplied by the caller.
	pub base_url: String,
	/// Optional static bearer token.
	pub token: Option<String>,
	/// Optional OAuth client identifier.
	pub client_id: Option<String>,
	/// Optional OAuth client secret.
	pub client_secret: Option<String>,
	/// Optional audience override.
	pub audience: Option<String>,
}
impl CredentialDescriptorBuilder {
	/// Creates a new builder seeded with the provided base URL.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			token: None,
			client_id: None,
			client_secret: None,
			audience: None,
		}
	}

	/// Sets a static bearer token.
	pub fn static_token(mut self, token: impl Into<String>) -> Self {
		self.token = Some(token.into());

		self
	}

	/// Sets the client-credentials tuple.
	pub fn client_credentials(
		mut self,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		self.client_id = Some(client_id.into());
		self.client_secret = Some(client_secret.into());

		self
	}

	/// Overrides the audience (defaults to the canonical management-API audience).
	pub fn audience(mut self, audience: impl Into<String>) -> Self {
		self.audience = Some(audience.into());

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<CredentialDescriptor, CredentialError> {
		let base_url = normalize_base_url(&self.base_url)?;
		let token_endpoint = Url::parse(&format!("{base_url}{TOKEN_ENDPOINT_PATH}"))
			.map_err(|source| CredentialError::InvalidBaseUrl { source })?;
		let grant = match (self.token, self.client_id, self.client_secret) {
			(Some(_), Some(_), _) | (Some(_), _, Some(_)) =>
				return Err(CredentialError::AmbiguousAuthentication),
			(Some(token), None, None) => {
				if token.is_empty() {
					return Err(CredentialError::EmptyToken);
				}

				CredentialGrant::StaticToken { token: TokenSecret::new(token) }
			},
			(None, Some(client_id), Some(client_secret)) => {
				if client_id.is_empty() {
					return Err(CredentialError::EmptyClientId);
				}
				if client_secret.is_empty() {
					return Err(CredentialError::EmptyClientSecret);
				}

				let audience = match self.audience {
					Some(audience) if audience.is_empty() =>
						return Err(CredentialError::EmptyAudience),
					Some(audience) => audience,
					None => format!("{base_url}{MANAGEMENT_AUDIENCE_PATH}"),
				};

				CredentialGrant::ClientCredentials {
					client_id,
					client_secret: TokenSecret::new(client_secret),
					audience,
				}
			},
			(None, _, _) => return Err(CredentialError::MissingAuthentication),
		};

		Ok(CredentialDescriptor { base_url, token_endpoint, grant })
	}
}

fn normalize_base_url(raw: &str) -> Result<String, CredentialError> {
	let trimmed = raw.trim().trim_end_matches('/');

	if trimmed.is_empty() {
		return Err(CredentialError::EmptyBaseUrl);
	}

	let parsed =
		Url::parse(trimmed).map_err(|source| CredentialError::InvalidBaseUrl { source })?;

	if parsed.scheme() != "https" {
		return Err(CredentialError::InsecureBaseUrl { url: trimmed.to_owned() });
	}

	Ok(trimmed.to_owned())
}

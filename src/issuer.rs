//! Token issuer client: the external collaborator that performs the OAuth2 client-credentials
//! exchange against the authorization server.
//!
//! The [`TokenIssuer`] trait is the crate's only seam onto an HTTP stack. The default
//! [`ReqwestTokenIssuer`] posts a JSON document to the tenant's token endpoint; the body is
//! produced from a serde-serialized struct so credential values containing quotes, backslashes,
//! or newlines can never corrupt the payload. Non-2xx responses preserve the HTTP status and
//! body for diagnostics, and malformed JSON surfaces a structured parse failure.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	credential::{CredentialDescriptor, CredentialGrant, TokenSecret},
	error::AcquisitionError,
};

/// Token lifetime assumed when the endpoint omits `expires_in`.
const DEFAULT_TOKEN_TTL: Duration = Duration::seconds(86_400);

/// Boxed future returned by [`TokenIssuer::request_token`].
pub type IssuerFuture<'a> =
	Pin<Box<dyn Future<Output = Result<IssuedToken, AcquisitionError>> + 'a + Send>>;

/// External collaborator performing the client-credentials exchange.
///
/// Implementations must be `Send + Sync` so suppliers can share them across executors, and the
/// returned futures must be `Send` so callers can box them freely.
pub trait TokenIssuer
where
	Self: Send + Sync,
{
	/// Requests a fresh access token for the provided exchange parameters.
	fn request_token<'a>(&'a self, exchange: &'a TokenExchange) -> IssuerFuture<'a>;
}

/// Parameters for one client-credentials exchange against the token endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenExchange {
	/// Token endpoint receiving the POST.
	pub token_endpoint: Url,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	pub client_secret: TokenSecret,
	/// Audience the issued token must target.
	pub audience: String,
}
impl TokenExchange {
	/// Extracts exchange parameters from a client-credentials descriptor; `None` for
	/// static-token descriptors.
	pub fn from_descriptor(descriptor: &CredentialDescriptor) -> Option<Self> {
		match &descriptor.grant {
			CredentialGrant::ClientCredentials { client_id, client_secret, audience } =>
				Some(Self {
					token_endpoint: descriptor.token_endpoint.clone(),
					client_id: client_id.clone(),
					client_secret: client_secret.clone(),
					audience: audience.clone(),
				}),
			CredentialGrant::StaticToken { .. } => None,
		}
	}

	/// Builds the serializable wire payload for this exchange.
	pub(crate) fn request_body(&self) -> AccessTokenRequest<'_> {
		AccessTokenRequest {
			grant_type: "client_credentials",
			client_id: &self.client_id,
			client_secret: self.client_secret.expose(),
			audience: &self.audience,
		}
	}
}

/// Wire payload for the client-credentials grant.
///
/// Credential values are embedded through serde, never through string concatenation, so the
/// resulting document stays well-formed for any secret content.
#[derive(Clone, Serialize)]
pub(crate) struct AccessTokenRequest<'a> {
	pub(crate) grant_type: &'static str,
	pub(crate) client_id: &'a str,
	pub(crate) client_secret: &'a str,
	pub(crate) audience: &'a str,
}

/// Response document returned by the token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct AccessTokenResponse {
	pub(crate) access_token: String,
	#[serde(default)]
	pub(crate) expires_in: Option<i64>,
	#[serde(default)]
	#[allow(dead_code)]
	pub(crate) token_type: Option<String>,
}
impl AccessTokenResponse {
	pub(crate) fn into_issued(self) -> Result<IssuedToken, AcquisitionError> {
		if self.access_token.is_empty() {
			return Err(AcquisitionError::MissingAccessToken);
		}

		let expires_in = match self.expires_in {
			Some(value) if value <= 0 => return Err(AcquisitionError::InvalidExpiresIn { value }),
			Some(value) => Duration::seconds(value),
			None => DEFAULT_TOKEN_TTL,
		};

		Ok(IssuedToken { access_token: TokenSecret::new(self.access_token), expires_in })
	}
}

/// Token minted by the authorization server plus its relative lifetime.
#[derive(Clone, Debug)]
pub struct IssuedToken {
	/// The access token value.
	pub access_token: TokenSecret,
	/// Relative lifetime reported by the server.
	pub expires_in: Duration,
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Token requests should not follow redirects, matching OAuth 2.0 guidance that token endpoints
/// return results directly instead of delegating to another URI. Configure any custom
/// [`ReqwestClient`] accordingly before passing it to [`ReqwestTokenIssuer::with_client`]. A
/// single client may be shared across issuer instances to pool connections.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTokenIssuer(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTokenIssuer {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTokenIssuer {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTokenIssuer {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl TokenIssuer for ReqwestTokenIssuer {
	fn request_token<'a>(&'a self, exchange: &'a TokenExchange) -> IssuerFuture<'a> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client
				.post(exchange.token_endpoint.clone())
				.json(&exchange.request_body())
				.send()
				.await
				.map_err(AcquisitionError::from)?;
			let status = response.status();
			let body = response.bytes().await.map_err(AcquisitionError::from)?;

			if !status.is_success() {
				return Err(AcquisitionError::Endpoint {
					status: status.as_u16(),
					body: String::from_utf8_lossy(&body).into_owned(),
				});
			}

			let mut deserializer = serde_json::Deserializer::from_slice(&body);
			let parsed: AccessTokenResponse = serde_path_to_error::deserialize(&mut deserializer)
				.map_err(|source| AcquisitionError::ResponseParse {
					source,
					status: Some(status.as_u16()),
				})?;

			parsed.into_issued()
		})
	}
}

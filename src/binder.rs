//! Request binder: resolves which credentials govern each outgoing request and produces its
//! Authorization header value before dispatch.
//!
//! Resource wrappers call [`RequestAuthBinder::authorization_header`] with an optional
//! per-request credential override. The binder picks the override when present, the configured
//! default otherwise, and routes the chosen descriptor to a supplier bound to that descriptor
//! identity — one supplier per identity, created on demand and reused thereafter so the caching
//! benefit is preserved.

// self
use crate::{
	_prelude::*,
	cache::{CacheKey, TokenCache},
	credential::{CredentialDescriptor, CredentialGrant},
	error::CredentialError,
	issuer::TokenIssuer,
	supplier::{DEFAULT_LEEWAY, ManagedTokenSupplier, StaticTokenSupplier, TokenSupplier},
};

/// Identity under which suppliers are memoized.
#[derive(Clone, PartialEq, Eq, Hash)]
enum SupplierIdentity {
	/// Static bearer token; the identity is the token value itself.
	Static(String),
	/// Client-credentials principal; the identity is the cache-key triple.
	Managed(CacheKey),
}
impl SupplierIdentity {
	fn of(descriptor: &CredentialDescriptor) -> Self {
		match &descriptor.grant {
			CredentialGrant::StaticToken { token } => Self::Static(token.expose().to_owned()),
			CredentialGrant::ClientCredentials { client_id, audience, .. } => Self::Managed(
				CacheKey::new(descriptor.base_url.clone(), audience.clone(), client_id.clone()),
			),
		}
	}
}

/// Resolves the Authorization header value for each pending request.
pub struct RequestAuthBinder {
	default_credentials: Option<CredentialDescriptor>,
	issuer: Arc<dyn TokenIssuer>,
	cache: TokenCache,
	leeway: Duration,
	suppliers: Mutex<HashMap<SupplierIdentity, Arc<dyn TokenSupplier>>>,
}
impl RequestAuthBinder {
	/// Creates a binder with the provided default credentials.
	pub fn new(default_credentials: CredentialDescriptor, issuer: Arc<dyn TokenIssuer>) -> Self {
		Self {
			default_credentials: Some(default_credentials),
			issuer,
			cache: TokenCache::default(),
			leeway: DEFAULT_LEEWAY,
			suppliers: Default::default(),
		}
	}

	/// Creates a binder with no default credentials; every request must carry an override.
	pub fn without_default(issuer: Arc<dyn TokenIssuer>) -> Self {
		Self {
			default_credentials: None,
			issuer,
			cache: TokenCache::default(),
			leeway: DEFAULT_LEEWAY,
			suppliers: Default::default(),
		}
	}

	/// Overrides the expiry leeway applied to managed suppliers created by this binder.
	pub fn with_leeway(mut self, leeway: Duration) -> Self {
		self.leeway = leeway;

		self
	}

	/// Shared handle to the binder's token cache.
	pub fn cache(&self) -> TokenCache {
		self.cache.clone()
	}

	/// Resolves the Authorization header value for a pending request.
	///
	/// The override descriptor wins over the configured default; with neither, the request
	/// cannot be authenticated and a credential error surfaces immediately.
	pub async fn authorization_header(
		&self,
		override_credentials: Option<&CredentialDescriptor>,
	) -> Result<String> {
		let descriptor = override_credentials
			.or(self.default_credentials.as_ref())
			.ok_or(CredentialError::MissingAuthentication)?;
		let supplier = self.supplier_for(descriptor)?;
		let token = supplier.get_token().await?;

		Ok(format!("Bearer {}", token.expose()))
	}

	fn supplier_for(
		&self,
		descriptor: &CredentialDescriptor,
	) -> Result<Arc<dyn TokenSupplier>, CredentialError> {
		let identity = SupplierIdentity::of(descriptor);
		let mut suppliers = self.suppliers.lock();

		if let Some(existing) = suppliers.get(&identity) {
			return Ok(existing.clone());
		}

		let supplier: Arc<dyn TokenSupplier> = match &descriptor.grant {
			CredentialGrant::StaticToken { token } =>
				Arc::new(StaticTokenSupplier::new(token.expose())?),
			CredentialGrant::ClientCredentials { .. } => Arc::new(
				ManagedTokenSupplier::new(descriptor, self.cache.clone(), self.issuer.clone())?
					.with_leeway(self.leeway),
			),
		};

		suppliers.insert(identity, supplier.clone());

		Ok(supplier)
	}
}
impl Debug for RequestAuthBinder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestAuthBinder")
			.field("default_credentials_set", &self.default_credentials.is_some())
			.field("suppliers", &self.suppliers.lock().len())
			.finish()
	}
}

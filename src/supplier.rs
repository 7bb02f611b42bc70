//! Token suppliers: the components that turn a credential descriptor into a currently-valid
//! bearer token.
//!
//! [`ManagedTokenSupplier`] consults the shared [`TokenCache`], decides freshness using an
//! expiry leeway, and triggers re-issuance through the [`TokenIssuer`] when needed. Concurrent
//! callers for the same stale key share a single in-flight issuance through a per-key
//! single-flight guard instead of stampeding the authorization server. [`StaticTokenSupplier`]
//! always returns a fixed, caller-supplied token and never contacts the network.

/// Supplier activity counters.
pub mod metrics;

pub use metrics::SupplierMetrics;

// self
use crate::{
	_prelude::*,
	cache::{CacheKey, CachedToken, TokenCache},
	credential::{CredentialDescriptor, TokenSecret},
	error::CredentialError,
	issuer::{TokenExchange, TokenIssuer},
	obs::{self, FlowOutcome, FlowSpan, TokenFlow},
};

/// Default safety margin ensuring a token handed to a caller remains valid long enough to
/// complete the outgoing request.
pub const DEFAULT_LEEWAY: Duration = Duration::seconds(30);

/// Boxed future returned by [`TokenSupplier::get_token`].
pub type SupplierFuture<'a> = Pin<Box<dyn Future<Output = Result<TokenSecret>> + 'a + Send>>;

/// Contract for components that produce a currently-valid bearer token on demand.
pub trait TokenSupplier
where
	Self: Send + Sync,
{
	/// Returns a token guaranteed to remain valid for at least the supplier's leeway window.
	fn get_token(&self) -> SupplierFuture<'_>;
}

/// Trivial supplier that always returns the fixed token supplied at construction.
///
/// Never contacts the network and never caches; used when no refresh is desired.
#[derive(Clone, Debug)]
pub struct StaticTokenSupplier {
	token: TokenSecret,
}
impl StaticTokenSupplier {
	/// Creates a supplier for the provided token; fails on an empty token.
	pub fn new(token: impl Into<String>) -> Result<Self, CredentialError> {
		let token = token.into();

		if token.is_empty() {
			return Err(CredentialError::EmptyToken);
		}

		Ok(Self { token: TokenSecret::new(token) })
	}
}
impl TokenSupplier for StaticTokenSupplier {
	fn get_token(&self) -> SupplierFuture<'_> {
		obs::record_flow_outcome(TokenFlow::Static, FlowOutcome::Attempt);

		let token = self.token.clone();

		Box::pin(async move {
			obs::record_flow_outcome(TokenFlow::Static, FlowOutcome::Success);

			Ok(token)
		})
	}
}

/// Supplier that caches issued tokens and refreshes them through the issuer when stale.
///
/// Bound to exactly one client-credentials descriptor; the binder creates one supplier per
/// distinct descriptor identity and reuses it so the caching benefit is preserved.
pub struct ManagedTokenSupplier {
	exchange: TokenExchange,
	key: CacheKey,
	cache: TokenCache,
	issuer: Arc<dyn TokenIssuer>,
	leeway: Duration,
	refresh_guard: AsyncMutex<()>,
	metrics: Arc<SupplierMetrics>,
}
impl ManagedTokenSupplier {
	/// Creates a supplier bound to the provided descriptor, sharing the given cache and issuer.
	///
	/// Static-token descriptors are rejected; they have nothing to refresh.
	pub fn new(
		descriptor: &CredentialDescriptor,
		cache: TokenCache,
		issuer: Arc<dyn TokenIssuer>,
	) -> Result<Self, CredentialError> {
		let exchange = TokenExchange::from_descriptor(descriptor)
			.ok_or(CredentialError::StaticTokenNotRefreshable)?;
		let key = CacheKey::from_descriptor(descriptor)
			.ok_or(CredentialError::StaticTokenNotRefreshable)?;

		Ok(Self {
			exchange,
			key,
			cache,
			issuer,
			leeway: DEFAULT_LEEWAY,
			refresh_guard: AsyncMutex::new(()),
			metrics: Default::default(),
		})
	}

	/// Overrides the expiry leeway (defaults to [`DEFAULT_LEEWAY`]; negative values clamp to
	/// zero).
	pub fn with_leeway(mut self, leeway: Duration) -> Self {
		self.leeway = if leeway.is_negative() { Duration::ZERO } else { leeway };

		self
	}

	/// Cache key identifying the principal this supplier serves.
	pub fn cache_key(&self) -> &CacheKey {
		&self.key
	}

	/// Shared handle to this supplier's activity counters.
	pub fn metrics(&self) -> Arc<SupplierMetrics> {
		self.metrics.clone()
	}

	async fn resolve(&self) -> Result<TokenSecret> {
		let span = FlowSpan::new(TokenFlow::Managed, "get_token");

		obs::record_flow_outcome(TokenFlow::Managed, FlowOutcome::Attempt);
		self.metrics.record_request();

		let result = span
			.instrument(async move {
				if let Some(cached) = self.fresh_cached() {
					self.metrics.record_cache_hit();

					return Ok(cached.value);
				}

				let _singleflight = self.refresh_guard.lock().await;

				// Another caller may have refreshed while we waited for the guard.
				if let Some(cached) = self.fresh_cached() {
					self.metrics.record_cache_hit();

					return Ok(cached.value);
				}

				let issued = self.issuer.request_token(&self.exchange).await?;

				self.metrics.record_issuance();

				let expires_at = OffsetDateTime::now_utc() + issued.expires_in;

				self.cache
					.put(self.key.clone(), CachedToken { value: issued.access_token.clone(), expires_at });

				Ok(issued.access_token)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(TokenFlow::Managed, FlowOutcome::Success),
			Err(_) => {
				self.metrics.record_failure();
				obs::record_flow_outcome(TokenFlow::Managed, FlowOutcome::Failure);
			},
		}

		result
	}

	fn fresh_cached(&self) -> Option<CachedToken> {
		let now = OffsetDateTime::now_utc();

		self.cache.get(&self.key).filter(|token| token.is_fresh_at(now, self.leeway))
	}
}
impl Debug for ManagedTokenSupplier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ManagedTokenSupplier")
			.field("key", &self.key.fingerprint())
			.field("leeway", &self.leeway)
			.finish()
	}
}
impl TokenSupplier for ManagedTokenSupplier {
	fn get_token(&self) -> SupplierFuture<'_> {
		Box::pin(self.resolve())
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicU64, Ordering};
	// self
	use super::*;
	use crate::{error::AcquisitionError, issuer::IssuedToken};

	struct CountingIssuer {
		calls: AtomicU64,
		expires_in: Duration,
	}
	impl CountingIssuer {
		fn new(expires_in: Duration) -> Arc<Self> {
			Arc::new(Self { calls: AtomicU64::new(0), expires_in })
		}
	}
	impl TokenIssuer for CountingIssuer {
		fn request_token<'a>(
			&'a self,
			_exchange: &'a crate::issuer::TokenExchange,
		) -> crate::issuer::IssuerFuture<'a> {
			Box::pin(async move {
				let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

				Ok(IssuedToken {
					access_token: TokenSecret::new(format!("token-{call}")),
					expires_in: self.expires_in,
				})
			})
		}
	}

	struct FailingIssuer;
	impl TokenIssuer for FailingIssuer {
		fn request_token<'a>(
			&'a self,
			_exchange: &'a crate::issuer::TokenExchange,
		) -> crate::issuer::IssuerFuture<'a> {
			Box::pin(async move {
				Err(AcquisitionError::Endpoint { status: 503, body: "unavailable".into() })
			})
		}
	}

	fn descriptor() -> CredentialDescriptor {
		CredentialDescriptor::client_credentials("https://tenant.example.com", "id", "secret")
			.expect("Descriptor fixture should build successfully.")
	}

	#[tokio::test]
	async fn static_supplier_returns_the_constructed_value_forever() {
		let supplier = StaticTokenSupplier::new("fixed-token")
			.expect("Static supplier should accept a non-empty token.");

		for _ in 0..3 {
			let token =
				supplier.get_token().await.expect("Static supplier should never fail at use time.");

			assert_eq!(token.expose(), "fixed-token");
		}
	}

	#[test]
	fn static_supplier_rejects_empty_tokens() {
		assert!(matches!(StaticTokenSupplier::new(""), Err(CredentialError::EmptyToken)));
	}

	#[test]
	fn managed_supplier_rejects_static_descriptors() {
		let descriptor = CredentialDescriptor::static_token("https://tenant.example.com", "fixed")
			.expect("Static descriptor fixture should build successfully.");

		assert!(matches!(
			ManagedTokenSupplier::new(
				&descriptor,
				TokenCache::default(),
				Arc::new(FailingIssuer),
			),
			Err(CredentialError::StaticTokenNotRefreshable),
		));
	}

	#[tokio::test]
	async fn first_call_issues_and_later_calls_hit_the_cache() {
		let issuer = CountingIssuer::new(Duration::seconds(3600));
		let supplier =
			ManagedTokenSupplier::new(&descriptor(), TokenCache::default(), issuer.clone())
				.expect("Managed supplier should build from a client-credentials descriptor.");

		for _ in 0..3 {
			let token = supplier.get_token().await.expect("Token resolution should succeed.");

			assert_eq!(token.expose(), "token-1");
		}

		assert_eq!(issuer.calls.load(Ordering::SeqCst), 1);

		let metrics = supplier.metrics();

		assert_eq!(metrics.requests(), 3);
		assert_eq!(metrics.cache_hits(), 2);
		assert_eq!(metrics.issuances(), 1);
		assert_eq!(metrics.failures(), 0);
	}

	#[tokio::test]
	async fn tokens_expiring_inside_the_leeway_are_reissued() {
		let issuer = CountingIssuer::new(DEFAULT_LEEWAY);
		let supplier =
			ManagedTokenSupplier::new(&descriptor(), TokenCache::default(), issuer.clone())
				.expect("Managed supplier should build from a client-credentials descriptor.");
		let first = supplier.get_token().await.expect("First resolution should succeed.");
		// expires_at == now + leeway, so the closed comparison marks it stale immediately.
		let second = supplier.get_token().await.expect("Second resolution should succeed.");

		assert_eq!(first.expose(), "token-1");
		assert_eq!(second.expose(), "token-2");
		assert_eq!(issuer.calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn audiences_get_independent_cache_entries_and_issuances() {
		let issuer = CountingIssuer::new(Duration::seconds(3600));
		let cache = TokenCache::default();
		let custom = CredentialDescriptor::builder("https://tenant.example.com")
			.client_credentials("id", "secret")
			.audience("https://other-api.example.com/")
			.build()
			.expect("Custom-audience descriptor should build successfully.");
		let default_audience =
			ManagedTokenSupplier::new(&descriptor(), cache.clone(), issuer.clone())
				.expect("Default-audience supplier should build successfully.");
		let custom_audience = ManagedTokenSupplier::new(&custom, cache.clone(), issuer.clone())
			.expect("Custom-audience supplier should build successfully.");

		default_audience.get_token().await.expect("Default-audience resolution should succeed.");
		custom_audience.get_token().await.expect("Custom-audience resolution should succeed.");

		assert_eq!(issuer.calls.load(Ordering::SeqCst), 2);
		assert_eq!(cache.len(), 2);
	}

	#[tokio::test]
	async fn failed_refresh_leaves_the_cached_token_untouched() {
		let cache = TokenCache::default();
		let supplier =
			ManagedTokenSupplier::new(&descriptor(), cache.clone(), Arc::new(FailingIssuer))
				.expect("Managed supplier should build from a client-credentials descriptor.");
		// Prime the cache with a token that is already inside the leeway window but not yet past
		// its own expiry.
		let expires_at = OffsetDateTime::now_utc() + Duration::seconds(10);
		let primed = CachedToken::new("still-valid", expires_at);

		cache.put(supplier.cache_key().clone(), primed.clone());

		let error = supplier
			.get_token()
			.await
			.expect_err("A failing issuer should surface an acquisition error.");

		assert!(matches!(error, Error::Acquisition(AcquisitionError::Endpoint { status: 503, .. })));
		assert_eq!(
			cache
				.get(supplier.cache_key())
				.expect("The primed token should still be cached after the failed refresh."),
			primed,
		);
		assert_eq!(supplier.metrics().failures(), 1);
	}

	#[tokio::test]
	async fn concurrent_callers_share_a_single_issuance() {
		let issuer = CountingIssuer::new(Duration::seconds(3600));
		let supplier = Arc::new(
			ManagedTokenSupplier::new(&descriptor(), TokenCache::default(), issuer.clone())
				.expect("Managed supplier should build from a client-credentials descriptor."),
		);
		let (first, second) = tokio::join!(supplier.get_token(), supplier.get_token());
		let first = first.expect("First concurrent resolution should succeed.");
		let second = second.expect("Second concurrent resolution should succeed.");

		assert_eq!(first.expose(), "token-1");
		assert_eq!(second.expose(), "token-1");
		assert_eq!(issuer.calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn negative_leeway_clamps_to_zero() {
		let issuer = CountingIssuer::new(Duration::seconds(3600));
		let supplier =
			ManagedTokenSupplier::new(&descriptor(), TokenCache::default(), issuer.clone())
				.expect("Managed supplier should build from a client-credentials descriptor.")
				.with_leeway(Duration::seconds(-5));

		supplier.get_token().await.expect("Resolution should succeed with a clamped leeway.");
		supplier.get_token().await.expect("Second resolution should hit the cache.");

		assert_eq!(issuer.calls.load(Ordering::SeqCst), 1);
	}
}

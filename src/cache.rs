//! In-memory token cache keyed by credential identity.
//!
//! The cache maps a [`CacheKey`] — derived deterministically from the base URL, audience, and
//! client id — to the most recently issued token and its expiry instant. Entries are created
//! lazily on first request for a key, replaced wholesale on refresh, and never deleted; value
//! and expiry always travel together as one unit.

// std
use std::{
	hash::{Hash, Hasher},
	sync::OnceLock,
};
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	credential::{CredentialDescriptor, CredentialGrant, TokenSecret},
};

/// Identity of a logical principal: two descriptors with the same triple share a cache slot,
/// distinct credential sets or audiences never do.
#[derive(Debug, Default)]
pub struct CacheKey {
	/// Normalized tenant base URL.
	pub base_url: String,
	/// Audience the cached tokens target.
	pub audience: String,
	/// OAuth client identifier.
	pub client_id: String,
	/// Lazily computed fingerprint of the triple.
	pub fingerprint_cache: OnceLock<String>,
}
impl CacheKey {
	/// Builds a key from the identity triple.
	pub fn new(
		base_url: impl Into<String>,
		audience: impl Into<String>,
		client_id: impl Into<String>,
	) -> Self {
		Self {
			base_url: base_url.into(),
			audience: audience.into(),
			client_id: client_id.into(),
			fingerprint_cache: OnceLock::new(),
		}
	}

	/// Derives the key for a client-credentials descriptor; `None` for static-token descriptors,
	/// which have nothing to cache.
	pub fn from_descriptor(descriptor: &CredentialDescriptor) -> Option<Self> {
		match &descriptor.grant {
			CredentialGrant::ClientCredentials { client_id, audience, .. } =>
				Some(Self::new(descriptor.base_url.clone(), audience.clone(), client_id.clone())),
			CredentialGrant::StaticToken { .. } => None,
		}
	}

	/// Stable fingerprint of the identity triple, safe to put in spans and logs.
	///
	/// The fingerprint is a base64 (no padding) encoding of the SHA-256 digest over the triple
	/// and is cached after the first calculation.
	pub fn fingerprint(&self) -> String {
		self.fingerprint_cache.get_or_init(|| compute_fingerprint(self)).clone()
	}
}
impl Clone for CacheKey {
	fn clone(&self) -> Self {
		Self {
			base_url: self.base_url.clone(),
			audience: self.audience.clone(),
			client_id: self.client_id.clone(),
			fingerprint_cache: OnceLock::new(),
		}
	}
}
impl PartialEq for CacheKey {
	fn eq(&self, other: &Self) -> bool {
		self.base_url == other.base_url
			&& self.audience == other.audience
			&& self.client_id == other.client_id
	}
}
impl Eq for CacheKey {}
impl Hash for CacheKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.base_url.hash(state);
		self.audience.hash(state);
		self.client_id.hash(state);
	}
}

fn compute_fingerprint(key: &CacheKey) -> String {
	let mut hasher = Sha256::new();

	hasher.update(key.base_url.as_bytes());
	hasher.update([0]);
	hasher.update(key.audience.as_bytes());
	hasher.update([0]);
	hasher.update(key.client_id.as_bytes());

	STANDARD_NO_PAD.encode(hasher.finalize())
}

/// Most recently issued token for a cache key, paired with its absolute expiry instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedToken {
	/// The access token value.
	pub value: TokenSecret,
	/// Instant at which the token stops being valid.
	pub expires_at: OffsetDateTime,
}
impl CachedToken {
	/// Creates a new cached token.
	pub fn new(value: impl Into<String>, expires_at: OffsetDateTime) -> Self {
		Self { value: TokenSecret::new(value), expires_at }
	}

	/// Returns `true` while the token remains valid for at least the leeway window.
	///
	/// The comparison is closed: a token expiring exactly at the leeway boundary is treated as
	/// expired, never as valid.
	pub fn is_fresh_at(&self, now: OffsetDateTime, leeway: Duration) -> bool {
		now + leeway < self.expires_at
	}
}

type CacheMap = Arc<RwLock<HashMap<CacheKey, CachedToken>>>;

/// Thread-safe shared handle over the key → token map.
///
/// Cloning the handle shares the underlying map; each client instance owns its own cache and
/// nothing survives process teardown.
#[derive(Clone, Debug, Default)]
pub struct TokenCache(CacheMap);
impl TokenCache {
	/// Fetches the cached token for a key, if present.
	pub fn get(&self, key: &CacheKey) -> Option<CachedToken> {
		self.0.read().get(key).cloned()
	}

	/// Stores a token for a key, replacing any prior entry.
	pub fn put(&self, key: CacheKey, token: CachedToken) {
		self.0.write().insert(key, token);
	}

	/// Number of populated cache slots.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no entry has been populated yet.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::datetime;
	// self
	use super::*;

	#[test]
	fn descriptors_with_equal_triples_share_a_key() {
		let a = CredentialDescriptor::client_credentials("https://t.example.com", "id", "secret-1")
			.expect("First descriptor fixture should build successfully.");
		let b = CredentialDescriptor::client_credentials("https://t.example.com", "id", "secret-2")
			.expect("Second descriptor fixture should build successfully.");
		let key_a = CacheKey::from_descriptor(&a)
			.expect("Client-credentials descriptors should produce a cache key.");
		let key_b = CacheKey::from_descriptor(&b)
			.expect("Client-credentials descriptors should produce a cache key.");

		assert_eq!(key_a, key_b);
		assert_eq!(key_a.fingerprint(), key_b.fingerprint());
	}

	#[test]
	fn audience_partitions_cache_keys() {
		let base = CredentialDescriptor::client_credentials("https://t.example.com", "id", "secret")
			.expect("Default-audience descriptor should build successfully.");
		let custom = CredentialDescriptor::builder("https://t.example.com")
			.client_credentials("id", "secret")
			.audience("https://other-api.example.com/")
			.build()
			.expect("Custom-audience descriptor should build successfully.");
		let key_base = CacheKey::from_descriptor(&base)
			.expect("Client-credentials descriptors should produce a cache key.");
		let key_custom = CacheKey::from_descriptor(&custom)
			.expect("Client-credentials descriptors should produce a cache key.");

		assert_ne!(key_base, key_custom);
		assert_ne!(key_base.fingerprint(), key_custom.fingerprint());
	}

	#[test]
	fn static_descriptors_have_no_cache_key() {
		let descriptor = CredentialDescriptor::static_token("https://t.example.com", "fixed")
			.expect("Static descriptor fixture should build successfully.");

		assert!(CacheKey::from_descriptor(&descriptor).is_none());
	}

	#[test]
	fn freshness_boundary_is_closed() {
		let issued_at = datetime!(2025-01-01 00:00 UTC);
		let token = CachedToken::new("token-a", issued_at + Duration::seconds(3600));
		let leeway = Duration::seconds(10);

		assert!(token.is_fresh_at(issued_at, leeway));
		assert!(token.is_fresh_at(issued_at + Duration::seconds(3000), leeway));
		assert!(token.is_fresh_at(issued_at + Duration::seconds(3589), leeway));
		// Exactly at expires_at - leeway: stale, fail-safe direction.
		assert!(!token.is_fresh_at(issued_at + Duration::seconds(3590), leeway));
		assert!(!token.is_fresh_at(issued_at + Duration::seconds(3591), leeway));
		assert!(!token.is_fresh_at(issued_at + Duration::seconds(3600), leeway));
		assert!(!token.is_fresh_at(issued_at + Duration::seconds(4000), leeway));
	}

	#[test]
	fn put_replaces_prior_entries_wholesale() {
		let cache = TokenCache::default();
		let key = CacheKey::new("https://t.example.com", "aud", "id");
		let first = CachedToken::new("token-a", datetime!(2025-01-01 01:00 UTC));
		let second = CachedToken::new("token-b", datetime!(2025-01-01 02:00 UTC));

		assert!(cache.is_empty());
		assert!(cache.get(&key).is_none());

		cache.put(key.clone(), first);
		cache.put(key.clone(), second.clone());

		assert_eq!(cache.len(), 1);
		assert_eq!(
			cache.get(&key).expect("Replaced entry should remain retrievable."),
			second,
		);
	}

	#[test]
	fn cloned_handles_share_the_map() {
		let cache = TokenCache::default();
		let handle = cache.clone();
		let key = CacheKey::new("https://t.example.com", "aud", "id");

		cache.put(key.clone(), CachedToken::new("shared", datetime!(2025-01-01 01:00 UTC)));

		assert_eq!(
			handle
				.get(&key)
				.expect("Cloned handles should observe writes made through each other.")
				.value
				.expose(),
			"shared",
		);
	}
}

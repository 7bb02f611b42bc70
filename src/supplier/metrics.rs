// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing managed-supplier activity.
#[derive(Debug, Default)]
pub struct SupplierMetrics {
	requests: AtomicU64,
	cache_hits: AtomicU64,
	issuances: AtomicU64,
	failures: AtomicU64,
}
impl SupplierMetrics {
	/// Returns the total number of token requests served.
	pub fn requests(&self) -> u64 {
		self.requests.load(Ordering::Relaxed)
	}

	/// Returns the number of requests answered from the cache without an issuer call.
	pub fn cache_hits(&self) -> u64 {
		self.cache_hits.load(Ordering::Relaxed)
	}

	/// Returns the number of successful issuer exchanges.
	pub fn issuances(&self) -> u64 {
		self.issuances.load(Ordering::Relaxed)
	}

	/// Returns the number of failed issuer exchanges.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_request(&self) {
		self.requests.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_cache_hit(&self) {
		self.cache_hits.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_issuance(&self) {
		self.issuances.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}

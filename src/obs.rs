//! Optional observability helpers for token suppliers.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `token_supplier.flow` with the `flow`
//!   (supplier kind) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `token_supplier_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.
//!
//! Spans and metrics never carry token or secret material; redaction is enforced by
//! [`TokenSecret`](crate::credential::TokenSecret).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Supplier kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenFlow {
	/// Cache-backed client-credentials supplier.
	Managed,
	/// Fixed-token supplier.
	Static,
}
impl TokenFlow {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenFlow::Managed => "managed",
			TokenFlow::Static => "static",
		}
	}
}
impl Display for TokenFlow {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a supplier operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

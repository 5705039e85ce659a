//! Optional observability helpers for exchange and follow flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `xbl_follow.flow` with the `flow` and
//!   `stage` fields, plus warn-level events for operator notices.
//! - Enable `metrics` to increment the `xbl_follow_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorization code → session token chain.
	Exchange,
	/// Repeated exchange attempts feeding the token store.
	Generate,
	/// Gamertag → XUID lookup.
	Resolve,
	/// Follow mutation.
	Follow,
	/// Store-wide follow pass.
	Batch,
	/// Token store access.
	Store,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::Exchange => "exchange",
			FlowKind::Generate => "generate",
			FlowKind::Resolve => "resolve",
			FlowKind::Follow => "follow",
			FlowKind::Batch => "batch",
			FlowKind::Store => "store",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure reported back to the caller.
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

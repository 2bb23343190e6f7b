//! Optional observability helpers for service calls.
//!
//! # Feature Flags
//!
//! - `tracing`: every call and refresh runs in a `tailor_client.call` span carrying `stage` and
//!   `service`; swallowed refresh failures are logged at WARN.
//! - `metrics`: `tailor_client_call_total{stage, outcome}` counts attempts, successes, and
//!   failures per stage.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

/// Where in a call an event happened; used as the `stage` span field and metric label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallStage {
	/// The caller-facing request, including its single retry.
	Request,
	/// Refresh performed because the stored token was absent, invalid, or near expiry.
	ProactiveRefresh,
	/// Refresh performed after the service answered 401.
	ReactiveRefresh,
}
impl CallStage {
	/// Stable label for span fields and metric labels.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Request => "request",
			Self::ProactiveRefresh => "proactive_refresh",
			Self::ReactiveRefresh => "reactive_refresh",
		}
	}
}

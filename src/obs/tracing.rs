// self
use crate::{_prelude::*, obs::CallStage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by call stages.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided stage + target service.
	pub fn new(stage: CallStage, service: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("tailor_client.call", stage = stage.as_str(), service);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, service);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a refresh failure that the call flow recovers from.
pub fn log_refresh_failure(stage: CallStage, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(stage = stage.as_str(), %error, "token refresh failed; continuing with the held token");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (stage, error);
	}
}

/// Logs a storage write failure after a successful refresh.
pub fn log_store_failure(error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(%error, "refreshed token could not be persisted");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}

/// Logs the single retry issued after a 401.
pub fn log_retry(service: &str, path: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(service, path, "retrying request with refreshed token");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (service, path);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = CallSpan::new(CallStage::Request, "designs");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[test]
	fn log_helpers_accept_any_error() {
		let err = std::io::Error::other("boom");

		log_refresh_failure(CallStage::ReactiveRefresh, &err);
		log_store_failure(&err);
		log_retry("designs", "/designs");
	}
}

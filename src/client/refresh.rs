//! Cookie-authenticated access token refresh.
//!
//! The refresh endpoint identifies the session through the cookie the auth service set
//! at login, so the request carries no bearer token and no body. A refresh only counts
//! as successful when the service answers 2xx with `success: true` and a non-empty
//! `accessToken`; anything else is a [`RefreshError`] that the call flow logs and
//! swallows.

// crates.io
use http::Method;
// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	client::{ApiClient, request},
	error::{ConfigError, TransportError},
	http::{HttpRequest, HttpTransport},
	obs::{self, CallOutcome, CallSpan, CallStage},
	store,
};

/// Default path of the refresh endpoint on the auth service.
pub const DEFAULT_REFRESH_PATH: &str = "/refresh-token";

/// JSON body returned by the refresh endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
	/// Whether the service issued a new token.
	#[serde(default)]
	pub success: bool,
	/// Newly issued access token.
	pub access_token: Option<String>,
}

/// Reasons a refresh attempt did not produce a token.
#[derive(Debug, ThisError)]
pub enum RefreshError {
	/// The refresh endpoint could not be resolved.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The refresh request failed at the network level.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The refresh endpoint answered with a non-2xx status.
	#[error("Refresh endpoint answered with status {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
	},
	/// The refresh endpoint body was not the expected JSON.
	#[error("Refresh endpoint returned a malformed body.")]
	Malformed(#[source] serde_json::Error),
	/// The refresh endpoint declined to issue a token.
	#[error("Refresh endpoint did not issue a token.")]
	Rejected,
}

impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Requests a new access token and writes it under both storage keys.
	///
	/// A storage write failure is logged and does not fail the refresh; the returned
	/// token is still usable for the current call.
	pub async fn refresh_access_token(&self) -> Result<AccessToken, RefreshError> {
		let token = self.request_new_token().await?;

		if let Err(err) = store::save_access_token(self.store.as_ref(), &token).await {
			obs::log_store_failure(&err);
		}

		Ok(token)
	}

	/// Runs one refresh for the call flow, swallowing and logging any failure.
	pub(crate) async fn refresh_for(&self, stage: CallStage) -> Option<AccessToken> {
		let span = CallSpan::new(stage, &self.refresh.service);

		obs::record_call_outcome(stage, CallOutcome::Attempt);
		self.metrics.record_refresh_attempt();

		let result = span.instrument(self.refresh_access_token()).await;

		obs::record_call_outcome(stage, CallOutcome::from(&result));

		match result {
			Ok(token) => {
				self.metrics.record_refresh_success();

				Some(token)
			},
			Err(err) => {
				obs::log_refresh_failure(stage, &err);
				self.metrics.record_refresh_failure();

				None
			},
		}
	}

	async fn request_new_token(&self) -> Result<AccessToken, RefreshError> {
		let url = self.registry.resolve(&self.refresh.service)?.join(&self.refresh.path)?;
		let request = HttpRequest {
			method: Method::POST,
			url,
			headers: request::default_headers(),
			body: None,
		};
		let response = self.transport.execute(request).await?;

		if !response.is_success() {
			return Err(RefreshError::Status { status: response.status.as_u16() });
		}

		let body = serde_json::from_slice::<RefreshResponse>(&response.body)
			.map_err(RefreshError::Malformed)?;

		match body {
			RefreshResponse { success: true, access_token: Some(token) } if !token.is_empty() =>
				Ok(AccessToken::new(token)),
			_ => Err(RefreshError::Rejected),
		}
	}
}

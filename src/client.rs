//! Authenticated service calls with proactive refresh and a single 401 retry.
//!
//! [`ApiClient::call`] runs one logical request against a named service:
//!
//! 1. Resolve the service base URL; unknown names fail before any I/O.
//! 2. Load the stored access token and refresh it first when it is absent, undecodable, or
//!    expires inside the safety window.
//! 3. Send the request with the JSON content type, the bearer token when one is held, and
//!    the caller's headers on top.
//! 4. On 401, refresh once and re-issue the request once with the new token.
//! 5. Map a final non-2xx response to [`ApiCallError`], otherwise decode the JSON body.
//!
//! Refresh failures never fail a call on their own; the caller only sees the outcome of
//! the final request. Concurrent calls may refresh at the same time; the last stored
//! token wins.

pub mod metrics;
pub mod refresh;
pub mod request;

pub use metrics::CallMetrics;
pub use refresh::*;
pub use request::*;

// crates.io
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{self, AccessToken, DEFAULT_REFRESH_WINDOW},
	error::ApiCallError,
	http::{HttpRequest, HttpResponse, HttpTransport},
	obs::{self, CallOutcome, CallSpan, CallStage},
	registry::{AUTH_SERVICE, ServiceRegistry},
	store::{self, TokenStore},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Where and when the client refreshes access tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshConfig {
	/// Logical service hosting the refresh endpoint.
	pub service: String,
	/// Path of the refresh endpoint, appended verbatim to the service base URL.
	pub path: String,
	/// Tokens expiring within this window are refreshed before use.
	pub window: Duration,
}
impl Default for RefreshConfig {
	fn default() -> Self {
		Self {
			service: AUTH_SERVICE.into(),
			path: DEFAULT_REFRESH_PATH.into(),
			window: DEFAULT_REFRESH_WINDOW,
		}
	}
}

/// Performs authenticated calls against services listed in a [`ServiceRegistry`].
///
/// Cloning is cheap; clones share the transport, store, registry, and metrics.
pub struct ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Transport used for every outbound request, refreshes included.
	pub transport: Arc<T>,
	/// Key-value store holding the access token.
	pub store: Arc<dyn TokenStore>,
	/// Service name to base URL mapping.
	pub registry: Arc<ServiceRegistry>,
	/// Refresh endpoint and safety window.
	pub refresh: RefreshConfig,
	metrics: Arc<CallMetrics>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		registry: impl Into<Arc<ServiceRegistry>>,
		store: Arc<dyn TokenStore>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		Self {
			transport: transport.into(),
			store,
			registry: registry.into(),
			refresh: RefreshConfig::default(),
			metrics: Default::default(),
		}
	}

	/// Overrides the service hosting the refresh endpoint (defaults to `auth`).
	pub fn with_refresh_service(mut self, service: impl Into<String>) -> Self {
		self.refresh.service = service.into();

		self
	}

	/// Overrides the refresh endpoint path (defaults to `/refresh-token`).
	pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh.path = path.into();

		self
	}

	/// Overrides the proactive refresh window (defaults to 30 seconds).
	pub fn with_refresh_window(mut self, window: Duration) -> Self {
		self.refresh.window = if window.is_negative() { Duration::ZERO } else { window };

		self
	}

	/// Counters shared by every clone of this client.
	pub fn metrics(&self) -> &CallMetrics {
		&self.metrics
	}

	/// Issues a `GET` and returns the parsed JSON body.
	pub async fn get(&self, service: &str, path: &str) -> Result<Value> {
		self.call(service, path, RequestOptions::default()).await
	}

	/// Performs one authenticated call and returns the parsed JSON body.
	pub async fn call(&self, service: &str, path: &str, options: RequestOptions) -> Result<Value> {
		self.call_json(service, path, options).await
	}

	/// Performs one authenticated call and decodes the JSON body into `R`.
	pub async fn call_json<R>(&self, service: &str, path: &str, options: RequestOptions) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let response = self.send(service, path, options).await?;

		decode_json(&response)
	}

	async fn send(&self, service: &str, path: &str, options: RequestOptions) -> Result<HttpResponse> {
		const STAGE: CallStage = CallStage::Request;

		let url = self.registry.resolve(service)?.join(path)?;
		let body = options.body.as_ref().map(RequestBody::encode).transpose()?;
		let span = CallSpan::new(STAGE, service);

		obs::record_call_outcome(STAGE, CallOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut token = store::load_access_token(self.store.as_ref()).await?;

				if auth::needs_refresh(token.as_ref(), OffsetDateTime::now_utc(), self.refresh.window) {
					if let Some(fresh) = self.refresh_for(CallStage::ProactiveRefresh).await {
						token = Some(fresh);
					}
				}

				let response = self.execute(&options, &url, &body, token.as_ref()).await?;

				if response.status != StatusCode::UNAUTHORIZED {
					return finish(response);
				}

				let Some(fresh) = self.refresh_for(CallStage::ReactiveRefresh).await else {
					return finish(response);
				};

				obs::log_retry(service, path);
				self.metrics.record_retry();

				let retried = self.execute(&options, &url, &body, Some(&fresh)).await?;

				finish(retried)
			})
			.await;

		obs::record_call_outcome(STAGE, CallOutcome::from(&result));

		result
	}

	async fn execute(
		&self,
		options: &RequestOptions,
		url: &Url,
		body: &Option<Vec<u8>>,
		token: Option<&AccessToken>,
	) -> Result<HttpResponse> {
		let request = HttpRequest {
			method: options.method.clone(),
			url: url.clone(),
			headers: options.headers_for(token)?,
			body: body.clone(),
		};

		self.metrics.record_request();

		Ok(self.transport.execute(request).await?)
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a client with its own reqwest transport and cookie jar.
	pub fn new(
		registry: impl Into<Arc<ServiceRegistry>>,
		store: Arc<dyn TokenStore>,
	) -> Result<Self> {
		Ok(Self::with_transport(registry, store, ReqwestTransport::new()?))
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			registry: self.registry.clone(),
			refresh: self.refresh.clone(),
			metrics: self.metrics.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + HttpTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("registry", &self.registry)
			.field("refresh", &self.refresh)
			.field("metrics", &self.metrics)
			.finish()
	}
}

fn finish(response: HttpResponse) -> Result<HttpResponse> {
	if response.is_success() {
		Ok(response)
	} else {
		Err(ApiCallError { status: response.status.as_u16(), message: error_message(&response) }
			.into())
	}
}

/// Picks a string `message`, then `error`, from a JSON error body; falls back to the
/// status line.
fn error_message(response: &HttpResponse) -> String {
	serde_json::from_slice::<Value>(&response.body)
		.ok()
		.and_then(|body| {
			["message", "error"].into_iter().find_map(|field| {
				body.get(field).and_then(Value::as_str).filter(|s| !s.is_empty()).map(str::to_owned)
			})
		})
		.unwrap_or_else(|| response.status_line())
}

fn decode_json<R>(response: &HttpResponse) -> Result<R>
where
	R: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(&response.body);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| Error::Parse { source, status: response.status.as_u16() })
}

#[cfg(test)]
mod tests {
	// crates.io
	use http::HeaderMap;
	// self
	use super::*;

	fn response(status: u16, body: &str) -> HttpResponse {
		HttpResponse {
			status: StatusCode::from_u16(status).expect("Status fixture should be valid."),
			headers: HeaderMap::new(),
			body: body.as_bytes().to_vec(),
		}
	}

	#[test]
	fn error_message_prefers_message_then_error() {
		assert_eq!(error_message(&response(400, r#"{"message":"Invalid chest size"}"#)), "Invalid chest size");
		assert_eq!(error_message(&response(409, r#"{"error":"Tailor unavailable"}"#)), "Tailor unavailable");
		assert_eq!(
			error_message(&response(400, r#"{"message":"","error":"Bad fabric id"}"#)),
			"Bad fabric id"
		);
		assert_eq!(error_message(&response(400, r#"{"message":42}"#)), "400 Bad Request");
		assert_eq!(error_message(&response(502, "<html>Bad gateway</html>")), "502 Bad Gateway");
	}

	#[test]
	fn finish_maps_non_success_to_api_error() {
		let err = finish(response(404, r#"{"message":"Design not found"}"#))
			.expect_err("404 should become an API error.");

		assert!(matches!(err, Error::Api(ApiCallError { status: 404, .. })));
		assert_eq!(err.to_string(), "API call failed: Design not found");
		assert!(finish(response(201, "{}")).is_ok());
	}

	#[test]
	fn decode_reports_path_and_status() {
		#[derive(Debug, Deserialize)]
		struct Booking {
			#[allow(dead_code)]
			id: String,
		}

		let err = decode_json::<Booking>(&response(200, r#"{"id":7}"#))
			.expect_err("Mismatched types should fail to decode.");

		match err {
			Error::Parse { source, status } => {
				assert_eq!(status, 200);
				assert_eq!(source.path().to_string(), "id");
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}
		assert!(matches!(decode_json::<Value>(&response(200, "not json")), Err(Error::Parse { .. })));
	}

	#[test]
	fn refresh_config_defaults() {
		let config = RefreshConfig::default();

		assert_eq!(config.service, "auth");
		assert_eq!(config.path, "/refresh-token");
		assert_eq!(config.window, Duration::seconds(30));
	}
}

//! Transport primitives for service calls.
//!
//! [`HttpTransport`] is the client's only dependency on an HTTP stack. Requests and
//! responses are fully buffered so the call flow can inspect a 401 body, refresh, and
//! still report the original response when the retry budget is spent.

pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::cookie::Jar;
// self
use crate::{_prelude::*, error::TransportError};
#[cfg(feature = "reqwest")] use crate::error::ConfigError;

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + 'a + Send>>;

/// Executes fully-buffered HTTP requests.
///
/// Implementations must send cookies held for the target origin with every request
/// (the equivalent of `credentials: include`), since the refresh endpoint authenticates
/// through a session cookie rather than the bearer token.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Sends `request` and buffers the whole response.
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_>;
}

/// Outbound request handed to an [`HttpTransport`].
#[derive(Clone, Debug)]
pub struct HttpRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Final header set.
	pub headers: HeaderMap,
	/// Encoded body, if any.
	pub body: Option<Vec<u8>>,
}

/// Buffered response returned by an [`HttpTransport`].
#[derive(Clone, Debug)]
pub struct HttpResponse {
	/// Response status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpResponse {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// `"<code> <reason>"`, or just the code when the status has no canonical reason.
	pub fn status_line(&self) -> String {
		match self.status.canonical_reason() {
			Some(reason) => format!("{} {reason}", self.status.as_u16()),
			None => self.status.as_u16().to_string(),
		}
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Clients built through [`ReqwestTransport::new`] or [`ReqwestTransport::with_cookie_jar`]
/// keep a cookie jar so session cookies set by the auth service travel with later
/// calls. A client supplied through [`ReqwestTransport::with_client`] is used as is.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	cookies: Option<Arc<Jar>>,
}
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport with a fresh, empty cookie jar.
	pub fn new() -> Result<Self, ConfigError> {
		Self::with_cookie_jar(Arc::new(Jar::default()))
	}

	/// Builds a transport around a shared cookie jar.
	pub fn with_cookie_jar(jar: Arc<Jar>) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().cookie_provider(jar.clone()).build()?;

		Ok(Self { client, cookies: Some(jar) })
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client, cookies: None }
	}

	/// Cookie jar shared with the underlying client, when this transport owns one.
	pub fn cookie_jar(&self) -> Option<&Arc<Jar>> {
		self.cookies.as_ref()
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.client
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: HttpRequest) -> TransportFuture<'_> {
		let client = self.client.clone();

		Box::pin(async move {
			let HttpRequest { method, url, headers, body } = request;
			let mut builder = client.request(method, url).headers(headers);

			if let Some(body) = body {
				builder = builder.body(body);
			}

			let response = builder.send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(HttpResponse { status, headers, body })
		})
	}
}

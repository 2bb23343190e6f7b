//! Caller-supplied request options and header/body assembly.

// crates.io
use http::{
	HeaderMap, HeaderName, HeaderValue, Method,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde_json::Value;
// self
use crate::{_prelude::*, auth::AccessToken, error::ConfigError};

/// Body attached to a request.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
	/// Serialized with `serde_json` before sending.
	Json(Value),
	/// Sent verbatim; the caller already encoded it.
	Text(String),
}
impl RequestBody {
	/// Encodes the body into the bytes placed on the wire.
	pub fn encode(&self) -> Result<Vec<u8>, ConfigError> {
		match self {
			Self::Json(value) => serde_json::to_vec(value).map_err(ConfigError::BodySerialize),
			Self::Text(text) => Ok(text.as_bytes().to_vec()),
		}
	}
}

/// Optional method, headers, and body for a call. Defaults to a bare `GET`.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
	/// HTTP method.
	pub method: Method,
	/// Headers merged over the client defaults; these win on conflict.
	pub headers: HeaderMap,
	/// Optional request body.
	pub body: Option<RequestBody>,
}
impl RequestOptions {
	/// Creates options for a `GET` without headers or body.
	pub fn new() -> Self {
		Self::default()
	}

	/// Shorthand for a `POST`.
	pub fn post() -> Self {
		Self::new().method(Method::POST)
	}

	/// Shorthand for a `PUT`.
	pub fn put() -> Self {
		Self::new().method(Method::PUT)
	}

	/// Shorthand for a `PATCH`.
	pub fn patch() -> Self {
		Self::new().method(Method::PATCH)
	}

	/// Shorthand for a `DELETE`.
	pub fn delete() -> Self {
		Self::new().method(Method::DELETE)
	}

	/// Overrides the method.
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;

		self
	}

	/// Adds a caller header; repeated names keep every value.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.append(name, value);

		self
	}

	/// Serializes `body` to JSON.
	pub fn json<B>(mut self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		let value = serde_json::to_value(body).map_err(ConfigError::BodySerialize)?;

		self.body = Some(RequestBody::Json(value));

		Ok(self)
	}

	/// Attaches an already-built JSON value.
	pub fn json_value(mut self, value: Value) -> Self {
		self.body = Some(RequestBody::Json(value));

		self
	}

	/// Attaches a pre-encoded string body, sent verbatim.
	pub fn text(mut self, body: impl Into<String>) -> Self {
		self.body = Some(RequestBody::Text(body.into()));

		self
	}

	/// Builds the final header set: JSON content type, bearer token when held, then the
	/// caller's headers replacing any default with the same name.
	pub fn headers_for(&self, token: Option<&AccessToken>) -> Result<HeaderMap, ConfigError> {
		let mut headers = default_headers();

		if let Some(token) = token {
			let mut value = HeaderValue::from_str(&token.bearer())
				.map_err(|_| ConfigError::InvalidHeaderValue { name: "authorization" })?;

			value.set_sensitive(true);
			headers.insert(AUTHORIZATION, value);
		}
		for name in self.headers.keys() {
			headers.remove(name);
		}
		for (name, value) in &self.headers {
			headers.append(name.clone(), value.clone());
		}

		Ok(headers)
	}
}

/// Headers sent on every request, including refresh calls.
pub(crate) fn default_headers() -> HeaderMap {
	let mut headers = HeaderMap::new();

	headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

	headers
}

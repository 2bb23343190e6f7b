//! Client-level error types shared across the registry, stores, transports, and calls.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Token storage failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem; raised before any network I/O.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The service answered with a non-2xx status.
	#[error(transparent)]
	Api(#[from] ApiCallError),

	/// A successful response carried a body that could not be decoded.
	#[error("Service returned a body that is not the expected JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// The requested service is not present in the registry.
	#[error("Unknown service `{name}`.")]
	UnknownService {
		/// Logical service name supplied by the caller.
		name: String,
	},
	/// A service name failed validation.
	#[error(transparent)]
	InvalidServiceName(#[from] crate::registry::ServiceNameError),
	/// A registry base URL cannot be parsed.
	#[error("Base URL for service `{service}` is invalid.")]
	InvalidBaseUrl {
		/// Service whose URL failed to parse.
		service: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A registry base URL uses something other than HTTP(S).
	#[error("Base URL for service `{service}` must use http or https, got `{scheme}`.")]
	UnsupportedScheme {
		/// Service whose URL was rejected.
		service: String,
		/// Rejected scheme.
		scheme: String,
	},
	/// Base URL plus path did not form a valid URL.
	#[error("Request URL `{url}` is invalid.")]
	InvalidRequestUrl {
		/// Concatenated URL that failed to parse.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A header value built by the client contains invalid characters.
	#[error("Header `{name}` has an invalid value.")]
	InvalidHeaderValue {
		/// Header name.
		name: &'static str,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized to JSON.")]
	BodySerialize(#[source] serde_json::Error),
	/// Registry configuration could not be loaded.
	#[error("Service registry could not be loaded: {message}.")]
	RegistryLoad {
		/// Human-readable reason.
		message: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Final non-OK response surfaced to the caller.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("API call failed: {message}")]
pub struct ApiCallError {
	/// HTTP status code of the final response.
	pub status: u16,
	/// Best-effort human-readable message extracted from the response.
	pub message: String,
}

/// Transport-level failures.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

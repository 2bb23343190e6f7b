//! Service registry mapping logical service names to base URLs.
//!
//! The registry is resolved once at startup. Every name referenced by a call must be
//! present; lookups never fall back to a default service. Paths are appended to the
//! configured base URL verbatim, so `https://api.example.com/v1` + `/designs` resolves
//! to `https://api.example.com/v1/designs`.

pub mod builder;
pub mod name;

pub use builder::*;
pub use name::*;

// std
use std::{env, fs, path::Path};
// self
use crate::{_prelude::*, error::ConfigError};

/// Logical name of the service hosting the refresh endpoint by default.
pub const AUTH_SERVICE: &str = "auth";
/// Environment variable prefix consumed by [`ServiceRegistry::from_env`].
pub const ENV_PREFIX: &str = "TAILOR_SERVICE_";

/// Validated base URL for a single service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceEndpoint {
	base_url: String,
}
impl ServiceEndpoint {
	/// Returns the base URL exactly as configured.
	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Appends `path` to the base URL verbatim and parses the result.
	pub fn join(&self, path: &str) -> Result<Url, ConfigError> {
		let url = format!("{}{path}", self.base_url);

		Url::parse(&url).map_err(|source| ConfigError::InvalidRequestUrl { url, source })
	}
}

/// Immutable mapping from [`ServiceName`] to [`ServiceEndpoint`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceRegistry {
	services: BTreeMap<ServiceName, ServiceEndpoint>,
}
impl ServiceRegistry {
	/// Creates a new builder.
	pub fn builder() -> ServiceRegistryBuilder {
		ServiceRegistryBuilder::new()
	}

	/// Resolves a logical name, failing fast when it is not registered.
	pub fn resolve(&self, name: &str) -> Result<&ServiceEndpoint, ConfigError> {
		self.services
			.get(name)
			.ok_or_else(|| ConfigError::UnknownService { name: name.to_owned() })
	}

	/// Returns `true` when `name` is registered.
	pub fn contains(&self, name: &str) -> bool {
		self.services.contains_key(name)
	}

	/// Iterates over registered services in name order.
	pub fn iter(&self) -> impl Iterator<Item = (&ServiceName, &ServiceEndpoint)> {
		self.services.iter()
	}

	/// Number of registered services.
	pub fn len(&self) -> usize {
		self.services.len()
	}

	/// Returns `true` when no service is registered.
	pub fn is_empty(&self) -> bool {
		self.services.is_empty()
	}

	/// Parses a JSON object of `{ "name": "base url" }` pairs.
	pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
		let entries: BTreeMap<String, String> = serde_json::from_slice(bytes)
			.map_err(|e| ConfigError::RegistryLoad { message: e.to_string() })?;

		Self::builder().services(entries).build()
	}

	/// Loads a JSON registry file.
	pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let bytes = fs::read(path).map_err(|e| ConfigError::RegistryLoad {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		Self::from_json_slice(&bytes)
	}

	/// Builds a registry from `TAILOR_SERVICE_<NAME>` process environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_vars(env::vars())
	}

	/// Builds a registry from `TAILOR_SERVICE_<NAME>=<url>` pairs.
	///
	/// `<NAME>` is lowercased and underscores become dashes, so
	/// `TAILOR_SERVICE_AI_MEASUREMENT` registers `ai-measurement`. Other variables are
	/// ignored.
	pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: Into<String>,
	{
		let mut builder = Self::builder();

		for (key, value) in vars {
			if let Some(raw) = key.as_ref().strip_prefix(ENV_PREFIX) {
				builder = builder.service(raw.to_ascii_lowercase().replace('_', "-"), value);
			}
		}

		builder.build()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn registry() -> ServiceRegistry {
		ServiceRegistry::builder()
			.service("auth", "https://auth.example.com")
			.service("designs", "https://api.example.com/v1")
			.build()
			.expect("Registry fixture should build.")
	}

	#[test]
	fn resolve_fails_fast_for_unknown_names() {
		let err = registry().resolve("payments").expect_err("Unknown names must be rejected.");

		assert!(matches!(err, ConfigError::UnknownService { ref name } if name == "payments"));
		assert_eq!(err.to_string(), "Unknown service `payments`.");
	}

	#[test]
	fn join_appends_path_verbatim() {
		let registry = registry();
		let designs = registry.resolve("designs").expect("Designs service should resolve.");

		assert_eq!(
			designs.join("/designs?page=2").expect("Joined URL should parse.").as_str(),
			"https://api.example.com/v1/designs?page=2"
		);
		assert_eq!(registry.len(), 2);
		assert!(registry.contains("auth"));
	}

	#[test]
	fn builder_rejects_bad_urls_and_schemes() {
		let err = ServiceRegistry::builder()
			.service("auth", "not a url")
			.build()
			.expect_err("Unparsable URLs must be rejected.");

		assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }));

		let err = ServiceRegistry::builder()
			.service("auth", "ftp://auth.example.com")
			.build()
			.expect_err("Non-HTTP schemes must be rejected.");

		assert!(matches!(err, ConfigError::UnsupportedScheme { ref scheme, .. } if scheme == "ftp"));

		let err = ServiceRegistry::builder()
			.service("my service", "https://example.com")
			.build()
			.expect_err("Invalid names must be rejected.");

		assert!(matches!(err, ConfigError::InvalidServiceName(_)));
	}

	#[test]
	fn json_registry_loads() {
		let registry = ServiceRegistry::from_json_slice(
			br#"{"auth":"http://localhost:4000","bookings":"http://localhost:4004"}"#,
		)
		.expect("JSON registry should load.");

		assert_eq!(
			registry.resolve("bookings").expect("Bookings should resolve.").base_url(),
			"http://localhost:4004"
		);
		assert!(matches!(
			ServiceRegistry::from_json_slice(b"[1, 2]"),
			Err(ConfigError::RegistryLoad { .. })
		));
	}

	#[test]
	fn env_vars_map_to_lowercase_dashed_names() {
		let registry = ServiceRegistry::from_vars([
			("TAILOR_SERVICE_AUTH", "http://localhost:4000"),
			("TAILOR_SERVICE_AI_MEASUREMENT", "http://localhost:5000"),
			("HOME", "/root"),
		])
		.expect("Environment registry should load.");

		assert_eq!(registry.len(), 2);
		assert!(registry.contains("ai-measurement"));
		assert!(registry.contains(AUTH_SERVICE));
	}
}

//! Validating builder for [`ServiceRegistry`](crate::registry::ServiceRegistry).

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	registry::{ServiceEndpoint, ServiceName, ServiceRegistry},
};

/// Builder for [`ServiceRegistry`] values.
///
/// Entries are validated in [`build`](ServiceRegistryBuilder::build); registering the
/// same name twice keeps the last URL.
#[derive(Clone, Debug, Default)]
pub struct ServiceRegistryBuilder {
	entries: Vec<(String, String)>,
}
impl ServiceRegistryBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a logical service name with its base URL.
	pub fn service(mut self, name: impl Into<String>, base_url: impl Into<String>) -> Self {
		self.entries.push((name.into(), base_url.into()));

		self
	}

	/// Registers several services at once.
	pub fn services<I, N, U>(mut self, services: I) -> Self
	where
		I: IntoIterator<Item = (N, U)>,
		N: Into<String>,
		U: Into<String>,
	{
		for (name, base_url) in services {
			self.entries.push((name.into(), base_url.into()));
		}

		self
	}

	/// Consumes the builder and validates every entry.
	pub fn build(self) -> Result<ServiceRegistry, ConfigError> {
		let mut services = BTreeMap::new();

		for (name, base_url) in self.entries {
			let name = ServiceName::new(&name)?;
			let endpoint = validate_base_url(&name, base_url)?;

			services.insert(name, endpoint);
		}

		Ok(ServiceRegistry { services })
	}
}

fn validate_base_url(name: &ServiceName, base_url: String) -> Result<ServiceEndpoint, ConfigError> {
	let parsed = Url::parse(&base_url)
		.map_err(|source| ConfigError::InvalidBaseUrl { service: name.to_string(), source })?;

	match parsed.scheme() {
		"http" | "https" => Ok(ServiceEndpoint { base_url }),
		scheme => Err(ConfigError::UnsupportedScheme {
			service: name.to_string(),
			scheme: scheme.to_owned(),
		}),
	}
}

//! Strongly typed logical service names.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const SERVICE_NAME_MAX_LEN: usize = 128;

/// Error returned when service name validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum ServiceNameError {
	/// The name was empty.
	#[error("Service name cannot be empty.")]
	Empty,
	/// The name contains whitespace characters.
	#[error("Service name `{name}` contains whitespace.")]
	ContainsWhitespace {
		/// Offending name.
		name: String,
	},
	/// The name exceeded the allowed character count.
	#[error("Service name exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Logical name of a backend service (e.g. `auth`, `designs`, `bookings`).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceName(String);
impl ServiceName {
	/// Creates a new service name after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, ServiceNameError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for ServiceName {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ServiceName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for ServiceName {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<ServiceName> for String {
	fn from(value: ServiceName) -> Self {
		value.0
	}
}
impl TryFrom<String> for ServiceName {
	type Error = ServiceNameError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl Debug for ServiceName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Service({})", self.0)
	}
}
impl Display for ServiceName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
impl FromStr for ServiceName {
	type Err = ServiceNameError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

fn validate_view(view: &str) -> Result<(), ServiceNameError> {
	if view.is_empty() {
		return Err(ServiceNameError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(ServiceNameError::ContainsWhitespace { name: view.to_owned() });
	}
	if view.len() > SERVICE_NAME_MAX_LEN {
		return Err(ServiceNameError::TooLong { max: SERVICE_NAME_MAX_LEN });
	}

	Ok(())
}

//! Access token wrapper with redacted formatting and expiry classification.

pub mod claims;

pub use claims::*;

// self
use crate::_prelude::*;

/// Safety window before `exp` inside which a token is refreshed proactively.
pub const DEFAULT_REFRESH_WINDOW: Duration = Duration::seconds(30);

/// Expiry classification of an access token at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenStatus {
	/// Token stays valid beyond the safety window.
	Fresh,
	/// Token is still valid but expires within the safety window.
	NearExpiry,
	/// Token expiry is at or before the instant.
	Expired,
	/// Token payload could not be decoded.
	Invalid,
}
impl TokenStatus {
	/// Returns `true` when the token should be refreshed before use.
	pub const fn needs_refresh(self) -> bool {
		!matches!(self, Self::Fresh)
	}
}

/// Redacted bearer token keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken(String);
impl AccessToken {
	/// Wraps a raw token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw token. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Decodes the payload claims, if the token is well formed.
	pub fn claims(&self) -> Result<TokenClaims, ClaimsError> {
		TokenClaims::decode(&self.0)
	}

	/// Classifies the token at `now` using the provided safety window.
	pub fn status_at(&self, now: OffsetDateTime, window: Duration) -> TokenStatus {
		let Ok(claims) = self.claims() else {
			return TokenStatus::Invalid;
		};
		let now = now.unix_timestamp();

		if claims.exp <= now {
			TokenStatus::Expired
		} else if claims.exp <= now.saturating_add(window.whole_seconds()) {
			TokenStatus::NearExpiry
		} else {
			TokenStatus::Fresh
		}
	}

	/// Value for the `Authorization` header.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.0)
	}
}
impl AsRef<str> for AccessToken {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("AccessToken").field(&"<redacted>").finish()
	}
}
impl Display for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Decides whether a proactive refresh is needed; an absent token always needs one.
pub fn needs_refresh(token: Option<&AccessToken>, now: OffsetDateTime, window: Duration) -> bool {
	token.is_none_or(|token| token.status_at(now, window).needs_refresh())
}

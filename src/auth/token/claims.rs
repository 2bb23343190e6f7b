//! JWT payload decoding limited to what the client needs for expiry checks.
//!
//! Signatures are never verified here; the issuing service owns that. A token that
//! cannot be decoded is reported as invalid and simply triggers a refresh.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::Value;
// self
use crate::_prelude::*;

/// Reasons a token payload could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ClaimsError {
	/// The token is not made of exactly three dot-separated segments.
	#[error("Token has {count} segments, expected 3.")]
	Segments {
		/// Number of segments found.
		count: usize,
	},
	/// The payload segment is not valid base64url.
	#[error("Token payload is not valid base64url.")]
	Base64,
	/// The payload does not decode to a JSON object.
	#[error("Token payload is not a JSON object.")]
	Json,
	/// The payload has no numeric `exp` claim.
	#[error("Token payload has no numeric exp claim.")]
	MissingExp,
}

/// Claims the client reads from an access token payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenClaims {
	/// Expiry instant in Unix seconds.
	pub exp: i64,
}
impl TokenClaims {
	/// Decodes the middle segment of `token`.
	pub fn decode(token: &str) -> Result<Self, ClaimsError> {
		let segments = token.split('.').collect::<Vec<_>>();

		if segments.len() != 3 {
			return Err(ClaimsError::Segments { count: segments.len() });
		}

		let payload = URL_SAFE_NO_PAD
			.decode(segments[1].trim_end_matches('='))
			.map_err(|_| ClaimsError::Base64)?;
		let value = serde_json::from_slice::<Value>(&payload).map_err(|_| ClaimsError::Json)?;
		let object = value.as_object().ok_or(ClaimsError::Json)?;
		let exp = match object.get("exp") {
			Some(Value::Number(n)) => n
				.as_i64()
				.or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64))
				.ok_or(ClaimsError::MissingExp)?,
			_ => return Err(ClaimsError::MissingExp),
		};

		Ok(Self { exp })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn token_with_payload(payload: &str) -> String {
		format!("eyJhbGciOiJIUzI1NiJ9.{}.c2ln", URL_SAFE_NO_PAD.encode(payload))
	}

	#[test]
	fn decodes_integer_and_fractional_exp() {
		let claims = TokenClaims::decode(&token_with_payload(r#"{"sub":"u-1","exp":1700000000}"#))
			.expect("Integer exp should decode.");

		assert_eq!(claims.exp, 1_700_000_000);

		let claims = TokenClaims::decode(&token_with_payload(r#"{"exp":1700000000.9}"#))
			.expect("Fractional exp should decode.");

		assert_eq!(claims.exp, 1_700_000_000);
	}

	#[test]
	fn accepts_padded_payloads() {
		let padded = base64::engine::general_purpose::URL_SAFE.encode(r#"{"exp":42}"#);
		let token = format!("h.{padded}.s");

		assert_eq!(TokenClaims::decode(&token), Ok(TokenClaims { exp: 42 }));
	}

	#[test]
	fn malformed_tokens_are_classified() {
		assert_eq!(TokenClaims::decode("a.b"), Err(ClaimsError::Segments { count: 2 }));
		assert_eq!(TokenClaims::decode("a.b.c.d"), Err(ClaimsError::Segments { count: 4 }));
		assert_eq!(TokenClaims::decode("h.!!!.s"), Err(ClaimsError::Base64));
		assert_eq!(
			TokenClaims::decode(&format!("h.{}.s", URL_SAFE_NO_PAD.encode("not json"))),
			Err(ClaimsError::Json)
		);
		assert_eq!(
			TokenClaims::decode(&token_with_payload(r#"{"sub":"u-1"}"#)),
			Err(ClaimsError::MissingExp)
		);
		assert_eq!(
			TokenClaims::decode(&token_with_payload(r#"{"exp":"tomorrow"}"#)),
			Err(ClaimsError::MissingExp)
		);
	}
}

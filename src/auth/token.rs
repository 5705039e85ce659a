//! Credential artifacts handed from one exchange stage to the next.
//!
//! Every secret-bearing type wraps [`TokenSecret`], so `Debug` and `Display` never print
//! the underlying value. Only [`TokenSecret::expose`] (and the request builders that call
//! it) see the raw string.

// self
use crate::{_prelude::*, auth::IdentifierError};

const SESSION_TOKEN_KIND: &str = "Session token";
const XBL3_PREFIX: &str = "XBL3.0 ";
const USER_HASH_PREFIX: &str = "x=";

/// Redacted secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Short-lived proof of interactive sign-in; consumed once by the exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationCode(TokenSecret);
impl AuthorizationCode {
	/// Wraps a code returned by the identity provider.
	pub fn new(value: impl Into<String>) -> Self {
		Self(TokenSecret::new(value))
	}

	/// Raw code for the token request.
	pub fn secret(&self) -> &str {
		self.0.expose()
	}
}

/// Stage 1 output: the Microsoft account access token.
///
/// The refresh token and lifetime are kept for completeness; nothing downstream renews them.
#[derive(Clone, Debug)]
pub struct AccessToken {
	/// Bearer value fed into the XBL user authentication.
	pub value: TokenSecret,
	/// Refresh token issued alongside the access token.
	pub refresh_value: TokenSecret,
	/// Lifetime reported by the token endpoint.
	pub expires_in: Duration,
}

/// Stage 2 output: the XBL user token scoped to the Xbox Live auth realm.
#[derive(Clone, Debug)]
pub struct PlatformTicket(pub TokenSecret);

/// Stage 3 output: the XSTS token plus the user hash identifying the account.
#[derive(Clone, Debug)]
pub struct SecurityToken {
	/// XSTS token.
	pub ticket: TokenSecret,
	/// `uhs` claim from `DisplayClaims.xui[0]`.
	pub user_hash: String,
}

/// Composite `x=<userHash>;<ticket>` credential used for every authenticated call.
///
/// Immutable once built. A line read back from the token store is accepted verbatim.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(TokenSecret);
impl SessionToken {
	/// Wraps a stored token after trimming; empty values are rejected.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref().trim();

		if view.is_empty() {
			return Err(IdentifierError::Empty { kind: SESSION_TOKEN_KIND });
		}

		Ok(Self(TokenSecret::new(view)))
	}

	/// Composes the session token from a stage 3 result.
	pub fn compose(security: &SecurityToken) -> Self {
		Self(TokenSecret::new(format!(
			"{USER_HASH_PREFIX}{};{}",
			security.user_hash,
			security.ticket.expose()
		)))
	}

	/// Raw token, as persisted in the store.
	pub fn expose(&self) -> &str {
		self.0.expose()
	}

	/// `Authorization` header value for Xbox Live services: `XBL3.0 x=` followed by the raw
	/// token, exactly as persisted.
	pub fn authorization_header(&self) -> String {
		format!("{XBL3_PREFIX}{USER_HASH_PREFIX}{}", self.expose())
	}
}
impl Debug for SessionToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SessionToken").field(&"<redacted>").finish()
	}
}
impl FromStr for SessionToken {
	type Err = IdentifierError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");
		let session =
			SessionToken::new("x=uhs;jwt").expect("Session token fixture should be valid.");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
		assert_eq!(format!("{session:?}"), "SessionToken(\"<redacted>\")");
	}

	#[test]
	fn compose_prefixes_user_hash() {
		let security =
			SecurityToken { ticket: TokenSecret::new("xsts-jwt"), user_hash: "1234".into() };
		let session = SessionToken::compose(&security);

		assert_eq!(session.expose(), "x=1234;xsts-jwt");
	}

	#[test]
	fn authorization_header_prefixes_the_raw_token() {
		let stored =
			SessionToken::new("  x=uhs;xsts\n").expect("Stored token fixture should be valid.");
		let bare = SessionToken::new("1234;xsts-jwt").expect("Bare token should be valid.");

		assert_eq!(stored.expose(), "x=uhs;xsts");
		assert_eq!(stored.authorization_header(), "XBL3.0 x=x=uhs;xsts");
		assert_eq!(bare.authorization_header(), "XBL3.0 x=1234;xsts-jwt");
	}

	#[test]
	fn empty_session_tokens_are_rejected() {
		assert_eq!(
			SessionToken::new(" \t"),
			Err(IdentifierError::Empty { kind: SESSION_TOKEN_KIND })
		);
	}
}

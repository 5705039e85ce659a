//! Provider descriptor data structures and the production Xbox Live preset.

/// Builder API for assembling provider descriptors.
pub mod builder;

pub use builder::*;

// std
use std::time::Duration as StdDuration;
// self
use crate::_prelude::*;

/// Public client identifier used by the Xbox Live sign-in page.
pub const XBOX_LIVE_CLIENT_ID: &str = "000000004C12AE6F";
/// Redirect URI registered for [`XBOX_LIVE_CLIENT_ID`].
pub const XBOX_LIVE_REDIRECT_URI: &str = "http://localhost:8080";
/// Space-delimited scopes requested during sign-in.
pub const XBOX_LIVE_SCOPE: &str = "Xboxlive.signin Xboxlive.offline_access";
/// Per-call timeout applied to every upstream request.
pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(10);

const AUTHORIZATION_URL: &str = "https://login.live.com/oauth20_authorize.srf";
const TOKEN_URL: &str = "https://login.live.com/oauth20_token.srf";
const USER_AUTHENTICATE_URL: &str = "https://user.auth.xboxlive.com/user/authenticate";
const XSTS_AUTHORIZE_URL: &str = "https://xsts.auth.xboxlive.com/xsts/authorize";
const PROFILE_URL: &str = "https://profile.xboxlive.com";
const SOCIAL_URL: &str = "https://social.xboxlive.com";

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
	/// Interactive sign-in page issuing authorization codes.
	pub authorization: Url,
	/// OAuth token endpoint (stage 1).
	pub token: Url,
	/// XBL user authentication endpoint (stage 2).
	pub user_authenticate: Url,
	/// XSTS authorization endpoint (stage 3).
	pub xsts_authorize: Url,
	/// Base URL of the profile service (`/users/gt(..)/profile/settings`).
	pub profile: Url,
	/// Base URL of the social service (`/people/xuids(..)/friends`).
	pub social: Url,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderDescriptor {
	/// OAuth client identifier.
	pub client_id: String,
	/// Redirect URI sent with both the authorize and token requests.
	pub redirect_uri: Url,
	/// Space-delimited scope string.
	pub scope: String,
	/// Endpoint definitions.
	pub endpoints: ProviderEndpoints,
	/// Upper bound for each individual HTTP call.
	pub timeout: StdDuration,
}
impl ProviderDescriptor {
	/// Creates an empty builder.
	pub fn builder() -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::default()
	}

	/// Production Xbox Live descriptor.
	pub fn xbox_live() -> Result<Self, ProviderDescriptorError> {
		Self::builder()
			.client_id(XBOX_LIVE_CLIENT_ID)
			.redirect_uri(parse_url("redirect", XBOX_LIVE_REDIRECT_URI)?)
			.scope(XBOX_LIVE_SCOPE)
			.authorization_endpoint(parse_url("authorization", AUTHORIZATION_URL)?)
			.token_endpoint(parse_url("token", TOKEN_URL)?)
			.user_authenticate_endpoint(parse_url("user_authenticate", USER_AUTHENTICATE_URL)?)
			.xsts_authorize_endpoint(parse_url("xsts_authorize", XSTS_AUTHORIZE_URL)?)
			.profile_endpoint(parse_url("profile", PROFILE_URL)?)
			.social_endpoint(parse_url("social", SOCIAL_URL)?)
			.timeout(DEFAULT_TIMEOUT)
			.build()
	}
}

fn parse_url(endpoint: &'static str, raw: &str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(raw).map_err(|_| ProviderDescriptorError::InvalidUrl { endpoint, url: raw.into() })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn xbox_live_preset_is_valid() {
		let descriptor = ProviderDescriptor::xbox_live().expect("Production preset should build.");

		assert_eq!(descriptor.client_id, XBOX_LIVE_CLIENT_ID);
		assert_eq!(descriptor.scope, XBOX_LIVE_SCOPE);
		assert_eq!(descriptor.redirect_uri.as_str(), "http://localhost:8080/");
		assert_eq!(descriptor.endpoints.token.as_str(), TOKEN_URL);
		assert_eq!(descriptor.endpoints.xsts_authorize.host_str(), Some("xsts.auth.xboxlive.com"));
		assert_eq!(descriptor.timeout, StdDuration::from_secs(10));
	}
}

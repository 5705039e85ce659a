//! Interactive sign-in plumbing: authorize URL, redirect parsing, and the code-source seam.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::AuthorizationCode,
	error::InputError,
	flows::Broker,
	provider::ProviderDescriptor,
};

const STATE_LEN: usize = 32;

/// Boxed future returned by [`AuthorizationCodeSource`].
pub type CodeFuture<'a> = Pin<Box<dyn Future<Output = Option<AuthorizationCode>> + 'a + Send>>;

/// Upstream provider of authorization codes (a browser, a prompt, a test script).
///
/// Returning `None` means no code could be obtained for this request; the caller records the
/// attempt as failed and moves on.
pub trait AuthorizationCodeSource
where
	Self: Send + Sync,
{
	/// Produces one authorization code for `request`, or nothing.
	fn produce_authorization_code<'a>(&'a self, request: &'a AuthorizationRequest)
	-> CodeFuture<'a>;
}

/// Sign-in request handed to an [`AuthorizationCodeSource`].
#[derive(Clone, Debug)]
pub struct AuthorizationRequest {
	/// URL the account holder must open to sign in.
	pub authorize_url: Url,
	/// Opaque state value that must come back on the redirect.
	pub state: String,
	/// Redirect URI the provider sends the browser to.
	pub redirect_uri: Url,
}
impl AuthorizationRequest {
	fn new(descriptor: &ProviderDescriptor) -> Self {
		let state = random_string(STATE_LEN);
		let authorize_url = build_authorize_url(descriptor, &state);

		Self { authorize_url, state, redirect_uri: descriptor.redirect_uri.clone() }
	}

	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: Option<&str>) -> Result<(), InputError> {
		if returned_state == Some(self.state.as_str()) {
			Ok(())
		} else {
			Err(InputError::StateMismatch)
		}
	}

	/// Extracts the authorization code from the URL the browser was redirected to.
	///
	/// Provider errors win over state checks so a cancelled sign-in reports why.
	pub fn parse_redirect(&self, redirect: &str) -> Result<AuthorizationCode, InputError> {
		let url = Url::parse(redirect.trim())
			.map_err(|source| InputError::InvalidRedirect { source })?;
		let mut code = None;
		let mut state = None;
		let mut error = None;
		let mut description = None;

		for (key, value) in url.query_pairs() {
			match key.as_ref() {
				"code" => code = Some(value.into_owned()),
				"state" => state = Some(value.into_owned()),
				"error" => error = Some(value.into_owned()),
				"error_description" => description = Some(value.into_owned()),
				_ => {},
			}
		}

		if let Some(error) = error {
			return Err(InputError::AuthorizationDenied { error, description });
		}

		self.validate_state(state.as_deref())?;

		code.filter(|code| !code.is_empty())
			.map(AuthorizationCode::new)
			.ok_or(InputError::MissingCode)
	}
}

impl Broker {
	/// Starts an interactive sign-in by building the authorize URL with a fresh `state`.
	pub fn start_authorization(&self) -> AuthorizationRequest {
		AuthorizationRequest::new(&self.descriptor)
	}
}

fn build_authorize_url(descriptor: &ProviderDescriptor, state: &str) -> Url {
	let mut url = descriptor.endpoints.authorization.clone();

	url.query_pairs_mut()
		.append_pair("response_type", "code")
		.append_pair("approval_prompt", "auto")
		.append_pair("client_id", &descriptor.client_id)
		.append_pair("scope", &descriptor.scope)
		.append_pair("redirect_uri", descriptor.redirect_uri.as_str())
		.append_pair("state", state);

	url
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	fn request() -> AuthorizationRequest {
		let descriptor = ProviderDescriptor::xbox_live().expect("Production preset should build.");

		AuthorizationRequest::new(&descriptor)
	}

	#[test]
	fn authorize_url_carries_sign_in_parameters() {
		let request = request();
		let pairs: HashMap<_, _> = request.authorize_url.query_pairs().into_owned().collect();

		assert_eq!(request.authorize_url.host_str(), Some("login.live.com"));
		assert_eq!(pairs.get("response_type").map(String::as_str), Some("code"));
		assert_eq!(pairs.get("approval_prompt").map(String::as_str), Some("auto"));
		assert_eq!(pairs.get("client_id").map(String::as_str), Some("000000004C12AE6F"));
		assert_eq!(
			pairs.get("scope").map(String::as_str),
			Some("Xboxlive.signin Xboxlive.offline_access")
		);
		assert_eq!(pairs.get("redirect_uri").map(String::as_str), Some("http://localhost:8080/"));
		assert_eq!(pairs.get("state"), Some(&request.state));
		assert_eq!(request.state.len(), STATE_LEN);
	}

	#[test]
	fn parse_redirect_returns_code_for_matching_state() {
		let request = request();
		let redirect = format!("http://localhost:8080/?code=M.C123&state={}", request.state);
		let code = request.parse_redirect(&redirect).expect("Redirect should yield a code.");

		assert_eq!(code.secret(), "M.C123");
	}

	#[test]
	fn parse_redirect_rejects_bad_input() {
		let request = request();

		assert!(matches!(
			request.parse_redirect("not a url"),
			Err(InputError::InvalidRedirect { .. })
		));
		assert!(matches!(
			request.parse_redirect("http://localhost:8080/?code=abc&state=other"),
			Err(InputError::StateMismatch)
		));
		assert!(matches!(
			request.parse_redirect("http://localhost:8080/?code=abc"),
			Err(InputError::StateMismatch)
		));
		assert!(matches!(
			request.parse_redirect(&format!("http://localhost:8080/?state={}", request.state)),
			Err(InputError::MissingCode)
		));
	}

	#[test]
	fn parse_redirect_surfaces_provider_errors() {
		let request = request();
		let err = request
			.parse_redirect("http://localhost:8080/?error=access_denied&error_description=nope")
			.expect_err("Provider error should be surfaced.");

		assert!(matches!(
			err,
			InputError::AuthorizationDenied { ref error, ref description }
				if error == "access_denied" && description.as_deref() == Some("nope")
		));
	}
}

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	provider::{DEFAULT_TIMEOUT, ProviderDescriptor, ProviderEndpoints},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// A required endpoint was never set.
	#[error("Missing {endpoint} endpoint.")]
	MissingEndpoint {
		/// Which endpoint is missing.
		endpoint: &'static str,
	},
	/// A preset URL failed to parse.
	#[error("The {endpoint} URL is invalid: {url}.")]
	InvalidUrl {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
		/// Raw URL.
		url: String,
	},
	/// Endpoints must use HTTPS unless they point at the local machine.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Client identifier is empty.
	#[error("Client identifier cannot be empty.")]
	EmptyClientId,
	/// Scope string is empty.
	#[error("Scope cannot be empty.")]
	EmptyScope,
	/// Timeout must bound each call.
	#[error("Request timeout must be greater than zero.")]
	ZeroTimeout,
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// OAuth client identifier.
	pub client_id: Option<String>,
	/// Redirect URI registered for the client.
	pub redirect_uri: Option<Url>,
	/// Space-delimited scope string.
	pub scope: Option<String>,
	/// Sign-in page.
	pub authorization_endpoint: Option<Url>,
	/// OAuth token endpoint.
	pub token_endpoint: Option<Url>,
	/// XBL user authentication endpoint.
	pub user_authenticate_endpoint: Option<Url>,
	/// XSTS authorization endpoint.
	pub xsts_authorize_endpoint: Option<Url>,
	/// Profile service base URL.
	pub profile_endpoint: Option<Url>,
	/// Social service base URL.
	pub social_endpoint: Option<Url>,
	/// Per-call timeout.
	pub timeout: StdDuration,
}
impl Default for ProviderDescriptorBuilder {
	fn default() -> Self {
		Self {
			client_id: None,
			redirect_uri: None,
			scope: None,
			authorization_endpoint: None,
			token_endpoint: None,
			user_authenticate_endpoint: None,
			xsts_authorize_endpoint: None,
			profile_endpoint: None,
			social_endpoint: None,
			timeout: DEFAULT_TIMEOUT,
		}
	}
}
impl ProviderDescriptorBuilder {
	/// Sets the OAuth client identifier.
	pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
		self.client_id = Some(client_id.into());

		self
	}

	/// Sets the redirect URI.
	pub fn redirect_uri(mut self, url: Url) -> Self {
		self.redirect_uri = Some(url);

		self
	}

	/// Sets the space-delimited scope string.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Sets the sign-in page.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the OAuth token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the XBL user authentication endpoint.
	pub fn user_authenticate_endpoint(mut self, url: Url) -> Self {
		self.user_authenticate_endpoint = Some(url);

		self
	}

	/// Sets the XSTS authorization endpoint.
	pub fn xsts_authorize_endpoint(mut self, url: Url) -> Self {
		self.xsts_authorize_endpoint = Some(url);

		self
	}

	/// Sets the profile service base URL.
	pub fn profile_endpoint(mut self, url: Url) -> Self {
		self.profile_endpoint = Some(url);

		self
	}

	/// Sets the social service base URL.
	pub fn social_endpoint(mut self, url: Url) -> Self {
		self.social_endpoint = Some(url);

		self
	}

	/// Overrides the per-call timeout (defaults to 10 seconds).
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let endpoints = ProviderEndpoints {
			authorization: required("authorization", self.authorization_endpoint)?,
			token: required("token", self.token_endpoint)?,
			user_authenticate: required("user_authenticate", self.user_authenticate_endpoint)?,
			xsts_authorize: required("xsts_authorize", self.xsts_authorize_endpoint)?,
			profile: required("profile", self.profile_endpoint)?,
			social: required("social", self.social_endpoint)?,
		};
		let descriptor = ProviderDescriptor {
			client_id: self.client_id.unwrap_or_default(),
			redirect_uri: required("redirect", self.redirect_uri)?,
			scope: self.scope.unwrap_or_default(),
			endpoints,
			timeout: self.timeout,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		if self.client_id.trim().is_empty() {
			return Err(ProviderDescriptorError::EmptyClientId);
		}
		if self.scope.trim().is_empty() {
			return Err(ProviderDescriptorError::EmptyScope);
		}
		if self.timeout.is_zero() {
			return Err(ProviderDescriptorError::ZeroTimeout);
		}

		let endpoints = &self.endpoints;

		validate_endpoint("authorization", &endpoints.authorization)?;
		validate_endpoint("token", &endpoints.token)?;
		validate_endpoint("user_authenticate", &endpoints.user_authenticate)?;
		validate_endpoint("xsts_authorize", &endpoints.xsts_authorize)?;
		validate_endpoint("profile", &endpoints.profile)?;
		validate_endpoint("social", &endpoints.social)?;

		Ok(())
	}
}

fn required<T>(endpoint: &'static str, value: Option<T>) -> Result<T, ProviderDescriptorError> {
	value.ok_or(ProviderDescriptorError::MissingEndpoint { endpoint })
}

/// Plain HTTP is tolerated for loopback hosts only.
fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	let loopback = match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
		Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	};

	if url.scheme() == "https" || (url.scheme() == "http" && loopback) {
		Ok(())
	} else {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse descriptor fixture URL.")
	}

	fn complete(base: &str) -> ProviderDescriptorBuilder {
		ProviderDescriptor::builder()
			.client_id("client")
			.redirect_uri(url("http://localhost:8080"))
			.scope("Xboxlive.signin")
			.authorization_endpoint(url(&format!("{base}/authorize")))
			.token_endpoint(url(&format!("{base}/token")))
			.user_authenticate_endpoint(url(&format!("{base}/user/authenticate")))
			.xsts_authorize_endpoint(url(&format!("{base}/xsts/authorize")))
			.profile_endpoint(url(base))
			.social_endpoint(url(base))
	}

	#[test]
	fn loopback_http_is_accepted() {
		let descriptor =
			complete("http://127.0.0.1:9999").build().expect("Loopback descriptor should build.");

		assert_eq!(descriptor.timeout, DEFAULT_TIMEOUT);
		assert!(complete("http://localhost:1").build().is_ok());
	}

	#[test]
	fn remote_http_is_rejected() {
		let err = complete("http://example.com")
			.build()
			.expect_err("Plain HTTP to a remote host should be rejected.");

		assert!(matches!(
			err,
			ProviderDescriptorError::InsecureEndpoint { endpoint: "authorization", .. }
		));
	}

	#[test]
	fn missing_pieces_are_reported() {
		let err = ProviderDescriptor::builder()
			.client_id("client")
			.build()
			.expect_err("Descriptor without endpoints should fail.");

		assert_eq!(err, ProviderDescriptorError::MissingEndpoint { endpoint: "authorization" });
		assert_eq!(
			complete("https://example.com").scope(" ").build(),
			Err(ProviderDescriptorError::EmptyScope)
		);
		assert_eq!(
			complete("https://example.com").timeout(StdDuration::ZERO).build(),
			Err(ProviderDescriptorError::ZeroTimeout)
		);
	}
}

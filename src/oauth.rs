//! OAuth authorization-code exchange (stage 1) built on the `oauth2` crate.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode as OAuthCode, ClientId, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, AuthorizationCode, TokenSecret},
	error::{ConfigError, ExchangeFailure},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::ProviderDescriptor,
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeTokenResponse = oauth2::basic::BasicTokenResponse;

/// Pre-configured OAuth client bound to one descriptor.
///
/// The client id travels in the form body (the Xbox Live client is public), and the scope is
/// added as an extra parameter because the token endpoint expects it on the code exchange.
#[derive(Clone, Debug)]
pub(crate) struct OAuthFacade {
	oauth_client: ConfiguredBasicClient,
	http_client: ReqwestHttpClient,
	scope: String,
}
impl OAuthFacade {
	pub(crate) fn from_descriptor(
		descriptor: &ProviderDescriptor,
		http_client: ReqwestHttpClient,
	) -> Result<Self, ConfigError> {
		let endpoints = &descriptor.endpoints;
		let auth_url = AuthUrl::from_url(endpoints.authorization.clone());
		let token_url = TokenUrl::from_url(endpoints.token.clone());
		let redirect_url = RedirectUrl::new(descriptor.redirect_uri.to_string()).map_err(|_| {
			ConfigError::InvalidEndpoint {
				endpoint: "redirect",
				url: descriptor.redirect_uri.to_string(),
			}
		})?;
		let oauth_client = BasicClient::new(ClientId::new(descriptor.client_id.clone()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url)
			.set_auth_type(AuthType::RequestBody);

		Ok(Self { oauth_client, http_client, scope: descriptor.scope.clone() })
	}

	/// Exchanges an authorization code for the Microsoft account access token.
	pub(crate) async fn exchange_code(
		&self,
		code: &AuthorizationCode,
	) -> Result<AccessToken, ExchangeFailure> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.instrumented(meta.clone());
		let response = self
			.oauth_client
			.exchange_code(OAuthCode::new(code.secret().to_owned()))
			.add_extra_param("scope", self.scope.clone())
			.request_async(&instrumented)
			.await
			.map_err(|err| map_request_error(meta.take(), err))?;

		map_token_response(response)
	}
}

fn map_token_response(response: FacadeTokenResponse) -> Result<AccessToken, ExchangeFailure> {
	let refresh = response
		.refresh_token()
		.ok_or(ExchangeFailure::MissingField { field: "refresh_token" })?;
	let expires_in =
		response.expires_in().ok_or(ExchangeFailure::MissingField { field: "expires_in" })?;
	let expires_in = i64::try_from(expires_in.as_secs()).map_err(|_| {
		ExchangeFailure::Unexpected {
			message: "The expires_in value exceeds the supported range.".into(),
			status: None,
		}
	})?;

	Ok(AccessToken {
		value: TokenSecret::new(response.access_token().secret().to_owned()),
		refresh_value: TokenSecret::new(refresh.secret().to_owned()),
		expires_in: Duration::seconds(expires_in),
	})
}

fn map_request_error(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<ReqwestError>>,
) -> ExchangeFailure {
	let status = meta.as_ref().and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response(status, response),
		RequestTokenError::Request(error) => map_transport_error(status, error),
		RequestTokenError::Parse(source, _body) => ExchangeFailure::Malformed { source, status },
		RequestTokenError::Other(message) => ExchangeFailure::Unexpected {
			message: format!("Token endpoint returned an unexpected response: {message}."),
			status,
		},
	}
}

fn map_server_response(status: Option<u16>, response: BasicErrorResponse) -> ExchangeFailure {
	ExchangeFailure::Rejected {
		status,
		error: response.error().as_ref().to_owned(),
		description: response.error_description().cloned(),
	}
}

fn map_transport_error(
	status: Option<u16>,
	err: HttpClientError<ReqwestError>,
) -> ExchangeFailure {
	match err {
		HttpClientError::Reqwest(inner) => ExchangeFailure::from(*inner),
		HttpClientError::Io(inner) => ExchangeFailure::Transport { source: Box::new(inner) },
		HttpClientError::Http(inner) => ExchangeFailure::Unexpected {
			message: format!("Token request could not be built: {inner}."),
			status,
		},
		HttpClientError::Other(message) => ExchangeFailure::Unexpected {
			message: format!(
				"HTTP client error occurred while calling the token endpoint: {message}."
			),
			status,
		},
		_ => ExchangeFailure::Unexpected {
			message: "HTTP client error occurred while calling the token endpoint.".into(),
			status,
		},
	}
}

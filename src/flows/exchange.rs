//! Authorization code → session token exchange chain.
//!
//! Four strictly ordered stages, each consuming the previous stage's output:
//!
//! 1. OAuth code → Microsoft account access token (`oauth2` crate).
//! 2. Access token → XBL user token (`user.auth.xboxlive.com`).
//! 3. XBL user token → XSTS token plus user hash (`xsts.auth.xboxlive.com`).
//! 4. Compose `x=<userHash>;<xsts>`.
//!
//! No stage is retried, and a failed stage leaves nothing behind.

// crates.io
use reqwest::header::ACCEPT;
// self
use crate::{
	_prelude::*,
	auth::{
		AccessToken, AuthorizationCode, PlatformTicket, SecurityToken, SessionToken, TokenSecret,
	},
	error::{ExchangeFailure, ExchangeStage, TokenExchangeError},
	flows::{Broker, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

const RPS_AUTH_METHOD: &str = "RPS";
const RPS_SITE_NAME: &str = "user.auth.xboxlive.com";
const RPS_TICKET_PREFIX: &str = "d=";
const XBL_RELYING_PARTY: &str = "http://auth.xboxlive.com";
const XSTS_RELYING_PARTY: &str = "http://xboxlive.com";
const XSTS_SANDBOX: &str = "RETAIL";
const JWT_TOKEN_TYPE: &str = "JWT";
const JSON_MEDIA_TYPE: &str = "application/json";

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TicketRequest<'a, P> {
	properties: P,
	relying_party: &'a str,
	token_type: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UserAuthenticateProperties<'a> {
	auth_method: &'a str,
	site_name: &'a str,
	rps_ticket: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct XstsAuthorizeProperties<'a> {
	sandbox_id: &'a str,
	user_tokens: [&'a str; 1],
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct UserAuthenticateResponse {
	token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct XstsAuthorizeResponse {
	token: String,
	display_claims: DisplayClaims,
}

#[derive(Deserialize)]
struct DisplayClaims {
	xui: Vec<UserClaim>,
}

#[derive(Deserialize)]
struct UserClaim {
	uhs: String,
}

impl Broker {
	/// Turns one authorization code into a composite session token.
	///
	/// The returned error names the stage that failed; no partial credential is ever returned.
	pub async fn exchange(
		&self,
		code: &AuthorizationCode,
	) -> Result<SessionToken, TokenExchangeError> {
		const KIND: FlowKind = FlowKind::Exchange;

		let span = FlowSpan::new(KIND, "exchange");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let access = self
					.oauth
					.exchange_code(code)
					.await
					.map_err(|e| TokenExchangeError::new(ExchangeStage::AccessToken, e))?;
				let ticket = self
					.authenticate_user(&access)
					.await
					.map_err(|e| TokenExchangeError::new(ExchangeStage::XblToken, e))?;
				let security = self
					.authorize_xsts(&ticket)
					.await
					.map_err(|e| TokenExchangeError::new(ExchangeStage::XstsToken, e))?;

				Ok::<_, TokenExchangeError>(SessionToken::compose(&security))
			})
			.await;

		obs::record_result(KIND, &result);

		result
	}

	async fn authenticate_user(
		&self,
		access: &AccessToken,
	) -> Result<PlatformTicket, ExchangeFailure> {
		let body = TicketRequest {
			properties: UserAuthenticateProperties {
				auth_method: RPS_AUTH_METHOD,
				site_name: RPS_SITE_NAME,
				rps_ticket: format!("{RPS_TICKET_PREFIX}{}", access.value.expose()),
			},
			relying_party: XBL_RELYING_PARTY,
			token_type: JWT_TOKEN_TYPE,
		};
		let response: UserAuthenticateResponse =
			self.post_ticket(&self.descriptor.endpoints.user_authenticate, &body).await?;

		Ok(PlatformTicket(TokenSecret::new(response.token)))
	}

	async fn authorize_xsts(
		&self,
		ticket: &PlatformTicket,
	) -> Result<SecurityToken, ExchangeFailure> {
		let body = TicketRequest {
			properties: XstsAuthorizeProperties {
				sandbox_id: XSTS_SANDBOX,
				user_tokens: [ticket.0.expose()],
			},
			relying_party: XSTS_RELYING_PARTY,
			token_type: JWT_TOKEN_TYPE,
		};
		let response: XstsAuthorizeResponse =
			self.post_ticket(&self.descriptor.endpoints.xsts_authorize, &body).await?;
		let user_hash = response
			.display_claims
			.xui
			.into_iter()
			.next()
			.map(|claim| claim.uhs)
			.ok_or(ExchangeFailure::MissingField { field: "DisplayClaims.xui[0].uhs" })?;

		Ok(SecurityToken { ticket: TokenSecret::new(response.token), user_hash })
	}

	async fn post_ticket<B, T>(&self, endpoint: &Url, body: &B) -> Result<T, ExchangeFailure>
	where
		B: Serialize,
		T: for<'de> Deserialize<'de>,
	{
		let response = self
			.http_client
			.post(endpoint.clone())
			.header(ACCEPT, JSON_MEDIA_TYPE)
			.json(body)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(common::status_error(response).await.into());
		}

		Ok(common::read_json(response).await?)
	}
}

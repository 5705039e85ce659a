//! Shared fixtures for the integration tests.

#![allow(dead_code)]

// std
use std::{collections::VecDeque, time::Duration as StdDuration};
// crates.io
use httpmock::prelude::*;
use parking_lot::Mutex;
use serde_json::json;
// self
use xbl_follow::{
	auth::{AuthorizationCode, SessionToken},
	flows::{AuthorizationCodeSource, AuthorizationRequest, BatchOptions, Broker, CodeFuture},
	provider::ProviderDescriptor,
	url::Url,
};

pub const TOKEN_PATH: &str = "/oauth20_token.srf";
pub const USER_AUTHENTICATE_PATH: &str = "/user/authenticate";
pub const XSTS_AUTHORIZE_PATH: &str = "/xsts/authorize";

/// Descriptor whose every endpoint lives under `base` (no trailing slash).
pub fn descriptor_at(base: &str) -> ProviderDescriptor {
	descriptor_with_timeout(base, StdDuration::from_secs(5))
}

/// Same as [`descriptor_at`] with a custom per-call timeout.
pub fn descriptor_with_timeout(base: &str, timeout: StdDuration) -> ProviderDescriptor {
	let url = |path: &str| {
		Url::parse(&format!("{base}{path}")).expect("Mock endpoint should parse successfully.")
	};

	ProviderDescriptor::builder()
		.client_id("000000004C12AE6F")
		.redirect_uri(Url::parse("http://localhost:8080").expect("Redirect fixture should parse."))
		.scope("Xboxlive.signin Xboxlive.offline_access")
		.authorization_endpoint(url("/oauth20_authorize.srf"))
		.token_endpoint(url(TOKEN_PATH))
		.user_authenticate_endpoint(url(USER_AUTHENTICATE_PATH))
		.xsts_authorize_endpoint(url(XSTS_AUTHORIZE_PATH))
		.profile_endpoint(url("/"))
		.social_endpoint(url("/"))
		.timeout(timeout)
		.build()
		.expect("Mock descriptor should build successfully.")
}

/// Descriptor whose every endpoint points at `server`.
pub fn descriptor(server: &MockServer) -> ProviderDescriptor {
	descriptor_at(&server.base_url())
}

pub fn broker(server: &MockServer) -> Broker {
	Broker::new(descriptor(server)).expect("Broker should build against the mock server.")
}

pub fn token(value: &str) -> SessionToken {
	SessionToken::new(value).expect("Session token fixture should be valid.")
}

pub fn unpaced() -> BatchOptions {
	BatchOptions { delay: StdDuration::ZERO }
}

/// Hands out pre-scripted codes in order; `None` entries simulate a failed sign-in.
#[derive(Debug, Default)]
pub struct ScriptedCodeSource {
	codes: Mutex<VecDeque<Option<String>>>,
	requests: Mutex<Vec<AuthorizationRequest>>,
}
impl ScriptedCodeSource {
	pub fn new<I, S>(codes: I) -> Self
	where
		I: IntoIterator<Item = Option<S>>,
		S: Into<String>,
	{
		Self {
			codes: Mutex::new(codes.into_iter().map(|code| code.map(Into::into)).collect()),
			requests: Mutex::default(),
		}
	}

	pub fn requests(&self) -> Vec<AuthorizationRequest> {
		self.requests.lock().clone()
	}
}
impl AuthorizationCodeSource for ScriptedCodeSource {
	fn produce_authorization_code<'a>(
		&'a self,
		request: &'a AuthorizationRequest,
	) -> CodeFuture<'a> {
		self.requests.lock().push(request.clone());

		let code = self.codes.lock().pop_front().flatten().map(AuthorizationCode::new);

		Box::pin(async move { code })
	}
}

/// Mocks a successful OAuth token response for `code`.
pub async fn mock_token_success(server: &MockServer, code: &str, access_token: &str) {
	let code = code.to_owned();
	let body = format!(
		"{{\"token_type\":\"bearer\",\"access_token\":\"{access_token}\",\"refresh_token\":\"refresh-{access_token}\",\"expires_in\":86400,\"scope\":\"Xboxlive.signin Xboxlive.offline_access\"}}"
	);

	server
		.mock_async(move |when, then| {
			when.method(POST)
				.path(TOKEN_PATH)
				.form_urlencoded_tuple("grant_type", "authorization_code")
				.form_urlencoded_tuple("code", code);
			then.status(200).header("content-type", "application/json").body(body);
		})
		.await;
}

/// Mocks a successful XBL user authentication for `access_token`.
pub async fn mock_user_authenticate_success(server: &MockServer, access_token: &str, xbl: &str) {
	let request = json!({ "Properties": { "RpsTicket": format!("d={access_token}") } });
	let response = json!({ "Token": xbl, "DisplayClaims": { "xui": [{ "uhs": "unused" }] } });

	server
		.mock_async(move |when, then| {
			when.method(POST).path(USER_AUTHENTICATE_PATH).json_body_includes(request.to_string());
			then.status(200).json_body(response);
		})
		.await;
}

/// Mocks a successful XSTS authorization for `xbl`.
pub async fn mock_xsts_success(server: &MockServer, xbl: &str, xsts: &str, uhs: &str) {
	let request = json!({ "Properties": { "UserTokens": [xbl] } });
	let response = json!({ "Token": xsts, "DisplayClaims": { "xui": [{ "uhs": uhs }] } });

	server
		.mock_async(move |when, then| {
			when.method(POST).path(XSTS_AUTHORIZE_PATH).json_body_includes(request.to_string());
			then.status(200).json_body(response);
		})
		.await;
}

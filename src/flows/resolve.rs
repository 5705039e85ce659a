//! Gamertag → XUID lookup against the profile service.

// crates.io
use reqwest::{
	StatusCode,
	header::{ACCEPT_LANGUAGE, AUTHORIZATION},
};
// self
use crate::{
	_prelude::*,
	auth::{Gamertag, SessionToken, Xuid},
	error::{CallError, ResolutionFailure},
	flows::{Broker, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

const PROFILE_LANGUAGE: &str = "en-US";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileSettingsResponse {
	profile_users: Vec<ProfileUser>,
}

#[derive(Deserialize)]
struct ProfileUser {
	id: Option<String>,
}

impl Broker {
	/// Looks up the XUID behind `gamertag`, authenticated as `token`.
	///
	/// Only an HTTP 200 whose first `profileUsers` entry carries an `id` resolves; every other
	/// outcome is a [`ResolutionFailure`] for this token alone.
	pub async fn resolve(
		&self,
		gamertag: &Gamertag,
		token: &SessionToken,
	) -> Result<Xuid, ResolutionFailure> {
		const KIND: FlowKind = FlowKind::Resolve;

		let span = FlowSpan::new(KIND, "resolve");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.lookup_profile(gamertag, token)).await;

		obs::record_result(KIND, &result);

		result
	}

	async fn lookup_profile(
		&self,
		gamertag: &Gamertag,
		token: &SessionToken,
	) -> Result<Xuid, ResolutionFailure> {
		let target = format!("gt({gamertag})");
		let url = common::service_url(
			&self.descriptor.endpoints.profile,
			["users", target.as_str(), "profile", "settings"],
		);
		let response = self
			.http_client
			.get(url)
			.header(AUTHORIZATION, token.authorization_header())
			.header(common::CONTRACT_VERSION_HEADER, common::CONTRACT_VERSION)
			.header(ACCEPT_LANGUAGE, PROFILE_LANGUAGE)
			.send()
			.await
			.map_err(CallError::from)?;

		if response.status() != StatusCode::OK {
			return Err(common::status_error(response).await.into());
		}

		let settings: ProfileSettingsResponse = common::read_json(response).await?;
		let first = settings.profile_users.into_iter().next().ok_or(ResolutionFailure::NoProfile)?;
		let id = first.id.ok_or(ResolutionFailure::MissingId)?;

		Xuid::new(id).map_err(ResolutionFailure::InvalidId)
	}
}

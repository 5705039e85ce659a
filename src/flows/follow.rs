//! Follow mutation against the social service.

// crates.io
use reqwest::{
	StatusCode,
	header::{ACCEPT, AUTHORIZATION},
};
// self
use crate::{
	_prelude::*,
	auth::{SessionToken, Xuid},
	error::{ActionFailure, CallError},
	flows::{Broker, common},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl Broker {
	/// Follows `xuid` as the account behind `token`.
	///
	/// The social service acknowledges a follow with HTTP 204 and nothing else; any other
	/// status, including other 2xx codes, is reported as [`ActionFailure::Rejected`] with the
	/// response body attached.
	pub async fn follow(&self, xuid: &Xuid, token: &SessionToken) -> Result<(), ActionFailure> {
		const KIND: FlowKind = FlowKind::Follow;

		let span = FlowSpan::new(KIND, "follow");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.add_friend(xuid, token)).await;

		obs::record_result(KIND, &result);

		result
	}

	async fn add_friend(&self, xuid: &Xuid, token: &SessionToken) -> Result<(), ActionFailure> {
		let target = format!("xuids({xuid})");
		let url = common::service_url(
			&self.descriptor.endpoints.social,
			["people", target.as_str(), "friends"],
		);
		let response = self
			.http_client
			.post(url)
			.header(AUTHORIZATION, token.authorization_header())
			.header(common::CONTRACT_VERSION_HEADER, common::CONTRACT_VERSION)
			.header(ACCEPT, "application/json")
			.json(&serde_json::json!({}))
			.send()
			.await
			.map_err(CallError::from)?;

		if response.status() == StatusCode::NO_CONTENT {
			Ok(())
		} else {
			Err(common::status_error(response).await.into())
		}
	}
}

mod support;

// std
use std::{net::TcpListener, time::Duration};
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use support::*;
use xbl_follow::{
	auth::{Gamertag, Xuid},
	error::{ActionFailure, CallError, ResolutionFailure},
	flows::Broker,
};

const PROFILE_PATH: &str = "/users/gt(Foo)/profile/settings";
const FRIENDS_PATH: &str = "/people/xuids(2533274800000001)/friends";

fn gamertag() -> Gamertag {
	Gamertag::new("Foo").expect("Gamertag fixture should be valid.")
}

fn xuid() -> Xuid {
	Xuid::new("2533274800000001").expect("XUID fixture should be valid.")
}

#[tokio::test]
async fn resolve_returns_first_profile_id() {
	let server = MockServer::start_async().await;
	let broker = broker(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(PROFILE_PATH)
				.header("authorization", "XBL3.0 x=x=uhs;xsts")
				.header("x-xbl-contract-version", "2")
				.header("accept-language", "en-US");
			then.status(200).json_body(json!({
				"profileUsers": [
					{ "id": "2533274800000001", "hostId": "2533274800000001", "settings": [] },
					{ "id": "999" }
				]
			}));
		})
		.await;
	let resolved = broker
		.resolve(&gamertag(), &token("x=uhs;xsts"))
		.await
		.expect("Profile lookup should resolve.");

	assert_eq!(resolved, xuid());

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn resolve_requires_exactly_ok() {
	let server = MockServer::start_async().await;
	let broker = broker(&server);

	server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH);
			then.status(202).json_body(json!({ "profileUsers": [{ "id": "1" }] }));
		})
		.await;

	let err = broker
		.resolve(&gamertag(), &token("x=uhs;xsts"))
		.await
		.expect_err("Only HTTP 200 should resolve.");

	assert!(matches!(err, ResolutionFailure::Call(CallError::Status { status: 202, .. })));
}

#[tokio::test]
async fn resolve_reports_missing_profile_data() {
	let server = MockServer::start_async().await;
	let broker = broker(&server);

	server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH).header("authorization", "XBL3.0 x=x=empty;1");
			then.status(200).json_body(json!({ "profileUsers": [] }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH).header("authorization", "XBL3.0 x=x=noid;2");
			then.status(200).json_body(json!({ "profileUsers": [{ "settings": [] }] }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH).header("authorization", "XBL3.0 x=x=shape;3");
			then.status(200).json_body(json!({ "people": [] }));
		})
		.await;

	let empty = broker.resolve(&gamertag(), &token("x=empty;1")).await;
	let no_id = broker.resolve(&gamertag(), &token("x=noid;2")).await;
	let shape = broker.resolve(&gamertag(), &token("x=shape;3")).await;

	assert!(matches!(empty, Err(ResolutionFailure::NoProfile)));
	assert!(matches!(no_id, Err(ResolutionFailure::MissingId)));
	assert!(matches!(
		shape,
		Err(ResolutionFailure::Call(CallError::Malformed { status: 200, .. }))
	));
}

#[tokio::test]
async fn resolve_keeps_retry_after_hints() {
	let server = MockServer::start_async().await;
	let broker = broker(&server);

	server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH);
			then.status(429).header("retry-after", "15").body("{\"code\":\"Throttled\"}");
		})
		.await;

	let err = broker
		.resolve(&gamertag(), &token("x=uhs;xsts"))
		.await
		.expect_err("Throttled lookup should fail.");

	assert!(matches!(
		err,
		ResolutionFailure::Call(CallError::Status { status: 429, retry_after: Some(delay), .. })
			if delay.whole_seconds() == 15
	));
	assert!(err.to_string().contains("retry after 15s"));
}

#[tokio::test]
async fn follow_succeeds_only_on_no_content() {
	let server = MockServer::start_async().await;
	let broker = broker(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path(FRIENDS_PATH)
				.header("authorization", "XBL3.0 x=x=uhs;xsts")
				.header("x-xbl-contract-version", "2")
				.header("content-type", "application/json")
				.header("accept", "application/json")
				.json_body(json!({}));
			then.status(204);
		})
		.await;

	broker
		.follow(&xuid(), &token("x=uhs;xsts"))
		.await
		.expect("HTTP 204 should count as a successful follow.");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn follow_treats_ok_with_body_as_failure() {
	let server = MockServer::start_async().await;
	let broker = broker(&server);

	server
		.mock_async(|when, then| {
			when.method(POST).path(FRIENDS_PATH);
			then.status(200).body("{\"message\":\"already following\"}");
		})
		.await;

	let err = broker
		.follow(&xuid(), &token("x=uhs;xsts"))
		.await
		.expect_err("HTTP 200 should not count as a follow.");

	assert!(matches!(
		err,
		ActionFailure::Rejected(CallError::Status { status: 200, ref body, .. })
			if body.contains("already following")
	));
}

#[tokio::test]
async fn follow_network_failure_is_distinct() {
	let listener =
		TcpListener::bind("127.0.0.1:0").expect("Failed to reserve a local port for the test.");
	let port = listener.local_addr().expect("Reserved port should have an address.").port();

	drop(listener);

	let broker = Broker::new(descriptor_at(&format!("http://127.0.0.1:{port}")))
		.expect("Broker should build against the closed port.");
	let err = broker
		.follow(&xuid(), &token("x=uhs;xsts"))
		.await
		.expect_err("A refused connection should fail the follow.");

	assert!(matches!(err, ActionFailure::Network(_)));
}

#[tokio::test]
async fn slow_calls_time_out_without_a_hard_failure() {
	let server = MockServer::start_async().await;
	let broker = Broker::new(descriptor_with_timeout(
		&server.base_url(),
		Duration::from_millis(300),
	))
	.expect("Broker should build with a short timeout.");

	server
		.mock_async(|when, then| {
			when.method(GET).path(PROFILE_PATH);
			then.status(200)
				.delay(Duration::from_secs(2))
				.json_body(json!({ "profileUsers": [{ "id": "1" }] }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path(FRIENDS_PATH);
			then.status(204).delay(Duration::from_secs(2));
		})
		.await;

	let resolved = broker.resolve(&gamertag(), &token("x=uhs;xsts")).await;
	let followed = broker.follow(&xuid(), &token("x=uhs;xsts")).await;

	assert!(matches!(resolved, Err(ResolutionFailure::Call(CallError::Timeout))));
	assert!(matches!(followed, Err(ActionFailure::Network(CallError::Timeout))));
}

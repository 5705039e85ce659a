//! Shared helpers for the Xbox Live JSON calls (URLs, headers, response decoding).

// crates.io
use reqwest::Response;
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::CallError, http};

/// Header selecting the Xbox Live service contract.
pub const CONTRACT_VERSION_HEADER: &str = "x-xbl-contract-version";
/// Contract version spoken by the profile and social services.
pub const CONTRACT_VERSION: &str = "2";

const BODY_PREVIEW_LEN: usize = 512;

/// Appends path segments to a service base URL, percent-encoding each one.
pub(crate) fn service_url<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
	let mut url = base.clone();

	// Descriptor validation only admits http(s) URLs, which always have a path.
	if let Ok(mut path) = url.path_segments_mut() {
		path.pop_if_empty().extend(segments);
	}

	url
}

/// Decodes a JSON body, keeping the path of the first mismatch.
pub(crate) async fn read_json<T>(response: Response) -> Result<T, CallError>
where
	T: DeserializeOwned,
{
	let status = response.status().as_u16();
	let bytes = response.bytes().await?;
	let de = &mut serde_json::Deserializer::from_slice(&bytes);

	serde_path_to_error::deserialize(de).map_err(|source| CallError::Malformed { source, status })
}

/// Captures status, `Retry-After`, and a body preview from an unexpected response.
pub(crate) async fn status_error(response: Response) -> CallError {
	let status = response.status().as_u16();
	let retry_after = http::parse_retry_after(response.headers());
	let body = response.text().await.map(|text| preview(&text)).unwrap_or_default();

	CallError::Status { status, body, retry_after }
}

/// Truncates a response body for diagnostics.
pub(crate) fn preview(body: &str) -> String {
	let body = body.trim();

	match body.char_indices().nth(BODY_PREVIEW_LEN) {
		Some((cut, _)) => format!("{}…", &body[..cut]),
		None => body.to_owned(),
	}
}

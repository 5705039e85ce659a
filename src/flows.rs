//! Flow orchestrators powered by one configured [`Broker`].
//!
//! - [`authorize`]: sign-in URL construction, redirect parsing, and the authorization-code
//!   source seam.
//! - [`exchange`]: the four-stage code → session token chain.
//! - [`resolve`] / [`follow`]: the two authenticated calls made per stored token.
//! - [`batch`]: the paced, fail-soft pass over every stored token.
//! - [`generate`]: repeated exchanges feeding the token store.

pub mod authorize;
pub mod batch;
pub mod common;
pub mod exchange;
pub mod follow;
pub mod generate;
pub mod resolve;

pub use authorize::*;
pub use batch::*;
pub use generate::*;

// self
use crate::{
	_prelude::*, http::ReqwestHttpClient, oauth::OAuthFacade, provider::ProviderDescriptor,
};

/// Coordinates every Xbox Live call against a single provider descriptor.
///
/// The broker owns the HTTP client and descriptor so individual flows only deal with their
/// own request and response shapes. It holds no per-token state; one broker serves any
/// number of tokens, strictly one call at a time.
#[derive(Clone)]
pub struct Broker {
	/// Provider descriptor that defines endpoints, client identity, and timeout.
	pub descriptor: ProviderDescriptor,
	/// HTTP client used for every outbound request.
	pub http_client: ReqwestHttpClient,
	oauth: OAuthFacade,
}
impl Broker {
	/// Creates a broker with its own reqwest client bounded by the descriptor's timeout.
	pub fn new(descriptor: ProviderDescriptor) -> Result<Self> {
		let http_client = ReqwestHttpClient::with_timeout(descriptor.timeout)?;

		Self::with_http_client(descriptor, http_client)
	}

	/// Creates a broker that reuses a caller-provided client.
	///
	/// The caller is responsible for configuring timeouts and redirect policy on `http_client`.
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		http_client: ReqwestHttpClient,
	) -> Result<Self> {
		let oauth = OAuthFacade::from_descriptor(&descriptor, http_client.clone())?;

		Ok(Self { descriptor, http_client, oauth })
	}
}
impl Debug for Broker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("client_id", &self.descriptor.client_id)
			.field("endpoints", &self.descriptor.endpoints)
			.field("timeout", &self.descriptor.timeout)
			.finish()
	}
}

//! Crate-level error types shared across flows, providers, and stores.

// self
use crate::{_prelude::*, auth::IdentifierError, provider::ProviderDescriptorError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Operator input was missing or invalid; nothing was sent upstream.
	#[error(transparent)]
	Input(#[from] InputError),
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// One stage of the credential exchange failed.
	#[error(transparent)]
	Exchange(#[from] TokenExchangeError),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Operator-facing input failures, raised before any network activity.
#[derive(Debug, ThisError)]
pub enum InputError {
	/// A handle, identifier, or token failed validation.
	#[error(transparent)]
	Identifier(#[from] IdentifierError),
	/// Requested credential count could not be parsed.
	#[error("Expected a whole number of tokens, got `{input}`.")]
	InvalidCount {
		/// Raw operator input.
		input: String,
	},
	/// Requested credential count was zero or negative.
	#[error("Token count must be greater than 0, got {count}.")]
	NonPositiveCount {
		/// Parsed count.
		count: i64,
	},
	/// The pasted redirect URL could not be parsed.
	#[error("Redirect URL is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The redirect carried a `state` different from the one issued.
	#[error("Authorization state mismatch.")]
	StateMismatch,
	/// The identity provider redirected back with an error.
	#[error("Sign-in was rejected: {error}{}.", .description.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
	AuthorizationDenied {
		/// OAuth `error` code.
		error: String,
		/// Optional `error_description`.
		description: Option<String>,
	},
	/// The redirect did not carry a `code` parameter.
	#[error("Redirect URL does not contain an authorization code.")]
	MissingCode,
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Descriptor validation failed.
	#[error(transparent)]
	Descriptor(#[from] ProviderDescriptorError),
	/// An endpoint URL could not be turned into a request target.
	#[error("The {endpoint} endpoint cannot be used as a base URL: {url}.")]
	InvalidEndpoint {
		/// Which endpoint failed.
		endpoint: &'static str,
		/// Offending URL.
		url: String,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Stage of the credential exchange chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeStage {
	/// Authorization code → OAuth access token.
	AccessToken,
	/// Access token → XBL user token.
	XblToken,
	/// XBL user token → XSTS token + user hash.
	XstsToken,
}
impl ExchangeStage {
	/// Returns the stable stage label used in logs and error messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangeStage::AccessToken => "access_token",
			ExchangeStage::XblToken => "xbl_token",
			ExchangeStage::XstsToken => "xsts_token",
		}
	}
}
impl Display for ExchangeStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// A stage-tagged credential exchange failure.
#[derive(Debug, ThisError)]
#[error("Token exchange failed at stage `{stage}`: {failure}")]
pub struct TokenExchangeError {
	/// Stage that failed.
	pub stage: ExchangeStage,
	/// Why it failed.
	#[source]
	pub failure: ExchangeFailure,
}
impl TokenExchangeError {
	/// Tags a failure with its stage.
	pub fn new(stage: ExchangeStage, failure: impl Into<ExchangeFailure>) -> Self {
		Self { stage, failure: failure.into() }
	}
}

/// Reasons a single exchange stage can fail.
#[derive(Debug, ThisError)]
pub enum ExchangeFailure {
	/// Endpoint answered with a non-success status.
	#[error("Endpoint returned HTTP {status}: {body}")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body: String,
	},
	/// OAuth token endpoint returned a structured error.
	#[error("Token endpoint returned an OAuth error: {error}{}", .description.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
	Rejected {
		/// HTTP status code, when available.
		status: Option<u16>,
		/// OAuth `error` code.
		error: String,
		/// Optional `error_description`.
		description: Option<String>,
	},
	/// Request did not complete within the configured timeout.
	#[error("Request timed out.")]
	Timeout,
	/// Network failure (DNS, TCP, TLS).
	#[error("Network error: {source}")]
	Transport {
		/// Transport-specific error.
		#[source]
		source: BoxError,
	},
	/// Response body did not match the expected JSON shape.
	#[error("Response is malformed at `{}`: {}", .source.path(), .source.inner())]
	Malformed {
		/// Structured parsing failure with the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// A required field was absent from an otherwise valid response.
	#[error("Response is missing `{field}`.")]
	MissingField {
		/// Dotted path of the missing field.
		field: &'static str,
	},
	/// Anything else the transport surfaced.
	#[error("{message}")]
	Unexpected {
		/// Human-readable description.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl ExchangeFailure {
	/// HTTP status attached to the failure, if the endpoint answered at all.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::Rejected { status, .. }
			| Self::Malformed { status, .. }
			| Self::Unexpected { status, .. } => *status,
			Self::Timeout | Self::Transport { .. } | Self::MissingField { .. } => None,
		}
	}
}
impl From<ReqwestError> for ExchangeFailure {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::Transport { source: Box::new(e) } }
	}
}
impl From<CallError> for ExchangeFailure {
	fn from(e: CallError) -> Self {
		match e {
			CallError::Timeout => Self::Timeout,
			CallError::Transport { source } => Self::Transport { source },
			CallError::Status { status, body, .. } => Self::Status { status, body },
			CallError::Malformed { source, status } =>
				Self::Malformed { source, status: Some(status) },
		}
	}
}

/// Low-level outcome of one authenticated JSON call, shared by the follow-side flows.
#[derive(Debug, ThisError)]
pub enum CallError {
	/// Request did not complete within the configured timeout.
	#[error("Request timed out.")]
	Timeout,
	/// Network failure (DNS, TCP, TLS).
	#[error("Network error: {source}")]
	Transport {
		/// Transport-specific error.
		#[source]
		source: BoxError,
	},
	/// Endpoint answered with a status other than the expected one.
	#[error("Endpoint returned HTTP {status}{}: {body}", .retry_after.map(|d| format!(" (retry after {}s)", d.whole_seconds())).unwrap_or_default())]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body: String,
		/// `Retry-After` hint, if supplied.
		retry_after: Option<Duration>,
	},
	/// Response body did not match the expected JSON shape.
	#[error("Response is malformed at `{}`: {}", .source.path(), .source.inner())]
	Malformed {
		/// Structured parsing failure with the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code.
		status: u16,
	},
}
impl From<ReqwestError> for CallError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::Transport { source: Box::new(e) } }
	}
}

/// Why a gamertag could not be resolved to an XUID with a given session token.
#[derive(Debug, ThisError)]
pub enum ResolutionFailure {
	/// The lookup call itself failed (transport, status, or body shape).
	#[error("Profile lookup failed: {0}")]
	Call(#[from] CallError),
	/// The lookup succeeded but `profileUsers` was empty.
	#[error("Profile lookup returned no users.")]
	NoProfile,
	/// The first profile carried no `id`.
	#[error("Profile lookup returned a user without an id.")]
	MissingId,
	/// The first profile's `id` is not a usable XUID.
	#[error("Profile lookup returned an unusable id: {0}")]
	InvalidId(#[source] IdentifierError),
}

/// Why the follow call did not succeed.
#[derive(Debug, ThisError)]
pub enum ActionFailure {
	/// The request never produced a response.
	#[error("Follow request failed: {0}")]
	Network(CallError),
	/// The endpoint answered with something other than HTTP 204.
	#[error("Follow request was not accepted: {0}")]
	Rejected(CallError),
}
impl From<CallError> for ActionFailure {
	fn from(e: CallError) -> Self {
		match e {
			CallError::Timeout | CallError::Transport { .. } => Self::Network(e),
			CallError::Status { .. } | CallError::Malformed { .. } => Self::Rejected(e),
		}
	}
}

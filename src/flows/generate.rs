//! Repeated credential exchanges feeding the token store.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::SessionToken,
	error::{InputError, TokenExchangeError},
	flows::{AuthorizationCodeSource, Broker},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::{StoreError, TokenStore},
};

/// Pause inserted between consecutive generation attempts.
pub const DEFAULT_GENERATION_DELAY: StdDuration = StdDuration::from_secs(2);

/// Tunables for [`Broker::generate`].
#[derive(Clone, Debug)]
pub struct GenerationOptions {
	/// Wait before every attempt except the first.
	pub delay: StdDuration,
}
impl Default for GenerationOptions {
	fn default() -> Self {
		Self { delay: DEFAULT_GENERATION_DELAY }
	}
}

/// Why one generation attempt produced no stored token.
#[derive(Debug, ThisError)]
pub enum GenerationFailure {
	/// The code source returned nothing.
	#[error("No authorization code was obtained.")]
	CodeUnavailable,
	/// The exchange chain failed.
	#[error(transparent)]
	Exchange(#[from] TokenExchangeError),
	/// The exchange succeeded but the token could not be saved.
	#[error("Token could not be saved: {0}")]
	Storage(#[from] StoreError),
}

/// Outcome of one generation attempt.
#[derive(Debug)]
pub struct GenerationRecord {
	/// Zero-based attempt number.
	pub attempt: usize,
	/// `None` when a token was exchanged and stored.
	pub failure: Option<GenerationFailure>,
}
impl GenerationRecord {
	/// Returns true if this attempt stored a token.
	pub fn succeeded(&self) -> bool {
		self.failure.is_none()
	}
}

/// Per-attempt results of [`Broker::generate`].
#[derive(Debug)]
pub struct GenerationReport {
	/// Number of attempts requested.
	pub requested: usize,
	/// One record per attempt, in order.
	pub records: Vec<GenerationRecord>,
}
impl GenerationReport {
	/// Number of tokens stored.
	pub fn succeeded(&self) -> usize {
		self.records.iter().filter(|record| record.succeeded()).count()
	}
}
impl Display for GenerationReport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Generated {} of {} token(s).", self.succeeded(), self.requested)
	}
}

/// Parses the operator's requested token count.
pub fn parse_count(input: &str) -> Result<usize, InputError> {
	let input = input.trim();
	let count =
		input.parse::<i64>().map_err(|_| InputError::InvalidCount { input: input.to_owned() })?;

	if count < 1 {
		return Err(InputError::NonPositiveCount { count });
	}

	usize::try_from(count).map_err(|_| InputError::InvalidCount { input: input.to_owned() })
}

impl Broker {
	/// Runs `count` independent sign-in + exchange attempts, appending each token to `store`.
	///
	/// A failed attempt is recorded and the next one starts anyway; only a zero `count` is an
	/// error, raised before any sign-in is requested.
	pub async fn generate(
		&self,
		source: &dyn AuthorizationCodeSource,
		store: &dyn TokenStore,
		count: usize,
		options: &GenerationOptions,
	) -> Result<GenerationReport> {
		const KIND: FlowKind = FlowKind::Generate;

		if count == 0 {
			return Err(InputError::NonPositiveCount { count: 0 }.into());
		}

		let mut records = Vec::new();

		for attempt in 0..count {
			if attempt > 0 && !options.delay.is_zero() {
				tokio::time::sleep(options.delay).await;
			}

			obs::progress(KIND, &format_args!("Generating token {}/{count}.", attempt + 1));
			obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

			let span = FlowSpan::new(KIND, "generate_one");
			let result = span.instrument(self.generate_one(source, store)).await;

			obs::record_result(KIND, &result);

			let failure = result.err();

			if let Some(failure) = &failure {
				obs::notice(KIND, &format_args!("Attempt {} failed: {failure}", attempt + 1));
			}

			records.push(GenerationRecord { attempt, failure });
		}

		Ok(GenerationReport { requested: count, records })
	}

	async fn generate_one(
		&self,
		source: &dyn AuthorizationCodeSource,
		store: &dyn TokenStore,
	) -> Result<SessionToken, GenerationFailure> {
		let request = self.start_authorization();
		let code = source
			.produce_authorization_code(&request)
			.await
			.ok_or(GenerationFailure::CodeUnavailable)?;
		let token = self.exchange(&code).await?;

		store.append(&token).await?;

		Ok(token)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn parse_count_accepts_positive_whole_numbers() {
		assert!(matches!(parse_count(" 3\n"), Ok(3)));
		assert!(matches!(parse_count("9999999999999"), Ok(9_999_999_999_999)));
	}

	#[test]
	fn parse_count_rejects_bad_input() {
		assert!(matches!(parse_count("three"), Err(InputError::InvalidCount { .. })));
		assert!(matches!(parse_count("0"), Err(InputError::NonPositiveCount { count: 0 })));
		assert!(matches!(parse_count("-2"), Err(InputError::NonPositiveCount { count: -2 })));
	}

	#[test]
	fn report_summarizes_successes() {
		let report = GenerationReport {
			requested: 2,
			records: vec![
				GenerationRecord { attempt: 0, failure: None },
				GenerationRecord { attempt: 1, failure: Some(GenerationFailure::CodeUnavailable) },
			],
		};

		assert_eq!(report.succeeded(), 1);
		assert_eq!(report.to_string(), "Generated 1 of 2 token(s).");
	}
}

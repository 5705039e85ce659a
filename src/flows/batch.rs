//! Store-wide follow pass: resolve then follow, once per stored token, paced and fail-soft.

// std
use std::time::Duration as StdDuration;
// self
use crate::{
	_prelude::*,
	auth::{Gamertag, IdentifierError, SessionToken},
	flows::Broker,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::{StoreError, TokenStore},
};

/// Pause inserted between consecutive entries to stay under upstream rate limits.
pub const DEFAULT_BATCH_DELAY: StdDuration = StdDuration::from_secs(2);

/// Tunables for [`Broker::run_batch`] and [`Broker::follow_all`].
#[derive(Clone, Debug)]
pub struct BatchOptions {
	/// Wait before every entry except the first.
	pub delay: StdDuration,
}
impl Default for BatchOptions {
	fn default() -> Self {
		Self { delay: DEFAULT_BATCH_DELAY }
	}
}

/// Why a batch finished without processing any entry.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum BatchNotice {
	/// The token sequence was empty.
	#[error("No session tokens available; generate tokens first.")]
	NoTokens,
	/// The target gamertag failed validation.
	#[error("Invalid gamertag: {0}")]
	InvalidHandle(IdentifierError),
	/// The token store could not be read.
	#[error("Token store unavailable: {0}")]
	StoreUnavailable(StoreError),
}

/// Result of processing one stored token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutcomeRecord {
	/// Zero-based position of the token in the processed sequence.
	pub index: usize,
	/// Whether the gamertag resolved to an XUID with this token.
	pub resolved: bool,
	/// Whether the follow call was acknowledged.
	pub action_succeeded: bool,
	/// Failure reason, when either step failed.
	pub error_detail: Option<String>,
}
impl Display for OutcomeRecord {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let position = self.index + 1;

		match (self.resolved, self.action_succeeded, &self.error_detail) {
			(true, true, _) => write!(f, "token {position}: followed"),
			(true, false, Some(detail)) => write!(f, "token {position}: follow failed: {detail}"),
			(true, false, None) => write!(f, "token {position}: follow failed"),
			(false, _, Some(detail)) =>
				write!(f, "token {position}: could not resolve gamertag: {detail}"),
			(false, _, None) => write!(f, "token {position}: could not resolve gamertag"),
		}
	}
}

/// Per-entry results of one batch pass, in processing order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchReport {
	/// Gamertag the batch targeted, as supplied.
	pub handle: String,
	/// One record per processed token.
	pub records: Vec<OutcomeRecord>,
	/// Set when the batch stopped before the first entry.
	pub notice: Option<BatchNotice>,
}
impl BatchReport {
	/// Report for a pass that stopped before its first entry.
	pub fn aborted(handle: &str, notice: BatchNotice) -> Self {
		Self { handle: handle.to_owned(), records: Vec::new(), notice: Some(notice) }
	}

	/// Number of tokens processed.
	pub fn attempted(&self) -> usize {
		self.records.len()
	}

	/// Number of tokens that resolved the gamertag.
	pub fn resolved(&self) -> usize {
		self.records.iter().filter(|record| record.resolved).count()
	}

	/// Number of acknowledged follows.
	pub fn succeeded(&self) -> usize {
		self.records.iter().filter(|record| record.action_succeeded).count()
	}
}
impl Display for BatchReport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		if let Some(notice) = &self.notice {
			return write!(f, "Nothing processed: {notice}");
		}

		write!(
			f,
			"Followed {} with {} of {} token(s); {} could not resolve the gamertag.",
			self.handle,
			self.succeeded(),
			self.attempted(),
			self.attempted() - self.resolved()
		)
	}
}

/// Loads the tokens a batch would process.
///
/// An unreadable store or an empty one comes back as the matching [`BatchNotice`], never as
/// an error that ends the run.
pub async fn load_tokens(store: &dyn TokenStore) -> Result<Vec<SessionToken>, BatchNotice> {
	match store.load().await {
		Ok(tokens) if tokens.is_empty() => Err(BatchNotice::NoTokens),
		Ok(tokens) => Ok(tokens),
		Err(e) => {
			obs::notice(FlowKind::Store, &e);

			Err(BatchNotice::StoreUnavailable(e))
		},
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BatchState {
	Idle,
	Processing(usize),
	Done,
}

impl Broker {
	/// Loads every stored token and runs [`Broker::run_batch`] over them.
	///
	/// A store that cannot be read ends the pass with a notice instead of an error.
	pub async fn follow_all(
		&self,
		store: &dyn TokenStore,
		handle: &str,
		options: &BatchOptions,
	) -> BatchReport {
		match load_tokens(store).await {
			Ok(tokens) => self.run_batch(handle, &tokens, options).await,
			Err(notice) => BatchReport::aborted(handle, notice),
		}
	}

	/// Resolves `handle` and follows it once per token, strictly in order.
	///
	/// An empty token sequence or an invalid handle ends the pass before any network call.
	/// No entry's failure stops the entries after it.
	pub async fn run_batch(
		&self,
		handle: &str,
		tokens: &[SessionToken],
		options: &BatchOptions,
	) -> BatchReport {
		const KIND: FlowKind = FlowKind::Batch;

		let span = FlowSpan::new(KIND, "run_batch");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let report = span.instrument(self.drive(handle, tokens, options)).await;

		if report.notice.is_some() {
			obs::record_flow_outcome(KIND, FlowOutcome::Failure);
		} else {
			obs::record_flow_outcome(KIND, FlowOutcome::Success);
		}

		report
	}

	async fn drive(
		&self,
		handle: &str,
		tokens: &[SessionToken],
		options: &BatchOptions,
	) -> BatchReport {
		let mut state = BatchState::Idle;
		let mut gamertag = None;
		let mut records = Vec::with_capacity(tokens.len());

		loop {
			state = match state {
				BatchState::Idle => {
					if tokens.is_empty() {
						return self.abort(handle, BatchNotice::NoTokens);
					}

					match Gamertag::new(handle) {
						Ok(value) => gamertag = Some(value),
						Err(e) => return self.abort(handle, BatchNotice::InvalidHandle(e)),
					}

					obs::progress(
						FlowKind::Batch,
						&format_args!("Processing {} token(s) for {handle}.", tokens.len()),
					);

					BatchState::Processing(0)
				},
				BatchState::Processing(index) => {
					let (Some(gamertag), Some(token)) = (gamertag.as_ref(), tokens.get(index))
					else {
						break;
					};

					if index > 0 && !options.delay.is_zero() {
						tokio::time::sleep(options.delay).await;
					}

					obs::progress(
						FlowKind::Batch,
						&format_args!("[{}/{}] Processing token.", index + 1, tokens.len()),
					);

					let record = self.process_entry(index, gamertag, token).await;

					if record.error_detail.is_some() {
						obs::notice(FlowKind::Batch, &record);
					}

					records.push(record);

					if index + 1 < tokens.len() {
						BatchState::Processing(index + 1)
					} else {
						BatchState::Done
					}
				},
				BatchState::Done => break,
			};
		}

		BatchReport { handle: handle.to_owned(), records, notice: None }
	}

	async fn process_entry(
		&self,
		index: usize,
		gamertag: &Gamertag,
		token: &SessionToken,
	) -> OutcomeRecord {
		let xuid = match self.resolve(gamertag, token).await {
			Ok(xuid) => xuid,
			Err(e) => {
				return OutcomeRecord {
					index,
					resolved: false,
					action_succeeded: false,
					error_detail: Some(e.to_string()),
				};
			},
		};

		match self.follow(&xuid, token).await {
			Ok(()) =>
				OutcomeRecord { index, resolved: true, action_succeeded: true, error_detail: None },
			Err(e) => OutcomeRecord {
				index,
				resolved: true,
				action_succeeded: false,
				error_detail: Some(e.to_string()),
			},
		}
	}

	fn abort(&self, handle: &str, notice: BatchNotice) -> BatchReport {
		obs::notice(FlowKind::Batch, &notice);

		BatchReport::aborted(handle, notice)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn record(index: usize, resolved: bool, action_succeeded: bool) -> OutcomeRecord {
		OutcomeRecord { index, resolved, action_succeeded, error_detail: None }
	}

	#[test]
	fn report_counts_and_summary() {
		let report = BatchReport {
			handle: "Foo".into(),
			records: vec![record(0, true, true), record(1, false, false), record(2, true, false)],
			notice: None,
		};

		assert_eq!(report.attempted(), 3);
		assert_eq!(report.resolved(), 2);
		assert_eq!(report.succeeded(), 1);
		assert_eq!(
			report.to_string(),
			"Followed Foo with 1 of 3 token(s); 1 could not resolve the gamertag."
		);
	}

	#[test]
	fn aborted_report_explains_itself() {
		let report = BatchReport::aborted("Foo", BatchNotice::NoTokens);

		assert_eq!(report.attempted(), 0);
		assert_eq!(
			report.to_string(),
			"Nothing processed: No session tokens available; generate tokens first."
		);
	}

	#[test]
	fn outcome_records_render_one_based_positions() {
		let failed = OutcomeRecord {
			index: 1,
			resolved: false,
			action_succeeded: false,
			error_detail: Some("Profile lookup returned no users.".into()),
		};

		assert_eq!(record(0, true, true).to_string(), "token 1: followed");
		assert_eq!(
			failed.to_string(),
			"token 2: could not resolve gamertag: Profile lookup returned no users."
		);
	}

	#[test]
	fn default_delay_is_two_seconds() {
		assert_eq!(BatchOptions::default().delay, StdDuration::from_secs(2));
	}
}

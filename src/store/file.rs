//! Line-oriented token file: one session token per line, append-only.

// std
use std::{
	env,
	fs::{self, OpenOptions},
	io::{ErrorKind, Write},
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::SessionToken,
	obs::{self, FlowKind},
	store::{StoreError, StoreFuture, TokenStore},
};

/// Environment variable overriding the token file location.
pub const TOKENS_FILE_ENV: &str = "XBL_TOKENS_FILE";
/// Token file location used when [`TOKENS_FILE_ENV`] is unset.
pub const DEFAULT_TOKENS_FILE: &str = "data/tokens.txt";

/// UTF-8 text file holding one token per line.
///
/// The file is opened per operation; no handle or lock is held between calls. Concurrent
/// writers from several processes may interleave lines.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
}
impl FileStore {
	/// Points the store at `path`; nothing is touched until the first operation.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Uses [`TOKENS_FILE_ENV`] when set, [`DEFAULT_TOKENS_FILE`] otherwise.
	pub fn from_env() -> Self {
		let path = env::var_os(TOKENS_FILE_ENV)
			.filter(|value| !value.is_empty())
			.map(PathBuf::from)
			.unwrap_or_else(|| PathBuf::from(DEFAULT_TOKENS_FILE));

		Self::new(path)
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_now(&self) -> Result<Vec<SessionToken>, StoreError> {
		let contents = match fs::read_to_string(&self.path) {
			Ok(contents) => contents,
			Err(e) if e.kind() == ErrorKind::NotFound => {
				obs::notice(
					FlowKind::Store,
					&format_args!(
						"{} not found; run the token generator first.",
						self.path.display()
					),
				);

				return Ok(Vec::new());
			},
			Err(e) => return Err(self.read_error(e)),
		};

		Ok(contents.lines().filter_map(|line| SessionToken::new(line).ok()).collect())
	}

	fn append_now(&self, token: &SessionToken) -> Result<(), StoreError> {
		self.ensure_parent_exists()?;

		let mut file = OpenOptions::new()
			.create(true)
			.append(true)
			.open(&self.path)
			.map_err(|e| self.write_error(e))?;

		writeln!(file, "{}", token.expose()).map_err(|e| self.write_error(e))?;
		file.flush().map_err(|e| self.write_error(e))
	}

	fn ensure_parent_exists(&self) -> Result<(), StoreError> {
		if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Write {
				path: parent.display().to_string(),
				message: format!("failed to create directory: {e}"),
			})?;
		}

		Ok(())
	}

	fn read_error(&self, e: std::io::Error) -> StoreError {
		StoreError::Read { path: self.path.display().to_string(), message: e.to_string() }
	}

	fn write_error(&self, e: std::io::Error) -> StoreError {
		StoreError::Write { path: self.path.display().to_string(), message: e.to_string() }
	}
}
impl TokenStore for FileStore {
	fn load(&self) -> StoreFuture<'_, Vec<SessionToken>> {
		Box::pin(async move { self.load_now() })
	}

	fn append<'a>(&'a self, token: &'a SessionToken) -> StoreFuture<'a, ()> {
		Box::pin(async move { self.append_now(token) })
	}
}

//! Storage contract and built-in implementations for session tokens.
//!
//! The store is a flat, ordered, append-only list. Order on load is processing order; nothing
//! is rewritten or deduplicated.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::SessionToken};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by token stores.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Loads every stored token in insertion order.
	///
	/// A store that does not exist yet loads as empty rather than failing.
	fn load(&self) -> StoreFuture<'_, Vec<SessionToken>>;

	/// Appends one token after the existing entries.
	fn append<'a>(&'a self, token: &'a SessionToken) -> StoreFuture<'a, ()>;
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// The backing store exists but could not be read.
	#[error("Failed to read {path}: {message}.")]
	Read {
		/// Location of the backing store.
		path: String,
		/// Human-readable error payload.
		message: String,
	},
	/// A token could not be written.
	#[error("Failed to write {path}: {message}.")]
	Write {
		/// Location of the backing store.
		path: String,
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for other storage engines.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

//! Thread-safe in-memory [`TokenStore`] implementation for embedding and tests.

// self
use crate::{
	_prelude::*,
	auth::SessionToken,
	store::{StoreError, StoreFuture, TokenStore},
};

/// Keeps tokens in-process, in append order.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<Vec<SessionToken>>>);
impl MemoryStore {
	/// Seeds the store with existing tokens.
	pub fn with_tokens(tokens: impl IntoIterator<Item = SessionToken>) -> Self {
		Self(Arc::new(RwLock::new(tokens.into_iter().collect())))
	}

	/// Number of stored tokens.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns true if nothing has been stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	/// Copies the current contents.
	pub fn snapshot(&self) -> Vec<SessionToken> {
		self.0.read().clone()
	}
}
impl TokenStore for MemoryStore {
	fn load(&self) -> StoreFuture<'_, Vec<SessionToken>> {
		let tokens = self.snapshot();

		Box::pin(async move { Ok::<_, StoreError>(tokens) })
	}

	fn append<'a>(&'a self, token: &'a SessionToken) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.0.write().push(token.clone());

			Ok(())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn append_then_load_yields_value_last() {
		let first = SessionToken::new("x=a;1").expect("Fixture should be valid.");
		let second = SessionToken::new("x=b;2").expect("Fixture should be valid.");
		let store = MemoryStore::with_tokens([first.clone()]);

		store.append(&second).await.expect("Append should succeed.");

		let loaded = store.load().await.expect("Load should succeed.");

		assert_eq!(loaded, vec![first, second]);
		assert_eq!(store.len(), 2);
	}
}

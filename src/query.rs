//! Typed view of a cached query.
//!
//! Inspired by TanStack Query: a view acquires a [`QueryHandle`] through the
//! API facade, polls it on every tick and renders whatever state it is in.
//!
//! # Example
//!
//! ```ignore
//! let mut posts = api.query(&posts::LIST, ());
//!
//! // In event loop tick
//! if posts.poll() {
//!     // State changed, trigger re-render
//! }
//!
//! // In render
//! match posts.state() {
//!     QueryState::Loading => render_spinner(),
//!     QueryState::Success(data) => render_data(&data),
//!     QueryState::Error(e) => render_error(&e),
//!     QueryState::Idle => {}
//! }
//! ```

use crate::api::HttpError;
use crate::cache::{Erased, Subscription};
use std::marker::PhantomData;
use std::sync::Arc;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(HttpError),
}

impl<T> QueryState<T> {
  #[cfg(test)]
  pub fn is_success(&self) -> bool {
    matches!(self, QueryState::Success(_))
  }

  #[cfg(test)]
  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  /// Still waiting for a result
  pub fn is_pending(&self) -> bool {
    matches!(self, QueryState::Idle | QueryState::Loading)
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&HttpError> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// Reference-counted handle on one cache entry.
///
/// Holding the handle keeps the entry subscribed: invalidations refetch it
/// and every handle sees the new state. Dropping (or [`release`]) gives the
/// reference back.
///
/// [`release`]: QueryHandle::release
pub struct QueryHandle<T> {
  subscription: Subscription,
  _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> QueryHandle<T> {
  pub(crate) fn new(subscription: Subscription) -> Self {
    Self {
      subscription,
      _marker: PhantomData,
    }
  }

  /// Current state of the entry
  pub fn state(&self) -> QueryState<Arc<T>> {
    let state = self.subscription.receiver().borrow();
    typed(self.subscription.endpoint(), &state)
  }

  /// Get the data if the query succeeded
  pub fn data(&self) -> Option<Arc<T>> {
    match self.state() {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn is_loading(&self) -> bool {
    self.subscription.receiver().borrow().is_pending()
  }

  /// Check for a state change since the last poll.
  ///
  /// Returns `true` if the state changed. Call this in your event loop tick
  /// handler.
  pub fn poll(&mut self) -> bool {
    let rx = self.subscription.receiver_mut();
    match rx.has_changed() {
      Ok(true) => {
        rx.borrow_and_update();
        true
      }
      _ => false,
    }
  }

  /// Wait for the next state change
  #[cfg(test)]
  pub async fn changed(&mut self) -> bool {
    self.subscription.receiver_mut().changed().await.is_ok()
  }

  /// Wait until the entry is no longer loading and return its state
  #[cfg(test)]
  pub async fn settled(&mut self) -> QueryState<Arc<T>> {
    let endpoint = self.subscription.endpoint();
    loop {
      let state = {
        let state = self.subscription.receiver_mut().borrow_and_update();
        typed(endpoint, &state)
      };
      if !state.is_pending() {
        return state;
      }
      if self.subscription.receiver_mut().changed().await.is_err() {
        return self.state();
      }
    }
  }

  /// Force a refetch. No-op while a request is already in flight.
  pub fn refetch(&self) {
    self.subscription.refetch();
  }

  /// Give the reference back to the cache; dropping the handle does the same
  #[cfg(test)]
  pub fn release(self) {
    drop(self);
  }
}

fn typed<T: Send + Sync + 'static>(
  endpoint: &'static str,
  state: &QueryState<Erased>,
) -> QueryState<Arc<T>> {
  match state {
    QueryState::Idle => QueryState::Idle,
    QueryState::Loading => QueryState::Loading,
    QueryState::Error(e) => QueryState::Error(e.clone()),
    QueryState::Success(data) => match Arc::clone(data).downcast::<T>() {
      Ok(data) => QueryState::Success(data),
      Err(_) => QueryState::Error(HttpError::InvalidRequest(format!(
        "cached value for {} has an unexpected type",
        endpoint
      ))),
    },
  }
}

impl<T> std::fmt::Debug for QueryHandle<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("QueryHandle")
      .field("endpoint", &self.subscription.endpoint())
      .finish_non_exhaustive()
  }
}

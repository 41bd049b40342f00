//! In-memory query cache with tag-based invalidation.
//!
//! This module provides the caching layer the API facade sits on:
//! - One entry per query descriptor (endpoint id + argument)
//! - Entries label themselves with resource tags
//! - Mutations invalidate tags, refetching every subscribed entry
//! - Released entries are garbage-collected after a grace period

mod key;
mod layer;
mod tags;

pub use key::QueryKey;
pub use layer::{Erased, Fetcher, QueryCache, Subscription};
pub use tags::Tag;

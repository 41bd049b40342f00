//! Resource tags used to group cached queries for invalidation.

use std::fmt;

/// Label for the resource domain a cached result represents.
///
/// Queries declare the tags they provide, mutations the tags they
/// invalidate. The string names are part of the log format and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
  User,
  /// Mirrors the backend's tag list; no admin query provides it, so
  /// invalidating it is a no-op kept for parity with the login contract.
  Session,
  /// Mirrors the backend's tag list; user stories are cached under `Blog`.
  Story,
  Blog,
  MsPost,
  UploadSeries,
  Donation,
  Profile,
  Legal,
  Subscription,
}

impl Tag {
  pub const ALL: [Tag; 10] = [
    Tag::User,
    Tag::Session,
    Tag::Story,
    Tag::Blog,
    Tag::MsPost,
    Tag::UploadSeries,
    Tag::Donation,
    Tag::Profile,
    Tag::Legal,
    Tag::Subscription,
  ];

  pub const fn as_str(self) -> &'static str {
    match self {
      Tag::User => "User",
      Tag::Session => "Session",
      Tag::Story => "Story",
      Tag::Blog => "Blog",
      Tag::MsPost => "MsPost",
      Tag::UploadSeries => "UploadSeries",
      Tag::Donation => "Donation",
      Tag::Profile => "Profile",
      Tag::Legal => "Legal",
      Tag::Subscription => "Subscription",
    }
  }

  /// Position in [`Tag::ALL`], used to index per-tag locks
  pub const fn index(self) -> usize {
    self as usize
  }
}

impl fmt::Display for Tag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Whether two tag sets share at least one tag
pub fn intersects(a: &[Tag], b: &[Tag]) -> bool {
  a.iter().any(|t| b.contains(t))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_index_matches_all_order() {
    for (i, tag) in Tag::ALL.iter().enumerate() {
      assert_eq!(tag.index(), i);
    }
  }

  #[test]
  fn test_intersects() {
    assert!(intersects(&[Tag::MsPost, Tag::Blog], &[Tag::Blog]));
    assert!(!intersects(&[Tag::MsPost], &[Tag::Profile, Tag::User]));
    assert!(!intersects(&[], &[Tag::Profile]));
  }

  #[test]
  fn test_display_uses_stable_name() {
    assert_eq!(Tag::UploadSeries.to_string(), "UploadSeries");
  }
}

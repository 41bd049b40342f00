use crate::ui::view::Notice;
use std::time::{Duration, Instant};

const INFO_TTL: Duration = Duration::from_secs(3);
const ERROR_TTL: Duration = Duration::from_secs(6);

/// A notice with an expiry
#[derive(Debug, Clone)]
pub struct Toast {
  notice: Notice,
  expires_at: Instant,
}

impl Toast {
  pub fn new(notice: Notice, now: Instant) -> Self {
    let ttl = match notice.level {
      crate::ui::view::NoticeLevel::Info => INFO_TTL,
      crate::ui::view::NoticeLevel::Error => ERROR_TTL,
    };
    Self {
      notice,
      expires_at: now + ttl,
    }
  }

  pub fn notice(&self) -> &Notice {
    &self.notice
  }

  pub fn is_expired(&self, now: Instant) -> bool {
    now >= self.expires_at
  }
}

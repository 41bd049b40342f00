//! Field validation rules.
//!
//! Each rule returns the message to show, or `None` when the value passes.
//! Lengths are counted in characters, not bytes.

use std::sync::LazyLock;

use regex_lite::Regex;

static EMAIL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

static YOUTUBE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(https?://)?(www\.)?(youtube\.com|youtu\.be)/.+$").expect("valid youtube pattern")
});

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MIN: usize = 10;
pub const DESCRIPTION_MAX: usize = 1000;
pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 10;

fn chars(value: &str) -> usize {
  value.chars().count()
}

pub fn required(value: &str, label: &str) -> Option<String> {
  value
    .trim()
    .is_empty()
    .then(|| format!("{} is required", label))
}

fn bounded(value: &str, label: &str, min: usize, max: usize) -> Option<String> {
  if let Some(e) = required(value, label) {
    return Some(e);
  }
  let len = chars(value);
  if len < min {
    Some(format!("{} must be at least {} characters", label, min))
  } else if len > max {
    Some(format!("{} must be less than {} characters", label, max))
  } else {
    None
  }
}

pub fn title(value: &str) -> Option<String> {
  bounded(value, "Title", TITLE_MIN, TITLE_MAX)
}

pub fn description(value: &str) -> Option<String> {
  bounded(value, "Description", DESCRIPTION_MIN, DESCRIPTION_MAX)
}

pub fn email(value: &str) -> Option<String> {
  if let Some(e) = required(value, "Email") {
    return Some(e);
  }
  (!EMAIL.is_match(value.trim())).then(|| "Please enter a valid email address".to_string())
}

pub fn password(value: &str) -> Option<String> {
  let len = chars(value);
  (!(PASSWORD_MIN..=PASSWORD_MAX).contains(&len))
    .then(|| "Password must be 8-10 characters long".to_string())
}

pub fn confirmation(password: &str, confirm: &str) -> Option<String> {
  (password != confirm).then(|| "Passwords do not match".to_string())
}

/// Optional YouTube link
pub fn youtube_url(value: &str) -> Option<String> {
  let value = value.trim();
  (!value.is_empty() && !YOUTUBE.is_match(value))
    .then(|| "Please enter a valid YouTube URL".to_string())
}

/// Strictly positive decimal amount
pub fn positive_amount(value: &str) -> Option<String> {
  if let Some(e) = required(value, "Amount") {
    return Some(e);
  }
  match value.trim().trim_start_matches('$').parse::<f64>() {
    Ok(n) if n.is_finite() && n > 0.0 => None,
    _ => Some("Amount must be a positive number".to_string()),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_password_length_bounds() {
    assert!(password("abcdefg").is_some());
    assert!(password("abcdefgh").is_none());
    assert!(password("abcdefghij").is_none());
    assert!(password("abcdefghijk").is_some());
    assert_eq!(
      password("").as_deref(),
      Some("Password must be 8-10 characters long")
    );
  }

  #[test]
  fn test_title_bounds() {
    assert_eq!(title("").as_deref(), Some("Title is required"));
    assert_eq!(title("   ").as_deref(), Some("Title is required"));
    assert_eq!(
      title("ab").as_deref(),
      Some("Title must be at least 3 characters")
    );
    assert!(title("abc").is_none());
    assert!(title(&"x".repeat(100)).is_none());
    assert_eq!(
      title(&"x".repeat(101)).as_deref(),
      Some("Title must be less than 100 characters")
    );
  }

  #[test]
  fn test_lengths_count_characters() {
    // Three two-byte characters
    assert!(title("été").is_none());
    assert!(title(&"é".repeat(100)).is_none());
  }

  #[test]
  fn test_description_bounds() {
    assert_eq!(
      description("123456789").as_deref(),
      Some("Description must be at least 10 characters")
    );
    assert!(description("1234567890").is_none());
    assert!(description(&"d".repeat(1001)).is_some());
  }

  #[test]
  fn test_confirmation() {
    assert!(confirmation("abcdefgh", "abcdefgh").is_none());
    assert_eq!(
      confirmation("abcdefgh", "abcdefgX").as_deref(),
      Some("Passwords do not match")
    );
  }

  #[test]
  fn test_email() {
    assert_eq!(email("").as_deref(), Some("Email is required"));
    assert!(email("admin@ms.org").is_none());
    assert!(email(" admin@ms.org ").is_none());
    assert!(email("admin@ms").is_some());
    assert!(email("not an email").is_some());
  }

  #[test]
  fn test_youtube_url_is_optional() {
    assert!(youtube_url("").is_none());
    assert!(youtube_url("https://www.youtube.com/watch?v=abc").is_none());
    assert!(youtube_url("youtu.be/abc").is_none());
    assert!(youtube_url("https://vimeo.com/123").is_some());
    assert!(youtube_url("https://youtube.com/").is_some());
  }

  #[test]
  fn test_positive_amount() {
    assert!(positive_amount("9.99").is_none());
    assert!(positive_amount("$10").is_none());
    assert!(positive_amount("0").is_some());
    assert!(positive_amount("-5").is_some());
    assert!(positive_amount("ten").is_some());
    assert_eq!(positive_amount("").as_deref(), Some("Amount is required"));
  }
}

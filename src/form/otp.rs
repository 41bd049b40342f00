//! Six-box one-time-code entry.

use crossterm::event::{KeyCode, KeyEvent};

use crate::ui::components::InputResult;

pub const OTP_LEN: usize = 6;

/// Digit boxes with a focus cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtpInput {
  digits: [Option<char>; OTP_LEN],
  focus: usize,
}

impl OtpInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn digits(&self) -> &[Option<char>; OTP_LEN] {
    &self.digits
  }

  pub fn focus(&self) -> usize {
    self.focus
  }

  /// The code typed so far, in box order
  pub fn value(&self) -> String {
    self.digits.iter().flatten().collect()
  }

  pub fn is_complete(&self) -> bool {
    self.digits.iter().all(Option::is_some)
  }

  pub fn clear(&mut self) {
    *self = Self::default();
  }

  /// Type into the focused box. Non-digits are ignored.
  pub fn input(&mut self, c: char) -> bool {
    if !c.is_ascii_digit() {
      return false;
    }
    self.digits[self.focus] = Some(c);
    if self.focus < OTP_LEN - 1 {
      self.focus += 1;
    }
    true
  }

  /// Clear the focused box, or step back when it is already empty
  pub fn backspace(&mut self) {
    if self.digits[self.focus].is_some() {
      self.digits[self.focus] = None;
    } else if self.focus > 0 {
      self.focus -= 1;
    }
  }

  pub fn left(&mut self) {
    self.focus = self.focus.saturating_sub(1);
  }

  pub fn right(&mut self) {
    if self.focus < OTP_LEN - 1 {
      self.focus += 1;
    }
  }

  /// Fill every box from pasted text.
  ///
  /// Only exactly six digits (after trimming) are accepted; anything else
  /// leaves the boxes untouched.
  pub fn paste(&mut self, text: &str) -> bool {
    let text = text.trim();
    if text.chars().count() != OTP_LEN || !text.chars().all(|c| c.is_ascii_digit()) {
      return false;
    }
    for (slot, c) in self.digits.iter_mut().zip(text.chars()) {
      *slot = Some(c);
    }
    self.focus = OTP_LEN - 1;
    true
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
    match key.code {
      KeyCode::Esc => InputResult::Cancelled,
      KeyCode::Enter => InputResult::Submitted(self.value()),
      KeyCode::Backspace => {
        self.backspace();
        InputResult::Consumed
      }
      KeyCode::Left => {
        self.left();
        InputResult::Consumed
      }
      KeyCode::Right => {
        self.right();
        InputResult::Consumed
      }
      KeyCode::Char(c) if self.input(c) => InputResult::Consumed,
      _ => InputResult::NotHandled,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  #[test]
  fn test_typing_advances_focus() {
    let mut otp = OtpInput::new();
    for c in "123".chars() {
      otp.input(c);
    }
    assert_eq!(otp.value(), "123");
    assert_eq!(otp.focus(), 3);
    assert!(!otp.is_complete());
  }

  #[test]
  fn test_last_box_keeps_focus() {
    let mut otp = OtpInput::new();
    for c in "1234567".chars() {
      otp.input(c);
    }
    assert_eq!(otp.value(), "123457");
    assert_eq!(otp.focus(), 5);
    assert!(otp.is_complete());
  }

  #[test]
  fn test_non_digits_are_ignored() {
    let mut otp = OtpInput::new();
    assert!(!otp.input('a'));
    assert_eq!(otp.handle_key(key(KeyCode::Char('x'))), InputResult::NotHandled);
    assert_eq!(otp, OtpInput::new());
  }

  #[test]
  fn test_backspace_clears_then_retreats() {
    let mut otp = OtpInput::new();
    otp.input('1');
    otp.input('2');
    // Focus is on the empty third box
    otp.backspace();
    assert_eq!(otp.focus(), 1);
    assert_eq!(otp.value(), "12");

    otp.backspace();
    assert_eq!(otp.focus(), 1);
    assert_eq!(otp.value(), "1");

    otp.backspace();
    otp.backspace();
    otp.backspace();
    assert_eq!(otp.focus(), 0);
    assert_eq!(otp.value(), "");
  }

  #[test]
  fn test_six_digit_paste_fills_all_boxes() {
    let mut otp = OtpInput::new();
    assert!(otp.paste(" 482913\n"));
    assert_eq!(otp.value(), "482913");
    assert_eq!(otp.focus(), 5);
  }

  #[test]
  fn test_other_pastes_leave_state_unchanged() {
    let mut otp = OtpInput::new();
    otp.input('7');
    let before = otp.clone();

    for bad in ["12345", "1234567", "12a456", "", "12 456"] {
      assert!(!otp.paste(bad));
      assert_eq!(otp, before, "paste {:?} changed state", bad);
    }
  }

  #[test]
  fn test_arrows_move_focus_within_bounds() {
    let mut otp = OtpInput::new();
    otp.handle_key(key(KeyCode::Left));
    assert_eq!(otp.focus(), 0);
    for _ in 0..10 {
      otp.handle_key(key(KeyCode::Right));
    }
    assert_eq!(otp.focus(), 5);
  }
}

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ratatui::prelude::{Color, Rect};

/// Truncate a string to a maximum length in characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Get the display color for a donation payment status
pub fn payment_status_color(status: &str) -> Color {
  match status.to_ascii_lowercase().as_str() {
    "paid" | "succeeded" | "success" | "completed" => Color::Green,
    "pending" | "processing" => Color::Yellow,
    "failed" | "canceled" | "cancelled" | "refunded" => Color::Red,
    _ => Color::White,
  }
}

/// Render an API timestamp as "12 Mar 2024"; unknown formats pass through
pub fn format_date(raw: &str) -> String {
  let raw = raw.trim();
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return dt.format("%d %b %Y").to_string();
  }
  if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
    return dt.format("%d %b %Y").to_string();
  }
  if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
    return d.format("%d %b %Y").to_string();
  }
  raw.to_string()
}

/// Plain text from the HTML the legal-document editor stores
pub fn strip_html(html: &str) -> String {
  let mut out = String::with_capacity(html.len());
  let mut tag = String::new();
  let mut in_tag = false;

  for c in html.chars() {
    match c {
      '<' => {
        in_tag = true;
        tag.clear();
      }
      '>' if in_tag => {
        in_tag = false;
        let name = tag
          .trim_start_matches('/')
          .split(|c: char| c.is_whitespace() || c == '/')
          .next()
          .unwrap_or("")
          .to_ascii_lowercase();
        match name.as_str() {
          "br" => out.push('\n'),
          "p" | "div" | "h1" | "h2" | "h3" | "h4" | "ul" | "ol" if tag.starts_with('/') => {
            out.push('\n')
          }
          "li" if !tag.starts_with('/') => out.push_str("• "),
          "li" => out.push('\n'),
          _ => {}
        }
      }
      _ if in_tag => tag.push(c),
      _ => out.push(c),
    }
  }

  let decoded = out
    .replace("&nbsp;", " ")
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&#39;", "'")
    .replace("&amp;", "&");

  // Collapse runs of blank lines
  let mut lines: Vec<&str> = Vec::new();
  for line in decoded.lines().map(str::trim_end) {
    if line.trim().is_empty() && lines.last().map_or(true, |l| l.trim().is_empty()) {
      continue;
    }
    lines.push(line);
  }
  lines.join("\n").trim().to_string()
}

/// A rect of `percent_x` width and fixed `height`, centered in `area`
pub fn centered_rect(area: Rect, percent_x: u16, height: u16) -> Rect {
  let width = (area.width * percent_x / 100).max(20).min(area.width);
  let height = height.min(area.height);
  Rect::new(
    area.x + (area.width - width) / 2,
    area.y + (area.height - height) / 2,
    width,
    height,
  )
}

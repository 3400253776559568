//! Small utility helpers used across modules.

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    s.to_string()
  } else {
    let cut = s.char_indices().take_while(|(i, _)| *i <= max).last().map(|(i, _)| i).unwrap_or(0);
    format!("{}… ({} bytes total)", &s[..cut], s.len())
  }
}

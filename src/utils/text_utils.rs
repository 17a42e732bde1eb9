use html2text::from_read;
use regex::Regex;
use lazy_static::lazy_static;

// Cuts the string after max_chars characters. String::truncate
// panics when cutting a multibyte char in half so we look for
// the byte index of the char boundary first.
pub fn truncate_utf8(s: &mut String, max_chars: usize) {
  if let Some((idx, _)) = s.char_indices().nth(max_chars) {
    s.truncate(idx);
  }
}

// Escapes the LIKE wildcards so that user input is matched
// literally. Has to be used with ESCAPE '\' in the query.
pub fn escape_like(value: &str) -> String {
  let mut escaped = String::with_capacity(value.len());
  for c in value.chars() {
    if c == '\\' || c == '%' || c == '_' {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}

// Produces a "%term%" pattern, or None if there's nothing
// left to search for.
pub fn like_pattern(term: &str) -> Option<String> {
  let trimmed = term.trim();
  if trimmed.is_empty() {
    None
  } else {
    Some(format!("%{}%", escape_like(trimmed)))
  }
}

pub fn strip_html(html: &str) -> String {
  from_read(html.as_bytes(), 1000)
}

// Plain text summary of an article body, whitespace collapsed.
pub fn excerpt_from_content(content: &str, max_chars: usize) -> String {
  let text = strip_html(content);
  let mut excerpt = text.split_whitespace()
    .collect::<Vec<&str>>()
    .join(" ");
  if excerpt.chars().count() > max_chars {
    truncate_utf8(&mut excerpt, max_chars);
    let trimmed_len = excerpt.trim_end().len();
    excerpt.truncate(trimmed_len);
    excerpt.push_str("...");
  }
  excerpt
}

// Keeps only the base name of an uploaded file and replaces
// anything that isn't safe in a URL or a path with "_".
pub fn sanitize_file_name(name: &str) -> String {
  lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(
      r"[^A-Za-z0-9._-]"
    ).unwrap();
  }
  // Browsers on Windows used to send full paths:
  let base = name.rsplit(|c: char| c == '/' || c == '\\')
    .next()
    .unwrap_or("");
  let cleaned = UNSAFE_CHARS.replace_all(base, "_");
  let cleaned = cleaned.trim_start_matches('.');
  if cleaned.is_empty() {
    String::from("file")
  } else {
    let mut cleaned = cleaned.to_string();
    truncate_utf8(&mut cleaned, 100);
    cleaned
  }
}

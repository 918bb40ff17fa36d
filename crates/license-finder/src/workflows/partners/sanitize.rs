//! Text guards applied to user input and judgment output.

use std::sync::OnceLock;

use regex::Regex;
use reqwest::Url;

const REDACTED_EMAIL: &str = "[REDACTED EMAIL]";
const REDACTED_PHONE: &str = "[REDACTED PHONE]";

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}").expect("valid email pattern")
    })
}

fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\+?\d[\d\s().-]{7,}\d").expect("valid phone pattern"))
}

/// Replace e-mail addresses and phone-like digit runs with placeholders.
pub fn redact(text: &str) -> String {
    let without_email = email_pattern().replace_all(text, REDACTED_EMAIL);
    phone_pattern()
        .replace_all(&without_email, REDACTED_PHONE)
        .into_owned()
}

/// Keep at most `max_chars` characters, marking a cut with an ellipsis.
pub fn clamp_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

/// Hard character cap without a marker, for stored names and notes.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Normalise a user-supplied website or evidence URL.
///
/// Trims whitespace and angle brackets, assumes `https://` when no scheme is given, and only
/// accepts http(s) URLs with a non-empty host. Returns `None` for anything else.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('<').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('>').unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return None;
    }

    let lowered = trimmed.to_ascii_lowercase();
    let with_scheme = if lowered.starts_with("https://") || lowered.starts_with("http://") {
        trimmed.to_string()
    } else if trimmed.contains("://") {
        return None;
    } else {
        format!("https://{trimmed}")
    };
    let parsed = Url::parse(&with_scheme).ok()?;

    let has_host = parsed.host_str().is_some_and(|host| !host.is_empty());
    (matches!(parsed.scheme(), "http" | "https") && has_host).then(|| parsed.to_string())
}

/// Split a newline-separated exclude list into trimmed, non-empty names.
pub fn parse_exclude_list(text: Option<&str>) -> Vec<String> {
    text.map(|text| {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Case-insensitive exact match against the exclude list.
pub fn is_excluded(candidate_name: &str, exclude: &[String]) -> bool {
    let name = candidate_name.trim().to_lowercase();
    exclude
        .iter()
        .any(|entry| entry.trim().to_lowercase() == name)
}

/// Lowercase, with every run of non-alphanumeric ASCII collapsed to `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut in_gap = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            in_gap = false;
        } else if !in_gap {
            slug.push('-');
            in_gap = true;
        }
    }
    slug
}

/// Strip zero-width characters and the BOM before checking for blank names.
pub fn is_visibly_blank(text: &str) -> bool {
    text.chars()
        .filter(|ch| !matches!(ch, '\u{200B}'..='\u{200D}' | '\u{FEFF}'))
        .all(char::is_whitespace)
}

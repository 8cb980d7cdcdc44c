use regex::Regex;

use crate::app::SearchScope;
use crate::error::{AppError, AppResult};

pub trait LineMatcher: Send + Sync {
    fn is_match(&self, text: &str) -> bool;
}

/// Case-insensitive substring match.
#[derive(Debug, Clone)]
struct PlainMatcher {
    needle: String,
}

impl LineMatcher for PlainMatcher {
    fn is_match(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.needle)
    }
}

#[derive(Debug, Clone)]
struct RegexMatcher {
    regex: Regex,
}

impl LineMatcher for RegexMatcher {
    fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

pub fn build_matcher(term: &str, regex: bool) -> AppResult<Box<dyn LineMatcher>> {
    if regex {
        let regex = Regex::new(term)
            .map_err(|err| AppError::invalid_argument(format!("invalid regex {term:?}: {err}")))?;
        return Ok(Box::new(RegexMatcher { regex }));
    }
    Ok(Box::new(PlainMatcher {
        needle: term.to_lowercase(),
    }))
}

/// Splits a pretty-printed line into its quoted key and the value text.
/// Lines without a key (array items, brackets) are all value.
pub fn split_key_value(line: &str) -> (Option<&str>, &str) {
    let trimmed = line.trim_start();
    if let Some(end) = closing_quote(trimmed)
        && let Some(value) = trimmed[end + 1..].strip_prefix(": ")
    {
        return (Some(&trimmed[..=end]), value);
    }
    (None, trimmed)
}

/// Byte index of the quote that closes a leading JSON string.
fn closing_quote(text: &str) -> Option<usize> {
    let rest = text.strip_prefix('"')?;
    let mut escaped = false;
    for (idx, byte) in rest.bytes().enumerate() {
        match byte {
            _ if escaped => escaped = false,
            b'\\' => escaped = true,
            b'"' => return Some(idx + 1),
            _ => {}
        }
    }
    None
}

pub fn find_matches(lines: &[String], scope: SearchScope, matcher: &dyn LineMatcher) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| {
            let (key, value) = split_key_value(line);
            match scope {
                SearchScope::All => matcher.is_match(line),
                SearchScope::Keys => key.is_some_and(|key| matcher.is_match(key)),
                SearchScope::Values => matcher.is_match(value),
            }
        })
        .map(|(idx, _)| idx)
        .collect()
}

//! Normalizer: derives display text from a polymorphic [`LogMessage`].
//!
//! Two views are produced for every record:
//!
//! - a **short message**: one line, at most `max_chars` characters (plus a
//!   trailing `…` when cut). Cloud audit payloads are summarised as
//!   `<service>.<method> on <resource> by <principal>`; other structured
//!   payloads use their `message`/`textPayload` text when present, and fall
//!   back to compact JSON.
//! - a **full message**: the text unchanged, or pretty-printed JSON.
//!
//! Both are total: malformed payloads degrade to placeholder or fallback
//! text, never to an error.

use serde_json::{Map, Value};

use crate::types::LogMessage;

/// Default cap for the short message, in characters.
pub const DEFAULT_SUMMARY_MAX_CHARS: usize = 80;

/// Appended to a short message that was cut.
pub const ELLIPSIS: char = '…';

const UNKNOWN_SERVICE: &str = "unknownService";
const UNKNOWN_METHOD: &str = "unknownMethod";
const UNKNOWN_RESOURCE: &str = "unknownResource";
const UNKNOWN_USER: &str = "unknownUser";

/// Keys whose presence marks a payload as an audit entry.
const AUDIT_KEYS: &[&str] = &["serviceName", "methodName", "resourceName", "authenticationInfo"];

/// Text-bearing keys checked, in order, on non-audit structured payloads.
const TEXT_KEYS: &[&str] = &["message", "textPayload"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalizer {
    max_chars: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_SUMMARY_MAX_CHARS)
    }
}

impl Normalizer {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// One-line summary of `message`.
    pub fn short_message(&self, message: &LogMessage) -> String {
        let text = match message {
            LogMessage::Text(s) => s.clone(),
            LogMessage::Structured(Value::Object(map)) => {
                if is_audit_payload(map) {
                    return audit_summary(map);
                }
                embedded_text(map).map_or_else(|| compact(message), str::to_string)
            }
            LogMessage::Structured(_) => compact(message),
        };
        truncate_chars(first_content_line(&text), self.max_chars)
    }

    /// Full-fidelity rendering of `message`.
    pub fn full_message(&self, message: &LogMessage) -> String {
        match message {
            LogMessage::Text(s) => s.clone(),
            LogMessage::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

/// [`Normalizer::short_message`] with the default length cap.
pub fn short_message(message: &LogMessage) -> String {
    Normalizer::default().short_message(message)
}

/// [`Normalizer::full_message`].
pub fn full_message(message: &LogMessage) -> String {
    Normalizer::default().full_message(message)
}

fn is_audit_payload(map: &Map<String, Value>) -> bool {
    AUDIT_KEYS.iter().any(|k| map.contains_key(*k))
        || map
            .get("@type")
            .and_then(Value::as_str)
            .is_some_and(|t| t.ends_with("AuditLog"))
}

fn audit_summary(map: &Map<String, Value>) -> String {
    let field = |key: &str, fallback: &'static str| -> String {
        map.get(key)
            .and_then(Value::as_str)
            .unwrap_or(fallback)
            .to_string()
    };
    let principal = map
        .get("authenticationInfo")
        .and_then(|auth| auth.get("principalEmail"))
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_USER);

    format!(
        "{}.{} on {} by {}",
        field("serviceName", UNKNOWN_SERVICE),
        field("methodName", UNKNOWN_METHOD),
        field("resourceName", UNKNOWN_RESOURCE),
        principal,
    )
}

fn embedded_text(map: &Map<String, Value>) -> Option<&str> {
    TEXT_KEYS
        .iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str))
}

fn compact(message: &LogMessage) -> String {
    match message {
        LogMessage::Text(s) => s.clone(),
        LogMessage::Structured(value) => value.to_string(),
    }
}

/// First line with non-whitespace content, trimmed; empty if there is none.
fn first_content_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

fn truncate_chars(line: &str, max_chars: usize) -> String {
    match line.char_indices().nth(max_chars) {
        None => line.to_string(),
        Some((cut, _)) => {
            let mut short = line[..cut].to_string();
            short.push(ELLIPSIS);
            short
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

use logwise_core::{RangeKey, Severity};

/// A parsed, validated command ready to be executed by the app shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Close the focused investigation, or the app when on the dashboard
    Quit,
    // Close the app regardless of the focused tab
    Exit,
    Help,
    Theme(String),
    // Toggle timestamps in the log list
    Timestamps,
    Range(RangeKey),
    // Toggle one severity in the filter
    Severity(Severity),
    Refresh,
    Explain,
}

impl Command {
    /// Parse a raw command string (the text after the `:` prefix).
    ///
    /// An empty string returns `Err("")` as a sentinel meaning "close without
    /// acting".
    pub fn parse(input: &str) -> Result<Command, String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(String::new());
        }

        let (word, rest) = input
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .unwrap_or((input, ""));

        match word {
            "q" | "quit" => Ok(Command::Quit),
            "q!" | "quit!" => Ok(Command::Exit),
            "help" => Ok(Command::Help),
            "ts" | "timestamps" => Ok(Command::Timestamps),
            "refresh" | "r" => Ok(Command::Refresh),
            "explain" => Ok(Command::Explain),
            "theme" if rest.is_empty() => Err("usage: theme <default|gruvbox>".to_string()),
            "theme" => Ok(Command::Theme(rest.to_string())),
            "range" if rest.is_empty() => Err("usage: range <key>".to_string()),
            "range" => rest.parse().map(Command::Range).map_err(|e| e.to_string()),
            "severity" | "sev" if rest.is_empty() => Err("usage: severity <LEVEL>".to_string()),
            "severity" | "sev" => rest.parse().map(Command::Severity).map_err(|e| e.to_string()),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

//! # Redact Module
//!
//! Scrubs user-identifying path segments out of messages before they are
//! shown or logged by a front end.
//!
//! The core never redacts its own results; [`PathRedactor`] is applied by
//! the consuming layer when `privacy.sanitize_error_messages` is on.

use regex::{Captures, Regex};
use std::path::Path;

const HOME_TOKEN: &str = "<USER_HOME>";
const USER_TOKEN: &str = "<USER>";

/// User directory prefixes on macOS, Linux and Windows
const USER_SEGMENT_PATTERN: &str = r"(?P<prefix>/Users/|/home/|[A-Za-z]:\\Users\\)(?P<user>[^/\\<>\s]+)";

/// Replaces the current home directory and any per-user directory segment
#[derive(Debug, Clone)]
pub struct PathRedactor {
    home: Option<Regex>,
    user_segment: Option<Regex>,
}

impl PathRedactor {
    /// Redactor for the current user's home directory
    pub fn new() -> Self {
        Self::build(dirs::home_dir().as_deref())
    }

    /// Redactor for an explicit home directory
    pub fn with_home(home: impl AsRef<Path>) -> Self {
        Self::build(Some(home.as_ref()))
    }

    fn build(home: Option<&Path>) -> Self {
        let home = home
            .filter(|home| home.parent().is_some())
            .map(|home| home.to_string_lossy().trim_end_matches(['/', '\\']).to_string())
            .filter(|home| !home.is_empty())
            .and_then(|home| Regex::new(&format!(r"{}(?P<rest>[/\\]|$|\s)", regex::escape(&home))).ok());

        Self {
            home,
            user_segment: Regex::new(USER_SEGMENT_PATTERN).ok(),
        }
    }

    /// Redact every user path in `message`
    pub fn redact(&self, message: &str) -> String {
        let mut redacted = match &self.home {
            Some(home) => home
                .replace_all(message, |caps: &Captures| format!("{}{}", HOME_TOKEN, &caps["rest"]))
                .into_owned(),
            None => message.to_string(),
        };

        if let Some(user_segment) = &self.user_segment {
            redacted = user_segment
                .replace_all(&redacted, |caps: &Captures| format!("{}{}", &caps["prefix"], USER_TOKEN))
                .into_owned();
        }

        redacted
    }

    pub fn redact_path(&self, path: &Path) -> String {
        self.redact(&path.to_string_lossy())
    }
}

impl Default for PathRedactor {
    fn default() -> Self {
        Self::new()
    }
}

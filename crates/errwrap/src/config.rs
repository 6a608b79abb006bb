//! Configuration for constructing enriched errors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lang::{Lang, Messages, default_messages};

/// Settings applied when an [`EnrichedError`](crate::EnrichedError) is built.
///
/// Every field has a default, so a TOML document only needs the keys it
/// wants to change:
///
/// ```toml
/// code = 404
/// capture_stack = true
///
/// [messages]
/// en = "User not found"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorConfig {
    /// Classification code, 0 means generic.
    pub code: i32,
    /// User-facing messages by language. May be empty.
    pub messages: Messages,
    /// Record the construction site as the first stack frame.
    pub capture_stack: bool,
    /// Maximum number of frames kept as the error is re-wrapped, 0 means no
    /// limit. The construction frame is always kept as the last one.
    pub stack_depth: usize,
}

impl ErrorConfig {
    /// Create an empty config: code 0, no messages, no stack capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// The config `wrap` uses for errors that are not enriched yet.
    pub fn wrap_default() -> Self {
        Self {
            code: 0,
            messages: default_messages().clone(),
            capture_stack: true,
            stack_depth: 0,
        }
    }

    /// Parse a config from a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|source| ConfigError { source })
    }

    /// Set the classification code
    pub fn with_code(mut self, code: i32) -> Self {
        self.code = code;
        self
    }

    /// Set the message for one language, replacing any previous one.
    pub fn with_message(mut self, lang: Lang, message: impl Into<String>) -> Self {
        self.messages.insert(lang, message.into());
        self
    }

    /// Replace the whole message table
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    /// Enable or disable stack capture
    pub fn with_capture_stack(mut self, capture: bool) -> Self {
        self.capture_stack = capture;
        self
    }

    /// Limit the number of frames kept
    pub fn with_stack_depth(mut self, depth: usize) -> Self {
        self.stack_depth = depth;
        self
    }
}

/// Failure to load an [`ErrorConfig`].
#[derive(Debug)]
pub struct ConfigError {
    source: toml::de::Error,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error config: {}", self.source.message())
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

//! Editor configuration.
//!
//! A [`TextEditConfig`] can be built in code or loaded from TOML:
//!
//! ```
//! use textgate::{CountingMode, TextEditConfig};
//!
//! let config = TextEditConfig::from_toml_str(r#"
//!     maximum-length = 140
//!     counting-mode = "double-width-non-ascii"
//!     auto-resize = true
//!     maximum-height = 120.0
//!     placeholder = "What's happening?"
//! "#).unwrap();
//!
//! assert_eq!(config.maximum_length, Some(140));
//! assert_eq!(config.counting_mode, CountingMode::DoubleWidthNonAscii);
//! ```

use serde::{Deserialize, Serialize};
use textgate_core::Color;

use crate::error::Result;
use crate::length::{CountingMode, LengthPolicyConfig};
use crate::placeholder::DEFAULT_PLACEHOLDER_COLOR;

/// Settings for a [`GuardedTextEdit`](crate::GuardedTextEdit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TextEditConfig {
    /// Maximum weight of the content. `None` means unbounded.
    pub maximum_length: Option<usize>,
    /// How characters are weighed against `maximum_length`.
    pub counting_mode: CountingMode,
    /// Whether programmatic text changes are reported to the observer and
    /// offered to its pre-check like typed ones.
    pub notify_on_programmatic_change: bool,
    /// Whether the input grows with its content.
    pub auto_resize: bool,
    /// Height the input never grows beyond.
    pub maximum_height: Option<f32>,
    /// Placeholder text shown while empty.
    pub placeholder: Option<String>,
    /// Placeholder color.
    pub placeholder_color: Color,
}

impl Default for TextEditConfig {
    fn default() -> Self {
        Self {
            maximum_length: None,
            counting_mode: CountingMode::Simple,
            notify_on_programmatic_change: true,
            auto_resize: false,
            maximum_height: None,
            placeholder: None,
            placeholder_color: DEFAULT_PLACEHOLDER_COLOR,
        }
    }
}

impl TextEditConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// The length policy part of this configuration.
    pub fn length_policy(&self) -> LengthPolicyConfig {
        LengthPolicyConfig {
            maximum_length: self.maximum_length,
            counting_mode: self.counting_mode,
        }
    }

    /// Set the maximum length.
    pub fn with_maximum_length(mut self, maximum_length: usize) -> Self {
        self.maximum_length = Some(maximum_length);
        self
    }

    /// Set the counting mode.
    pub fn with_counting_mode(mut self, mode: CountingMode) -> Self {
        self.counting_mode = mode;
        self
    }

    /// Set whether programmatic changes are reported.
    pub fn with_notify_on_programmatic_change(mut self, notify: bool) -> Self {
        self.notify_on_programmatic_change = notify;
        self
    }

    /// Enable auto-resizing, optionally capped at `maximum_height`.
    pub fn with_auto_resize(mut self, maximum_height: Option<f32>) -> Self {
        self.auto_resize = true;
        self.maximum_height = maximum_height;
        self
    }

    /// Set the placeholder text.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Set the placeholder color.
    pub fn with_placeholder_color(mut self, color: Color) -> Self {
        self.placeholder_color = color;
        self
    }
}

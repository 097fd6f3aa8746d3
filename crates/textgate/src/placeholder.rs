//! Placeholder overlay state.
//!
//! The placeholder is drawn by the host over an empty input. It is never
//! part of the buffer, so it can't be selected, copied or submitted. The
//! synchronizer only derives what the overlay should show.

use serde::{Deserialize, Serialize};
use textgate_core::Color;
use textgate_core::logging::targets;

/// Default placeholder color, a light blue-grey.
pub const DEFAULT_PLACEHOLDER_COLOR: Color = Color::from_rgba(196.0 / 255.0, 200.0 / 255.0, 208.0 / 255.0, 1.0);

/// Horizontal alignment of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlignment {
    /// Follow the writing direction.
    #[default]
    Natural,
    Left,
    Center,
    Right,
}

/// The attributes applied to newly typed text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TextStyle {
    /// Font family name.
    pub font_family: String,
    /// Font size in points.
    pub font_size: f32,
    /// Foreground color.
    pub color: Color,
    /// Explicit line height, or `None` for the font's natural height.
    pub line_height: Option<f32>,
    /// Paragraph alignment.
    pub alignment: TextAlignment,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "system-ui".to_string(),
            font_size: 16.0,
            color: Color::BLACK,
            line_height: None,
            alignment: TextAlignment::Natural,
        }
    }
}

impl TextStyle {
    /// This style with a different foreground color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// What the host configured for the placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder {
    /// Placeholder text. `None` disables the placeholder.
    pub text: Option<String>,
    /// Placeholder color.
    pub color: Color,
}

impl Default for Placeholder {
    fn default() -> Self {
        Self {
            text: None,
            color: DEFAULT_PLACEHOLDER_COLOR,
        }
    }
}

/// What the overlay should currently show.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderState {
    /// Whether the overlay is shown.
    pub visible: bool,
    /// The overlay text.
    pub text: Option<String>,
    /// The typing style with the placeholder color applied.
    pub style: TextStyle,
}

/// Derives [`PlaceholderState`] from the buffer and the typing style.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderSynchronizer {
    last: Option<PlaceholderState>,
}

impl PlaceholderSynchronizer {
    /// Create a synchronizer that has not synced yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The state produced by the last sync.
    pub fn state(&self) -> Option<&PlaceholderState> {
        self.last.as_ref()
    }

    /// Whether the overlay is currently visible.
    pub fn is_visible(&self) -> bool {
        self.last.as_ref().is_some_and(|state| state.visible)
    }

    /// Recompute the overlay state.
    ///
    /// Returns the new state only when it differs from the previous sync.
    pub fn sync(
        &mut self,
        content: &str,
        typing_style: &TextStyle,
        placeholder: &Placeholder,
    ) -> Option<&PlaceholderState> {
        let next = PlaceholderState {
            visible: content.is_empty() && placeholder.text.is_some(),
            text: placeholder.text.clone(),
            style: typing_style.clone().with_color(placeholder.color),
        };
        if self.last.as_ref() == Some(&next) {
            return None;
        }
        tracing::trace!(
            target: targets::PLACEHOLDER,
            visible = next.visible,
            "placeholder state changed"
        );
        self.last = Some(next);
        self.last.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search() -> Placeholder {
        Placeholder {
            text: Some("Search".to_string()),
            ..Placeholder::default()
        }
    }

    #[test]
    fn test_visible_only_when_empty_with_text() {
        let mut sync = PlaceholderSynchronizer::new();
        let style = TextStyle::default();

        assert!(sync.sync("", &style, &search()).is_some());
        assert!(sync.is_visible());

        let state = sync.sync("a", &style, &search()).cloned().unwrap();
        assert!(!state.visible);

        sync.sync("", &style, &search());
        assert!(sync.is_visible());

        sync.sync("", &style, &Placeholder::default());
        assert!(!sync.is_visible());
    }

    #[test]
    fn test_resync_is_idempotent() {
        let mut sync = PlaceholderSynchronizer::new();
        let style = TextStyle::default();
        assert!(sync.sync("", &style, &search()).is_some());
        assert!(sync.sync("", &style, &search()).is_none());
    }

    #[test]
    fn test_style_mirrors_typing_style_with_placeholder_color() {
        let mut sync = PlaceholderSynchronizer::new();
        let style = TextStyle {
            font_size: 20.0,
            alignment: TextAlignment::Center,
            ..TextStyle::default()
        };
        let red = Color::from_rgb8(255, 0, 0);
        let placeholder = Placeholder {
            text: Some("Say something".to_string()),
            color: red,
        };

        let state = sync.sync("", &style, &placeholder).cloned().unwrap();
        assert_eq!(state.style.font_size, 20.0);
        assert_eq!(state.style.alignment, TextAlignment::Center);
        assert_eq!(state.style.color, red);

        // A typing style change restyles the overlay.
        let bigger = TextStyle {
            font_size: 24.0,
            ..style
        };
        let state = sync.sync("", &bigger, &placeholder).unwrap();
        assert_eq!(state.style.font_size, 24.0);
    }
}

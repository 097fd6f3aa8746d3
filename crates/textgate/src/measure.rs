//! Text measurement and auto-growing height.

use textgate_core::logging::targets;
use textgate_core::{Insets, Rect};
use unicode_segmentation::UnicodeSegmentation;

/// Measures laid-out text for a given wrapping width.
///
/// The host usually backs this with its real text layout engine.
pub trait TextMeasurer {
    /// Height of one line.
    fn line_height(&self) -> f32;

    /// Number of visual lines `text` occupies when wrapped at `width`.
    /// Empty text occupies one line.
    fn line_count(&self, text: &str, width: f32) -> usize;

    /// The caret rectangle for byte `offset` in text coordinates, with the
    /// first line starting at the origin.
    fn caret_rect(&self, text: &str, offset: usize, width: f32) -> Rect;
}

/// A fixed-advance measurer wrapping at grapheme granularity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasurer {
    /// Horizontal advance of every grapheme.
    pub advance: f32,
    /// Height of one line.
    pub line_height: f32,
    /// Width of the caret.
    pub caret_width: f32,
}

impl Default for MonospaceMeasurer {
    fn default() -> Self {
        Self {
            advance: 8.0,
            line_height: 20.0,
            caret_width: 2.0,
        }
    }
}

impl MonospaceMeasurer {
    /// Create a measurer with the given advance and line height.
    pub fn new(advance: f32, line_height: f32) -> Self {
        Self {
            advance,
            line_height,
            ..Self::default()
        }
    }

    fn columns(&self, width: f32) -> usize {
        if !width.is_finite() || self.advance <= 0.0 {
            return usize::MAX;
        }
        ((width / self.advance).floor() as usize).max(1)
    }

    fn wrapped_lines(graphemes: usize, columns: usize) -> usize {
        graphemes.div_ceil(columns).max(1)
    }
}

impl TextMeasurer for MonospaceMeasurer {
    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn line_count(&self, text: &str, width: f32) -> usize {
        let columns = self.columns(width);
        text.split('\n')
            .map(|line| Self::wrapped_lines(line.graphemes(true).count(), columns))
            .sum()
    }

    fn caret_rect(&self, text: &str, offset: usize, width: f32) -> Rect {
        let columns = self.columns(width);
        let mut row = 0;
        let mut line_start = 0;

        for line in text.split('\n') {
            let line_end = line_start + line.len();
            if offset <= line_end {
                let before = &line[..offset.saturating_sub(line_start).min(line.len())];
                let index = before.graphemes(true).count();
                let total = line.graphemes(true).count();
                // A caret after the last grapheme of a full row stays on that row.
                let (wrap_row, column) = if index > 0 && index == total && index % columns == 0 {
                    (index / columns - 1, columns)
                } else {
                    (index / columns, index % columns)
                };
                // Keep a caret at the end of a full row inside the text width.
                let x = (column as f32 * self.advance).min((width - self.caret_width).max(0.0));
                return Rect::new(
                    x,
                    (row + wrap_row) as f32 * self.line_height,
                    self.caret_width,
                    self.line_height,
                );
            }
            row += Self::wrapped_lines(line.graphemes(true).count(), columns);
            line_start = line_end + 1;
        }

        // Offset past the end: report a degenerate rect.
        Rect::new(f32::NAN, f32::NAN, self.caret_width, self.line_height)
    }
}

/// Reports height changes of an auto-growing input.
#[derive(Debug, Clone, Default)]
pub struct AutoResizer {
    enabled: bool,
    maximum_height: Option<f32>,
    last_height: Option<f32>,
}

impl AutoResizer {
    /// Create a resizer.
    pub fn new(enabled: bool, maximum_height: Option<f32>) -> Self {
        Self {
            enabled,
            maximum_height,
            last_height: None,
        }
    }

    /// Whether the input grows with its content.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn auto-growing on or off. Turning it on forgets the last height.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.last_height = None;
        }
        self.enabled = enabled;
    }

    /// The height the input never grows beyond.
    pub fn maximum_height(&self) -> Option<f32> {
        self.maximum_height
    }

    /// Set the height the input never grows beyond.
    pub fn set_maximum_height(&mut self, maximum_height: Option<f32>) {
        self.maximum_height = maximum_height;
    }

    /// The last height reported or recorded.
    pub fn last_height(&self) -> Option<f32> {
        self.last_height
    }

    /// The height `text` needs at `width` (the full input width).
    pub fn fitting_height(
        &self,
        measurer: &dyn TextMeasurer,
        text: &str,
        width: f32,
        container_inset: Insets,
    ) -> f32 {
        let text_width = width - container_inset.horizontal();
        let lines = measurer.line_count(text, text_width);
        let height = lines as f32 * measurer.line_height() + container_inset.vertical();
        match self.maximum_height {
            Some(maximum) => height.min(maximum),
            None => height,
        }
    }

    /// Measure `text` and return the new height when it changed.
    ///
    /// The first measurement after enabling only records a baseline.
    pub fn update(
        &mut self,
        measurer: &dyn TextMeasurer,
        text: &str,
        width: f32,
        container_inset: Insets,
    ) -> Option<f32> {
        if !self.enabled || !width.is_finite() || width <= 0.0 {
            return None;
        }
        let height = self.fitting_height(measurer, text, width, container_inset);
        let previous = self.last_height.replace(height);
        match previous {
            Some(previous) if previous != height => {
                tracing::debug!(target: targets::MEASURE, previous, height, "height changed");
                Some(height)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurer() -> MonospaceMeasurer {
        MonospaceMeasurer::new(10.0, 20.0)
    }

    #[test]
    fn test_line_count_wraps_and_breaks() {
        let m = measurer();
        assert_eq!(m.line_count("", 100.0), 1);
        assert_eq!(m.line_count("0123456789", 100.0), 1);
        assert_eq!(m.line_count("0123456789a", 100.0), 2);
        assert_eq!(m.line_count("ab\ncd", 100.0), 2);
        assert_eq!(m.line_count("ab\n", 100.0), 2);
        assert_eq!(m.line_count("x".repeat(25).as_str(), 100.0), 3);
    }

    #[test]
    fn test_line_count_counts_graphemes_not_bytes() {
        let m = measurer();
        assert_eq!(m.line_count(&"中".repeat(10), 100.0), 1);
        assert_eq!(m.line_count(&"e\u{301}".repeat(10), 100.0), 1);
    }

    #[test]
    fn test_caret_rect() {
        let m = measurer();
        assert_eq!(m.caret_rect("", 0, 100.0), Rect::new(0.0, 0.0, 2.0, 20.0));
        assert_eq!(m.caret_rect("abc", 2, 100.0), Rect::new(20.0, 0.0, 2.0, 20.0));
        assert_eq!(m.caret_rect("ab\ncd", 4, 100.0), Rect::new(10.0, 20.0, 2.0, 20.0));
        // End of a full row stays on that row, inside the text width.
        assert_eq!(
            m.caret_rect("0123456789", 10, 100.0),
            Rect::new(98.0, 0.0, 2.0, 20.0)
        );
        assert_eq!(
            m.caret_rect("ab\n0123456789", 13, 100.0),
            Rect::new(98.0, 20.0, 2.0, 20.0)
        );
        // Unbounded width never clamps.
        assert_eq!(
            m.caret_rect("0123456789", 10, f32::INFINITY),
            Rect::new(100.0, 0.0, 2.0, 20.0)
        );
        // One past a full row wraps.
        assert_eq!(
            m.caret_rect("0123456789a", 11, 100.0),
            Rect::new(10.0, 20.0, 2.0, 20.0)
        );
        assert!(!m.caret_rect("abc", 10, 100.0).is_finite());
    }

    #[test]
    fn test_resizer_reports_only_changes() {
        let m = measurer();
        let inset = Insets::symmetric(0.0, 5.0);
        let mut resizer = AutoResizer::new(true, None);

        // Baseline.
        assert_eq!(resizer.update(&m, "", 100.0, inset), None);
        assert_eq!(resizer.last_height(), Some(30.0));

        assert_eq!(resizer.update(&m, "hello", 100.0, inset), None);
        assert_eq!(resizer.update(&m, "hello world", 100.0, inset), Some(50.0));
        assert_eq!(resizer.update(&m, "hello world!", 100.0, inset), None);
        assert_eq!(resizer.update(&m, "", 100.0, inset), Some(30.0));
    }

    #[test]
    fn test_resizer_clamps_to_maximum_height() {
        let m = measurer();
        let mut resizer = AutoResizer::new(true, Some(45.0));
        resizer.update(&m, "", 100.0, Insets::ZERO);
        assert_eq!(resizer.update(&m, &"x".repeat(25), 100.0, Insets::ZERO), Some(45.0));
        assert_eq!(resizer.update(&m, &"x".repeat(40), 100.0, Insets::ZERO), None);
    }

    #[test]
    fn test_disabled_resizer_is_silent() {
        let m = measurer();
        let mut resizer = AutoResizer::default();
        assert_eq!(resizer.update(&m, "", 100.0, Insets::ZERO), None);
        assert_eq!(resizer.update(&m, &"x".repeat(40), 100.0, Insets::ZERO), None);
        assert_eq!(resizer.last_height(), None);
    }
}

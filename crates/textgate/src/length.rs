//! Maximum-length enforcement.
//!
//! Text is weighed under a [`CountingMode`] and edits that would push the
//! weight past the configured maximum are truncated or rejected. Truncation
//! always keeps a prefix of the proposed text and cuts on extended grapheme
//! cluster boundaries, so surrogate pairs, combining sequences, emoji ZWJ
//! sequences and flags are never split.

use serde::{Deserialize, Serialize};
use textgate_core::logging::targets;
use unicode_segmentation::UnicodeSegmentation;

use crate::text::TextRange;

/// How characters are weighed against the maximum length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CountingMode {
    /// Every UTF-16 code unit weighs 1, matching platform text lengths.
    #[default]
    Simple,
    /// Code points above U+007F weigh 2, ASCII weighs 1.
    DoubleWidthNonAscii,
}

impl CountingMode {
    /// Weight of a single character.
    #[inline]
    pub fn weigh_char(self, c: char) -> usize {
        match self {
            Self::Simple => c.len_utf16(),
            Self::DoubleWidthNonAscii => {
                if c.is_ascii() {
                    1
                } else {
                    2
                }
            }
        }
    }
}

/// Weight of `text` under `mode`.
pub fn weigh(text: &str, mode: CountingMode) -> usize {
    text.chars().map(|c| mode.weigh_char(c)).sum()
}

/// Byte length of the longest grapheme-aligned prefix of `text` whose
/// weight does not exceed `limit`.
pub fn prefix_within(text: &str, limit: usize, mode: CountingMode) -> usize {
    let mut weight = 0;
    let mut len = 0;
    for grapheme in text.graphemes(true) {
        weight += weigh(grapheme, mode);
        if weight > limit {
            break;
        }
        len += grapheme.len();
    }
    len
}

/// Length constraint settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LengthPolicyConfig {
    /// Maximum weight of the committed content. `None` means unbounded.
    pub maximum_length: Option<usize>,
    /// Weighting rule.
    pub counting_mode: CountingMode,
}

/// The decision for one proposed edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthVerdict {
    /// Apply the replacement as proposed.
    Admit,
    /// Apply only the first `len` bytes of the replacement.
    Truncate { len: usize },
    /// Apply nothing.
    Reject,
}

impl LengthVerdict {
    /// Whether any part of the replacement may be applied.
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Self::Reject)
    }
}

/// Enforces a [`LengthPolicyConfig`] on proposed and committed text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LengthPolicy {
    config: LengthPolicyConfig,
}

impl LengthPolicy {
    /// Create a policy from its configuration.
    pub fn new(config: LengthPolicyConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> LengthPolicyConfig {
        self.config
    }

    /// The maximum length, if any.
    pub fn maximum_length(&self) -> Option<usize> {
        self.config.maximum_length
    }

    /// Change the maximum length. `None` removes the limit.
    pub fn set_maximum_length(&mut self, maximum_length: Option<usize>) {
        self.config.maximum_length = maximum_length;
    }

    /// The counting mode.
    pub fn counting_mode(&self) -> CountingMode {
        self.config.counting_mode
    }

    /// Change the counting mode.
    pub fn set_counting_mode(&mut self, mode: CountingMode) {
        self.config.counting_mode = mode;
    }

    /// Weight of `text` under the configured counting mode.
    pub fn weigh(&self, text: &str) -> usize {
        weigh(text, self.config.counting_mode)
    }

    /// Decide whether replacing `range` of `content` with `replacement` fits.
    ///
    /// Deletions and edits confined to the composing span are never checked;
    /// marked text is transient and is validated once it is committed.
    pub fn evaluate(
        &self,
        content: &str,
        range: TextRange,
        replacement: &str,
        composing: Option<TextRange>,
    ) -> LengthVerdict {
        let Some(maximum) = self.config.maximum_length else {
            return LengthVerdict::Admit;
        };
        if replacement.is_empty() {
            tracing::trace!(target: targets::LENGTH, %range, "deletion admitted without check");
            return LengthVerdict::Admit;
        }
        if composing.is_some_and(|marked| marked.contains_range(range)) {
            tracing::trace!(target: targets::LENGTH, %range, "edit inside marked text admitted without check");
            return LengthVerdict::Admit;
        }

        let mode = self.config.counting_mode;
        let current = weigh(content, mode);
        let removed = weigh(&content[range.as_range()], mode);
        let added = weigh(replacement, mode);

        if current - removed + added <= maximum {
            return LengthVerdict::Admit;
        }

        let allowance = maximum as isize - current as isize + removed as isize;
        if allowance <= 0 {
            tracing::debug!(
                target: targets::LENGTH,
                current,
                maximum,
                "buffer at limit, rejecting edit"
            );
            return LengthVerdict::Reject;
        }

        let len = prefix_within(replacement, allowance as usize, mode);
        if len == 0 {
            tracing::debug!(
                target: targets::LENGTH,
                allowance,
                "first character exceeds the allowance, rejecting edit"
            );
            return LengthVerdict::Reject;
        }
        tracing::debug!(
            target: targets::LENGTH,
            allowance,
            kept = len,
            proposed = replacement.len(),
            "truncating replacement"
        );
        LengthVerdict::Truncate { len }
    }

    /// Check the buffer after a mutation has been applied.
    ///
    /// Returns the byte length the content must be cut to when it is over
    /// the limit and no composition is in progress.
    pub fn enforce_committed(&self, content: &str, composing: Option<TextRange>) -> Option<usize> {
        let maximum = self.config.maximum_length?;
        if composing.is_some() {
            return None;
        }
        let mode = self.config.counting_mode;
        if weigh(content, mode) <= maximum {
            return None;
        }
        let len = prefix_within(content, maximum, mode);
        tracing::debug!(
            target: targets::LENGTH,
            maximum,
            kept = len,
            "committed text over limit, truncating buffer"
        );
        Some(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(maximum: usize, mode: CountingMode) -> LengthPolicy {
        LengthPolicy::new(LengthPolicyConfig {
            maximum_length: Some(maximum),
            counting_mode: mode,
        })
    }

    #[test]
    fn test_weigh_simple_counts_utf16_units() {
        assert_eq!(weigh("Hello", CountingMode::Simple), 5);
        assert_eq!(weigh("中文", CountingMode::Simple), 2);
        // U+1F600 is a surrogate pair in UTF-16.
        assert_eq!(weigh("😀", CountingMode::Simple), 2);
    }

    #[test]
    fn test_weigh_double_width() {
        assert_eq!(weigh("ab", CountingMode::DoubleWidthNonAscii), 2);
        assert_eq!(weigh("中文", CountingMode::DoubleWidthNonAscii), 4);
        assert_eq!(weigh("a中", CountingMode::DoubleWidthNonAscii), 3);
        assert_eq!(weigh("é", CountingMode::DoubleWidthNonAscii), 2);
    }

    #[test]
    fn test_unbounded_admits_everything() {
        let policy = LengthPolicy::default();
        let verdict = policy.evaluate("abc", TextRange::caret(3), &"x".repeat(1000), None);
        assert_eq!(verdict, LengthVerdict::Admit);
    }

    #[test]
    fn test_admit_within_limit() {
        let policy = policy(5, CountingMode::Simple);
        assert_eq!(
            policy.evaluate("", TextRange::caret(0), "Hello", None),
            LengthVerdict::Admit
        );
    }

    #[test]
    fn test_reject_at_limit() {
        let policy = policy(5, CountingMode::Simple);
        assert_eq!(
            policy.evaluate("Hello", TextRange::caret(5), "!", None),
            LengthVerdict::Reject
        );
        assert_eq!(
            policy.evaluate("Hello", TextRange::caret(5), "\n", None),
            LengthVerdict::Reject
        );
    }

    #[test]
    fn test_truncate_double_width() {
        let policy = policy(4, CountingMode::DoubleWidthNonAscii);
        let verdict = policy.evaluate("ab", TextRange::caret(2), "中文", None);
        assert_eq!(verdict, LengthVerdict::Truncate { len: "中".len() });
    }

    #[test]
    fn test_replacing_a_selection_frees_its_weight() {
        let policy = policy(5, CountingMode::Simple);
        assert_eq!(
            policy.evaluate("Hello", TextRange::new(0, 5), "World", None),
            LengthVerdict::Admit
        );
        assert_eq!(
            policy.evaluate("Hello", TextRange::new(3, 5), "p!!", None),
            LengthVerdict::Truncate { len: 2 }
        );
    }

    #[test]
    fn test_truncation_never_splits_surrogate_pairs() {
        let policy = policy(3, CountingMode::Simple);
        // Allowance is 3: "a" (1) + "😀" (2) fits, the second emoji does not.
        let verdict = policy.evaluate("", TextRange::caret(0), "a😀😀", None);
        assert_eq!(verdict, LengthVerdict::Truncate { len: "a😀".len() });

        // Allowance 1 cannot hold half of the emoji.
        let policy = self::policy(1, CountingMode::Simple);
        assert_eq!(
            policy.evaluate("", TextRange::caret(0), "😀", None),
            LengthVerdict::Reject
        );
    }

    #[test]
    fn test_truncation_never_splits_combining_sequences() {
        let policy = policy(2, CountingMode::Simple);
        // "e" + COMBINING ACUTE ACCENT is one grapheme of weight 2.
        let verdict = policy.evaluate("", TextRange::caret(0), "xe\u{301}", None);
        assert_eq!(verdict, LengthVerdict::Truncate { len: 1 });
    }

    #[test]
    fn test_deletion_always_admitted() {
        let policy = policy(2, CountingMode::Simple);
        // Buffer already over the limit; shrinking is still fine.
        assert_eq!(
            policy.evaluate("Hello", TextRange::new(4, 5), "", None),
            LengthVerdict::Admit
        );
    }

    #[test]
    fn test_marked_text_exempt() {
        let policy = policy(2, CountingMode::Simple);
        let marked = TextRange::new(2, 5);
        assert_eq!(
            policy.evaluate("abhua", TextRange::new(2, 5), "huang", Some(marked)),
            LengthVerdict::Admit
        );
        // An edit outside the marked span is still checked.
        assert_eq!(
            policy.evaluate("abhua", TextRange::caret(0), "x", Some(marked)),
            LengthVerdict::Reject
        );
    }

    #[test]
    fn test_enforce_committed() {
        let policy = policy(4, CountingMode::DoubleWidthNonAscii);
        assert_eq!(policy.enforce_committed("ab中", None), None);
        assert_eq!(policy.enforce_committed("ab中文", None), Some("ab中".len()));
        // Deferred while composing.
        assert_eq!(
            policy.enforce_committed("ab中文", Some(TextRange::new(2, 8))),
            None
        );
        assert_eq!(LengthPolicy::default().enforce_committed("ab中文", None), None);
    }

    #[test]
    fn test_prefix_within() {
        assert_eq!(prefix_within("Hello", 3, CountingMode::Simple), 3);
        assert_eq!(prefix_within("Hello", 10, CountingMode::Simple), 5);
        assert_eq!(prefix_within("中文", 3, CountingMode::DoubleWidthNonAscii), 3);
        assert_eq!(prefix_within("🇯🇵🇰🇷", 3, CountingMode::Simple), 0);
    }

    #[test]
    fn test_config_serde() {
        let config: LengthPolicyConfig =
            serde_json::from_str(r#"{"maximum-length": 20, "counting-mode": "double-width-non-ascii"}"#)
                .unwrap();
        assert_eq!(config.maximum_length, Some(20));
        assert_eq!(config.counting_mode, CountingMode::DoubleWidthNonAscii);
    }
}

//! The single entry point for buffer mutations.
//!
//! Keystrokes, pastes, input method updates and programmatic assignments
//! all pass through [`MutationGate`]. For each attempt it decides
//! admissibility (submit intent, the observer's pre-check, the length
//! policy), applies at most one mutation and runs one notification cycle.

use textgate_core::PerfSpan;
use textgate_core::logging::{span_names, targets};

use crate::error::Result;
use crate::length::{LengthPolicy, LengthVerdict};
use crate::relay::DelegateRelay;
use crate::text::{ChangeOrigin, EditableText, TextRange};

/// What happened to a mutation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The replacement was applied as proposed.
    Applied { inserted: TextRange },
    /// Only a prefix of the replacement fit and was applied.
    Truncated { inserted: TextRange },
    /// The edit was applied, then the buffer was over the limit and had to
    /// be cut down to `kept` bytes.
    Clipped { kept: usize },
    /// The length limit refused the edit.
    Rejected,
    /// Enter was consumed as a submit action.
    Submitted,
    /// The observer's pre-check refused the edit.
    Vetoed,
    /// Nothing to do.
    Unchanged,
}

impl ChangeOutcome {
    /// Whether the buffer content changed.
    pub fn is_mutated(&self) -> bool {
        matches!(
            self,
            Self::Applied { .. } | Self::Truncated { .. } | Self::Clipped { .. }
        )
    }
}

/// Decides and applies every change to an [`EditableText`].
#[derive(Debug, Clone)]
pub struct MutationGate {
    policy: LengthPolicy,
    notify_on_programmatic_change: bool,
}

impl Default for MutationGate {
    fn default() -> Self {
        Self::new(LengthPolicy::default())
    }
}

impl MutationGate {
    /// Create a gate enforcing `policy`.
    pub fn new(policy: LengthPolicy) -> Self {
        Self {
            policy,
            notify_on_programmatic_change: true,
        }
    }

    /// The length policy.
    pub fn policy(&self) -> &LengthPolicy {
        &self.policy
    }

    /// Mutable access to the length policy.
    pub fn policy_mut(&mut self) -> &mut LengthPolicy {
        &mut self.policy
    }

    /// Whether programmatic changes go through the observer like typed ones.
    pub fn notify_on_programmatic_change(&self) -> bool {
        self.notify_on_programmatic_change
    }

    /// Set whether programmatic changes go through the observer.
    pub fn set_notify_on_programmatic_change(&mut self, notify: bool) {
        self.notify_on_programmatic_change = notify;
    }

    fn notifies(&self, origin: ChangeOrigin) -> bool {
        origin == ChangeOrigin::Interactive || self.notify_on_programmatic_change
    }

    /// Try to replace `range` with `replacement`.
    ///
    /// An Enter press on a buffer with no room left is refused by the
    /// length limit without asking for submit intent.
    pub fn attempt_change(
        &self,
        text: &mut EditableText,
        relay: &DelegateRelay,
        range: TextRange,
        replacement: &str,
        origin: ChangeOrigin,
    ) -> Result<ChangeOutcome> {
        let _span = PerfSpan::new(span_names::MUTATION);
        text.validate(range).inspect_err(|err| {
            tracing::warn!(target: targets::GATE, %range, error = %err, "invalid change range");
        })?;

        let verdict = self
            .policy
            .evaluate(text.content(), range, replacement, text.composing());
        let notify = self.notifies(origin);

        if replacement == "\n" {
            if verdict == LengthVerdict::Reject {
                relay.change_prevented(range, Some(replacement));
                return Ok(ChangeOutcome::Rejected);
            }
            if relay.submit_requested() {
                return Ok(ChangeOutcome::Submitted);
            }
        }

        if notify && !relay.should_admit_change(range, replacement) {
            return Ok(ChangeOutcome::Vetoed);
        }

        let accepted = match verdict {
            LengthVerdict::Reject => {
                relay.change_prevented(range, Some(replacement));
                return Ok(ChangeOutcome::Rejected);
            }
            LengthVerdict::Admit => replacement,
            LengthVerdict::Truncate { len } => &replacement[..len],
        };

        let inserted = text.replace(range, accepted);
        tracing::trace!(
            target: targets::GATE,
            ?origin,
            %range,
            %inserted,
            "change applied"
        );

        if let Some(kept) = self.clip_committed(text, relay, notify) {
            return Ok(ChangeOutcome::Clipped { kept });
        }

        if notify {
            relay.text_changed(text.content());
        }
        if matches!(verdict, LengthVerdict::Truncate { .. }) {
            relay.change_prevented(range, Some(replacement));
            Ok(ChangeOutcome::Truncated { inserted })
        } else {
            Ok(ChangeOutcome::Applied { inserted })
        }
    }

    /// Replace the marked text (or the selection, when not composing) with
    /// new marked text from an input method.
    ///
    /// Marked text is not length checked. Empty marked text cancels the
    /// composition.
    pub fn set_marked_text(
        &self,
        text: &mut EditableText,
        relay: &DelegateRelay,
        marked: &str,
    ) -> ChangeOutcome {
        let _span = PerfSpan::new(span_names::MUTATION);
        let range = text.composing().unwrap_or(text.selection());
        if range.is_empty() && marked.is_empty() {
            text.set_composing(None);
            return ChangeOutcome::Unchanged;
        }

        let inserted = text.replace(range, marked);
        if marked.is_empty() {
            text.set_composing(None);
            if let Some(kept) = self.clip_committed(text, relay, true) {
                return ChangeOutcome::Clipped { kept };
            }
        } else {
            text.set_composing(Some(inserted));
        }
        tracing::trace!(target: targets::GATE, %inserted, "marked text updated");

        relay.text_changed(text.content());
        ChangeOutcome::Applied { inserted }
    }

    /// Commit `committed` in place of the marked text and end composition.
    ///
    /// Candidate commits skip the pre-checks; the committed buffer is
    /// trimmed afterwards if it went over the limit.
    pub fn commit_marked_text(
        &self,
        text: &mut EditableText,
        relay: &DelegateRelay,
        committed: &str,
    ) -> ChangeOutcome {
        let _span = PerfSpan::new(span_names::MUTATION);
        let range = text.composing().unwrap_or(text.selection());
        let inserted = text.replace(range, committed);
        text.set_composing(None);
        tracing::trace!(target: targets::GATE, %inserted, "marked text committed");

        if let Some(kept) = self.clip_committed(text, relay, true) {
            return ChangeOutcome::Clipped { kept };
        }
        relay.text_changed(text.content());
        ChangeOutcome::Applied { inserted }
    }

    /// End composition, keeping the marked text as typed.
    pub fn unmark_text(&self, text: &mut EditableText, relay: &DelegateRelay) -> ChangeOutcome {
        if !text.is_composing() {
            return ChangeOutcome::Unchanged;
        }
        text.set_composing(None);
        match self.clip_committed(text, relay, true) {
            Some(kept) => ChangeOutcome::Clipped { kept },
            None => ChangeOutcome::Unchanged,
        }
    }

    /// Trim committed text that ended up over the limit.
    ///
    /// Returns the kept byte length when the buffer was cut.
    fn clip_committed(&self, text: &mut EditableText, relay: &DelegateRelay, notify: bool) -> Option<usize> {
        let kept = self
            .policy
            .enforce_committed(text.content(), text.composing())?;
        text.truncate(kept);
        if notify {
            relay.text_changed(text.content());
        }
        relay.change_prevented(text.selection(), None);
        Some(kept)
    }
}

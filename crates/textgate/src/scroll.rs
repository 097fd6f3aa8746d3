//! Keeping the caret inside the visible viewport.
//!
//! After an accepted edit the coordinator works out whether the caret is
//! still visible once both the container inset and the scroll content inset
//! are taken off the viewport, and computes a corrected scroll offset if it
//! is not. Reflowing wrapped lines makes hosts issue their own scroll writes
//! in the same run-loop turn, and those writes ignore the bottom content
//! inset. The coordinator therefore opens a suppression window on every
//! reconciliation: external offset writes are refused until [`settle`] runs
//! on the next tick, applies the corrected offset and closes the window.
//!
//! [`settle`]: CaretScrollCoordinator::settle

use textgate_core::logging::targets;
use textgate_core::{Insets, Rect};

/// Padding between the viewport and the text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollGeometry {
    /// Padding between the input's frame and its text container.
    pub container_inset: Insets,
    /// Extra scrollable padding around the content.
    pub content_inset: Insets,
}

impl ScrollGeometry {
    /// Create geometry from both insets.
    pub fn new(container_inset: Insets, content_inset: Insets) -> Self {
        Self {
            container_inset,
            content_inset,
        }
    }

    /// Both insets combined.
    pub fn total_inset(&self) -> Insets {
        self.container_inset + self.content_inset
    }

    /// The part of `viewport` in which the caret counts as visible.
    pub fn visible_rect(&self, viewport: Rect) -> Rect {
        viewport.inset_by(self.total_inset())
    }
}

/// The result of reconciling the caret against the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reconcile {
    /// The caret or viewport was not laid out; nothing was done.
    Skipped,
    /// The caret is already visible.
    Visible,
    /// The viewport must scroll to `target` on the next tick.
    Scroll { target: f32 },
}

/// Tracks the vertical scroll offset and corrects it after edits.
#[derive(Debug, Clone, Default)]
pub struct CaretScrollCoordinator {
    offset: f32,
    suppressing: bool,
    pending: Option<f32>,
}

impl CaretScrollCoordinator {
    /// Create a coordinator at offset zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current vertical scroll offset.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Whether external offset writes are currently refused.
    pub fn is_suppressing(&self) -> bool {
        self.suppressing
    }

    /// The corrected offset waiting for the next tick.
    pub fn pending(&self) -> Option<f32> {
        self.pending
    }

    /// Compute the offset that brings `caret` into view.
    ///
    /// `viewport` is the visible bounds in content coordinates, so its top
    /// edge is the current scroll offset. Any reconciliation that is not
    /// skipped opens (or re-arms) the suppression window and replaces a
    /// correction still waiting from an earlier one.
    pub fn reconcile(&mut self, caret: Rect, viewport: Rect, geometry: ScrollGeometry) -> Reconcile {
        if !caret.is_finite() || !viewport.is_finite() {
            tracing::trace!(target: targets::SCROLL, ?caret, "degenerate caret rect, skipping");
            return Reconcile::Skipped;
        }

        let insets = geometry.total_inset();
        let visible = geometry.visible_rect(viewport);
        let min_offset = -geometry.content_inset.top;

        let outcome = if caret.top() == visible.top()
            || (caret.top() >= visible.top() && caret.bottom() <= visible.bottom())
        {
            Reconcile::Visible
        } else if caret.top() < visible.top() {
            Reconcile::Scroll {
                target: (caret.top() - insets.top).max(min_offset),
            }
        } else {
            Reconcile::Scroll {
                target: (caret.bottom() - viewport.height() + insets.bottom).max(min_offset),
            }
        };

        self.suppressing = true;
        self.pending = match outcome {
            Reconcile::Scroll { target } => Some(target),
            _ => None,
        };
        tracing::trace!(target: targets::SCROLL, ?outcome, "caret reconciled");
        outcome
    }

    /// Offer an offset write from outside (host auto-scroll, user drag).
    ///
    /// Returns `false` and leaves the offset untouched while a suppression
    /// window is open.
    pub fn request_offset(&mut self, offset: f32) -> bool {
        if self.suppressing {
            tracing::trace!(target: targets::SCROLL, offset, "external scroll suppressed");
            return false;
        }
        self.offset = offset;
        true
    }

    /// Close the suppression window, applying any pending correction.
    ///
    /// Returns the applied offset, if a correction was pending.
    pub fn settle(&mut self) -> Option<f32> {
        self.suppressing = false;
        let applied = self.pending.take()?;
        self.offset = applied;
        tracing::trace!(target: targets::SCROLL, offset = applied, "scroll correction applied");
        Some(applied)
    }
}

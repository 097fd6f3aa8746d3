//! The host-facing editing controller.
//!
//! [`GuardedTextEdit`] owns the buffer together with the mutation gate, the
//! caret scroll coordinator, the placeholder synchronizer, the auto-resizer
//! and the observer relay. Every mutation runs one cycle in a fixed order:
//! admissibility, mutation, observer notification, caret reconciliation,
//! placeholder sync, then height measurement.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use textgate::{ChangeOutcome, GuardedTextEdit, TextEditConfig, TextEditObserver, TextRange};
//!
//! struct Composer;
//!
//! impl TextEditObserver for Composer {
//!     fn on_submit_requested(&self) -> bool {
//!         true
//!     }
//! }
//!
//! let composer = Rc::new(Composer);
//! let mut edit = GuardedTextEdit::with_config(
//!     TextEditConfig::new().with_maximum_length(5).with_placeholder("Message"),
//! );
//! edit.set_observer(&composer);
//!
//! assert!(edit.is_placeholder_visible());
//! edit.insert("Hello, world").unwrap();
//! assert_eq!(edit.content(), "Hello");
//!
//! // Enter sends instead of inserting a newline.
//! edit.delete_backward().unwrap();
//! edit.set_selection(TextRange::caret(2)).unwrap();
//! assert_eq!(edit.insert("\n").unwrap(), ChangeOutcome::Submitted);
//! assert_eq!(edit.content(), "Hell");
//! ```

use std::fmt;
use std::rc::Rc;

use textgate_core::logging::span_names;
use textgate_core::{Color, PerfSpan, Rect, Signal, TaskId, TickQueue};

use crate::config::TextEditConfig;
use crate::error::Result;
use crate::gate::{ChangeOutcome, MutationGate};
use crate::length::{CountingMode, LengthPolicy};
use crate::measure::{AutoResizer, MonospaceMeasurer, TextMeasurer};
use crate::placeholder::{Placeholder, PlaceholderState, PlaceholderSynchronizer, TextStyle};
use crate::relay::{DelegateRelay, TextEditObserver};
use crate::scroll::{CaretScrollCoordinator, Reconcile, ScrollGeometry};
use crate::text::{ChangeOrigin, EditableText, TextRange};

/// A length-constrained, composition-aware multi-line text editing controller.
pub struct GuardedTextEdit {
    text: EditableText,
    gate: MutationGate,
    relay: DelegateRelay,
    scroll: CaretScrollCoordinator,
    placeholder_sync: PlaceholderSynchronizer,
    placeholder: Placeholder,
    typing_style: TextStyle,
    resizer: AutoResizer,
    measurer: Box<dyn TextMeasurer>,
    viewport: Option<Rect>,
    geometry: ScrollGeometry,
    ticks: TickQueue<GuardedTextEdit>,
    settle_task: Option<TaskId>,

    /// Emitted when the placeholder overlay must be shown, hidden or restyled.
    pub placeholder_changed: Signal<PlaceholderState>,
    /// Emitted when a deferred caret correction scrolls the viewport.
    pub scroll_offset_changed: Signal<f32>,
}

impl GuardedTextEdit {
    /// Create an unbounded editor with no placeholder.
    pub fn new() -> Self {
        Self::with_config(TextEditConfig::default())
    }

    /// Create an editor from a configuration.
    pub fn with_config(config: TextEditConfig) -> Self {
        let mut edit = Self {
            text: EditableText::new(),
            gate: MutationGate::default(),
            relay: DelegateRelay::new(),
            scroll: CaretScrollCoordinator::new(),
            placeholder_sync: PlaceholderSynchronizer::new(),
            placeholder: Placeholder::default(),
            typing_style: TextStyle::default(),
            resizer: AutoResizer::default(),
            measurer: Box::new(MonospaceMeasurer::default()),
            viewport: None,
            geometry: ScrollGeometry::default(),
            ticks: TickQueue::new(),
            settle_task: None,
            placeholder_changed: Signal::new(),
            scroll_offset_changed: Signal::new(),
        };
        edit.apply_config(&config);
        edit
    }

    /// Replace the measurer used for caret placement and auto-resizing.
    pub fn with_measurer(mut self, measurer: impl TextMeasurer + 'static) -> Self {
        self.measurer = Box::new(measurer);
        self
    }

    /// Apply every setting in `config`.
    ///
    /// Existing content is not trimmed to a lowered maximum; the next
    /// mutation enforces it.
    pub fn apply_config(&mut self, config: &TextEditConfig) {
        textgate_core::textgate_debug!(?config, "applying configuration");
        *self.gate.policy_mut() = LengthPolicy::new(config.length_policy());
        self.gate
            .set_notify_on_programmatic_change(config.notify_on_programmatic_change);
        self.resizer.set_enabled(config.auto_resize);
        self.resizer.set_maximum_height(config.maximum_height);
        self.placeholder = Placeholder {
            text: config.placeholder.clone(),
            color: config.placeholder_color,
        };
        self.sync_placeholder();
    }

    // =========================================================================
    // State Access
    // =========================================================================

    /// The buffer with its selection and composition state.
    pub fn text(&self) -> &EditableText {
        &self.text
    }

    /// The current content.
    pub fn content(&self) -> &str {
        self.text.content()
    }

    /// Weight of the content under the active counting mode.
    pub fn effective_length(&self) -> usize {
        self.gate.policy().weigh(self.text.content())
    }

    /// The observer relay, for connecting to its signals.
    pub fn relay(&self) -> &DelegateRelay {
        &self.relay
    }

    /// The current vertical scroll offset.
    pub fn scroll_offset(&self) -> f32 {
        self.scroll.offset()
    }

    /// Whether external scroll writes are currently suppressed.
    pub fn is_scroll_suppressed(&self) -> bool {
        self.scroll.is_suppressing()
    }

    /// Whether the placeholder overlay is visible.
    pub fn is_placeholder_visible(&self) -> bool {
        self.placeholder_sync.is_visible()
    }

    /// The placeholder overlay state.
    pub fn placeholder_state(&self) -> Option<&PlaceholderState> {
        self.placeholder_sync.state()
    }

    /// The caret rectangle in content coordinates, once laid out.
    pub fn caret_rect(&self) -> Option<Rect> {
        let viewport = self.viewport?;
        let inset = self.geometry.container_inset;
        let caret = self.measurer.caret_rect(
            self.text.content(),
            self.text.selection().end,
            viewport.width() - inset.horizontal(),
        );
        Some(caret.offset(inset.left, inset.top))
    }

    /// The height the content needs at the current width.
    pub fn fitting_height(&self) -> Option<f32> {
        let viewport = self.viewport?;
        Some(self.resizer.fitting_height(
            self.measurer.as_ref(),
            self.text.content(),
            viewport.width(),
            self.geometry.container_inset,
        ))
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Register the observer. Only a weak reference is kept.
    pub fn set_observer<O>(&mut self, observer: &Rc<O>)
    where
        O: TextEditObserver + 'static,
    {
        self.relay.set_observer(observer);
    }

    /// Remove the observer.
    pub fn clear_observer(&mut self) {
        self.relay.clear_observer();
    }

    /// The maximum length, if any.
    pub fn maximum_length(&self) -> Option<usize> {
        self.gate.policy().maximum_length()
    }

    /// Set the maximum length. `None` removes the limit.
    pub fn set_maximum_length(&mut self, maximum_length: Option<usize>) {
        self.gate.policy_mut().set_maximum_length(maximum_length);
    }

    /// The counting mode.
    pub fn counting_mode(&self) -> CountingMode {
        self.gate.policy().counting_mode()
    }

    /// Set the counting mode.
    pub fn set_counting_mode(&mut self, mode: CountingMode) {
        self.gate.policy_mut().set_counting_mode(mode);
    }

    /// Set whether programmatic changes are reported to the observer.
    pub fn set_notify_on_programmatic_change(&mut self, notify: bool) {
        self.gate.set_notify_on_programmatic_change(notify);
    }

    /// Turn auto-resizing on or off.
    pub fn set_auto_resize(&mut self, enabled: bool) {
        self.resizer.set_enabled(enabled);
        self.update_height();
    }

    /// Cap the auto-resized height.
    pub fn set_maximum_height(&mut self, maximum_height: Option<f32>) {
        self.resizer.set_maximum_height(maximum_height);
        self.update_height();
    }

    /// Set the placeholder text and color.
    pub fn set_placeholder(&mut self, text: Option<String>, color: Color) {
        self.placeholder = Placeholder { text, color };
        self.sync_placeholder();
    }

    /// The live typing style.
    pub fn typing_style(&self) -> &TextStyle {
        &self.typing_style
    }

    /// Set the live typing style; the placeholder follows it.
    pub fn set_typing_style(&mut self, style: TextStyle) {
        self.typing_style = style;
        self.sync_placeholder();
    }

    /// Set the text color of the typing style.
    pub fn set_text_color(&mut self, color: Color) {
        self.typing_style.color = color;
        self.sync_placeholder();
    }

    /// Report the viewport (visible bounds in content coordinates) and insets.
    ///
    /// The viewport's top edge is offered as the scroll offset, which is
    /// ignored while a caret correction is pending.
    pub fn set_layout(&mut self, viewport: Rect, geometry: ScrollGeometry) {
        self.viewport = Some(viewport);
        self.geometry = geometry;
        self.scroll.request_offset(viewport.top());
        self.update_height();
    }

    /// Offer a scroll offset write from the host's own scrolling.
    ///
    /// Returns `false` when it was suppressed.
    pub fn request_scroll_offset(&mut self, offset: f32) -> bool {
        self.scroll.request_offset(offset)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Try to replace `range` with `replacement`.
    pub fn attempt_change(
        &mut self,
        range: TextRange,
        replacement: &str,
        origin: ChangeOrigin,
    ) -> Result<ChangeOutcome> {
        let outcome = self
            .gate
            .attempt_change(&mut self.text, &self.relay, range, replacement, origin)?;
        self.after_change(outcome);
        Ok(outcome)
    }

    /// Type `text` over the current selection.
    pub fn insert(&mut self, text: &str) -> Result<ChangeOutcome> {
        let range = self.text.selection();
        self.attempt_change(range, text, ChangeOrigin::Interactive)
    }

    /// Delete the selection, or the character before the caret.
    pub fn delete_backward(&mut self) -> Result<ChangeOutcome> {
        let selection = self.text.selection();
        let range = if selection.is_empty() {
            let start = self.text.content()[..selection.start]
                .char_indices()
                .next_back()
                .map_or(selection.start, |(offset, _)| offset);
            TextRange::new(start, selection.start)
        } else {
            selection
        };
        if range.is_empty() {
            return Ok(ChangeOutcome::Unchanged);
        }
        self.attempt_change(range, "", ChangeOrigin::Interactive)
    }

    /// Replace the whole content from host code.
    ///
    /// Setting the current content again does nothing.
    pub fn set_text(&mut self, text: &str) -> Result<ChangeOutcome> {
        if text == self.text.content() && !self.text.is_composing() {
            return Ok(ChangeOutcome::Unchanged);
        }
        let all = TextRange::new(0, self.text.len());
        self.attempt_change(all, text, ChangeOrigin::Programmatic)
    }

    /// Move the caret or selection.
    pub fn set_selection(&mut self, selection: TextRange) -> Result<()> {
        self.text.validate(selection)?;
        self.text.set_selection(selection);
        Ok(())
    }

    /// Update the input method's marked text.
    pub fn set_marked_text(&mut self, marked: &str) -> ChangeOutcome {
        let outcome = self.gate.set_marked_text(&mut self.text, &self.relay, marked);
        self.after_change(outcome);
        outcome
    }

    /// Commit the input method's chosen candidate.
    pub fn commit_marked_text(&mut self, committed: &str) -> ChangeOutcome {
        let outcome = self
            .gate
            .commit_marked_text(&mut self.text, &self.relay, committed);
        self.after_change(outcome);
        outcome
    }

    /// End composition, keeping the marked text.
    pub fn unmark_text(&mut self) -> ChangeOutcome {
        let outcome = self.gate.unmark_text(&mut self.text, &self.relay);
        self.after_change(outcome);
        outcome
    }

    // =========================================================================
    // Ticks
    // =========================================================================

    /// Run the work deferred to this run-loop turn.
    ///
    /// Hosts call this once per turn of their run loop. Returns the number
    /// of tasks run.
    pub fn run_pending_ticks(&mut self) -> usize {
        let batch = self.ticks.take_batch();
        if batch.is_empty() {
            return 0;
        }
        let _span = PerfSpan::new(span_names::TICK);
        textgate_core::textgate_trace!(tasks = batch.len(), "running deferred tasks");
        batch.run(self)
    }

    /// Whether deferred work is waiting for the next tick.
    pub fn has_pending_ticks(&self) -> bool {
        self.ticks.has_pending()
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn after_change(&mut self, outcome: ChangeOutcome) {
        if !outcome.is_mutated() {
            return;
        }
        self.reconcile_caret();
        self.sync_placeholder();
        self.update_height();
    }

    fn reconcile_caret(&mut self) {
        let (Some(viewport), Some(caret)) = (self.viewport, self.caret_rect()) else {
            return;
        };
        let viewport = Rect::new(
            viewport.left(),
            self.scroll.offset(),
            viewport.width(),
            viewport.height(),
        );
        if self.scroll.reconcile(caret, viewport, self.geometry) == Reconcile::Skipped {
            return;
        }
        if let Some(superseded) = self.settle_task.take() {
            self.ticks.cancel(superseded);
        }
        self.settle_task = Some(self.ticks.post(GuardedTextEdit::settle_scroll));
    }

    fn settle_scroll(&mut self) {
        self.settle_task = None;
        if let Some(offset) = self.scroll.settle() {
            self.scroll_offset_changed.emit(offset);
        }
    }

    fn sync_placeholder(&mut self) {
        if let Some(state) =
            self.placeholder_sync
                .sync(self.text.content(), &self.typing_style, &self.placeholder)
        {
            self.placeholder_changed.emit(state.clone());
        }
    }

    fn update_height(&mut self) {
        let Some(viewport) = self.viewport else {
            return;
        };
        if let Some(height) = self.resizer.update(
            self.measurer.as_ref(),
            self.text.content(),
            viewport.width(),
            self.geometry.container_inset,
        ) {
            self.relay.height_should_change(height);
        }
    }
}

impl Default for GuardedTextEdit {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GuardedTextEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedTextEdit")
            .field("text", &self.text)
            .field("gate", &self.gate)
            .field("scroll", &self.scroll)
            .field("viewport", &self.viewport)
            .field("pending_ticks", &self.ticks.pending_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use textgate_core::Insets;

    fn laid_out() -> GuardedTextEdit {
        let mut edit = GuardedTextEdit::new().with_measurer(MonospaceMeasurer::new(10.0, 20.0));
        edit.set_layout(
            Rect::new(0.0, 0.0, 100.0, 60.0),
            ScrollGeometry::new(Insets::ZERO, Insets::ZERO),
        );
        edit
    }

    #[test]
    fn test_insert_and_delete_backward() {
        let mut edit = GuardedTextEdit::new();
        edit.insert("a中").unwrap();
        assert_eq!(edit.content(), "a中");

        edit.delete_backward().unwrap();
        assert_eq!(edit.content(), "a");
        edit.delete_backward().unwrap();
        assert_eq!(edit.delete_backward().unwrap(), ChangeOutcome::Unchanged);
        assert_eq!(edit.content(), "");
    }

    #[test]
    fn test_set_text_same_content_is_unchanged() {
        let mut edit = GuardedTextEdit::new();
        assert!(edit.set_text("abc").unwrap().is_mutated());
        assert_eq!(edit.set_text("abc").unwrap(), ChangeOutcome::Unchanged);
        assert_eq!(edit.text().selection(), TextRange::caret(3));
    }

    #[test]
    fn test_set_text_respects_maximum_length() {
        let mut edit = GuardedTextEdit::with_config(TextEditConfig::new().with_maximum_length(3));
        let outcome = edit.set_text("abcdef").unwrap();
        assert_eq!(outcome, ChangeOutcome::Truncated { inserted: TextRange::new(0, 3) });
        assert_eq!(edit.content(), "abc");
        assert_eq!(edit.effective_length(), 3);
    }

    #[test]
    fn test_set_selection_validates() {
        let mut edit = GuardedTextEdit::new();
        edit.insert("中").unwrap();
        assert!(edit.set_selection(TextRange::caret(1)).is_err());
        assert!(edit.set_selection(TextRange::new(0, 3)).is_ok());
    }

    #[test]
    fn test_caret_correction_waits_for_next_tick() {
        let mut edit = laid_out();
        let emitted = Arc::new(AtomicUsize::new(0));
        let counter = emitted.clone();
        edit.scroll_offset_changed.connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // Four lines in a three-line viewport.
        edit.insert("0123456789012345678901234567890").unwrap();
        assert!(edit.is_scroll_suppressed());
        assert_eq!(edit.scroll_offset(), 0.0);

        // Same-tick host scroll is refused.
        assert!(!edit.request_scroll_offset(5.0));

        assert_eq!(edit.run_pending_ticks(), 1);
        assert_eq!(edit.scroll_offset(), 20.0);
        assert!(!edit.is_scroll_suppressed());
        assert_eq!(emitted.load(Ordering::SeqCst), 1);
        assert!(edit.request_scroll_offset(5.0));
    }

    #[test]
    fn test_second_mutation_resets_window_without_stacking() {
        let mut edit = laid_out();
        edit.insert("0123456789012345678901234567890").unwrap();
        edit.insert("0123456789").unwrap();
        assert_eq!(edit.ticks.pending_count(), 1);

        assert_eq!(edit.run_pending_ticks(), 1);
        assert_eq!(edit.scroll_offset(), 40.0);
        assert_eq!(edit.run_pending_ticks(), 0);
    }

    #[test]
    fn test_window_cleared_even_without_correction() {
        let mut edit = laid_out();
        edit.insert("hi").unwrap();
        assert!(edit.is_scroll_suppressed());
        edit.run_pending_ticks();
        assert!(!edit.is_scroll_suppressed());
        assert_eq!(edit.scroll_offset(), 0.0);
    }

    #[test]
    fn test_no_reconciliation_before_layout() {
        let mut edit = GuardedTextEdit::new();
        edit.insert("hi").unwrap();
        assert!(edit.caret_rect().is_none());
        assert!(!edit.has_pending_ticks());
        assert!(!edit.is_scroll_suppressed());
    }

    #[test]
    fn test_typing_style_restyles_placeholder() {
        let mut edit = GuardedTextEdit::with_config(TextEditConfig::new().with_placeholder("Search"));
        let restyled = Arc::new(AtomicUsize::new(0));
        let counter = restyled.clone();
        edit.placeholder_changed.connect(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        edit.set_text_color(Color::from_rgb8(10, 20, 30));
        // Only the typing color changed; the overlay keeps its own color.
        assert_eq!(restyled.load(Ordering::SeqCst), 0);

        edit.set_typing_style(TextStyle {
            font_size: 30.0,
            ..TextStyle::default()
        });
        assert_eq!(restyled.load(Ordering::SeqCst), 1);
        assert_eq!(edit.placeholder_state().unwrap().style.font_size, 30.0);
    }
}

//! Forwarding editing events to the host.
//!
//! The host registers one [`TextEditObserver`]; the relay keeps only a weak
//! reference to it, so the observer may own the editor without a cycle.
//! Every callback has a no-op default, so observers implement just what they
//! need. The same events are also emitted on the relay's signals for any
//! number of additional listeners.

use std::fmt;
use std::rc::{Rc, Weak};

use textgate_core::Signal;
use textgate_core::logging::targets;

use crate::text::TextRange;

/// Receives editing events from a [`GuardedTextEdit`](crate::GuardedTextEdit).
pub trait TextEditObserver {
    /// Pre-check hook consulted before a change is applied.
    ///
    /// Returning `false` drops the change silently.
    fn should_admit_change(&self, _range: TextRange, _replacement: &str) -> bool {
        true
    }

    /// The buffer changed. `text` is the new content.
    fn on_text_changed(&self, _text: &str) {}

    /// An auto-growing input needs a new height.
    fn on_height_should_change(&self, _height: f32) {}

    /// A change was refused or cut short by the length limit.
    ///
    /// `replacement` is `None` when the buffer had to be trimmed after the
    /// fact and the causing edit can no longer be identified; `range` is
    /// then the selection after trimming.
    fn on_change_prevented(&self, _range: TextRange, _replacement: Option<&str>) {}

    /// Enter was pressed. Return `true` to treat it as a submit action and
    /// keep the newline out of the buffer.
    fn on_submit_requested(&self) -> bool {
        false
    }
}

/// A change that the length limit refused or cut short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreventedChange {
    /// The affected range.
    pub range: TextRange,
    /// The proposed text, if the causing edit is known.
    pub replacement: Option<String>,
}

/// Dispatches editing events to the registered observer and the signals.
#[derive(Default)]
pub struct DelegateRelay {
    observer: Option<Weak<dyn TextEditObserver>>,

    /// Emitted with the new content after every notified change.
    pub text_changed: Signal<String>,
    /// Emitted with the new height of an auto-growing input.
    pub height_changed: Signal<f32>,
    /// Emitted when a change is refused or cut short.
    pub change_prevented: Signal<PreventedChange>,
    /// Emitted when Enter is treated as a submit action.
    pub submit_requested: Signal<()>,
}

impl DelegateRelay {
    /// Create a relay without an observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the observer. Only a weak reference is kept.
    pub fn set_observer<O>(&mut self, observer: &Rc<O>)
    where
        O: TextEditObserver + 'static,
    {
        let weak: Weak<O> = Rc::downgrade(observer);
        self.observer = Some(weak);
    }

    /// Remove the observer.
    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    /// The observer, if registered and still alive.
    pub fn observer(&self) -> Option<Rc<dyn TextEditObserver>> {
        self.observer.as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn should_admit_change(&self, range: TextRange, replacement: &str) -> bool {
        let admitted = self
            .observer()
            .is_none_or(|observer| observer.should_admit_change(range, replacement));
        if !admitted {
            tracing::debug!(target: targets::RELAY, %range, "observer vetoed change");
        }
        admitted
    }

    pub(crate) fn text_changed(&self, text: &str) {
        if let Some(observer) = self.observer() {
            observer.on_text_changed(text);
        }
        self.text_changed.emit(text.to_string());
    }

    pub(crate) fn height_should_change(&self, height: f32) {
        if let Some(observer) = self.observer() {
            observer.on_height_should_change(height);
        }
        self.height_changed.emit(height);
    }

    pub(crate) fn change_prevented(&self, range: TextRange, replacement: Option<&str>) {
        tracing::debug!(
            target: targets::RELAY,
            %range,
            replacement = ?replacement,
            "change prevented"
        );
        if let Some(observer) = self.observer() {
            observer.on_change_prevented(range, replacement);
        }
        self.change_prevented.emit(PreventedChange {
            range,
            replacement: replacement.map(str::to_string),
        });
    }

    /// Ask whether Enter should submit. Emits `submit_requested` if so.
    pub(crate) fn submit_requested(&self) -> bool {
        let submit = self
            .observer()
            .is_some_and(|observer| observer.on_submit_requested());
        if submit {
            tracing::debug!(target: targets::RELAY, "enter treated as submit");
            self.submit_requested.emit(());
        }
        submit
    }
}

impl fmt::Debug for DelegateRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateRelay")
            .field("has_observer", &self.observer().is_some())
            .finish_non_exhaustive()
    }
}

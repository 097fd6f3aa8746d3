//! textgate - a length-constrained, composition-aware text editing controller.
//!
//! This is the main crate. It re-exports the core foundations and adds the
//! editing controller on top:
//!
//! - [`MutationGate`]: the single entry point for buffer mutations
//! - [`LengthPolicy`]: maximum length enforcement on grapheme boundaries
//! - [`CaretScrollCoordinator`]: keeping the caret visible after edits
//! - [`PlaceholderSynchronizer`]: placeholder overlay state
//! - [`AutoResizer`]: height reporting for auto-growing inputs
//! - [`GuardedTextEdit`]: all of the above composed for a host
//!
//! # Example
//!
//! ```
//! use textgate::{ChangeOrigin, ChangeOutcome, GuardedTextEdit, TextEditConfig, TextRange};
//!
//! let mut edit = GuardedTextEdit::with_config(TextEditConfig::new().with_maximum_length(10));
//! edit.set_text("Hello").unwrap();
//!
//! let outcome = edit
//!     .attempt_change(TextRange::caret(5), ", world", ChangeOrigin::Interactive)
//!     .unwrap();
//! assert!(matches!(outcome, ChangeOutcome::Truncated { .. }));
//! assert_eq!(edit.content(), "Hello, wor");
//! ```

pub use textgate_core::*;

mod config;
mod edit;
mod error;
mod gate;
mod length;
mod measure;
mod placeholder;
mod relay;
mod scroll;
mod text;

pub use config::TextEditConfig;
pub use edit::GuardedTextEdit;
pub use error::{EditError, Result};
pub use gate::{ChangeOutcome, MutationGate};
pub use length::{
    CountingMode, LengthPolicy, LengthPolicyConfig, LengthVerdict, prefix_within, weigh,
};
pub use measure::{AutoResizer, MonospaceMeasurer, TextMeasurer};
pub use placeholder::{
    DEFAULT_PLACEHOLDER_COLOR, Placeholder, PlaceholderState, PlaceholderSynchronizer,
    TextAlignment, TextStyle,
};
pub use relay::{DelegateRelay, PreventedChange, TextEditObserver};
pub use scroll::{CaretScrollCoordinator, Reconcile, ScrollGeometry};
pub use text::{ChangeOrigin, EditableText, TextRange};

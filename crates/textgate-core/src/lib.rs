//! Core systems for textgate.
//!
//! This crate provides the foundations the editing controller is built on:
//!
//! - **Geometry**: points, sizes, rectangles, edge insets and colors
//! - **Signals**: multi-listener notifications
//! - **Tick Queue**: tasks deferred to the next run-loop turn
//! - **Logging**: `tracing` targets and span helpers
//!
//! # Signal Example
//!
//! ```
//! use textgate_core::Signal;
//!
//! let height_changed = Signal::<f32>::new();
//! let conn_id = height_changed.connect(|height| {
//!     println!("New height: {}", height);
//! });
//!
//! height_changed.emit(54.0);
//! height_changed.disconnect(conn_id);
//! ```
//!
//! # Tick Queue Example
//!
//! ```
//! use textgate_core::TickQueue;
//!
//! let mut queue = TickQueue::<Vec<&str>>::new();
//! queue.post(|log| log.push("settled"));
//!
//! let mut log = Vec::new();
//! queue.process_all(&mut log);
//! assert_eq!(log, ["settled"]);
//! ```

pub mod geometry;
pub mod logging;
pub mod signal;
mod task;

pub use geometry::{Color, Insets, Point, Rect, Size};
pub use logging::PerfSpan;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use task::{TaskId, TickBatch, TickQueue};

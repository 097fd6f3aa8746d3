//! Multi-listener notifications.
//!
//! Editor state changes (new content, a new height, a refused paste) are
//! broadcast on a [`Signal`]. Listeners run synchronously on the emitting
//! thread, in the order they were connected.
//!
//! ```
//! use textgate_core::Signal;
//!
//! let height_changed = Signal::<f32>::new();
//! let id = height_changed.connect(|height| println!("grow to {height}"));
//!
//! height_changed.emit(48.0);
//! assert!(height_changed.disconnect(id));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Identifies one listener on a [`Signal`].
    pub struct ConnectionId;
}

type Listener<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Broadcasts a value of type `Args` to every connected listener.
pub struct Signal<Args> {
    listeners: Mutex<SlotMap<ConnectionId, Listener<Args>>>,
    blocked: AtomicBool,
}

static_assertions::assert_impl_all!(Signal<String>: Send, Sync);
static_assertions::assert_impl_all!(Signal<f32>: Send, Sync);

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// A signal with no listeners.
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Add a listener.
    pub fn connect<F>(&self, listener: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.listeners.lock().insert(Arc::new(listener))
    }

    /// Add a listener that stays connected while the guard lives.
    ///
    /// ```
    /// use textgate_core::Signal;
    ///
    /// let submitted = Signal::<()>::new();
    /// {
    ///     let _guard = submitted.connect_scoped(|_| {});
    ///     assert_eq!(submitted.listener_count(), 1);
    /// }
    /// assert_eq!(submitted.listener_count(), 0);
    /// ```
    pub fn connect_scoped<F>(&self, listener: F) -> ConnectionGuard<'_, Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        ConnectionGuard {
            id: self.connect(listener),
            signal: self,
        }
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.listeners.lock().remove(id).is_some()
    }

    /// Remove every listener.
    pub fn disconnect_all(&self) {
        self.listeners.lock().clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Mute or unmute the signal. A muted signal drops emitted values.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Deliver `args` to every listener.
    ///
    /// Listeners are collected before the first one runs. A listener may
    /// connect, disconnect or emit again; a listener added during delivery
    /// first hears the next emission.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "blocked, dropping emission");
            return;
        }

        let listeners: Vec<Listener<Args>> = self.listeners.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, listeners = listeners.len(), "emit");
        for listener in &listeners {
            listener(&args);
        }
    }
}

/// Disconnects its listener on drop. Returned by [`Signal::connect_scoped`].
pub struct ConnectionGuard<'a, Args: 'static> {
    signal: &'a Signal<Args>,
    id: ConnectionId,
}

impl<Args: 'static> ConnectionGuard<'_, Args> {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args: 'static> Drop for ConnectionGuard<'_, Args> {
    fn drop(&mut self) {
        self.signal.disconnect(self.id);
    }
}

//! Work deferred to the next turn of the host's run loop.
//!
//! Some corrections must wait until the host has finished its own reaction
//! to an edit in the current turn. They are posted to a [`TickQueue`] and
//! run when the host drives the queue on its next turn. Each task gets
//! mutable access to a context owned by whoever drives the queue.

use std::collections::VecDeque;
use std::fmt;

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Handle to a posted task, used to cancel it.
    pub struct TaskId;
}

type Deferred<C> = Box<dyn FnOnce(&mut C) + 'static>;

/// Tasks waiting for the next tick, run in posting order.
pub struct TickQueue<C> {
    tasks: SlotMap<TaskId, Deferred<C>>,
    // May hold ids of cancelled tasks; they are skipped when the batch is taken.
    order: VecDeque<TaskId>,
}

impl<C> TickQueue<C> {
    pub fn new() -> Self {
        Self {
            tasks: SlotMap::with_key(),
            order: VecDeque::new(),
        }
    }

    /// Defer `task` to the next tick.
    pub fn post<F>(&mut self, task: F) -> TaskId
    where
        F: FnOnce(&mut C) + 'static,
    {
        let id = self.tasks.insert(Box::new(task));
        self.order.push_back(id);
        id
    }

    /// Drop a task before it runs. Returns `false` if it already ran or was
    /// cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let cancelled = self.tasks.remove(id).is_some();
        if self.tasks.is_empty() {
            self.order.clear();
        }
        cancelled
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn has_pending(&self) -> bool {
        !self.tasks.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Detach everything due on this tick, leaving the queue empty.
    ///
    /// Anything posted while the batch runs is due on the tick after. This
    /// lets the context that runs the batch own the queue itself.
    pub fn take_batch(&mut self) -> TickBatch<C> {
        let tasks = self
            .order
            .drain(..)
            .filter_map(|id| self.tasks.remove(id))
            .collect();
        TickBatch { tasks }
    }

    /// Run everything due on this tick against `context`.
    pub fn process_all(&mut self, context: &mut C) -> usize {
        self.take_batch().run(context)
    }
}

impl<C> Default for TickQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for TickQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickQueue")
            .field("pending", &self.tasks.len())
            .finish()
    }
}

/// The tasks due on one tick, detached from their queue.
pub struct TickBatch<C> {
    tasks: Vec<Deferred<C>>,
}

impl<C> TickBatch<C> {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run the batch in posting order. Returns how many tasks ran.
    pub fn run(self, context: &mut C) -> usize {
        let ran = self.tasks.len();
        self.tasks.into_iter().for_each(|task| task(context));
        ran
    }
}

//! Cancellable timers and per-key debouncing.
//!
//! `Timers` is the host's deferred-execution primitive. `Debouncer` builds
//! debounce-by-key on top of it: scheduling a key disarms whatever timer is
//! outstanding for that key before arming a new one, so at most one task per
//! key is ever pending. Distinct keys never interact.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use hashbrown::HashMap;

/// Handle returned by `Timers::arm`.
pub type TimerId = u64;

/// Deferred unit of work.
pub type TimerTask = Box<dyn FnOnce()>;

/// A cancellable one-shot timer facility.
pub trait Timers {
    /// Runs `task` once, no earlier than `delay_ms` from now and never
    /// synchronously from inside `arm`.
    fn arm(&self, delay_ms: u32, task: TimerTask) -> TimerId;

    /// Cancels a timer. Fired or unknown ids are ignored.
    fn disarm(&self, id: TimerId);
}

struct Armed {
    id: TimerId,
    due: u64,
    task: TimerTask,
}

/// Timers driven by an explicit virtual clock.
///
/// Nothing fires until the owner calls `advance` or `run_until_idle`. Timers
/// fire in due order, ties broken by arming order.
#[derive(Default)]
pub struct ManualTimers {
    now: Cell<u64>,
    next_id: Cell<TimerId>,
    queue: RefCell<Vec<Armed>>,
}

impl ManualTimers {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Current virtual time in milliseconds.
    #[inline]
    pub fn now(&self) -> u64 {
        self.now.get()
    }

    /// Number of armed timers.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    fn take_due(&self, limit: u64) -> Option<Armed> {
        let mut queue = self.queue.borrow_mut();
        let idx = queue
            .iter()
            .enumerate()
            .filter(|(_, armed)| armed.due <= limit)
            .min_by_key(|(_, armed)| (armed.due, armed.id))
            .map(|(idx, _)| idx)?;
        Some(queue.remove(idx))
    }

    /// Moves the clock forward by `ms`, firing every timer that falls due,
    /// including timers armed by tasks fired along the way.
    pub fn advance(&self, ms: u64) {
        let target = self.now.get() + ms;
        while let Some(armed) = self.take_due(target) {
            if armed.due > self.now.get() {
                self.now.set(armed.due);
            }
            (armed.task)();
        }
        self.now.set(target);
    }

    /// Fires timers until none remain, moving the clock as far as needed.
    pub fn run_until_idle(&self) {
        while let Some(armed) = self.take_due(u64::MAX) {
            if armed.due > self.now.get() {
                self.now.set(armed.due);
            }
            (armed.task)();
        }
    }
}

impl Timers for ManualTimers {
    fn arm(&self, delay_ms: u32, task: TimerTask) -> TimerId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.queue.borrow_mut().push(Armed {
            id,
            due: self.now.get() + u64::from(delay_ms),
            task,
        });
        id
    }

    fn disarm(&self, id: TimerId) {
        self.queue.borrow_mut().retain(|armed| armed.id != id);
    }
}

struct Slot {
    generation: u64,
    timer: TimerId,
}

/// Debounce-by-key over a `Timers` driver.
pub struct Debouncer {
    timers: Rc<dyn Timers>,
    slots: Rc<RefCell<HashMap<String, Slot>>>,
    next_generation: Cell<u64>,
}

impl Debouncer {
    pub fn new(timers: Rc<dyn Timers>) -> Self {
        Self {
            timers,
            slots: Rc::new(RefCell::new(HashMap::new())),
            next_generation: Cell::new(0),
        }
    }

    /// Schedules `task` under `key`, superseding any pending task for `key`.
    pub fn schedule<F>(&self, key: &str, delay_ms: u32, task: F)
    where
        F: FnOnce() + 'static,
    {
        self.cancel(key);

        let generation = self.next_generation.get() + 1;
        self.next_generation.set(generation);

        let slots = Rc::downgrade(&self.slots);
        let owned = key.to_string();
        let timer = self.timers.arm(
            delay_ms,
            Box::new(move || {
                let Some(slots) = slots.upgrade() else {
                    return;
                };
                // Only the newest generation for a key may run.
                let current = {
                    let mut slots = slots.borrow_mut();
                    match slots.get(&owned) {
                        Some(slot) if slot.generation == generation => {
                            slots.remove(&owned);
                            true
                        }
                        _ => false,
                    }
                };
                if current {
                    task();
                }
            }),
        );

        self.slots
            .borrow_mut()
            .insert(key.to_string(), Slot { generation, timer });
    }

    /// Cancels the pending task for `key`. Returns true if one was pending.
    pub fn cancel(&self, key: &str) -> bool {
        let slot = self.slots.borrow_mut().remove(key);
        match slot {
            Some(slot) => {
                self.timers.disarm(slot.timer);
                true
            }
            None => false,
        }
    }

    /// Cancels every pending task.
    pub fn cancel_all(&self) {
        let drained: Vec<Slot> = self.slots.borrow_mut().drain().map(|(_, slot)| slot).collect();
        for slot in drained {
            self.timers.disarm(slot.timer);
        }
    }

    /// Whether a task is pending for `key`.
    pub fn is_pending(&self, key: &str) -> bool {
        self.slots.borrow().contains_key(key)
    }

    /// Number of keys with a pending task.
    pub fn pending_count(&self) -> usize {
        self.slots.borrow().len()
    }
}

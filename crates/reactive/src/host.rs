//! The host component seam.
//!
//! A host is the UI component instance queries are bound to. The binding
//! layer reads source properties (variables, skip conditions), writes result
//! and loading properties, and registers change observers.

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use gqlbind_core::Value;

/// Handle returned by `Host::observe`.
pub type ObserverId = u64;

/// Handler invoked with the new value of an observed property path.
pub type PropertyHandler = Rc<dyn Fn(&Value)>;

/// Property access and change observation on a component instance.
///
/// Implementations may invoke handlers synchronously from inside `set`.
/// Handlers must never be invoked while the host holds an internal borrow,
/// since they are allowed to call `get` and `set` again.
pub trait Host {
    /// Reads a property. Dotted paths (`user.id`) descend into objects.
    /// Missing properties read as `Value::Null`.
    fn get(&self, path: &str) -> Value;

    /// Writes a top-level property.
    fn set(&self, name: &str, value: Value);

    /// Registers `handler` to run whenever the value at `path` changes.
    fn observe(&self, path: &str, handler: PropertyHandler) -> ObserverId;

    /// Removes an observer. Unknown ids are ignored.
    fn unobserve(&self, id: ObserverId);
}

/// Whether a write to `name` affects the observed `path`: the property
/// itself or any path below it.
pub fn path_affected(path: &str, name: &str) -> bool {
    path == name
        || (path.len() > name.len()
            && path.starts_with(name)
            && path.as_bytes()[name.len()] == b'.')
}

struct Watcher {
    id: ObserverId,
    path: String,
    handler: PropertyHandler,
}

/// Observer bookkeeping for `Host` implementations.
#[derive(Default)]
pub struct ObserverList {
    watchers: RefCell<Vec<Watcher>>,
    next_id: Cell<ObserverId>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, path: &str, handler: PropertyHandler) -> ObserverId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.watchers.borrow_mut().push(Watcher {
            id,
            path: path.to_string(),
            handler,
        });
        id
    }

    pub fn remove(&self, id: ObserverId) {
        self.watchers.borrow_mut().retain(|w| w.id != id);
    }

    pub fn len(&self) -> usize {
        self.watchers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.borrow().is_empty()
    }

    /// Runs every handler affected by a write to `name`, passing the value
    /// `read` returns for its path. No borrow is held while handlers run.
    pub fn notify<R>(&self, name: &str, read: R)
    where
        R: Fn(&str) -> Value,
    {
        let affected: Vec<(String, PropertyHandler)> = self
            .watchers
            .borrow()
            .iter()
            .filter(|w| path_affected(&w.path, name))
            .map(|w| (w.path.clone(), w.handler.clone()))
            .collect();
        for (path, handler) in affected {
            let current = read(&path);
            handler(&current);
        }
    }
}

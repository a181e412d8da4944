//! In-memory host component.
//!
//! Stores properties in an `Object` and fires observers synchronously when a
//! write changes a value. Useful for headless hosts and tests; every write is
//! also kept in a log.

use crate::host::{Host, ObserverId, ObserverList, PropertyHandler};
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;
use gqlbind_core::{Object, Value};

/// A host whose properties live in memory.
#[derive(Default)]
pub struct MemoryHost {
    props: RefCell<Object>,
    observers: ObserverList,
    writes: RefCell<Vec<(String, Value)>>,
}

impl MemoryHost {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Every `set` call so far, oldest first.
    pub fn writes(&self) -> Vec<(String, Value)> {
        self.writes.borrow().clone()
    }

    /// Values written to `name`, oldest first.
    pub fn writes_to(&self, name: &str) -> Vec<Value> {
        self.writes
            .borrow()
            .iter()
            .filter(|(written, _)| written == name)
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl Host for MemoryHost {
    fn get(&self, path: &str) -> Value {
        let props = self.props.borrow();
        let found = match path.split_once('.') {
            Some((head, rest)) => props.get(head).and_then(|v| v.get_path(rest)),
            None => props.get(path),
        };
        found.cloned().unwrap_or(Value::Null)
    }

    fn set(&self, name: &str, value: Value) {
        self.writes
            .borrow_mut()
            .push((name.to_string(), value.clone()));

        let changed = self.props.borrow().get(name) != Some(&value);
        self.props.borrow_mut().insert(name, value);
        if changed {
            self.observers.notify(name, |path| self.get(path));
        }
    }

    fn observe(&self, path: &str, handler: PropertyHandler) -> ObserverId {
        self.observers.add(path, handler)
    }

    fn unobserve(&self, id: ObserverId) {
        self.observers.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use core::cell::Cell;

    #[test]
    fn test_get_missing_is_null() {
        let host = MemoryHost::new();
        assert_eq!(host.get("nothing"), Value::Null);
        assert_eq!(host.get("nothing.deeper"), Value::Null);
    }

    #[test]
    fn test_get_dotted_path() {
        let host = MemoryHost::new();
        let mut user = Object::new();
        user.insert("id", 9);
        host.set("user", Value::Object(user));

        assert_eq!(host.get("user.id"), Value::from(9));
    }

    #[test]
    fn test_observers_fire_on_change_only() {
        let host = MemoryHost::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        host.observe(
            "page",
            Rc::new(move |v: &Value| seen_clone.borrow_mut().push(v.clone())),
        );

        host.set("page", Value::from(1));
        host.set("page", Value::from(1));
        host.set("page", Value::from(2));
        host.set("other", Value::from(3));

        assert_eq!(*seen.borrow(), vec![Value::from(1), Value::from(2)]);
        assert_eq!(host.writes_to("page").len(), 3);
    }

    #[test]
    fn test_subpath_observer_fires_on_parent_write() {
        let host = MemoryHost::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        host.observe(
            "filter.lang",
            Rc::new(move |v: &Value| seen_clone.borrow_mut().push(v.clone())),
        );

        let mut filter = Object::new();
        filter.insert("lang", "en");
        host.set("filter", Value::Object(filter));
        host.set("filterx", Value::from(1));

        assert_eq!(*seen.borrow(), vec![Value::from("en")]);
    }

    #[test]
    fn test_unobserve() {
        let host = MemoryHost::new();
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let id = host.observe("a", Rc::new(move |_: &Value| count_clone.set(count_clone.get() + 1)));

        host.set("a", Value::from(1));
        host.unobserve(id);
        host.set("a", Value::from(2));

        assert_eq!(count.get(), 1);
        assert_eq!(host.observer_count(), 0);
    }

    #[test]
    fn test_handler_may_write_back() {
        let host = MemoryHost::new();
        let weak = Rc::downgrade(&host);
        host.observe(
            "a",
            Rc::new(move |v: &Value| {
                if let Some(host) = weak.upgrade() {
                    host.set("b", v.clone());
                }
            }),
        );

        host.set("a", Value::from(5));
        assert_eq!(host.get("b"), Value::from(5));
    }
}

//! Variable change debouncing.
//!
//! Each declared variable observes one host property. Changes land in the
//! record's pending map and schedule a flush keyed by query, so a burst of
//! changes to any variables of one query costs a single `set_variables`.

use crate::instance::{variables_timer, Instance};
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use gqlbind_core::Value;

impl Instance {
    /// Observes `path` as the source of variable `name` of query `key`.
    pub(crate) fn install_variable_observer(self: &Rc<Self>, key: &str, name: &str, path: &str) {
        let instance = Rc::downgrade(self);
        let key = key.to_string();
        let name: String = name.to_string();
        let id = self.host.observe(
            path,
            Rc::new(move |value: &Value| {
                if let Some(instance) = instance.upgrade() {
                    instance.on_variable_change(&key, &name, value.clone());
                }
            }),
        );
        self.observers.borrow_mut().push(id);
    }

    fn on_variable_change(self: &Rc<Self>, key: &str, name: &str, value: Value) {
        if self.is_detached() {
            return;
        }
        {
            let mut store = self.store.borrow_mut();
            let Some(record) = store.get_mut(key) else {
                return;
            };
            record.pending_variables.insert(name, value);
        }

        let instance = Rc::downgrade(self);
        let owned = key.to_string();
        self.debouncer.schedule(
            &variables_timer(key),
            self.config.variable_debounce_ms,
            move || {
                if let Some(instance) = instance.upgrade() {
                    instance.flush_variables(&owned);
                }
            },
        );
    }

    /// Hands pending variable updates of `key` to the client.
    ///
    /// Does nothing while skipped; the pending values are kept for the next
    /// activation. Returns true if `set_variables` was called.
    pub(crate) fn flush_variables(&self, key: &str) -> bool {
        if self.is_detached() {
            return false;
        }
        let (observable, variables) = {
            let mut store = self.store.borrow_mut();
            let Some(record) = store.get_mut(key) else {
                return false;
            };
            if record.skipped || record.pending_variables.is_empty() {
                return false;
            }
            // Taken before calling out: changes made during the call start
            // a new pending map and a new flush.
            let pending = core::mem::take(&mut record.pending_variables);
            record.variables.merge(&pending);
            (record.observable.clone(), record.variables.clone())
        };
        observable.set_variables(variables);
        true
    }
}

//! Skip gate.
//!
//! A query with a skip source starts `Skipped` and follows the source's
//! truthiness from then on: falsy activates it, truthy closes its
//! subscription. Changes are debounced per key so only the latest value of
//! a burst is acted upon.

use crate::instance::{skip_timer, Instance};
use alloc::rc::Rc;
use alloc::string::ToString;
use gqlbind_client::Subscription;
use gqlbind_core::Value;

impl Instance {
    /// Observes `path` and drives the gate of `key` from it.
    pub(crate) fn install_skip_gate(self: &Rc<Self>, key: &str, path: &str) {
        let instance = Rc::downgrade(self);
        let key = key.to_string();
        let id = self.host.observe(
            path,
            Rc::new(move |value: &Value| {
                if let Some(instance) = instance.upgrade() {
                    instance.schedule_skip(&key, value.is_truthy());
                }
            }),
        );
        self.observers.borrow_mut().push(id);
    }

    fn schedule_skip(self: &Rc<Self>, key: &str, skip: bool) {
        if self.is_detached() {
            return;
        }
        let instance = Rc::downgrade(self);
        let owned = key.to_string();
        self.debouncer
            .schedule(&skip_timer(key), self.config.skip_debounce_ms, move || {
                if let Some(instance) = instance.upgrade() {
                    instance.apply_skip(&owned, skip);
                }
            });
    }

    /// Moves the gate of `key` to `Skipped` (true) or `Active` (false).
    ///
    /// Re-entering the current state changes nothing.
    pub(crate) fn apply_skip(self: &Rc<Self>, key: &str, skip: bool) {
        if self.is_detached() {
            return;
        }
        if skip {
            let previous = {
                let mut store = self.store.borrow_mut();
                let Some(record) = store.get_mut(key) else {
                    return;
                };
                record.skipped = true;
                record.subscription.take()
            };
            if let Some(subscription) = previous {
                subscription.unsubscribe();
            }
        } else {
            {
                let mut store = self.store.borrow_mut();
                let Some(record) = store.get_mut(key) else {
                    return;
                };
                record.skipped = false;
            }
            self.activate(key);
        }
    }
}

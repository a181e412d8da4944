//! Per-instance binding state.
//!
//! One `Instance` exists per bound component. It owns the query store, the
//! subscription registry, the debouncer and the observer handles registered
//! on the host. Callbacks handed to the client, the host and the timers only
//! hold `Weak` references to it and check `detached` before doing anything,
//! so late emissions after teardown are dropped.
//!
//! Borrow discipline: no `RefCell` borrow of the instance is held while
//! calling into the host, the client, a timer or a user callback.

use crate::config::BindingConfig;
use crate::diagnostics::{Diagnostics, Report};
use crate::host::{Host, ObserverId};
use crate::store::QueryStore;
use crate::subscription::{SubscriptionRegistry, TrackedWatchQuery};
use crate::timer::{Debouncer, Timers};
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use gqlbind_client::{Client, Subscription, WatchQueryOptions};

pub(crate) struct Instance {
    pub(crate) host: Rc<dyn Host>,
    pub(crate) client: Rc<dyn Client>,
    pub(crate) diagnostics: Rc<dyn Diagnostics>,
    pub(crate) config: BindingConfig,
    pub(crate) debouncer: Debouncer,
    pub(crate) store: RefCell<QueryStore>,
    pub(crate) subscriptions: Rc<RefCell<SubscriptionRegistry>>,
    pub(crate) observers: RefCell<Vec<ObserverId>>,
    pub(crate) detached: Cell<bool>,
}

/// Debounce key of the skip gate of `key`.
pub(crate) fn skip_timer(key: &str) -> String {
    format!("skip:{}", key)
}

/// Debounce key of the variable flush of `key`.
pub(crate) fn variables_timer(key: &str) -> String {
    format!("vars:{}", key)
}

impl Instance {
    pub(crate) fn new(
        host: Rc<dyn Host>,
        client: Rc<dyn Client>,
        timers: Rc<dyn Timers>,
        diagnostics: Rc<dyn Diagnostics>,
        config: BindingConfig,
    ) -> Self {
        Self {
            host,
            client,
            diagnostics,
            config,
            debouncer: Debouncer::new(timers),
            store: RefCell::new(QueryStore::new()),
            subscriptions: Rc::new(RefCell::new(SubscriptionRegistry::new())),
            observers: RefCell::new(Vec::new()),
            detached: Cell::new(false),
        }
    }

    #[inline]
    pub(crate) fn is_detached(&self) -> bool {
        self.detached.get()
    }

    pub(crate) fn report(&self, report: Report) {
        self.diagnostics.report(report);
    }

    /// Client watch query whose subscriptions are tracked on this instance.
    pub(crate) fn watch_query(&self, options: WatchQueryOptions) -> TrackedWatchQuery {
        let observable = self.client.watch_query(options);
        TrackedWatchQuery::new(observable, Rc::downgrade(&self.subscriptions))
    }

    /// Unsubscribes every tracked subscription and empties the registry.
    pub(crate) fn teardown_all(&self) {
        let drained = self.subscriptions.borrow_mut().drain();
        for subscription in drained {
            subscription.unsubscribe();
        }
    }

    /// Cancels pending work, releases host observers, closes subscriptions
    /// and discards the records. Safe to call more than once.
    pub(crate) fn detach(&self) {
        if self.detached.replace(true) {
            return;
        }

        self.debouncer.cancel_all();

        let observers: Vec<ObserverId> = self.observers.borrow_mut().drain(..).collect();
        for id in observers {
            self.host.unobserve(id);
        }

        self.teardown_all();

        let records = self.store.borrow_mut().drain();
        for record in records {
            if let Some(subscription) = record.subscription {
                subscription.unsubscribe();
            }
        }
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        self.detach();
    }
}

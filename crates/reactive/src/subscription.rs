//! Subscription tracking for an instance.
//!
//! Every subscription an instance opens goes through `TrackedWatchQuery`, so
//! it is recorded in the instance's `SubscriptionRegistry` until it is
//! unsubscribed. Detaching the instance drains the registry, which is how no
//! subscription outlives its instance.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use gqlbind_client::{CompletionCallback, Observer, Subscription, WatchQuery};
use gqlbind_core::Object;
use hashbrown::HashMap;

/// Unique identifier for a tracked subscription.
pub type SubscriptionId = u64;

/// A subscription registered with its instance.
///
/// Unsubscribing is idempotent: the client subscription is closed exactly
/// once and the entry leaves the registry. Once closed, handlers registered
/// through it no longer run even if the client keeps emitting.
pub struct TrackedSubscription {
    id: SubscriptionId,
    inner: Box<dyn Subscription>,
    closed: Rc<Cell<bool>>,
    registry: Weak<RefCell<SubscriptionRegistry>>,
}

impl TrackedSubscription {
    /// Returns the subscription ID.
    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Returns whether this subscription still delivers.
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.closed.get()
    }
}

impl Subscription for TrackedSubscription {
    fn unsubscribe(&self) {
        if self.closed.replace(true) {
            return;
        }
        self.inner.unsubscribe();
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(self.id);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

/// The open subscriptions of one instance.
pub struct SubscriptionRegistry {
    subscriptions: HashMap<SubscriptionId, Rc<TrackedSubscription>>,
    next_id: SubscriptionId,
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            subscriptions: HashMap::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn insert(&mut self, subscription: Rc<TrackedSubscription>) {
        self.subscriptions.insert(subscription.id(), subscription);
    }

    /// Forgets a subscription without closing it.
    ///
    /// Returns true if it was tracked.
    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    /// Returns the number of tracked subscriptions.
    #[inline]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns true if nothing is tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Removes and returns every tracked subscription, oldest first.
    pub fn drain(&mut self) -> Vec<Rc<TrackedSubscription>> {
        let mut drained: Vec<_> = self.subscriptions.drain().map(|(_, sub)| sub).collect();
        drained.sort_by_key(|sub| sub.id());
        drained
    }
}

/// A watch query whose subscriptions are tracked by an instance.
#[derive(Clone)]
pub struct TrackedWatchQuery {
    inner: Rc<dyn WatchQuery>,
    registry: Weak<RefCell<SubscriptionRegistry>>,
}

impl TrackedWatchQuery {
    pub(crate) fn new(inner: Rc<dyn WatchQuery>, registry: Weak<RefCell<SubscriptionRegistry>>) -> Self {
        Self { inner, registry }
    }

    /// The client observable.
    pub fn inner(&self) -> &Rc<dyn WatchQuery> {
        &self.inner
    }

    /// Subscribes and tracks the resulting subscription.
    ///
    /// If the owning instance is gone the subscription is closed right away.
    pub fn subscribe(&self, observer: Observer) -> Rc<TrackedSubscription> {
        let closed = Rc::new(Cell::new(false));
        let Observer { next, error } = observer;
        let next_closed = closed.clone();
        let error_closed = closed.clone();
        let gated = Observer::new(
            move |result| {
                if !next_closed.get() {
                    next(result);
                }
            },
            move |err| {
                if !error_closed.get() {
                    error(err);
                }
            },
        );

        let inner = self.inner.subscribe(gated);
        let registry = self.registry.upgrade();
        let id = registry
            .as_ref()
            .map(|registry| registry.borrow_mut().allocate_id())
            .unwrap_or_default();
        let subscription = Rc::new(TrackedSubscription {
            id,
            inner,
            closed,
            registry: self.registry.clone(),
        });

        match registry {
            Some(registry) => {
                registry.borrow_mut().insert(subscription.clone());
            }
            None => subscription.unsubscribe(),
        }
        subscription
    }

    pub fn set_variables(&self, variables: Object) {
        self.inner.set_variables(variables);
    }

    pub fn refetch(&self, done: CompletionCallback) {
        self.inner.refetch(done);
    }

    pub fn variables(&self) -> Object {
        self.inner.variables()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlbind_client::mock::MockWatchQuery;
    use gqlbind_client::{QueryResult, WatchQueryOptions};
    use gqlbind_core::Value;

    fn counting_observer(count: Rc<Cell<usize>>) -> Observer {
        Observer::new(move |_| count.set(count.get() + 1), |_| {})
    }

    fn setup() -> (Rc<MockWatchQuery>, Rc<RefCell<SubscriptionRegistry>>, TrackedWatchQuery) {
        let watch = Rc::new(MockWatchQuery::new(WatchQueryOptions::new("{ a }")));
        let registry = Rc::new(RefCell::new(SubscriptionRegistry::new()));
        let tracked = TrackedWatchQuery::new(watch.clone(), Rc::downgrade(&registry));
        (watch, registry, tracked)
    }

    #[test]
    fn test_subscribe_is_tracked() {
        let (watch, registry, tracked) = setup();

        let first = tracked.subscribe(counting_observer(Rc::new(Cell::new(0))));
        let second = tracked.subscribe(counting_observer(Rc::new(Cell::new(0))));

        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
        assert_eq!(registry.borrow().len(), 2);
        assert_eq!(watch.subscribe_count(), 2);
    }

    #[test]
    fn test_unsubscribe_untracks_once() {
        let (watch, registry, tracked) = setup();
        let sub = tracked.subscribe(counting_observer(Rc::new(Cell::new(0))));

        sub.unsubscribe();
        sub.unsubscribe();

        assert!(!sub.is_active());
        assert!(registry.borrow().is_empty());
        assert_eq!(watch.unsubscribe_count(), 1);
    }

    #[test]
    fn test_closed_subscription_drops_emissions() {
        let (watch, _registry, tracked) = setup();
        let count = Rc::new(Cell::new(0));
        let sub = tracked.subscribe(counting_observer(count.clone()));

        watch.emit(QueryResult::ready(Value::Null));
        sub.closed.set(true);
        watch.emit(QueryResult::ready(Value::Null));

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_drain_in_creation_order() {
        let (_watch, registry, tracked) = setup();
        for _ in 0..3 {
            tracked.subscribe(counting_observer(Rc::new(Cell::new(0))));
        }

        let drained = registry.borrow_mut().drain();
        let ids: alloc::vec::Vec<_> = drained.iter().map(|s| s.id()).collect();
        assert_eq!(ids, alloc::vec![1, 2, 3]);
        assert!(registry.borrow().is_empty());

        // Unsubscribing after the drain must not touch the registry again.
        for sub in drained {
            sub.unsubscribe();
        }
        assert!(registry.borrow().is_empty());
    }

    #[test]
    fn test_subscribe_without_instance_closes() {
        let (watch, registry, tracked) = setup();
        drop(registry);

        let sub = tracked.subscribe(counting_observer(Rc::new(Cell::new(0))));
        assert!(!sub.is_active());
        assert_eq!(watch.active_subscriptions(), 0);
    }
}

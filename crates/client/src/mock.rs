//! Scripted in-memory client.
//!
//! Nothing is executed: every call is recorded, and results are pushed by the
//! caller through `MockWatchQuery::emit` / `fail` or by resolving pending
//! operations. Handlers are always invoked with no internal borrow held, so
//! they may call back into the mock.

use crate::client::{Client, CompletionCallback, Observer, Subscription, WatchQuery};
use crate::request::{Request, WatchQueryOptions};
use crate::response::{ApolloError, QueryResult};
use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use gqlbind_core::Object;

struct ObserverSlot {
    id: u64,
    observer: Rc<Observer>,
}

#[derive(Default)]
struct WatchState {
    observers: Vec<ObserverSlot>,
    next_id: u64,
    subscribe_calls: usize,
    unsubscribe_calls: usize,
    variables: Object,
    set_variables_calls: Vec<Object>,
    pending_refetches: VecDeque<CompletionCallback>,
    refetch_calls: usize,
}

/// A recorded watch query.
pub struct MockWatchQuery {
    options: WatchQueryOptions,
    state: Rc<RefCell<WatchState>>,
}

impl MockWatchQuery {
    pub fn new(options: WatchQueryOptions) -> Self {
        let state = WatchState {
            variables: options.variables.clone(),
            ..WatchState::default()
        };
        Self {
            options,
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Options the query was created with.
    pub fn options(&self) -> &WatchQueryOptions {
        &self.options
    }

    fn observers(&self) -> Vec<Rc<Observer>> {
        self.state
            .borrow()
            .observers
            .iter()
            .map(|slot| slot.observer.clone())
            .collect()
    }

    /// Delivers a result to every open subscription.
    pub fn emit(&self, result: QueryResult) {
        for observer in self.observers() {
            (observer.next)(result.clone());
        }
    }

    /// Delivers an error to every open subscription.
    pub fn fail(&self, error: ApolloError) {
        for observer in self.observers() {
            (observer.error)(error.clone());
        }
    }

    /// Completes the oldest outstanding refetch. Returns false if none.
    pub fn resolve_refetch(&self, outcome: Result<QueryResult, ApolloError>) -> bool {
        let done = self.state.borrow_mut().pending_refetches.pop_front();
        match done {
            Some(done) => {
                done(outcome);
                true
            }
            None => false,
        }
    }

    pub fn subscribe_count(&self) -> usize {
        self.state.borrow().subscribe_calls
    }

    pub fn unsubscribe_count(&self) -> usize {
        self.state.borrow().unsubscribe_calls
    }

    /// Number of subscriptions currently receiving emissions.
    pub fn active_subscriptions(&self) -> usize {
        self.state.borrow().observers.len()
    }

    /// Every `set_variables` call, oldest first.
    pub fn set_variables_calls(&self) -> Vec<Object> {
        self.state.borrow().set_variables_calls.clone()
    }

    pub fn refetch_count(&self) -> usize {
        self.state.borrow().refetch_calls
    }
}

impl WatchQuery for MockWatchQuery {
    fn subscribe(&self, observer: Observer) -> Box<dyn Subscription> {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            state.subscribe_calls += 1;
            state.observers.push(ObserverSlot {
                id,
                observer: Rc::new(observer),
            });
            id
        };
        Box::new(MockSubscription {
            id,
            closed: Cell::new(false),
            state: self.state.clone(),
        })
    }

    fn set_variables(&self, variables: Object) {
        let mut state = self.state.borrow_mut();
        state.variables = variables.clone();
        state.set_variables_calls.push(variables);
    }

    fn refetch(&self, done: CompletionCallback) {
        let mut state = self.state.borrow_mut();
        state.refetch_calls += 1;
        state.pending_refetches.push_back(done);
    }

    fn variables(&self) -> Object {
        self.state.borrow().variables.clone()
    }
}

/// Subscription handle returned by `MockWatchQuery::subscribe`.
pub struct MockSubscription {
    id: u64,
    closed: Cell<bool>,
    state: Rc<RefCell<WatchState>>,
}

impl Subscription for MockSubscription {
    fn unsubscribe(&self) {
        if self.closed.replace(true) {
            return;
        }
        let mut state = self.state.borrow_mut();
        state.unsubscribe_calls += 1;
        state.observers.retain(|slot| slot.id != self.id);
    }

    fn is_closed(&self) -> bool {
        self.closed.get()
    }
}

#[derive(Default)]
struct ClientState {
    watches: Vec<Rc<MockWatchQuery>>,
    queries: Vec<Request>,
    mutations: Vec<Request>,
    streams: Vec<(Request, Rc<MockWatchQuery>)>,
    pending_operations: VecDeque<CompletionCallback>,
}

/// Client recording every call it receives.
#[derive(Default)]
pub struct MockClient {
    state: RefCell<ClientState>,
}

impl MockClient {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Number of `watch_query` calls so far.
    pub fn watch_count(&self) -> usize {
        self.state.borrow().watches.len()
    }

    /// The `index`-th watch query created.
    pub fn watch(&self, index: usize) -> Option<Rc<MockWatchQuery>> {
        self.state.borrow().watches.get(index).cloned()
    }

    /// The most recently created watch query.
    pub fn last_watch(&self) -> Option<Rc<MockWatchQuery>> {
        self.state.borrow().watches.last().cloned()
    }

    pub fn queries(&self) -> Vec<Request> {
        self.state.borrow().queries.clone()
    }

    pub fn mutations(&self) -> Vec<Request> {
        self.state.borrow().mutations.clone()
    }

    /// The stream backing the `index`-th `subscribe` call.
    pub fn stream(&self, index: usize) -> Option<Rc<MockWatchQuery>> {
        self.state
            .borrow()
            .streams
            .get(index)
            .map(|(_, stream)| stream.clone())
    }

    /// Completes the oldest outstanding query or mutation. Returns false if none.
    pub fn resolve_operation(&self, outcome: Result<QueryResult, ApolloError>) -> bool {
        let done = self.state.borrow_mut().pending_operations.pop_front();
        match done {
            Some(done) => {
                done(outcome);
                true
            }
            None => false,
        }
    }
}

impl Client for MockClient {
    fn watch_query(&self, options: WatchQueryOptions) -> Rc<dyn WatchQuery> {
        let watch = Rc::new(MockWatchQuery::new(options));
        self.state.borrow_mut().watches.push(watch.clone());
        watch
    }

    fn query(&self, request: Request, done: CompletionCallback) {
        let mut state = self.state.borrow_mut();
        state.queries.push(request);
        state.pending_operations.push_back(done);
    }

    fn mutate(&self, request: Request, done: CompletionCallback) {
        let mut state = self.state.borrow_mut();
        state.mutations.push(request);
        state.pending_operations.push_back(done);
    }

    fn subscribe(&self, request: Request, observer: Observer) -> Box<dyn Subscription> {
        let stream = Rc::new(MockWatchQuery::new(
            WatchQueryOptions::new(request.document.clone()).with_variables(request.variables.clone()),
        ));
        self.state
            .borrow_mut()
            .streams
            .push((request, stream.clone()));
        stream.subscribe(observer)
    }
}

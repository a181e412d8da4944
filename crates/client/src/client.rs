//! The client-side seams: observables, subscriptions and the client itself.
//!
//! Everything here is single-threaded. Callbacks may be invoked
//! synchronously from inside `subscribe`, `set_variables` or `refetch`, so
//! implementors of the calling side must not hold borrows across these calls.

use crate::request::{Request, WatchQueryOptions};
use crate::response::{ApolloError, QueryResult};
use alloc::boxed::Box;
use alloc::rc::Rc;
use gqlbind_core::Object;

/// Callback receiving each result emission.
pub type NextCallback = Box<dyn Fn(QueryResult)>;

/// Callback receiving error emissions.
pub type ErrorCallback = Box<dyn Fn(ApolloError)>;

/// Completion callback for one-shot operations and refetches.
pub type CompletionCallback = Box<dyn FnOnce(Result<QueryResult, ApolloError>)>;

/// The pair of handlers registered on an observable.
pub struct Observer {
    pub next: NextCallback,
    pub error: ErrorCallback,
}

impl Observer {
    pub fn new<N, E>(next: N, error: E) -> Self
    where
        N: Fn(QueryResult) + 'static,
        E: Fn(ApolloError) + 'static,
    {
        Self {
            next: Box::new(next),
            error: Box::new(error),
        }
    }
}

/// A live registration on an observable.
pub trait Subscription {
    /// Stops delivery. Calling it again is a no-op.
    fn unsubscribe(&self);

    /// Whether `unsubscribe` has been called.
    fn is_closed(&self) -> bool;
}

/// A watch-query observable that re-emits on cache or network updates.
pub trait WatchQuery {
    /// Registers handlers and starts delivery.
    fn subscribe(&self, observer: Observer) -> Box<dyn Subscription>;

    /// Replaces the query's variables, re-executing it for active subscribers.
    fn set_variables(&self, variables: Object);

    /// Re-executes the current request.
    fn refetch(&self, done: CompletionCallback);

    /// Current variables.
    fn variables(&self) -> Object;
}

/// The GraphQL client collaborator.
pub trait Client {
    fn watch_query(&self, options: WatchQueryOptions) -> Rc<dyn WatchQuery>;

    fn query(&self, request: Request, done: CompletionCallback);

    fn mutate(&self, request: Request, done: CompletionCallback);

    fn subscribe(&self, request: Request, observer: Observer) -> Box<dyn Subscription>;
}

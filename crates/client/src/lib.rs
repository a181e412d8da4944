//! gqlbind Client - The GraphQL client as seen by the binding layer.
//!
//! The binding layer never executes GraphQL itself. It talks to a client
//! through the traits in this crate:
//!
//! - `Client`: `watch_query`, `query`, `mutate`, `subscribe`
//! - `WatchQuery`: live observable with `subscribe`, `set_variables`, `refetch`
//! - `Subscription`: handle returned by `subscribe`
//!
//! Results arrive as `QueryResult` values; failures as `ApolloError`, which
//! distinguishes GraphQL execution errors from transport errors.
//!
//! The `mock` feature adds `MockClient`, a scripted client that records every
//! call and lets the caller push emissions.

#![no_std]

extern crate alloc;

mod client;
#[cfg(feature = "mock")]
pub mod mock;
mod request;
mod response;

pub use client::{
    Client, CompletionCallback, ErrorCallback, NextCallback, Observer, Subscription, WatchQuery,
};
pub use request::{Request, WatchQueryOptions};
pub use response::{ApolloError, GraphQlError, NetworkStatus, QueryResult};

//! gqlbind Reactive - binds declared GraphQL queries to a component's
//! properties.
//!
//! Each component instance owns an [`Apollo`] facade. Declared queries are
//! turned into watch-query subscriptions; results are written to the host
//! property named after the query, loading state is mirrored into an
//! optional property, and component properties feed query variables and an
//! optional skip condition.
//!
//! # Core Concepts
//!
//! - `Host`: property read/write and change observation on the component
//! - `Timers`: cancellable timer driver behind the per-key `Debouncer`
//! - `QueryOptions`: declaration of one query (variables, loading, skip, ...)
//! - `Apollo`: per-instance facade (`process`, `process_observers`,
//!   `refetch`, `reload`, `detach`)
//! - `QueryComponent`: lifecycle mixin driving an `Apollo`
//! - `Diagnostics`: sink for error and usage reports
//!
//! # Example
//!
//! ```rust
//! use gqlbind_client::mock::MockClient;
//! use gqlbind_client::QueryResult;
//! use gqlbind_core::{Object, Value};
//! use gqlbind_reactive::{Apollo, Host, ManualTimers, MemoryHost, QueryOptions};
//!
//! let host = MemoryHost::new();
//! let client = MockClient::new();
//! let timers = ManualTimers::new();
//! let apollo = Apollo::new(host.clone(), client.clone(), timers.clone());
//!
//! apollo
//!     .process("user", QueryOptions::new("query { user { name } }").loading_key("busy"))
//!     .unwrap();
//! apollo.process_observers();
//!
//! let mut data = Object::new();
//! data.insert("user", "ada");
//! client.last_watch().unwrap().emit(QueryResult::ready(data));
//!
//! assert_eq!(host.get("user"), Value::from("ada"));
//! assert_eq!(host.get("busy"), Value::Bool(false));
//! assert!(apollo.diagnostic_log().is_some_and(|log| log.is_empty()));
//! ```

#![no_std]

extern crate alloc;

mod apollo;
mod component;
mod config;
mod diagnostics;
mod host;
mod instance;
mod lifecycle;
mod loading;
mod memory_host;
mod options;
mod skip;
mod store;
mod subscription;
mod timer;
mod variables;

pub use apollo::{Apollo, ApolloBuilder};
pub use component::QueryComponent;
pub use config::BindingConfig;
pub use diagnostics::{DiagnosticLog, Diagnostics, Report, DEFAULT_LOG_CAPACITY};
pub use host::{path_affected, Host, ObserverId, ObserverList, PropertyHandler};
pub use loading::set_loading;
pub use memory_host::MemoryHost;
pub use options::{ErrorHandler, QueryOptions, WatchLoading, RESERVED_OPTION_KEYS};
pub use store::{QuerySnapshot, SkipState};
pub use subscription::{SubscriptionId, TrackedSubscription, TrackedWatchQuery};
pub use timer::{Debouncer, ManualTimers, TimerId, TimerTask, Timers};

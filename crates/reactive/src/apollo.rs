//! The per-instance facade.
//!
//! `Apollo` is the handle a component holds. It declares queries, activates
//! them on attach, exposes refetch/reload and the client pass-throughs, and
//! tears everything down on detach.

use crate::config::BindingConfig;
use crate::diagnostics::{DiagnosticLog, Diagnostics, Report, DEFAULT_LOG_CAPACITY};
use crate::host::Host;
use crate::instance::Instance;
use crate::options::QueryOptions;
use crate::store::QuerySnapshot;
use crate::subscription::TrackedWatchQuery;
use crate::timer::Timers;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use gqlbind_client::{Client, CompletionCallback, Observer, Request, Subscription, WatchQueryOptions};
use gqlbind_core::{Error, Result};

/// Builder for [`Apollo`].
pub struct ApolloBuilder {
    host: Rc<dyn Host>,
    client: Rc<dyn Client>,
    timers: Rc<dyn Timers>,
    diagnostics: Option<Rc<dyn Diagnostics>>,
    config: BindingConfig,
}

impl ApolloBuilder {
    /// Routes reports to `diagnostics` instead of an internal log.
    pub fn diagnostics(mut self, diagnostics: Rc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn config(mut self, config: BindingConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the facade. Without a sink, reports go to a log bounded to
    /// `DEFAULT_LOG_CAPACITY`, reachable through `Apollo::diagnostic_log`.
    pub fn build(self) -> Apollo {
        let (diagnostics, log): (Rc<dyn Diagnostics>, _) = match self.diagnostics {
            Some(diagnostics) => (diagnostics, None),
            None => {
                let log = Rc::new(DiagnosticLog::bounded(DEFAULT_LOG_CAPACITY));
                (log.clone() as Rc<dyn Diagnostics>, Some(log))
            }
        };
        Apollo {
            instance: Rc::new(Instance::new(
                self.host,
                self.client,
                self.timers,
                diagnostics,
                self.config,
            )),
            log,
        }
    }
}

/// Query bindings of one component instance.
///
/// Dropping the handle detaches it.
pub struct Apollo {
    instance: Rc<Instance>,
    log: Option<Rc<DiagnosticLog>>,
}

impl Apollo {
    /// Creates a facade with the default configuration and a bounded
    /// diagnostic log.
    pub fn new(host: Rc<dyn Host>, client: Rc<dyn Client>, timers: Rc<dyn Timers>) -> Self {
        Self::builder(host, client, timers).build()
    }

    pub fn builder(
        host: Rc<dyn Host>,
        client: Rc<dyn Client>,
        timers: Rc<dyn Timers>,
    ) -> ApolloBuilder {
        ApolloBuilder {
            host,
            client,
            timers,
            diagnostics: None,
            config: BindingConfig::default(),
        }
    }

    /// Declares the query `key`.
    ///
    /// The record is created unsubscribed; `process_observers` activates it.
    /// With a skip source the query starts skipped and follows the source
    /// from its first change on.
    pub fn process(&self, key: &str, mut options: QueryOptions) -> Result<()> {
        let instance = &self.instance;
        if instance.is_detached() {
            return Err(Error::Detached);
        }
        let problem = if key.is_empty() {
            Some("query key is empty")
        } else if options.query.is_empty() {
            Some("query document is empty")
        } else {
            None
        };
        if let Some(message) = problem {
            instance.report(Report::InvalidDeclaration {
                message: message.to_string(),
            });
            return Err(Error::invalid_declaration(message));
        }

        if options.data_key.is_none() {
            options.data_key = Some(key.to_string());
        }
        let skip = options.skip.clone();
        let variables: Vec<(String, String)> = options.variables.clone();

        instance.declare(key, options, skip.is_some())?;

        if let Some(path) = skip {
            instance.install_skip_gate(key, &path);
        }
        for (name, path) in &variables {
            instance.install_variable_observer(key, name, path);
        }
        Ok(())
    }

    /// Subscribes every declared query that is not skipped. Idempotent.
    pub fn process_observers(&self) {
        self.instance.activate_all();
    }

    /// Re-executes the current request of `key`.
    ///
    /// An unknown key is reported and nothing reaches the client.
    pub fn refetch(&self, key: &str) -> Result<()> {
        self.instance.refetch(key)
    }

    /// Re-subscribes `key` on a fresh observable, or refetches when the
    /// query is declared with `force_fetch` and currently subscribed.
    pub fn reload(&self, key: &str) -> Result<()> {
        self.instance.reload(key)
    }

    /// Client watch query whose subscriptions are tracked and closed on
    /// detach.
    pub fn watch_query(&self, options: WatchQueryOptions) -> TrackedWatchQuery {
        self.instance.watch_query(options)
    }

    /// One-shot query, passed through to the client.
    pub fn query(&self, request: Request, done: CompletionCallback) {
        self.instance.client.query(request, done);
    }

    /// Mutation, passed through to the client.
    pub fn mutate(&self, request: Request, done: CompletionCallback) {
        self.instance.client.mutate(request, done);
    }

    /// GraphQL subscription, passed through to the client.
    pub fn subscribe(&self, request: Request, observer: Observer) -> Box<dyn Subscription> {
        self.instance.client.subscribe(request, observer)
    }

    pub fn client(&self) -> &Rc<dyn Client> {
        &self.instance.client
    }

    pub fn host(&self) -> &Rc<dyn Host> {
        &self.instance.host
    }

    /// The log created by `build` when no diagnostics sink was given.
    pub fn diagnostic_log(&self) -> Option<&Rc<DiagnosticLog>> {
        self.log.as_ref()
    }

    /// Cancels pending work, closes every subscription and discards all
    /// records. Later emissions are dropped. Safe to call more than once.
    pub fn detach(&self) {
        self.instance.detach();
    }

    #[inline]
    pub fn is_detached(&self) -> bool {
        self.instance.is_detached()
    }

    /// Current state of `key`.
    pub fn snapshot(&self, key: &str) -> Option<QuerySnapshot> {
        self.instance.store.borrow().get(key).map(|record| record.snapshot())
    }

    /// Declared keys in declaration order.
    pub fn keys(&self) -> Vec<String> {
        self.instance.store.borrow().keys()
    }

    /// Number of open subscriptions tracked on this instance.
    pub fn tracked_subscriptions(&self) -> usize {
        self.instance.subscriptions.borrow().len()
    }

    /// Number of debounced skip changes and variable flushes not yet run.
    pub fn pending_flushes(&self) -> usize {
        self.instance.debouncer.pending_count()
    }
}

//! Component mixin.
//!
//! `QueryComponent` carries a component's query declarations and drives an
//! [`Apollo`] facade through the component lifecycle: `register` declares
//! every query, `attached` activates them and `detached` tears down. A
//! detached component gets a fresh facade the next time it is attached.

use crate::apollo::Apollo;
use crate::config::BindingConfig;
use crate::diagnostics::Diagnostics;
use crate::host::Host;
use crate::options::QueryOptions;
use crate::timer::Timers;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use gqlbind_client::Client;
use gqlbind_core::Result;

pub struct QueryComponent {
    host: Rc<dyn Host>,
    client: Rc<dyn Client>,
    timers: Rc<dyn Timers>,
    diagnostics: Option<Rc<dyn Diagnostics>>,
    config: BindingConfig,
    declarations: Vec<(String, QueryOptions)>,
    apollo: Option<Apollo>,
}

impl QueryComponent {
    pub fn new(host: Rc<dyn Host>, client: Rc<dyn Client>, timers: Rc<dyn Timers>) -> Self {
        Self {
            host,
            client,
            timers,
            diagnostics: None,
            config: BindingConfig::default(),
            declarations: Vec::new(),
            apollo: None,
        }
    }

    /// Adds a query declaration. Takes effect at the next `register`.
    pub fn declare(mut self, key: impl Into<String>, options: QueryOptions) -> Self {
        self.declarations.push((key.into(), options));
        self
    }

    pub fn with_config(mut self, config: BindingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Rc<dyn Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Creates a facade and processes every declaration on it.
    ///
    /// A previous facade is detached first. Declarations that fail are
    /// reported and skipped; the first failure is returned after all of
    /// them have been tried.
    pub fn register(&mut self) -> Result<()> {
        if let Some(previous) = self.apollo.take() {
            previous.detach();
        }

        let mut builder = Apollo::builder(self.host.clone(), self.client.clone(), self.timers.clone())
            .config(self.config);
        if let Some(diagnostics) = &self.diagnostics {
            builder = builder.diagnostics(diagnostics.clone());
        }
        let apollo = builder.build();

        let mut outcome = Ok(());
        for (key, options) in &self.declarations {
            if let Err(err) = apollo.process(key, options.clone()) {
                if outcome.is_ok() {
                    outcome = Err(err);
                }
            }
        }
        self.apollo = Some(apollo);
        outcome
    }

    /// Activates the declared queries, registering first when no live
    /// facade exists.
    pub fn attached(&mut self) -> Result<()> {
        let outcome = match &self.apollo {
            Some(apollo) if !apollo.is_detached() => Ok(()),
            _ => self.register(),
        };
        if let Some(apollo) = &self.apollo {
            apollo.process_observers();
        }
        outcome
    }

    /// Tears down the facade and drops it.
    pub fn detached(&mut self) {
        if let Some(apollo) = self.apollo.take() {
            apollo.detach();
        }
    }

    /// The live facade, if registered.
    pub fn apollo(&self) -> Option<&Apollo> {
        self.apollo.as_ref()
    }

    /// Declared keys in declaration order.
    pub fn declared_keys(&self) -> Vec<String> {
        self.declarations.iter().map(|(key, _)| key.to_string()).collect()
    }
}

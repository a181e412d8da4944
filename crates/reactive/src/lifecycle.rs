//! Subscription lifecycle: declaring records, activating them, projecting
//! results and errors, refetching and reloading.

use crate::diagnostics::Report;
use crate::instance::{variables_timer, Instance};
use crate::options::QueryOptions;
use crate::store::QueryRecord;
use crate::subscription::TrackedSubscription;
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use gqlbind_client::{ApolloError, Observer, QueryResult, Subscription};
use gqlbind_core::{Error, Object, Result, Value};

impl Instance {
    /// Reads the current value of every declared variable from the host.
    pub(crate) fn resolve_variables(&self, options: &QueryOptions) -> Object {
        options
            .variables
            .iter()
            .map(|(name, path)| (name.as_str(), self.host.get(path)))
            .collect()
    }

    /// Creates the record for `key` with a fresh observable.
    pub(crate) fn declare(&self, key: &str, options: QueryOptions, skipped: bool) -> Result<()> {
        if self.store.borrow().contains(key) {
            self.report(Report::DuplicateQuery {
                key: key.to_string(),
            });
            return Err(Error::duplicate_query(key));
        }

        let variables = self.resolve_variables(&options);
        let observable = self.watch_query(options.watch_options(variables.clone()));
        let record = QueryRecord::new(key, observable, Rc::new(options), variables, skipped);
        self.store.borrow_mut().create(record)
    }

    /// Opens a subscription on the record's observable.
    ///
    /// Sets loading, brings the observable's variables up to date with the
    /// host and with pending updates, then subscribes with the result and
    /// error handlers. The caller stores the returned handle.
    pub(crate) fn subscribe(self: &Rc<Self>, key: &str) -> Option<Rc<TrackedSubscription>> {
        let options = self.store.borrow().get(key)?.options.clone();
        let fresh = self.resolve_variables(&options);

        let (observable, sync) = {
            let mut store = self.store.borrow_mut();
            let record = store.get_mut(key)?;
            let mut fresh = fresh;
            fresh.merge(&core::mem::take(&mut record.pending_variables));
            let sync = if fresh != record.variables {
                record.variables = fresh.clone();
                Some(fresh)
            } else {
                None
            };
            (record.observable.clone(), sync)
        };

        self.set_loading(&options, true);
        if let Some(variables) = sync {
            observable.set_variables(variables);
        }

        let next = {
            let instance = Rc::downgrade(self);
            let key = key.to_string();
            let options = options.clone();
            move |result: QueryResult| {
                if let Some(instance) = instance.upgrade() {
                    instance.on_result(&key, &options, result);
                }
            }
        };
        let error = {
            let instance = Rc::downgrade(self);
            let key = key.to_string();
            move |error: ApolloError| {
                if let Some(instance) = instance.upgrade() {
                    instance.on_error(&key, &options, error);
                }
            }
        };
        Some(observable.subscribe(Observer::new(next, error)))
    }

    /// Subscribes `key` unless it is skipped or already subscribed.
    ///
    /// Returns true if a subscription was opened.
    pub(crate) fn activate(self: &Rc<Self>, key: &str) -> bool {
        if self.is_detached() {
            return false;
        }
        let eligible = self
            .store
            .borrow()
            .get(key)
            .is_some_and(|record| !record.skipped && !record.is_subscribed());
        if !eligible {
            return false;
        }

        let Some(subscription) = self.subscribe(key) else {
            return false;
        };

        // The record may be gone, or the instance detached, while subscribing.
        let displaced = {
            let mut store = self.store.borrow_mut();
            match store.get_mut(key) {
                Some(record) if !self.is_detached() => {
                    Ok(record.subscription.replace(subscription))
                }
                _ => Err(subscription),
            }
        };
        match displaced {
            Ok(previous) => {
                if let Some(previous) = previous {
                    previous.unsubscribe();
                }
                true
            }
            Err(orphan) => {
                orphan.unsubscribe();
                false
            }
        }
    }

    /// Activates every record that is not skipped, in declaration order.
    pub(crate) fn activate_all(self: &Rc<Self>) {
        if self.is_detached() {
            return;
        }
        let keys = self.store.borrow().keys();
        for key in keys {
            // Activation re-syncs variables itself.
            self.debouncer.cancel(&variables_timer(&key));
            self.activate(&key);
        }
    }

    fn on_result(&self, key: &str, options: &QueryOptions, result: QueryResult) {
        if self.is_detached() {
            return;
        }
        self.set_loading(options, result.loading.unwrap_or(false));
        if result.is_ready() {
            self.apply_data(key, options, &result.data);
        }
    }

    fn apply_data(&self, key: &str, options: &QueryOptions, data: &Value) {
        let data_key = options.data_key.as_deref().unwrap_or(key);
        match data.get(data_key) {
            Some(value) => {
                if let Some(record) = self.store.borrow_mut().get_mut(key) {
                    record.first_loading_done = true;
                }
                self.host.set(key, value.clone());
            }
            None => self.report(Report::MissingData {
                key: key.to_string(),
                data_key: data_key.to_string(),
                data: data.clone(),
            }),
        }
    }

    pub(crate) fn on_error(&self, key: &str, options: &QueryOptions, error: ApolloError) {
        if self.is_detached() {
            return;
        }
        self.set_loading(options, false);

        if !error.graphql_errors.is_empty() {
            for graphql_error in &error.graphql_errors {
                self.report(Report::GraphQlError {
                    key: key.to_string(),
                    error: graphql_error.clone(),
                });
            }
        } else if let Some(message) = &error.network_error {
            self.report(Report::NetworkError {
                key: key.to_string(),
                message: message.clone(),
            });
        } else {
            self.report(Report::UnclassifiedError {
                key: key.to_string(),
                error: error.clone(),
            });
        }

        if let Some(callback) = &options.error {
            callback(self.host.as_ref(), &error);
        }
    }

    fn lookup(&self, key: &str) -> Result<Rc<QueryOptions>> {
        if self.is_detached() {
            return Err(Error::Detached);
        }
        match self.store.borrow().get(key) {
            Some(record) => Ok(record.options.clone()),
            None => {
                self.report(Report::QueryNotFound {
                    key: key.to_string(),
                });
                Err(Error::query_not_found(key))
            }
        }
    }

    /// Re-executes the current request of `key`.
    pub(crate) fn refetch(self: &Rc<Self>, key: &str) -> Result<()> {
        let options = self.lookup(key)?;
        let observable = match self.store.borrow().get(key) {
            Some(record) => record.observable.clone(),
            None => return Err(Error::query_not_found(key)),
        };

        self.set_loading(&options, true);

        let instance = Rc::downgrade(self);
        let owned: String = key.to_string();
        observable.refetch(Box::new(move |outcome| {
            let Some(instance) = instance.upgrade() else {
                return;
            };
            if instance.is_detached() {
                return;
            }
            match outcome {
                Ok(_) => instance.set_loading(&options, false),
                Err(error) => instance.on_error(&owned, &options, error),
            }
        }));
        Ok(())
    }

    /// Replaces the observable of `key` and subscribes again.
    ///
    /// With `force_fetch` and a live subscription the existing observable is
    /// refetched instead.
    pub(crate) fn reload(self: &Rc<Self>, key: &str) -> Result<()> {
        let options = self.lookup(key)?;
        let subscribed = self
            .store
            .borrow()
            .get(key)
            .is_some_and(|record| record.is_subscribed());
        if options.force_fetch && subscribed {
            return self.refetch(key);
        }

        let previous = self
            .store
            .borrow_mut()
            .get_mut(key)
            .and_then(|record| record.subscription.take());
        if let Some(previous) = previous {
            previous.unsubscribe();
        }

        let mut variables = self.resolve_variables(&options);
        if let Some(record) = self.store.borrow_mut().get_mut(key) {
            variables.merge(&core::mem::take(&mut record.pending_variables));
        }
        self.debouncer.cancel(&variables_timer(key));

        let observable = self.watch_query(options.watch_options(variables.clone()));
        if let Some(record) = self.store.borrow_mut().get_mut(key) {
            record.observable = observable;
            record.variables = variables;
        }

        self.activate(key);
        Ok(())
    }
}

//! Declared query options.
//!
//! `QueryOptions` is what a component declares for one query key. Part of it
//! only concerns the binding layer (loading key, callbacks, skip source, data
//! key) and is never forwarded to the client.

use crate::host::Host;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use gqlbind_client::{ApolloError, WatchQueryOptions};
use gqlbind_core::{Object, Value};

/// Callback mirroring the loading flag, invoked with the host as context.
pub type WatchLoading = Rc<dyn Fn(&dyn Host, bool)>;

/// Callback receiving query errors, invoked with the host as context.
pub type ErrorHandler = Rc<dyn Fn(&dyn Host, &ApolloError)>;

/// Option names reserved by the binding layer.
///
/// Entries with these names are stripped from `extra` before the options
/// reach the client.
pub const RESERVED_OPTION_KEYS: [&str; 5] = ["error", "loadingKey", "watchLoading", "skip", "dataKey"];

/// Declaration of one query.
#[derive(Clone, Default)]
pub struct QueryOptions {
    /// GraphQL document
    pub query: String,
    /// Variable name -> source property path, in declaration order
    pub variables: Vec<(String, String)>,
    /// Host property mirroring the loading flag
    pub loading_key: Option<String>,
    pub watch_loading: Option<WatchLoading>,
    /// Host property path gating the subscription
    pub skip: Option<String>,
    /// Payload field holding the result; defaults to the query key
    pub data_key: Option<String>,
    pub error: Option<ErrorHandler>,
    pub force_fetch: bool,
    /// Client configuration passed through as is
    pub extra: Object,
}

impl QueryOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Binds variable `name` to the host property at `path`.
    pub fn variable(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        let name = name.into();
        let path = path.into();
        match self.variables.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = path,
            None => self.variables.push((name, path)),
        }
        self
    }

    pub fn loading_key(mut self, key: impl Into<String>) -> Self {
        self.loading_key = Some(key.into());
        self
    }

    pub fn watch_loading<F>(mut self, callback: F) -> Self
    where
        F: Fn(&dyn Host, bool) + 'static,
    {
        self.watch_loading = Some(Rc::new(callback));
        self
    }

    pub fn skip(mut self, path: impl Into<String>) -> Self {
        self.skip = Some(path.into());
        self
    }

    pub fn data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = Some(key.into());
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&dyn Host, &ApolloError) + 'static,
    {
        self.error = Some(Rc::new(callback));
        self
    }

    pub fn force_fetch(mut self, force: bool) -> Self {
        self.force_fetch = force;
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key, value);
        self
    }

    /// Client-facing options with binding-only settings removed.
    pub fn watch_options(&self, variables: Object) -> WatchQueryOptions {
        let extra = self
            .extra
            .iter()
            .filter(|(key, _)| !RESERVED_OPTION_KEYS.contains(key))
            .map(|(key, value)| (key, value.clone()))
            .collect();
        WatchQueryOptions {
            query: self.query.clone(),
            variables,
            force_fetch: self.force_fetch,
            extra,
        }
    }
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("query", &self.query)
            .field("variables", &self.variables)
            .field("loading_key", &self.loading_key)
            .field("watch_loading", &self.watch_loading.is_some())
            .field("skip", &self.skip)
            .field("data_key", &self.data_key)
            .field("error", &self.error.is_some())
            .field("force_fetch", &self.force_fetch)
            .field("extra", &self.extra)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_variable_rebinding_replaces_path() {
        let options = QueryOptions::new("{ a }")
            .variable("id", "userId")
            .variable("lang", "locale")
            .variable("id", "selected.id");

        assert_eq!(
            options.variables,
            vec![
                ("id".into(), "selected.id".into()),
                ("lang".into(), "locale".into())
            ]
        );
    }

    #[test]
    fn test_watch_options_strip_reserved_keys() {
        let options = QueryOptions::new("{ users }")
            .loading_key("loading")
            .skip("hidden")
            .data_key("allUsers")
            .force_fetch(true)
            .extra("fetchPolicy", "network-only")
            .extra("pollInterval", 500)
            .extra("loadingKey", "sneaky")
            .extra("dataKey", "sneaky")
            .extra("error", true);

        let mut vars = Object::new();
        vars.insert("page", 1);
        let watch = options.watch_options(vars.clone());

        assert_eq!(watch.query, "{ users }");
        assert_eq!(watch.variables, vars);
        assert!(watch.force_fetch);
        let keys: Vec<&str> = watch.extra.keys().collect();
        assert_eq!(keys, vec!["fetchPolicy", "pollInterval"]);
    }
}

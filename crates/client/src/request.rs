//! Requests handed to the GraphQL client.

use alloc::string::String;
use gqlbind_core::{Object, Value};

/// Options for a live watch query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WatchQueryOptions {
    /// GraphQL document source
    pub query: String,
    /// Resolved variable values
    pub variables: Object,
    /// Bypass the cache on the first fetch
    pub force_fetch: bool,
    /// Client configuration passed through untouched (fetch policy, polling, ...)
    pub extra: Object,
}

impl WatchQueryOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_variables(mut self, variables: Object) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key, value);
        self
    }
}

/// A one-shot query, mutation or subscription request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Request {
    pub document: String,
    pub variables: Object,
    pub extra: Object,
}

impl Request {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            ..Self::default()
        }
    }

    pub fn with_variables(mut self, variables: Object) -> Self {
        self.variables = variables;
        self
    }
}

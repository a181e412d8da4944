//! Diagnostics emitted by the binding layer.
//!
//! Nothing in this crate fails loudly: GraphQL errors, transport errors,
//! malformed payloads and usage errors all become `Report`s handed to a
//! `Diagnostics` sink. `DiagnosticLog` keeps them in memory, optionally
//! bounded.

use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use gqlbind_client::{ApolloError, GraphQlError};
use gqlbind_core::Value;

/// A single diagnostic.
#[derive(Clone, Debug, PartialEq)]
pub enum Report {
    /// One GraphQL execution error of the query `key`.
    GraphQlError { key: String, error: GraphQlError },
    /// Transport failure while running the query `key`.
    NetworkError { key: String, message: String },
    /// An error carrying neither execution nor transport details.
    UnclassifiedError { key: String, error: ApolloError },
    /// A ready payload without the expected field.
    MissingData {
        key: String,
        data_key: String,
        data: Value,
    },
    /// `refetch` or `reload` on an undeclared key.
    QueryNotFound { key: String },
    /// A key declared twice.
    DuplicateQuery { key: String },
    /// A declaration rejected up front.
    InvalidDeclaration { message: String },
}

impl Report {
    /// The query key the report is about, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Report::GraphQlError { key, .. }
            | Report::NetworkError { key, .. }
            | Report::UnclassifiedError { key, .. }
            | Report::MissingData { key, .. }
            | Report::QueryNotFound { key }
            | Report::DuplicateQuery { key } => Some(key.as_str()),
            Report::InvalidDeclaration { .. } => None,
        }
    }

    /// Whether the report came from the client's error channel.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Report::GraphQlError { .. } | Report::NetworkError { .. } | Report::UnclassifiedError { .. }
        )
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::GraphQlError { key, error } => {
                write!(f, "GraphQL execution error for query {}: {}", key, error)
            }
            Report::NetworkError { key, message } => {
                write!(f, "Error sending the query {}: {}", key, message)
            }
            Report::UnclassifiedError { key, error } => {
                write!(f, "Query {} failed: {}", key, error)
            }
            Report::MissingData { key, data_key, .. } => {
                write!(f, "Missing \"{}\" in GraphQL data for query {}", data_key, key)
            }
            Report::QueryNotFound { key } => {
                write!(f, "Unable to find a query with key: {}", key)
            }
            Report::DuplicateQuery { key } => {
                write!(f, "Query {} is already declared", key)
            }
            Report::InvalidDeclaration { message } => {
                write!(f, "Invalid query declaration: {}", message)
            }
        }
    }
}

/// Sink for diagnostics.
pub trait Diagnostics {
    fn report(&self, report: Report);
}

/// Reports kept by the log `Apollo` creates when no sink is given.
pub const DEFAULT_LOG_CAPACITY: usize = 256;

/// Keeps reports in memory.
///
/// A bounded log evicts its oldest report once full and counts the
/// evictions in `dropped`.
#[derive(Default)]
pub struct DiagnosticLog {
    reports: RefCell<VecDeque<Report>>,
    capacity: Option<usize>,
    dropped: Cell<usize>,
}

impl DiagnosticLog {
    /// Unbounded log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log holding at most `capacity` reports.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            reports: RefCell::new(VecDeque::with_capacity(capacity)),
            capacity: Some(capacity),
            dropped: Cell::new(0),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// All reports kept so far, oldest first.
    pub fn reports(&self) -> Vec<Report> {
        self.reports.borrow().iter().cloned().collect()
    }

    /// Removes and returns all kept reports.
    pub fn take(&self) -> Vec<Report> {
        self.reports.borrow_mut().drain(..).collect()
    }

    /// Number of reports evicted to stay within capacity.
    pub fn dropped(&self) -> usize {
        self.dropped.get()
    }

    pub fn len(&self) -> usize {
        self.reports.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.borrow().is_empty()
    }

    /// Number of kept reports matching `pred`.
    pub fn count<P>(&self, pred: P) -> usize
    where
        P: Fn(&Report) -> bool,
    {
        self.reports.borrow().iter().filter(|&r| pred(r)).count()
    }
}

impl Diagnostics for DiagnosticLog {
    fn report(&self, report: Report) {
        let mut reports = self.reports.borrow_mut();
        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                self.dropped.set(self.dropped.get() + 1);
                return;
            }
            while reports.len() >= capacity {
                reports.pop_front();
                self.dropped.set(self.dropped.get() + 1);
            }
        }
        reports.push_back(report);
    }
}

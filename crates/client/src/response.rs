//! Results and errors emitted by the GraphQL client.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use gqlbind_core::Value;

/// Network status codes reported alongside watch-query results.
///
/// Codes follow the client's numbering; 5 is unused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NetworkStatus {
    Loading = 1,
    SetVariables = 2,
    FetchMore = 3,
    Refetch = 4,
    Poll = 6,
    Ready = 7,
    Error = 8,
}

impl NetworkStatus {
    /// Maps a raw status code, returning None for unknown codes.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(NetworkStatus::Loading),
            2 => Some(NetworkStatus::SetVariables),
            3 => Some(NetworkStatus::FetchMore),
            4 => Some(NetworkStatus::Refetch),
            6 => Some(NetworkStatus::Poll),
            7 => Some(NetworkStatus::Ready),
            8 => Some(NetworkStatus::Error),
            _ => None,
        }
    }

    /// Returns the raw status code.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// One emission of a watch query, or the outcome of a one-shot operation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    /// Response payload, normally an object keyed by root field
    pub data: Value,
    /// In-flight flag; clients that omit it mean "not loading"
    pub loading: Option<bool>,
    /// Network status; clients that omit it mean "ready"
    pub network_status: Option<NetworkStatus>,
}

impl QueryResult {
    /// A settled result carrying `data`.
    pub fn ready(data: impl Into<Value>) -> Self {
        Self {
            data: data.into(),
            loading: Some(false),
            network_status: Some(NetworkStatus::Ready),
        }
    }

    /// An in-flight notification with no usable data.
    pub fn loading(status: NetworkStatus) -> Self {
        Self {
            data: Value::Null,
            loading: Some(true),
            network_status: Some(status),
        }
    }

    /// Whether the payload should be applied to the host.
    ///
    /// A missing status counts as ready.
    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self.network_status, None | Some(NetworkStatus::Ready))
    }
}

/// A semantic error returned by GraphQL execution.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphQlError {
    pub message: String,
    /// Response path of the failing field, if the server provided one
    pub path: Vec<Value>,
}

impl GraphQlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
        }
    }

    pub fn with_path(mut self, path: Vec<Value>) -> Self {
        self.path = path;
        self
    }
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Error delivered on the error channel of an observable or operation.
///
/// Carries either execution errors, a transport failure, or neither (an
/// unclassified failure described only by `message`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ApolloError {
    pub message: String,
    pub graphql_errors: Vec<GraphQlError>,
    pub network_error: Option<String>,
}

impl ApolloError {
    /// Creates an error carrying GraphQL execution errors.
    pub fn graphql(errors: Vec<GraphQlError>) -> Self {
        Self {
            message: String::from("GraphQL error"),
            graphql_errors: errors,
            network_error: None,
        }
    }

    /// Creates a transport-level error.
    pub fn network(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            message: message.clone(),
            graphql_errors: Vec::new(),
            network_error: Some(message),
        }
    }

    /// Creates an error with neither execution nor transport details.
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            graphql_errors: Vec::new(),
            network_error: None,
        }
    }
}

impl fmt::Display for ApolloError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.graphql_errors.first() {
            write!(f, "GraphQL error: {}", first)?;
            if self.graphql_errors.len() > 1 {
                write!(f, " (+{} more)", self.graphql_errors.len() - 1)?;
            }
            Ok(())
        } else if let Some(network) = &self.network_error {
            write!(f, "Network error: {}", network)
        } else {
            f.write_str(&self.message)
        }
    }
}

//! Per-instance query records.

use crate::options::QueryOptions;
use crate::subscription::{TrackedSubscription, TrackedWatchQuery};
use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use gqlbind_core::{Error, Object, Result};
use hashbrown::HashMap;

/// Live state of one declared query.
pub struct QueryRecord {
    pub(crate) key: String,
    /// Replaced wholesale on reload, never mutated in place
    pub(crate) observable: TrackedWatchQuery,
    pub(crate) subscription: Option<Rc<TrackedSubscription>>,
    pub(crate) options: Rc<QueryOptions>,
    /// Values last handed to the client
    pub(crate) variables: Object,
    /// Newest value per variable name, not yet handed to the client
    pub(crate) pending_variables: Object,
    /// Set by the first applied result; never reset
    pub(crate) first_loading_done: bool,
    pub(crate) skipped: bool,
}

impl QueryRecord {
    pub(crate) fn new(
        key: &str,
        observable: TrackedWatchQuery,
        options: Rc<QueryOptions>,
        variables: Object,
        skipped: bool,
    ) -> Self {
        Self {
            key: key.to_string(),
            observable,
            subscription: None,
            options,
            variables,
            pending_variables: Object::new(),
            first_loading_done: false,
            skipped,
        }
    }

    /// Whether a live subscription is attached.
    pub(crate) fn is_subscribed(&self) -> bool {
        self.subscription.as_ref().is_some_and(|sub| sub.is_active())
    }

    pub(crate) fn snapshot(&self) -> QuerySnapshot {
        QuerySnapshot {
            key: self.key.clone(),
            state: if self.skipped {
                SkipState::Skipped
            } else {
                SkipState::Active
            },
            subscribed: self.is_subscribed(),
            first_loading_done: self.first_loading_done,
            variables: self.variables.clone(),
            pending_variables: self.pending_variables.clone(),
        }
    }
}

/// Activation state of a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipState {
    Active,
    Skipped,
}

/// Point-in-time copy of a record, for hosts and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct QuerySnapshot {
    pub key: String,
    pub state: SkipState,
    pub subscribed: bool,
    pub first_loading_done: bool,
    pub variables: Object,
    pub pending_variables: Object,
}

/// Map from query key to record, remembering declaration order.
#[derive(Default)]
pub struct QueryStore {
    records: HashMap<String, QueryRecord>,
    order: Vec<String>,
}

impl QueryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record. Fails if its key is already declared.
    pub fn create(&mut self, record: QueryRecord) -> Result<()> {
        if self.records.contains_key(&record.key) {
            return Err(Error::duplicate_query(record.key));
        }
        self.order.push(record.key.clone());
        self.records.insert(record.key.clone(), record);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&QueryRecord> {
        self.records.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut QueryRecord> {
        self.records.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn delete(&mut self, key: &str) -> Option<QueryRecord> {
        let record = self.records.remove(key)?;
        self.order.retain(|k| k != key);
        Some(record)
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes every record, in declaration order.
    pub fn drain(&mut self) -> Vec<QueryRecord> {
        let order = core::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|key| self.records.remove(&key))
            .collect()
    }
}

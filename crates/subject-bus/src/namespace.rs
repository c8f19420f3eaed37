//! # Subject Namespace
//!
//! Maps event keys to their subscriber lists for one subject.

use crate::subscriber::KeyedSubscriberList;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Shared handle to one (subject, key) subscriber list.
pub type SharedList<A> = Arc<Mutex<KeyedSubscriberList<A>>>;

/// Event keys of one subject.
pub struct SubjectNamespace<A> {
    lists: HashMap<String, SharedList<A>>,
}

impl<A> Default for SubjectNamespace<A> {
    fn default() -> Self {
        Self {
            lists: HashMap::new(),
        }
    }
}

impl<A: Clone> SubjectNamespace<A> {
    /// Create an empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// List for `key`, created on first access.
    pub fn get_or_create(&mut self, key: &str) -> SharedList<A> {
        self.lists
            .entry(key.to_string())
            .or_insert_with(|| {
                debug!(key, "Subscriber list created");
                Arc::new(Mutex::new(KeyedSubscriberList::new()))
            })
            .clone()
    }
}

impl<A> SubjectNamespace<A> {
    /// List for `key`, if it exists.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<SharedList<A>> {
        self.lists.get(key).cloned()
    }

    /// Drop one key's list. Returns whether it existed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.lists.remove(key).is_some()
    }

    /// Keys with a list.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    /// Whether there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

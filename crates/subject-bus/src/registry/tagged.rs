//! Identity-tag storage.
//!
//! Object subjects are keyed by their allocation address. The entry keeps a
//! `Weak` to the subject: it never extends the subject's lifetime, and while
//! it exists the allocation cannot be reused, so an address in the table
//! always names the same subject. Entries of dropped subjects are pruned on
//! the next insertion. Primitive subjects cannot be tagged and are keyed by
//! value instead.

use super::SubjectStore;
use crate::config::StorageStrategy;
use crate::namespace::SubjectNamespace;
use crate::subject::{Subject, SubjectValue};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Weak;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Tag {
    Bus,
    Addr(usize),
    Value(SubjectValue),
}

impl Tag {
    fn of(subject: &Subject) -> Self {
        match subject {
            Subject::Bus => Self::Bus,
            Subject::Value(v) => Self::Value(v.clone()),
            Subject::Object(_) => Self::Addr(subject.addr().unwrap_or_default()),
        }
    }
}

struct TaggedEntry<A> {
    anchor: Option<Weak<dyn Any + Send + Sync>>,
    namespace: SubjectNamespace<A>,
}

impl<A> TaggedEntry<A> {
    fn new(subject: &Subject, namespace: SubjectNamespace<A>) -> Self {
        Self {
            anchor: subject.downgrade(),
            namespace,
        }
    }

    fn is_live(&self) -> bool {
        self.anchor.as_ref().map_or(true, |w| w.strong_count() > 0)
    }
}

/// O(1) side-table store.
pub struct TaggedStore<A> {
    entries: HashMap<Tag, TaggedEntry<A>>,
}

impl<A> Default for TaggedStore<A> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<A> TaggedStore<A> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop entries whose subject no longer exists.
    pub fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live());
        let pruned = before - self.entries.len();
        if pruned > 0 {
            debug!(pruned, "Pruned namespaces of dropped subjects");
        }
        pruned
    }
}

impl<A: Clone + Send> SubjectStore<A> for TaggedStore<A> {
    fn strategy(&self) -> StorageStrategy {
        StorageStrategy::IdentityTag
    }

    fn resolve(&mut self, subject: &Subject) -> &mut SubjectNamespace<A> {
        let tag = Tag::of(subject);
        if !self.entries.contains_key(&tag) {
            self.prune();
            debug!(subject = ?subject, "Namespace created");
        }
        &mut self
            .entries
            .entry(tag)
            .or_insert_with(|| TaggedEntry::new(subject, SubjectNamespace::new()))
            .namespace
    }

    fn get_mut(&mut self, subject: &Subject) -> Option<&mut SubjectNamespace<A>> {
        self.entries
            .get_mut(&Tag::of(subject))
            .map(|entry| &mut entry.namespace)
    }

    fn remove(&mut self, subject: &Subject) -> Option<SubjectNamespace<A>> {
        self.entries
            .remove(&Tag::of(subject))
            .map(|entry| entry.namespace)
    }

    fn switch(&mut self, from: &Subject, to: &Subject) -> bool {
        let Some(entry) = self.entries.remove(&Tag::of(from)) else {
            return false;
        };

        let replaced = self
            .entries
            .insert(Tag::of(to), TaggedEntry::new(to, entry.namespace));
        if replaced.is_some() {
            warn!(from = ?from, to = ?to, "Switch replaced an existing namespace");
        }
        true
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.values().filter(|entry| entry.is_live()).count()
    }
}

//! Linear-scan storage.
//!
//! Two parallel sequences, resolved by an identity-equality scan. Object
//! subjects are held through a non-owning anchor, so a dropped subject's
//! entry stops resolving and is pruned on the next insertion.

use super::SubjectStore;
use crate::config::StorageStrategy;
use crate::namespace::SubjectNamespace;
use crate::subject::{Subject, SubjectAnchor};
use tracing::{debug, warn};

/// O(n) parallel-sequence store.
pub struct ScanStore<A> {
    subjects: Vec<SubjectAnchor>,
    namespaces: Vec<SubjectNamespace<A>>,
}

impl<A> Default for ScanStore<A> {
    fn default() -> Self {
        Self {
            subjects: Vec::new(),
            namespaces: Vec::new(),
        }
    }
}

impl<A> ScanStore<A> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop entries whose subject no longer exists.
    pub fn prune(&mut self) -> usize {
        let mut pruned = 0;
        let mut i = 0;
        while i < self.subjects.len() {
            if self.subjects[i].is_live() {
                i += 1;
            } else {
                self.remove_at(i);
                pruned += 1;
            }
        }
        if pruned > 0 {
            debug!(pruned, "Pruned namespaces of dropped subjects");
        }
        pruned
    }

    fn position(&self, subject: &Subject) -> Option<usize> {
        self.subjects.iter().position(|s| s.matches(subject))
    }

    fn remove_at(&mut self, i: usize) -> SubjectNamespace<A> {
        self.subjects.remove(i);
        self.namespaces.remove(i)
    }
}

impl<A: Clone + Send> SubjectStore<A> for ScanStore<A> {
    fn strategy(&self) -> StorageStrategy {
        StorageStrategy::LinearScan
    }

    fn resolve(&mut self, subject: &Subject) -> &mut SubjectNamespace<A> {
        let i = match self.position(subject) {
            Some(i) => i,
            None => {
                self.prune();
                debug!(subject = ?subject, "Namespace created");
                self.subjects.push(SubjectAnchor::of(subject));
                self.namespaces.push(SubjectNamespace::new());
                self.namespaces.len() - 1
            }
        };
        &mut self.namespaces[i]
    }

    fn get_mut(&mut self, subject: &Subject) -> Option<&mut SubjectNamespace<A>> {
        let i = self.position(subject)?;
        self.namespaces.get_mut(i)
    }

    fn remove(&mut self, subject: &Subject) -> Option<SubjectNamespace<A>> {
        let i = self.position(subject)?;
        Some(self.remove_at(i))
    }

    fn switch(&mut self, from: &Subject, to: &Subject) -> bool {
        let Some(mut i) = self.position(from) else {
            return false;
        };

        if let Some(j) = self.position(to).filter(|&j| j != i) {
            warn!(from = ?from, to = ?to, "Switch replaced an existing namespace");
            self.remove_at(j);
            if j < i {
                i -= 1;
            }
        }

        self.subjects[i] = SubjectAnchor::of(to);
        true
    }

    fn clear(&mut self) {
        self.subjects.clear();
        self.namespaces.clear();
    }

    fn len(&self) -> usize {
        self.subjects.iter().filter(|s| s.is_live()).count()
    }
}

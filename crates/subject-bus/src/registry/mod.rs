//! # Subject Registry
//!
//! Resolves a subject to its [`SubjectNamespace`]. Two interchangeable
//! strategies implement [`SubjectStore`]:
//!
//! | Strategy | Type | Lookup |
//! |----------|------|--------|
//! | identity-tag | [`TaggedStore`] | O(1) |
//! | linear-scan | [`ScanStore`] | O(n) |
//!
//! Neither store extends the lifetime of an object subject; an entry whose
//! subject was dropped no longer counts. Both produce identical observable
//! results for any sequence of bus operations.

mod scan;
mod tagged;

pub use scan::ScanStore;
pub use tagged::TaggedStore;

use crate::config::StorageStrategy;
use crate::namespace::SubjectNamespace;
use crate::subject::Subject;

/// Storage backend mapping subjects to namespaces.
pub trait SubjectStore<A>: Send {
    /// Which strategy this store implements.
    fn strategy(&self) -> StorageStrategy;

    /// Namespace for `subject`, created on first access.
    fn resolve(&mut self, subject: &Subject) -> &mut SubjectNamespace<A>;

    /// Namespace for `subject`, if one exists.
    fn get_mut(&mut self, subject: &Subject) -> Option<&mut SubjectNamespace<A>>;

    /// Remove the whole entry for `subject`.
    fn remove(&mut self, subject: &Subject) -> Option<SubjectNamespace<A>>;

    /// Re-key the entry of `from` to `to`, preserving the namespace.
    ///
    /// Returns `false` if `from` has no entry. An existing entry for `to`
    /// is replaced.
    fn switch(&mut self, from: &Subject, to: &Subject) -> bool;

    /// Remove every entry.
    fn clear(&mut self);

    /// Number of live entries.
    fn len(&self) -> usize;

    /// Whether there are no live entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Create the store for a strategy.
#[must_use]
pub fn new_store<A>(strategy: StorageStrategy) -> Box<dyn SubjectStore<A>>
where
    A: Clone + Send + 'static,
{
    match strategy {
        StorageStrategy::IdentityTag => Box::new(TaggedStore::new()),
        StorageStrategy::LinearScan => Box::new(ScanStore::new()),
    }
}

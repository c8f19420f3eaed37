//! # Subscribers
//!
//! A [`Subscriber`] wraps one callback with an optional identity and call
//! budget. A [`KeyedSubscriberList`] holds the ordered subscribers of one
//! (subject, key) pair together with its replay state.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared subscriber callback.
pub type Callback<A> = Arc<dyn Fn(&A) -> anyhow::Result<()> + Send + Sync>;

/// One registered callback.
pub struct Subscriber<A> {
    callback: Callback<A>,
    identity: Option<String>,
    call_budget: Option<usize>,
    invocations: AtomicUsize,
}

impl<A> Subscriber<A> {
    /// Create a subscriber.
    ///
    /// A budget of `Some(0)` registers a subscriber that never fires.
    pub fn new(
        callback: Callback<A>,
        identity: Option<String>,
        call_budget: Option<usize>,
    ) -> Self {
        Self {
            callback,
            identity,
            call_budget,
            invocations: AtomicUsize::new(0),
        }
    }

    /// Invoke the callback unless the call budget is exhausted.
    ///
    /// The invocation is counted before the callback runs, so a failing
    /// callback still consumes budget.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` - the callback ran
    /// - `Ok(false)` - the budget was exhausted; nothing ran
    pub fn notify(&self, args: &A) -> anyhow::Result<bool> {
        if !self.reserve() {
            return Ok(false);
        }
        (self.callback)(args)?;
        Ok(true)
    }

    fn reserve(&self) -> bool {
        match self.call_budget {
            None => {
                self.invocations.fetch_add(1, Ordering::AcqRel);
                true
            }
            Some(budget) => self
                .invocations
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                    (n < budget).then_some(n + 1)
                })
                .is_ok(),
        }
    }

    /// Identity used for dedup and removal.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Maximum number of invocations, if capped.
    #[must_use]
    pub fn call_budget(&self) -> Option<usize> {
        self.call_budget
    }

    /// Number of invocations so far.
    #[must_use]
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::Acquire)
    }

    /// Invocations left before the budget is exhausted (`None` if uncapped).
    #[must_use]
    pub fn remaining(&self) -> Option<usize> {
        self.call_budget
            .map(|budget| budget.saturating_sub(self.invocations()))
    }
}

impl<A> fmt::Debug for Subscriber<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("identity", &self.identity)
            .field("call_budget", &self.call_budget)
            .field("invocations", &self.invocations())
            .finish_non_exhaustive()
    }
}

/// Invoke a snapshot of subscribers in order.
///
/// Stops at the first failing callback. Returns how many callbacks ran.
pub(crate) fn dispatch<A>(snapshot: &[Arc<Subscriber<A>>], args: &A) -> anyhow::Result<usize> {
    let mut invoked = 0;
    for subscriber in snapshot {
        if subscriber.notify(args)? {
            invoked += 1;
        }
    }
    Ok(invoked)
}

/// Ordered subscribers of one (subject, key) pair.
pub struct KeyedSubscriberList<A> {
    subscribers: Vec<Arc<Subscriber<A>>>,
    is_notified: bool,
    last_args: Option<A>,
}

impl<A> Default for KeyedSubscriberList<A> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            is_notified: false,
            last_args: None,
        }
    }
}

impl<A: Clone> KeyedSubscriberList<A> {
    /// Create an empty, never-notified list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `args` for replay, mark the pair notified and return a
    /// snapshot of the subscribers to invoke.
    ///
    /// The caller invokes the snapshot after releasing any lock on the list,
    /// so callbacks may mutate the list without disturbing the dispatch.
    pub fn begin_notify(&mut self, args: &A) -> Vec<Arc<Subscriber<A>>> {
        self.last_args = Some(args.clone());
        self.is_notified = true;
        self.subscribers.clone()
    }

    /// Notify every subscriber in registration order.
    ///
    /// Returns how many callbacks ran.
    pub fn notify(&mut self, args: &A) -> anyhow::Result<usize> {
        let snapshot = self.begin_notify(args);
        dispatch(&snapshot, args)
    }

    /// Payload to replay to a late subscriber, if the pair was notified.
    #[must_use]
    pub fn replay_args(&self) -> Option<A> {
        if self.is_notified {
            self.last_args.clone()
        } else {
            None
        }
    }
}

impl<A> KeyedSubscriberList<A> {
    /// Append a subscriber.
    pub fn push(&mut self, subscriber: Arc<Subscriber<A>>) {
        self.subscribers.push(subscriber);
    }

    /// Position of the first subscriber with this identity.
    ///
    /// `Some(0)` is a hit at the front of the list, distinct from `None`.
    #[must_use]
    pub fn index_of(&self, identity: &str) -> Option<usize> {
        self.subscribers
            .iter()
            .position(|s| s.identity() == Some(identity))
    }

    /// Remove the first subscriber with this identity, or all of them if
    /// `remove_all`. Returns the number removed.
    pub fn remove_fn(&mut self, identity: &str, remove_all: bool) -> usize {
        if !remove_all {
            return match self.index_of(identity) {
                Some(i) => {
                    self.subscribers.remove(i);
                    1
                }
                None => 0,
            };
        }

        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.identity() != Some(identity));
        before - self.subscribers.len()
    }

    /// Whether the pair has been notified at least once.
    #[must_use]
    pub fn is_notified(&self) -> bool {
        self.is_notified
    }

    /// Latest notify payload.
    #[must_use]
    pub fn last_args(&self) -> Option<&A> {
        self.last_args.as_ref()
    }

    /// Subscribers in registration order.
    #[must_use]
    pub fn subscribers(&self) -> &[Arc<Subscriber<A>>] {
        &self.subscribers
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether no subscribers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

//! # Event Bus
//!
//! Public façade over the registry. Every operation first resolves
//! (subject, key) to a [`KeyedSubscriberList`](crate::KeyedSubscriberList),
//! then works on that list.
//!
//! ## Locking
//!
//! One coarse lock guards the registry and one lock guards each keyed list.
//! Neither is held while a callback runs: `notify` dispatches a snapshot of
//! the list taken when it started, so callbacks may re-enter the bus (even
//! for the same pair) without skipping or repeating anyone.

use crate::config::{BusConfig, BusConfigBuilder, StorageStrategy};
use crate::error::BusError;
use crate::namespace::SharedList;
use crate::options::{derive_identity, ListenOptions, UnlistenOptions};
use crate::registry::{new_store, SubjectStore};
use crate::subject::Subject;
use crate::subscriber::{dispatch, Callback, Subscriber};
use parking_lot::Mutex;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default notify payload: the argument list of a notification.
pub type Args = Vec<serde_json::Value>;

static BUS_SUBJECT: Subject = Subject::Bus;

struct BusInner<A> {
    config: BusConfig,
    store: Mutex<Box<dyn SubjectStore<A>>>,
}

/// In-process publish/subscribe dispatcher.
///
/// Cloning is cheap and yields a handle to the same registry.
pub struct EventBus<A = Args> {
    inner: Arc<BusInner<A>>,
}

impl<A> Clone for EventBus<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> EventBus<A>
where
    A: Clone + Send + Sync + 'static,
{
    /// Create a bus with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(BusConfig::default())
    }

    /// Create a bus with a validated configuration.
    pub fn with_config(config: BusConfig) -> Result<Self, BusError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Start a configuration for [`EventBus::with_config`].
    #[must_use]
    pub fn builder() -> BusConfigBuilder {
        BusConfigBuilder::new()
    }

    fn build(config: BusConfig) -> Self {
        debug!(
            strategy = %config.storage_strategy,
            production = config.production_mode,
            "Event bus created"
        );
        Self {
            inner: Arc::new(BusInner {
                store: Mutex::new(new_store(config.storage_strategy)),
                config,
            }),
        }
    }

    /// Configuration the bus was built with.
    #[must_use]
    pub fn config(&self) -> &BusConfig {
        &self.inner.config
    }

    /// Storage strategy in use.
    #[must_use]
    pub fn strategy(&self) -> StorageStrategy {
        self.inner.store.lock().strategy()
    }

    /// Dispatch `args` to every subscriber of (subject, key), in
    /// registration order.
    ///
    /// A missing subject means the bus itself; a missing or empty key means
    /// the implicit key.
    ///
    /// # Errors
    ///
    /// - `BusError::Callback` - a callback failed; later subscribers were
    ///   not invoked
    pub fn notify(
        &self,
        subject: Option<&Subject>,
        key: Option<&str>,
        args: A,
    ) -> Result<(), BusError> {
        let subject = subject.unwrap_or(&BUS_SUBJECT);
        let key = self.key(key);

        let list = self.list_or_create(subject, key);
        let snapshot = list.lock().begin_notify(&args);

        let invoked = dispatch(&snapshot, &args).map_err(BusError::Callback)?;
        debug!(
            subject = ?subject,
            key,
            subscribers = snapshot.len(),
            invoked,
            "Notified"
        );
        Ok(())
    }

    /// Register `callback` for (subject, key).
    ///
    /// If the pair was already notified and replay is enabled, the callback
    /// runs with the last payload before this returns.
    ///
    /// # Errors
    ///
    /// - `BusError::IdentityRequired` - `once` without a resolvable identity
    ///   (swallowed in production mode)
    /// - `BusError::Callback` - the replay failed; the subscriber stays
    ///   registered
    pub fn listen<F>(
        &self,
        subject: Option<&Subject>,
        key: Option<&str>,
        callback: F,
        options: ListenOptions,
    ) -> Result<(), BusError>
    where
        F: Fn(&A) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let subject = subject.unwrap_or(&BUS_SUBJECT);
        let key = self.key(key);

        let identity = self.resolve_identity(options.identity, Some(type_name::<F>()));
        if options.once && identity.is_none() {
            return self.fail(BusError::IdentityRequired {
                operation: "listen_once",
                hint: self.identity_hint(true),
            });
        }

        let list = self.list_or_create(subject, key);
        let (subscriber, replay) = {
            let mut list = list.lock();

            if let (true, Some(id)) = (options.once, identity.as_deref()) {
                if let Some(position) = list.index_of(id) {
                    debug!(
                        subject = ?subject,
                        key,
                        identity = id,
                        position,
                        "Already registered, skipped"
                    );
                    return Ok(());
                }
            }

            let callback: Callback<A> = Arc::new(callback);
            let subscriber = Arc::new(Subscriber::new(callback, identity, options.call_budget));
            list.push(Arc::clone(&subscriber));

            let replay = if options.call_if_already_notified {
                list.replay_args()
            } else {
                None
            };
            (subscriber, replay)
        };

        debug!(
            subject = ?subject,
            key,
            identity = subscriber.identity(),
            budget = subscriber.call_budget(),
            "Subscriber registered"
        );

        if let Some(args) = replay {
            let invoked = subscriber.notify(&args).map_err(BusError::Callback)?;
            debug!(subject = ?subject, key, invoked, "Replayed last notification");
        }
        Ok(())
    }

    /// Remove the subscriber(s) of (subject, key) matching an identity.
    ///
    /// Returns the number removed.
    ///
    /// # Errors
    ///
    /// - `BusError::IdentityRequired` - neither an identity nor a derivable
    ///   callback was given (swallowed in production mode)
    pub fn unlisten(
        &self,
        subject: Option<&Subject>,
        key: Option<&str>,
        options: UnlistenOptions,
    ) -> Result<usize, BusError> {
        let subject = subject.unwrap_or(&BUS_SUBJECT);
        let key = self.key(key);

        let has_callback = options.callback_name.is_some();
        let Some(identity) = self.resolve_identity(options.identity, options.callback_name) else {
            return self.fail(BusError::IdentityRequired {
                operation: "unlisten",
                hint: self.identity_hint(has_callback),
            });
        };

        let Some(list) = self.existing_list(subject, key) else {
            return Ok(0);
        };
        let removed = list.lock().remove_fn(&identity, options.remove_all);

        debug!(subject = ?subject, key, identity = %identity, removed, "Subscribers removed");
        Ok(removed)
    }

    /// Alias of [`EventBus::listen`].
    #[inline]
    pub fn subscribe<F>(
        &self,
        subject: Option<&Subject>,
        key: Option<&str>,
        callback: F,
        options: ListenOptions,
    ) -> Result<(), BusError>
    where
        F: Fn(&A) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.listen(subject, key, callback, options)
    }

    /// Alias of [`EventBus::listen`].
    #[inline]
    pub fn register<F>(
        &self,
        subject: Option<&Subject>,
        key: Option<&str>,
        callback: F,
        options: ListenOptions,
    ) -> Result<(), BusError>
    where
        F: Fn(&A) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.listen(subject, key, callback, options)
    }

    /// Alias of [`EventBus::unlisten`].
    #[inline]
    pub fn unsubscribe(
        &self,
        subject: Option<&Subject>,
        key: Option<&str>,
        options: UnlistenOptions,
    ) -> Result<usize, BusError> {
        self.unlisten(subject, key, options)
    }

    /// Alias of [`EventBus::unlisten`].
    #[inline]
    pub fn unregister(
        &self,
        subject: Option<&Subject>,
        key: Option<&str>,
        options: UnlistenOptions,
    ) -> Result<usize, BusError> {
        self.unlisten(subject, key, options)
    }

    /// Clear registrations.
    ///
    /// | subject | key | cleared |
    /// |---------|-----|---------|
    /// | `None` | `None` | everything |
    /// | `Some(s)` | `None` or `""` | all keys of `s` |
    /// | `Some(s)` | `Some(k)` | only `k` under `s` |
    ///
    /// A key without a subject applies to the bus subject.
    pub fn clear(&self, subject: Option<&Subject>, key: Option<&str>) {
        let key = key.filter(|k| !k.is_empty());
        let mut store = self.inner.store.lock();

        match (subject, key) {
            (None, None) => {
                store.clear();
                debug!("Registry cleared");
            }
            (subject, None) => {
                let subject = subject.unwrap_or(&BUS_SUBJECT);
                let existed = store.remove(subject).is_some();
                debug!(subject = ?subject, existed, "Subject cleared");
            }
            (subject, Some(key)) => {
                let subject = subject.unwrap_or(&BUS_SUBJECT);
                let existed = store
                    .get_mut(subject)
                    .is_some_and(|namespace| namespace.remove(key));
                debug!(subject = ?subject, key, existed, "Key cleared");
            }
        }
    }

    /// Move the namespace of `from` to `to`, keeping its subscribers and
    /// replay state. `from` no longer resolves afterwards.
    ///
    /// # Errors
    ///
    /// - `BusError::InvalidSubject` - `from` has no registrations
    ///   (swallowed in production mode)
    pub fn switch_on(&self, from: &Subject, to: &Subject) -> Result<(), BusError> {
        let switched = self.inner.store.lock().switch(from, to);
        if !switched {
            return self.fail(BusError::InvalidSubject {
                subject: format!("{from:?}"),
                key: None,
            });
        }
        debug!(from = ?from, to = ?to, "Subject switched");
        Ok(())
    }

    /// Position of the first subscriber of (subject, key) with `identity`.
    #[must_use]
    pub fn index_of(
        &self,
        subject: Option<&Subject>,
        key: Option<&str>,
        identity: &str,
    ) -> Option<usize> {
        self.existing_list(subject.unwrap_or(&BUS_SUBJECT), self.key(key))?
            .lock()
            .index_of(identity)
    }

    /// Number of subscribers registered for (subject, key).
    #[must_use]
    pub fn subscriber_count(&self, subject: Option<&Subject>, key: Option<&str>) -> usize {
        self.existing_list(subject.unwrap_or(&BUS_SUBJECT), self.key(key))
            .map_or(0, |list| list.lock().len())
    }

    /// Whether (subject, key) has been notified since it was last cleared.
    #[must_use]
    pub fn is_notified(&self, subject: Option<&Subject>, key: Option<&str>) -> bool {
        self.existing_list(subject.unwrap_or(&BUS_SUBJECT), self.key(key))
            .is_some_and(|list| list.lock().is_notified())
    }

    /// Number of subjects with a namespace.
    #[must_use]
    pub fn subject_count(&self) -> usize {
        self.inner.store.lock().len()
    }

    fn key<'a>(&'a self, key: Option<&'a str>) -> &'a str {
        match key {
            Some(k) if !k.is_empty() => k,
            _ => &self.inner.config.implicit_key,
        }
    }

    fn list_or_create(&self, subject: &Subject, key: &str) -> SharedList<A> {
        self.inner.store.lock().resolve(subject).get_or_create(key)
    }

    fn existing_list(&self, subject: &Subject, key: &str) -> Option<SharedList<A>> {
        self.inner.store.lock().get_mut(subject)?.get(key)
    }

    fn resolve_identity(
        &self,
        explicit: Option<String>,
        callback_name: Option<&str>,
    ) -> Option<String> {
        explicit.filter(|id| !id.is_empty()).or_else(|| {
            if self.inner.config.auto_derive_identity {
                callback_name.and_then(derive_identity)
            } else {
                None
            }
        })
    }

    fn identity_hint(&self, has_callback: bool) -> String {
        match (has_callback, self.inner.config.auto_derive_identity) {
            (_, false) => "pass an identity or enable auto_derive_identity".to_string(),
            (true, true) => "the callback has no declared name; pass an identity".to_string(),
            (false, true) => "no identity and no callback were given; pass an identity".to_string(),
        }
    }

    fn fail<T: Default>(&self, err: BusError) -> Result<T, BusError> {
        if self.inner.config.production_mode && err.is_diagnostic() {
            warn!(error = %err, label = err.as_label(), "Ignored in production mode");
            return Ok(T::default());
        }
        Err(err)
    }
}

impl<A> Default for EventBus<A>
where
    A: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for EventBus<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("config", &self.inner.config)
            .field("subjects", &self.inner.store.lock().len())
            .finish()
    }
}

//! Per-operation options for `listen` and `unlisten`.

use std::any::type_name;

/// Options for [`EventBus::listen`](crate::EventBus::listen).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenOptions {
    /// Explicit subscriber identity.
    pub identity: Option<String>,
    /// Skip registration if a subscriber with the same identity exists.
    /// Requires a resolvable identity.
    pub once: bool,
    /// Replay the last notification to the new subscriber if the pair was
    /// already notified.
    pub call_if_already_notified: bool,
    /// Maximum number of invocations.
    pub call_budget: Option<usize>,
}

impl Default for ListenOptions {
    fn default() -> Self {
        Self {
            identity: None,
            once: false,
            call_if_already_notified: true,
            call_budget: None,
        }
    }
}

impl ListenOptions {
    /// Set the subscriber identity.
    #[must_use]
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Register at most once per identity.
    #[must_use]
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    /// Cap the number of invocations.
    #[must_use]
    pub fn with_call_budget(mut self, budget: usize) -> Self {
        self.call_budget = Some(budget);
        self
    }

    /// Control replay of the last notification.
    #[must_use]
    pub fn call_if_already_notified(mut self, enabled: bool) -> Self {
        self.call_if_already_notified = enabled;
        self
    }
}

/// Options for [`EventBus::unlisten`](crate::EventBus::unlisten).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlistenOptions {
    /// Identity of the subscriber(s) to remove.
    pub identity: Option<String>,
    /// Type name of the callback, used to derive an identity when
    /// `auto_derive_identity` is enabled.
    pub callback_name: Option<&'static str>,
    /// Remove every match instead of only the first.
    pub remove_all: bool,
}

impl Default for UnlistenOptions {
    fn default() -> Self {
        Self {
            identity: None,
            callback_name: None,
            remove_all: true,
        }
    }
}

impl UnlistenOptions {
    /// Target subscribers with this identity.
    #[must_use]
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Target the subscriber registered with this callback.
    #[must_use]
    pub fn with_callback<F>(mut self, _callback: &F) -> Self {
        self.callback_name = Some(type_name::<F>());
        self
    }

    /// Remove only the first match.
    #[must_use]
    pub fn first_only(mut self) -> Self {
        self.remove_all = false;
        self
    }
}

/// Best-effort identity from a callback's type name.
///
/// A named function yields its declared name. Closures, function pointers
/// and trait objects have no declared name and yield `None`.
pub(crate) fn derive_identity(callback_type: &str) -> Option<String> {
    if callback_type.contains("{{closure}}")
        || callback_type.contains('(')
        || callback_type.starts_with("dyn ")
    {
        return None;
    }

    let path = callback_type.trim_start_matches('&').split('<').next()?;
    let name = path.rsplit("::").next()?.trim();
    (!name.is_empty()).then(|| name.to_string())
}

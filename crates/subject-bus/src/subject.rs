//! # Subjects
//!
//! A subject is the value an event namespace hangs off. Shared objects are
//! compared by identity (the allocation they point to), never by value.
//! Primitive values cannot carry an identity of their own, so they are
//! compared by value.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

/// Type-erased shared subject handle.
pub type SubjectRef = Arc<dyn Any + Send + Sync>;

/// A primitive subject value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubjectValue {
    /// String subject.
    Str(String),
    /// Integer subject.
    Int(i64),
    /// Boolean subject.
    Bool(bool),
}

/// The namespace an event key lives under.
#[derive(Clone)]
pub enum Subject {
    /// The bus itself; used when no subject is supplied.
    Bus,
    /// A shared object, compared by pointer identity.
    Object(SubjectRef),
    /// A primitive, compared by value.
    Value(SubjectValue),
}

impl Subject {
    /// Wrap a shared object as a subject.
    ///
    /// Two subjects built from clones of the same `Arc` are the same subject.
    #[must_use]
    pub fn object<T: Any + Send + Sync>(value: &Arc<T>) -> Self {
        Self::Object(Arc::clone(value) as SubjectRef)
    }

    /// Identity comparison.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bus, Self::Bus) => true,
            (Self::Object(a), Self::Object(b)) => addr_of(a) == addr_of(b),
            (Self::Value(a), Self::Value(b)) => a == b,
            _ => false,
        }
    }

    /// Allocation address for object subjects.
    pub(crate) fn addr(&self) -> Option<usize> {
        match self {
            Self::Object(r) => Some(addr_of(r)),
            _ => None,
        }
    }

    /// Non-owning handle for object subjects.
    pub(crate) fn downgrade(&self) -> Option<Weak<dyn Any + Send + Sync>> {
        match self {
            Self::Object(r) => Some(Arc::downgrade(r)),
            _ => None,
        }
    }
}

fn addr_of(r: &SubjectRef) -> usize {
    Arc::as_ptr(r).cast::<()>() as usize
}

/// Non-owning stand-in for a [`Subject`] held by a store.
///
/// An object anchor keeps the allocation reserved but not the value, so
/// its address cannot be reused while the anchor exists.
#[derive(Clone)]
pub(crate) enum SubjectAnchor {
    Bus,
    Object(Weak<dyn Any + Send + Sync>),
    Value(SubjectValue),
}

impl SubjectAnchor {
    pub(crate) fn of(subject: &Subject) -> Self {
        match subject {
            Subject::Bus => Self::Bus,
            Subject::Object(r) => Self::Object(Arc::downgrade(r)),
            Subject::Value(v) => Self::Value(v.clone()),
        }
    }

    /// Whether the anchored subject still exists. Primitives always do.
    pub(crate) fn is_live(&self) -> bool {
        match self {
            Self::Object(w) => w.strong_count() > 0,
            _ => true,
        }
    }

    /// Whether this anchor stands for `subject`, which must be live.
    pub(crate) fn matches(&self, subject: &Subject) -> bool {
        match (self, subject) {
            (Self::Bus, Subject::Bus) => true,
            (Self::Object(w), Subject::Object(r)) => {
                self.is_live() && w.as_ptr().cast::<()>() as usize == addr_of(r)
            }
            (Self::Value(a), Subject::Value(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for SubjectAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => f.write_str("Bus"),
            Self::Object(w) => write!(f, "Object({:#x})", w.as_ptr().cast::<()>() as usize),
            Self::Value(v) => write!(f, "Value({v:?})"),
        }
    }
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => f.write_str("Bus"),
            Self::Object(r) => write!(f, "Object({:#x})", addr_of(r)),
            Self::Value(v) => write!(f, "Value({v:?})"),
        }
    }
}

impl From<&str> for Subject {
    fn from(value: &str) -> Self {
        Self::Value(SubjectValue::Str(value.to_string()))
    }
}

impl From<String> for Subject {
    fn from(value: String) -> Self {
        Self::Value(SubjectValue::Str(value))
    }
}

impl From<i64> for Subject {
    fn from(value: i64) -> Self {
        Self::Value(SubjectValue::Int(value))
    }
}

impl From<bool> for Subject {
    fn from(value: bool) -> Self {
        Self::Value(SubjectValue::Bool(value))
    }
}

impl From<SubjectValue> for Subject {
    fn from(value: SubjectValue) -> Self {
        Self::Value(value)
    }
}

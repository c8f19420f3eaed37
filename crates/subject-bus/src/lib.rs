//! # Subject Bus - In-Process Publish/Subscribe Dispatcher
//!
//! Routes notifications to callbacks registered against a (subject, key)
//! pair. A subject is any object handle, a primitive value, or the bus
//! itself; a key is an event name.
//!
//! ## Resolution
//!
//! ```text
//! ┌──────────────┐  notify(subject, key, args)   ┌────────────────────┐
//! │   Caller     │ ─────────────────────────────▶│     EventBus       │
//! └──────────────┘                               │                    │
//!                                                │  SubjectStore      │
//!                                                │   (tag | scan)     │
//!                                                └─────────┬──────────┘
//!                                                          │ subject
//!                                                          ▼
//!                                                ┌────────────────────┐
//!                                                │ SubjectNamespace   │
//!                                                └─────────┬──────────┘
//!                                                          │ key
//!                                                          ▼
//!                                                ┌────────────────────┐
//!                                                │ KeyedSubscriberList│──▶ callbacks
//!                                                └────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - Subscribers run in registration order
//! - A subscriber with a call budget runs at most that many times
//! - Late subscribers receive the last notification (replay)
//! - Callbacks never run while a bus lock is held, so they may re-enter
//!
//! ## Example
//!
//! ```
//! use subject_bus::{EventBus, ListenOptions, Subject};
//! use std::sync::Arc;
//!
//! let bus: EventBus<String> = EventBus::new();
//! let button = Arc::new("save");
//! let subject = Subject::object(&button);
//!
//! bus.listen(Some(&subject), Some("click"), |label: &String| {
//!     println!("clicked {label}");
//!     Ok(())
//! }, ListenOptions::default()).unwrap();
//!
//! bus.notify(Some(&subject), Some("click"), "save".to_string()).unwrap();
//! ```

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod config;
pub mod error;
pub mod namespace;
pub mod options;
pub mod registry;
pub mod subject;
pub mod subscriber;

// Re-export main types
pub use bus::{Args, EventBus};
pub use config::{BusConfig, BusConfigBuilder, StorageStrategy, DEFAULT_IMPLICIT_KEY};
pub use error::{BusError, ConfigError};
pub use namespace::{SharedList, SubjectNamespace};
pub use options::{ListenOptions, UnlistenOptions};
pub use registry::{new_store, ScanStore, SubjectStore, TaggedStore};
pub use subject::{Subject, SubjectRef, SubjectValue};
pub use subscriber::{Callback, KeyedSubscriberList, Subscriber};

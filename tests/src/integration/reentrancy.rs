//! # Re-entrant Callbacks
//!
//! Callbacks run with no bus lock held and may call back into the same bus.
//! A dispatch always works on the subscriber list as it was when the
//! dispatch started.

#[cfg(test)]
mod tests {
    use super::super::init_test_logging;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use subject_bus::{BusError, EventBus, ListenOptions, Subject, UnlistenOptions};

    type Log = Arc<Mutex<Vec<String>>>;

    fn push(log: &Log, entry: impl Into<String>) {
        log.lock().push(entry.into());
    }

    #[test]
    fn test_listen_during_dispatch_gets_replay_not_current_dispatch() {
        init_test_logging();
        let bus: EventBus<u32> = EventBus::new();
        let log = Log::default();

        let (inner_bus, inner_log) = (bus.clone(), log.clone());
        bus.listen(
            None,
            Some("tick"),
            move |n: &u32| {
                push(&inner_log, format!("outer:{n}"));
                let late_log = inner_log.clone();
                inner_bus
                    .listen(
                        None,
                        Some("tick"),
                        move |n: &u32| {
                            push(&late_log, format!("late:{n}"));
                            Ok(())
                        },
                        ListenOptions::default().with_call_budget(1),
                    )
                    .map_err(anyhow::Error::from)
            },
            ListenOptions::default().with_call_budget(1),
        )
        .unwrap();

        bus.notify(None, Some("tick"), 1).unwrap();

        // The late subscriber was replayed with 1 and is now exhausted
        assert_eq!(*log.lock(), vec!["outer:1", "late:1"]);

        bus.notify(None, Some("tick"), 2).unwrap();
        assert_eq!(log.lock().len(), 2);
        assert_eq!(bus.subscriber_count(None, Some("tick")), 2);
    }

    #[test]
    fn test_unlisten_during_dispatch_does_not_skip_snapshot() {
        let bus: EventBus<u32> = EventBus::new();
        let log = Log::default();

        let (inner_bus, inner_log) = (bus.clone(), log.clone());
        bus.listen(
            None,
            None,
            move |_: &u32| {
                push(&inner_log, "first");
                inner_bus
                    .unlisten(None, None, UnlistenOptions::default().with_identity("second"))
                    .map(|_| ())
                    .map_err(anyhow::Error::from)
            },
            ListenOptions::default().with_identity("first"),
        )
        .unwrap();

        let second_log = log.clone();
        bus.listen(
            None,
            None,
            move |_: &u32| {
                push(&second_log, "second");
                Ok(())
            },
            ListenOptions::default().with_identity("second"),
        )
        .unwrap();

        bus.notify(None, None, 0).unwrap();
        assert_eq!(*log.lock(), vec!["first", "second"]);

        bus.notify(None, None, 0).unwrap();
        assert_eq!(*log.lock(), vec!["first", "second", "first"]);
    }

    #[test]
    fn test_notify_from_callback_on_other_subject() {
        let bus: EventBus<String> = EventBus::new();
        let log = Log::default();
        let order = Subject::from("order");
        let audit = Subject::from("audit");

        let audit_log = log.clone();
        bus.listen(
            Some(&audit),
            Some("entry"),
            move |msg: &String| {
                push(&audit_log, format!("audit:{msg}"));
                Ok(())
            },
            ListenOptions::default(),
        )
        .unwrap();

        let (inner_bus, inner_audit) = (bus.clone(), audit.clone());
        bus.listen(
            Some(&order),
            Some("placed"),
            move |id: &String| {
                inner_bus
                    .notify(Some(&inner_audit), Some("entry"), format!("order {id}"))
                    .map_err(anyhow::Error::from)
            },
            ListenOptions::default(),
        )
        .unwrap();

        bus.notify(Some(&order), Some("placed"), "42".to_string())
            .unwrap();
        assert_eq!(*log.lock(), vec!["audit:order 42"]);
    }

    #[test]
    fn test_clear_during_dispatch() {
        let bus: EventBus<u32> = EventBus::new();
        let log = Log::default();

        let (inner_bus, inner_log) = (bus.clone(), log.clone());
        bus.listen(
            None,
            Some("k"),
            move |_: &u32| {
                push(&inner_log, "clearer");
                inner_bus.clear(None, None);
                Ok(())
            },
            ListenOptions::default(),
        )
        .unwrap();

        bus.notify(None, Some("k"), 0).unwrap();
        assert_eq!(bus.subject_count(), 0);

        bus.notify(None, Some("k"), 0).unwrap();
        assert_eq!(*log.lock(), vec!["clearer"]);
    }

    #[test]
    fn test_failing_callback_stops_dispatch() {
        let bus: EventBus<u32> = EventBus::new();
        let log = Log::default();

        bus.listen(
            None,
            None,
            |n: &u32| -> anyhow::Result<()> { anyhow::bail!("rejected {n}") },
            ListenOptions::default(),
        )
        .unwrap();
        let after = log.clone();
        bus.listen(
            None,
            None,
            move |_: &u32| {
                push(&after, "after");
                Ok(())
            },
            ListenOptions::default(),
        )
        .unwrap();

        let err = bus.notify(None, None, 7).unwrap_err();
        match err {
            BusError::Callback(source) => assert_eq!(source.to_string(), "rejected 7"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(log.lock().is_empty());
    }
}

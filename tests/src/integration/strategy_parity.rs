//! # Strategy Parity
//!
//! For any sequence of listen/notify/unlisten/clear/switch operations the
//! identity-tag and linear-scan stores must produce the same observable
//! results: callback invocations, return values and introspection.

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;
    use proptest::prelude::*;
    use std::sync::Arc;
    use subject_bus::{
        BusConfig, EventBus, ListenOptions, StorageStrategy, Subject, UnlistenOptions,
    };

    const KEYS: [&str; 3] = ["", "click", "close"];
    const IDENTITIES: [&str; 3] = ["a", "b", "c"];

    #[derive(Debug, Clone)]
    enum Op {
        Listen {
            subject: usize,
            key: usize,
            identity: Option<usize>,
            once: bool,
            budget: Option<usize>,
            replay: bool,
        },
        Notify {
            subject: usize,
            key: usize,
            value: u32,
        },
        Unlisten {
            subject: usize,
            key: usize,
            identity: usize,
            remove_all: bool,
        },
        Clear {
            subject: Option<usize>,
            key: Option<usize>,
        },
        Switch {
            from: usize,
            to: usize,
        },
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (
                0..5usize,
                0..3usize,
                proptest::option::of(0..3usize),
                any::<bool>(),
                proptest::option::of(0..3usize),
                any::<bool>()
            )
                .prop_map(|(subject, key, identity, once, budget, replay)| Op::Listen {
                    subject,
                    key,
                    identity,
                    once,
                    budget,
                    replay,
                }),
            (0..5usize, 0..3usize, any::<u32>())
                .prop_map(|(subject, key, value)| Op::Notify { subject, key, value }),
            (0..5usize, 0..3usize, 0..3usize, any::<bool>()).prop_map(
                |(subject, key, identity, remove_all)| Op::Unlisten {
                    subject,
                    key,
                    identity,
                    remove_all,
                }
            ),
            (proptest::option::of(0..5usize), proptest::option::of(0..3usize))
                .prop_map(|(subject, key)| Op::Clear { subject, key }),
            (0..5usize, 0..5usize).prop_map(|(from, to)| Op::Switch { from, to }),
        ]
    }

    /// One bus plus the subjects it is driven with.
    struct Harness {
        bus: EventBus<u32>,
        subjects: Vec<Subject>,
        // Object subjects stay alive for the whole run
        _objects: Vec<Arc<u8>>,
        log: Arc<Mutex<Vec<String>>>,
        serial: usize,
    }

    impl Harness {
        fn new(strategy: StorageStrategy) -> Self {
            let objects: Vec<Arc<u8>> = (0..2).map(Arc::new).collect();
            let subjects = vec![
                Subject::Bus,
                Subject::object(&objects[0]),
                Subject::object(&objects[1]),
                Subject::from("menu"),
                Subject::from(7_i64),
            ];
            Self {
                bus: EventBus::with_config(BusConfig::default().with_storage_strategy(strategy))
                    .unwrap(),
                subjects,
                _objects: objects,
                log: Arc::default(),
                serial: 0,
            }
        }

        fn apply(&mut self, op: &Op) -> String {
            match *op {
                Op::Listen {
                    subject,
                    key,
                    identity,
                    once,
                    budget,
                    replay,
                } => {
                    self.serial += 1;
                    let tag = format!("s{}", self.serial);
                    let log = self.log.clone();
                    let mut options = ListenOptions::default().call_if_already_notified(replay);
                    if let Some(i) = identity {
                        options = options.with_identity(IDENTITIES[i]);
                    }
                    if once {
                        options = options.once();
                    }
                    if let Some(b) = budget {
                        options = options.with_call_budget(b);
                    }
                    let result = self.bus.listen(
                        Some(&self.subjects[subject]),
                        Some(KEYS[key]),
                        move |v: &u32| {
                            log.lock().push(format!("{tag}:{v}"));
                            Ok(())
                        },
                        options,
                    );
                    format!("listen {:?}", result.map_err(|e| e.as_label()))
                }
                Op::Notify {
                    subject,
                    key,
                    value,
                } => {
                    let result = self
                        .bus
                        .notify(Some(&self.subjects[subject]), Some(KEYS[key]), value);
                    format!("notify {:?}", result.map_err(|e| e.as_label()))
                }
                Op::Unlisten {
                    subject,
                    key,
                    identity,
                    remove_all,
                } => {
                    let mut options =
                        UnlistenOptions::default().with_identity(IDENTITIES[identity]);
                    if !remove_all {
                        options = options.first_only();
                    }
                    let target = &self.subjects[subject];
                    let result = self.bus.unlisten(Some(target), Some(KEYS[key]), options);
                    format!("unlisten {:?}", result.map_err(|e| e.as_label()))
                }
                Op::Clear { subject, key } => {
                    self.bus.clear(
                        subject.map(|s| &self.subjects[s]),
                        key.map(|k| KEYS[k]),
                    );
                    "clear".to_string()
                }
                Op::Switch { from, to } => {
                    let result = self.bus.switch_on(&self.subjects[from], &self.subjects[to]);
                    format!("switch {:?}", result.map_err(|e| e.as_label()))
                }
            }
        }

        fn observe(&self) -> Vec<(usize, usize, bool, Option<usize>)> {
            let mut view = Vec::new();
            for (s, subject) in self.subjects.iter().enumerate() {
                for key in KEYS {
                    view.push((
                        s,
                        self.bus.subscriber_count(Some(subject), Some(key)),
                        self.bus.is_notified(Some(subject), Some(key)),
                        self.bus.index_of(Some(subject), Some(key), "a"),
                    ));
                }
            }
            view
        }
    }

    proptest! {
        #[test]
        fn test_strategies_agree(ops in proptest::collection::vec(op_strategy(), 1..60)) {
            let mut tagged = Harness::new(StorageStrategy::IdentityTag);
            let mut scan = Harness::new(StorageStrategy::LinearScan);

            for op in &ops {
                let left = tagged.apply(op);
                let right = scan.apply(op);
                prop_assert_eq!(left, right, "diverged on {:?}", op);
            }

            prop_assert_eq!(&*tagged.log.lock(), &*scan.log.lock());
            prop_assert_eq!(tagged.observe(), scan.observe());
            prop_assert_eq!(tagged.bus.subject_count(), scan.bus.subject_count());
        }
    }
}

//! Named port endpoints and their delivery policy (§4.3).
//!
//! A `Port` is a blocking queue, the same `Arc<Inner>` + `Mutex`-guarded
//! shape `vistle-shm`'s `Store` uses for its entry table, plus a
//! [`Condvar`] so [`Port::read`] can suspend the calling thread instead of
//! busy-polling when no object is available yet.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use vistle_core::Object;

use crate::error::ProtocolError;

/// A port's object-reception policy.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PortPolicy {
    /// Accepts objects from exactly one upstream producer.
    Single,
    /// Accepts objects from multiple upstream producers, interleaving them
    /// in arrival order.
    Combine,
    /// Not written to directly; objects reach it only via
    /// [`crate::module::Module::pass_through`].
    PassThrough,
}

/// One item flowing through a port: a published object, or one of the two
/// stream markers a producer emits to delimit its output (§4.3 `read`).
#[derive(Clone, Debug)]
pub enum PortItem {
    Object(Object),
    EndOfStep,
    EndOfExecution,
}

struct Envelope {
    item: PortItem,
    producer: i32,
    sequence: u64,
}

struct PortState {
    queue: Mutex<VecDeque<Envelope>>,
    condvar: Condvar,
    sequence: AtomicU64,
    single_producer: Mutex<Option<i32>>,
}

/// A named endpoint on a module (§4.3). Cheaply cloneable; every clone
/// shares the same backing queue.
#[derive(Clone)]
pub struct Port {
    name: String,
    policy: PortPolicy,
    state: Arc<PortState>,
}

impl Port {
    pub fn new(name: impl Into<String>, policy: PortPolicy) -> Port {
        Port {
            name: name.into(),
            policy,
            state: Arc::new(PortState {
                queue: Mutex::new(VecDeque::new()),
                condvar: Condvar::new(),
                sequence: AtomicU64::new(0),
                single_producer: Mutex::new(None),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> PortPolicy {
        self.policy
    }

    /// Publishes `object`, becoming visible to `read` callers in
    /// publication order (§4.3, §5). `producer` identifies the publishing
    /// module, used both for `Single` policy enforcement and as the
    /// deterministic tiebreaker the concurrency contract asks for on
    /// `Combine` ports (the queue's mutex already totally orders arrivals;
    /// `producer`/sequence are carried on the envelope for that ordering
    /// to be inspectable, not to re-derive it).
    pub fn publish(&self, producer: i32, object: Object) -> Result<(), ProtocolError> {
        self.push(producer, PortItem::Object(object))
    }

    /// Shortcut for republishing an already-immutable input, without
    /// constructing a new object (§4.3 `passThrough`).
    pub fn pass_through(&self, producer: i32, object: Object) -> Result<(), ProtocolError> {
        self.push(producer, PortItem::Object(object))
    }

    /// Signals that `producer` has no more objects for the current
    /// timestep/block grouping.
    pub fn end_of_step(&self, producer: i32) -> Result<(), ProtocolError> {
        self.push(producer, PortItem::EndOfStep)
    }

    /// Signals that `producer` is done publishing entirely.
    pub fn end_of_execution(&self, producer: i32) -> Result<(), ProtocolError> {
        self.push(producer, PortItem::EndOfExecution)
    }

    fn push(&self, producer: i32, item: PortItem) -> Result<(), ProtocolError> {
        if self.policy == PortPolicy::Single {
            let mut claimed = self.state.single_producer.lock().unwrap();
            match *claimed {
                None => *claimed = Some(producer),
                Some(existing) if existing != producer => {
                    return Err(ProtocolError::PortPolicyViolation(format!(
                        "port {:?} is Single but received from producer {producer} after producer {existing}",
                        self.name
                    )));
                }
                _ => {}
            }
        }
        let sequence = self.state.sequence.fetch_add(1, Ordering::Relaxed);
        let mut queue = self.state.queue.lock().unwrap();
        queue.push_back(Envelope { item, producer, sequence });
        self.state.condvar.notify_all();
        trace!("published to port {:?} (producer {producer}, sequence {sequence})", self.name);
        Ok(())
    }

    /// Consumes the next item, blocking the calling thread until one is
    /// available (§4.3, §5 "suspends the calling thread").
    pub fn read(&self) -> PortItem {
        let mut queue = self.state.queue.lock().unwrap();
        loop {
            if let Some(envelope) = queue.pop_front() {
                return envelope.item;
            }
            queue = self.state.condvar.wait(queue).unwrap();
        }
    }

    /// Non-blocking variant of [`Port::read`]: `None` if nothing is queued.
    pub fn try_read(&self) -> Option<PortItem> {
        self.state.queue.lock().unwrap().pop_front().map(|e| e.item)
    }

    /// Number of items currently queued, awaiting a reader.
    pub fn pending(&self) -> usize {
        self.state.queue.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vistle_core::{Metadata, NameGenerator, Object};
    use vistle_core::object::Kind;

    fn placeholder(names: &NameGenerator) -> Object {
        Object::construct(names.next_name(), Metadata::default(), Kind::Placeholder)
    }

    #[test]
    fn read_delivers_in_publish_order() {
        let port = Port::new("data_out", PortPolicy::Combine);
        let names = NameGenerator::new(1);
        let a = placeholder(&names);
        let b = placeholder(&names);
        port.publish(1, a.clone()).unwrap();
        port.publish(1, b.clone()).unwrap();

        match port.read() {
            PortItem::Object(o) => assert_eq!(o.name(), a.name()),
            _ => panic!("expected object"),
        }
        match port.read() {
            PortItem::Object(o) => assert_eq!(o.name(), b.name()),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn single_port_rejects_second_producer() {
        let port = Port::new("data_in", PortPolicy::Single);
        let names = NameGenerator::new(1);
        port.publish(1, placeholder(&names)).unwrap();
        let err = port.publish(2, placeholder(&names)).unwrap_err();
        assert!(matches!(err, ProtocolError::PortPolicyViolation(_)));
    }

    #[test]
    fn end_markers_round_trip() {
        let port = Port::new("data_out", PortPolicy::Combine);
        port.end_of_step(1).unwrap();
        port.end_of_execution(1).unwrap();
        assert!(matches!(port.read(), PortItem::EndOfStep));
        assert!(matches!(port.read(), PortItem::EndOfExecution));
    }

    #[test]
    fn try_read_does_not_block_when_empty() {
        let port = Port::new("data_out", PortPolicy::Combine);
        assert!(port.try_read().is_none());
    }
}

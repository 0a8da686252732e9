//! A module's port table (§4.3): named port creation, publish/read/
//! pass-through, and the per-input-port generation tracking that backs
//! cache-keyed reception.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use vistle_core::Object;

use crate::error::ProtocolError;
use crate::generation::{Admission, GenerationTracker};
use crate::port::{Port, PortItem, PortPolicy};

/// What `Module::read` delivers: an object plus whether admitting it
/// means the caller should evict stale cached derivations from the same
/// creator, or one of the two end-of-stream markers.
#[derive(Clone, Debug)]
pub enum Delivery {
    Object { object: Object, evict_stale: bool },
    EndOfStep,
    EndOfExecution,
}

/// One module's named ports, each with its declared policy, plus the
/// generation tracker every input port needs for cache-keyed reception.
pub struct Module {
    id: i32,
    ports: Mutex<HashMap<String, Port>>,
    trackers: Mutex<HashMap<String, GenerationTracker>>,
    cancel_requested: AtomicBool,
}

impl Module {
    pub fn new(id: i32) -> Module {
        Module {
            id,
            ports: Mutex::new(HashMap::new()),
            trackers: Mutex::new(HashMap::new()),
            cancel_requested: AtomicBool::new(false),
        }
    }

    /// This module's id, used as the `creator` tag on objects it
    /// publishes.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Creates a named port with the given policy. A tracker is allocated
    /// alongside it so input ports are ready for cache-keyed reception
    /// immediately (§4.3 `create_port`).
    pub fn create_port(&self, name: impl Into<String>, policy: PortPolicy) {
        let name = name.into();
        self.ports.lock().unwrap().insert(name.clone(), Port::new(name.clone(), policy));
        self.trackers.lock().unwrap().insert(name, GenerationTracker::new());
        debug!("module {} created port", self.id);
    }

    fn port(&self, name: &str) -> Result<Port, ProtocolError> {
        self.ports.lock().unwrap().get(name).cloned().ok_or_else(|| ProtocolError::UnknownPort(name.to_string()))
    }

    /// Publishes `object` on an output port (§4.3 `publish`).
    pub fn publish(&self, port_name: &str, object: Object) -> Result<(), ProtocolError> {
        self.port(port_name)?.publish(self.id, object)
    }

    /// Republishes an already-immutable input on an output port without
    /// constructing a new object (§4.3 `passThrough`).
    pub fn pass_through(&self, out_port: &str, object: Object) -> Result<(), ProtocolError> {
        self.port(out_port)?.pass_through(self.id, object)
    }

    pub fn end_of_step(&self, port_name: &str) -> Result<(), ProtocolError> {
        self.port(port_name)?.end_of_step(self.id)
    }

    pub fn end_of_execution(&self, port_name: &str) -> Result<(), ProtocolError> {
        self.port(port_name)?.end_of_execution(self.id)
    }

    /// Consumes the next item from an input port, applying the
    /// generation-counter admission policy to objects and silently
    /// skipping ones it rejects as outdated (§4.3 cache-keyed reception).
    /// Blocks when the port is empty.
    pub fn read(&self, port_name: &str) -> Result<Delivery, ProtocolError> {
        let port = self.port(port_name)?;
        loop {
            match port.read() {
                PortItem::EndOfStep => return Ok(Delivery::EndOfStep),
                PortItem::EndOfExecution => return Ok(Delivery::EndOfExecution),
                PortItem::Object(object) => {
                    let metadata = object.metadata();
                    let trackers = self.trackers.lock().unwrap();
                    let tracker = trackers.get(port_name).expect("port created with create_port has a tracker");
                    match tracker.admit(metadata.creator, metadata.generation()) {
                        Ok(Admission::Admit) => return Ok(Delivery::Object { object, evict_stale: false }),
                        Ok(Admission::AdmitAndEvict) => return Ok(Delivery::Object { object, evict_stale: true }),
                        Err(err) => {
                            warn!("module {} dropping object on port {port_name:?}: {err}", self.id);
                            continue;
                        }
                    }
                }
            }
        }
    }

    /// Marks the module's current execution as cancelled (§4.3
    /// cancellation). Advisory: checked at suspension points, never
    /// forcibly interrupts a running `compute`.
    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::Release);
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::Acquire)
    }

    /// Clears the cancellation flag, e.g. at the start of a new
    /// execution.
    pub fn reset_cancel(&self) {
        self.cancel_requested.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vistle_core::{Metadata, NameGenerator};
    use vistle_core::object::Kind;

    fn placeholder(names: &NameGenerator, metadata: Metadata) -> Object {
        Object::construct(names.next_name(), metadata, Kind::Placeholder)
    }

    #[test]
    fn publish_and_read_round_trip() {
        let module = Module::new(1);
        module.create_port("data_out", PortPolicy::Combine);
        let names = NameGenerator::new(1);
        let obj = placeholder(&names, Metadata::default());
        module.publish("data_out", obj.clone()).unwrap();

        match module.read("data_out").unwrap() {
            Delivery::Object { object, evict_stale } => {
                assert_eq!(object.name(), obj.name());
                assert!(!evict_stale);
            }
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn unknown_port_is_reported() {
        let module = Module::new(1);
        assert!(matches!(module.publish("nope", Object::empty(vistle_core::TypeTag::Placeholder, NameGenerator::new(1).next_name())), Err(ProtocolError::UnknownPort(_))));
    }

    #[test]
    fn outdated_generation_is_silently_dropped_then_next_delivered() {
        let module = Module::new(1);
        module.create_port("data_in", PortPolicy::Combine);
        let names = NameGenerator::new(1);

        let newer = placeholder(&names, Metadata { creator: 7, execution_counter: 2, ..Metadata::default() });
        let older = placeholder(&names, Metadata { creator: 7, execution_counter: 1, ..Metadata::default() });
        module.publish("data_in", newer).unwrap();
        module.publish("data_in", older).unwrap();
        module.end_of_execution("data_in").unwrap();

        match module.read("data_in").unwrap() {
            Delivery::Object { evict_stale, .. } => assert!(!evict_stale),
            _ => panic!("expected first object"),
        }
        assert!(matches!(module.read("data_in").unwrap(), Delivery::EndOfExecution));
    }

    #[test]
    fn cancel_flag_round_trips() {
        let module = Module::new(1);
        assert!(!module.cancel_requested());
        module.request_cancel();
        assert!(module.cancel_requested());
        module.reset_cancel();
        assert!(!module.cancel_requested());
    }
}

//! A producer republishing at a higher `execution_counter` must cause the
//! consumer to evict cached state keyed on its prior generation.

use vistle::core::object::Kind;
use vistle::core::{Metadata, NameGenerator, Object};
use vistle::pipeline::{Delivery, Module, PortPolicy};

#[test]
fn republish_at_a_higher_execution_counter_evicts_the_prior_generation() {
    let module = Module::new(1);
    module.create_port("data_in", PortPolicy::Combine);
    let names = NameGenerator::new(17);

    let first = Object::construct(
        names.next_name(),
        Metadata { creator: 17, execution_counter: 5, ..Metadata::default() },
        Kind::Placeholder,
    );
    module.publish("data_in", first.clone()).unwrap();

    match module.read("data_in").unwrap() {
        Delivery::Object { object, evict_stale } => {
            assert_eq!(object.name(), first.name());
            assert!(!evict_stale, "the first object from a creator is never an eviction");
        }
        _ => panic!("expected an object"),
    }

    let second = Object::construct(
        names.next_name(),
        Metadata { creator: 17, execution_counter: 6, ..Metadata::default() },
        Kind::Placeholder,
    );
    module.publish("data_in", second.clone()).unwrap();

    match module.read("data_in").unwrap() {
        Delivery::Object { object, evict_stale } => {
            assert_eq!(object.name(), second.name());
            assert!(evict_stale, "a strictly higher execution_counter must evict the previous generation's cache");
        }
        _ => panic!("expected an object"),
    }
}

#[test]
fn unrelated_creator_does_not_interfere_with_another_creators_eviction() {
    let module = Module::new(1);
    module.create_port("data_in", PortPolicy::Combine);

    let a = Object::construct(
        NameGenerator::new(17).next_name(),
        Metadata { creator: 17, execution_counter: 5, ..Metadata::default() },
        Kind::Placeholder,
    );
    let b = Object::construct(
        NameGenerator::new(22).next_name(),
        Metadata { creator: 22, execution_counter: 1, ..Metadata::default() },
        Kind::Placeholder,
    );
    module.publish("data_in", a).unwrap();
    module.publish("data_in", b).unwrap();

    for _ in 0..2 {
        match module.read("data_in").unwrap() {
            Delivery::Object { evict_stale, .. } => assert!(!evict_stale, "first object from each creator admits without eviction"),
            _ => panic!("expected an object"),
        }
    }
}

//! Processor Model Tests.
//!
//! Exercises the issue/accept/reject cycle and load verification without a cache.

use csim_core::cache::ports::ProcessorPort;
use csim_core::common::{RequestId, SimError};
use csim_core::sim::{TraceProcessor, TraceRecord};
use csim_core::soc::memory::initial_byte;

#[test]
fn rejected_record_is_offered_again() {
    let mut cpu = TraceProcessor::new(vec![TraceRecord::read(0x10, 1)], true);

    let (id, first) = cpu.prepare().unwrap();
    cpu.reject(id);
    let (retry_id, retry) = cpu.prepare().unwrap();

    assert_eq!(id, retry_id);
    assert_eq!(first, retry);
    assert_eq!(cpu.issued(), 0);
    assert_eq!(cpu.in_flight(), 1);
}

#[test]
fn ids_follow_record_order() {
    let records = vec![TraceRecord::read(0x00, 1), TraceRecord::read(0x08, 1)];
    let mut cpu = TraceProcessor::new(records, true);

    let (a, _) = cpu.prepare().unwrap();
    cpu.accept(a);
    let (b, _) = cpu.prepare().unwrap();
    cpu.accept(b);

    assert_eq!((a, b), (RequestId(0), RequestId(1)));
    assert!(cpu.prepare().is_none());
    assert!(!cpu.is_done());

    cpu.send_response(b, Some(&[initial_byte(0x08)]));
    cpu.send_response(a, Some(&[initial_byte(0x00)]));
    assert!(cpu.is_done());
    assert_eq!(cpu.completed(), 2);
    assert!(cpu.take_fault().is_none());
}

/// A load issued after an accepted store expects the stored bytes.
#[test]
fn accepted_store_updates_expectation() {
    let records = vec![
        TraceRecord::write(0x20, vec![0xAB, 0xCD]),
        TraceRecord::read(0x20, 2),
    ];
    let mut cpu = TraceProcessor::new(records, true);

    let (store, _) = cpu.prepare().unwrap();
    cpu.accept(store);
    let (load, _) = cpu.prepare().unwrap();
    cpu.accept(load);

    cpu.send_response(load, Some(&[0xAB, 0xCD]));
    cpu.send_response(store, None);
    assert!(cpu.take_fault().is_none());
    assert!(cpu.is_done());
}

#[test]
fn wrong_load_data_is_a_fault() {
    let mut cpu = TraceProcessor::new(vec![TraceRecord::read(0x30, 1)], true);
    let (id, _) = cpu.prepare().unwrap();
    cpu.accept(id);

    let wrong = initial_byte(0x30).wrapping_add(1);
    cpu.send_response(id, Some(&[wrong]));

    match cpu.take_fault() {
        Some(SimError::DataMismatch {
            id: fault_id,
            address,
            expected,
            actual,
        }) => {
            assert_eq!(fault_id, id);
            assert_eq!(address, 0x30);
            assert_eq!(expected, vec![initial_byte(0x30)]);
            assert_eq!(actual, vec![wrong]);
        }
        other => panic!("expected a data mismatch, got {other:?}"),
    }
    assert!(cpu.take_fault().is_none());
}

#[test]
fn verification_can_be_disabled() {
    let mut cpu = TraceProcessor::new(vec![TraceRecord::read(0x30, 1)], false);
    let (id, _) = cpu.prepare().unwrap();
    cpu.accept(id);
    cpu.send_response(id, Some(&[0]));
    assert!(cpu.take_fault().is_none());
}

#[test]
fn duplicate_completion_is_a_fault() {
    let mut cpu = TraceProcessor::new(vec![TraceRecord::write(0x00, vec![1])], true);
    let (id, _) = cpu.prepare().unwrap();
    cpu.send_response(id, None);
    cpu.accept(id);
    cpu.send_response(id, None);

    assert!(matches!(cpu.take_fault(), Some(SimError::UnexpectedResponse(r)) if r == id));
}

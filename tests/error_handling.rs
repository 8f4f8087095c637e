//! Error handling and edge case tests.

use resource_store::{
    Action, Operation, Phase, RequestStatus, Resource, ResourceDescriptor, ResourceStore, Store,
    StoreConfig, StoreError, StoreFactory,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Person {
    id: u64,
    full_name: String,
}

impl Resource for Person {
    type Id = u64;

    fn id(&self) -> u64 {
        self.id
    }
}

fn test_store() -> Store {
    let store = Store::new(StoreConfig::default());
    store
        .register::<Person>(&ResourceDescriptor::conventional("persons"))
        .unwrap();
    store
}

// --- Descriptor Errors ---

#[test]
fn test_incomplete_descriptor_rejected_at_build() {
    let descriptor = ResourceDescriptor::conventional("persons")
        .without_event(Operation::FetchOne, Phase::Succeeded);

    let result = StoreFactory::build::<Person>(&descriptor);
    match result {
        Err(StoreError::MissingEventName {
            resource,
            operation,
            phase,
        }) => {
            assert_eq!(resource, "persons");
            assert_eq!(operation, Operation::FetchOne);
            assert_eq!(phase, Phase::Succeeded);
        }
        Err(other) => panic!("Expected MissingEventName, got {:?}", other),
        Ok(_) => panic!("Expected MissingEventName, got a reducer"),
    }
}

#[test]
fn test_incomplete_descriptor_rejected_at_register() {
    let store = Store::default();
    let descriptor =
        ResourceDescriptor::conventional("persons").without_event(Operation::List, Phase::Failed);

    let result = store.register::<Person>(&descriptor);
    assert!(matches!(result, Err(StoreError::MissingEventName { .. })));
    assert!(!store.is_registered("persons"));
}

#[test]
fn test_standalone_store_rejects_duplicate_names() {
    let descriptor = ResourceDescriptor::conventional("persons").with_reset("PERSONS_SET");
    let result = ResourceStore::<Person>::new(&descriptor);
    assert!(matches!(result, Err(StoreError::DuplicateEventName { .. })));
}

// --- Registration Errors ---

#[test]
fn test_register_duplicate_resource() {
    let store = test_store();
    let result = store.register::<Person>(&ResourceDescriptor::conventional("persons"));
    assert!(matches!(result, Err(StoreError::ResourceExists(_))));
}

#[test]
fn test_register_conflicting_event_name() {
    let store = test_store();

    let descriptor = ResourceDescriptor::conventional("authors").with_event(
        Operation::List,
        Phase::Requested,
        "PERSONS_LIST_REQUESTED",
    );
    let result = store.register::<Person>(&descriptor);

    match result {
        Err(StoreError::EventNameConflict { event, resource }) => {
            assert_eq!(event, "PERSONS_LIST_REQUESTED");
            assert_eq!(resource, "persons");
        }
        Err(other) => panic!("Expected EventNameConflict, got {:?}", other),
        Ok(_) => panic!("Expected EventNameConflict"),
    }

    // The failed registration leaves no routes behind.
    assert!(!store.is_registered("authors"));
    assert_eq!(store.resource_names(), vec!["persons".to_string()]);
}

#[test]
fn test_snapshot_of_unregistered_resource() {
    let store = test_store();
    assert!(matches!(
        store.snapshot_json("sections"),
        Err(StoreError::ResourceNotRegistered(_))
    ));
}

// --- Dispatch Errors ---

#[test]
fn test_reject_unrouted_config() {
    let store = Store::new(StoreConfig {
        reject_unrouted: true,
        ..Default::default()
    });

    let result = store.dispatch(&Action::new("SECTIONS_LIST_REQUESTED"));
    assert!(matches!(result, Err(StoreError::UnroutedEvent(_))));
}

#[test]
fn test_missing_payload_leaves_state() {
    let store = test_store();
    let persons = store.resource::<Person>("persons").unwrap();
    store
        .dispatch(&Action::new("PERSONS_LIST_REQUESTED"))
        .unwrap();
    let before = persons.state();

    let result = store.dispatch(&Action::new("PERSONS_LIST_SUCCEEDED"));
    assert!(matches!(result, Err(StoreError::InvalidPayload { .. })));

    let after = persons.state();
    assert!(std::sync::Arc::ptr_eq(&before, &after));
    assert_eq!(after.list.status(), RequestStatus::Pending);
}

#[test]
fn test_malformed_payload_rejected() {
    let store = test_store();

    let result = store.dispatch(&Action::with_payload(
        "PERSONS_CREATE_SUCCEEDED",
        json!({"id": "seven", "full_name": "Ann"}),
    ));
    match result {
        Err(StoreError::InvalidPayload { event, reason }) => {
            assert_eq!(event, "PERSONS_CREATE_SUCCEEDED");
            assert!(!reason.is_empty());
        }
        other => panic!("Expected InvalidPayload, got {:?}", other),
    }

    let result = store.dispatch(&Action::with_payload("PERSONS_LIST_SUCCEEDED", json!("nope")));
    assert!(matches!(result, Err(StoreError::InvalidPayload { .. })));
}

#[test]
fn test_failed_without_payload_stores_null_error() {
    let store = test_store();
    let persons = store.resource::<Person>("persons").unwrap();

    store.dispatch(&Action::new("PERSONS_UPDATE_FAILED")).unwrap();
    let single = persons.single();
    assert_eq!(single.status(), RequestStatus::Failed);
    assert_eq!(single.error().map(|e| e.0.clone()), Some(json!(null)));
}

// --- Edge Cases ---

#[test]
fn test_delete_of_focused_record_from_other_view() {
    let store = test_store();
    let persons = store.resource::<Person>("persons").unwrap();

    store
        .dispatch(&Action::with_payload(
            "PERSONS_FETCH_ONE_SUCCEEDED",
            json!({"id": 1, "full_name": "Ann"}),
        ))
        .unwrap();
    store
        .dispatch(&Action::with_payload("PERSONS_DELETE_SUCCEEDED", json!({"id": 1})))
        .unwrap();

    assert!(persons.single().record().is_none());
    assert_eq!(persons.single().status(), RequestStatus::Succeeded);
    // Nothing was in the list, so it stays as it was.
    assert_eq!(persons.list().status(), RequestStatus::Idle);
}

#[test]
fn test_racing_requests_last_status_wins() {
    let store = test_store();
    let persons = store.resource::<Person>("persons").unwrap();

    store
        .dispatch(&Action::with_payload(
            "PERSONS_LIST_SUCCEEDED",
            json!([{"id": 1, "full_name": "Ann"}]),
        ))
        .unwrap();
    store.dispatch(&Action::new("PERSONS_DELETE_REQUESTED")).unwrap();
    store.dispatch(&Action::new("PERSONS_CREATE_REQUESTED")).unwrap();
    store
        .dispatch(&Action::with_payload("PERSONS_DELETE_FAILED", json!({"message": "locked"})))
        .unwrap();

    // The create is still in flight but the delete failure was applied last.
    assert!(persons.list().status().is_failed());

    store
        .dispatch(&Action::with_payload(
            "PERSONS_CREATE_SUCCEEDED",
            json!({"id": 2, "full_name": "Bo"}),
        ))
        .unwrap();
    let list = persons.list();
    assert_eq!(list.status(), RequestStatus::Succeeded);
    assert!(list.error().is_none());
    assert_eq!(list.ids(), &[1, 2]);
}

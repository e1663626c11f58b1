use super::*;
use crate::identity::persistence::{MemoryAdapter, StorageError};

fn fresh() -> (Arc<MemoryAdapter>, SessionStore) {
    let mem = Arc::new(MemoryAdapter::new());
    let store = SessionStore::new(mem.clone());
    (mem, store)
}

/// Adapter whose writes always fail, reads come from a fixed map.
struct ReadOnlyAdapter(MemoryAdapter);

impl PersistenceAdapter for ReadOnlyAdapter {
    fn get(&self, key: &str) -> Option<String> { self.0.get(key) }
    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only")))
    }
    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only")))
    }
}

/// Adapter that refuses writes to the session key only.
struct SessionWriteFails(Arc<MemoryAdapter>);

impl PersistenceAdapter for SessionWriteFails {
    fn get(&self, key: &str) -> Option<String> { self.0.get(key) }
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key == SESSION_KEY {
            return Err(StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")));
        }
        self.0.set(key, value)
    }
    fn remove(&self, key: &str) -> Result<(), StorageError> { self.0.remove(key) }
}

#[test]
fn sign_up_makes_admin_current_and_persists() {
    let (mem, store) = fresh();
    let id = store.sign_up("e@x.com", "p", Some("Acme")).unwrap();
    assert_eq!(id.role, Role::Admin);
    assert_eq!(id.company.as_deref(), Some("Acme"));
    let cur = store.current_identity().unwrap();
    assert_eq!(cur.email, "e@x.com");
    assert_eq!(cur.role, Role::Admin);
    assert!(mem.get(SESSION_KEY).is_some());
    assert!(mem.get(&directory_key("e@x.com")).is_some());
}

#[test]
fn sign_out_then_sign_in_yields_same_email() {
    let (_mem, store) = fresh();
    store.sign_up("e@x.com", "p", Some("Acme")).unwrap();
    store.sign_out().unwrap();
    assert!(store.current_identity().is_none());
    let id = store.sign_in("e@x.com", "anything").unwrap();
    assert_eq!(id.email, "e@x.com");
    assert_eq!(store.current_identity().unwrap().email, "e@x.com");
}

#[test]
fn unknown_sign_in_leaves_state_untouched() {
    let (mem, store) = fresh();
    let err = store.sign_in("nobody@x.com", "x").unwrap_err();
    assert!(matches!(err, AuthError::UnknownIdentity { ref email } if email == "nobody@x.com"));
    assert!(store.current_identity().is_none());
    assert!(mem.is_empty());
}

#[test]
fn unknown_sign_in_keeps_existing_session() {
    let (_mem, store) = fresh();
    store.sign_up("e@x.com", "p", None).unwrap();
    assert!(store.sign_in("other@x.com", "p").is_err());
    assert_eq!(store.current_identity().unwrap().email, "e@x.com");
}

#[test]
fn empty_email_is_rejected() {
    let (mem, store) = fresh();
    assert!(matches!(store.sign_up("  ", "p", None), Err(AuthError::InvalidEmail)));
    assert!(matches!(store.sign_in("", "p"), Err(AuthError::InvalidEmail)));
    assert!(mem.is_empty());
}

#[test]
fn blank_company_is_dropped() {
    let (_mem, store) = fresh();
    let id = store.sign_up("e@x.com", "p", Some("  ")).unwrap();
    assert!(id.company.is_none());
}

#[test]
fn sign_up_again_overwrites_directory_record() {
    let (_mem, store) = fresh();
    store.sign_up("e@x.com", "p", Some("Old")).unwrap();
    store.sign_up("e@x.com", "p", Some("New")).unwrap();
    store.sign_out().unwrap();
    let id = store.sign_in("e@x.com", "p").unwrap();
    assert_eq!(id.company.as_deref(), Some("New"));
}

#[test]
fn sign_out_twice_is_ok() {
    let (mem, store) = fresh();
    store.sign_up("e@x.com", "p", None).unwrap();
    store.sign_out().unwrap();
    store.sign_out().unwrap();
    assert!(store.current_identity().is_none());
    assert!(mem.get(SESSION_KEY).is_none());
}

#[test]
fn restore_reads_well_formed_record() {
    let mem = Arc::new(MemoryAdapter::with_entries([(SESSION_KEY, r#"{"email":"a@b.com","role":"manager"}"#)]));
    let store = SessionStore::new(mem);
    let id = store.restore_on_startup().unwrap();
    assert_eq!(id.role, Role::Manager);
    assert_eq!(store.current_identity().unwrap().role, Role::Manager);
}

#[test]
fn restore_tolerates_garbage() {
    for raw in ["{not json", "42", r#"{"email":"a@b.com","role":"owner"}"#, r#"{"email":"","role":"admin"}"#, r#"{"role":"admin"}"#] {
        let mem = Arc::new(MemoryAdapter::with_entries([(SESSION_KEY, raw)]));
        let store = SessionStore::new(mem);
        assert!(store.restore_on_startup().is_none(), "raw={}", raw);
        assert!(store.current_identity().is_none());
    }
}

#[test]
fn restore_without_record_is_empty() {
    let (_mem, store) = fresh();
    assert!(store.restore_on_startup().is_none());
}

#[test]
fn current_identity_does_not_reread_storage() {
    let (mem, store) = fresh();
    mem.set(SESSION_KEY, r#"{"email":"a@b.com","role":"manager"}"#).unwrap();
    assert!(store.current_identity().is_none());
}

#[test]
fn teardown_keeps_persisted_session() {
    let (_mem, store) = fresh();
    store.sign_up("e@x.com", "p", None).unwrap();
    store.teardown();
    assert!(store.current_identity().is_none());
    assert_eq!(store.restore_on_startup().unwrap().email, "e@x.com");
}

#[test]
fn failed_write_leaves_session_unchanged() {
    let inner = MemoryAdapter::with_entries([(directory_key("m@x.com"), r#"{"email":"m@x.com","role":"manager"}"#)]);
    let store = SessionStore::new(Arc::new(ReadOnlyAdapter(inner)));
    assert!(matches!(store.sign_up("e@x.com", "p", None), Err(AuthError::Storage(_))));
    assert!(store.current_identity().is_none());
    assert!(matches!(store.sign_in("m@x.com", "p"), Err(AuthError::Storage(_))));
    assert!(store.current_identity().is_none());
}

#[test]
fn failed_remove_keeps_identity() {
    let inner = MemoryAdapter::with_entries([(SESSION_KEY, r#"{"email":"m@x.com","role":"manager"}"#)]);
    let store = SessionStore::new(Arc::new(ReadOnlyAdapter(inner)));
    store.restore_on_startup().unwrap();
    assert!(store.sign_out().is_err());
    assert_eq!(store.current_identity().unwrap().email, "m@x.com");
}

#[test]
fn legacy_session_record_allows_sign_in() {
    let mem = Arc::new(MemoryAdapter::with_entries([(SESSION_KEY, r#"{"email":"old@x.com","role":"Admin","company":"Acme"}"#)]));
    let store = SessionStore::new(mem);
    let id = store.sign_in("old@x.com", "p").unwrap();
    assert_eq!(id.role, Role::Admin);
}

#[test]
fn seed_directory_adds_only_missing() {
    let (_mem, store) = fresh();
    store.sign_up("admin@example.com", "p", Some("Acme")).unwrap();
    let added = store.seed_directory(&Identity::demo_roster()).unwrap();
    assert_eq!(added, 2);
    assert_eq!(store.seed_directory(&Identity::demo_roster()).unwrap(), 0);
    store.sign_out().unwrap();
    assert_eq!(store.sign_in("manager@example.com", "").unwrap().role, Role::Manager);
    assert_eq!(store.sign_in("admin@example.com", "").unwrap().company.as_deref(), Some("Acme"));
}

#[test]
fn failed_sign_up_leaves_no_directory_record() {
    let mem = Arc::new(MemoryAdapter::new());
    let store = SessionStore::new(Arc::new(SessionWriteFails(mem.clone())));
    assert!(matches!(store.sign_up("ghost@x.com", "p", None), Err(AuthError::Storage(_))));
    assert!(mem.get(&directory_key("ghost@x.com")).is_none());
    assert!(store.current_identity().is_none());
    assert!(matches!(store.sign_in("ghost@x.com", "p"), Err(AuthError::UnknownIdentity { .. })));
}

#[test]
fn failed_sign_up_restores_previous_directory_record() {
    let before = r#"{"email":"e@x.com","role":"admin","company":"Old"}"#;
    let mem = Arc::new(MemoryAdapter::with_entries([(directory_key("e@x.com"), before)]));
    let store = SessionStore::new(Arc::new(SessionWriteFails(mem.clone())));
    assert!(store.sign_up("e@x.com", "p", Some("New")).is_err());
    assert_eq!(mem.get(&directory_key("e@x.com")).as_deref(), Some(before));
}

#[test]
fn surrounding_whitespace_in_email_is_ignored() {
    let (mem, store) = fresh();
    let id = store.sign_up("  e@x.com ", "p", None).unwrap();
    assert_eq!(id.email, "e@x.com");
    assert!(mem.get(&directory_key("e@x.com")).is_some());
    store.sign_out().unwrap();
    assert_eq!(store.sign_in("\te@x.com  ", "p").unwrap().email, "e@x.com");
    store.sign_out().unwrap();
    assert!(matches!(store.sign_in("E@x.com", "p"), Err(AuthError::UnknownIdentity { .. })));
}

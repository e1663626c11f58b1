//! Session store against the on-disk adapter: sign-up/sign-in/sign-out
//! survive process restarts, and bad local state never blocks startup.

use std::sync::Arc;

use anyhow::Result;
use tempfile::tempdir;

use expensedesk::identity::{
    can_access, AuthError, FileAdapter, Identity, PersistenceAdapter, Role, Route, SessionStore, SESSION_KEY,
};

fn open_store(path: &std::path::Path) -> SessionStore {
    SessionStore::new(Arc::new(FileAdapter::open(path)))
}

#[test]
fn session_survives_restart() -> Result<()> {
    let tmp = tempdir()?;
    let path = tmp.path().join("state.json");
    {
        let store = open_store(&path);
        store.sign_up("e@x.com", "p", Some("Acme"))?;
    }
    let store = open_store(&path);
    assert!(store.current_identity().is_none(), "nothing is current before restore");
    let id = store.restore_on_startup().expect("restored");
    assert_eq!(id, Identity::new("e@x.com", Role::Admin).with_company("Acme"));
    Ok(())
}

#[test]
fn sign_out_persists_across_restart_but_directory_remains() -> Result<()> {
    let tmp = tempdir()?;
    let path = tmp.path().join("state.json");
    {
        let store = open_store(&path);
        store.sign_up("e@x.com", "p", None)?;
        store.sign_out()?;
        store.sign_out()?;
    }
    let store = open_store(&path);
    assert!(store.restore_on_startup().is_none());
    let id = store.sign_in("e@x.com", "p")?;
    assert_eq!(id.email, "e@x.com");
    assert_eq!(id.role, Role::Admin);
    Ok(())
}

#[test]
fn restore_manager_record_written_by_hand() -> Result<()> {
    let tmp = tempdir()?;
    let path = tmp.path().join("state.json");
    std::fs::write(&path, serde_json::to_vec(&serde_json::json!({ SESSION_KEY: r#"{"email":"a@b.com","role":"manager"}"# }))?)?;
    let store = open_store(&path);
    let id = store.restore_on_startup().expect("restored");
    assert_eq!(id.role, Role::Manager);
    assert!(can_access(Some(&id), Route::Approvals));
    assert!(!can_access(Some(&id), Route::SubmitExpense));
    Ok(())
}

#[test]
fn malformed_session_record_yields_no_session() -> Result<()> {
    let tmp = tempdir()?;
    let path = tmp.path().join("state.json");
    std::fs::write(&path, serde_json::to_vec(&serde_json::json!({ SESSION_KEY: "{{{ definitely not json" }))?)?;
    let store = open_store(&path);
    assert!(store.restore_on_startup().is_none());
    assert!(store.current_identity().is_none());
    // the store keeps working after a discarded record
    store.sign_up("n@x.com", "p", None)?;
    assert_eq!(store.current_identity().map(|i| i.email), Some("n@x.com".to_string()));
    Ok(())
}

#[test]
fn corrupt_state_file_yields_no_session() -> Result<()> {
    let tmp = tempdir()?;
    let path = tmp.path().join("state.json");
    std::fs::write(&path, b"\x00\x01garbage")?;
    let store = open_store(&path);
    assert!(store.restore_on_startup().is_none());
    Ok(())
}

#[test]
fn unknown_sign_in_does_not_touch_the_file() -> Result<()> {
    let tmp = tempdir()?;
    let path = tmp.path().join("state.json");
    let store = open_store(&path);
    let err = store.sign_in("nobody@x.com", "x").unwrap_err();
    assert!(matches!(err, AuthError::UnknownIdentity { .. }));
    assert_eq!(err.to_string(), "unknown user: nobody@x.com");
    assert!(!path.exists());
    Ok(())
}

#[test]
fn session_record_has_documented_shape() -> Result<()> {
    let tmp = tempdir()?;
    let path = tmp.path().join("state.json");
    let store = open_store(&path);
    store.sign_up("e@x.com", "p", Some("Acme"))?;
    let adapter = FileAdapter::open(&path);
    let raw = adapter.get(SESSION_KEY).expect("session record");
    let v: serde_json::Value = serde_json::from_str(&raw)?;
    assert_eq!(v, serde_json::json!({"email": "e@x.com", "role": "admin", "company": "Acme"}));
    Ok(())
}

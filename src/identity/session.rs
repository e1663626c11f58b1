use std::sync::Arc;

use parking_lot::RwLock;

use super::error::AuthError;
use super::persistence::PersistenceAdapter;
use super::principal::{Identity, Role};

/// Key of the current session record.
pub const SESSION_KEY: &str = "user";
/// Prefix of per-email directory records consulted by sign-in.
pub const DIRECTORY_PREFIX: &str = "identity:";

pub fn directory_key(email: &str) -> String { format!("{}{}", DIRECTORY_PREFIX, email) }

/// Decode a persisted record. Anything that is not a well-formed identity
/// with a non-empty email is malformed.
pub fn decode_record(raw: &str) -> Result<Identity, AuthError> {
    let id: Identity = serde_json::from_str(raw)
        .map_err(|e| AuthError::MalformedPersistedRecord(e.to_string()))?;
    if id.email.trim().is_empty() {
        return Err(AuthError::MalformedPersistedRecord("empty email".into()));
    }
    Ok(id)
}

fn encode_record(id: &Identity) -> Result<String, AuthError> {
    serde_json::to_string(id).map_err(|e| AuthError::Storage(e.into()))
}

fn require_email(email: &str) -> Result<&str, AuthError> {
    let e = email.trim();
    if e.is_empty() { return Err(AuthError::InvalidEmail); }
    Ok(e)
}

/// Single authority for the current identity.
///
/// Every transition writes persistence first and only then swaps the
/// in-memory slot, so a failed write leaves the session as it was. The slot's
/// write lock is held for the whole transition, which serializes mutations.
pub struct SessionStore {
    adapter: Arc<dyn PersistenceAdapter>,
    current: RwLock<Option<Identity>>,
}

impl SessionStore {
    pub fn new(adapter: Arc<dyn PersistenceAdapter>) -> Self {
        Self { adapter, current: RwLock::new(None) }
    }

    /// Register a new admin identity and make it current. Re-registering an
    /// existing email overwrites its directory record.
    pub fn sign_up(&self, email: &str, _password: &str, company: Option<&str>) -> Result<Identity, AuthError> {
        let email = require_email(email)?;
        let mut slot = self.current.write();
        let mut id = Identity::new(email, Role::Admin);
        if let Some(c) = company.map(str::trim).filter(|c| !c.is_empty()) {
            id = id.with_company(c);
        }
        let raw = encode_record(&id)?;
        let dir_key = directory_key(email);
        let prior = self.adapter.get(&dir_key);
        self.adapter.set(&dir_key, &raw)?;
        if let Err(e) = self.adapter.set(SESSION_KEY, &raw) {
            // undo the directory write so a failed sign-up leaves no identity behind
            let undo = match prior.as_deref() {
                Some(old) => self.adapter.set(&dir_key, old),
                None => self.adapter.remove(&dir_key),
            };
            if let Err(u) = undo {
                tracing::warn!(target: "expensedesk::session", "session.sign_up rollback failed email={}: {}", email, u);
            }
            return Err(e.into());
        }
        *slot = Some(id.clone());
        tracing::info!(target: "expensedesk::session", "session.sign_up email={} company={:?}", id.email, id.company);
        Ok(id)
    }

    /// Look up a known identity by its trimmed email and make it current.
    /// The password is not verified.
    pub fn sign_in(&self, email: &str, _password: &str) -> Result<Identity, AuthError> {
        let email = require_email(email)?;
        let mut slot = self.current.write();
        let Some(id) = self.lookup(email) else {
            tracing::info!(target: "expensedesk::session", "session.sign_in rejected email={}", email);
            return Err(AuthError::UnknownIdentity { email: email.to_string() });
        };
        self.adapter.set(SESSION_KEY, &encode_record(&id)?)?;
        *slot = Some(id.clone());
        tracing::info!(target: "expensedesk::session", "session.sign_in email={} role={}", id.email, id.role);
        Ok(id)
    }

    /// Clear the session record and the current identity. A no-op success
    /// when nobody is signed in.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        let mut slot = self.current.write();
        self.adapter.remove(SESSION_KEY)?;
        if let Some(prev) = slot.take() {
            tracing::info!(target: "expensedesk::session", "session.sign_out email={}", prev.email);
        }
        Ok(())
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.current.read().clone()
    }

    /// Rehydrate the session from persistence. Malformed records are logged
    /// and yield no session.
    pub fn restore_on_startup(&self) -> Option<Identity> {
        let mut slot = self.current.write();
        let restored = match self.adapter.get(SESSION_KEY) {
            None => None,
            Some(raw) => match decode_record(&raw) {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::warn!(target: "expensedesk::session", "session.restore discarded record: {}", e);
                    None
                }
            },
        };
        if let Some(id) = restored.as_ref() {
            tracing::info!(target: "expensedesk::session", "session.restore email={} role={}", id.email, id.role);
        }
        *slot = restored.clone();
        restored
    }

    /// Drop the in-memory snapshot; persisted records are kept.
    pub fn teardown(&self) {
        self.current.write().take();
        tracing::debug!(target: "expensedesk::session", "session.teardown");
    }

    /// Write directory records for identities that are not yet known.
    /// Returns how many were added.
    pub fn seed_directory(&self, identities: &[Identity]) -> Result<usize, AuthError> {
        let _slot = self.current.write();
        let mut added = 0usize;
        for id in identities {
            let key = directory_key(&id.email);
            if self.adapter.get(&key).and_then(|raw| decode_record(&raw).ok()).is_some() { continue; }
            self.adapter.set(&key, &encode_record(id)?)?;
            added += 1;
        }
        tracing::debug!(target: "expensedesk::session", "session.seed_directory added={}", added);
        Ok(added)
    }

    fn lookup(&self, email: &str) -> Option<Identity> {
        if let Some(raw) = self.adapter.get(&directory_key(email)) {
            match decode_record(&raw) {
                Ok(id) if id.email == email => return Some(id),
                Ok(_) => {}
                Err(e) => tracing::warn!(target: "expensedesk::session", "directory record for {} ignored: {}", email, e),
            }
        }
        // Records written before the directory existed only live under the session key.
        self.adapter
            .get(SESSION_KEY)
            .and_then(|raw| decode_record(&raw).ok())
            .filter(|id| id.email == email)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;

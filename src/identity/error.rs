use thiserror::Error;

use super::persistence::StorageError;

/// Failures of the session store. All are recoverable.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Sign-in lookup found no identity for the email.
    #[error("unknown user: {email}")]
    UnknownIdentity { email: String },

    /// A persisted record could not be decoded into an identity.
    #[error("malformed persisted record: {0}")]
    MalformedPersistedRecord(String),

    #[error("email must not be empty")]
    InvalidEmail,

    /// The persistence adapter refused a write; in-memory state is unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::UnknownIdentity { .. } => "unknown_identity",
            AuthError::MalformedPersistedRecord(_) => "malformed_record",
            AuthError::InvalidEmail => "invalid_email",
            AuthError::Storage(_) => "storage_failed",
        }
    }
}

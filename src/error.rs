//! Unified application error model.
//! Domain errors (session, expenses) are mapped into one serde-tagged enum so
//! the shell can report every failure with a stable code and message.

use serde::Serialize;
use std::fmt::{Display, Formatter};

use crate::expenses::ExpenseError;
use crate::identity::AuthError;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    UserInput { code: String, message: String },
    NotFound { code: String, message: String },
    Conflict { code: String, message: String },
    Auth { code: String, message: String },
    Forbidden { code: String, message: String },
    Io { code: String, message: String },
    Internal { code: String, message: String },
}

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::UserInput { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::Auth { code, .. }
            | AppError::Forbidden { code, .. }
            | AppError::Io { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::UserInput { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Conflict { message, .. }
            | AppError::Auth { message, .. }
            | AppError::Forbidden { message, .. }
            | AppError::Io { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { AppError::UserInput { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { AppError::NotFound { code: code.into(), message: msg.into() } }
    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { AppError::Auth { code: code.into(), message: msg.into() } }
    pub fn forbidden<S: Into<String>>(code: S, msg: S) -> Self { AppError::Forbidden { code: code.into(), message: msg.into() } }

    /// Status class of the failure, numbered like HTTP statuses.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::UserInput { .. } => 400,
            AppError::NotFound { .. } => 404,
            AppError::Conflict { .. } => 409,
            AppError::Auth { .. } => 401,
            AppError::Forbidden { .. } => 403,
            AppError::Io { .. } => 503,
            AppError::Internal { .. } => 500,
        }
    }

    /// One-line form printed by the shell.
    pub fn report(&self) -> String {
        format!("error {} {}", self.http_status(), self)
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let code = err.code().to_string();
        let message = err.to_string();
        match err {
            AuthError::UnknownIdentity { .. } => AppError::Auth { code, message },
            AuthError::InvalidEmail => AppError::UserInput { code, message },
            AuthError::MalformedPersistedRecord(_) => AppError::Internal { code, message },
            AuthError::Storage(_) => AppError::Io { code, message },
        }
    }
}

impl From<ExpenseError> for AppError {
    fn from(err: ExpenseError) -> Self {
        let message = err.to_string();
        match err {
            ExpenseError::InvalidDraft(_) => AppError::UserInput { code: "invalid_expense".into(), message },
            ExpenseError::NotFound(_) => AppError::NotFound { code: "not_found".into(), message },
            ExpenseError::AlreadyDecided { .. } => AppError::Conflict { code: "already_decided".into(), message },
        }
    }
}

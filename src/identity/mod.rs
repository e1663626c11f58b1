//! Session and authorization state: who is signed in, how that survives a
//! restart, and which views they may open.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod session;
mod error;
mod authorizer;
mod gate;
pub mod persistence;

pub use principal::{Identity, Role};
pub use session::{SessionStore, SESSION_KEY, DIRECTORY_PREFIX, directory_key, decode_record};
pub use error::AuthError;
pub use persistence::{PersistenceAdapter, MemoryAdapter, FileAdapter, StorageError};
pub use authorizer::{Route, can_access, permitted_routes, home_for};
pub use gate::{Navigation, resolve, resolve_route, fallback_for};

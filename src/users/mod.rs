use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::user::{UserRecord, UserRole};

pub struct NewUser {
    pub public_id: String,
    pub name: String,
    pub role: UserRole,
    pub password: String,
}

/// Credential storage for riders and drivers. Kept behind a trait: the core
/// only needs identity resolution, not any particular account backend.
pub trait UserStore: Send + Sync {
    fn register(&self, new: NewUser) -> Result<UserRecord, AppError>;

    /// Resolves a public identifier plus credential to a user id.
    fn verify(&self, identifier: &str, password: &str) -> Result<Uuid, AppError>;

    fn find_by_public_id(&self, public_id: &str) -> Option<UserRecord>;
}

/// In-memory store keyed by public id.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: DashMap<String, UserRecord>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn register(&self, new: NewUser) -> Result<UserRecord, AppError> {
        if new.public_id.trim().is_empty() {
            return Err(AppError::BadRequest("public_id cannot be empty".to_string()));
        }
        if new.password.is_empty() {
            return Err(AppError::BadRequest("password cannot be empty".to_string()));
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            public_id: new.public_id.clone(),
            name: new.name,
            role: new.role,
            password: new.password,
        };

        match self.users.entry(new.public_id) {
            Entry::Occupied(entry) => Err(AppError::Conflict(format!(
                "user {} already registered",
                entry.key()
            ))),
            Entry::Vacant(entry) => {
                entry.insert(record.clone());
                Ok(record)
            }
        }
    }

    fn verify(&self, identifier: &str, password: &str) -> Result<Uuid, AppError> {
        let user = self
            .users
            .get(identifier)
            .ok_or(AppError::Unauthorized)?;

        if user.password == password {
            Ok(user.id)
        } else {
            Err(AppError::Unauthorized)
        }
    }

    fn find_by_public_id(&self, public_id: &str) -> Option<UserRecord> {
        self.users.get(public_id).map(|entry| entry.clone())
    }
}

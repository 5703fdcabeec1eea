use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Rider,
    Driver,
}

/// A registered rider or driver. The stored credential never leaves the user
/// store; API responses expose [`UserProfile`] instead.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub public_id: String,
    pub name: String,
    pub role: UserRole,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub public_id: String,
    pub name: String,
    pub role: UserRole,
}

impl From<&UserRecord> for UserProfile {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            public_id: user.public_id.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

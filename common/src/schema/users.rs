use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Staff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    pub status: UserStatus,
    pub campus: String,
    /// UPI ID payments are sent from.
    pub vpa: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

/// The signed-in user, handed explicitly to whatever needs it.
///
/// There is no authentication behind it: the portal runs as a single
/// configured user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user: User,
}

impl Session {
    /// Opens a session for `user`, stamping the login time.
    pub fn open(mut user: User) -> Self {
        user.last_login = Some(Utc::now());
        Session { user }
    }

    pub fn vpa(&self) -> &str {
        &self.user.vpa
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }
}

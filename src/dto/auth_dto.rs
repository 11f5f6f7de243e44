use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{Role, User};

// Login request; presence is checked by the controller
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub data: UserProfile,
}

impl LoginResponse {
    pub fn new(token: String, user: User) -> Self {
        Self {
            success: true,
            token,
            data: user.into(),
        }
    }
}

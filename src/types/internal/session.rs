use crate::types::db::{Role, User};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

/// The authenticated identity carried by a session cookie.
#[derive(Object, Serialize, Deserialize, Debug, Clone)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            department: user.department.clone(),
        }
    }
}

/// Signed token claims. A token whose role string falls outside the closed
/// `Role` enumeration fails deserialization and therefore never becomes a
/// session.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    /// Subject (user id).
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: String,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            role: claims.role,
            department: claims.department,
        }
    }
}

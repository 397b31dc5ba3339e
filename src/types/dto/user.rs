use crate::types::db::{Role, User, UserStatus};
use poem_openapi::payload::Json;
use poem_openapi::{ApiResponse, Object};

use super::common::MessageResponse;

/// A user as returned to clients. Identical to the persisted record minus
/// the password hash, which must never appear in any response.
#[derive(Object, Debug, Clone)]
#[oai(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub department: String,
    pub status: UserStatus,
    pub avatar: Option<String>,
    pub join_date: String,
    pub last_login: Option<String>,
    pub projects_count: u32,
    pub assigned_projects: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            department: user.department,
            status: user.status,
            avatar: user.avatar,
            join_date: user.join_date,
            last_login: user.last_login,
            projects_count: user.projects_count,
            assigned_projects: user.assigned_projects,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Request model for user creation.
#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub department: String,
    pub status: Option<UserStatus>,
    pub assigned_projects: Option<Vec<String>>,
}

/// Merge-patch request for user updates. Only fields present in the body are
/// applied; `assigned_projects` additionally triggers the mirror sync.
/// Absent and null fields are equivalent, so `avatar` can be replaced but
/// not cleared.
#[derive(Object, Debug, Default)]
#[oai(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub department: Option<String>,
    pub status: Option<UserStatus>,
    pub avatar: Option<String>,
    pub assigned_projects: Option<Vec<String>>,
}

#[derive(Object, Debug)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
}

#[derive(Object, Debug)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

#[derive(Object, Debug)]
pub struct UserMessageResponse {
    pub message: String,
    pub user: UserResponse,
}

/// 201 response for user creation.
#[derive(ApiResponse)]
pub enum CreatedUserResponse {
    /// User created
    #[oai(status = 201)]
    Created(Json<UserMessageResponse>),
}

/// 200 response for user deletion.
#[derive(ApiResponse)]
pub enum DeletedUserResponse {
    /// User deleted
    #[oai(status = 200)]
    Deleted(Json<MessageResponse>),
}

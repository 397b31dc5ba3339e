use crate::api::require_session;
use crate::errors::ApiError;
use crate::services::{SessionService, UserService};
use crate::types::db::Role;
use crate::types::dto::common::MessageResponse;
use crate::types::dto::user::{
    CreateUserRequest, CreatedUserResponse, DeletedUserResponse, UpdateUserRequest, UserEnvelope,
    UserMessageResponse, UserResponse, UsersResponse,
};
use poem::web::cookie::CookieJar;
use poem_openapi::param::Path;
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

/// User management endpoints. Every response strips the password hash by
/// construction, going through `UserResponse`.
pub struct UsersApi {
    users: Arc<UserService>,
    sessions: Arc<SessionService>,
}

impl UsersApi {
    pub fn new(users: Arc<UserService>, sessions: Arc<SessionService>) -> Self {
        Self { users, sessions }
    }
}

#[derive(Tags)]
enum UserTags {
    /// User management endpoints
    Users,
}

#[OpenApi]
impl UsersApi {
    /// List all users
    #[oai(path = "/users", method = "get", tag = "UserTags::Users")]
    async fn list(&self, jar: &CookieJar) -> Result<Json<UsersResponse>, ApiError> {
        require_session(&self.sessions, jar)?;
        let users = self.users.list().await?;
        Ok(Json(UsersResponse {
            users: users.into_iter().map(UserResponse::from).collect(),
        }))
    }

    /// Create a user
    #[oai(path = "/users", method = "post", tag = "UserTags::Users")]
    async fn create(
        &self,
        jar: &CookieJar,
        body: Json<CreateUserRequest>,
    ) -> Result<CreatedUserResponse, ApiError> {
        let session = require_session(&self.sessions, jar)?;
        if !session.role.is_privileged() {
            return Err(ApiError::forbidden("Insufficient permissions"));
        }

        let input = body.0;
        if input.name.trim().is_empty()
            || input.email.trim().is_empty()
            || input.password.is_empty()
            || input.department.trim().is_empty()
        {
            return Err(ApiError::bad_request("All fields are required"));
        }

        let user = self.users.create(input).await?;
        Ok(CreatedUserResponse::Created(Json(UserMessageResponse {
            message: "User created successfully".to_string(),
            user: user.into(),
        })))
    }

    /// Fetch one user by id
    #[oai(path = "/users/:id", method = "get", tag = "UserTags::Users")]
    async fn get(&self, jar: &CookieJar, id: Path<String>) -> Result<Json<UserEnvelope>, ApiError> {
        require_session(&self.sessions, jar)?;
        let user = self.users.get(&id.0).await?;
        Ok(Json(UserEnvelope { user: user.into() }))
    }

    /// Update a user with a merge patch
    #[oai(path = "/users/:id", method = "put", tag = "UserTags::Users")]
    async fn update(
        &self,
        jar: &CookieJar,
        id: Path<String>,
        body: Json<UpdateUserRequest>,
    ) -> Result<Json<UserMessageResponse>, ApiError> {
        let session = require_session(&self.sessions, jar)?;

        // Users may edit themselves; editing anyone else takes a
        // privileged role.
        if session.id != id.0 && !session.role.is_privileged() {
            return Err(ApiError::forbidden("Insufficient permissions"));
        }

        // Role changes are reserved for admins, including on self-edits.
        if body.role.is_some() && session.role != Role::Admin {
            return Err(ApiError::forbidden("Only administrators can change roles"));
        }

        let user = self.users.update(&id.0, body.0).await?;
        Ok(Json(UserMessageResponse {
            message: "User updated successfully".to_string(),
            user: user.into(),
        }))
    }

    /// Delete a user
    #[oai(path = "/users/:id", method = "delete", tag = "UserTags::Users")]
    async fn delete(
        &self,
        jar: &CookieJar,
        id: Path<String>,
    ) -> Result<DeletedUserResponse, ApiError> {
        let session = require_session(&self.sessions, jar)?;
        if session.role != Role::Admin {
            return Err(ApiError::forbidden("Insufficient permissions"));
        }
        if session.id == id.0 {
            return Err(ApiError::bad_request("You cannot delete your own account"));
        }

        self.users.delete(&id.0).await?;
        Ok(DeletedUserResponse::Deleted(Json(MessageResponse {
            message: "User deleted successfully".to_string(),
        })))
    }
}

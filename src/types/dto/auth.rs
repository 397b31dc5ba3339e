use crate::types::dto::user::UserResponse;
use crate::types::internal::SessionUser;
use poem_openapi::Object;

/// Request model for login.
#[derive(Object, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response model for a successful login.
#[derive(Object, Debug)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Response model for the current-session endpoint.
#[derive(Object, Debug)]
pub struct MeResponse {
    pub user: SessionUser,
}

use crate::api::require_session;
use crate::errors::{ApiError, ServiceError};
use crate::services::{SessionService, UserService};
use crate::types::db::UserStatus;
use crate::types::dto::auth::{LoginRequest, LoginResponse, MeResponse};
use crate::types::dto::common::MessageResponse;
use crate::types::internal::SessionUser;
use poem::web::cookie::CookieJar;
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

/// Authentication endpoints: cookie-based login, logout and session echo.
pub struct AuthApi {
    users: Arc<UserService>,
    sessions: Arc<SessionService>,
}

impl AuthApi {
    pub fn new(users: Arc<UserService>, sessions: Arc<SessionService>) -> Self {
        Self { users, sessions }
    }
}

#[derive(Tags)]
enum AuthTags {
    /// Authentication endpoints
    Authentication,
}

#[OpenApi(prefix_path = "/auth")]
impl AuthApi {
    /// Verify credentials and set the session cookie
    #[oai(path = "/login", method = "post", tag = "AuthTags::Authentication")]
    async fn login(
        &self,
        jar: &CookieJar,
        body: Json<LoginRequest>,
    ) -> Result<Json<LoginResponse>, ApiError> {
        if body.email.trim().is_empty() || body.password.is_empty() {
            return Err(ApiError::bad_request("Email and password are required"));
        }

        let user = match self.users.verify_credentials(&body.email, &body.password).await {
            Ok(user) => user,
            Err(ServiceError::InvalidCredentials) => {
                tracing::debug!(email = %body.email, "login rejected");
                return Err(ApiError::invalid_credentials());
            }
            Err(err) => return Err(err.into()),
        };

        // Correct password on a deactivated account is a 403, not a 401.
        if user.status == UserStatus::Inactive {
            return Err(ApiError::forbidden("User account is inactive"));
        }

        let token = self.sessions.issue_token(&SessionUser::from(&user))?;
        jar.add(self.sessions.session_cookie(token));

        tracing::info!(user_id = %user.id, "login succeeded");
        Ok(Json(LoginResponse {
            message: "Login successful".to_string(),
            user: user.into(),
        }))
    }

    /// Clear the session cookie
    #[oai(path = "/logout", method = "post", tag = "AuthTags::Authentication")]
    async fn logout(&self, jar: &CookieJar) -> Result<Json<MessageResponse>, ApiError> {
        jar.add(self.sessions.logout_cookie());
        Ok(Json(MessageResponse {
            message: "Logout successful".to_string(),
        }))
    }

    /// Return the claims of the current session
    #[oai(path = "/me", method = "get", tag = "AuthTags::Authentication")]
    async fn me(&self, jar: &CookieJar) -> Result<Json<MeResponse>, ApiError> {
        let session = require_session(&self.sessions, jar)?;
        Ok(Json(MeResponse { user: session }))
    }
}

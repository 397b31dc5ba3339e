// API layer - HTTP endpoints
pub mod auth;
pub mod health;
pub mod projects;
pub mod stats;
pub mod users;

pub use auth::AuthApi;
pub use health::HealthApi;
pub use projects::ProjectsApi;
pub use stats::StatsApi;
pub use users::UsersApi;

use crate::errors::ApiError;
use crate::services::{ProjectService, SessionService, UserService};
use crate::stores::Datastore;
use crate::types::internal::SessionUser;
use poem::middleware::CookieJarManager;
use poem::web::cookie::CookieJar;
use poem::{Endpoint, EndpointExt, Route};
use poem_openapi::OpenApiService;
use std::sync::Arc;

/// Resolve the session cookie or fail with a 401.
pub(crate) fn require_session(
    sessions: &SessionService,
    jar: &CookieJar,
) -> Result<SessionUser, ApiError> {
    sessions
        .session_from(jar)
        .ok_or_else(ApiError::unauthenticated)
}

/// Compose every API surface into the full application route: the OpenAPI
/// service nested under `/api`, Swagger UI under `/swagger`, and the cookie
/// middleware the session extractor depends on.
pub fn build_app(store: Arc<Datastore>, sessions: Arc<SessionService>) -> impl Endpoint {
    let users = Arc::new(UserService::new(store.clone()));
    let projects = Arc::new(ProjectService::new(store.clone()));

    let api_service = OpenApiService::new(
        (
            AuthApi::new(users.clone(), sessions.clone()),
            UsersApi::new(users.clone(), sessions.clone()),
            ProjectsApi::new(projects, sessions.clone()),
            StatsApi::new(store.clone(), sessions),
            HealthApi::new(store),
        ),
        "devdesk-backend",
        env!("CARGO_PKG_VERSION"),
    )
    .server("http://localhost:3000/api");

    let ui = api_service.swagger_ui();

    Route::new()
        .nest("/api", api_service)
        .nest("/swagger", ui)
        .with(CookieJarManager::new())
}

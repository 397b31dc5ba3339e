use crate::api::require_session;
use crate::errors::ApiError;
use crate::services::{stats, SessionService};
use crate::stores::Datastore;
use crate::types::dto::stats::StatsResponse;
use poem::web::cookie::CookieJar;
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

/// Dashboard statistics endpoint.
pub struct StatsApi {
    store: Arc<Datastore>,
    sessions: Arc<SessionService>,
}

impl StatsApi {
    pub fn new(store: Arc<Datastore>, sessions: Arc<SessionService>) -> Self {
        Self { store, sessions }
    }
}

#[derive(Tags)]
enum StatsTags {
    /// Aggregate statistics
    Stats,
}

#[OpenApi]
impl StatsApi {
    /// Compute dashboard statistics over the current collections
    #[oai(path = "/stats", method = "get", tag = "StatsTags::Stats")]
    async fn get(&self, jar: &CookieJar) -> Result<Json<StatsResponse>, ApiError> {
        require_session(&self.sessions, jar)?;
        let document = self.store.read().await?;
        Ok(Json(stats::compute(&document.projects, &document.users)))
    }
}

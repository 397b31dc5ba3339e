use crate::stores::Datastore;
use crate::types::dto::common::{DatabaseHealth, HealthResponse, UnhealthyResponse};
use chrono::{DateTime, Utc};
use poem_openapi::{payload::Json, ApiResponse, OpenApi, Tags};
use std::sync::Arc;
use std::time::Instant;

/// Liveness endpoint reporting datastore state and process uptime.
pub struct HealthApi {
    store: Arc<Datastore>,
    started: Instant,
}

impl HealthApi {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self {
            store,
            started: Instant::now(),
        }
    }
}

#[derive(Tags)]
enum HealthTags {
    /// Health check endpoints
    Health,
}

#[derive(ApiResponse)]
pub enum HealthCheckResponse {
    /// Service is healthy
    #[oai(status = 200)]
    Healthy(Json<HealthResponse>),

    /// Datastore is unreadable
    #[oai(status = 500)]
    Unhealthy(Json<UnhealthyResponse>),
}

#[OpenApi]
impl HealthApi {
    /// Report service and datastore health
    #[oai(path = "/health", method = "get", tag = "HealthTags::Health")]
    async fn health(&self) -> HealthCheckResponse {
        let document = match self.store.read().await {
            Ok(document) => document,
            Err(err) => {
                tracing::error!(error = %err, "health check failed to read datastore");
                return HealthCheckResponse::Unhealthy(Json(UnhealthyResponse {
                    status: "unhealthy".to_string(),
                    timestamp: Utc::now().to_rfc3339(),
                    error: "Datastore is unreadable".to_string(),
                }));
            }
        };

        let metadata = tokio::fs::metadata(self.store.path()).await.ok();
        let last_modified = metadata
            .as_ref()
            .and_then(|m| m.modified().ok())
            .map(|time| DateTime::<Utc>::from(time).to_rfc3339());

        HealthCheckResponse::Healthy(Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            database: DatabaseHealth {
                path: self.store.path().display().to_string(),
                exists: metadata.is_some(),
                size_bytes: metadata.as_ref().map(|m| m.len()).unwrap_or(0),
                last_modified,
                users_count: document.users.len() as u32,
                projects_count: document.projects.len() as u32,
            },
            uptime_seconds: self.started.elapsed().as_secs(),
        }))
    }
}

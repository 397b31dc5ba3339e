use poem_openapi::Object;

/// Error envelope returned by every failing endpoint.
#[derive(Object, Debug)]
pub struct ErrorResponse {
    /// Machine-readable error category
    pub error: String,

    /// Human-readable message
    pub message: String,

    /// HTTP status code, duplicated in the body
    pub status_code: u16,
}

/// Plain acknowledgement body.
#[derive(Object, Debug)]
pub struct MessageResponse {
    pub message: String,
}

/// Datastore section of the health report.
#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub path: String,
    pub exists: bool,
    pub size_bytes: u64,
    pub last_modified: Option<String>,
    pub users_count: u32,
    pub projects_count: u32,
}

/// Body of a passing health check.
#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub database: DatabaseHealth,
    pub uptime_seconds: u64,
}

/// Body of a failing health check.
#[derive(Object, Debug)]
pub struct UnhealthyResponse {
    pub status: String,
    pub timestamp: String,
    pub error: String,
}

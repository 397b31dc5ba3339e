use crate::types::db::{Environment, Project, ProjectStatus};
use poem_openapi::payload::Json;
use poem_openapi::{ApiResponse, Object};

/// Request model for project creation. Name, description and client are
/// required non-empty; everything else defaults.
#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: String,
    pub client: String,
    pub environments: Option<Vec<Environment>>,
    pub tech_stack: Option<Vec<String>>,
    pub status: Option<ProjectStatus>,
    pub docs_url: Option<String>,
    pub gitlab_url: Option<String>,
    pub assigned_users: Option<Vec<String>>,
}

/// Merge-patch request for project updates. A present `assigned_users` list
/// replaces the previous one and triggers the mirror sync. Absent and null
/// fields are equivalent, so `docs_url` and `gitlab_url` can be set to a new
/// value but not cleared back to empty.
#[derive(Object, Debug, Default)]
#[oai(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub client: Option<String>,
    pub environments: Option<Vec<Environment>>,
    pub tech_stack: Option<Vec<String>>,
    pub status: Option<ProjectStatus>,
    pub docs_url: Option<String>,
    pub gitlab_url: Option<String>,
    pub assigned_users: Option<Vec<String>>,
}

/// Request model for replacing a project's assigned users.
#[derive(Object, Debug)]
#[oai(rename_all = "camelCase")]
pub struct AssignUsersRequest {
    pub user_ids: Vec<String>,
}

/// Request model for adding a comment. The author comes from the session.
#[derive(Object, Debug)]
pub struct AddCommentRequest {
    pub text: String,
}

#[derive(Object, Debug)]
pub struct ProjectsResponse {
    pub projects: Vec<Project>,
}

#[derive(Object, Debug)]
pub struct ProjectEnvelope {
    pub project: Project,
}

#[derive(Object, Debug)]
pub struct ProjectMessageResponse {
    pub message: String,
    pub project: Project,
}

/// 201 response for project creation.
#[derive(ApiResponse)]
pub enum CreatedProjectResponse {
    /// Project created
    #[oai(status = 201)]
    Created(Json<ProjectMessageResponse>),
}

use crate::api::require_session;
use crate::errors::ApiError;
use crate::services::{ProjectService, SessionService};
use crate::types::db::{Project, Role};
use crate::types::dto::common::MessageResponse;
use crate::types::dto::project::{
    AddCommentRequest, AssignUsersRequest, CreateProjectRequest, CreatedProjectResponse,
    ProjectEnvelope, ProjectMessageResponse, ProjectsResponse, UpdateProjectRequest,
};
use crate::types::internal::SessionUser;
use poem::web::cookie::CookieJar;
use poem_openapi::param::Path;
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

/// Project endpoints, including assignment management and comments.
pub struct ProjectsApi {
    projects: Arc<ProjectService>,
    sessions: Arc<SessionService>,
}

impl ProjectsApi {
    pub fn new(projects: Arc<ProjectService>, sessions: Arc<SessionService>) -> Self {
        Self { projects, sessions }
    }

    async fn get_readable(
        &self,
        session: &SessionUser,
        id: &str,
    ) -> Result<Project, ApiError> {
        let project = self.projects.get(id).await?;
        if !session.role.is_privileged()
            && !project.assigned_users.iter().any(|uid| *uid == session.id)
        {
            return Err(ApiError::forbidden("You do not have access to this project"));
        }
        Ok(project)
    }
}

#[derive(Tags)]
enum ProjectTags {
    /// Project management endpoints
    Projects,
}

#[OpenApi]
impl ProjectsApi {
    /// List projects visible to the current session
    #[oai(path = "/projects", method = "get", tag = "ProjectTags::Projects")]
    async fn list(&self, jar: &CookieJar) -> Result<Json<ProjectsResponse>, ApiError> {
        let session = require_session(&self.sessions, jar)?;
        let projects = self.projects.list_for(&session).await?;
        Ok(Json(ProjectsResponse { projects }))
    }

    /// Create a project
    #[oai(path = "/projects", method = "post", tag = "ProjectTags::Projects")]
    async fn create(
        &self,
        jar: &CookieJar,
        body: Json<CreateProjectRequest>,
    ) -> Result<CreatedProjectResponse, ApiError> {
        let session = require_session(&self.sessions, jar)?;
        if !session.role.is_privileged() {
            return Err(ApiError::forbidden("Insufficient permissions"));
        }

        let input = body.0;
        if input.name.trim().is_empty()
            || input.description.trim().is_empty()
            || input.client.trim().is_empty()
        {
            return Err(ApiError::bad_request(
                "Name, description and client are required",
            ));
        }

        let project = self.projects.create(input).await?;
        Ok(CreatedProjectResponse::Created(Json(ProjectMessageResponse {
            message: "Project created successfully".to_string(),
            project,
        })))
    }

    /// Fetch one project by id
    #[oai(path = "/projects/:id", method = "get", tag = "ProjectTags::Projects")]
    async fn get(
        &self,
        jar: &CookieJar,
        id: Path<String>,
    ) -> Result<Json<ProjectEnvelope>, ApiError> {
        let session = require_session(&self.sessions, jar)?;
        let project = self.get_readable(&session, &id.0).await?;
        Ok(Json(ProjectEnvelope { project }))
    }

    /// Update a project with a merge patch
    #[oai(path = "/projects/:id", method = "put", tag = "ProjectTags::Projects")]
    async fn update(
        &self,
        jar: &CookieJar,
        id: Path<String>,
        body: Json<UpdateProjectRequest>,
    ) -> Result<Json<ProjectMessageResponse>, ApiError> {
        let session = require_session(&self.sessions, jar)?;
        if !session.role.is_privileged() {
            return Err(ApiError::forbidden("Insufficient permissions"));
        }

        let patch = body.0;
        if matches!(&patch.name, Some(name) if name.trim().len() < 2) {
            return Err(ApiError::bad_request(
                "Name must be at least 2 characters long",
            ));
        }
        if matches!(&patch.description, Some(desc) if desc.trim().len() < 10) {
            return Err(ApiError::bad_request(
                "Description must be at least 10 characters long",
            ));
        }
        if matches!(&patch.client, Some(client) if client.trim().len() < 2) {
            return Err(ApiError::bad_request(
                "Client must be at least 2 characters long",
            ));
        }

        let project = self.projects.update(&id.0, patch).await?;
        Ok(Json(ProjectMessageResponse {
            message: "Project updated successfully".to_string(),
            project,
        }))
    }

    /// Delete a project
    #[oai(path = "/projects/:id", method = "delete", tag = "ProjectTags::Projects")]
    async fn delete(
        &self,
        jar: &CookieJar,
        id: Path<String>,
    ) -> Result<Json<MessageResponse>, ApiError> {
        let session = require_session(&self.sessions, jar)?;
        if session.role != Role::Admin {
            return Err(ApiError::forbidden("Insufficient permissions"));
        }

        self.projects.delete(&id.0).await?;
        Ok(Json(MessageResponse {
            message: "Project deleted successfully".to_string(),
        }))
    }

    /// Replace the set of users assigned to a project
    #[oai(path = "/projects/:id/assign-users", method = "post", tag = "ProjectTags::Projects")]
    async fn assign_users(
        &self,
        jar: &CookieJar,
        id: Path<String>,
        body: Json<AssignUsersRequest>,
    ) -> Result<Json<ProjectMessageResponse>, ApiError> {
        let session = require_session(&self.sessions, jar)?;
        if !session.role.is_privileged() {
            return Err(ApiError::forbidden("Insufficient permissions"));
        }

        let project = self.projects.assign_users(&id.0, body.0.user_ids).await?;
        Ok(Json(ProjectMessageResponse {
            message: "Users assigned successfully".to_string(),
            project,
        }))
    }

    /// Add a comment to a project
    #[oai(path = "/projects/:id/comments", method = "post", tag = "ProjectTags::Projects")]
    async fn add_comment(
        &self,
        jar: &CookieJar,
        id: Path<String>,
        body: Json<AddCommentRequest>,
    ) -> Result<Json<ProjectMessageResponse>, ApiError> {
        let session = require_session(&self.sessions, jar)?;
        self.get_readable(&session, &id.0).await?;

        if body.text.trim().is_empty() {
            return Err(ApiError::bad_request("Comment text is required"));
        }

        let project = self
            .projects
            .add_comment(&id.0, body.0.text, session.name)
            .await?;
        Ok(Json(ProjectMessageResponse {
            message: "Comment added successfully".to_string(),
            project,
        }))
    }

    /// Remove a comment from a project
    #[oai(
        path = "/projects/:id/comments/:comment_id",
        method = "delete",
        tag = "ProjectTags::Projects"
    )]
    async fn remove_comment(
        &self,
        jar: &CookieJar,
        id: Path<String>,
        comment_id: Path<String>,
    ) -> Result<Json<ProjectMessageResponse>, ApiError> {
        let session = require_session(&self.sessions, jar)?;
        self.get_readable(&session, &id.0).await?;

        let project = self.projects.remove_comment(&id.0, &comment_id.0).await?;
        Ok(Json(ProjectMessageResponse {
            message: "Comment removed successfully".to_string(),
            project,
        }))
    }
}

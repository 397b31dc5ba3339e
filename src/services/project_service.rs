use crate::errors::ServiceError;
use crate::stores::Datastore;
use crate::types::db::{Comment, Project, ProjectStatus, User};
use crate::types::dto::project::{CreateProjectRequest, UpdateProjectRequest};
use crate::types::internal::SessionUser;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// CRUD over projects plus the project-side half of the bidirectional
/// assignment sync. Every mutation is one whole-document read-modify-write.
pub struct ProjectService {
    store: Arc<Datastore>,
}

impl ProjectService {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }

    /// Row-level access control: admins and managers see every project,
    /// anyone else sees only the projects they are assigned to.
    pub async fn list_for(&self, session: &SessionUser) -> Result<Vec<Project>, ServiceError> {
        let projects = self.store.read().await?.projects;
        if session.role.is_privileged() {
            return Ok(projects);
        }
        Ok(projects
            .into_iter()
            .filter(|project| project.assigned_users.iter().any(|id| *id == session.id))
            .collect())
    }

    pub async fn list_all(&self) -> Result<Vec<Project>, ServiceError> {
        Ok(self.store.read().await?.projects)
    }

    pub async fn get(&self, id: &str) -> Result<Project, ServiceError> {
        self.store
            .read()
            .await?
            .projects
            .into_iter()
            .find(|project| project.id == id)
            .ok_or(ServiceError::NotFound("project"))
    }

    pub async fn create(&self, input: CreateProjectRequest) -> Result<Project, ServiceError> {
        let mut document = self.store.read().await?;
        let now = Utc::now().to_rfc3339();

        let project = Project {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            client: input.client,
            status: input.status.unwrap_or(ProjectStatus::Active),
            environments: input.environments.unwrap_or_default(),
            tech_stack: input.tech_stack.unwrap_or_default(),
            docs_url: input.docs_url,
            gitlab_url: input.gitlab_url,
            comments: vec![],
            assigned_users: input.assigned_users.unwrap_or_default(),
            created_at: now.clone(),
            updated_at: now,
        };

        document.projects.push(project.clone());
        self.store.write(&document).await?;

        tracing::info!(project_id = %project.id, name = %project.name, "project created");
        Ok(project)
    }

    /// Merge-patch update. A supplied `assigned_users` list replaces the
    /// previous one and triggers the user-side mirror sync against the diff.
    pub async fn update(
        &self,
        id: &str,
        patch: UpdateProjectRequest,
    ) -> Result<Project, ServiceError> {
        let mut document = self.store.read().await?;

        let index = document
            .projects
            .iter()
            .position(|project| project.id == id)
            .ok_or(ServiceError::NotFound("project"))?;

        let previous_assigned = document.projects[index].assigned_users.clone();

        {
            let project = &mut document.projects[index];
            if let Some(name) = patch.name {
                project.name = name;
            }
            if let Some(description) = patch.description {
                project.description = description;
            }
            if let Some(client) = patch.client {
                project.client = client;
            }
            if let Some(status) = patch.status {
                project.status = status;
            }
            if let Some(environments) = patch.environments {
                project.environments = environments;
            }
            if let Some(tech_stack) = patch.tech_stack {
                project.tech_stack = tech_stack;
            }
            if let Some(docs_url) = patch.docs_url {
                project.docs_url = Some(docs_url);
            }
            if let Some(gitlab_url) = patch.gitlab_url {
                project.gitlab_url = Some(gitlab_url);
            }
            if let Some(assigned) = &patch.assigned_users {
                project.assigned_users = assigned.clone();
            }
            project.updated_at = Utc::now().to_rfc3339();
        }

        if let Some(new_assigned) = &patch.assigned_users {
            for user_id in new_assigned.iter().filter(|u| !previous_assigned.contains(u)) {
                attach_project_to_user(&mut document.users, user_id, id);
            }
            for user_id in previous_assigned.iter().filter(|u| !new_assigned.contains(u)) {
                detach_project_from_user(&mut document.users, user_id, id);
            }
        }

        let updated = document.projects[index].clone();
        self.store.write(&document).await?;
        Ok(updated)
    }

    /// Delete a project, first removing its id from every assigned user.
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let mut document = self.store.read().await?;

        let index = document
            .projects
            .iter()
            .position(|project| project.id == id)
            .ok_or(ServiceError::NotFound("project"))?;

        let assigned = document.projects[index].assigned_users.clone();
        for user_id in &assigned {
            detach_project_from_user(&mut document.users, user_id, id);
        }

        document.projects.remove(index);
        self.store.write(&document).await?;

        tracing::info!(project_id = %id, "project deleted");
        Ok(())
    }

    /// Replace a project's assigned users wholesale, then walk every user
    /// and patch their project list idempotently: listed users gain the
    /// project id when missing, everyone else loses it when present.
    pub async fn assign_users(
        &self,
        id: &str,
        user_ids: Vec<String>,
    ) -> Result<Project, ServiceError> {
        let mut document = self.store.read().await?;

        let index = document
            .projects
            .iter()
            .position(|project| project.id == id)
            .ok_or(ServiceError::NotFound("project"))?;

        {
            let project = &mut document.projects[index];
            project.assigned_users = user_ids.clone();
            project.updated_at = Utc::now().to_rfc3339();
        }

        for user_id in &user_ids {
            if !document.users.iter().any(|user| user.id == *user_id) {
                tracing::warn!(project_id = %id, %user_id,
                    "assignment sync skipped dangling user reference");
            }
        }

        for user in document.users.iter_mut() {
            let listed = user_ids.iter().any(|user_id| *user_id == user.id);
            let present = user.assigned_projects.iter().any(|pid| pid == id);
            if listed && !present {
                user.assigned_projects.push(id.to_string());
            } else if !listed && present {
                user.assigned_projects.retain(|pid| pid != id);
            } else {
                continue;
            }
            user.projects_count = user.assigned_projects.len() as u32;
            user.updated_at = Utc::now().to_rfc3339();
        }

        let updated = document.projects[index].clone();
        self.store.write(&document).await?;
        Ok(updated)
    }

    pub async fn add_comment(
        &self,
        id: &str,
        text: String,
        author: String,
    ) -> Result<Project, ServiceError> {
        let mut document = self.store.read().await?;

        let project = document
            .projects
            .iter_mut()
            .find(|project| project.id == id)
            .ok_or(ServiceError::NotFound("project"))?;

        let now = Utc::now().to_rfc3339();
        project.comments.push(Comment {
            id: Uuid::new_v4().to_string(),
            text,
            author,
            date: now.clone(),
        });
        project.updated_at = now;

        let updated = project.clone();
        self.store.write(&document).await?;
        Ok(updated)
    }

    pub async fn remove_comment(
        &self,
        id: &str,
        comment_id: &str,
    ) -> Result<Project, ServiceError> {
        let mut document = self.store.read().await?;

        let project = document
            .projects
            .iter_mut()
            .find(|project| project.id == id)
            .ok_or(ServiceError::NotFound("project"))?;

        let before = project.comments.len();
        project.comments.retain(|comment| comment.id != comment_id);
        if project.comments.len() == before {
            return Err(ServiceError::NotFound("comment"));
        }
        project.updated_at = Utc::now().to_rfc3339();

        let updated = project.clone();
        self.store.write(&document).await?;
        Ok(updated)
    }
}

/// User-side mirror patch: add the project id to a user's list when absent.
/// Dangling ids are logged and skipped so the primary mutation still lands.
fn attach_project_to_user(users: &mut [User], user_id: &str, project_id: &str) {
    match users.iter_mut().find(|user| user.id == user_id) {
        Some(user) => {
            if !user.assigned_projects.iter().any(|pid| pid == project_id) {
                user.assigned_projects.push(project_id.to_string());
                user.projects_count = user.assigned_projects.len() as u32;
                user.updated_at = Utc::now().to_rfc3339();
            }
        }
        None => {
            tracing::warn!(%user_id, %project_id,
                "assignment sync skipped dangling user reference");
        }
    }
}

fn detach_project_from_user(users: &mut [User], user_id: &str, project_id: &str) {
    match users.iter_mut().find(|user| user.id == user_id) {
        Some(user) => {
            user.assigned_projects.retain(|pid| pid != project_id);
            user.projects_count = user.assigned_projects.len() as u32;
            user.updated_at = Utc::now().to_rfc3339();
        }
        None => {
            tracing::warn!(%user_id, %project_id,
                "assignment sync skipped dangling user reference");
        }
    }
}

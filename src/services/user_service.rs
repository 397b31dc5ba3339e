use crate::errors::ServiceError;
use crate::services::password;
use crate::stores::Datastore;
use crate::types::db::{Project, Role, User, UserStatus};
use crate::types::dto::user::{CreateUserRequest, UpdateUserRequest};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// CRUD over users plus the user-side half of the bidirectional assignment
/// sync. Every mutation is one whole-document read-modify-write.
pub struct UserService {
    store: Arc<Datastore>,
}

impl UserService {
    pub fn new(store: Arc<Datastore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.store.read().await?.users)
    }

    pub async fn get(&self, id: &str) -> Result<User, ServiceError> {
        self.store
            .read()
            .await?
            .users
            .into_iter()
            .find(|user| user.id == id)
            .ok_or(ServiceError::NotFound("user"))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        Ok(self
            .store
            .read()
            .await?
            .users
            .into_iter()
            .find(|user| user.email == email))
    }

    /// Create a user. Fails with `EmailInUse` when the email is taken. The
    /// password is hashed before it ever reaches the document; assignment
    /// lists start from the input without mirror-syncing, matching the
    /// procedural sync policy (the mirror is restored on later writes).
    pub async fn create(&self, input: CreateUserRequest) -> Result<User, ServiceError> {
        let mut document = self.store.read().await?;

        if document.users.iter().any(|user| user.email == input.email) {
            return Err(ServiceError::EmailInUse);
        }

        let now = Utc::now();
        let assigned_projects = input.assigned_projects.unwrap_or_default();
        let first_name = input
            .name
            .split_whitespace()
            .next()
            .unwrap_or("user")
            .to_lowercase();

        let user = User {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            email: input.email,
            password: password::hash_password(&input.password)?,
            role: input.role,
            department: input.department,
            status: input.status.unwrap_or(UserStatus::Active),
            avatar: Some(format!(
                "/placeholder.svg?height=40&width=40&query=avatar-{first_name}"
            )),
            join_date: now.format("%Y-%m-%d").to_string(),
            last_login: None,
            projects_count: assigned_projects.len() as u32,
            assigned_projects,
            created_at: now.to_rfc3339(),
            updated_at: now.to_rfc3339(),
        };

        document.users.push(user.clone());
        self.store.write(&document).await?;

        tracing::info!(user_id = %user.id, email = %user.email, "user created");
        Ok(user)
    }

    /// Merge-patch update. Only fields present in the patch are applied; the
    /// id is immutable, a supplied password is re-hashed, and a supplied
    /// `assigned_projects` list triggers the project-side mirror sync.
    pub async fn update(&self, id: &str, patch: UpdateUserRequest) -> Result<User, ServiceError> {
        let mut document = self.store.read().await?;

        let index = document
            .users
            .iter()
            .position(|user| user.id == id)
            .ok_or(ServiceError::NotFound("user"))?;

        if let Some(email) = &patch.email {
            let taken = document
                .users
                .iter()
                .any(|user| user.email == *email && user.id != id);
            if taken {
                return Err(ServiceError::EmailInUse);
            }
        }

        let hashed = match &patch.password {
            Some(plain) => Some(password::hash_password(plain)?),
            None => None,
        };

        let previous_assigned = document.users[index].assigned_projects.clone();

        {
            let user = &mut document.users[index];
            if let Some(name) = patch.name {
                user.name = name;
            }
            if let Some(email) = patch.email {
                user.email = email;
            }
            if let Some(hash) = hashed {
                user.password = hash;
            }
            if let Some(role) = patch.role {
                user.role = role;
            }
            if let Some(department) = patch.department {
                user.department = department;
            }
            if let Some(status) = patch.status {
                user.status = status;
            }
            if let Some(avatar) = patch.avatar {
                user.avatar = Some(avatar);
            }
            if let Some(assigned) = &patch.assigned_projects {
                user.assigned_projects = assigned.clone();
                user.projects_count = assigned.len() as u32;
            }
            user.updated_at = Utc::now().to_rfc3339();
        }

        if let Some(new_assigned) = &patch.assigned_projects {
            sync_projects_for_user(&mut document.projects, id, &previous_assigned, new_assigned);
        }

        let updated = document.users[index].clone();
        self.store.write(&document).await?;
        Ok(updated)
    }

    /// Delete a user, first removing its id from every project it was
    /// assigned to. Self-delete is rejected at the HTTP layer, which knows
    /// the caller's identity.
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let mut document = self.store.read().await?;

        let index = document
            .users
            .iter()
            .position(|user| user.id == id)
            .ok_or(ServiceError::NotFound("user"))?;

        let assigned = document.users[index].assigned_projects.clone();
        for project_id in &assigned {
            match document
                .projects
                .iter_mut()
                .find(|project| project.id == *project_id)
            {
                Some(project) => project.assigned_users.retain(|user_id| user_id != id),
                None => {
                    tracing::warn!(user_id = %id, project_id = %project_id,
                        "assignment sync skipped dangling project reference");
                }
            }
        }

        document.users.remove(index);
        self.store.write(&document).await?;

        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Check a login attempt. On success the user's last-login timestamp is
    /// recorded; status checks happen at the HTTP layer so an inactive user
    /// can be answered with 403 instead of 401.
    pub async fn verify_credentials(
        &self,
        email: &str,
        plain_password: &str,
    ) -> Result<User, ServiceError> {
        let mut document = self.store.read().await?;

        let user = document
            .users
            .iter_mut()
            .find(|user| user.email == email)
            .ok_or(ServiceError::InvalidCredentials)?;

        if !password::verify_password(plain_password, &user.password) {
            return Err(ServiceError::InvalidCredentials);
        }

        let now = Utc::now().to_rfc3339();
        user.last_login = Some(now.clone());
        user.updated_at = now;
        let verified = user.clone();

        self.store.write(&document).await?;
        Ok(verified)
    }

    /// Seed the default admin account when it does not exist yet. Runs once
    /// at startup, before the listener accepts connections.
    pub async fn ensure_admin(&self, email: &str, plain_password: &str) -> Result<(), ServiceError> {
        if self.get_by_email(email).await?.is_some() {
            return Ok(());
        }

        let mut document = self.store.read().await?;
        let now = Utc::now();
        document.users.push(User {
            id: Uuid::new_v4().to_string(),
            name: "Administrator".into(),
            email: email.to_string(),
            password: password::hash_password(plain_password)?,
            role: Role::Admin,
            department: "Administration".into(),
            status: UserStatus::Active,
            avatar: Some("/placeholder.svg?height=40&width=40".into()),
            join_date: now.format("%Y-%m-%d").to_string(),
            last_login: None,
            projects_count: 0,
            assigned_projects: vec![],
            created_at: now.to_rfc3339(),
            updated_at: now.to_rfc3339(),
        });
        self.store.write(&document).await?;

        tracing::info!(%email, "seeded default admin user");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) async fn raw_document(&self) -> crate::stores::Document {
        self.store.read().await.expect("failed to read document")
    }
}

/// Project-side half of the mirror sync after a user's assignment list
/// changed: diff the new list against the previous one and patch each
/// affected project idempotently. Dangling ids are logged and skipped; the
/// primary mutation never fails because of them.
fn sync_projects_for_user(
    projects: &mut [Project],
    user_id: &str,
    previous: &[String],
    current: &[String],
) {
    for project_id in current.iter().filter(|id| !previous.contains(id)) {
        match projects.iter_mut().find(|project| project.id == *project_id) {
            Some(project) => {
                if !project.assigned_users.iter().any(|id| id == user_id) {
                    project.assigned_users.push(user_id.to_string());
                }
            }
            None => {
                tracing::warn!(%user_id, %project_id,
                    "assignment sync skipped dangling project reference");
            }
        }
    }

    for project_id in previous.iter().filter(|id| !current.contains(id)) {
        match projects.iter_mut().find(|project| project.id == *project_id) {
            Some(project) => project.assigned_users.retain(|id| id != user_id),
            None => {
                tracing::warn!(%user_id, %project_id,
                    "assignment sync skipped dangling project reference");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::db::ProjectStatus;

    fn create_request(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: "Jordan Doe".into(),
            email: email.to_string(),
            password: "secret123".into(),
            role: Role::Developer,
            department: "Engineering".into(),
            status: None,
            assigned_projects: None,
        }
    }

    fn bare_project(id: &str) -> Project {
        Project {
            id: id.to_string(),
            name: "Portal".into(),
            description: "Client portal system".into(),
            client: "Acme".into(),
            status: ProjectStatus::Active,
            environments: vec![],
            tech_stack: vec![],
            docs_url: None,
            gitlab_url: None,
            comments: vec![],
            assigned_users: vec![],
            created_at: "2026-01-01T00:00:00Z".into(),
            updated_at: "2026-01-01T00:00:00Z".into(),
        }
    }

    async fn setup() -> (tempfile::TempDir, UserService, Arc<Datastore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(Datastore::new(dir.path().join("database.json")));
        store.initialize().await.unwrap();
        (dir, UserService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let (_dir, service, _store) = setup().await;

        let created = service.create(create_request("jd@example.com")).await.unwrap();
        let loaded = service.get(&created.id).await.unwrap();

        assert_eq!(loaded.name, "Jordan Doe");
        assert_eq!(loaded.email, "jd@example.com");
        assert_eq!(loaded.status, UserStatus::Active);
        assert_eq!(loaded.projects_count, 0);
        assert!(loaded.assigned_projects.is_empty());
    }

    #[tokio::test]
    async fn create_hashes_the_password() {
        let (_dir, service, _store) = setup().await;

        let created = service.create(create_request("jd@example.com")).await.unwrap();
        assert_ne!(created.password, "secret123");
        assert!(created.password.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (_dir, service, _store) = setup().await;

        service.create(create_request("jd@example.com")).await.unwrap();
        let result = service.create(create_request("jd@example.com")).await;
        assert!(matches!(result, Err(ServiceError::EmailInUse)));
    }

    #[tokio::test]
    async fn update_only_touches_supplied_fields() {
        let (_dir, service, _store) = setup().await;
        let created = service.create(create_request("jd@example.com")).await.unwrap();

        let updated = service
            .update(
                &created.id,
                UpdateUserRequest {
                    department: Some("Design".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.department, "Design");
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.password, created.password);
    }

    #[tokio::test]
    async fn update_rehashes_only_a_supplied_password() {
        let (_dir, service, _store) = setup().await;
        let created = service.create(create_request("jd@example.com")).await.unwrap();

        let updated = service
            .update(
                &created.id,
                UpdateUserRequest {
                    password: Some("new-password".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_ne!(updated.password, created.password);
        assert!(password::verify_password("new-password", &updated.password));
    }

    #[tokio::test]
    async fn update_email_conflict_is_rejected() {
        let (_dir, service, _store) = setup().await;
        service.create(create_request("first@example.com")).await.unwrap();
        let second = service.create(create_request("second@example.com")).await.unwrap();

        let result = service
            .update(
                &second.id,
                UpdateUserRequest {
                    email: Some("first@example.com".into()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(ServiceError::EmailInUse)));
    }

    #[tokio::test]
    async fn updating_assignments_syncs_projects_and_count() {
        let (_dir, service, store) = setup().await;
        let created = service.create(create_request("jd@example.com")).await.unwrap();

        let mut document = store.read().await.unwrap();
        document.projects.push(bare_project("p1"));
        document.projects.push(bare_project("p2"));
        store.write(&document).await.unwrap();

        let updated = service
            .update(
                &created.id,
                UpdateUserRequest {
                    assigned_projects: Some(vec!["p1".into(), "p2".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.projects_count, 2);

        let document = service.raw_document().await;
        for project in &document.projects {
            assert!(project.assigned_users.contains(&created.id));
        }

        // Shrinking the list removes the mirror entry on the dropped project.
        service
            .update(
                &created.id,
                UpdateUserRequest {
                    assigned_projects: Some(vec!["p2".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let document = service.raw_document().await;
        let p1 = document.projects.iter().find(|p| p.id == "p1").unwrap();
        let p2 = document.projects.iter().find(|p| p.id == "p2").unwrap();
        assert!(!p1.assigned_users.contains(&created.id));
        assert!(p2.assigned_users.contains(&created.id));
    }

    #[tokio::test]
    async fn dangling_project_reference_does_not_fail_the_update() {
        let (_dir, service, _store) = setup().await;
        let created = service.create(create_request("jd@example.com")).await.unwrap();

        let updated = service
            .update(
                &created.id,
                UpdateUserRequest {
                    assigned_projects: Some(vec!["no-such-project".into()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.assigned_projects, vec!["no-such-project".to_string()]);
    }

    #[tokio::test]
    async fn delete_cascades_into_projects() {
        let (_dir, service, store) = setup().await;
        let created = service.create(create_request("jd@example.com")).await.unwrap();

        let mut document = store.read().await.unwrap();
        let mut project = bare_project("p1");
        project.assigned_users.push(created.id.clone());
        document.projects.push(project);
        let user = document.users.iter_mut().find(|u| u.id == created.id).unwrap();
        user.assigned_projects.push("p1".into());
        store.write(&document).await.unwrap();

        service.delete(&created.id).await.unwrap();

        let document = service.raw_document().await;
        assert!(document.users.is_empty());
        assert!(document.projects[0].assigned_users.is_empty());
    }

    #[tokio::test]
    async fn verify_credentials_records_last_login() {
        let (_dir, service, _store) = setup().await;
        service.create(create_request("jd@example.com")).await.unwrap();

        let verified = service
            .verify_credentials("jd@example.com", "secret123")
            .await
            .unwrap();
        assert!(verified.last_login.is_some());
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let (_dir, service, _store) = setup().await;
        service.create(create_request("jd@example.com")).await.unwrap();

        let result = service.verify_credentials("jd@example.com", "nope").await;
        assert!(matches!(result, Err(ServiceError::InvalidCredentials)));

        let result = service.verify_credentials("ghost@example.com", "nope").await;
        assert!(matches!(result, Err(ServiceError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn ensure_admin_seeds_once() {
        let (_dir, service, _store) = setup().await;

        service.ensure_admin("admin@example.com", "admin123").await.unwrap();
        service.ensure_admin("admin@example.com", "admin123").await.unwrap();

        let document = service.raw_document().await;
        assert_eq!(document.users.len(), 1);
        assert_eq!(document.users[0].role, Role::Admin);
    }
}

// Persisted entity records for the datastore document.
pub mod project;
pub mod user;

pub use project::{Comment, Environment, Project, ProjectStatus};
pub use user::{Role, UnknownRole, User, UserStatus};

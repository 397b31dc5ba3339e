pub mod password;
pub mod permissions;
pub mod project_service;
pub mod session;
pub mod stats;
pub mod user_service;

pub use project_service::ProjectService;
pub use session::SessionService;
pub use user_service::UserService;

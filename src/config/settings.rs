use std::env;
use std::fmt;
use std::path::PathBuf;

const DEFAULT_JWT_SECRET: &str = "dev-secret-change-me-in-production";

/// Application settings resolved from the environment, with development
/// defaults for everything.
#[derive(Clone)]
pub struct Settings {
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub jwt_secret: String,
    pub admin_email: String,
    pub admin_password: String,
    pub cookie_secure: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                tracing::warn!("JWT_SECRET is not set, using the development default");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            database_path: env::var("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("database.json")),
            jwt_secret,
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@devdesk.local".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string()),
            cookie_secure: env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("bind_addr", &self.bind_addr)
            .field("database_path", &self.database_path)
            .field("jwt_secret", &"<redacted>")
            .field("admin_email", &self.admin_email)
            .field("admin_password", &"<redacted>")
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

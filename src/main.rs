use devdesk_backend::api::build_app;
use devdesk_backend::config::{init_logging, Settings};
use devdesk_backend::services::{SessionService, UserService};
use devdesk_backend::stores::Datastore;
use poem::{listener::TcpListener, Server};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    dotenv::dotenv().ok();

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let settings = Settings::from_env();
    tracing::info!(?settings, "starting devdesk-backend");

    let store = Arc::new(Datastore::new(settings.database_path.clone()));
    store
        .initialize()
        .await
        .map_err(|e| std::io::Error::other(format!("failed to initialize datastore: {e}")))?;

    // Seed the default admin so a fresh deployment is immediately usable.
    let users = UserService::new(store.clone());
    users
        .ensure_admin(&settings.admin_email, &settings.admin_password)
        .await
        .map_err(|e| std::io::Error::other(format!("failed to seed admin user: {e}")))?;

    let sessions = Arc::new(SessionService::new(
        settings.jwt_secret.clone(),
        settings.cookie_secure,
    ));
    let app = build_app(store, sessions);

    tracing::info!(addr = %settings.bind_addr, "listening");
    Server::new(TcpListener::bind(settings.bind_addr)).run(app).await
}

// Errors layer - internal taxonomies plus the HTTP error surface.
pub mod api;
pub mod service;
pub mod store;

pub use api::ApiError;
pub use service::ServiceError;
pub use store::StoreError;

// Request/response models for the HTTP surface.
pub mod auth;
pub mod common;
pub mod project;
pub mod stats;
pub mod user;

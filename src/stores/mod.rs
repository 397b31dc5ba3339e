// Stores layer - the flat-file datastore collaborator.
pub mod datastore;

pub use datastore::{Datastore, Document};

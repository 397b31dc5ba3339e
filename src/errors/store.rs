use std::path::PathBuf;

/// Failures raised by the flat-file datastore.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access datastore file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("datastore document is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

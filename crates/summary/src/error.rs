use thiserror::Error;

pub type Result<T> = std::result::Result<T, SummaryError>;

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Storage error: {0}")]
    Store(#[from] pagelens_store::StoreError),

    #[error("Failed to decode archive for project '{project_id}': {source}")]
    Decode {
        project_id: String,
        #[source]
        source: pagelens_archive::DecodeError,
    },

    #[error("Outline error: {0}")]
    Outline(#[from] pagelens_outline::OutlineError),

    #[error("Remote API error for project '{project_id}': {message}")]
    Api { project_id: String, message: String },

    #[error("File '{file_key}' not found for project '{project_id}'")]
    NotFound {
        project_id: String,
        file_key: String,
    },
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuestlogError {
    #[error("Catalog entry not found: {0}")]
    EntryNotFound(u64),

    #[error("Catalog directory is not writable: {0}")]
    CatalogNotWritable(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuestlogError>;

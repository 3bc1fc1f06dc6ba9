/// Shared error type used across all Clipflow crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP: {0}")]
    Http(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("store {collection}: {message}")]
    Store { collection: String, message: String },

    #[error("storage bucket {bucket}: {message}")]
    Bucket { bucket: String, message: String },

    #[error("function {name}: {message}")]
    Function { name: String, message: String },

    #[error("tool: {0}")]
    Tool(#[from] crate::tool::ToolError),

    #[error("credits: {0}")]
    Credits(String),

    #[error("auth: {0}")]
    Auth(String),

    #[error("config: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a store-collection failure.
    pub fn store(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            collection: collection.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

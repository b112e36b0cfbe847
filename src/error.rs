use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Proxy returned status {status}")]
    Network { status: u16 },

    #[error("Model response contained no usable content")]
    EmptyResponse,

    #[error("No tour options could be recovered from model response")]
    Unparseable,

    #[error("No itinerary available for destination '{destination}'")]
    Unavailable { destination: String },
}

pub type Result<T> = std::result::Result<T, ExplorerError>;

// Error type shared by the game-data store, the log stream and configuration.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure while fetching a data resource.
    #[error("failed to fetch {resource}: {source}")]
    Network {
        resource: String,
        #[source]
        source: reqwest::Error,
    },

    /// The backend answered with a non-success status.
    #[error("failed to fetch {resource}: HTTP {status}")]
    HttpStatus { resource: String, status: u16 },

    /// The resource body was not valid JSON or did not match the table schema.
    #[error("failed to parse {resource}: {source}")]
    Parse {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be serialized for writing.
    #[error("failed to encode {resource}: {source}")]
    Encode {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported language code '{0}'")]
    InvalidLanguage(String),

    #[error("invalid backend url '{0}'")]
    InvalidUrl(String),
}

impl Error {
    pub(crate) fn parse(resource: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Parse {
            resource: resource.into(),
            source,
        }
    }
}

use kc_core::DirectoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KubeError {
    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("api server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<KubeError> for DirectoryError {
    fn from(err: KubeError) -> Self {
        DirectoryError::Backend(Box::new(err))
    }
}

use kc_core::ChannelError;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("websocket error: {0}")]
    Websocket(#[from] tungstenite::Error),

    #[error("invalid console url: {0}")]
    InvalidUrl(String),
}

impl From<ConsoleError> for ChannelError {
    fn from(err: ConsoleError) -> Self {
        match err {
            ConsoleError::Websocket(
                tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed,
            ) => ChannelError::Closed,
            other => ChannelError::Backend(Box::new(other)),
        }
    }
}

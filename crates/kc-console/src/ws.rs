use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message},
};
use tracing::{debug, trace, warn};

use kc_core::{ChannelError, CommandChannel, Connector};

use crate::{config::ConsoleConfig, error::ConsoleError};

/// Opens a fresh websocket to the console for every [`Connector::connect`] call.
#[derive(Debug, Clone)]
pub struct WsConnector {
    cfg: ConsoleConfig,
}

impl WsConnector {
    pub fn new(cfg: ConsoleConfig) -> Result<Self, ConsoleError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self) -> Result<Box<dyn CommandChannel>, ChannelError> {
        let (stream, response) = connect_async(self.cfg.url.as_str())
            .await
            .map_err(ConsoleError::from)?;
        debug!(url = %self.cfg.url, status = %response.status(), "console connected");
        Ok(Box::new(WsChannel { stream }))
    }
}

pub struct WsChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl CommandChannel for WsChannel {
    async fn send(&mut self, command: &str) -> Result<(), ChannelError> {
        self.stream
            .send(Message::Text(command.to_string()))
            .await
            .map_err(ConsoleError::from)?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<String>, ChannelError> {
        while let Some(frame) = self.stream.next().await {
            match frame.map_err(ConsoleError::from)? {
                Message::Text(text) => return Ok(Some(text)),
                Message::Binary(bytes) => match String::from_utf8(bytes) {
                    Ok(text) => return Ok(Some(text)),
                    Err(e) => warn!(error = %e, "dropping non-utf8 console frame"),
                },
                Message::Close(frame) => {
                    trace!(?frame, "console sent close frame");
                    return Ok(None);
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
        Ok(None)
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        match self.stream.close(None).await {
            Ok(()) => Ok(()),
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(ConsoleError::from(e).into()),
        }
    }
}

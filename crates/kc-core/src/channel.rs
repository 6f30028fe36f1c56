use async_trait::async_trait;

use crate::error::ChannelError;

/// One open duplex text stream to the game server console.
#[async_trait]
pub trait CommandChannel: Send {
    /// Write a single command line.
    async fn send(&mut self, command: &str) -> Result<(), ChannelError>;

    /// Wait for the next unsolicited event.
    ///
    /// `Ok(None)` means the peer closed the stream.
    async fn recv(&mut self) -> Result<Option<String>, ChannelError>;

    async fn close(&mut self) -> Result<(), ChannelError>;
}

/// Dials new [`CommandChannel`]s. The reconciler and the reactor each hold their own connection.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn CommandChannel>, ChannelError>;
}

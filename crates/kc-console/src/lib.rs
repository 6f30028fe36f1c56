//! Command channel over the game server's websocket console.
mod config;
pub use config::ConsoleConfig;

mod error;
pub use error::ConsoleError;

mod ws;
pub use ws::{WsChannel, WsConnector};

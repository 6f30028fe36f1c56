pub mod channel;
pub use channel::{CommandChannel, Connector};

pub mod command;
pub use command::{Command, EntityKind, Position};

pub mod deadline;
pub use deadline::with_deadline;

pub mod directory;
pub use directory::WorkloadDirectory;

pub mod error;
pub use error::{BoxError, ChannelError, CoreError, DirectoryError, ParseError};

pub mod map;
pub use map::{to_backoff_policy, to_jitter_policy, to_task_error};

pub mod parser;
pub use parser::{MessageParser, SlainMessageParser};

pub mod reactor;
pub use reactor::{REACTOR_TASK, Reactor, ReactorConfig};

pub mod reconcile;
pub use reconcile::{
    Plan, RECONCILER_TASK, ReconcileState, Reconciler, ReconcilerConfig, TickReport,
};

#[cfg(test)]
mod fake;

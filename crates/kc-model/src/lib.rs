mod backoff;
pub use backoff::{BackoffStrategy, JitterStrategy};

mod event;
pub use event::{ConsoleEvent, LEVEL_INFO};

mod label;
pub use label::{EntityLabel, LABEL_SEPARATOR};

mod notification;
pub use notification::KillNotification;

mod workload;
pub use workload::WorkloadInstance;

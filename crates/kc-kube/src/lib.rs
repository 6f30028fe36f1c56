//! Workload directory backed by the Kubernetes REST API.
//!
//! Namespaces are selected by label, workload instances are pods.
mod config;
pub use config::KubeConfig;

mod directory;
pub use directory::KubeDirectory;

mod errors;
pub use errors::KubeError;

use async_trait::async_trait;
use kc_model::WorkloadInstance;

use crate::error::DirectoryError;

/// Source of truth for the workload instances that should appear in the game world.
///
/// Implementations surface every failure as an error; a partial listing must never be
/// returned as if it were complete.
#[async_trait]
pub trait WorkloadDirectory: Send + Sync {
    /// Namespaces whose labels match `selector` exactly (`key=value[,key=value]`).
    async fn list_namespaces(&self, selector: &str) -> Result<Vec<String>, DirectoryError>;

    /// All instances currently present in `namespace`.
    async fn list_instances(&self, namespace: &str) -> Result<Vec<WorkloadInstance>, DirectoryError>;

    /// Terminate `name` in `namespace`.
    async fn delete_instance(&self, namespace: &str, name: &str) -> Result<(), DirectoryError>;
}

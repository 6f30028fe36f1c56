use crate::EntityLabel;

/// One unit of cluster work, identified by namespace and name.
///
/// Read fresh from the workload directory on every reconciliation tick and never mutated.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct WorkloadInstance {
    pub namespace: String,
    pub name: String,
}

impl WorkloadInstance {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Game-world label for this instance.
    #[inline]
    pub fn label(&self) -> EntityLabel {
        EntityLabel::encode(&self.namespace, &self.name)
    }
}

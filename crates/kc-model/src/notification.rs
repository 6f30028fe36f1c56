use std::fmt;

/// Request to terminate one workload instance, derived from a single console event.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KillNotification {
    pub namespace: String,
    pub name: String,
}

impl KillNotification {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for KillNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

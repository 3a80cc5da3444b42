use std::panic::Location;

/// How a widget instance is identified within its parent namespace.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum InstanceKey {
    /// Identified by the source location of the constructor call.
    Caller(&'static Location<'static>),
    /// Identified by a caller-supplied name.
    Named(String),
    /// All instances of the widget type share the same partition.
    Shared,
}

impl InstanceKey {
    #[track_caller]
    pub fn from_caller() -> InstanceKey {
        InstanceKey::Caller(Location::caller())
    }

    pub fn named(name: impl Into<String>) -> InstanceKey {
        InstanceKey::Named(name.into())
    }

    /// Returns the call-site location, if the key was derived from one.
    pub fn location(&self) -> Option<&'static Location<'static>> {
        match self {
            InstanceKey::Caller(location) => Some(location),
            _ => None,
        }
    }
}

impl From<&str> for InstanceKey {
    fn from(name: &str) -> Self {
        InstanceKey::Named(name.to_owned())
    }
}

impl From<String> for InstanceKey {
    fn from(name: String) -> Self {
        InstanceKey::Named(name)
    }
}

impl From<usize> for InstanceKey {
    fn from(index: usize) -> Self {
        InstanceKey::Named(index.to_string())
    }
}

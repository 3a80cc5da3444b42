use fnv::FnvHasher;
use std::{
    fmt,
    hash::{Hash, Hasher},
    panic::Location,
};

/// Identifies one instantiation of a widget at a given call site.
///
/// Derived from the source location of the call and the sibling index (the number of times the
/// same call site was already visited under the same parent during the current pass).
/// Hashed with FNV: the key must be the same on every pass.
#[derive(Clone, Copy, Eq, PartialEq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct CallKey(u64);

impl fmt::Debug for CallKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("CallKey")
            .field(&format_args!("{:016X}", self.0))
            .finish()
    }
}

impl fmt::Display for CallKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

impl CallKey {
    pub fn new(location: &Location, index: usize) -> CallKey {
        let mut hasher = FnvHasher::default();
        location.file().hash(&mut hasher);
        location.line().hash(&mut hasher);
        location.column().hash(&mut hasher);
        index.hash(&mut hasher);
        CallKey(hasher.finish())
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Hash of a call site within a parent namespace, used to count siblings.
pub(crate) fn site_hash(parent: &str, widget_type: &str, location: &Location) -> u64 {
    let mut hasher = FnvHasher::default();
    parent.hash(&mut hasher);
    widget_type.hash(&mut hasher);
    location.file().hash(&mut hasher);
    location.line().hash(&mut hasher);
    location.column().hash(&mut hasher);
    hasher.finish()
}

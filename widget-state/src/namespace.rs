use crate::error::{Result, StateError};
use std::fmt;

/// Prefix of every store key owned by a widget instance.
///
/// A namespace is a chain of segments, each terminated by the separator:
/// `Outer[sidebar].TableChooser[0F3A...].`. The root namespace is empty.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Namespace {
    prefix: String,
    separator: char,
}

impl Namespace {
    pub fn root(separator: char) -> Namespace {
        Namespace {
            prefix: String::new(),
            separator,
        }
    }

    /// Appends a segment of the form `{widget_type}[{id}]`, or `{widget_type}` when `id` is `None`.
    pub(crate) fn child(&self, widget_type: &str, id: Option<&str>) -> Namespace {
        let mut prefix = self.prefix.clone();
        prefix.push_str(widget_type);
        if let Some(id) = id {
            prefix.push('[');
            prefix.push_str(id);
            prefix.push(']');
        }
        prefix.push(self.separator);
        Namespace {
            prefix,
            separator: self.separator,
        }
    }

    /// Checks that an explicit instance key can be embedded in a segment without ambiguity.
    pub(crate) fn validate_id(&self, id: &str) -> Result<()> {
        let reason = if id.is_empty() {
            Some("key is empty")
        } else if id.contains(self.separator) {
            Some("key contains the namespace separator")
        } else if id.contains(|c| c == '[' || c == ']') {
            Some("key contains a bracket")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(StateError::InvalidInstanceKey {
                key: id.to_owned(),
                reason,
            }),
            None => Ok(()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn is_root(&self) -> bool {
        self.prefix.is_empty()
    }

    /// Returns the store key of a field in this namespace.
    pub fn full_key(&self, field: &str) -> String {
        let mut key = String::with_capacity(self.prefix.len() + field.len());
        key.push_str(&self.prefix);
        key.push_str(field);
        key
    }

    /// Returns the field part of a store key, if the key belongs to this namespace.
    pub fn strip<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.prefix.as_str())
            .filter(|field| !field.is_empty())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.prefix)
    }
}

/// Returns the unqualified name of a type, without module path or generic arguments.
pub(crate) fn short_type_name<W: ?Sized>() -> &'static str {
    let name = std::any::type_name::<W>();
    let name = match name.find('<') {
        Some(pos) => &name[..pos],
        None => name,
    };
    name.rsplit("::").next().unwrap_or(name)
}

use crate::{error::Result, scope::Scope};

/// A struct whose fields are stored individually in a widget scope.
///
/// Usually derived with `#[derive(ScopedFields)]`, which requires the struct to implement
/// `Default` (the default value of each field is used when the field has no stored value) and
/// every stored field to be `Clone + 'static`.
///
/// Field attributes:
/// - `#[field(skip)]`: the field is not stored, `load` fills it with its default value.
/// - `#[field(rename = "name")]`: stores the field under another name.
pub trait ScopedFields: Sized {
    /// Reads all fields from the scope.
    fn load(scope: &Scope) -> Result<Self>;

    /// Writes all fields to the scope.
    fn save(&self, scope: &Scope) -> Result<()>;

    /// Writes the fields that have no stored value yet. See [`Scope::apply_default`].
    fn apply_defaults(&self, scope: &Scope) -> Result<()>;
}

use crate::scope::Scope;

/// Trait implemented by reusable widgets that own a state partition.
///
/// Widgets should read their state from the scope when they are created, and only write it
/// from event handlers. Consumers can create a widget and read its [`output`](Widget::output)
/// without rendering it.
pub trait Widget {
    /// Result of the user interaction with this widget.
    type Output;

    /// Returns the state partition of this instance.
    fn scope(&self) -> &Scope;

    /// Returns the result of the interaction, if it is complete.
    fn output(&self) -> Option<Self::Output>;

    /// Implement to give a debug name to your widget. Used only for debugging.
    fn debug_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

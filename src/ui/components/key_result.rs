/// Outcome of offering a key to a component that owns part of a view
/// (a confirm dialog, the command palette, a pager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Consumed, nothing for the view to do
  Handled,
  /// Consumed, and the view must react to `T`
  Event(T),
  /// Not ours; the view keeps dispatching
  NotHandled,
}

/// Notifications the session pushes to whatever drives the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// An action needs a signed-in user, or the user just signed out.
    SignInRequired,
    /// The saved recipe list was replaced by a new snapshot.
    SavedRecipesChanged { count: usize },
}

//! Action trait for type-safe state transitions

use std::fmt::Debug;

/// Marker trait for actions that can be dispatched to the store
///
/// Actions describe an intent ("navigate to X", "set offline flag"). They never
/// touch state themselves; the reducer turns them into a new snapshot.
///
/// - Clone: actions may be logged, recorded, or queued behind a running dispatch
/// - Debug: for logging
/// - Send + 'static: host tasks produce actions on other threads and send them
///   back to the main loop
///
/// Use `#[derive(Action)]` from `slingshot-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;

    /// Whether dispatches of this action should reach the dispatch log
    ///
    /// High-frequency actions can opt out with `#[action(skip_log)]`.
    fn loggable(&self) -> bool {
        true
    }
}

/// One-line description of an action for log output
///
/// Defaults to the `Debug` representation. Override it for actions that carry
/// large payloads.
pub trait ActionSummary: Action {
    /// Short human-readable form
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}

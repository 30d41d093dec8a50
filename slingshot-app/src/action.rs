//! Actions and their creators
//!
//! Watchers, the router and key handling never build variants directly; they
//! call the creator functions below.

use slingshot::ActionSummary;

/// Application actions
#[derive(slingshot::Action, Clone, Debug, PartialEq, Eq)]
pub enum AppAction {
    /// Route a decoded URL path to a page
    Navigate { path: String },

    /// Connectivity changed
    UpdateOffline(bool),

    /// Open or close the navigation drawer
    UpdateDrawerState(bool),

    /// Viewport crossed the wide breakpoint
    UpdateLayout(bool),

    OpenSnackbar,

    /// Sent by the snackbar timer
    #[action(skip_log)]
    CloseSnackbar,

    /// Exit the application; handled by the main loop
    Quit,
}

impl ActionSummary for AppAction {
    fn summary(&self) -> String {
        match self {
            AppAction::Navigate { path } => format!("Navigate({path})"),
            _ => format!("{:?}", self),
        }
    }
}

pub fn navigate(path: impl Into<String>) -> AppAction {
    AppAction::Navigate { path: path.into() }
}

pub fn update_offline(offline: bool) -> AppAction {
    AppAction::UpdateOffline(offline)
}

pub fn update_drawer_state(opened: bool) -> AppAction {
    AppAction::UpdateDrawerState(opened)
}

pub fn update_layout(wide: bool) -> AppAction {
    AppAction::UpdateLayout(wide)
}

pub fn open_snackbar() -> AppAction {
    AppAction::OpenSnackbar
}

pub fn close_snackbar() -> AppAction {
    AppAction::CloseSnackbar
}

#[cfg(test)]
mod tests {
    use super::*;
    use slingshot::Action;

    #[test]
    fn test_creators() {
        assert_eq!(
            navigate("/home"),
            AppAction::Navigate {
                path: "/home".into()
            }
        );
        assert_eq!(update_offline(true), AppAction::UpdateOffline(true));
        assert_eq!(update_drawer_state(false), AppAction::UpdateDrawerState(false));
        assert_eq!(update_layout(true), AppAction::UpdateLayout(true));
    }

    #[test]
    fn test_timer_action_not_logged() {
        assert!(!close_snackbar().loggable());
        assert!(open_snackbar().loggable());
        assert_eq!(navigate("/x").summary(), "Navigate(/x)");
    }
}

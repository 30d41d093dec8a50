//! Application state - single source of truth
//!
//! The store hands out `Rc<AppState>` snapshots. A snapshot is never mutated;
//! the reducer builds a new one when something actually changes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The page shown in the main content area
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Page {
    #[default]
    #[serde(rename = "home")]
    Home,
    #[serde(rename = "404")]
    NotFound,
}

impl Page {
    /// Every page the shell instantiates
    pub const ALL: [Page; 2] = [Page::Home, Page::NotFound];

    /// Page identifier, as used in titles and state dumps
    pub fn id(self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::NotFound => "404",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Shell state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AppState {
    /// Active page; exactly one at a time
    pub page: Page,
    /// Network connectivity is unavailable
    pub offline: bool,
    /// Navigation drawer is open
    pub drawer_opened: bool,
    /// Viewport satisfies the wide breakpoint; the drawer is persistent
    pub wide_layout: bool,
    /// Notification banner is visible
    pub snackbar_opened: bool,
}

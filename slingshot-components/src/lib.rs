//! Shell components for slingshot
//!
//! Render-only building blocks of the application shell. Components implement
//! the `Component<O>` trait; those that produce output (the drawer) take
//! callback functions through Props.
//!
//! # Components
//!
//! - [`Header`] - Title bar with a menu button that hides in the wide layout
//! - [`NavDrawer`] - Navigation links, persistent or drawn over the content
//! - [`Snackbar`] - Bottom banner for transient notices
//!
//! # Example
//!
//! ```ignore
//! use slingshot_components::{NavDrawer, NavDrawerProps};
//!
//! // In your render function:
//! drawer.render(frame, NavDrawer::layout(area), NavDrawerProps {
//!     links: &links,
//!     active_href: "/home",
//!     opened: state.drawer_opened,
//!     persistent: state.wide_layout,
//!     on_follow: Intent::Click,
//!     on_close: || Intent::Dispatch(update_drawer_state(false)),
//! });
//! ```

mod header;
mod nav_drawer;
mod snackbar;

pub use header::{Header, HeaderProps};
pub use nav_drawer::{NavDrawer, NavDrawerProps, NavInput, NavLink, DRAWER_WIDTH};
pub use snackbar::{bottom_rect, Snackbar, SnackbarProps, SnackbarStyle};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        bottom_rect, Header, HeaderProps, NavDrawer, NavDrawerProps, NavInput, NavLink, Snackbar,
        SnackbarProps, SnackbarStyle, DRAWER_WIDTH,
    };
}

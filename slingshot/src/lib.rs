//! slingshot: a store-synchronised application shell core
//!
//! One store holds the whole application state. Components connect to slices
//! of it, and a router plus environment watchers turn URL navigation,
//! connectivity and viewport changes into dispatched actions.
//!
//! # Example
//! ```ignore
//! use slingshot::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum AppAction {
//!     Navigate { path: String },
//!     UpdateOffline(bool),
//!     #[action(skip_log)]
//!     UpdateLayout(bool),
//! }
//!
//! #[derive(BindingCommand, Clone, Copy, PartialEq, Eq, Hash, Debug)]
//! enum Command {
//!     OpenMenu,
//!     Quit,
//! }
//! ```

// Re-export everything from core
pub use slingshot_core::*;

// Re-export derive macros
pub use slingshot_macros::{Action, BindingCommand};

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use slingshot_core::{Action, BindingCommand, Component, StateChanged};

    // Store and connect
    pub use slingshot_core::{
        connect, connect_with, Connected, LoggingMiddleware, Middleware, Reducer, Slice, Store,
        Subscription,
    };

    // Host integration
    pub use slingshot_core::{
        update_metadata, Anchor, Breakpoint, ClickEvent, ConnectivityWatcher, Environment,
        History, LayoutWatcher, Metadata, MetadataDocument, Observable, Router, Routes,
    };

    // Event system
    pub use slingshot_core::{process_raw_event, spawn_event_poller, EventKind, LinkAreas, RawEvent};

    // Keybindings
    pub use slingshot_core::{format_key_for_display, parse_key_string, Keybindings};

    // Derive macros
    pub use slingshot_macros::{Action, BindingCommand};

    // Ratatui re-exports
    pub use slingshot_core::{Color, Frame, Line, Modifier, Rect, Span, Style, Text};
}

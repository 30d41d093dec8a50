//! Core traits and types for slingshot
//!
//! Slingshot is the state and routing core of a single-page application shell:
//! one store, components that connect to slices of it, and a router plus
//! environment watchers that turn host events into dispatched actions.
//!
//! # Core Concepts
//!
//! - **Store**: single-threaded state container; a reducer turns
//!   `(snapshot, action)` into a new snapshot, and subscribers hear about
//!   every replacement
//! - **Connect**: [`Connected`] attaches a component to the store and feeds it
//!   the whole tree or a selected slice
//! - **Router**: link clicks and history traversal become navigations
//! - **Watchers**: connectivity and viewport-width observers that only report
//!   transitions
//! - **Metadata**: per-page title and description sink
//!
//! # Basic Example
//!
//! ```
//! use std::rc::Rc;
//! use slingshot_core::{Action, Store};
//!
//! #[derive(Clone, Debug)]
//! enum DrawerAction {
//!     Set(bool),
//! }
//!
//! impl Action for DrawerAction {
//!     fn name(&self) -> &'static str {
//!         "Set"
//!     }
//! }
//!
//! fn reducer(state: &Rc<bool>, action: DrawerAction) -> Rc<bool> {
//!     match action {
//!         DrawerAction::Set(open) if open != **state => Rc::new(open),
//!         DrawerAction::Set(_) => Rc::clone(state),
//!     }
//! }
//!
//! let store = Store::new(false, reducer);
//! let _sub = store.subscribe(|open| println!("drawer open: {open}"));
//! store.dispatch(DrawerAction::Set(true));
//! assert!(*store.state());
//! ```
//!
//! # Host events
//!
//! Everything that happens outside the store arrives on tokio channels and is
//! applied one at a time by the main loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(raw) = event_rx.recv() => {
//!             if let Some(event) = process_raw_event(raw) {
//!                 shell.handle_event(&event);
//!             }
//!         }
//!         Some(online) = probe_rx.recv() => env.online.set(online),
//!         Some(action) = action_rx.recv() => store.dispatch(action),
//!     }
//! }
//! ```

pub mod action;
pub mod component;
pub mod connect;
pub mod env;
pub mod event;
pub mod input;
pub mod keybindings;
pub mod metadata;
pub mod router;
pub mod store;
pub mod tasks;
pub mod testing;
pub mod watchers;

// Core trait exports
pub use action::{Action, ActionSummary};
pub use component::Component;

// Store and connect exports
pub use connect::{connect, connect_with, slice_changed, Connected, Slice, StateChanged};
pub use store::{LoggingMiddleware, Middleware, Reducer, Store, SubscriberId, Subscription};

// Host exports
pub use env::{Environment, EventTarget, ListenerId, Observable};
pub use metadata::{update_metadata, InMemoryDocument, MetaKey, Metadata, MetadataDocument};
pub use router::{
    decode_path, Anchor, ClickEvent, History, Location, Modifiers, MouseButton, Router, Routes,
};
pub use watchers::{Breakpoint, BreakpointError, ConnectivityWatcher, LayoutWatcher};

// Event system exports
pub use event::{click_from_mouse, EventKind, LinkAreas};
pub use input::{process_raw_event, spawn_event_poller, RawEvent};

// Keybindings exports
pub use keybindings::{format_key_for_display, parse_key_string, BindingCommand, Keybindings};

// Task exports
pub use tasks::{TaskKey, TaskManager};

// Re-export ratatui types for convenience
pub use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    Frame,
};

// Testing exports
pub use testing::{
    buffer_rect_to_string_plain, buffer_to_string_plain, char_key, ctrl_key, key, ActionRecorder,
    RenderHarness, StateRecorder,
};

#[cfg(feature = "testing-time")]
pub use testing::{advance_time, pause_time, resume_time};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::Action;
    pub use crate::component::Component;
    pub use crate::connect::{connect, connect_with, Connected, Slice, StateChanged};
    pub use crate::env::{Environment, Observable};
    pub use crate::event::{EventKind, LinkAreas};
    pub use crate::input::{process_raw_event, spawn_event_poller, RawEvent};
    pub use crate::keybindings::{BindingCommand, Keybindings};
    pub use crate::metadata::{update_metadata, Metadata, MetadataDocument};
    pub use crate::router::{Anchor, ClickEvent, History, Router, Routes};
    pub use crate::store::{LoggingMiddleware, Middleware, Reducer, Store, Subscription};
    pub use crate::tasks::{TaskKey, TaskManager};
    pub use crate::watchers::{Breakpoint, ConnectivityWatcher, LayoutWatcher};

    // Re-export ratatui types
    pub use ratatui::{
        layout::Rect,
        style::{Color, Modifier, Style},
        text::{Line, Span, Text},
        Frame,
    };
}

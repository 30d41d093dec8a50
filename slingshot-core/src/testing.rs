//! Test utilities for slingshot applications
//!
//! - [`key`]: Create `KeyEvent` from string (e.g., `key("ctrl+p")`)
//! - [`RenderHarness`]: Render into a ratatui `TestBackend` and read the screen back
//! - [`ActionRecorder`]: Middleware that records every dispatched action
//! - [`StateRecorder`]: Subscriber that records every snapshot it is notified with
//! - Assertion macros for verifying dispatched actions
//!
//! # Example
//!
//! ```ignore
//! use slingshot::testing::{ActionRecorder, StateRecorder};
//! use slingshot::{assert_dispatched, Store};
//!
//! let recorder = ActionRecorder::new();
//! let store = Store::new(AppState::default(), reducer).with_middleware(recorder.clone());
//! let states = StateRecorder::attach(&store);
//!
//! store.dispatch(AppAction::UpdateDrawerState(true));
//!
//! assert_dispatched!(recorder.actions(), AppAction::UpdateDrawerState(true));
//! assert_eq!(states.len(), 1);
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::{Frame, Terminal};

use crate::keybindings::parse_key_string;
use crate::store::{Middleware, Store, Subscription};
use crate::Action;

/// Create a `KeyEvent` from a key string.
///
/// # Examples
///
/// ```
/// use slingshot_core::testing::key;
/// use crossterm::event::{KeyCode, KeyModifiers};
///
/// let k = key("q");
/// assert_eq!(k.code, KeyCode::Char('q'));
///
/// let k = key("ctrl+p");
/// assert_eq!(k.code, KeyCode::Char('p'));
/// assert!(k.modifiers.contains(KeyModifiers::CONTROL));
/// ```
///
/// # Panics
///
/// Panics if the key string cannot be parsed.
pub fn key(s: &str) -> KeyEvent {
    parse_key_string(s).unwrap_or_else(|| panic!("Invalid key string: {:?}", s))
}

/// Create a `KeyEvent` for a character with no modifiers.
pub fn char_key(c: char) -> KeyEvent {
    KeyEvent {
        code: KeyCode::Char(c),
        modifiers: KeyModifiers::empty(),
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

/// Create a `KeyEvent` for a character with Ctrl modifier.
pub fn ctrl_key(c: char) -> KeyEvent {
    KeyEvent {
        code: KeyCode::Char(c),
        modifiers: KeyModifiers::CONTROL,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

/// Renders into an in-memory terminal
///
/// # Example
///
/// ```
/// use ratatui::widgets::Paragraph;
/// use slingshot_core::testing::RenderHarness;
///
/// let mut harness = RenderHarness::new(12, 1);
/// let screen = harness.render_to_string_plain(|frame| {
///     frame.render_widget(Paragraph::new("Slingshot"), frame.area());
/// });
/// assert_eq!(screen, "Slingshot   ");
/// ```
pub struct RenderHarness {
    terminal: Terminal<TestBackend>,
}

impl RenderHarness {
    /// Create a harness with a `width` x `height` screen
    ///
    /// # Panics
    ///
    /// Panics if the test terminal cannot be created.
    pub fn new(width: u16, height: u16) -> Self {
        let terminal = Terminal::new(TestBackend::new(width, height))
            .unwrap_or_else(|e| panic!("failed to create test terminal: {e}"));
        Self { terminal }
    }

    /// Draw one frame and return the screen as plain text, one line per row
    ///
    /// # Panics
    ///
    /// Panics if drawing fails.
    pub fn render_to_string_plain<F>(&mut self, draw: F) -> String
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal
            .draw(draw)
            .unwrap_or_else(|e| panic!("failed to draw frame: {e}"));
        buffer_to_string_plain(self.buffer())
    }

    /// Buffer of the last drawn frame
    pub fn buffer(&self) -> &Buffer {
        self.terminal.backend().buffer()
    }

    /// Resize the screen; the next frame is drawn at the new size
    pub fn resize(&mut self, width: u16, height: u16) {
        self.terminal.backend_mut().resize(width, height);
    }

    pub fn area(&self) -> Rect {
        *self.buffer().area()
    }
}

/// Screen contents as plain text, rows joined by `\n`
pub fn buffer_to_string_plain(buffer: &Buffer) -> String {
    buffer_rect_to_string_plain(buffer, *buffer.area())
}

/// Plain text of one region of a buffer
pub fn buffer_rect_to_string_plain(buffer: &Buffer, rect: Rect) -> String {
    let mut rows = Vec::with_capacity(rect.height as usize);
    for y in rect.top()..rect.bottom() {
        let mut row = String::new();
        for x in rect.left()..rect.right() {
            if let Some(cell) = buffer.cell((x, y)) {
                row.push_str(cell.symbol());
            }
        }
        rows.push(row);
    }
    rows.join("\n")
}

/// Middleware recording each dispatched action and whether it changed state
///
/// Clones share one log: keep a clone, hand the other to the store.
#[derive(Debug)]
pub struct ActionRecorder<A> {
    log: Rc<RefCell<Vec<(A, bool)>>>,
}

impl<A> Clone for ActionRecorder<A> {
    fn clone(&self) -> Self {
        Self {
            log: Rc::clone(&self.log),
        }
    }
}

impl<A> Default for ActionRecorder<A> {
    fn default() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl<A: Action> ActionRecorder<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions in dispatch order
    pub fn actions(&self) -> Vec<A> {
        self.log.borrow().iter().map(|(a, _)| a.clone()).collect()
    }

    /// Actions that produced a new snapshot
    pub fn changes(&self) -> Vec<A> {
        self.log
            .borrow()
            .iter()
            .filter(|(_, changed)| *changed)
            .map(|(a, _)| a.clone())
            .collect()
    }

    /// Take the recorded actions, leaving the log empty
    pub fn drain(&self) -> Vec<A> {
        self.log.borrow_mut().drain(..).map(|(a, _)| a).collect()
    }

    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }
}

impl<A: Action> Middleware<A> for ActionRecorder<A> {
    fn before(&mut self, _action: &A) {}

    fn after(&mut self, action: &A, state_changed: bool) {
        self.log.borrow_mut().push((action.clone(), state_changed));
    }
}

/// Subscriber recording every snapshot a store notifies with
pub struct StateRecorder<S> {
    snapshots: Rc<RefCell<Vec<Rc<S>>>>,
    _subscription: Subscription,
}

impl<S: 'static> StateRecorder<S> {
    /// Subscribe to `store`; dropping the recorder unsubscribes
    pub fn attach<A: Action>(store: &Store<S, A>) -> Self {
        let snapshots = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&snapshots);
        let subscription = store.subscribe(move |state: &Rc<S>| {
            sink.borrow_mut().push(Rc::clone(state));
        });
        Self {
            snapshots,
            _subscription: subscription,
        }
    }

    pub fn snapshots(&self) -> Vec<Rc<S>> {
        self.snapshots.borrow().clone()
    }

    pub fn last(&self) -> Option<Rc<S>> {
        self.snapshots.borrow().last().cloned()
    }

    /// Number of notifications received
    pub fn len(&self) -> usize {
        self.snapshots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.borrow().is_empty()
    }
}

/// Advance paused tokio time
#[cfg(feature = "testing-time")]
pub async fn advance_time(duration: std::time::Duration) {
    tokio::time::advance(duration).await;
}

/// Pause tokio time; requires a current-thread runtime
#[cfg(feature = "testing-time")]
pub fn pause_time() {
    tokio::time::pause();
}

/// Resume paused tokio time
#[cfg(feature = "testing-time")]
pub fn resume_time() {
    tokio::time::resume();
}

/// Assert that a specific action was dispatched.
///
/// # Example
///
/// ```ignore
/// assert_dispatched!(recorder.actions(), AppAction::Navigate { .. });
/// ```
#[macro_export]
macro_rules! assert_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` to be dispatched, but got: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Assert that a specific action was NOT dispatched.
#[macro_export]
macro_rules! assert_not_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$actions.iter().any(|a| matches!(a, $pattern $(if $guard)?)),
            "Expected action matching `{}` NOT to be dispatched, but it was: {:?}",
            stringify!($pattern),
            $actions
        );
    };
}

/// Count how many actions match a pattern.
///
/// ```ignore
/// assert_eq!(count_dispatched!(recorder.actions(), AppAction::UpdateOffline(true)), 1);
/// ```
#[macro_export]
macro_rules! count_dispatched {
    ($actions:expr, $pattern:pat $(if $guard:expr)?) => {
        $actions.iter().filter(|a| matches!(a, $pattern $(if $guard)?)).count()
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::widgets::Paragraph;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        Set(i32),
        Noop,
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::Set(_) => "Set",
                TestAction::Noop => "Noop",
            }
        }
    }

    fn reducer(state: &Rc<i32>, action: TestAction) -> Rc<i32> {
        match action {
            TestAction::Set(v) if v != **state => Rc::new(v),
            _ => Rc::clone(state),
        }
    }

    #[test]
    fn test_key_helpers() {
        assert_eq!(key("esc").code, KeyCode::Esc);
        assert_eq!(char_key('x').code, KeyCode::Char('x'));
        assert!(ctrl_key('c').modifiers.contains(KeyModifiers::CONTROL));
    }

    #[test]
    #[should_panic(expected = "Invalid key string")]
    fn test_key_panics_on_garbage() {
        key("not-a-key");
    }

    #[test]
    fn test_render_harness() {
        let mut harness = RenderHarness::new(5, 2);
        let screen = harness.render_to_string_plain(|frame| {
            frame.render_widget(Paragraph::new("ab\ncd"), frame.area());
        });
        assert_eq!(screen, "ab   \ncd   ");

        harness.resize(3, 1);
        let screen = harness.render_to_string_plain(|frame| {
            frame.render_widget(Paragraph::new("xyz"), frame.area());
        });
        assert_eq!(screen, "xyz");
        assert_eq!(harness.area(), Rect::new(0, 0, 3, 1));
    }

    #[test]
    fn test_recorders() {
        let recorder = ActionRecorder::new();
        let store = Store::new(0, reducer).with_middleware(recorder.clone());
        let states = StateRecorder::attach(&store);

        store.dispatch(TestAction::Set(1));
        store.dispatch(TestAction::Noop);
        store.dispatch(TestAction::Set(1));
        store.dispatch(TestAction::Set(2));

        assert_eq!(recorder.len(), 4);
        assert_eq!(
            recorder.changes(),
            vec![TestAction::Set(1), TestAction::Set(2)]
        );
        assert_eq!(states.len(), 2);
        assert_eq!(states.last().as_deref(), Some(&2));

        assert_dispatched!(recorder.actions(), TestAction::Noop);
        assert_not_dispatched!(recorder.actions(), TestAction::Set(3));
        assert_eq!(count_dispatched!(recorder.actions(), TestAction::Set(_)), 3);

        assert_eq!(recorder.drain().len(), 4);
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_state_recorder_unsubscribes_on_drop() {
        let store: Store<i32, TestAction> = Store::new(0, reducer);
        {
            let _states = StateRecorder::attach(&store);
            assert_eq!(store.subscriber_count(), 1);
        }
        assert_eq!(store.subscriber_count(), 0);
    }
}

//! Connectivity and layout watchers
//!
//! Each watcher samples its observable once at install time, then reports
//! only genuine transitions. Callbacks typically wrap an action creator and
//! `Store::dispatch`.

use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

use crate::env::{ListenerId, Observable};

/// Error parsing a media query into a [`Breakpoint`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BreakpointError {
    #[error("expected a query of the form `(min-width: <n>px)`, got `{0}`")]
    Syntax(String),
    #[error("invalid width `{0}`")]
    Width(String),
}

/// Minimum viewport width, in logical pixels, of the wide layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Breakpoint {
    pub min_width: u32,
}

impl Breakpoint {
    /// `(min-width: 768px)`
    pub const DEFAULT: Breakpoint = Breakpoint { min_width: 768 };

    pub const fn new(min_width: u32) -> Self {
        Self { min_width }
    }

    /// Whether a viewport of `width` pixels satisfies the breakpoint
    pub fn matches(&self, width: u32) -> bool {
        width >= self.min_width
    }

    /// Parse a `(min-width: <n>px)` media query
    ///
    /// Whitespace is insignificant and the `px` unit may be omitted.
    pub fn parse(query: &str) -> Result<Self, BreakpointError> {
        let compact: String = query
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        let width = compact
            .strip_prefix("(min-width:")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| BreakpointError::Syntax(query.to_string()))?;
        let digits = width.strip_suffix("px").unwrap_or(width);
        let min_width = digits
            .parse::<u32>()
            .map_err(|_| BreakpointError::Width(width.to_string()))?;
        Ok(Self { min_width })
    }
}

impl Default for Breakpoint {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for Breakpoint {
    type Err = BreakpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(min-width: {}px)", self.min_width)
    }
}

/// Listener bookkeeping shared by both watchers
struct Installed<T> {
    source: Observable<T>,
    listener: Option<ListenerId>,
}

impl<T: Clone + 'static> Installed<T> {
    /// Sample `source` through `derive`, deliver, then deliver each flip
    fn install<D, F>(source: &Observable<T>, derive: D, on_change: F) -> Self
    where
        D: Fn(&T) -> bool + 'static,
        F: Fn(bool) + 'static,
    {
        let initial = derive(&source.get());
        on_change(initial);

        let last = Cell::new(initial);
        let listener = source.listen(move |value| {
            let next = derive(value);
            if last.replace(next) != next {
                on_change(next);
            }
        });

        Self {
            source: source.clone(),
            listener: Some(listener),
        }
    }

    fn dispose(&mut self) {
        if let Some(id) = self.listener.take() {
            self.source.unlisten(id);
        }
    }
}

/// Reports the offline flag derived from the host's online flag
pub struct ConnectivityWatcher {
    installed: Installed<bool>,
}

impl ConnectivityWatcher {
    /// Deliver `offline` right away, then on each transition
    pub fn install<F>(online: &Observable<bool>, on_change: F) -> Self
    where
        F: Fn(bool) + 'static,
    {
        let installed = Installed::install(
            online,
            |online| !*online,
            move |offline| {
                tracing::info!(offline, "connectivity changed");
                on_change(offline);
            },
        );
        Self { installed }
    }

    pub fn is_installed(&self) -> bool {
        self.installed.listener.is_some()
    }

    /// Stop watching; later calls are no-ops
    pub fn dispose(&mut self) {
        self.installed.dispose();
    }
}

impl Drop for ConnectivityWatcher {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for ConnectivityWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectivityWatcher")
            .field("installed", &self.is_installed())
            .finish()
    }
}

/// Reports whether the viewport satisfies a [`Breakpoint`]
pub struct LayoutWatcher {
    installed: Installed<u32>,
    breakpoint: Breakpoint,
}

impl LayoutWatcher {
    /// Deliver the match state right away, then each time it flips
    pub fn install<F>(viewport_width: &Observable<u32>, breakpoint: Breakpoint, on_change: F) -> Self
    where
        F: Fn(bool) + 'static,
    {
        let installed = Installed::install(
            viewport_width,
            move |width| breakpoint.matches(*width),
            move |wide| {
                tracing::info!(wide, %breakpoint, "layout changed");
                on_change(wide);
            },
        );
        Self {
            installed,
            breakpoint,
        }
    }

    pub fn breakpoint(&self) -> Breakpoint {
        self.breakpoint
    }

    pub fn is_installed(&self) -> bool {
        self.installed.listener.is_some()
    }

    /// Stop watching; later calls are no-ops
    pub fn dispose(&mut self) {
        self.installed.dispose();
    }
}

impl Drop for LayoutWatcher {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for LayoutWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutWatcher")
            .field("breakpoint", &self.breakpoint)
            .field("installed", &self.is_installed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<bool>>>, impl Fn(bool) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |value| sink.borrow_mut().push(value))
    }

    #[test]
    fn test_breakpoint_parse() {
        assert_eq!(Breakpoint::parse("(min-width: 768px)"), Ok(Breakpoint::DEFAULT));
        assert_eq!(Breakpoint::parse("( MIN-WIDTH:1024PX )"), Ok(Breakpoint::new(1024)));
        assert_eq!(Breakpoint::parse("(min-width: 600)"), Ok(Breakpoint::new(600)));
        assert!(matches!(
            Breakpoint::parse("(max-width: 768px)"),
            Err(BreakpointError::Syntax(_))
        ));
        assert!(matches!(
            Breakpoint::parse("(min-width: wide)"),
            Err(BreakpointError::Width(_))
        ));
        assert_eq!("(min-width: 900px)".parse::<Breakpoint>(), Ok(Breakpoint::new(900)));
    }

    #[test]
    fn test_breakpoint_display_round_trips() {
        let text = Breakpoint::DEFAULT.to_string();
        assert_eq!(text, "(min-width: 768px)");
        assert_eq!(Breakpoint::parse(&text), Ok(Breakpoint::DEFAULT));
    }

    #[test]
    fn test_breakpoint_matches() {
        let breakpoint = Breakpoint::DEFAULT;
        assert!(!breakpoint.matches(767));
        assert!(breakpoint.matches(768));
        assert!(breakpoint.matches(1920));
    }

    #[test]
    fn test_connectivity_samples_immediately() {
        let online = Observable::new(false);
        let (seen, on_change) = recorder();

        let _watcher = ConnectivityWatcher::install(&online, on_change);

        assert_eq!(*seen.borrow(), vec![true]);
    }

    #[test]
    fn test_connectivity_delivers_transitions_once() {
        let online = Observable::new(true);
        let (seen, on_change) = recorder();
        let _watcher = ConnectivityWatcher::install(&online, on_change);

        online.set(false);
        online.set(false);
        online.set(true);
        online.set(true);

        assert_eq!(*seen.borrow(), vec![false, true, false]);
    }

    #[test]
    fn test_layout_crossing_breakpoint() {
        let width = Observable::new(400);
        let (seen, on_change) = recorder();
        let _watcher = LayoutWatcher::install(&width, Breakpoint::DEFAULT, on_change);

        width.set(500);
        width.set(767);
        width.set(768);
        width.set(1200);
        width.set(700);

        assert_eq!(*seen.borrow(), vec![false, true, false]);
    }

    #[test]
    fn test_dispose_stops_delivery() {
        let online = Observable::new(true);
        let width = Observable::new(1024);
        let (offline_seen, on_offline) = recorder();
        let (wide_seen, on_wide) = recorder();

        let mut connectivity = ConnectivityWatcher::install(&online, on_offline);
        let mut layout = LayoutWatcher::install(&width, Breakpoint::DEFAULT, on_wide);
        connectivity.dispose();
        layout.dispose();
        layout.dispose();

        online.set(false);
        width.set(100);

        assert!(!connectivity.is_installed());
        assert_eq!(online.listener_count(), 0);
        assert_eq!(width.listener_count(), 0);
        assert_eq!(*offline_seen.borrow(), vec![false]);
        assert_eq!(*wide_seen.borrow(), vec![true]);
    }

    #[test]
    fn test_drop_disposes() {
        let online = Observable::new(true);
        {
            let _watcher = ConnectivityWatcher::install(&online, |_| {});
            assert_eq!(online.listener_count(), 1);
        }
        assert_eq!(online.listener_count(), 0);
    }
}

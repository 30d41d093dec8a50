//! Client-side routing
//!
//! [`History`] is an in-process session history, [`ClickEvent`] describes a
//! click that landed on the document, and [`Router`] ties the two together:
//! internal link clicks become history pushes, pop-state events become
//! navigations, and every navigation hands a decoded path to one handler.
//! Mapping the path to a page is the job of a [`Routes`] table, usually
//! consulted from the reducer.

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::env::{EventTarget, ListenerId};

/// Path, query and fragment of a URL on the history's origin
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// Raw (still percent-encoded) path, always starting with `/`
    pub path: String,
    /// Query without the leading `?`
    pub query: String,
    /// Fragment without the leading `#`
    pub fragment: String,
}

impl Location {
    /// Parse a path-absolute reference such as `/home?x=1#top`
    pub fn parse(reference: &str) -> Self {
        let (rest, fragment) = match reference.split_once('#') {
            Some((rest, fragment)) => (rest, fragment),
            None => (reference, ""),
        };
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, query),
            None => (rest, ""),
        };
        let path = if path.is_empty() {
            "/".to_string()
        } else if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Self {
            path,
            query: query.to_string(),
            fragment: fragment.to_string(),
        }
    }

    /// Path plus query and fragment, as it would appear after the origin
    pub fn href(&self) -> String {
        let mut href = self.path.clone();
        if !self.query.is_empty() {
            href.push('?');
            href.push_str(&self.query);
        }
        if !self.fragment.is_empty() {
            href.push('#');
            href.push_str(&self.fragment);
        }
        href
    }

    /// Percent-decoded path
    pub fn decoded_path(&self) -> String {
        decode_path(&self.path).into_owned()
    }

    /// Resolve `href` against this location
    ///
    /// Relative references are resolved against the directory of `self.path`;
    /// a reference made only of a query or fragment keeps the current path.
    fn join(&self, href: &str) -> Location {
        if href.starts_with('/') {
            return Location::parse(href);
        }
        if href.starts_with('?') {
            return Location::parse(&format!("{}{}", self.path, href));
        }
        if let Some(fragment) = href.strip_prefix('#') {
            return Location {
                fragment: fragment.to_string(),
                ..self.clone()
            };
        }
        let dir = match self.path.rfind('/') {
            Some(idx) => &self.path[..=idx],
            None => "/",
        };
        Location::parse(&format!("{dir}{href}"))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

/// Percent-decode a path, falling back to lossy UTF-8 on invalid sequences
pub fn decode_path(path: &str) -> Cow<'_, str> {
    match urlencoding::decode(path) {
        Ok(decoded) => decoded,
        Err(_) => {
            let bytes = urlencoding::decode_binary(path.as_bytes());
            Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// Split an href into its origin (if absolute) and the remainder
fn split_origin(href: &str) -> (Option<&str>, &str) {
    let Some(scheme_end) = href.find("://") else {
        return (None, href);
    };
    // A scheme never contains '/', '?' or '#'; anything else is a relative path
    if href[..scheme_end].contains(['/', '?', '#']) {
        return (None, href);
    }
    let authority_start = scheme_end + 3;
    let path_start = href[authority_start..]
        .find(['/', '?', '#'])
        .map(|idx| authority_start + idx)
        .unwrap_or(href.len());
    (Some(&href[..path_start]), &href[path_start..])
}

struct HistoryInner {
    origin: String,
    entries: RefCell<Vec<Location>>,
    cursor: Cell<usize>,
    pop_state: EventTarget<Location>,
}

/// In-process session history
///
/// `push` records a new entry without notifying anyone, like
/// `history.pushState`; traversal (`back`, `forward`, `go`) fires a pop-state
/// event carrying the location that became current. Cloning yields another
/// handle to the same history.
#[derive(Clone)]
pub struct History {
    inner: Rc<HistoryInner>,
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("origin", &self.inner.origin)
            .field("entries", &self.inner.entries.borrow().len())
            .field("cursor", &self.inner.cursor.get())
            .finish()
    }
}

impl History {
    /// Create a history with a single entry at `initial_path`
    pub fn new(origin: &str, initial_path: &str) -> Self {
        Self {
            inner: Rc::new(HistoryInner {
                origin: origin.trim_end_matches('/').to_string(),
                entries: RefCell::new(vec![Location::parse(initial_path)]),
                cursor: Cell::new(0),
                pop_state: EventTarget::new(),
            }),
        }
    }

    /// Scheme and authority this history belongs to, e.g. `app://slingshot`
    pub fn origin(&self) -> &str {
        &self.inner.origin
    }

    /// Current entry
    pub fn location(&self) -> Location {
        let entries = self.inner.entries.borrow();
        entries[self.inner.cursor.get()].clone()
    }

    /// Resolve an href against the current entry
    ///
    /// Returns `None` when the href points at another origin.
    pub fn resolve(&self, href: &str) -> Option<Location> {
        match split_origin(href) {
            (Some(origin), rest) => {
                if !origin.eq_ignore_ascii_case(&self.inner.origin) {
                    return None;
                }
                Some(Location::parse(rest))
            }
            (None, rest) => Some(self.location().join(rest)),
        }
    }

    /// Record a new entry after the current one, discarding forward entries
    pub fn push(&self, location: Location) {
        let mut entries = self.inner.entries.borrow_mut();
        let cursor = self.inner.cursor.get();
        entries.truncate(cursor + 1);
        entries.push(location);
        self.inner.cursor.set(cursor + 1);
    }

    /// Move one entry back; returns `false` at the start of the history
    pub fn back(&self) -> bool {
        self.go(-1)
    }

    /// Move one entry forward; returns `false` at the end of the history
    pub fn forward(&self) -> bool {
        self.go(1)
    }

    /// Move `delta` entries and fire pop-state
    ///
    /// Out-of-range deltas and `0` leave the history untouched and fire
    /// nothing.
    pub fn go(&self, delta: isize) -> bool {
        let len = self.inner.entries.borrow().len();
        let Some(target) = self.inner.cursor.get().checked_add_signed(delta) else {
            return false;
        };
        if delta == 0 || target >= len {
            return false;
        }
        self.inner.cursor.set(target);
        let location = self.location();
        self.inner.pop_state.emit(&location);
        true
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.borrow().is_empty()
    }

    /// Register a pop-state listener
    pub fn on_pop_state<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Location) + 'static,
    {
        self.inner.pop_state.listen(listener)
    }

    /// Remove a pop-state listener
    pub fn remove_pop_state_listener(&self, id: ListenerId) -> bool {
        self.inner.pop_state.unlisten(id)
    }
}

/// Mouse button that produced a click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseButton {
    #[default]
    Primary,
    Middle,
    Secondary,
}

/// Modifier keys held during a click
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.ctrl || self.meta || self.shift || self.alt
    }
}

/// A link on the rendered page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Anchor {
    pub href: String,
    pub target: Option<String>,
    pub download: bool,
    pub rel: Option<String>,
}

impl Anchor {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.rel = Some(rel.into());
        self
    }

    pub fn download(mut self) -> Self {
        self.download = true;
        self
    }

    fn opens_elsewhere(&self) -> bool {
        self.target.as_deref().is_some_and(|target| target != "_self")
    }

    fn is_external(&self) -> bool {
        self.rel
            .as_deref()
            .is_some_and(|rel| rel.split_whitespace().any(|token| token == "external"))
    }
}

/// A click on the document
#[derive(Debug, Clone, Default)]
pub struct ClickEvent {
    /// The anchor the click landed on, if any
    pub anchor: Option<Anchor>,
    pub button: MouseButton,
    pub modifiers: Modifiers,
    default_prevented: Cell<bool>,
}

impl ClickEvent {
    /// A plain primary-button click on `anchor`
    pub fn on(anchor: Anchor) -> Self {
        Self {
            anchor: Some(anchor),
            ..Self::default()
        }
    }

    /// A click that did not hit a link
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Claim the click so the host does not act on it
    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// The href this click should navigate to in-app, if any
    fn internal_href(&self) -> Option<&str> {
        if self.default_prevented()
            || self.button != MouseButton::Primary
            || self.modifiers.any()
        {
            return None;
        }
        let anchor = self.anchor.as_ref()?;
        if anchor.opens_elsewhere() || anchor.download || anchor.is_external() {
            return None;
        }
        let href = anchor.href.trim();
        if href.is_empty() || href == "#" || href.starts_with("mailto:") {
            return None;
        }
        Some(href)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouterState {
    Idle,
    Navigating,
}

struct RouterInner {
    handler: Box<dyn Fn(&str)>,
    state: Cell<RouterState>,
    pending: RefCell<VecDeque<String>>,
}

impl RouterInner {
    /// Hand `path` to the handler, or defer it behind the running navigation
    fn navigate(&self, path: String) {
        if self.state.get() == RouterState::Navigating {
            tracing::debug!(path = %path, "deferring navigation");
            self.pending.borrow_mut().push_back(path);
            return;
        }

        self.state.set(RouterState::Navigating);
        let mut next = Some(path);
        while let Some(path) = next {
            tracing::debug!(path = %path, "navigate");
            (self.handler)(&path);
            next = self.pending.borrow_mut().pop_front();
        }
        self.state.set(RouterState::Idle);
    }
}

/// Turns link clicks and history traversal into navigations
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use slingshot_core::env::EventTarget;
/// use slingshot_core::router::{Anchor, ClickEvent, History, Router};
///
/// let document = EventTarget::new();
/// let history = History::new("app://demo", "/");
/// let visited = Rc::new(RefCell::new(Vec::new()));
///
/// let sink = Rc::clone(&visited);
/// let _router = Router::install(&document, &history, move |path| {
///     sink.borrow_mut().push(path.to_string());
/// });
///
/// let click = ClickEvent::on(Anchor::new("/about"));
/// document.emit(&click);
///
/// assert!(click.default_prevented());
/// assert_eq!(*visited.borrow(), vec!["/", "/about"]);
/// ```
pub struct Router {
    inner: Rc<RouterInner>,
    document: EventTarget<ClickEvent>,
    history: History,
    click_listener: Option<ListenerId>,
    pop_state_listener: Option<ListenerId>,
}

impl Router {
    /// Install the click interceptor and pop-state listener
    ///
    /// `handler` is called once right away with the current location, then on
    /// every navigation.
    pub fn install<F>(document: &EventTarget<ClickEvent>, history: &History, handler: F) -> Self
    where
        F: Fn(&str) + 'static,
    {
        let inner = Rc::new(RouterInner {
            handler: Box::new(handler),
            state: Cell::new(RouterState::Idle),
            pending: RefCell::new(VecDeque::new()),
        });

        let weak: Weak<RouterInner> = Rc::downgrade(&inner);
        let click_history = history.clone();
        let click_listener = document.listen(move |event: &ClickEvent| {
            let Some(router) = weak.upgrade() else {
                return;
            };
            let Some(href) = event.internal_href() else {
                return;
            };
            let Some(location) = click_history.resolve(href) else {
                return;
            };
            event.prevent_default();
            if location == click_history.location() {
                return;
            }
            let path = location.decoded_path();
            click_history.push(location);
            router.navigate(path);
        });

        let weak = Rc::downgrade(&inner);
        let pop_state_listener = history.on_pop_state(move |location| {
            if let Some(router) = weak.upgrade() {
                router.navigate(location.decoded_path());
            }
        });

        inner.navigate(history.location().decoded_path());

        Self {
            inner,
            document: document.clone(),
            history: history.clone(),
            click_listener: Some(click_listener),
            pop_state_listener: Some(pop_state_listener),
        }
    }

    /// Navigate programmatically, as if an internal link to `href` was clicked
    ///
    /// Returns `false` if `href` is on another origin.
    pub fn navigate(&self, href: &str) -> bool {
        let Some(location) = self.history.resolve(href) else {
            return false;
        };
        if location != self.history.location() {
            let path = location.decoded_path();
            self.history.push(location);
            self.inner.navigate(path);
        }
        true
    }

    /// Whether both listeners are still installed
    pub fn is_installed(&self) -> bool {
        self.click_listener.is_some()
    }

    /// Remove both listeners; later calls are no-ops
    pub fn dispose(&mut self) {
        if let Some(id) = self.click_listener.take() {
            self.document.unlisten(id);
        }
        if let Some(id) = self.pop_state_listener.take() {
            self.history.remove_pop_state_listener(id);
        }
    }
}

impl Drop for Router {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("state", &self.inner.state.get())
            .field("installed", &self.is_installed())
            .finish()
    }
}

/// Path to page table with a mandatory fallback
///
/// Matching is exact on the decoded path, ignoring one trailing slash.
#[derive(Debug, Clone)]
pub struct Routes<P> {
    routes: Vec<(String, P)>,
    fallback: P,
}

impl<P: Clone> Routes<P> {
    /// Create an empty table that resolves everything to `fallback`
    pub fn new(fallback: P) -> Self {
        Self {
            routes: Vec::new(),
            fallback,
        }
    }

    /// Add a route
    pub fn route(mut self, path: &str, page: P) -> Self {
        self.routes.push((normalize(path).to_string(), page));
        self
    }

    /// Page for `path`, or the fallback
    pub fn resolve(&self, path: &str) -> P {
        let path = normalize(path);
        self.routes
            .iter()
            .find(|(route, _)| route == path)
            .map(|(_, page)| page.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub fn fallback(&self) -> &P {
        &self.fallback
    }
}

fn normalize(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

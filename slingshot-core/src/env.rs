//! Host environment primitives
//!
//! The router and the watchers never talk to a platform directly. They listen
//! on these small single-threaded observables, and the host (a terminal event
//! loop, a test) feeds them.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::router::{ClickEvent, History};

/// Identifies a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Rc<dyn Fn(&E)>;

struct TargetInner<E> {
    listeners: RefCell<Vec<(ListenerId, Listener<E>)>>,
    next_id: Cell<u64>,
}

/// A list of listeners that receive every emitted event
///
/// Cloning yields another handle to the same list.
pub struct EventTarget<E> {
    inner: Rc<TargetInner<E>>,
}

impl<E> Clone for EventTarget<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for EventTarget<E> {
    fn default() -> Self {
        Self {
            inner: Rc::new(TargetInner {
                listeners: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }
}

impl<E> fmt::Debug for EventTarget<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTarget")
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

impl<E: 'static> EventTarget<E> {
    /// Create an empty target
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn listen<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&E) + 'static,
    {
        let id = ListenerId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener; returns `false` if it was not registered
    pub fn unlisten(&self, id: ListenerId) -> bool {
        let removed = {
            let mut listeners = self.inner.listeners.borrow_mut();
            listeners
                .iter()
                .position(|(listener_id, _)| *listener_id == id)
                .map(|pos| listeners.remove(pos))
        };
        // Dropped outside the borrow: the listener may own a router or watcher
        // installed on this target
        removed.is_some()
    }

    /// Deliver an event to every listener
    ///
    /// Listeners removed while the event is being delivered are not called
    /// afterwards; listeners added meanwhile wait for the next event.
    pub fn emit(&self, event: &E) {
        let round: Vec<(ListenerId, Listener<E>)> = self.inner.listeners.borrow().clone();
        for (id, listener) in round {
            let registered = self
                .inner
                .listeners
                .borrow()
                .iter()
                .any(|(listener_id, _)| *listener_id == id);
            if registered {
                listener(event);
            }
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }
}

/// A platform value plus a stream of reports about it
///
/// [`set`](Observable::set) stores the value and reports it to listeners even
/// when it did not change; platforms do repeat themselves, and deduplication is
/// the watcher's job.
pub struct Observable<T> {
    value: Rc<RefCell<T>>,
    reports: EventTarget<T>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            reports: self.reports.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.value.borrow())
            .field("listeners", &self.reports.inner.listeners.borrow().len())
            .finish()
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Create an observable holding `value`
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            reports: EventTarget::new(),
        }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Store a new value and report it
    pub fn set(&self, value: T) {
        *self.value.borrow_mut() = value.clone();
        self.reports.emit(&value);
    }

    /// Register a listener for reports
    pub fn listen<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + 'static,
    {
        self.reports.listen(listener)
    }

    /// Remove a listener; returns `false` if it was not registered
    pub fn unlisten(&self, id: ListenerId) -> bool {
        self.reports.unlisten(id)
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.reports.listener_count()
    }
}

/// Everything the shell observes from its host
///
/// - `document`: clicks anywhere on the rendered page
/// - `history`: session history and its pop-state events
/// - `online`: network connectivity as reported by the host
/// - `viewport_width`: viewport width in logical pixels
#[derive(Debug, Clone)]
pub struct Environment {
    pub document: EventTarget<ClickEvent>,
    pub history: History,
    pub online: Observable<bool>,
    pub viewport_width: Observable<u32>,
}

impl Environment {
    /// Create an environment at `initial_path` on `origin`
    pub fn new(origin: &str, initial_path: &str, online: bool, viewport_width: u32) -> Self {
        Self {
            document: EventTarget::new(),
            history: History::new(origin, initial_path),
            online: Observable::new(online),
            viewport_width: Observable::new(viewport_width),
        }
    }
}

//! Connect adapter: subscribe view components to slices of the store
//!
//! A connected component never sees the store itself. It implements
//! [`StateChanged`] and copies what it needs into its own fields, usually
//! [`Slice`]s, whose change detection decides whether a re-render is due.
//!
//! ```
//! use std::rc::Rc;
//! use slingshot_core::{connect_with, Action, Slice, StateChanged, Store};
//!
//! #[derive(Clone, Debug)]
//! struct Toggle;
//!
//! impl Action for Toggle {
//!     fn name(&self) -> &'static str {
//!         "Toggle"
//!     }
//! }
//!
//! #[derive(Clone, Default)]
//! struct AppState {
//!     offline: bool,
//!     clicks: u32,
//! }
//!
//! fn reducer(state: &Rc<AppState>, _: Toggle) -> Rc<AppState> {
//!     Rc::new(AppState { clicks: state.clicks + 1, ..(**state).clone() })
//! }
//!
//! #[derive(Default)]
//! struct Badge {
//!     offline: Slice<bool>,
//! }
//!
//! impl StateChanged<bool> for Badge {
//!     fn on_state_changed(&mut self, offline: &bool) {
//!         self.offline.set(*offline);
//!     }
//! }
//!
//! let store = Store::new(AppState::default(), reducer);
//! let make_badge = connect_with(Badge::default, &store, |state: &AppState| state.offline);
//! let badge = make_badge();
//! badge.component_mut().offline.mark_clean();
//!
//! store.dispatch(Toggle);
//! // `clicks` changed, `offline` did not: nothing to re-render
//! assert!(!badge.component().offline.is_dirty());
//! ```

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::store::{Store, Subscription};
use crate::Action;

/// Hook a connected component implements to receive state
///
/// `T` is either the whole state tree ([`connect`]) or the value a selector
/// derives from it ([`connect_with`]). The component must only read from it.
pub trait StateChanged<T: ?Sized> {
    /// Called once on attach and again after every store update
    fn on_state_changed(&mut self, state: &T);
}

type Deliver<C, S> = Rc<dyn Fn(&mut C, &S)>;

/// A component wired to a store for as long as it is attached
///
/// - [`attach`](Connected::attach) subscribes and immediately delivers the
///   current state once, so the component never renders stale fields.
/// - Every later store update is delivered again.
/// - [`detach`](Connected::detach) releases the subscription; dropping the
///   wrapper detaches too.
pub struct Connected<C, S, A: Action> {
    component: Rc<RefCell<C>>,
    store: Store<S, A>,
    deliver: Deliver<C, S>,
    subscription: Option<Subscription>,
}

impl<C: 'static, S: 'static, A: Action> Connected<C, S, A> {
    /// Wrap a component whose hook takes the whole state tree
    ///
    /// The wrapper starts detached.
    pub fn new(component: C, store: &Store<S, A>) -> Self
    where
        C: StateChanged<S>,
    {
        Self::with_deliver(
            component,
            store,
            Rc::new(|component: &mut C, state: &S| component.on_state_changed(state)),
        )
    }

    /// Wrap a component that only receives `selector(state)`
    ///
    /// The wrapper starts detached.
    pub fn with_selector<T, F>(component: C, store: &Store<S, A>, selector: F) -> Self
    where
        C: StateChanged<T>,
        T: 'static,
        F: Fn(&S) -> T + 'static,
    {
        Self::with_deliver(
            component,
            store,
            Rc::new(move |component: &mut C, state: &S| {
                let slice = selector(state);
                component.on_state_changed(&slice);
            }),
        )
    }

    fn with_deliver(component: C, store: &Store<S, A>, deliver: Deliver<C, S>) -> Self {
        Self {
            component: Rc::new(RefCell::new(component)),
            store: store.clone(),
            deliver,
            subscription: None,
        }
    }

    /// Subscribe to the store and deliver the current state once
    ///
    /// No-op if already attached.
    pub fn attach(&mut self) {
        if self.subscription.is_some() {
            return;
        }

        let component = Rc::clone(&self.component);
        let deliver = Rc::clone(&self.deliver);
        self.subscription = Some(self.store.subscribe(move |state| {
            match component.try_borrow_mut() {
                Ok(mut component) => deliver(&mut *component, state.as_ref()),
                Err(_) => tracing::warn!(
                    component = std::any::type_name::<C>(),
                    "Component borrowed during store notification, update skipped"
                ),
            }
        }));

        let state = self.store.state();
        (self.deliver)(&mut *self.component.borrow_mut(), state.as_ref());
    }

    /// Release the subscription
    ///
    /// No-op if not attached.
    pub fn detach(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }

    /// Whether the component is currently subscribed
    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Borrow the wrapped component
    ///
    /// Do not hold the borrow across a dispatch: the notification needs to
    /// borrow the component mutably.
    pub fn component(&self) -> Ref<'_, C> {
        self.component.borrow()
    }

    /// Mutably borrow the wrapped component
    pub fn component_mut(&self) -> RefMut<'_, C> {
        self.component.borrow_mut()
    }
}

impl<C, S, A: Action> Drop for Connected<C, S, A> {
    fn drop(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl<C, S, A: Action> fmt::Debug for Connected<C, S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connected")
            .field("component", &std::any::type_name::<C>())
            .field("attached", &self.subscription.is_some())
            .finish()
    }
}

/// Enhance a component factory so every instance comes out attached
///
/// The hook receives the whole state tree.
pub fn connect<C, S, A, F>(factory: F, store: &Store<S, A>) -> impl Fn() -> Connected<C, S, A>
where
    C: StateChanged<S> + 'static,
    S: 'static,
    A: Action,
    F: Fn() -> C,
{
    let store = store.clone();
    move || {
        let mut connected = Connected::new(factory(), &store);
        connected.attach();
        connected
    }
}

/// Like [`connect`], but each instance only receives `selector(state)`
pub fn connect_with<C, T, S, A, F, Sel>(
    factory: F,
    store: &Store<S, A>,
    selector: Sel,
) -> impl Fn() -> Connected<C, S, A>
where
    C: StateChanged<T> + 'static,
    T: 'static,
    S: 'static,
    A: Action,
    F: Fn() -> C,
    Sel: Fn(&S) -> T + Clone + 'static,
{
    let store = store.clone();
    move || {
        let mut connected = Connected::with_selector(factory(), &store, selector.clone());
        connected.attach();
        connected
    }
}

/// Whether a derived value differs from its previous value
pub fn slice_changed<T: PartialEq + ?Sized>(prev: &T, next: &T) -> bool {
    prev != next
}

/// A render-triggering field with explicit change detection
///
/// Starts empty. [`set`](Slice::set) stores the value and marks the slice dirty
/// only if it differs from what was there; the view re-renders when any of its
/// slices is dirty and then calls [`mark_clean`](Slice::mark_clean).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slice<T> {
    value: Option<T>,
    dirty: bool,
}

impl<T> Default for Slice<T> {
    fn default() -> Self {
        Self {
            value: None,
            dirty: false,
        }
    }
}

impl<T: PartialEq> Slice<T> {
    /// Create an empty slice
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a derived value; returns `true` if it changed
    pub fn set(&mut self, value: T) -> bool {
        let changed = self
            .value
            .as_ref()
            .is_none_or(|prev| slice_changed(prev, &value));
        if changed {
            self.value = Some(value);
            self.dirty = true;
        }
        changed
    }

    /// Current value, `None` before the first delivery
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Whether the value changed since the last [`mark_clean`](Slice::mark_clean)
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Acknowledge the change (after rendering it)
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

impl<T: PartialEq + Copy + Default> Slice<T> {
    /// Current value, or `T::default()` before the first delivery
    pub fn value(&self) -> T {
        self.value.unwrap_or_default()
    }
}

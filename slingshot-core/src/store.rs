//! Centralized state store with reducer pattern and synchronous subscriptions

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::Action;

/// A reducer computes the next snapshot from the current one and an action
///
/// Return `Rc::clone(state)` when the action changes nothing: the store treats a
/// pointer-equal result as "unchanged" and notifies nobody. Any other result
/// becomes the new snapshot, so a reducer must never mutate the snapshot it was
/// given.
pub type Reducer<S, A> = fn(&Rc<S>, A) -> Rc<S>;

/// Identifies one registered subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

struct Subscriber<S> {
    id: SubscriberId,
    active: Cell<bool>,
    callback: Box<dyn Fn(&Rc<S>)>,
}

trait SubscriberList {
    fn remove(&self, id: SubscriberId) -> bool;
    fn contains(&self, id: SubscriberId) -> bool;
}

struct StoreInner<S, A: Action> {
    state: RefCell<Rc<S>>,
    reducer: Reducer<S, A>,
    subscribers: RefCell<Vec<Rc<Subscriber<S>>>>,
    next_id: Cell<u64>,
    middleware: RefCell<Vec<Box<dyn Middleware<A>>>>,
    pending: RefCell<VecDeque<A>>,
    dispatching: Cell<bool>,
}

impl<S, A: Action> SubscriberList for StoreInner<S, A> {
    fn remove(&self, id: SubscriberId) -> bool {
        let removed = {
            let mut subscribers = self.subscribers.borrow_mut();
            subscribers
                .iter()
                .position(|sub| sub.id == id)
                .map(|pos| subscribers.remove(pos))
        };
        // Dropped outside the borrow: the callback may own handles that
        // unsubscribe from this store
        match removed {
            Some(sub) => {
                // The current notification round may still hold this entry
                sub.active.set(false);
                true
            }
            None => false,
        }
    }

    fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.borrow().iter().any(|sub| sub.id == id)
    }
}

/// Centralized state store with Redux-like reducer pattern
///
/// The store owns the canonical snapshot (`Rc<S>`) and is the only place where
/// it gets replaced. `Store` is a cheap handle: clone it and hand the clone to
/// every integrator or connected component that needs it. There is no global
/// instance, so tests can build as many independent stores as they like.
///
/// The store is single-threaded (`!Send`). Dispatch runs to completion before
/// any subscriber sees the new snapshot, and a dispatch issued while another
/// one is still notifying is queued and applied afterwards, in order.
///
/// # Example
/// ```
/// use std::rc::Rc;
/// use slingshot_core::{Action, Store};
///
/// #[derive(Clone, Debug)]
/// enum CounterAction {
///     Increment,
///     Ignored,
/// }
///
/// impl Action for CounterAction {
///     fn name(&self) -> &'static str {
///         match self {
///             CounterAction::Increment => "Increment",
///             CounterAction::Ignored => "Ignored",
///         }
///     }
/// }
///
/// fn reducer(state: &Rc<i32>, action: CounterAction) -> Rc<i32> {
///     match action {
///         CounterAction::Increment => Rc::new(**state + 1),
///         CounterAction::Ignored => Rc::clone(state),
///     }
/// }
///
/// let store = Store::new(0, reducer);
/// let _sub = store.subscribe(|state| assert_eq!(**state, 1));
/// store.dispatch(CounterAction::Increment);
/// store.dispatch(CounterAction::Ignored); // no notification
/// assert_eq!(*store.state(), 1);
/// ```
pub struct Store<S, A: Action> {
    inner: Rc<StoreInner<S, A>>,
}

impl<S, A: Action> Clone for Store<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, A: Action> fmt::Debug for Store<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .field("middleware", &self.inner.middleware.borrow().len())
            .field("dispatching", &self.inner.dispatching.get())
            .finish()
    }
}

impl<S: 'static, A: Action> Store<S, A> {
    /// Create a new store with initial state and reducer
    pub fn new(state: S, reducer: Reducer<S, A>) -> Self {
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(Rc::new(state)),
                reducer,
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                middleware: RefCell::new(Vec::new()),
                pending: RefCell::new(VecDeque::new()),
                dispatching: Cell::new(false),
            }),
        }
    }

    /// Add a middleware and return the store (builder style)
    pub fn with_middleware<M: Middleware<A> + 'static>(self, middleware: M) -> Self {
        self.add_middleware(middleware);
        self
    }

    /// Add a middleware
    ///
    /// `before` hooks run in insertion order, `after` hooks in reverse.
    pub fn add_middleware<M: Middleware<A> + 'static>(&self, middleware: M) {
        self.inner.middleware.borrow_mut().push(Box::new(middleware));
    }

    /// Get the current snapshot
    pub fn state(&self) -> Rc<S> {
        Rc::clone(&self.inner.state.borrow())
    }

    /// Dispatch an action to the store
    ///
    /// If the reducer returns a new snapshot, every subscriber registered at
    /// that moment is called with it, in subscription order. If it returns the
    /// current snapshot, nothing is notified.
    ///
    /// Called from inside a notification (a subscriber, or a router or watcher
    /// callback reacting to one), the action is queued and applied once the
    /// running round has finished.
    pub fn dispatch(&self, action: A) {
        if self.inner.dispatching.get() {
            tracing::trace!(action = %action.name(), "Queueing action behind running dispatch");
            self.inner.pending.borrow_mut().push_back(action);
            return;
        }

        let _guard = DispatchGuard::enter(&self.inner.dispatching);
        let mut next = Some(action);
        while let Some(action) = next {
            self.apply(action);
            next = self.inner.pending.borrow_mut().pop_front();
        }
    }

    fn apply(&self, action: A) {
        for middleware in self.inner.middleware.borrow_mut().iter_mut() {
            middleware.before(&action);
        }

        let current = self.state();
        let next = (self.inner.reducer)(&current, action.clone());
        let changed = !Rc::ptr_eq(&current, &next);
        if changed {
            *self.inner.state.borrow_mut() = Rc::clone(&next);
        }

        for middleware in self.inner.middleware.borrow_mut().iter_mut().rev() {
            middleware.after(&action, changed);
        }

        if changed {
            self.notify(&next);
        }
    }

    fn notify(&self, state: &Rc<S>) {
        // Iterate over a copy so callbacks may subscribe or unsubscribe freely
        let round: Vec<Rc<Subscriber<S>>> = self.inner.subscribers.borrow().clone();
        for subscriber in round {
            if subscriber.active.get() {
                (subscriber.callback)(state);
            }
        }
    }

    /// Register a callback invoked with every new snapshot
    ///
    /// The callback is not called with the current snapshot; read
    /// [`Store::state`] for that. Dropping the returned [`Subscription`]
    /// unsubscribes.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Rc<S>) + 'static,
    {
        let id = SubscriberId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);

        self.inner.subscribers.borrow_mut().push(Rc::new(Subscriber {
            id,
            active: Cell::new(true),
            callback: Box::new(callback),
        }));

        let inner: Rc<dyn SubscriberList> = self.inner.clone();
        Subscription {
            id,
            list: Some(Rc::downgrade(&inner)),
        }
    }

    /// Remove a subscriber by id
    ///
    /// Returns `false` if no such subscriber is registered (already removed, or
    /// never subscribed to this store).
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.inner.remove(id)
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }
}

struct DispatchGuard<'a>(&'a Cell<bool>);

impl<'a> DispatchGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Handle to a store subscription
///
/// Owned by whoever subscribed. [`Subscription::unsubscribe`] removes the
/// callback; calling it again is a no-op. Dropping the handle unsubscribes, so
/// a subscription cannot outlive its owner.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: SubscriberId,
    list: Option<Weak<dyn SubscriberList>>,
}

impl Subscription {
    /// The subscriber id inside the store
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Whether the callback is still registered with a live store
    ///
    /// Turns `false` after [`Subscription::unsubscribe`], after
    /// [`Store::unsubscribe`] with this id, and once the store is gone.
    pub fn is_active(&self) -> bool {
        self.list
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some_and(|list| list.contains(self.id))
    }

    /// Remove the callback from the store
    pub fn unsubscribe(&mut self) {
        if let Some(list) = self.list.take().and_then(|weak| weak.upgrade()) {
            list.remove(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Middleware trait for intercepting actions
///
/// Implement this trait to add logging, recording, or other cross-cutting
/// concerns to the store. Middleware observes; it cannot alter or swallow
/// actions.
pub trait Middleware<A: Action> {
    /// Called before the action is passed to the reducer
    fn before(&mut self, action: &A);

    /// Called after the reducer ran, before subscribers are notified
    fn after(&mut self, action: &A, state_changed: bool);
}

/// Middleware that logs dispatches through `tracing`
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    /// Whether to log before dispatch
    pub log_before: bool,
    /// Whether to log after dispatch
    pub log_after: bool,
}

impl LoggingMiddleware {
    /// Create a new logging middleware with default settings (log after only)
    pub fn new() -> Self {
        Self {
            log_before: false,
            log_after: true,
        }
    }

    /// Create a logging middleware that logs both before and after
    pub fn verbose() -> Self {
        Self {
            log_before: true,
            log_after: true,
        }
    }
}

impl<A: Action> Middleware<A> for LoggingMiddleware {
    fn before(&mut self, action: &A) {
        if self.log_before && action.loggable() {
            tracing::debug!(action = %action.name(), "Dispatching action");
        }
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        if self.log_after && action.loggable() {
            tracing::debug!(
                action = %action.name(),
                state_changed = state_changed,
                "Action processed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Default)]
    struct TestState {
        counter: i32,
    }

    #[derive(Clone, Debug)]
    enum TestAction {
        Increment,
        Decrement,
        NoOp,
    }

    impl Action for TestAction {
        fn name(&self) -> &'static str {
            match self {
                TestAction::Increment => "Increment",
                TestAction::Decrement => "Decrement",
                TestAction::NoOp => "NoOp",
            }
        }
    }

    fn test_reducer(state: &Rc<TestState>, action: TestAction) -> Rc<TestState> {
        match action {
            TestAction::Increment => Rc::new(TestState {
                counter: state.counter + 1,
            }),
            TestAction::Decrement => Rc::new(TestState {
                counter: state.counter - 1,
            }),
            TestAction::NoOp => Rc::clone(state),
        }
    }

    fn counting_subscriber(
        store: &Store<TestState, TestAction>,
    ) -> (Subscription, Rc<RefCell<Vec<i32>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let sub = store.subscribe(move |state| sink.borrow_mut().push(state.counter));
        (sub, seen)
    }

    #[test]
    fn test_store_dispatch() {
        let store = Store::new(TestState::default(), test_reducer);

        store.dispatch(TestAction::Increment);
        assert_eq!(store.state().counter, 1);

        store.dispatch(TestAction::Increment);
        assert_eq!(store.state().counter, 2);

        store.dispatch(TestAction::Decrement);
        assert_eq!(store.state().counter, 1);
    }

    #[test]
    fn test_dispatch_replaces_snapshot() {
        let store = Store::new(TestState::default(), test_reducer);
        let before = store.state();

        store.dispatch(TestAction::Increment);

        let after = store.state();
        assert!(!Rc::ptr_eq(&before, &after));
        assert_eq!(before.counter, 0, "old snapshot must be left untouched");
    }

    #[test]
    fn test_store_noop_is_silent() {
        let store = Store::new(TestState::default(), test_reducer);
        let (_sub, seen) = counting_subscriber(&store);
        let before = store.state();

        store.dispatch(TestAction::NoOp);

        assert!(Rc::ptr_eq(&before, &store.state()));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_subscribers_notified_in_order() {
        let store = Store::new(TestState::default(), test_reducer);
        let order = Rc::new(RefCell::new(Vec::new()));

        let subs: Vec<Subscription> = (0..3)
            .map(|i| {
                let order = Rc::clone(&order);
                store.subscribe(move |_| order.borrow_mut().push(i))
            })
            .collect();

        store.dispatch(TestAction::Increment);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        drop(subs);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let store = Store::new(TestState::default(), test_reducer);
        let (mut sub, seen) = counting_subscriber(&store);
        let (_other, other_seen) = counting_subscriber(&store);

        store.dispatch(TestAction::Increment);
        sub.unsubscribe();
        sub.unsubscribe();
        store.dispatch(TestAction::Increment);

        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(*other_seen.borrow(), vec![1, 2]);
        assert_eq!(store.subscriber_count(), 1);
        assert!(!sub.is_active());
    }

    #[test]
    fn test_unsubscribe_unknown_id_is_noop() {
        let store = Store::new(TestState::default(), test_reducer);
        let other = Store::new(TestState::default(), test_reducer);
        let foreign = other.subscribe(|_| {});

        assert!(!store.unsubscribe(foreign.id()));
        assert_eq!(other.subscriber_count(), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let store = Store::new(TestState::default(), test_reducer);
        {
            let _sub = store.subscribe(|_| {});
            assert_eq!(store.subscriber_count(), 1);
        }
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_store() {
        let store = Store::new(TestState::default(), test_reducer);
        let mut sub = store.subscribe(|_| {});
        drop(store);

        assert!(!sub.is_active());
        sub.unsubscribe();
    }

    #[test]
    fn test_unsubscribing_callback_that_owns_a_subscription() {
        let store = Store::new(TestState::default(), test_reducer);
        let inner = store.subscribe(|_| {});
        let mut outer = store.subscribe(move |_| {
            let _keep = &inner;
        });
        assert_eq!(store.subscriber_count(), 2);

        outer.unsubscribe();

        assert_eq!(store.subscriber_count(), 0);
        assert!(!outer.is_active());
    }

    #[test]
    fn test_is_active_after_unsubscribe_by_id() {
        let store = Store::new(TestState::default(), test_reducer);
        let sub = store.subscribe(|_| {});
        assert!(sub.is_active());

        assert!(store.unsubscribe(sub.id()));

        assert!(!sub.is_active());
    }

    #[test]
    fn test_unsubscribe_during_notification() {
        let store = Store::new(TestState::default(), test_reducer);
        let seen = Rc::new(RefCell::new(Vec::new()));

        // The first subscriber removes the second one mid-round
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let victim_handle = Rc::clone(&victim);
        let first_seen = Rc::clone(&seen);
        let _first = store.subscribe(move |_| {
            first_seen.borrow_mut().push("first");
            if let Some(mut sub) = victim_handle.borrow_mut().take() {
                sub.unsubscribe();
            }
        });
        let second_seen = Rc::clone(&seen);
        *victim.borrow_mut() = Some(store.subscribe(move |_| {
            second_seen.borrow_mut().push("second");
        }));
        let third_seen = Rc::clone(&seen);
        let _third = store.subscribe(move |_| third_seen.borrow_mut().push("third"));

        store.dispatch(TestAction::Increment);
        store.dispatch(TestAction::Increment);

        assert_eq!(*seen.borrow(), vec!["first", "third", "first", "third"]);
    }

    #[test]
    fn test_subscriber_unsubscribing_itself() {
        let store = Store::new(TestState::default(), test_reducer);
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(Cell::new(0));

        let own_slot = Rc::clone(&slot);
        let own_calls = Rc::clone(&calls);
        *slot.borrow_mut() = Some(store.subscribe(move |_| {
            own_calls.set(own_calls.get() + 1);
            // Take the handle out first so the drop happens outside the borrow
            let handle = own_slot.borrow_mut().take();
            drop(handle);
        }));
        let (_other, other_seen) = counting_subscriber(&store);

        store.dispatch(TestAction::Increment);
        store.dispatch(TestAction::Increment);

        assert_eq!(calls.get(), 1);
        assert_eq!(*other_seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_nested_dispatch_is_queued() {
        let store = Store::new(TestState::default(), test_reducer);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let handle = store.clone();
        let first_seen = Rc::clone(&seen);
        let _first = store.subscribe(move |state| {
            first_seen.borrow_mut().push(("first", state.counter));
            if state.counter == 1 {
                handle.dispatch(TestAction::Increment);
            }
        });
        let second_seen = Rc::clone(&seen);
        let _second = store.subscribe(move |state| {
            second_seen.borrow_mut().push(("second", state.counter));
        });

        store.dispatch(TestAction::Increment);

        // Both subscribers see 1 before anyone sees 2
        assert_eq!(
            *seen.borrow(),
            vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
        );
        assert_eq!(store.state().counter, 2);
    }

    #[test]
    fn test_subscriber_added_mid_round_waits_for_next() {
        let store = Store::new(TestState::default(), test_reducer);
        let late: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));
        let late_calls = Rc::new(Cell::new(0));

        let handle = store.clone();
        let late_slot = Rc::clone(&late);
        let counter = Rc::clone(&late_calls);
        let _adder = store.subscribe(move |_| {
            let counter = Rc::clone(&counter);
            let sub = handle.subscribe(move |_| counter.set(counter.get() + 1));
            late_slot.borrow_mut().push(sub);
        });

        store.dispatch(TestAction::Increment);
        assert_eq!(late_calls.get(), 0);

        store.dispatch(TestAction::Increment);
        assert_eq!(late_calls.get(), 1);
    }

    #[derive(Default)]
    struct CountingMiddleware {
        before_count: Rc<Cell<usize>>,
        changed: Rc<RefCell<Vec<bool>>>,
    }

    impl<A: Action> Middleware<A> for CountingMiddleware {
        fn before(&mut self, _action: &A) {
            self.before_count.set(self.before_count.get() + 1);
        }

        fn after(&mut self, _action: &A, state_changed: bool) {
            self.changed.borrow_mut().push(state_changed);
        }
    }

    #[test]
    fn test_store_with_middleware() {
        let middleware = CountingMiddleware::default();
        let before_count = Rc::clone(&middleware.before_count);
        let changed = Rc::clone(&middleware.changed);
        let store = Store::new(TestState::default(), test_reducer).with_middleware(middleware);

        store.dispatch(TestAction::Increment);
        store.dispatch(TestAction::NoOp);

        assert_eq!(before_count.get(), 2);
        assert_eq!(*changed.borrow(), vec![true, false]);
        assert_eq!(store.state().counter, 1);
    }
}

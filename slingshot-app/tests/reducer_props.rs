//! Store properties over arbitrary action sequences

use std::cell::Cell;
use std::rc::Rc;

use proptest::prelude::*;
use slingshot::Store;
use slingshot_app::action::*;
use slingshot_app::reducer::reducer;
use slingshot_app::state::{AppState, Page};

fn path() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/".to_string()),
        Just("/home".to_string()),
        Just("/home/".to_string()),
        "/[a-z]{1,8}",
    ]
}

fn action() -> impl Strategy<Value = AppAction> {
    prop_oneof![
        path().prop_map(navigate),
        any::<bool>().prop_map(update_offline),
        any::<bool>().prop_map(update_drawer_state),
        any::<bool>().prop_map(update_layout),
        Just(open_snackbar()),
        Just(close_snackbar()),
        Just(AppAction::Quit),
    ]
}

proptest! {
    #[test]
    fn state_equals_reducer_fold(actions in prop::collection::vec(action(), 0..40)) {
        let store = Store::new(AppState::default(), reducer);
        for action in actions.clone() {
            store.dispatch(action);
        }

        let folded = actions
            .into_iter()
            .fold(Rc::new(AppState::default()), |state, action| reducer(&state, action));

        let state = store.state();
        prop_assert_eq!(&*state, &*folded);
    }

    #[test]
    fn notifications_match_changes(actions in prop::collection::vec(action(), 0..40)) {
        let store = Store::new(AppState::default(), reducer);
        let notified = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&notified);
        let _sub = store.subscribe(move |_| counter.set(counter.get() + 1));

        let mut expected = 0;
        for action in actions {
            let before = store.state();
            store.dispatch(action);
            let after = store.state();
            if !Rc::ptr_eq(&before, &after) {
                expected += 1;
                prop_assert_ne!(&*before, &*after);
            }
        }

        prop_assert_eq!(notified.get(), expected);
    }

    #[test]
    fn page_is_always_known(paths in prop::collection::vec(path(), 1..10)) {
        let store = Store::new(AppState::default(), reducer);
        for path in paths {
            let expected = if matches!(path.as_str(), "/" | "/home" | "/home/") {
                Page::Home
            } else {
                Page::NotFound
            };
            store.dispatch(navigate(path));
            let state = store.state();
            prop_assert_eq!(state.page, expected);
            prop_assert!(!state.drawer_opened);
        }
    }
}

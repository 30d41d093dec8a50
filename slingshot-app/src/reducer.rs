//! Reducer - pure function: (snapshot, action) -> snapshot
//!
//! Returning the same `Rc` means "nothing changed": the store skips
//! notification, so every arm checks before building a new snapshot.

use std::rc::Rc;
use std::sync::LazyLock;

use slingshot::Routes;

use crate::action::AppAction;
use crate::state::{AppState, Page};

static ROUTES: LazyLock<Routes<Page>> = LazyLock::new(|| {
    Routes::new(Page::NotFound)
        .route("/", Page::Home)
        .route("/home", Page::Home)
});

/// The route table: `/` and `/home` show the home page, anything else is a 404
pub fn routes() -> &'static Routes<Page> {
    &ROUTES
}

pub fn reducer(state: &Rc<AppState>, action: AppAction) -> Rc<AppState> {
    match action {
        // Also closes the drawer, in case the navigation came from one of its links
        AppAction::Navigate { path } => {
            let page = routes().resolve(&path);
            update(state, |s| {
                s.page = page;
                s.drawer_opened = false;
            })
        }

        // The banner only opens on a genuine transition
        AppAction::UpdateOffline(offline) => {
            if state.offline == offline {
                return Rc::clone(state);
            }
            update(state, |s| {
                s.offline = offline;
                s.snackbar_opened = true;
            })
        }

        AppAction::UpdateDrawerState(opened) => update(state, |s| s.drawer_opened = opened),
        AppAction::UpdateLayout(wide) => update(state, |s| s.wide_layout = wide),
        AppAction::OpenSnackbar => update(state, |s| s.snackbar_opened = true),
        AppAction::CloseSnackbar => update(state, |s| s.snackbar_opened = false),

        AppAction::Quit => Rc::clone(state),
    }
}

/// Apply `edit` to a copy; keep the current snapshot if the copy is equal
fn update(state: &Rc<AppState>, edit: impl FnOnce(&mut AppState)) -> Rc<AppState> {
    let mut next = AppState::clone(state);
    edit(&mut next);
    if next == **state {
        Rc::clone(state)
    } else {
        Rc::new(next)
    }
}

//! Root shell: header, drawer, active page, footer and snackbar
//!
//! The shell owns the wiring between host and store:
//! 1. Router, connectivity watcher and layout watcher dispatch into the store
//! 2. The connected [`ShellView`] copies its slices and toggles the pages
//! 3. A page change writes document metadata, exactly once per change
//! 4. Key and mouse input becomes [`Intent`]s, applied after the view is
//!    released so the resulting dispatches can reach it

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use slingshot::{
    click_from_mouse, update_metadata, Anchor, Breakpoint, ClickEvent, Component, Connected,
    ConnectivityWatcher, Environment, EventKind, Keybindings, LayoutWatcher, LinkAreas, Metadata,
    MetadataDocument, Router, Slice, StateChanged, Store, Subscription, TaskKey, TaskManager,
};
use slingshot_components::{
    Header, HeaderProps, NavDrawer, NavDrawerProps, NavInput, NavLink, Snackbar, SnackbarProps,
    SnackbarStyle, DRAWER_WIDTH,
};
use tokio::sync::mpsc;

use crate::action::{
    close_snackbar, navigate, update_drawer_state, update_layout, update_offline, AppAction,
};
use crate::commands::{default_keybindings, Command};
use crate::host::viewport_width_px;
use crate::pages::{HomePage, NotFoundPage, PageView};
use crate::reducer::routes;
use crate::state::{AppState, Page};

/// Task key of the snackbar close timer
pub const SNACKBAR_TASK: &str = "snackbar";

/// Shell settings, usually built from the config file
#[derive(Debug, Clone)]
pub struct ShellOptions {
    pub app_title: String,
    pub footer: String,
    pub breakpoint: Breakpoint,
    /// Logical pixels per terminal column
    pub cell_width_px: u32,
    /// How long the snackbar stays up after a connectivity change
    pub snackbar_timeout: Duration,
    pub links: Vec<NavLink>,
    pub keybindings: Keybindings<Command>,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            app_title: "Slingshot".into(),
            footer: "PWA Slingshot".into(),
            breakpoint: Breakpoint::DEFAULT,
            cell_width_px: 8,
            snackbar_timeout: Duration::from_millis(3000),
            links: vec![NavLink::new("Home", "/home")],
            keybindings: default_keybindings(),
        }
    }
}

/// What the user asked for, resolved once the view is no longer borrowed
#[derive(Debug, Clone)]
pub enum Intent {
    Dispatch(AppAction),
    /// Follow a link as if it was clicked with the primary button
    Follow(Anchor),
    /// A mouse press on the document
    Click(ClickEvent),
    Back,
    Forward,
    Quit,
}

/// The connected part of the shell
///
/// Holds one [`Slice`] per state field and every page instance.
pub struct ShellView<D> {
    page: Slice<Page>,
    offline: Slice<bool>,
    drawer_opened: Slice<bool>,
    wide_layout: Slice<bool>,
    snackbar_opened: Slice<bool>,

    pages: Vec<Box<dyn PageView>>,
    document: D,
    app_title: String,
    footer: String,
    links: Vec<NavLink>,
    menu_hint: Option<String>,

    header: Header,
    drawer: NavDrawer,
    snackbar: Snackbar,
    snackbar_style: SnackbarStyle,
    link_areas: LinkAreas,
    /// Drawer selection moved since the last render
    selection_moved: bool,
}

impl<D: MetadataDocument> ShellView<D> {
    fn new(pages: Vec<Box<dyn PageView>>, document: D, options: &ShellOptions) -> Self {
        let menu_hint = options
            .keybindings
            .hint(Command::OpenMenu)
            .map(|key| format!("{key}: menu"));
        Self {
            page: Slice::new(),
            offline: Slice::new(),
            drawer_opened: Slice::new(),
            wide_layout: Slice::new(),
            snackbar_opened: Slice::new(),
            pages,
            document,
            app_title: options.app_title.clone(),
            footer: options.footer.clone(),
            links: options.links.clone(),
            menu_hint,
            header: Header::new(),
            drawer: NavDrawer::new(),
            snackbar: Snackbar::new(),
            snackbar_style: SnackbarStyle::default(),
            link_areas: LinkAreas::new(),
            selection_moved: false,
        }
    }

    /// The page whose view is active
    pub fn active_page(&self) -> Option<Page> {
        self.pages
            .iter()
            .find(|page| page.is_active())
            .map(|page| page.page())
    }

    /// Every page instance with its active flag
    pub fn pages(&self) -> Vec<(Page, bool)> {
        self.pages
            .iter()
            .map(|page| (page.page(), page.is_active()))
            .collect()
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn snackbar_text(&self) -> &'static str {
        if self.offline.value() {
            "You are now offline."
        } else {
            "You are now online."
        }
    }

    /// Whether the drawer is drawn on top of the content
    pub fn drawer_is_overlay(&self) -> bool {
        self.drawer_opened.value() && !self.wide_layout.value()
    }

    pub fn menu_button_visible(&self) -> bool {
        !self.wide_layout.value()
    }

    /// Links drawn in the last frame
    pub fn link_areas(&self) -> &LinkAreas {
        &self.link_areas
    }

    /// Whether any slice or the drawer selection changed since the last render
    pub fn needs_render(&self) -> bool {
        self.selection_moved
            || self.page.is_dirty()
            || self.offline.is_dirty()
            || self.drawer_opened.is_dirty()
            || self.wide_layout.is_dirty()
            || self.snackbar_opened.is_dirty()
    }

    fn mark_clean(&mut self) {
        self.selection_moved = false;
        self.page.mark_clean();
        self.offline.mark_clean();
        self.drawer_opened.mark_clean();
        self.wide_layout.mark_clean();
        self.snackbar_opened.mark_clean();
    }

    fn activate(&mut self, active: Page) {
        for page in &mut self.pages {
            page.set_active(page.page() == active);
        }
    }

    fn command(&mut self, command: Command) -> Option<Intent> {
        let wide = self.wide_layout.value();
        let input = match command {
            Command::Quit => return Some(Intent::Quit),
            Command::OpenMenu if wide => return None,
            Command::OpenMenu => return Some(Intent::Dispatch(update_drawer_state(true))),
            Command::HistoryBack => return Some(Intent::Back),
            Command::HistoryForward => return Some(Intent::Forward),
            Command::FollowPageLink => {
                return self
                    .pages
                    .iter()
                    .find(|page| page.is_active())
                    .and_then(|page| page.link())
                    .map(Intent::Follow)
            }
            Command::CloseDrawer => NavInput::Close,
            Command::NextLink => NavInput::Next,
            Command::PreviousLink => NavInput::Previous,
            Command::FollowLink => NavInput::Follow,
        };
        let props = drawer_props(
            &self.links,
            self.page.value(),
            self.drawer_opened.value(),
            wide,
        );
        let selected = self.drawer.selected();
        let intent = self.drawer.apply(input, props);
        self.selection_moved |= self.drawer.selected() != selected;
        intent
    }

    fn mouse(&mut self, mouse: &MouseEvent) -> Option<Intent> {
        let MouseEventKind::Down(button) = mouse.kind else {
            return None;
        };
        let position = Position::new(mouse.column, mouse.row);

        if self.drawer_is_overlay() {
            let inside = self
                .drawer
                .area()
                .is_some_and(|area| area.contains(position));
            if !inside {
                return Some(Intent::Dispatch(update_drawer_state(false)));
            }
        } else if button == MouseButton::Left
            && self
                .header
                .menu_button_area()
                .is_some_and(|area| area.contains(position))
        {
            return Some(Intent::Dispatch(update_drawer_state(true)));
        }

        click_from_mouse(mouse, &self.link_areas).map(Intent::Click)
    }

    fn scroll(&mut self, event: &EventKind) -> Option<Intent> {
        let props = drawer_props(
            &self.links,
            self.page.value(),
            self.drawer_opened.value(),
            self.wide_layout.value(),
        );
        let selected = self.drawer.selected();
        let intent = self.drawer.handle_event(event, props).into_iter().next();
        self.selection_moved |= self.drawer.selected() != selected;
        intent
    }

    /// Draw the whole shell and rebuild the link areas
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.link_areas.clear();
        let page = self.page.value();
        let opened = self.drawer_opened.value();
        let wide = self.wide_layout.value();

        let [header_area, body, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

        self.header.render(
            frame,
            header_area,
            HeaderProps {
                title: &self.app_title,
                show_menu_button: !wide,
                hint: self.menu_hint.as_deref(),
            },
        );

        let content = if wide {
            let [drawer_area, content] =
                Layout::horizontal([Constraint::Length(DRAWER_WIDTH), Constraint::Min(0)])
                    .areas(body);
            self.drawer.render(
                frame,
                drawer_area,
                drawer_props(&self.links, page, opened, wide),
            );
            content
        } else {
            body
        };

        for view in self.pages.iter_mut().filter(|view| view.is_active()) {
            view.render(frame, content, &mut self.link_areas);
        }

        if !wide {
            self.drawer.render(
                frame,
                NavDrawer::layout(body),
                drawer_props(&self.links, page, opened, wide),
            );
        }
        for (rect, index) in self.drawer.rendered_links() {
            if let Some(link) = self.links.get(*index) {
                self.link_areas.insert(*rect, link.anchor());
            }
        }

        frame.render_widget(
            Paragraph::new(self.footer.as_str())
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray)),
            footer_area,
        );

        let text = self.snackbar_text();
        self.snackbar.render(
            frame,
            area,
            SnackbarProps {
                text,
                opened: self.snackbar_opened.value(),
                style: &self.snackbar_style,
            },
        );

        self.mark_clean();
    }
}

impl<D: MetadataDocument> StateChanged<AppState> for ShellView<D> {
    fn on_state_changed(&mut self, state: &AppState) {
        self.offline.set(state.offline);
        self.drawer_opened.set(state.drawer_opened);
        self.wide_layout.set(state.wide_layout);
        self.snackbar_opened.set(state.snackbar_opened);

        if self.page.set(state.page) {
            self.activate(state.page);
            let title = format!("{} - {}", self.app_title, state.page);
            update_metadata(&mut self.document, &Metadata::new(title.clone(), title));
        }
    }
}

fn drawer_props(
    links: &[NavLink],
    page: Page,
    opened: bool,
    persistent: bool,
) -> NavDrawerProps<'_, Intent> {
    let active_href = links
        .iter()
        .find(|link| routes().resolve(&link.href) == page)
        .map(|link| link.href.as_str())
        .unwrap_or_default();
    NavDrawerProps {
        links,
        active_href,
        opened,
        persistent,
        on_follow: Intent::Follow,
        on_close: || Intent::Dispatch(update_drawer_state(false)),
    }
}

/// The application shell
pub struct Shell<D: MetadataDocument + 'static> {
    store: Store<AppState, AppAction>,
    env: Environment,
    view: Connected<ShellView<D>, AppState, AppAction>,
    router: Router,
    connectivity: ConnectivityWatcher,
    layout: LayoutWatcher,
    tasks: Rc<RefCell<TaskManager<AppAction>>>,
    keybindings: Keybindings<Command>,
    cell_width_px: u32,
    quit: bool,
    _snackbar_timer: Subscription,
    _state_trace: Subscription,
}

impl<D: MetadataDocument + 'static> Shell<D> {
    /// Build the shell and install its host integrations
    ///
    /// Installation dispatches right away: the router reports the initial
    /// path, and both watchers report their first sample.
    ///
    /// `timer_tx` receives actions from background timers; the owner
    /// dispatches them. Scheduling a timer needs a tokio runtime, so one must
    /// be running whenever the offline flag can change.
    pub fn new(
        store: Store<AppState, AppAction>,
        env: Environment,
        document: D,
        options: ShellOptions,
        timer_tx: mpsc::UnboundedSender<AppAction>,
    ) -> Self {
        let pages: Vec<Box<dyn PageView>> = vec![
            Box::new(HomePage::new(&store)),
            Box::new(NotFoundPage::new()),
        ];
        let mut view = Connected::new(ShellView::new(pages, document, &options), &store);
        view.attach();

        let tasks = Rc::new(RefCell::new(TaskManager::new(timer_tx)));
        let snackbar_timer = {
            let tasks = Rc::clone(&tasks);
            let timeout = options.snackbar_timeout;
            let last_offline = Cell::new(store.state().offline);
            store.subscribe(move |state: &Rc<AppState>| {
                if last_offline.replace(state.offline) != state.offline {
                    tasks
                        .borrow_mut()
                        .after(SNACKBAR_TASK, timeout, close_snackbar());
                }
            })
        };

        let state_trace = store.subscribe(|state: &Rc<AppState>| {
            if !tracing::enabled!(tracing::Level::TRACE) {
                return;
            }
            match serde_json::to_string(state.as_ref()) {
                Ok(json) => tracing::trace!(state = %json, "state replaced"),
                Err(e) => tracing::warn!(error = %e, "failed to serialize state"),
            }
        });

        let router = {
            let store = store.clone();
            Router::install(&env.document, &env.history, move |path| {
                store.dispatch(navigate(path))
            })
        };
        let connectivity = {
            let store = store.clone();
            ConnectivityWatcher::install(&env.online, move |offline| {
                store.dispatch(update_offline(offline))
            })
        };
        let layout = {
            let store = store.clone();
            LayoutWatcher::install(&env.viewport_width, options.breakpoint, move |wide| {
                store.dispatch(update_layout(wide))
            })
        };

        Self {
            store,
            env,
            view,
            router,
            connectivity,
            layout,
            tasks,
            keybindings: options.keybindings,
            cell_width_px: options.cell_width_px,
            quit: false,
            _snackbar_timer: snackbar_timer,
            _state_trace: state_trace,
        }
    }

    pub fn store(&self) -> &Store<AppState, AppAction> {
        &self.store
    }

    pub fn state(&self) -> Rc<AppState> {
        self.store.state()
    }

    pub fn dispatch(&self, action: AppAction) {
        self.store.dispatch(action);
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn view(&self) -> Ref<'_, ShellView<D>> {
        self.view.component()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Whether the user asked to quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn needs_render(&self) -> bool {
        self.view.component().needs_render()
    }

    /// Whether a snackbar close is scheduled
    pub fn snackbar_timer_pending(&self) -> bool {
        self.tasks.borrow().is_running(&TaskKey::new(SNACKBAR_TASK))
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        self.view.component_mut().render(frame, area);
    }

    /// Turn a terminal event into an intent and apply it
    ///
    /// Returns whether the screen needs a redraw.
    pub fn handle_event(&mut self, event: &EventKind) -> bool {
        if let Some(intent) = self.map_event(event) {
            self.apply(intent);
        }
        matches!(event, EventKind::Resize(..)) || self.needs_render()
    }

    fn map_event(&mut self, event: &EventKind) -> Option<Intent> {
        if event.is_interrupt() {
            return Some(Intent::Quit);
        }
        match event {
            EventKind::Key(key) => {
                let command = self.keybindings.command(*key)?;
                self.view.component_mut().command(command)
            }
            EventKind::Mouse(mouse) => self.view.component_mut().mouse(mouse),
            EventKind::Scroll { .. } => self.view.component_mut().scroll(event),
            EventKind::Resize(columns, _) => {
                self.env
                    .viewport_width
                    .set(viewport_width_px(*columns, self.cell_width_px));
                None
            }
            EventKind::Tick => None,
        }
    }

    /// Apply an intent; the view must not be borrowed
    pub fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::Dispatch(action) => self.store.dispatch(action),
            Intent::Follow(anchor) => self.env.document.emit(&ClickEvent::on(anchor)),
            Intent::Click(click) => self.env.document.emit(&click),
            Intent::Back => {
                if !self.env.history.back() {
                    tracing::debug!("no history entry to go back to");
                }
            }
            Intent::Forward => {
                if !self.env.history.forward() {
                    tracing::debug!("no history entry to go forward to");
                }
            }
            Intent::Quit => {
                self.store.dispatch(AppAction::Quit);
                self.quit = true;
            }
        }
    }

    /// Remove the router and watcher listeners from the host
    pub fn dispose(&mut self) {
        self.router.dispose();
        self.connectivity.dispose();
        self.layout.dispose();
        self.tasks.borrow_mut().cancel_all();
    }
}

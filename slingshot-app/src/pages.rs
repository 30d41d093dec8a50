//! Page views shown in the main content area
//!
//! Every page is instantiated once by the shell and toggled with
//! [`PageView::set_active`]; inactive pages stay alive but draw nothing.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use slingshot::{connect_with, Anchor, Connected, LinkAreas, Slice, StateChanged, Store};

use crate::action::AppAction;
use crate::state::{AppState, Page};

/// A page of the shell
pub trait PageView {
    /// The page this view shows
    fn page(&self) -> Page;

    fn set_active(&mut self, active: bool);

    fn is_active(&self) -> bool;

    /// Link offered inline by the page, followed with the page-link key
    fn link(&self) -> Option<Anchor> {
        None
    }

    /// Draw the page and record the screen areas of its links
    fn render(&mut self, frame: &mut Frame, area: Rect, links: &mut LinkAreas);
}

/// Everything the home page reads from the store
#[derive(Debug, Default)]
pub struct HomeContent {
    offline: Slice<bool>,
}

impl HomeContent {
    pub fn offline(&self) -> bool {
        self.offline.value()
    }

    /// Whether the slice changed since the last render
    pub fn needs_render(&self) -> bool {
        self.offline.is_dirty()
    }
}

impl StateChanged<bool> for HomeContent {
    fn on_state_changed(&mut self, offline: &bool) {
        self.offline.set(*offline);
    }
}

/// Landing page, connected to the store on its own
pub struct HomePage {
    content: Connected<HomeContent, AppState, AppAction>,
    active: bool,
}

impl HomePage {
    pub fn new(store: &Store<AppState, AppAction>) -> Self {
        let make = connect_with(HomeContent::default, store, |state: &AppState| state.offline);
        Self {
            content: make(),
            active: false,
        }
    }

    pub fn content(&self) -> std::cell::Ref<'_, HomeContent> {
        self.content.component()
    }
}

impl PageView for HomePage {
    fn page(&self) -> Page {
        Page::Home
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, _links: &mut LinkAreas) {
        if !self.active {
            return;
        }
        let mut content = self.content.component_mut();
        let (status, color) = if content.offline() {
            ("offline", Color::Yellow)
        } else {
            ("online", Color::Green)
        };

        let lines = vec![
            Line::from(Span::styled(
                "HOME",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
            Line::from(vec![
                Span::raw("Network: "),
                Span::styled(status, Style::default().fg(color)),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::NONE)),
            padded(area),
        );
        content.offline.mark_clean();
    }
}

/// Fallback page for unknown routes
#[derive(Debug, Default)]
pub struct NotFoundPage {
    active: bool,
}

impl NotFoundPage {
    pub const LINK_LABEL: &'static str = "home";

    pub fn new() -> Self {
        Self::default()
    }
}

impl PageView for NotFoundPage {
    fn page(&self) -> Page {
        Page::NotFound
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn link(&self) -> Option<Anchor> {
        Some(Anchor::new("/"))
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, links: &mut LinkAreas) {
        if !self.active {
            return;
        }
        let area = padded(area);
        let [heading, body] =
            Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);

        frame.render_widget(
            Paragraph::new(Span::styled(
                "Oops! You hit a 404",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            heading,
        );

        let intro = "The page you're looking for doesn't seem to exist. Head back ";
        let link_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::UNDERLINED);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw(intro),
                Span::styled(Self::LINK_LABEL, link_style),
                Span::raw(" and try again?"),
            ]))
            .wrap(Wrap { trim: false }),
            body,
        );

        if let (Some(rect), Some(anchor)) = (link_rect(intro, Self::LINK_LABEL, body), self.link())
        {
            links.insert(rect, anchor);
        }
    }
}

fn padded(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        width: area.width.saturating_sub(2),
        ..area
    }
}

/// Screen area of `label` when it directly follows `prefix` in a paragraph
/// wrapped to `area`
///
/// Returns `None` when the label would be split across lines or fall outside
/// the area.
fn link_rect(prefix: &str, label: &str, area: Rect) -> Option<Rect> {
    if area.width == 0 {
        return None;
    }
    let mut column = 0u16;
    let mut row = 0u16;
    for word in prefix.split_inclusive(' ') {
        let len = word.chars().count() as u16;
        if column > 0 && column + len.saturating_sub(1) > area.width {
            column = 0;
            row += 1;
        }
        column += len;
    }
    let label_len = label.chars().count() as u16;
    if column + label_len > area.width {
        column = 0;
        row += 1;
    }
    if row >= area.height || label_len > area.width {
        return None;
    }
    Some(Rect::new(area.x + column, area.y + row, label_len, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::reducer;
    use slingshot::testing::RenderHarness;

    #[test]
    fn test_home_page_reads_offline_slice() {
        let store = Store::new(AppState::default(), reducer);
        let mut home = HomePage::new(&store);
        home.set_active(true);
        assert!(!home.content().offline());

        store.dispatch(crate::action::update_offline(true));

        assert!(home.content().offline());
        assert!(home.content().needs_render());

        let mut harness = RenderHarness::new(40, 6);
        let mut links = LinkAreas::new();
        let output = harness.render_to_string_plain(|frame| {
            home.render(frame, frame.area(), &mut links);
        });
        assert!(output.contains("HOME"));
        assert!(output.contains("Network: offline"));
        assert!(!home.content().needs_render());
    }

    #[test]
    fn test_home_page_ignores_unrelated_changes() {
        let store = Store::new(AppState::default(), reducer);
        let home = HomePage::new(&store);
        home.content.component_mut().offline.mark_clean();

        store.dispatch(crate::action::update_drawer_state(true));

        assert!(!home.content().needs_render());
    }

    #[test]
    fn test_inactive_page_draws_nothing() {
        let mut page = NotFoundPage::new();
        let mut harness = RenderHarness::new(40, 6);
        let mut links = LinkAreas::new();

        let output = harness.render_to_string_plain(|frame| {
            page.render(frame, frame.area(), &mut links);
        });

        assert!(!output.contains("404"));
        assert!(links.is_empty());
    }

    #[test]
    fn test_not_found_page_records_home_link() {
        let mut page = NotFoundPage::new();
        page.set_active(true);
        let mut harness = RenderHarness::new(120, 6);
        let mut links = LinkAreas::new();

        let output = harness.render_to_string_plain(|frame| {
            page.render(frame, frame.area(), &mut links);
        });

        assert!(output.contains("Oops! You hit a 404"));
        assert_eq!(page.link(), Some(Anchor::new("/")));

        let intro_len = "The page you're looking for doesn't seem to exist. Head back ".len() as u16;
        let anchor = links.anchor_at(1 + intro_len, 2).map(|a| a.href.clone());
        assert_eq!(anchor.as_deref(), Some("/"));

        let row: String = output.lines().nth(2).unwrap_or_default().to_string();
        let start = 1 + intro_len as usize;
        assert_eq!(&row[start..start + 4], "home");
    }

    #[test]
    fn test_link_rect_wraps_label() {
        let area = Rect::new(0, 0, 10, 4);

        assert_eq!(link_rect("ab ", "home", area), Some(Rect::new(3, 0, 4, 1)));
        assert_eq!(link_rect("abcdefg ", "home", area), Some(Rect::new(0, 1, 4, 1)));
        assert_eq!(link_rect("abc ", "home", Rect::new(0, 0, 3, 4)), None);
    }
}

//! Responsive navigation drawer
//!
//! A persistent drawer is a column beside the content; an opened
//! non-persistent drawer is drawn over the content and can be closed.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
    Frame,
};
use slingshot_core::{Anchor, Component, EventKind};

/// Width of the drawer in columns, borders included
pub const DRAWER_WIDTH: u16 = 22;

/// One entry of the drawer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

impl NavLink {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }

    pub fn anchor(&self) -> Anchor {
        Anchor::new(self.href.clone())
    }
}

/// Selection and link commands the owner routes to the drawer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavInput {
    Next,
    Previous,
    Follow,
    Close,
}

/// Props for NavDrawer component
pub struct NavDrawerProps<'a, O> {
    /// Links to display
    pub links: &'a [NavLink],
    /// Href of the active page, drawn bold
    pub active_href: &'a str,
    /// Drawer is open
    pub opened: bool,
    /// Drawer stays visible regardless of `opened`
    pub persistent: bool,
    /// Output for following a link
    pub on_follow: fn(Anchor) -> O,
    /// Output for closing the drawer
    pub on_close: fn() -> O,
}

impl<O> NavDrawerProps<'_, O> {
    /// Whether the drawer is on screen
    pub fn visible(&self) -> bool {
        self.opened || self.persistent
    }
}

/// Navigation drawer with a local selection cursor
#[derive(Debug, Default)]
pub struct NavDrawer {
    selected: usize,
    area: Option<Rect>,
    link_rects: Vec<(Rect, usize)>,
}

impl NavDrawer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the highlighted link
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Screen areas of the links drawn in the last frame, with their index
    pub fn rendered_links(&self) -> &[(Rect, usize)] {
        &self.link_rects
    }

    /// Area of the drawer in the last frame, if it was drawn
    pub fn area(&self) -> Option<Rect> {
        self.area
    }

    /// Area the drawer occupies within `screen`
    ///
    /// Persistent and overlay drawers occupy the same left column.
    pub fn layout(screen: Rect) -> Rect {
        Rect {
            width: DRAWER_WIDTH.min(screen.width),
            ..screen
        }
    }

    /// Apply a command; returns an output for the owner when one is due
    pub fn apply<O>(&mut self, input: NavInput, props: NavDrawerProps<'_, O>) -> Option<O> {
        if !props.visible() || props.links.is_empty() {
            return None;
        }
        let last = props.links.len() - 1;
        match input {
            NavInput::Next => {
                self.selected = (self.selected + 1).min(last);
                None
            }
            NavInput::Previous => {
                self.selected = self.selected.saturating_sub(1).min(last);
                None
            }
            NavInput::Follow => props
                .links
                .get(self.selected.min(last))
                .map(|link| (props.on_follow)(link.anchor())),
            NavInput::Close if props.opened && !props.persistent => Some((props.on_close)()),
            NavInput::Close => None,
        }
    }
}

impl<O> Component<O> for NavDrawer {
    type Props<'a> = NavDrawerProps<'a, O>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = O> {
        let EventKind::Scroll { column, row, delta } = *event else {
            return None;
        };
        let over_drawer = self.area.is_some_and(|area| {
            column >= area.x && column < area.right() && row >= area.y && row < area.bottom()
        });
        if !over_drawer {
            return None;
        }
        let input = if delta > 0 {
            NavInput::Next
        } else {
            NavInput::Previous
        };
        self.apply(input, props)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        self.link_rects.clear();
        if !props.visible() {
            self.area = None;
            return;
        }
        self.area = Some(area);
        if let Some(last) = props.links.len().checked_sub(1) {
            self.selected = self.selected.min(last);
        }

        if !props.persistent {
            frame.render_widget(Clear, area);
        }

        let block = Block::default()
            .title(" Menu ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);

        let items: Vec<ListItem> = props
            .links
            .iter()
            .map(|link| {
                let style = if link.href == props.active_href {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(Span::styled(link.label.as_str(), style)))
            })
            .collect();

        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

        let mut state = ListState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);

        let offset = state.offset();
        for (row, index) in (offset..props.links.len()).enumerate() {
            let Ok(row) = u16::try_from(row) else {
                break;
            };
            if row >= inner.height {
                break;
            }
            self.link_rects
                .push((Rect::new(inner.x, inner.y + row, inner.width, 1), index));
        }
    }
}

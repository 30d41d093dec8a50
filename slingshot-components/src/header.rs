//! Application header with an optional menu button

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use slingshot_core::Component;

const MENU_BUTTON: &str = " ☰ ";

/// Props for Header component
pub struct HeaderProps<'a> {
    pub title: &'a str,
    /// Hidden while the drawer is persistent
    pub show_menu_button: bool,
    /// Key hint shown after the title, e.g. `m: menu`
    pub hint: Option<&'a str>,
}

/// One-row title bar
#[derive(Debug, Default)]
pub struct Header {
    menu_button: Option<Rect>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Area of the menu button in the last frame, if it was drawn
    pub fn menu_button_area(&self) -> Option<Rect> {
        self.menu_button
    }
}

impl Component<()> for Header {
    type Props<'a> = HeaderProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let bar = Style::default().bg(Color::Blue).fg(Color::White);
        let mut spans = Vec::new();

        self.menu_button = None;
        if props.show_menu_button && area.width > 0 {
            let width = (MENU_BUTTON.chars().count() as u16).min(area.width);
            self.menu_button = Some(Rect::new(area.x, area.y, width, 1.min(area.height)));
            spans.push(Span::styled(MENU_BUTTON, bar.add_modifier(Modifier::BOLD)));
        } else {
            spans.push(Span::styled(" ", bar));
        }

        spans.push(Span::styled(props.title, bar.add_modifier(Modifier::BOLD)));
        if let Some(hint) = props.hint {
            spans.push(Span::styled(format!("  {hint}"), bar.fg(Color::Gray)));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)).style(bar), area);
    }
}

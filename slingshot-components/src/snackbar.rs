//! Transient notification banner
//!
//! Drawn last, over whatever is at the bottom of the screen.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};
use slingshot_core::Component;

/// Configuration for snackbar appearance
pub struct SnackbarStyle {
    pub bg_color: Color,
    pub fg_color: Color,
}

impl Default for SnackbarStyle {
    fn default() -> Self {
        Self {
            bg_color: Color::Rgb(50, 50, 50),
            fg_color: Color::White,
        }
    }
}

/// Props for Snackbar component
pub struct SnackbarProps<'a> {
    pub text: &'a str,
    pub opened: bool,
    pub style: &'a SnackbarStyle,
}

/// Bottom-centered banner, visible while `opened`
#[derive(Debug, Default)]
pub struct Snackbar;

impl Snackbar {
    pub fn new() -> Self {
        Self
    }
}

impl Component<()> for Snackbar {
    type Props<'a> = SnackbarProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        if !props.opened || props.text.is_empty() {
            return;
        }
        let width = props.text.chars().count() as u16 + 4;
        let banner = bottom_rect(width, 3, area);
        frame.render_widget(BgFill(props.style.bg_color), banner);
        frame.render_widget(
            Paragraph::new(props.text)
                .alignment(Alignment::Center)
                .style(Style::default().fg(props.style.fg_color).bg(props.style.bg_color))
                .block(Block::default().borders(Borders::ALL)),
            banner,
        );
    }
}

/// Simple widget that fills an area with a background color
struct BgFill(Color);

impl Widget for BgFill {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for y in area.y..area.y.saturating_add(area.height) {
            for x in area.x..area.x.saturating_add(area.width) {
                buf[(x, y)].set_bg(self.0);
                buf[(x, y)].set_symbol(" ");
            }
        }
    }
}

/// A horizontally centered rectangle resting on the bottom edge of `area`
pub fn bottom_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + area.height.saturating_sub(height);
    Rect::new(x, y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use slingshot_core::testing::RenderHarness;

    #[test]
    fn test_opened_snackbar_renders_text() {
        let mut harness = RenderHarness::new(60, 12);
        let style = SnackbarStyle::default();

        let output = harness.render_to_string_plain(|frame| {
            frame.render_widget(Paragraph::new("Background content"), frame.area());
            let props = SnackbarProps {
                text: "You are now offline.",
                opened: true,
                style: &style,
            };
            Snackbar::new().render(frame, frame.area(), props);
        });

        assert!(output.contains("You are now offline."));
        assert!(output.contains("Background content"));
        let last_rows: Vec<&str> = output.lines().skip(9).collect();
        assert!(last_rows[1].contains("You are now offline."));
    }

    #[test]
    fn test_closed_snackbar_renders_nothing() {
        let mut harness = RenderHarness::new(60, 12);
        let style = SnackbarStyle::default();

        let output = harness.render_to_string_plain(|frame| {
            let props = SnackbarProps {
                text: "You are now online.",
                opened: false,
                style: &style,
            };
            Snackbar::new().render(frame, frame.area(), props);
        });

        assert!(!output.contains("online"));
    }

    #[test]
    fn test_bottom_rect() {
        let area = Rect::new(0, 0, 80, 24);
        let rect = bottom_rect(40, 3, area);

        assert_eq!(rect, Rect::new(20, 21, 40, 3));
    }

    #[test]
    fn test_bottom_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 30, 2);
        let rect = bottom_rect(100, 3, area);

        assert!(rect.width <= 28);
        assert_eq!(rect.height, 2);
        assert_eq!(rect.y, 0);
    }
}

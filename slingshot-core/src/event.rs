//! Terminal events and link hit-testing

use crossterm::event::{KeyEvent, KeyModifiers, MouseButton as TermButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::router::{Anchor, ClickEvent, Modifiers, MouseButton};

/// Terminal event after raw processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Key press or repeat
    Key(KeyEvent),
    /// Mouse click, release, move or drag
    Mouse(MouseEvent),
    /// Scroll wheel, positive `delta` scrolls down
    Scroll { column: u16, row: u16, delta: isize },
    /// Terminal resize to (columns, rows)
    Resize(u16, u16),
    /// Periodic tick
    Tick,
}

impl EventKind {
    /// Whether this is a Ctrl+C, which the host always treats as quit
    pub fn is_interrupt(&self) -> bool {
        match self {
            EventKind::Key(key) => {
                key.modifiers.contains(KeyModifiers::CONTROL)
                    && matches!(key.code, crossterm::event::KeyCode::Char('c'))
            }
            _ => false,
        }
    }
}

/// Screen areas of rendered links, rebuilt on every frame
#[derive(Debug, Clone, Default)]
pub struct LinkAreas {
    links: Vec<(Rect, Anchor)>,
}

impl LinkAreas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all areas before a new frame
    pub fn clear(&mut self) {
        self.links.clear();
    }

    /// Record that `anchor` was drawn in `area`
    pub fn insert(&mut self, area: Rect, anchor: Anchor) {
        self.links.push((area, anchor));
    }

    /// Topmost link at a cell; later insertions are drawn over earlier ones
    pub fn anchor_at(&self, column: u16, row: u16) -> Option<&Anchor> {
        self.links
            .iter()
            .rev()
            .find(|(area, _)| contains(*area, column, row))
            .map(|(_, anchor)| anchor)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x.saturating_add(area.width)
        && row >= area.y
        && row < area.y.saturating_add(area.height)
}

/// Translate a mouse press into a document click
///
/// Returns `None` for anything but a button press. Presses outside every
/// link produce a click with no anchor.
pub fn click_from_mouse(mouse: &MouseEvent, links: &LinkAreas) -> Option<ClickEvent> {
    let MouseEventKind::Down(button) = mouse.kind else {
        return None;
    };
    let button = match button {
        TermButton::Left => MouseButton::Primary,
        TermButton::Middle => MouseButton::Middle,
        TermButton::Right => MouseButton::Secondary,
    };
    let modifiers = Modifiers {
        ctrl: mouse.modifiers.contains(KeyModifiers::CONTROL),
        meta: mouse
            .modifiers
            .intersects(KeyModifiers::SUPER | KeyModifiers::META),
        shift: mouse.modifiers.contains(KeyModifiers::SHIFT),
        alt: mouse.modifiers.contains(KeyModifiers::ALT),
    };

    let click = match links.anchor_at(mouse.column, mouse.row) {
        Some(anchor) => ClickEvent::on(anchor.clone()),
        None => ClickEvent::background(),
    };
    Some(click.with_button(button).with_modifiers(modifiers))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse(kind: MouseEventKind, column: u16, row: u16, modifiers: KeyModifiers) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers,
        }
    }

    fn links() -> LinkAreas {
        let mut links = LinkAreas::new();
        links.insert(Rect::new(0, 2, 20, 1), Anchor::new("/home"));
        links.insert(Rect::new(0, 3, 20, 1), Anchor::new("/about"));
        links
    }

    #[test]
    fn test_anchor_at() {
        let links = links();
        assert_eq!(links.anchor_at(5, 2).map(|a| a.href.as_str()), Some("/home"));
        assert_eq!(links.anchor_at(19, 3).map(|a| a.href.as_str()), Some("/about"));
        assert!(links.anchor_at(20, 3).is_none());
        assert!(links.anchor_at(0, 0).is_none());
    }

    #[test]
    fn test_later_links_win() {
        let mut links = links();
        links.insert(Rect::new(0, 2, 5, 1), Anchor::new("/top"));
        assert_eq!(links.anchor_at(1, 2).map(|a| a.href.as_str()), Some("/top"));
    }

    #[test]
    fn test_click_from_mouse_press() {
        let event = mouse(
            MouseEventKind::Down(TermButton::Left),
            3,
            3,
            KeyModifiers::CONTROL,
        );

        let click = click_from_mouse(&event, &links()).unwrap();

        assert_eq!(click.anchor.map(|a| a.href), Some("/about".to_string()));
        assert_eq!(click.button, MouseButton::Primary);
        assert!(click.modifiers.ctrl);
        assert!(!click.modifiers.shift);
    }

    #[test]
    fn test_click_outside_links() {
        let event = mouse(
            MouseEventKind::Down(TermButton::Right),
            40,
            10,
            KeyModifiers::NONE,
        );

        let click = click_from_mouse(&event, &links()).unwrap();

        assert!(click.anchor.is_none());
        assert_eq!(click.button, MouseButton::Secondary);
    }

    #[test]
    fn test_non_press_is_ignored() {
        let release = mouse(MouseEventKind::Up(TermButton::Left), 3, 2, KeyModifiers::NONE);
        let moved = mouse(MouseEventKind::Moved, 3, 2, KeyModifiers::NONE);

        assert!(click_from_mouse(&release, &links()).is_none());
        assert!(click_from_mouse(&moved, &links()).is_none());
    }

    #[test]
    fn test_is_interrupt() {
        use crossterm::event::{KeyCode, KeyEventKind, KeyEventState};

        let ctrl_c = KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        };
        assert!(EventKind::Key(ctrl_c).is_interrupt());
        assert!(!EventKind::Resize(80, 24).is_interrupt());
    }
}

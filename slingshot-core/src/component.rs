//! Component trait for render-only UI pieces

use ratatui::{layout::Rect, Frame};

use crate::event::EventKind;

/// A UI piece that renders from props and reports what the user asked for
///
/// Components never dispatch and never touch the store:
/// 1. Props carry everything needed to render (usually copied out of slices)
/// 2. `handle_event` returns outputs of type `O` for the owner to act on
/// 3. `render` draws from props plus purely visual local state (selection,
///    scroll offset)
///
/// `O` is whatever the owner understands: store actions, or intents such as
/// "follow this link" that must first go through the router.
///
/// # Example
///
/// ```ignore
/// use slingshot::{Component, EventKind, Frame, Rect};
///
/// struct MenuButton;
///
/// struct MenuButtonProps {
///     visible: bool,
/// }
///
/// impl Component<AppAction> for MenuButton {
///     type Props<'a> = MenuButtonProps;
///
///     fn handle_event(&mut self, event: &EventKind, props: Self::Props<'_>) -> impl IntoIterator<Item = AppAction> {
///         match event {
///             EventKind::Key(key) if props.visible && key.code == KeyCode::Char('m') => {
///                 Some(AppAction::UpdateDrawerState(true))
///             }
///             _ => None,
///         }
///     }
///
///     fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
///         if props.visible {
///             frame.render_widget(Paragraph::new("☰"), area);
///         }
///     }
/// }
/// ```
pub trait Component<O> {
    /// Data required to render the component (read-only)
    type Props<'a>;

    /// Handle an event and return outputs for the owner
    ///
    /// Returns any type implementing `IntoIterator<Item = O>`:
    /// - `None` - nothing to do (most common)
    /// - `Some(output)` - single output
    /// - `[a, b]` or `vec![...]` - several
    ///
    /// Default implementation returns nothing (render-only components).
    #[allow(unused_variables)]
    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = O> {
        None::<O>
    }

    /// Render the component to the frame
    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>);
}

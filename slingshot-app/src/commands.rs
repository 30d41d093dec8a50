//! Key commands and their default bindings

use slingshot::Keybindings;

/// Everything a key press can ask the shell to do
#[derive(slingshot::BindingCommand, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Command {
    Quit,
    OpenMenu,
    CloseDrawer,
    NextLink,
    PreviousLink,
    FollowLink,
    /// Follow the link offered by the active page
    FollowPageLink,
    HistoryBack,
    HistoryForward,
}

/// Bindings used when the config file does not override a command
pub fn default_keybindings() -> Keybindings<Command> {
    Keybindings::new()
        .with(Command::Quit, &["q", "ctrl+c"])
        .with(Command::OpenMenu, &["m"])
        .with(Command::CloseDrawer, &["esc"])
        .with(Command::NextLink, &["down", "j"])
        .with(Command::PreviousLink, &["up", "k"])
        .with(Command::FollowLink, &["enter"])
        .with(Command::FollowPageLink, &["l"])
        .with(Command::HistoryBack, &["left", "backspace"])
        .with(Command::HistoryForward, &["right"])
}

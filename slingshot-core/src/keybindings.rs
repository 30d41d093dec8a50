//! Keybindings: command enums bound to configurable key strings

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::hash::Hash;

/// Trait for the set of commands a keymap can trigger
///
/// Implement this trait for your own command enum, or use
/// `#[derive(BindingCommand)]` from `slingshot-macros` to generate it.
///
/// # Example
/// ```ignore
/// #[derive(BindingCommand, Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// pub enum Command {
///     OpenMenu,
///     HistoryBack,
///     Quit,
/// }
/// ```
pub trait BindingCommand: Clone + Copy + Eq + Hash + 'static {
    /// Command name as used in config files
    fn name(&self) -> &'static str;

    /// Parse a command from its name
    fn from_name(name: &str) -> Option<Self>;

    /// All commands, in lookup priority order
    fn all() -> &'static [Self];
}

/// Command → key strings table
///
/// Serialized as a map from command name to a list of key strings such as
/// `"q"`, `"ctrl+c"` or `"shift+tab"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keybindings<C: BindingCommand> {
    bindings: HashMap<C, Vec<String>>,
}

impl<C: BindingCommand> Default for Keybindings<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: BindingCommand> Serialize for Keybindings<C> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.bindings.len()))?;
        for command in C::all() {
            if let Some(keys) = self.bindings.get(command) {
                map.serialize_entry(command.name(), keys)?;
            }
        }
        map.end()
    }
}

impl<'de, C: BindingCommand> Deserialize<'de> for Keybindings<C> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: HashMap<String, Vec<String>> = HashMap::deserialize(deserializer)?;

        let mut keybindings = Keybindings::new();
        for (name, keys) in raw {
            match C::from_name(&name) {
                Some(command) => keybindings.bind(command, keys),
                // Unknown commands are skipped so older configs keep loading
                None => tracing::warn!(command = %name, "ignoring unknown keybinding command"),
            }
        }

        Ok(keybindings)
    }
}

impl<C: BindingCommand> Keybindings<C> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind `keys` to `command`, replacing earlier keys
    pub fn bind(&mut self, command: C, keys: Vec<String>) {
        self.bindings.insert(command, keys);
    }

    /// Builder form of [`bind`](Self::bind)
    pub fn with(mut self, command: C, keys: &[&str]) -> Self {
        self.bind(command, keys.iter().map(|k| k.to_string()).collect());
        self
    }

    /// Key strings bound to `command`
    pub fn keys(&self, command: C) -> &[String] {
        self.bindings.get(&command).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Command triggered by `key`, if any
    ///
    /// Commands are checked in [`BindingCommand::all`] order, so the first
    /// command wins when two share a key.
    pub fn command(&self, key: KeyEvent) -> Option<C> {
        C::all().iter().copied().find(|command| {
            self.keys(*command)
                .iter()
                .filter_map(|key_str| parse_key_string(key_str))
                .any(|bound| keys_match(&bound, &key))
        })
    }

    /// Display form of the first key bound to `command`, e.g. `^C`
    pub fn hint(&self, command: C) -> Option<String> {
        self.keys(command)
            .first()
            .map(|key_str| format_key_for_display(key_str))
    }

    /// Merge user config onto defaults - user config overrides defaults
    pub fn merge(mut defaults: Self, user: Self) -> Self {
        defaults.bindings.extend(user.bindings);
        defaults
    }
}

/// Compare code and modifiers, ignoring kind and state; letters match
/// case-insensitively
fn keys_match(bound: &KeyEvent, key: &KeyEvent) -> bool {
    let codes_match = match (bound.code, key.code) {
        (KeyCode::Char(a), KeyCode::Char(b)) => a.to_lowercase().eq(b.to_lowercase()),
        (a, b) => a == b,
    };
    codes_match && bound.modifiers == key.modifiers
}

/// Named keys: config spelling, key code, display form
const NAMED_KEYS: &[(&str, KeyCode, &str)] = &[
    ("esc", KeyCode::Esc, "Esc"),
    ("escape", KeyCode::Esc, "Esc"),
    ("enter", KeyCode::Enter, "Enter"),
    ("return", KeyCode::Enter, "Enter"),
    ("tab", KeyCode::Tab, "Tab"),
    ("backspace", KeyCode::Backspace, "Backspace"),
    ("up", KeyCode::Up, "Up"),
    ("down", KeyCode::Down, "Down"),
    ("left", KeyCode::Left, "Left"),
    ("right", KeyCode::Right, "Right"),
    ("home", KeyCode::Home, "Home"),
    ("end", KeyCode::End, "End"),
    ("pageup", KeyCode::PageUp, "PgUp"),
    ("pagedown", KeyCode::PageDown, "PgDn"),
    ("delete", KeyCode::Delete, "Del"),
    ("insert", KeyCode::Insert, "Ins"),
    ("space", KeyCode::Char(' '), "Space"),
];

/// Split `ctrl+shift+x` into modifiers and the key part
fn split_modifiers(key_str: &str) -> (KeyModifiers, &str) {
    let mut parts: Vec<&str> = key_str.split('+').collect();
    // "ctrl++" binds the plus key
    if key_str.ends_with("++") {
        parts.truncate(parts.len() - 2);
        parts.push("+");
    }
    let key_part = parts.pop().unwrap_or_default().trim();

    let mut modifiers = KeyModifiers::empty();
    for part in parts {
        match part.trim() {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            "alt" => modifiers |= KeyModifiers::ALT,
            _ => {}
        }
    }
    (modifiers, key_part)
}

/// Parse a key string like "q", "esc", "ctrl+p", "shift+tab" into a KeyEvent
pub fn parse_key_string(key_str: &str) -> Option<KeyEvent> {
    let key_str = key_str.trim().to_lowercase();
    if key_str.is_empty() {
        return None;
    }

    // shift+tab arrives as BackTab
    if key_str == "shift+tab" || key_str == "backtab" {
        return Some(press(KeyCode::BackTab, KeyModifiers::SHIFT));
    }

    let (modifiers, key_part) = split_modifiers(&key_str);

    let code = if let Some((_, code, _)) = NAMED_KEYS.iter().find(|(name, _, _)| *name == key_part)
    {
        *code
    } else if let Some(n) = key_part
        .strip_prefix('f')
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|n| (1..=12).contains(n))
    {
        KeyCode::F(n)
    } else {
        let mut chars = key_part.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => KeyCode::Char(ch),
            _ => return None,
        }
    };

    Some(press(code, modifiers))
}

fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

/// Format a key string for display (e.g., "ctrl+p" -> "^P", "q" -> "Q", "tab" -> "Tab")
pub fn format_key_for_display(key_str: &str) -> String {
    let key_str = key_str.trim().to_lowercase();

    if key_str == "shift+tab" || key_str == "backtab" {
        return "Shift+Tab".to_string();
    }

    let (modifiers, key_part) = split_modifiers(&key_str);

    let mut display = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        display.push('^');
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        display.push_str("Shift+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        display.push_str("Alt+");
    }

    match NAMED_KEYS.iter().find(|(name, _, _)| *name == key_part) {
        Some((_, _, shown)) => display.push_str(shown),
        None => display.extend(key_part.chars().flat_map(char::to_uppercase)),
    }
    display
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    enum TestCommand {
        Quit,
        Back,
        Close,
    }

    impl BindingCommand for TestCommand {
        fn name(&self) -> &'static str {
            match self {
                TestCommand::Quit => "quit",
                TestCommand::Back => "back",
                TestCommand::Close => "close",
            }
        }

        fn from_name(name: &str) -> Option<Self> {
            match name {
                "quit" => Some(TestCommand::Quit),
                "back" => Some(TestCommand::Back),
                "close" => Some(TestCommand::Close),
                _ => None,
            }
        }

        fn all() -> &'static [Self] {
            &[TestCommand::Quit, TestCommand::Back, TestCommand::Close]
        }
    }

    #[test]
    fn test_parse_simple_key() {
        let result = parse_key_string("q").unwrap();
        assert_eq!(result.code, KeyCode::Char('q'));
        assert_eq!(result.modifiers, KeyModifiers::empty());
    }

    #[test]
    fn test_parse_named_keys() {
        assert_eq!(parse_key_string("esc").unwrap().code, KeyCode::Esc);
        assert_eq!(parse_key_string("Enter").unwrap().code, KeyCode::Enter);
        assert_eq!(parse_key_string("up").unwrap().code, KeyCode::Up);
        assert_eq!(parse_key_string("f5").unwrap().code, KeyCode::F(5));
        assert_eq!(parse_key_string("space").unwrap().code, KeyCode::Char(' '));
        assert!(parse_key_string("f13").is_none());
        assert!(parse_key_string("nope").is_none());
        assert!(parse_key_string("").is_none());
    }

    #[test]
    fn test_parse_modifiers() {
        let result = parse_key_string("ctrl+p").unwrap();
        assert_eq!(result.code, KeyCode::Char('p'));
        assert!(result.modifiers.contains(KeyModifiers::CONTROL));

        let result = parse_key_string("alt+left").unwrap();
        assert_eq!(result.code, KeyCode::Left);
        assert_eq!(result.modifiers, KeyModifiers::ALT);

        let result = parse_key_string("ctrl++").unwrap();
        assert_eq!(result.code, KeyCode::Char('+'));
        assert_eq!(result.modifiers, KeyModifiers::CONTROL);
    }

    #[test]
    fn test_parse_shift_tab() {
        for spelling in ["shift+tab", "backtab"] {
            let result = parse_key_string(spelling).unwrap();
            assert_eq!(result.code, KeyCode::BackTab);
            assert!(result.modifiers.contains(KeyModifiers::SHIFT));
        }
    }

    #[test]
    fn test_command_lookup() {
        let bindings = Keybindings::new()
            .with(TestCommand::Quit, &["q", "ctrl+c"])
            .with(TestCommand::Back, &["alt+left", "backspace"]);

        assert_eq!(
            bindings.command(press(KeyCode::Char('Q'), KeyModifiers::empty())),
            Some(TestCommand::Quit)
        );
        assert_eq!(
            bindings.command(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(TestCommand::Quit)
        );
        assert_eq!(
            bindings.command(press(KeyCode::Left, KeyModifiers::ALT)),
            Some(TestCommand::Back)
        );
        assert_eq!(
            bindings.command(press(KeyCode::Left, KeyModifiers::empty())),
            None
        );
    }

    #[test]
    fn test_first_command_wins_on_shared_key() {
        let bindings = Keybindings::new()
            .with(TestCommand::Close, &["esc"])
            .with(TestCommand::Back, &["esc"]);

        assert_eq!(
            bindings.command(press(KeyCode::Esc, KeyModifiers::empty())),
            Some(TestCommand::Back)
        );
    }

    #[test]
    fn test_merge() {
        let defaults = Keybindings::new()
            .with(TestCommand::Quit, &["q"])
            .with(TestCommand::Back, &["backspace"]);
        let user = Keybindings::new().with(TestCommand::Quit, &["x"]);

        let merged = Keybindings::merge(defaults, user);

        assert_eq!(merged.keys(TestCommand::Quit), ["x".to_string()]);
        assert_eq!(merged.keys(TestCommand::Back), ["backspace".to_string()]);
        assert!(merged.keys(TestCommand::Close).is_empty());
    }

    #[test]
    fn test_hint() {
        let bindings = Keybindings::new().with(TestCommand::Quit, &["ctrl+c", "q"]);
        assert_eq!(bindings.hint(TestCommand::Quit), Some("^C".to_string()));
        assert_eq!(bindings.hint(TestCommand::Back), None);
    }

    #[test]
    fn test_deserialize_skips_unknown_commands() {
        let raw: HashMap<String, Vec<String>> = HashMap::from([
            ("quit".to_string(), vec!["q".to_string()]),
            ("fly".to_string(), vec!["f".to_string()]),
        ]);
        let value = serde::de::value::MapDeserializer::<_, serde::de::value::Error>::new(
            raw.into_iter(),
        );

        let bindings = Keybindings::<TestCommand>::deserialize(value).unwrap();

        assert_eq!(bindings.keys(TestCommand::Quit), ["q".to_string()]);
        assert_eq!(bindings.bindings.len(), 1);
    }

    #[test]
    fn test_format_key_for_display() {
        assert_eq!(format_key_for_display("q"), "Q");
        assert_eq!(format_key_for_display("ctrl+p"), "^P");
        assert_eq!(format_key_for_display("esc"), "Esc");
        assert_eq!(format_key_for_display("alt+left"), "Alt+Left");
        assert_eq!(format_key_for_display("shift+tab"), "Shift+Tab");
        assert_eq!(format_key_for_display("?"), "?");
    }
}

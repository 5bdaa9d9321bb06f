//! Keybinding registry: maps keys to actions per focus context, with config
//! overrides.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

/// Everything a key can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    Submit,
    Clear,
    FocusInput,
    CycleFocus,
    NavDown,
    NavUp,
    CopyLink,
    OpenLink,
    CycleTheme,
}

impl Action {
    /// Short label for the status bar hints.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::Submit => "find",
            Self::Clear => "clear",
            Self::FocusInput => "edit URL",
            Self::CycleFocus => "switch",
            Self::NavDown => "down",
            Self::NavUp => "up",
            Self::CopyLink => "copy",
            Self::OpenLink => "open",
            Self::CycleTheme => "theme",
        }
    }
}

/// Which bindings are active. `Global` applies everywhere unless the focused
/// context binds the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    /// The URL field has focus. Printable keys are text, so only named keys
    /// and modifier combos are bound here.
    Input,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parses a key from config.
///
/// Accepts single characters (`"y"`), named keys (`"Enter"`, `"Esc"`, `"Tab"`,
/// arrows, `"Backspace"`, `"Space"`), `"Ctrl+<char>"` and `"F1"`..`"F12"`.
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+").or_else(|| s.strip_prefix("ctrl+")) {
        let mut chars = rest.trim().chars();
        let c = chars.next()?;
        return chars.next().is_none().then(|| KeySpec::ctrl(c.to_ascii_lowercase()));
    }

    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeySpec::plain(KeyCode::Enter)),
        "esc" | "escape" => return Some(KeySpec::plain(KeyCode::Esc)),
        "tab" => return Some(KeySpec::plain(KeyCode::Tab)),
        "up" => return Some(KeySpec::plain(KeyCode::Up)),
        "down" => return Some(KeySpec::plain(KeyCode::Down)),
        "left" => return Some(KeySpec::plain(KeyCode::Left)),
        "right" => return Some(KeySpec::plain(KeyCode::Right)),
        "backspace" => return Some(KeySpec::plain(KeyCode::Backspace)),
        "space" => return Some(KeySpec::plain(KeyCode::Char(' '))),
        _ => {}
    }

    if let Some(n) = s.strip_prefix(['F', 'f']).and_then(|n| n.parse::<u8>().ok()) {
        return (1..=12).contains(&n).then_some(KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(KeySpec::plain(KeyCode::Char(c)))
}

/// Formats a key the way hints show it, e.g. `Ctrl+k`, `Enter`.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

/// Context-aware key lookup.
pub struct KeybindingRegistry {
    lookup: HashMap<(Context, KeySpec), Action>,
    /// Registration order, for hints.
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use Context::{Global, Input, Results};

        // Global
        self.bind(Global, KeySpec::ctrl('c'), Action::Quit);
        self.bind(Global, KeySpec::ctrl('k'), Action::FocusInput);
        self.bind(Global, KeySpec::plain(KeyCode::Esc), Action::Clear);
        self.bind(Global, KeySpec::plain(KeyCode::Tab), Action::CycleFocus);
        self.bind(Global, KeySpec::ctrl('t'), Action::CycleTheme);

        // URL field
        self.bind(Input, KeySpec::plain(KeyCode::Enter), Action::Submit);
        self.bind(Input, KeySpec::plain(KeyCode::Down), Action::CycleFocus);

        // Result list
        self.bind(Results, KeySpec::plain(KeyCode::Char('j')), Action::NavDown);
        self.bind(Results, KeySpec::plain(KeyCode::Down), Action::NavDown);
        self.bind(Results, KeySpec::plain(KeyCode::Char('k')), Action::NavUp);
        self.bind(Results, KeySpec::plain(KeyCode::Up), Action::NavUp);
        self.bind(Results, KeySpec::plain(KeyCode::Char('y')), Action::CopyLink);
        self.bind(Results, KeySpec::plain(KeyCode::Char('o')), Action::OpenLink);
        self.bind(Results, KeySpec::plain(KeyCode::Enter), Action::OpenLink);
        self.bind(Results, KeySpec::plain(KeyCode::Char('/')), Action::FocusInput);
        self.bind(Results, KeySpec::plain(KeyCode::Char('q')), Action::Quit);
    }

    /// Rebinds actions by name (`copy_link = "c"`).
    ///
    /// The new key replaces the old one in every context the action was bound
    /// in. Returns warnings for unknown actions or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts {
                if ctx == Context::Input && key_is_text(&key) {
                    warnings.push(format!(
                        "Key '{}' for action '{}' would shadow typing in the URL field, not bound there",
                        key_str, action_name
                    ));
                    continue;
                }
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Looks up `context` first, then `Global`.
    ///
    /// In the `Input` context, plain printable keys never fall back so that
    /// they can be typed.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context == Context::Input && key_is_text(&key) {
            return None;
        }

        if context != Context::Global {
            if let Some(&action) = self.lookup.get(&(Context::Global, key)) {
                return Some(action);
            }
        }

        None
    }

    /// First key bound to `action` in `context` (or globally), formatted.
    pub fn key_for(&self, action: Action, context: Context) -> Option<String> {
        self.bindings
            .iter()
            .find(|(c, _, a)| *a == action && *c == context)
            .or_else(|| {
                self.bindings
                    .iter()
                    .find(|(c, _, a)| *a == action && *c == Context::Global)
            })
            .map(|(_, key, _)| format_key(key))
    }

    /// `"[key]label"` hints for the given actions, skipping unbound ones.
    pub fn hints(&self, context: Context, actions: &[Action]) -> String {
        actions
            .iter()
            .filter_map(|&action| {
                self.key_for(action, context)
                    .map(|key| format!("[{}]{}", key, action.describe()))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Keys that insert text when the URL field has focus.
fn key_is_text(key: &KeySpec) -> bool {
    matches!(key.code, KeyCode::Char(_))
        && !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "submit" | "find" => Some(Action::Submit),
        "clear" => Some(Action::Clear),
        "focus_input" | "focusinput" | "edit" => Some(Action::FocusInput),
        "cycle_focus" | "cyclefocus" | "switch" => Some(Action::CycleFocus),
        "nav_down" | "navdown" | "down" => Some(Action::NavDown),
        "nav_up" | "navup" | "up" => Some(Action::NavUp),
        "copy_link" | "copylink" | "copy" => Some(Action::CopyLink),
        "open_link" | "openlink" | "open" => Some(Action::OpenLink),
        "cycle_theme" | "cycletheme" | "theme" => Some(Action::CycleTheme),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_context_bindings() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Input),
            Some(Action::Submit)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Esc, KeyModifiers::NONE, Context::Input),
            Some(Action::Clear)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('k'), KeyModifiers::CONTROL, Context::Input),
            Some(Action::FocusInput)
        );
    }

    #[test]
    fn test_printable_keys_are_text_in_input() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::NONE, Context::Input),
            None
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('Y'), KeyModifiers::SHIFT, Context::Input),
            None
        );
    }

    #[test]
    fn test_results_context_bindings() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('j'), KeyModifiers::NONE, Context::Results),
            Some(Action::NavDown)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('y'), KeyModifiers::NONE, Context::Results),
            Some(Action::CopyLink)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Results),
            Some(Action::OpenLink)
        );
        // falls back to Global
        assert_eq!(
            reg.action_for_key(KeyCode::Esc, KeyModifiers::NONE, Context::Results),
            Some(Action::Clear)
        );
    }

    #[test]
    fn test_default_copy_key() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.key_for(Action::CopyLink, Context::Results).as_deref(),
            Some("y")
        );
        assert_eq!(
            reg.key_for(Action::OpenLink, Context::Results).as_deref(),
            Some("o")
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('c'), KeyModifiers::NONE, Context::Results),
            None
        );
    }

    #[test]
    fn test_unknown_key_returns_none() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::F(12), KeyModifiers::NONE, Context::Results),
            None
        );
    }

    #[test]
    fn test_apply_overrides_valid() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("copy_link".to_string(), "c".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert!(warnings.is_empty());
        assert_eq!(
            reg.action_for_key(KeyCode::Char('y'), KeyModifiers::NONE, Context::Results),
            None
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('c'), KeyModifiers::NONE, Context::Results),
            Some(Action::CopyLink)
        );
    }

    #[test]
    fn test_override_keeps_all_contexts() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("submit".to_string(), "Ctrl+f".to_string());

        assert!(reg.apply_overrides(&overrides).is_empty());
        assert_eq!(
            reg.action_for_key(KeyCode::Char('f'), KeyModifiers::CONTROL, Context::Input),
            Some(Action::Submit)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Input),
            None
        );
    }

    #[test]
    fn test_override_text_key_not_bound_in_input() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("submit".to_string(), "x".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("shadow typing"));
    }

    #[test]
    fn test_apply_overrides_unknown_action() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("star".to_string(), "s".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Unknown action"));
    }

    #[test]
    fn test_apply_overrides_bad_key() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("quit".to_string(), "Ctrl+Alt+Shift+Q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Cannot parse key"));
    }

    #[test]
    fn test_parse_key_string() {
        assert_eq!(parse_key_string("Enter"), Some(KeySpec::plain(KeyCode::Enter)));
        assert_eq!(parse_key_string("esc"), Some(KeySpec::plain(KeyCode::Esc)));
        assert_eq!(parse_key_string("space"), Some(KeySpec::plain(KeyCode::Char(' '))));
        assert_eq!(parse_key_string("Ctrl+K"), Some(KeySpec::ctrl('k')));
        assert_eq!(parse_key_string("F5"), Some(KeySpec::plain(KeyCode::F(5))));
        assert_eq!(parse_key_string("F13"), None);
        assert_eq!(parse_key_string("y"), Some(KeySpec::plain(KeyCode::Char('y'))));
        assert_eq!(parse_key_string("yy"), None);
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Char('y'))), "y");
        assert_eq!(format_key(&KeySpec::ctrl('k')), "Ctrl+k");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Enter)), "Enter");
    }

    #[test]
    fn test_hints() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.hints(Context::Results, &[Action::CopyLink, Action::OpenLink, Action::Clear]),
            "[y]copy [o]open [Esc]clear"
        );
        assert_eq!(
            reg.hints(Context::Input, &[Action::Submit, Action::FocusInput]),
            "[Enter]find [Ctrl+k]edit URL"
        );
    }
}

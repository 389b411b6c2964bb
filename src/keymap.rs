use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use smallvec::SmallVec;

use crate::action::ThreadAction;
use crate::error::ThreadViewError;

/// One key with its modifiers, written as `"k"`, `"G"`, `"tab"` or `"ctrl+u"`.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyCombo {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Whether a key event triggers this combo.
    ///
    /// Shift is implied by the character for `Char` codes, so `"G"` matches
    /// both `G` and `Shift+G`.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        let mut modifiers = key.modifiers;
        if matches!(key.code, KeyCode::Char(_)) {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        self.code == key.code && self.modifiers == modifiers
    }
}

const NAMED_KEYS: &[(&str, KeyCode)] = &[
    ("tab", KeyCode::Tab),
    ("enter", KeyCode::Enter),
    ("esc", KeyCode::Esc),
    ("space", KeyCode::Char(' ')),
    ("backspace", KeyCode::Backspace),
    ("delete", KeyCode::Delete),
    ("up", KeyCode::Up),
    ("down", KeyCode::Down),
    ("left", KeyCode::Left),
    ("right", KeyCode::Right),
    ("home", KeyCode::Home),
    ("end", KeyCode::End),
    ("pgup", KeyCode::PageUp),
    ("pgdown", KeyCode::PageDown),
];

impl FromStr for KeyCombo {
    type Err = ThreadViewError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let invalid = || ThreadViewError::InvalidArgument("unrecognized key token");
        // A trailing "+" names the plus key itself.
        let (prefix, key) = match token.rsplit_once('+') {
            Some((prefix, "")) => (prefix.trim_end_matches('+'), "+"),
            Some((prefix, key)) => (prefix, key),
            None => ("", token),
        };
        let mut modifiers = KeyModifiers::NONE;
        for part in prefix.split('+').filter(|part| !part.is_empty()) {
            modifiers |= match part.to_ascii_lowercase().as_str() {
                "ctrl" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return Err(invalid()),
            };
        }
        let mut chars = key.chars();
        let code = match (chars.next(), chars.next()) {
            (Some(c), None) => KeyCode::Char(c),
            _ => {
                let lower = key.to_ascii_lowercase();
                if let Some(&(_, code)) = NAMED_KEYS.iter().find(|(name, _)| *name == lower) {
                    code
                } else if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse().ok()) {
                    KeyCode::F(n)
                } else {
                    return Err(invalid());
                }
            }
        };
        Ok(Self::new(code, modifiers))
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("alt+")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            f.write_str("shift+")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::F(n) => write!(f, "f{n}"),
            code => match NAMED_KEYS.iter().find(|(_, named)| *named == code) {
                Some((name, _)) => f.write_str(name),
                None => write!(f, "{code:?}"),
            },
        }
    }
}

impl TryFrom<String> for KeyCombo {
    type Error = ThreadViewError;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        token.parse()
    }
}

impl From<KeyCombo> for String {
    fn from(combo: KeyCombo) -> Self {
        combo.to_string()
    }
}

/// Keys bound to one action.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBinding {
    pub action: ThreadAction,
    pub keys: Vec<KeyCombo>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeymapProfile {
    /// Single-letter bindings (`j`/`k`/`n`/`p`...).
    #[default]
    Default,
    /// Arrow keys and navigation keys only.
    Arrows,
}

/// Table mapping keys to [`ThreadAction`]s.
///
/// The whole table can be replaced; the first binding containing a key wins.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThreadKeyMap {
    bindings: Vec<KeyBinding>,
}

impl Default for ThreadKeyMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadKeyMap {
    pub fn new() -> Self {
        Self::with_profile(KeymapProfile::Default)
    }

    /// Creates an empty table.
    pub const fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    pub fn with_profile(profile: KeymapProfile) -> Self {
        let mut keymap = Self::empty();
        let plain = |c| KeyCombo::plain(KeyCode::Char(c));
        match profile {
            KeymapProfile::Default => {
                keymap.bind(ThreadAction::Up, [plain('k')]);
                keymap.bind(ThreadAction::Down, [plain('j')]);
                keymap.bind(ThreadAction::PageUp, [plain('u'), KeyCombo::ctrl('u')]);
                keymap.bind(ThreadAction::PageDown, [plain('d'), KeyCombo::ctrl('d')]);
                keymap.bind(ThreadAction::Top, [plain('g')]);
                keymap.bind(ThreadAction::Bottom, [plain('G')]);
                keymap.bind(ThreadAction::Next, [plain('n')]);
                keymap.bind(ThreadAction::Prev, [plain('p')]);
                keymap.bind(ThreadAction::Root, [plain('r')]);
                keymap.bind(ThreadAction::ToggleFold, [KeyCombo::plain(KeyCode::Tab)]);
                keymap.bind(ThreadAction::ExpandAll, [plain('L')]);
                keymap.bind(ThreadAction::CollapseAll, [plain('H')]);
                keymap.bind(ThreadAction::ResetView, [plain('z')]);
                keymap.bind(ThreadAction::Copy, [plain('y')]);
                keymap.bind(ThreadAction::Quit, [plain('h'), plain('q')]);
            }
            KeymapProfile::Arrows => {
                keymap.bind(ThreadAction::Up, [KeyCombo::plain(KeyCode::Left)]);
                keymap.bind(ThreadAction::Down, [KeyCombo::plain(KeyCode::Right)]);
                keymap.bind(ThreadAction::PageUp, [KeyCombo::plain(KeyCode::PageUp)]);
                keymap.bind(ThreadAction::PageDown, [KeyCombo::plain(KeyCode::PageDown)]);
                keymap.bind(ThreadAction::Top, [KeyCombo::plain(KeyCode::Home)]);
                keymap.bind(ThreadAction::Bottom, [KeyCombo::plain(KeyCode::End)]);
                keymap.bind(ThreadAction::Next, [KeyCombo::plain(KeyCode::Down)]);
                keymap.bind(ThreadAction::Prev, [KeyCombo::plain(KeyCode::Up)]);
                keymap.bind(ThreadAction::ToggleFold, [KeyCombo::plain(KeyCode::Enter)]);
                keymap.bind(ThreadAction::ResetView, [KeyCombo::plain(KeyCode::Char(' '))]);
                keymap.bind(ThreadAction::Copy, [KeyCombo::ctrl('c')]);
                keymap.bind(ThreadAction::Quit, [KeyCombo::plain(KeyCode::Esc)]);
            }
        }
        keymap
    }

    /// Replaces the keys of `action` (adding the binding if it is new).
    pub fn bind<I>(&mut self, action: ThreadAction, keys: I)
    where
        I: IntoIterator<Item = KeyCombo>,
    {
        let keys: Vec<KeyCombo> = keys.into_iter().collect();
        if let Some(binding) = self.bindings.iter_mut().find(|b| b.action == action) {
            binding.keys = keys;
        } else {
            self.bindings.push(KeyBinding { action, keys });
        }
    }

    /// Binds `action` to keys given as tokens such as `"ctrl+u"`.
    pub fn bind_tokens<'a, I>(&mut self, action: ThreadAction, tokens: I) -> crate::Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keys = tokens
            .into_iter()
            .map(str::parse)
            .collect::<crate::Result<SmallVec<[KeyCombo; 2]>>>()?;
        self.bind(action, keys);
        Ok(())
    }

    /// Removes every key of `action`.
    pub fn unbind(&mut self, action: ThreadAction) {
        self.bindings.retain(|binding| binding.action != action);
    }

    /// Keys currently bound to `action`.
    pub fn keys_for(&self, action: ThreadAction) -> &[KeyCombo] {
        self.bindings
            .iter()
            .find(|binding| binding.action == action)
            .map_or(&[], |binding| binding.keys.as_slice())
    }

    /// Resolves a key event into an action.
    pub fn resolve(&self, key: &KeyEvent) -> Option<ThreadAction> {
        self.bindings
            .iter()
            .find(|binding| binding.keys.iter().any(|combo| combo.matches(key)))
            .map(|binding| binding.action)
    }

    /// Resolves with a caller hook first, falling back to the table.
    pub fn resolve_with<F>(&self, key: &KeyEvent, custom: F) -> Option<ThreadAction>
    where
        F: Fn(&KeyEvent) -> Option<ThreadAction>,
    {
        custom(key).or_else(|| self.resolve(key))
    }

    /// Hint such as `"n:Next p:Prev h,q:Quit"` for the given actions; unbound actions are skipped.
    pub fn hint(&self, actions: &[ThreadAction]) -> String {
        let mut parts = Vec::with_capacity(actions.len());
        for &action in actions {
            let keys = self.keys_for(action);
            if keys.is_empty() {
                continue;
            }
            let keys: Vec<String> = keys.iter().map(ToString::to_string).collect();
            parts.push(format!("{}:{}", keys.join(","), action.label()));
        }
        parts.join(" ")
    }
}

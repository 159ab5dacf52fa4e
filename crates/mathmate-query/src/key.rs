use std::str::FromStr;

use crate::prelude::*;

/// A key as named by DOM keyboard events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// `ArrowUp`.
    Up,
    /// `ArrowDown`.
    Down,
    /// `ArrowLeft`.
    Left,
    /// `ArrowRight`.
    Right,
    /// `Tab`.
    Tab,
    /// `Enter`.
    Enter,
    /// `Backspace`.
    Backspace,
    /// `Escape`.
    Escape,
    /// `Shift` on its own.
    Shift,
    /// A key producing a single character.
    Char(char),
    /// Any other named key.
    Named(EcoString),
}

impl FromStr for Key {
    type Err = std::convert::Infallible;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Key::Char(c));
        }
        Ok(match name {
            "ArrowUp" | "Up" => Key::Up,
            "ArrowDown" | "Down" => Key::Down,
            "ArrowLeft" | "Left" => Key::Left,
            "ArrowRight" | "Right" => Key::Right,
            "Tab" => Key::Tab,
            "Enter" => Key::Enter,
            "Backspace" => Key::Backspace,
            "Escape" | "Esc" => Key::Escape,
            "Shift" => Key::Shift,
            "Space" => Key::Char(' '),
            _ => Key::Named(name.into()),
        })
    }
}

/// A key press together with its modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The pressed key.
    pub key: Key,
    /// Whether Shift was held.
    pub shift: bool,
    /// Whether Control was held.
    pub ctrl: bool,
    /// Whether Alt was held.
    pub alt: bool,
    /// Whether Meta was held.
    pub meta: bool,
}

impl KeyEvent {
    /// A key press without modifiers.
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: false,
            alt: false,
            meta: false,
        }
    }

    /// The typed character, unless a command modifier is held.
    pub fn typed_char(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if !(self.ctrl || self.alt || self.meta) => Some(c),
            _ => None,
        }
    }

    /// Parses a chord such as `Shift+Tab`, `ArrowDown` or `(`.
    pub fn parse(chord: &str) -> Self {
        let mut event = Self::plain(Key::Shift);
        let mut rest = chord;
        while let Some((modifier, tail)) = rest.split_once('+') {
            if tail.is_empty() {
                break;
            }
            match modifier {
                "Shift" => event.shift = true,
                "Ctrl" | "Control" => event.ctrl = true,
                "Alt" => event.alt = true,
                "Meta" | "Cmd" => event.meta = true,
                _ => break,
            }
            rest = tail;
        }
        let Ok(key) = rest.parse::<Key>();
        event.key = key;
        event
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        Self::plain(key)
    }
}

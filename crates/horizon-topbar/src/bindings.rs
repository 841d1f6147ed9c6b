//! Toggle keys and toggle items.
//!
//! A toggle key flips the selection of every icon that bound it when the
//! host reports the key press through [`IconContext::handle_key_press`]. A
//! toggle item is any external object whose visibility follows an icon's
//! selection: shown while selected or viewing, hidden otherwise.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;

use horizon_topbar_core::logging::targets;

use crate::context::IconContext;
use crate::error::{IconError, Result};
use crate::icon::Icon;

/// Keyboard keys an icon can bind as toggle keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Numbers (main keyboard)
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    // Navigation
    ArrowUp, ArrowDown, ArrowLeft, ArrowRight,
    Home, End, PageUp, PageDown,

    // Editing
    Backspace, Delete, Insert,
    Enter, Tab, Space, Escape,

    // Punctuation and symbols
    Minus, Equal,
    BracketLeft, BracketRight, Backslash,
    Semicolon, Quote,
    Comma, Period, Slash,
    Grave,
}

const LETTERS: [Key; 26] = [
    Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I,
    Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
    Key::S, Key::T, Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
];

const DIGITS: [Key; 10] = [
    Key::Digit0, Key::Digit1, Key::Digit2, Key::Digit3, Key::Digit4,
    Key::Digit5, Key::Digit6, Key::Digit7, Key::Digit8, Key::Digit9,
];

impl Key {
    /// The character a letter or digit key types, uppercase for letters.
    pub fn to_ascii_char(self) -> Option<char> {
        if let Some(index) = LETTERS.iter().position(|key| *key == self) {
            return Some((b'A' + index as u8) as char);
        }
        DIGITS
            .iter()
            .position(|key| *key == self)
            .map(|index| (b'0' + index as u8) as char)
    }

    pub fn is_letter(self) -> bool {
        LETTERS.contains(&self)
    }

    pub fn is_digit(self) -> bool {
        DIGITS.contains(&self)
    }

    pub fn is_function_key(self) -> bool {
        matches!(
            self,
            Key::F1
                | Key::F2
                | Key::F3
                | Key::F4
                | Key::F5
                | Key::F6
                | Key::F7
                | Key::F8
                | Key::F9
                | Key::F10
                | Key::F11
                | Key::F12
        )
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_ascii_char() {
            Some(ch) => write!(f, "{ch}"),
            None => write!(f, "{self:?}"),
        }
    }
}

impl FromStr for Key {
    type Err = IconError;

    /// Parse a key name: a single letter or digit, or a name such as
    /// `"F5"`, `"Escape"`, `"ArrowUp"` or `"up"`. Case is ignored.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            let upper = ch.to_ascii_uppercase();
            if upper.is_ascii_uppercase() {
                return Ok(LETTERS[(upper as u8 - b'A') as usize]);
            }
            if ch.is_ascii_digit() {
                return Ok(DIGITS[(ch as u8 - b'0') as usize]);
            }
        }

        match trimmed.to_lowercase().as_str() {
            "digit0" => Ok(Key::Digit0),
            "digit1" => Ok(Key::Digit1),
            "digit2" => Ok(Key::Digit2),
            "digit3" => Ok(Key::Digit3),
            "digit4" => Ok(Key::Digit4),
            "digit5" => Ok(Key::Digit5),
            "digit6" => Ok(Key::Digit6),
            "digit7" => Ok(Key::Digit7),
            "digit8" => Ok(Key::Digit8),
            "digit9" => Ok(Key::Digit9),

            // Function keys
            "f1" => Ok(Key::F1),
            "f2" => Ok(Key::F2),
            "f3" => Ok(Key::F3),
            "f4" => Ok(Key::F4),
            "f5" => Ok(Key::F5),
            "f6" => Ok(Key::F6),
            "f7" => Ok(Key::F7),
            "f8" => Ok(Key::F8),
            "f9" => Ok(Key::F9),
            "f10" => Ok(Key::F10),
            "f11" => Ok(Key::F11),
            "f12" => Ok(Key::F12),

            // Navigation
            "up" | "arrowup" => Ok(Key::ArrowUp),
            "down" | "arrowdown" => Ok(Key::ArrowDown),
            "left" | "arrowleft" => Ok(Key::ArrowLeft),
            "right" | "arrowright" => Ok(Key::ArrowRight),
            "home" => Ok(Key::Home),
            "end" => Ok(Key::End),
            "pageup" | "pgup" => Ok(Key::PageUp),
            "pagedown" | "pgdn" => Ok(Key::PageDown),

            // Editing
            "backspace" | "back" => Ok(Key::Backspace),
            "delete" | "del" => Ok(Key::Delete),
            "insert" | "ins" => Ok(Key::Insert),
            "enter" | "return" => Ok(Key::Enter),
            "tab" => Ok(Key::Tab),
            "space" | "spacebar" => Ok(Key::Space),
            "escape" | "esc" => Ok(Key::Escape),

            // Punctuation
            "minus" | "-" => Ok(Key::Minus),
            "equal" | "equals" | "=" => Ok(Key::Equal),
            "bracketleft" | "[" => Ok(Key::BracketLeft),
            "bracketright" | "]" => Ok(Key::BracketRight),
            "backslash" | "\\" => Ok(Key::Backslash),
            "semicolon" | ";" => Ok(Key::Semicolon),
            "quote" | "'" => Ok(Key::Quote),
            "comma" | "," => Ok(Key::Comma),
            "period" | "." => Ok(Key::Period),
            "slash" | "/" => Ok(Key::Slash),
            "grave" | "`" => Ok(Key::Grave),

            _ => Err(IconError::UnknownKey(s.to_string())),
        }
    }
}

/// An external object whose visibility follows an icon's selection.
///
/// Closures taking the new visibility implement this trait, so simple
/// bindings need no wrapper type:
///
/// ```
/// use horizon_topbar::{IconContext, ToggleItem};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// let context = IconContext::new();
/// let icon = context.create_icon();
/// let visible = Arc::new(AtomicBool::new(false));
///
/// let visible_clone = visible.clone();
/// let panel: Arc<dyn ToggleItem> = Arc::new(move |shown: bool| {
///     visible_clone.store(shown, Ordering::SeqCst);
/// });
/// icon.bind_toggle_item(panel).unwrap();
///
/// icon.select().unwrap();
/// assert!(visible.load(Ordering::SeqCst));
/// ```
pub trait ToggleItem: Send + Sync {
    fn set_visible(&self, visible: bool);
}

impl<F> ToggleItem for F
where
    F: Fn(bool) + Send + Sync,
{
    fn set_visible(&self, visible: bool) {
        self(visible)
    }
}

/// Show or hide every item. A panicking item is logged and skipped.
pub(crate) fn set_items_visible(items: &[Arc<dyn ToggleItem>], visible: bool) {
    for item in items {
        let result = panic::catch_unwind(AssertUnwindSafe(|| item.set_visible(visible)));
        if result.is_err() {
            tracing::error!(target: targets::BINDING, visible, "toggle item panicked");
        }
    }
}

impl Icon {
    /// Toggle this icon whenever `key` is pressed.
    ///
    /// Keys form a set: binding a key twice has no further effect, and any
    /// number of icons may bind the same key.
    pub fn bind_toggle_key(&self, key: Key) -> Result<&Self> {
        self.context_inner().update(self.id(), |data| {
            if !data.toggle_keys.contains(&key) {
                data.toggle_keys.push(key);
                tracing::trace!(target: targets::BINDING, id = %self.id(), %key, "toggle key bound");
            }
        })?;
        Ok(self)
    }

    /// Stop toggling on `key`. Unbinding a key that was never bound does
    /// nothing.
    pub fn unbind_toggle_key(&self, key: Key) -> Result<&Self> {
        self.context_inner()
            .update(self.id(), |data| data.toggle_keys.retain(|bound| *bound != key))?;
        Ok(self)
    }

    /// The bound toggle keys, in binding order.
    pub fn toggle_keys(&self) -> Result<Vec<Key>> {
        self.context_inner().read(self.id(), |data| data.toggle_keys.clone())
    }

    /// Make `item` visible exactly while this icon is selected.
    ///
    /// The item is immediately shown or hidden to match the current state.
    /// Binding the same item (by pointer identity) again does nothing.
    pub fn bind_toggle_item(&self, item: Arc<dyn ToggleItem>) -> Result<&Self> {
        let visible = self.context_inner().update(self.id(), |data| {
            if data.toggle_items.iter().any(|bound| Arc::ptr_eq(bound, &item)) {
                None
            } else {
                data.toggle_items.push(item.clone());
                Some(data.state.is_selected())
            }
        })?;
        if let Some(visible) = visible {
            tracing::trace!(target: targets::BINDING, id = %self.id(), visible, "toggle item bound");
            set_items_visible(std::slice::from_ref(&item), visible);
        }
        Ok(self)
    }

    /// Stop driving `item`. Its visibility is left as it is. Unbinding an
    /// item that was never bound does nothing.
    pub fn unbind_toggle_item(&self, item: &Arc<dyn ToggleItem>) -> Result<&Self> {
        self.context_inner().update(self.id(), |data| {
            data.toggle_items.retain(|bound| !Arc::ptr_eq(bound, item))
        })?;
        Ok(self)
    }

    pub fn toggle_item_count(&self) -> Result<usize> {
        self.context_inner().read(self.id(), |data| data.toggle_items.len())
    }
}

impl IconContext {
    /// Feed a key press from the host.
    ///
    /// Every enabled, unlocked icon that bound `key` is toggled, oldest icon
    /// first. Returns how many icons were toggled.
    pub fn handle_key_press(&self, key: Key) -> usize {
        let matching: Vec<_> = {
            let registry = self.inner().registry.lock();
            registry
                .ids()
                .into_iter()
                .filter(|id| {
                    registry.icons.get(*id).is_some_and(|data| {
                        data.toggle_keys.contains(&key) && data.enabled && !data.is_locked()
                    })
                })
                .collect()
        };
        tracing::trace!(target: targets::BINDING, %key, matching = matching.len(), "key pressed");

        matching
            .into_iter()
            .filter(|id| self.inner().toggle(*id).is_ok())
            .count()
    }
}

//! Keyboard shortcuts of the Primary window

use laf_core::types::ContentCategory;
use laf_core::UrlClassifier;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    /// Function key `F1`..=`F12`
    F(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Accelerator {
    pub ctrl: bool,
    pub shift: bool,
    pub key: Key,
}

impl Accelerator {
    pub const fn plain(key: Key) -> Self {
        Self {
            ctrl: false,
            shift: false,
            key,
        }
    }

    pub const fn shift(key: Key) -> Self {
        Self {
            ctrl: false,
            shift: true,
            key,
        }
    }

    pub const fn ctrl(key: Key) -> Self {
        Self {
            ctrl: true,
            shift: false,
            key,
        }
    }

    pub const fn ctrl_shift(key: Key) -> Self {
        Self {
            ctrl: true,
            shift: true,
            key,
        }
    }
}

impl fmt::Display for Accelerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        match self.key {
            Key::Escape => f.write_str("Esc"),
            Key::F(n) => write!(f, "F{}", n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutAction {
    /// Tell content to release pointer lock
    ExitPointerLock,
    Reload,
    /// Load the home page, which starts a new match
    NewMatch,
    /// Copy the Primary URL to the clipboard
    CopyInviteLink,
    /// Load the clipboard text if it is a game link
    JoinFromClipboard,
    /// Ask for a game link and load it
    PromptGameLink,
    ToggleFullscreen,
    Relaunch,
    OpenDevtools,
}

pub static BINDINGS: &[(Accelerator, ShortcutAction)] = &[
    (Accelerator::plain(Key::Escape), ShortcutAction::ExitPointerLock),
    (Accelerator::plain(Key::F(5)), ShortcutAction::Reload),
    (Accelerator::plain(Key::F(6)), ShortcutAction::NewMatch),
    (Accelerator::plain(Key::F(7)), ShortcutAction::CopyInviteLink),
    (Accelerator::plain(Key::F(8)), ShortcutAction::JoinFromClipboard),
    (Accelerator::shift(Key::F(8)), ShortcutAction::PromptGameLink),
    (Accelerator::plain(Key::F(11)), ShortcutAction::ToggleFullscreen),
    (Accelerator::ctrl_shift(Key::F(1)), ShortcutAction::Relaunch),
    (Accelerator::ctrl(Key::F(1)), ShortcutAction::OpenDevtools),
];

/// Action bound to an exact key combination
pub fn action_for(accelerator: Accelerator) -> Option<ShortcutAction> {
    BINDINGS
        .iter()
        .find(|(bound, _)| *bound == accelerator)
        .map(|(_, action)| *action)
}

/// Accept user-supplied text as a game link only if it belongs in Primary
pub fn accept_game_link(classifier: &UrlClassifier, text: &str) -> Option<String> {
    let candidate = text.trim();
    if classifier.classify(candidate) == ContentCategory::Primary {
        Some(candidate.to_string())
    } else {
        log::debug!("Rejected game link {:?}", candidate);
        None
    }
}

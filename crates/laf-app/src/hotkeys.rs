//! Shortcut registration
//!
//! The bindings are registered as global hotkeys only while the Primary
//! window has focus, so they behave like window accelerators and never
//! steal keys from other applications.

use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use global_hotkey::GlobalHotKeyManager;
use laf_shell::shortcuts::{Accelerator, Key, ShortcutAction, BINDINGS};
use tracing::{debug, warn};

pub struct HotkeyBinder {
    manager: Option<GlobalHotKeyManager>,
    bindings: Vec<(HotKey, ShortcutAction)>,
    registered: bool,
}

impl HotkeyBinder {
    pub fn new() -> Self {
        let manager = match GlobalHotKeyManager::new() {
            Ok(manager) => Some(manager),
            Err(e) => {
                warn!("Shortcuts unavailable: {}", e);
                None
            }
        };
        Self {
            manager,
            bindings: bindings(),
            registered: false,
        }
    }

    /// Register or release every binding as the Primary window gains or
    /// loses focus
    pub fn set_active(&mut self, active: bool) {
        let Some(manager) = &self.manager else {
            return;
        };
        if active == self.registered {
            return;
        }

        let hotkeys: Vec<HotKey> = self.bindings.iter().map(|(hotkey, _)| *hotkey).collect();
        let result = if active {
            manager.register_all(&hotkeys)
        } else {
            manager.unregister_all(&hotkeys)
        };
        match result {
            Ok(()) => {
                debug!("Shortcuts {}", if active { "registered" } else { "released" });
                self.registered = active;
            }
            Err(e) => warn!("Failed to update shortcuts: {}", e),
        }
    }

    pub fn action_for_id(&self, id: u32) -> Option<ShortcutAction> {
        self.bindings
            .iter()
            .find(|(hotkey, _)| hotkey.id() == id)
            .map(|(_, action)| *action)
    }
}

fn bindings() -> Vec<(HotKey, ShortcutAction)> {
    BINDINGS
        .iter()
        .filter_map(|(accelerator, action)| to_hotkey(*accelerator).map(|hotkey| (hotkey, *action)))
        .collect()
}

pub fn to_hotkey(accelerator: Accelerator) -> Option<HotKey> {
    let code = match accelerator.key {
        Key::Escape => Code::Escape,
        Key::F(n) => function_key(n)?,
    };

    let mut modifiers = Modifiers::empty();
    if accelerator.ctrl {
        modifiers |= Modifiers::CONTROL;
    }
    if accelerator.shift {
        modifiers |= Modifiers::SHIFT;
    }

    let modifiers = if modifiers.is_empty() { None } else { Some(modifiers) };
    Some(HotKey::new(modifiers, code))
}

fn function_key(n: u8) -> Option<Code> {
    let code = match n {
        1 => Code::F1,
        2 => Code::F2,
        3 => Code::F3,
        4 => Code::F4,
        5 => Code::F5,
        6 => Code::F6,
        7 => Code::F7,
        8 => Code::F8,
        9 => Code::F9,
        10 => Code::F10,
        11 => Code::F11,
        12 => Code::F12,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_binding_maps_to_a_hotkey() {
        let hotkeys = bindings();
        assert_eq!(hotkeys.len(), BINDINGS.len());

        let ids: HashSet<u32> = hotkeys.iter().map(|(hotkey, _)| hotkey.id()).collect();
        assert_eq!(ids.len(), hotkeys.len());
    }

    #[test]
    fn test_modifiers_are_kept() {
        let plain = to_hotkey(Accelerator::plain(Key::F(8))).unwrap();
        let shifted = to_hotkey(Accelerator::shift(Key::F(8))).unwrap();
        assert_eq!(plain, HotKey::new(None, Code::F8));
        assert_eq!(shifted, HotKey::new(Some(Modifiers::SHIFT), Code::F8));
        assert_ne!(plain.id(), shifted.id());

        let both = to_hotkey(Accelerator::ctrl_shift(Key::F(1))).unwrap();
        assert_eq!(
            both,
            HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::F1)
        );
    }

    #[test]
    fn test_unknown_function_key() {
        assert!(to_hotkey(Accelerator::plain(Key::F(13))).is_none());
    }

    #[test]
    fn test_action_lookup() {
        let hotkeys = bindings();
        let lookup = |accelerator| {
            let id = to_hotkey(accelerator).unwrap().id();
            hotkeys
                .iter()
                .find(|(hotkey, _)| hotkey.id() == id)
                .map(|(_, action)| *action)
        };
        assert_eq!(lookup(Accelerator::plain(Key::F(11))), Some(ShortcutAction::ToggleFullscreen));
        assert_eq!(lookup(Accelerator::ctrl(Key::F(1))), Some(ShortcutAction::OpenDevtools));
        assert_eq!(lookup(Accelerator::plain(Key::F(12))), None);
    }
}

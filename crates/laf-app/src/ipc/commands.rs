//! IPC command handlers
//!
//! Handlers mutate `AppState` and describe the window work they need as
//! `Effect`s; the event loop applies those against the live windows.

use super::{HostMessage, IpcMessage};
use crate::state::{AppState, PromptReply};
use laf_core::config::ConfigKey;
use laf_core::{LafResult, WindowKind};
use laf_shell::shortcuts::accept_game_link;
use laf_shell::windows::is_web_url;
use laf_shell::{ActivitySnapshot, PromptId, PromptOutcome, SettingsHost, ToolAction};
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Which document a message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Content(WindowKind),
    /// The native prompt window
    Prompt,
}

/// Window work requested by a handler
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    CloseWindow(WindowKind),
    Relaunch,
    /// Drop the webviews' browsing data
    ClearBrowsingData,
    /// Route a URL as if `source` had navigated to it
    Route { source: WindowKind, url: String },
    Send(WindowKind, HostMessage),
    /// Load a URL into the Primary window
    LoadPrimary(String),
    /// The active prompt was answered; close it and show the next one
    PromptFinished,
}

/// Modal dialogs shown on behalf of the settings tab
pub trait Dialogs {
    fn confirm(&mut self, message: &str) -> bool;
    fn alert(&mut self, message: &str);
}

/// Dialogs backed by the platform's message boxes
pub struct NativeDialogs;

impl Dialogs for NativeDialogs {
    fn confirm(&mut self, message: &str) -> bool {
        let result = MessageDialog::new()
            .set_level(MessageLevel::Info)
            .set_title("LaF")
            .set_description(message)
            .set_buttons(MessageButtons::OkCancel)
            .show();
        matches!(result, MessageDialogResult::Ok | MessageDialogResult::Yes)
    }

    fn alert(&mut self, message: &str) {
        MessageDialog::new()
            .set_level(MessageLevel::Info)
            .set_title("LaF")
            .set_description(message)
            .set_buttons(MessageButtons::Ok)
            .show();
    }
}

/// `SettingsHost` that records window work as effects
struct CommandHost<'a> {
    dialogs: &'a mut dyn Dialogs,
    cache_dir: PathBuf,
    effects: Vec<Effect>,
}

impl SettingsHost for CommandHost<'_> {
    fn confirm(&mut self, message: &str) -> bool {
        self.dialogs.confirm(message)
    }

    fn alert(&mut self, message: &str) {
        self.dialogs.alert(message)
    }

    fn clear_cache(&mut self) -> LafResult<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
        }
        fs::create_dir_all(&self.cache_dir)?;
        info!("Cleared cache at {:?}", self.cache_dir);
        self.effects.push(Effect::ClearBrowsingData);
        Ok(())
    }

    fn relaunch(&mut self) {
        self.effects.push(Effect::Relaunch);
    }
}

/// Handle one message and return the window work it needs
pub fn handle_message(
    state: &mut AppState,
    dialogs: &mut dyn Dialogs,
    origin: Origin,
    msg: IpcMessage,
    now_ms: u64,
) -> Vec<Effect> {
    debug!("IPC from {:?}: {:?}", origin, msg);

    let source = match (origin, msg) {
        (_, IpcMessage::Log { level, message }) => {
            handle_log(&level, &message);
            return Vec::new();
        }
        (Origin::Prompt, IpcMessage::PromptResult { id, value }) => {
            return handle_prompt_result(state, PromptId::from(id), value);
        }
        (Origin::Prompt, other) => {
            warn!("Ignoring {:?} from the prompt window", other);
            return Vec::new();
        }
        (Origin::Content(kind), msg) => (kind, msg),
    };

    match source {
        (kind, IpcMessage::Close) => vec![Effect::CloseWindow(kind)],
        (_, IpcMessage::Relaunch) => vec![Effect::Relaunch],
        (kind, IpcMessage::ClearCache) => {
            handle_tool_action(state, dialogs, kind, ToolAction::ClearCache)
        }
        (kind, IpcMessage::OpenLink { url }) => handle_open_link(kind, url),
        (kind, IpcMessage::GetVersion) => vec![Effect::Send(
            kind,
            HostMessage::Version(env!("CARGO_PKG_VERSION").to_string()),
        )],
        (kind, IpcMessage::PresenceBegin) => handle_presence_begin(state, kind, now_ms),
        (kind, IpcMessage::PresenceUpdate { snapshot }) => {
            handle_presence_update(state, kind, snapshot, now_ms)
        }
        (kind, IpcMessage::SetConfig { id, value }) => {
            handle_set_config(state, dialogs, kind, &id, value)
        }
        (kind, IpcMessage::ToolAction { action }) => {
            handle_tool_action(state, dialogs, kind, action)
        }
        (kind, IpcMessage::PromptResult { id, .. }) => {
            warn!("Ignoring prompt result {} from {} content", id, kind);
            Vec::new()
        }
        (_, IpcMessage::Log { .. }) => Vec::new(),
    }
}

fn handle_log(level: &str, message: &str) {
    match level.to_lowercase().as_str() {
        "debug" => debug!("[JS] {}", message),
        "info" => info!("[JS] {}", message),
        "warn" => warn!("[JS] {}", message),
        "error" => error!("[JS] {}", message),
        _ => info!("[JS] {}", message),
    }
}

fn handle_open_link(kind: WindowKind, url: String) -> Vec<Effect> {
    if !is_web_url(&url) {
        warn!("Refusing to open non-web link: {}", url);
        return Vec::new();
    }
    vec![Effect::Route { source: kind, url }]
}

fn handle_presence_begin(state: &mut AppState, kind: WindowKind, now_ms: u64) -> Vec<Effect> {
    if kind != WindowKind::Primary {
        debug!("Presence requested from {}, ignoring", kind);
        return vec![Effect::Send(kind, HostMessage::PresenceStop)];
    }
    if !state.store.get_bool(ConfigKey::EnableRpc) {
        return vec![Effect::Send(kind, HostMessage::PresenceStop)];
    }

    info!("Starting presence reporting");
    state.presence.begin(now_ms, &mut state.presence_log);
    Vec::new()
}

fn handle_presence_update(
    state: &mut AppState,
    kind: WindowKind,
    snapshot: Option<Value>,
    now_ms: u64,
) -> Vec<Effect> {
    let snapshot = snapshot.and_then(|value| {
        serde_json::from_value::<ActivitySnapshot>(value)
            .map_err(|e| debug!("Unreadable activity snapshot: {}", e))
            .ok()
    });

    if kind != WindowKind::Primary || !state.presence.update(snapshot, now_ms, &mut state.presence_log)
    {
        return vec![Effect::Send(kind, HostMessage::PresenceStop)];
    }
    Vec::new()
}

fn handle_set_config(
    state: &mut AppState,
    dialogs: &mut dyn Dialogs,
    kind: WindowKind,
    id: &str,
    value: Value,
) -> Vec<Effect> {
    let disables_presence = id == ConfigKey::EnableRpc.as_str() && value == Value::Bool(false);

    let mut host = CommandHost {
        dialogs,
        cache_dir: state.config.cache_dir.clone(),
        effects: Vec::new(),
    };
    if let Err(e) = state.settings.set_value(&mut state.store, &mut host, id, value) {
        warn!("Rejected setting from {}: {}", kind, e);
        return host.effects;
    }

    let mut effects = host.effects;
    if disables_presence && state.presence.stop() {
        info!("Presence reporting disabled");
        effects.push(Effect::Send(WindowKind::Primary, HostMessage::PresenceStop));
    }
    effects
}

fn handle_tool_action(
    state: &mut AppState,
    dialogs: &mut dyn Dialogs,
    kind: WindowKind,
    action: ToolAction,
) -> Vec<Effect> {
    info!("Running tool action {} from {}", action.as_str(), kind);

    let mut host = CommandHost {
        dialogs,
        cache_dir: state.config.cache_dir.clone(),
        effects: Vec::new(),
    };
    if let Err(e) = state.settings.run_action(&mut state.store, &mut host, action) {
        error!("Tool action {} failed: {}", action.as_str(), e);
    }
    host.effects
}

/// Resolve the active prompt and deliver its answer
pub fn handle_prompt_result(
    state: &mut AppState,
    id: PromptId,
    value: Option<String>,
) -> Vec<Effect> {
    let outcome = PromptOutcome::from_option(value);
    let Some(reply) = state.prompts.resolve(id, &outcome) else {
        return Vec::new();
    };

    let mut effects = vec![Effect::PromptFinished];
    match reply {
        PromptReply::Content(pending) => pending.json(outcome.reply_json()),
        PromptReply::JoinGame => {
            let classifier = state.classifier();
            match outcome.value().and_then(|text| accept_game_link(&classifier, text)) {
                Some(url) => {
                    info!("Joining game from link: {}", url);
                    effects.push(Effect::LoadPrimary(url));
                }
                None => debug!("Game link prompt produced no game URL"),
            }
        }
    }
    effects
}

//! Application state management
//!
//! This module contains the central state for the LaF client: the persisted
//! settings, the settings engine, parked prompts and the presence reporter.
//! The event loop owns it; wry handlers never touch it directly.

use crate::protocol::PendingResponse;
use laf_core::{AppConfig, ConfigStore, LafResult};
use laf_shell::{PresencePayload, PresenceReporter, PresenceSink, PromptBroker, SettingsEngine};
use std::fs;
use tracing::debug;

/// Where the answer to a prompt goes
#[derive(Debug)]
pub enum PromptReply {
    /// A `window.prompt` call blocked on the `laf` protocol
    Content(PendingResponse),
    /// The game link shortcut; a submitted URL is loaded into Primary
    JoinGame,
}

/// Presence sink that logs payloads and keeps the latest one
#[derive(Debug, Default)]
pub struct PresenceLog {
    latest: Option<PresencePayload>,
}

impl PresenceLog {
    pub fn latest(&self) -> Option<&PresencePayload> {
        self.latest.as_ref()
    }
}

impl PresenceSink for PresenceLog {
    fn publish(&mut self, payload: &PresencePayload) {
        match serde_json::to_string(payload) {
            Ok(json) => debug!("Presence: {}", json),
            Err(e) => debug!("Presence payload not serializable: {}", e),
        }
        self.latest = Some(payload.clone());
    }
}

/// Main application state
pub struct AppState {
    pub config: AppConfig,
    pub store: ConfigStore,
    /// Labelled in the language that was active at startup
    pub settings: SettingsEngine,
    pub prompts: PromptBroker<PromptReply>,
    pub presence: PresenceReporter,
    pub presence_log: PresenceLog,
}

impl AppState {
    /// Create state from an explicit configuration
    pub fn new(config: AppConfig) -> LafResult<Self> {
        fs::create_dir_all(&config.data_dir)?;
        fs::create_dir_all(&config.cache_dir)?;

        let store = ConfigStore::open(config.store_path());
        let settings = SettingsEngine::new(store.lang());

        Ok(Self {
            config,
            store,
            settings,
            prompts: PromptBroker::new(),
            presence: PresenceReporter::new(),
            presence_log: PresenceLog::default(),
        })
    }

    /// Create state in the platform's default directories
    pub fn with_defaults() -> LafResult<Self> {
        Self::new(AppConfig::default())
    }

    pub fn classifier(&self) -> laf_core::UrlClassifier {
        laf_core::UrlClassifier::new(self.config.primary_host.clone())
    }
}

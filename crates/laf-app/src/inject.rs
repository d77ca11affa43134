//! Scripts and engine switches injected into content
//!
//! Every document gets the same bootstrap, prefixed with a small config
//! object that tells it which window it runs in and which features are on.

use crate::protocol::BASE_URL;
use laf_core::config::ConfigKey;
use laf_core::{ConfigStore, WindowKind};
use laf_shell::presence::TICK_INTERVAL_MS;
use serde::Serialize;
use tracing::info;

const BOOTSTRAP_JS: &str = include_str!("ui/bootstrap.js");

/// Switches wry passes to WebView2 by default; supplying our own replaces them
const WEBVIEW2_DEFAULT_ARGS: &str = "--disable-features=msWebOOUI,msPdfOOUI,msSmartScreenProtection";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapConfig {
    pub kind: WindowKind,
    /// Base URL of the `laf` protocol
    pub protocol: &'static str,
    pub enable_timer: bool,
    pub enable_rpc: bool,
    pub exit_button: &'static str,
    pub presence_interval_ms: u64,
}

impl BootstrapConfig {
    pub fn new(kind: WindowKind, store: &ConfigStore) -> Self {
        Self {
            kind,
            protocol: BASE_URL,
            enable_timer: store.get_bool(ConfigKey::EnableTimer),
            enable_rpc: store.get_bool(ConfigKey::EnableRpc),
            exit_button: store.exit_button().as_str(),
            presence_interval_ms: TICK_INTERVAL_MS,
        }
    }
}

/// Initialization script for a content window of `kind`
pub fn bootstrap_script(kind: WindowKind, store: &ConfigStore) -> String {
    let config = BootstrapConfig::new(kind, store);
    let json = serde_json::to_string(&config).unwrap_or_else(|_| "{}".to_string());
    format!("window.__LAF__ = {};\n{}", json, BOOTSTRAP_JS)
}

/// Chromium switches derived from the render settings.
///
/// Read once at startup; changing a render setting needs a relaunch.
pub fn chromium_switches(store: &ConfigStore) -> Vec<String> {
    let mut switches = vec!["--enable-zero-copy".to_string()];

    if store.get_bool(ConfigKey::UnlimitedFps) {
        switches.push("--disable-frame-rate-limit".to_string());
        switches.push("--disable-gpu-vsync".to_string());
    }

    let angle = store.get_string(ConfigKey::AngleType);
    if angle != "default" {
        switches.push(format!("--use-angle={}", angle));
    }

    if store.get_bool(ConfigKey::Webgl2Context) {
        switches.push("--enable-webgl2-compute-context".to_string());
    }
    if !store.get_bool(ConfigKey::AcceleratedCanvas) {
        switches.push("--disable-accelerated-2d-canvas".to_string());
    }
    if store.get_bool(ConfigKey::InProcessGpu) {
        switches.push("--in-process-gpu".to_string());
    }

    switches
}

/// Full WebView2 argument string, logging what was enabled
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub fn browser_args(store: &ConfigStore) -> String {
    let switches = chromium_switches(store);
    info!("Chromium switches: {}", switches.join(" "));

    let mut args = String::from(WEBVIEW2_DEFAULT_ARGS);
    for switch in switches {
        args.push(' ');
        args.push_str(&switch);
    }
    args
}

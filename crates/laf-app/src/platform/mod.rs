//! Platform abstraction layer
//!
//! This module provides a unified interface for the operations that differ
//! across macOS, Windows, and Linux: the native menu, handing URLs to the
//! OS, relaunching the client and starting a downloaded installer.

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;
#[cfg(target_os = "linux")]
mod linux;

use laf_core::LafError;
use muda::Menu;
use std::path::Path;
use std::process::Command;
use tao::window::Window;
use tracing::{debug, info};

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Platform-specific error types
#[derive(Debug, Clone)]
pub enum PlatformError {
    /// Menu initialization failed
    MenuInitFailed(String),
    /// Failed to open external URL
    OpenExternalFailed(String),
    /// Failed to start the client or an installer
    LaunchFailed(String),
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::MenuInitFailed(msg) => write!(f, "Menu initialization failed: {}", msg),
            PlatformError::OpenExternalFailed(msg) => write!(f, "Failed to open external: {}", msg),
            PlatformError::LaunchFailed(msg) => write!(f, "Failed to launch: {}", msg),
        }
    }
}

impl std::error::Error for PlatformError {}

impl From<PlatformError> for LafError {
    fn from(err: PlatformError) -> Self {
        LafError::platform(err.to_string())
    }
}

/// WebView engine type for the current platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebViewEngine {
    /// WebKit (macOS native, Linux GTK)
    WebKit,
    /// WebView2 (Windows, Chromium-based)
    WebView2,
}

impl WebViewEngine {
    /// Whether the engine takes Chromium command-line switches
    pub fn accepts_chromium_switches(&self) -> bool {
        matches!(self, WebViewEngine::WebView2)
    }
}

/// Platform-specific capabilities
#[derive(Debug, Clone)]
pub struct PlatformCapabilities {
    /// Whether a native menu is required for clipboard operations (macOS)
    pub native_menu_required_for_clipboard: bool,
    /// The WebView engine used on this platform
    pub webview_engine: WebViewEngine,
    /// Platform name for logging/debugging
    pub platform_name: &'static str,
}

/// Trait for platform-specific operations
pub trait PlatformManager: Send + Sync {
    /// Initialize the native menu.
    ///
    /// Only macOS installs one, because Cmd+C/V need an Edit menu. Game
    /// windows stay menu-less everywhere else.
    fn initialize_menu(&self, window: &Window, menu: &Menu) -> PlatformResult<()>;

    /// Open a URL in the system's default browser
    fn open_external(&self, url: &str) -> PlatformResult<()>;

    /// Start a downloaded update package
    fn launch_installer(&self, path: &Path) -> PlatformResult<()>;

    /// Start a fresh instance of the client. The caller exits afterwards.
    fn relaunch(&self) -> PlatformResult<()> {
        let exe = std::env::current_exe()
            .map_err(|e| PlatformError::LaunchFailed(format!("current executable: {}", e)))?;
        info!("Relaunching {:?}", exe);

        Command::new(&exe)
            .args(std::env::args_os().skip(1))
            .spawn()
            .map_err(|e| PlatformError::LaunchFailed(format!("{:?}: {}", exe, e)))?;
        Ok(())
    }

    /// Get the platform's capabilities
    fn capabilities(&self) -> &PlatformCapabilities;

    /// Get the platform name for logging
    fn platform_name(&self) -> &'static str {
        self.capabilities().platform_name
    }
}

/// Get the platform manager for the current operating system
pub fn get_platform_manager() -> Box<dyn PlatformManager> {
    #[cfg(target_os = "macos")]
    {
        Box::new(macos::MacOSPlatform::new())
    }

    #[cfg(target_os = "windows")]
    {
        Box::new(windows::WindowsPlatform::new())
    }

    #[cfg(target_os = "linux")]
    {
        Box::new(linux::LinuxPlatform::new())
    }
}

/// Spawn `program` with `args`, mapping failures to `LaunchFailed`
pub(crate) fn spawn_detached(program: &str, args: &[&std::ffi::OsStr]) -> PlatformResult<()> {
    debug!("Spawning {} {:?}", program, args);
    Command::new(program)
        .args(args)
        .spawn()
        .map_err(|e| PlatformError::LaunchFailed(format!("{}: {}", program, e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_error_display() {
        let err = PlatformError::OpenExternalFailed("https://example.com: not found".into());
        assert_eq!(
            err.to_string(),
            "Failed to open external: https://example.com: not found"
        );

        let err: LafError = PlatformError::LaunchFailed("laf".into()).into();
        assert_eq!(err.to_string(), "Platform error: Failed to launch: laf");
    }

    #[test]
    fn test_current_platform_capabilities() {
        let platform = get_platform_manager();
        let caps = platform.capabilities();

        assert_eq!(platform.platform_name(), caps.platform_name);
        assert_eq!(
            caps.webview_engine.accepts_chromium_switches(),
            cfg!(target_os = "windows")
        );
        assert_eq!(
            caps.native_menu_required_for_clipboard,
            cfg!(target_os = "macos")
        );
    }
}

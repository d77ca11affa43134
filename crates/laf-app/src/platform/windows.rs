//! Windows platform implementation
//!
//! WebView2 on Windows. Game windows keep no menu; external URLs go
//! through the shell URL handler and update packages run silently.

use super::{
    spawn_detached, PlatformCapabilities, PlatformError, PlatformManager, PlatformResult,
    WebViewEngine,
};
use muda::Menu;
use std::ffi::OsStr;
use std::path::Path;
use tao::window::Window;
use tracing::debug;

/// Windows platform manager
pub struct WindowsPlatform {
    capabilities: PlatformCapabilities,
}

impl WindowsPlatform {
    pub fn new() -> Self {
        Self {
            capabilities: PlatformCapabilities {
                native_menu_required_for_clipboard: false,
                webview_engine: WebViewEngine::WebView2,
                platform_name: "Windows",
            },
        }
    }
}

impl Default for WindowsPlatform {
    fn default() -> Self {
        Self::new()
    }
}

fn is_msi(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case("msi"))
        .unwrap_or(false)
}

impl PlatformManager for WindowsPlatform {
    fn initialize_menu(&self, _window: &Window, _menu: &Menu) -> PlatformResult<()> {
        debug!("Windows game windows carry no menu bar");
        Ok(())
    }

    fn open_external(&self, url: &str) -> PlatformResult<()> {
        debug!("Opening external URL: {}", url);

        // Not `cmd /C start`: cmd would split game links at `&`
        spawn_detached(
            "rundll32",
            &[OsStr::new("url.dll,FileProtocolHandler"), OsStr::new(url)],
        )
        .map_err(|e| PlatformError::OpenExternalFailed(format!("{}: {}", url, e)))
    }

    fn launch_installer(&self, path: &Path) -> PlatformResult<()> {
        if is_msi(path) {
            return spawn_detached(
                "msiexec",
                &[OsStr::new("/i"), path.as_os_str(), OsStr::new("/passive")],
            );
        }

        let program = path.to_string_lossy();
        spawn_detached(&program, &[OsStr::new("/S"), OsStr::new("--force-run")])
    }

    fn capabilities(&self) -> &PlatformCapabilities {
        &self.capabilities
    }
}

//! macOS platform implementation
//!
//! The native menu is required for clipboard shortcuts (Cmd+C/V) to work
//! inside the game, so macOS gets an app menu and an Edit menu.

use super::{
    spawn_detached, PlatformCapabilities, PlatformError, PlatformManager, PlatformResult,
    WebViewEngine,
};
use muda::{Menu, PredefinedMenuItem, Submenu};
use std::ffi::OsStr;
use std::path::Path;
use tao::window::Window;
use tracing::debug;

/// macOS platform manager
pub struct MacOSPlatform {
    capabilities: PlatformCapabilities,
}

impl MacOSPlatform {
    pub fn new() -> Self {
        Self {
            capabilities: PlatformCapabilities {
                native_menu_required_for_clipboard: true,
                webview_engine: WebViewEngine::WebKit,
                platform_name: "macOS",
            },
        }
    }
}

/// Append a submenu built from predefined items
fn append_submenu(menu: &Menu, title: &str, items: &[PredefinedMenuItem]) -> PlatformResult<()> {
    let submenu = Submenu::new(title, true);
    for item in items {
        submenu
            .append(item)
            .map_err(|e| PlatformError::MenuInitFailed(format!("{}: {}", title, e)))?;
    }
    menu.append(&submenu)
        .map_err(|e| PlatformError::MenuInitFailed(format!("{}: {}", title, e)))
}

impl Default for MacOSPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformManager for MacOSPlatform {
    fn initialize_menu(&self, _window: &Window, menu: &Menu) -> PlatformResult<()> {
        // The first submenu becomes the application menu
        append_submenu(menu, "LaF", &[PredefinedMenuItem::quit(None)])?;
        append_submenu(
            menu,
            "Edit",
            &[
                PredefinedMenuItem::cut(None),
                PredefinedMenuItem::copy(None),
                PredefinedMenuItem::paste(None),
                PredefinedMenuItem::select_all(None),
            ],
        )?;
        menu.init_for_nsapp();

        debug!("macOS menu initialized");
        Ok(())
    }

    fn open_external(&self, url: &str) -> PlatformResult<()> {
        debug!("Opening external URL: {}", url);

        spawn_detached("open", &[OsStr::new(url)])
            .map_err(|e| PlatformError::OpenExternalFailed(format!("{}: {}", url, e)))
    }

    fn launch_installer(&self, path: &Path) -> PlatformResult<()> {
        spawn_detached("open", &[path.as_os_str()])
    }

    fn capabilities(&self) -> &PlatformCapabilities {
        &self.capabilities
    }
}

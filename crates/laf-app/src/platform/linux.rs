//! Linux platform implementation
//!
//! GTK WebKit on Linux. The xdg-open command is used for external
//! operations; AppImage updates are made executable and started directly.

use super::{
    spawn_detached, PlatformCapabilities, PlatformError, PlatformManager, PlatformResult,
    WebViewEngine,
};
use muda::Menu;
use std::ffi::OsStr;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tao::window::Window;
use tracing::debug;

/// Linux platform manager
pub struct LinuxPlatform {
    capabilities: PlatformCapabilities,
}

impl LinuxPlatform {
    pub fn new() -> Self {
        Self {
            capabilities: PlatformCapabilities {
                native_menu_required_for_clipboard: false,
                webview_engine: WebViewEngine::WebKit,
                platform_name: "Linux",
            },
        }
    }
}

impl Default for LinuxPlatform {
    fn default() -> Self {
        Self::new()
    }
}

fn is_appimage(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| ext.eq_ignore_ascii_case("appimage"))
        .unwrap_or(false)
}

impl PlatformManager for LinuxPlatform {
    fn initialize_menu(&self, _window: &Window, _menu: &Menu) -> PlatformResult<()> {
        debug!("Linux game windows carry no menu bar");
        Ok(())
    }

    fn open_external(&self, url: &str) -> PlatformResult<()> {
        debug!("Opening external URL: {}", url);

        spawn_detached("xdg-open", &[OsStr::new(url)])
            .map_err(|e| PlatformError::OpenExternalFailed(format!("{}: {}", url, e)))
    }

    fn launch_installer(&self, path: &Path) -> PlatformResult<()> {
        if !is_appimage(path) {
            return spawn_detached("xdg-open", &[path.as_os_str()]);
        }

        let mut permissions = fs::metadata(path)
            .map_err(|e| PlatformError::LaunchFailed(format!("{:?}: {}", path, e)))?
            .permissions();
        permissions.set_mode(0o755);
        fs::set_permissions(path, permissions)
            .map_err(|e| PlatformError::LaunchFailed(format!("{:?}: {}", path, e)))?;

        let program = path.to_string_lossy();
        spawn_detached(&program, &[])
    }

    fn capabilities(&self) -> &PlatformCapabilities {
        &self.capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_capabilities() {
        let platform = LinuxPlatform::new();
        let caps = platform.capabilities();

        assert!(!caps.native_menu_required_for_clipboard);
        assert_eq!(caps.webview_engine, WebViewEngine::WebKit);
        assert_eq!(caps.platform_name, "Linux");
    }

    #[test]
    fn test_appimage_detection() {
        assert!(is_appimage(Path::new("/tmp/LaF-1.2.0.AppImage")));
        assert!(is_appimage(Path::new("laf.appimage")));
        assert!(!is_appimage(Path::new("/tmp/laf_1.2.0_amd64.deb")));
        assert!(!is_appimage(Path::new("/tmp/laf")));
    }

    #[test]
    fn test_missing_installer_fails() {
        let platform = LinuxPlatform::new();
        let result = platform.launch_installer(Path::new("/nonexistent/LaF.AppImage"));
        assert!(matches!(result, Err(PlatformError::LaunchFailed(_))));
    }
}

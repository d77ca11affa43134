//! Building wry webviews for LaF windows
//!
//! Content windows, the splash and the prompt window all go through
//! [`attach`], which picks the GTK container on Linux and the native window
//! handle everywhere else. Handlers installed here never touch state; they
//! only post a [`UserEvent`] to the event loop.

use crate::ipc::commands::Origin;
use crate::protocol::{self, PendingResponse, SCHEME};
use crate::UserEvent;
use laf_core::{UrlClassifier, WindowKind};
use laf_shell::windows::{allows_in_place, is_web_url};
use tao::event_loop::EventLoopProxy;
use tao::window::{Window, WindowBuilder};
use tracing::{debug, warn};
use wry::http::{Request, StatusCode};
use wry::{PageLoadEvent, WebView, WebViewBuilder};

/// A content window and the webview filling it.
///
/// The webview is declared first so it drops before its window.
pub struct ContentWindow {
    pub webview: WebView,
    pub window: Window,
}

/// Everything a content webview needs besides its window
pub struct ContentOptions<'a> {
    pub kind: WindowKind,
    pub url: &'a str,
    pub init_script: String,
    pub classifier: UrlClassifier,
    /// WebView2 command line, ignored on other engines
    pub browser_args: &'a str,
}

/// Keep a child window above `parent`
pub fn with_parent(builder: WindowBuilder, parent: &Window) -> WindowBuilder {
    #[cfg(target_os = "windows")]
    {
        use tao::platform::windows::{WindowBuilderExtWindows, WindowExtWindows};
        builder.with_owner_window(parent.hwnd() as _)
    }

    #[cfg(target_os = "linux")]
    {
        use tao::platform::unix::{WindowBuilderExtUnix, WindowExtUnix};
        builder.with_transient_for(parent.gtk_window())
    }

    #[cfg(target_os = "macos")]
    {
        use tao::platform::macos::{WindowBuilderExtMacOS, WindowExtMacOS};
        builder.with_parent_window(parent.ns_window())
    }
}

/// Build `builder` into `window`
pub fn attach(builder: WebViewBuilder, window: &Window) -> wry::Result<WebView> {
    #[cfg(target_os = "linux")]
    {
        use tao::platform::unix::WindowExtUnix;
        use wry::WebViewBuilderExtUnix;
        let vbox = window
            .default_vbox()
            .ok_or(wry::Error::MessageSender)?;
        builder.build_gtk(vbox)
    }

    #[cfg(not(target_os = "linux"))]
    {
        builder.build(window)
    }
}

/// Whether a navigation of `source` to `url` may proceed in the document.
///
/// Only a switch to another LaF window kind is taken over. Links to foreign
/// sites are left alone here because frames and sign-in redirects pass
/// through the same handler; foreign links opened as new windows still go to
/// the OS browser.
///
/// This is narrower than `WindowManager::route_navigation`, which hands an
/// External URL to the OS. That path is reached from new-window requests and
/// IPC links, never from a top-level navigation.
pub fn navigation_stays(classifier: &UrlClassifier, source: WindowKind, url: &str) -> bool {
    if allows_in_place(classifier, source, url) {
        return true;
    }
    classifier.classify(url).window_kind().is_none()
}

/// Webview for a content window of `options.kind`
pub fn build_content(
    window: &Window,
    options: ContentOptions<'_>,
    proxy: &EventLoopProxy<UserEvent>,
) -> wry::Result<WebView> {
    let kind = options.kind;

    let ipc_proxy = proxy.clone();
    let nav_proxy = proxy.clone();
    let popup_proxy = proxy.clone();
    let load_proxy = proxy.clone();
    let protocol_proxy = proxy.clone();
    let classifier = options.classifier;

    let builder = WebViewBuilder::new()
        .with_url(options.url)
        .with_initialization_script(&options.init_script)
        .with_devtools(true)
        .with_ipc_handler(move |req: Request<String>| {
            let _ = ipc_proxy.send_event(UserEvent::Ipc {
                origin: Origin::Content(kind),
                body: req.body().clone(),
            });
        })
        .with_navigation_handler(move |url: String| {
            if navigation_stays(&classifier, kind, &url) {
                return true;
            }
            debug!("Taking over navigation of {} to {}", kind, url);
            let _ = nav_proxy.send_event(UserEvent::Route { source: kind, url });
            false
        })
        .with_new_window_req_handler(move |url: String| {
            if is_web_url(&url) {
                let _ = popup_proxy.send_event(UserEvent::Route { source: kind, url });
            } else {
                debug!("Ignoring new window for {}", url);
            }
            false
        })
        .with_on_page_load_handler(move |event, _url| match event {
            PageLoadEvent::Started => {}
            PageLoadEvent::Finished => {
                let _ = load_proxy.send_event(UserEvent::PageLoaded(kind));
            }
        })
        .with_asynchronous_custom_protocol(SCHEME.into(), move |_id, request, responder| {
            let uri = request.uri();
            match protocol::parse(uri.path(), uri.query()) {
                Ok(parsed) => {
                    let _ = protocol_proxy.send_event(UserEvent::Protocol {
                        request: parsed,
                        responder: PendingResponse::new(responder),
                    });
                }
                Err(e) => {
                    warn!("Rejecting {} request {}: {}", SCHEME, uri, e);
                    PendingResponse::new(responder).error(StatusCode::BAD_REQUEST, &e);
                }
            }
        });

    #[cfg(target_os = "windows")]
    let builder = {
        use wry::WebViewBuilderExtWindows;
        builder
            .with_https_scheme(true)
            .with_additional_browser_args(options.browser_args)
    };
    #[cfg(not(target_os = "windows"))]
    let _ = options.browser_args;

    attach(builder, window)
}

/// Webview showing a bundled page, reporting only when it finished loading
pub fn build_page(
    window: &Window,
    html: &str,
    init_script: Option<String>,
    on_loaded: impl Fn() + 'static,
    ipc: Option<Box<dyn Fn(String) + 'static>>,
) -> wry::Result<WebView> {
    let mut builder = WebViewBuilder::new()
        .with_html(html)
        .with_on_page_load_handler(move |event, _url| {
            if let PageLoadEvent::Finished = event {
                on_loaded();
            }
        });

    if let Some(script) = init_script {
        builder = builder.with_initialization_script(&script);
    }
    if let Some(ipc) = ipc {
        builder = builder.with_ipc_handler(move |req: Request<String>| ipc(req.body().clone()));
    }

    attach(builder, window)
}

/// Run a script, logging instead of failing
pub fn eval_script(webview: &WebView, script: &str) {
    if let Err(e) = webview.evaluate_script(script) {
        warn!("Script evaluation failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> UrlClassifier {
        UrlClassifier::new("laf-primary.example")
    }

    #[test]
    fn test_same_kind_stays() {
        let c = classifier();
        assert!(navigation_stays(&c, WindowKind::Primary, "https://laf-primary.example/?game=NY:abc"));
        assert!(navigation_stays(&c, WindowKind::SecondaryA, "https://laf-primary.example/social.html"));
    }

    #[test]
    fn test_non_web_schemes_stay() {
        let c = classifier();
        assert!(navigation_stays(&c, WindowKind::Primary, "about:blank"));
        assert!(navigation_stays(&c, WindowKind::SecondaryB, "data:text/html,hi"));
    }

    #[test]
    fn test_foreign_sites_stay() {
        let c = classifier();
        assert!(navigation_stays(&c, WindowKind::Primary, "https://ads.example.net/frame"));
    }

    #[test]
    fn test_external_top_level_navigation_stays() {
        let c = classifier();
        let url = "https://discord.example.com/invite/abc";
        assert_eq!(c.classify(url), laf_core::ContentCategory::External);
        assert!(navigation_stays(&c, WindowKind::Primary, url));
        assert!(navigation_stays(&c, WindowKind::SecondaryA, url));
    }

    #[test]
    fn test_switching_kind_is_taken_over() {
        let c = classifier();
        assert!(!navigation_stays(&c, WindowKind::Primary, "https://laf-primary.example/social.html"));
        assert!(!navigation_stays(&c, WindowKind::SecondaryA, "https://laf-primary.example/editor.html"));
        assert!(!navigation_stays(&c, WindowKind::SecondaryB, "https://laf-primary.example/?game=NY:abc"));
    }
}

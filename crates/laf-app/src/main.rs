//! LaF - Main Application Entry Point
//!
//! A small splash window checks for updates first. Once the check settles
//! the Primary game window takes over, and the Hub and Editor windows are
//! opened on demand as content navigates to them.
//!
//! Native callbacks only post a [`UserEvent`]; all state lives in [`App`],
//! which the event loop owns.

mod hotkeys;
mod inject;
mod ipc;
mod platform;
mod protocol;
mod state;
mod updater;
mod webview;

use anyhow::Context;
use arboard::Clipboard;
use global_hotkey::{GlobalHotKeyEvent, HotKeyState};
use hotkeys::HotkeyBinder;
use ipc::commands::{self, Effect, NativeDialogs, Origin};
use ipc::{HostMessage, IpcMessage};
use laf_core::{ConfigStore, LafError, LafResult, UrlClassifier, WindowKind};
use laf_shell::shortcuts::{accept_game_link, ShortcutAction};
use laf_shell::update::UpdateEffect;
use laf_shell::{ClosePolicy, PromptId, PromptOutcome, PromptRequest, UpdateMachine, WindowBackend, WindowManager};
use muda::Menu;
use platform::{get_platform_manager, PlatformManager};
use protocol::{LafRequest, PendingResponse};
use semver::Version;
use serde_json::Value;
use state::{AppState, PromptReply};
use std::path::PathBuf;
use std::thread;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tao::{
    dpi::{LogicalSize, PhysicalPosition},
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy, EventLoopWindowTarget},
    window::{Fullscreen, WindowBuilder, WindowId},
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use updater::{HttpUpdateSource, SourceMessage};
use webview::{eval_script, ContentOptions, ContentWindow};

/// The HTML content for the update splash
const SPLASH_HTML: &str = include_str!("ui/splash.html");
/// The HTML content for the native prompt window
const PROMPT_HTML: &str = include_str!("ui/prompt.html");

const SPLASH_SIZE: (f64, f64) = (600.0, 400.0);
const PROMPT_SIZE: (f64, f64) = (420.0, 190.0);

/// Everything native callbacks report to the event loop
#[derive(Debug)]
pub enum UserEvent {
    /// Progress from the update thread
    Update(SourceMessage),
    /// Raw IPC body posted by a document
    Ipc { origin: Origin, body: String },
    /// A navigation the handlers took over
    Route { source: WindowKind, url: String },
    /// A content window finished loading a document
    PageLoaded(WindowKind),
    SplashLoaded,
    /// A `laf` protocol request waiting for its answer
    Protocol {
        request: LafRequest,
        responder: PendingResponse,
    },
    /// A registered shortcut was pressed
    Hotkey(u32),
}

/// Creates content windows for the window manager
struct TaoBackend<'a> {
    target: &'a EventLoopWindowTarget<UserEvent>,
    host: &'a Host,
    store: &'a ConfigStore,
}

impl WindowBackend for TaoBackend<'_> {
    type Handle = ContentWindow;

    fn create(
        &mut self,
        kind: WindowKind,
        url: &str,
        parent: Option<&ContentWindow>,
    ) -> LafResult<ContentWindow> {
        let (width, height) = kind.default_size();
        let mut builder = WindowBuilder::new()
            .with_title(kind.title())
            .with_inner_size(LogicalSize::new(width, height))
            .with_visible(false);
        if let Some(parent) = parent {
            builder = webview::with_parent(builder, &parent.window);
        }

        let window = builder
            .build(self.target)
            .map_err(|e| LafError::window(format!("Failed to create {} window: {}", kind, e)))?;

        let options = ContentOptions {
            kind,
            url,
            init_script: inject::bootstrap_script(kind, self.store),
            classifier: self.host.classifier.clone(),
            browser_args: &self.host.browser_args,
        };
        let webview = webview::build_content(&window, options, &self.host.proxy)
            .map_err(|e| LafError::window(format!("Failed to create {} webview: {}", kind, e)))?;

        Ok(ContentWindow { webview, window })
    }

    fn load_url(&mut self, handle: &ContentWindow, url: &str) {
        if let Err(e) = handle.webview.load_url(url) {
            warn!("Failed to load {}: {}", url, e);
        }
    }

    fn reveal(&mut self, handle: &ContentWindow, kind: WindowKind) {
        handle.window.set_title(kind.title());
        handle.window.set_visible(true);
        handle.window.set_focus();
    }

    fn open_external(&mut self, url: &str) -> LafResult<()> {
        info!("Opening {} in the default browser", url);
        self.host.platform.open_external(url)?;
        Ok(())
    }
}

/// Long-lived pieces the window backend borrows
struct Host {
    proxy: EventLoopProxy<UserEvent>,
    platform: Box<dyn PlatformManager>,
    classifier: UrlClassifier,
    browser_args: String,
}

impl Host {
    fn backend<'a>(
        &'a self,
        target: &'a EventLoopWindowTarget<UserEvent>,
        store: &'a ConfigStore,
    ) -> TaoBackend<'a> {
        TaoBackend {
            target,
            host: self,
            store,
        }
    }
}

/// The prompt window currently on screen
struct PromptWindow {
    id: PromptId,
    view: ContentWindow,
}

struct App {
    state: AppState,
    manager: WindowManager<ContentWindow>,
    host: Host,
    dialogs: NativeDialogs,
    hotkeys: HotkeyBinder,
    clipboard: Option<Clipboard>,
    splash: Option<ContentWindow>,
    updates: Option<UpdateMachine>,
    installer: Option<PathBuf>,
    prompt: Option<PromptWindow>,
    _menu: Option<Menu>,
    exiting: bool,
}

impl App {
    fn control_flow(&self) -> ControlFlow {
        if self.exiting {
            return ControlFlow::Exit;
        }
        match self.updates.as_ref().and_then(UpdateMachine::next_deadline) {
            Some(deadline) => ControlFlow::WaitUntil(deadline),
            None => ControlFlow::Wait,
        }
    }

    fn handle_user_event(&mut self, event: UserEvent, target: &EventLoopWindowTarget<UserEvent>) {
        match event {
            UserEvent::SplashLoaded => self.start_update_check(target),
            UserEvent::Update(message) => self.on_update(message, target),
            UserEvent::Ipc { origin, body } => self.on_ipc(origin, &body, target),
            UserEvent::Route { source, url } => self.route(source, &url, target),
            UserEvent::PageLoaded(kind) => self.on_page_loaded(kind, target),
            UserEvent::Protocol { request, responder } => {
                self.on_protocol(request, responder, target)
            }
            UserEvent::Hotkey(id) => self.on_hotkey(id, target),
        }
    }

    fn handle_window_event(
        &mut self,
        window_id: WindowId,
        event: WindowEvent,
        target: &EventLoopWindowTarget<UserEvent>,
    ) {
        if self.splash.as_ref().map(|s| s.window.id()) == Some(window_id) {
            if let WindowEvent::CloseRequested = event {
                info!("Splash closed before the game started");
                self.shutdown();
            }
            return;
        }

        let prompt_id = self
            .prompt
            .as_ref()
            .filter(|prompt| prompt.view.window.id() == window_id)
            .map(|prompt| prompt.id);
        if let Some(id) = prompt_id {
            // Closing the window counts as Cancel
            if let WindowEvent::CloseRequested = event {
                let effects = commands::handle_prompt_result(&mut self.state, id, None);
                self.apply(effects, target);
            }
            return;
        }

        let Some(kind) = self.manager.find_kind(|w| w.window.id() == window_id) else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => self.close_window(kind),
            WindowEvent::Focused(focused) if kind == WindowKind::Primary => {
                self.hotkeys.set_active(focused);
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Updates and the splash
    // ------------------------------------------------------------------

    fn start_update_check(&mut self, target: &EventLoopWindowTarget<UserEvent>) {
        if self.updates.is_some() {
            return;
        }
        if let Some(splash) = &self.splash {
            splash.window.set_visible(true);
        }
        self.updates = Some(UpdateMachine::new(Instant::now()));

        let current = Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or(Version::new(0, 0, 0));
        let source = HttpUpdateSource::new(
            self.state.config.update_feed.clone(),
            current,
            self.state.config.cache_dir.join("updates"),
        );
        let proxy = self.host.proxy.clone();
        let spawned = thread::Builder::new()
            .name("laf-updater".into())
            .spawn(move || {
                source.run(&mut |message| {
                    let _ = proxy.send_event(UserEvent::Update(message));
                })
            });

        if let Err(e) = spawned {
            error!("Failed to start update check: {}", e);
            self.on_update(
                SourceMessage::Event(laf_shell::UpdateEvent::Error(e.to_string())),
                target,
            );
        }
    }

    fn on_update(&mut self, message: SourceMessage, target: &EventLoopWindowTarget<UserEvent>) {
        let event = match message {
            SourceMessage::InstallerReady(path) => {
                debug!("Installer ready at {:?}", path);
                self.installer = Some(path);
                return;
            }
            SourceMessage::Event(event) => event,
        };
        let Some(machine) = self.updates.as_mut() else {
            return;
        };
        let effects = machine.handle(event, Instant::now());
        self.apply_update_effects(effects, target);
    }

    fn poll_updates(&mut self, target: &EventLoopWindowTarget<UserEvent>) {
        let Some(machine) = self.updates.as_mut() else {
            return;
        };
        let effects = machine.poll(Instant::now());
        self.apply_update_effects(effects, target);
    }

    fn apply_update_effects(
        &mut self,
        effects: Vec<UpdateEffect>,
        target: &EventLoopWindowTarget<UserEvent>,
    ) {
        for effect in effects {
            match effect {
                UpdateEffect::Status(status) => {
                    let text = status.text(self.state.settings.labels());
                    if let Some(splash) = &self.splash {
                        let script = format!("window.setStatus({});", Value::String(text));
                        eval_script(&splash.webview, &script);
                    }
                }
                UpdateEffect::HandOff => self.open_primary(target),
                UpdateEffect::InstallAndRestart => self.install_update(target),
            }
        }
    }

    fn open_primary(&mut self, target: &EventLoopWindowTarget<UserEvent>) {
        let home = self.host.classifier.home_url();
        let mut backend = self.host.backend(target, &self.state.store);
        if let Err(e) = self.manager.ensure_primary(&mut backend, &home) {
            error!("Cannot open the game window: {}", e);
            self.shutdown();
        }
    }

    fn install_update(&mut self, target: &EventLoopWindowTarget<UserEvent>) {
        let Some(path) = self.installer.take() else {
            error!("Update downloaded but no installer was recorded");
            self.open_primary(target);
            return;
        };

        match self.host.platform.launch_installer(&path) {
            Ok(()) => {
                info!("Installer started, exiting");
                self.shutdown();
            }
            Err(e) => {
                error!("Failed to start installer {:?}: {}", path, e);
                self.open_primary(target);
            }
        }
    }

    // ------------------------------------------------------------------
    // Content windows
    // ------------------------------------------------------------------

    fn on_page_loaded(&mut self, kind: WindowKind, target: &EventLoopWindowTarget<UserEvent>) {
        let mut backend = self.host.backend(target, &self.state.store);
        if self.manager.mark_ready(&mut backend, kind) && kind == WindowKind::Primary {
            debug!("Game window ready, closing splash");
            self.splash = None;
        }
    }

    fn on_ipc(&mut self, origin: Origin, body: &str, target: &EventLoopWindowTarget<UserEvent>) {
        let msg: IpcMessage = match serde_json::from_str(body) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Invalid IPC message from {:?}: {} ({})", origin, e, body);
                return;
            }
        };
        let effects = commands::handle_message(&mut self.state, &mut self.dialogs, origin, msg, now_ms());
        self.apply(effects, target);
    }

    fn apply(&mut self, effects: Vec<Effect>, target: &EventLoopWindowTarget<UserEvent>) {
        for effect in effects {
            if self.exiting {
                return;
            }
            match effect {
                Effect::CloseWindow(kind) => self.close_window(kind),
                Effect::Relaunch => self.relaunch(),
                Effect::ClearBrowsingData => {
                    for kind in self.manager.live_kinds() {
                        if let Some(w) = self.manager.get(kind) {
                            if let Err(e) = w.webview.clear_all_browsing_data() {
                                warn!("Failed to clear browsing data of {}: {}", kind, e);
                            }
                        }
                    }
                }
                Effect::Route { source, url } => self.route(source, &url, target),
                Effect::Send(kind, msg) => self.send(kind, &msg),
                Effect::LoadPrimary(url) => {
                    if let Some(primary) = self.manager.get(WindowKind::Primary) {
                        let mut backend = self.host.backend(target, &self.state.store);
                        backend.load_url(primary, &url);
                    }
                }
                Effect::PromptFinished => {
                    self.prompt = None;
                    self.show_prompt(target);
                }
            }
        }
    }

    fn route(&mut self, source: WindowKind, url: &str, target: &EventLoopWindowTarget<UserEvent>) {
        let mut backend = self.host.backend(target, &self.state.store);
        match self.manager.route_navigation(&mut backend, source, url) {
            Ok(outcome) => debug!("Routed {} from {}: {:?}", url, source, outcome),
            Err(e) => warn!("Failed to route {} from {}: {}", url, source, e),
        }
    }

    fn send(&self, kind: WindowKind, msg: &HostMessage) {
        match self.manager.get(kind) {
            Some(w) => eval_script(&w.webview, &msg.to_script()),
            None => debug!("Dropping {} for closed {} window", msg.name(), kind),
        }
    }

    fn close_window(&mut self, kind: WindowKind) {
        if kind == WindowKind::Primary {
            self.state.presence.stop();
            self.hotkeys.set_active(false);
        }
        if let ClosePolicy::ShutDown = self.manager.on_closed(kind) {
            self.shutdown();
        }
    }

    fn relaunch(&mut self) {
        match self.host.platform.relaunch() {
            Ok(()) => self.shutdown(),
            Err(e) => error!("Relaunch failed: {}", e),
        }
    }

    fn shutdown(&mut self) {
        if self.exiting {
            return;
        }
        info!("Shutting down");
        self.exiting = true;

        let cancelled = PromptOutcome::Cancelled.reply_json();
        for reply in self.state.prompts.cancel_all() {
            if let PromptReply::Content(pending) = reply {
                pending.json(cancelled.clone());
            }
        }
        self.prompt = None;
        self.hotkeys.set_active(false);
        self.manager.close_all();
        self.splash = None;
    }

    // ------------------------------------------------------------------
    // Protocol and prompts
    // ------------------------------------------------------------------

    fn on_protocol(
        &mut self,
        request: LafRequest,
        responder: PendingResponse,
        target: &EventLoopWindowTarget<UserEvent>,
    ) {
        match request {
            LafRequest::Settings(view) => {
                responder.html(self.state.settings.render(&self.state.store, &view));
            }
            LafRequest::Prompt { message, value } => {
                let request = PromptRequest {
                    label: message,
                    ..PromptRequest::text("LaF", value)
                };
                self.state.prompts.submit(request, PromptReply::Content(responder));
                self.show_prompt(target);
            }
        }
    }

    /// Open the window for the active prompt unless one is showing
    fn show_prompt(&mut self, target: &EventLoopWindowTarget<UserEvent>) {
        if self.prompt.is_some() {
            return;
        }
        let Some((id, request)) = self.state.prompts.active() else {
            return;
        };
        let request = request.clone();
        let parent = self.manager.get(WindowKind::Primary).map(|w| &w.window);

        match build_prompt_window(target, &self.host.proxy, id, &request, parent) {
            Ok(view) => self.prompt = Some(PromptWindow { id, view }),
            Err(e) => {
                error!("Failed to open prompt window: {}", e);
                let effects = commands::handle_prompt_result(&mut self.state, id, None);
                self.apply(effects, target);
            }
        }
    }

    // ------------------------------------------------------------------
    // Shortcuts
    // ------------------------------------------------------------------

    fn on_hotkey(&mut self, id: u32, target: &EventLoopWindowTarget<UserEvent>) {
        let Some(action) = self.hotkeys.action_for_id(id) else {
            return;
        };
        debug!("Shortcut: {:?}", action);

        match action {
            ShortcutAction::PromptGameLink => {
                let labels = self.state.settings.labels();
                let request = PromptRequest::url(labels.game_link_title, labels.game_link_label);
                self.state.prompts.submit(request, PromptReply::JoinGame);
                self.show_prompt(target);
                return;
            }
            ShortcutAction::Relaunch => {
                self.relaunch();
                return;
            }
            _ => {}
        }

        let Some(primary) = self.manager.get(WindowKind::Primary) else {
            return;
        };
        match action {
            ShortcutAction::ExitPointerLock => eval_script(&primary.webview, &HostMessage::Esc.to_script()),
            ShortcutAction::Reload => eval_script(&primary.webview, "window.location.reload();"),
            ShortcutAction::NewMatch => {
                if let Err(e) = primary.webview.load_url(&self.host.classifier.home_url()) {
                    warn!("Failed to load home page: {}", e);
                }
            }
            ShortcutAction::CopyInviteLink => match primary.webview.url() {
                Ok(url) => copy_text(self.clipboard.as_mut(), &url),
                Err(e) => warn!("Cannot read game URL: {}", e),
            },
            ShortcutAction::JoinFromClipboard => {
                let link = read_text(self.clipboard.as_mut())
                    .and_then(|text| accept_game_link(&self.host.classifier, &text));
                match link {
                    Some(url) => {
                        info!("Joining game from clipboard: {}", url);
                        if let Err(e) = primary.webview.load_url(&url) {
                            warn!("Failed to load {}: {}", url, e);
                        }
                    }
                    None => debug!("Clipboard does not hold a game link"),
                }
            }
            ShortcutAction::ToggleFullscreen => {
                let fullscreen = primary.window.fullscreen().is_some();
                primary.window.set_fullscreen(if fullscreen {
                    None
                } else {
                    Some(Fullscreen::Borderless(None))
                });
            }
            ShortcutAction::OpenDevtools => primary.webview.open_devtools(),
            ShortcutAction::PromptGameLink | ShortcutAction::Relaunch => {}
        }
    }
}

fn build_prompt_window(
    target: &EventLoopWindowTarget<UserEvent>,
    proxy: &EventLoopProxy<UserEvent>,
    id: PromptId,
    request: &PromptRequest,
    parent: Option<&tao::window::Window>,
) -> LafResult<ContentWindow> {
    let mut builder = WindowBuilder::new()
        .with_title(request.title.as_str())
        .with_inner_size(LogicalSize::new(PROMPT_SIZE.0, PROMPT_SIZE.1))
        .with_resizable(false)
        .with_always_on_top(true);
    if let Some(parent) = parent {
        builder = webview::with_parent(builder, parent);
    }
    let window = builder
        .build(target)
        .map_err(|e| LafError::window(e.to_string()))?;

    let mut data = serde_json::to_value(request)?;
    data["id"] = Value::from(id.value());
    let init_script = format!("window.__LAF_PROMPT__ = {};", data);

    let proxy = proxy.clone();
    let ipc: Box<dyn Fn(String)> = Box::new(move |body: String| {
        let _ = proxy.send_event(UserEvent::Ipc {
            origin: Origin::Prompt,
            body,
        });
    });
    let webview = webview::build_page(&window, PROMPT_HTML, Some(init_script), || {}, Some(ipc))
        .map_err(|e| LafError::window(e.to_string()))?;

    Ok(ContentWindow { webview, window })
}

fn build_splash(
    target: &EventLoopWindowTarget<UserEvent>,
    proxy: &EventLoopProxy<UserEvent>,
) -> anyhow::Result<ContentWindow> {
    let size = LogicalSize::new(SPLASH_SIZE.0, SPLASH_SIZE.1);
    let mut builder = WindowBuilder::new()
        .with_title("LaF")
        .with_inner_size(size)
        .with_decorations(false)
        .with_resizable(false)
        .with_visible(false);
    if let Some(position) = centered(target, size) {
        builder = builder.with_position(position);
    }
    let window = builder.build(target).context("Failed to create splash window")?;

    let proxy = proxy.clone();
    let on_loaded = move || {
        let _ = proxy.send_event(UserEvent::SplashLoaded);
    };
    let webview = webview::build_page(&window, SPLASH_HTML, None, on_loaded, None)
        .context("Failed to create splash webview")?;

    Ok(ContentWindow { webview, window })
}

/// Position that centers a window of `size` on the primary monitor
fn centered(
    target: &EventLoopWindowTarget<UserEvent>,
    size: LogicalSize<f64>,
) -> Option<PhysicalPosition<i32>> {
    let monitor = target.primary_monitor()?;
    let screen = monitor.size();
    let origin = monitor.position();
    let window = size.to_physical::<f64>(monitor.scale_factor());

    let x = origin.x + ((screen.width as f64 - window.width) / 2.0) as i32;
    let y = origin.y + ((screen.height as f64 - window.height) / 2.0) as i32;
    Some(PhysicalPosition::new(x, y))
}

fn copy_text(clipboard: Option<&mut Clipboard>, text: &str) {
    let Some(clipboard) = clipboard else {
        warn!("Clipboard unavailable");
        return;
    };
    match clipboard.set_text(text) {
        Ok(()) => info!("Copied {} to the clipboard", text),
        Err(e) => warn!("Failed to write clipboard: {}", e),
    }
}

fn read_text(clipboard: Option<&mut Clipboard>) -> Option<String> {
    let clipboard = clipboard?;
    match clipboard.get_text() {
        Ok(text) => Some(text),
        Err(e) => {
            debug!("Failed to read clipboard: {}", e);
            None
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn init_logging() {
    // Route `log` records from the library crates into tracing
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to set log tracer: {}", e);
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set subscriber: {}", e);
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();
    info!("Starting LaF v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::with_defaults().context("Failed to initialize app state")?;
    info!("Settings loaded from {:?}", state.config.store_path());

    let platform = get_platform_manager();
    info!("Platform: {}", platform.platform_name());

    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let hotkey_proxy = proxy.clone();
    GlobalHotKeyEvent::set_event_handler(Some(move |event: GlobalHotKeyEvent| {
        if event.state() == HotKeyState::Pressed {
            let _ = hotkey_proxy.send_event(UserEvent::Hotkey(event.id()));
        }
    }));

    let splash = build_splash(&event_loop, &proxy)?;

    let menu = if platform.capabilities().native_menu_required_for_clipboard {
        let menu = Menu::new();
        if let Err(e) = platform.initialize_menu(&splash.window, &menu) {
            warn!("{}", e);
        }
        Some(menu)
    } else {
        None
    };

    let clipboard = match Clipboard::new() {
        Ok(clipboard) => Some(clipboard),
        Err(e) => {
            warn!("Clipboard unavailable: {}", e);
            None
        }
    };

    let classifier = state.classifier();
    let browser_args = if platform.capabilities().webview_engine.accepts_chromium_switches() {
        inject::browser_args(&state.store)
    } else {
        String::new()
    };

    let mut app = App {
        manager: WindowManager::new(classifier.clone()),
        host: Host {
            proxy,
            platform,
            classifier,
            browser_args,
        },
        state,
        dialogs: NativeDialogs,
        hotkeys: HotkeyBinder::new(),
        clipboard,
        splash: Some(splash),
        updates: None,
        installer: None,
        prompt: None,
        _menu: menu,
        exiting: false,
    };

    event_loop.run(move |event, target, control_flow| {
        match event {
            Event::NewEvents(_) => app.poll_updates(target),
            Event::WindowEvent {
                window_id, event, ..
            } => app.handle_window_event(window_id, event, target),
            Event::UserEvent(user_event) => app.handle_user_event(user_event, target),
            _ => {}
        }
        *control_flow = app.control_flow();
    })
}

//! Window lifecycle and navigation routing
//!
//! `WindowManager` is the only owner of the per-kind window slots. Every
//! creation, reuse and destruction goes through it, and the slot is the sole
//! source of truth for whether a window of a kind is live.

use laf_core::types::WindowKind;
use laf_core::{LafResult, UrlClassifier};
use std::collections::HashMap;
use url::Url;

/// Native side of window management, implemented by the app crate
pub trait WindowBackend {
    type Handle;

    /// Create a hidden window of `kind` loading `url`
    fn create(
        &mut self,
        kind: WindowKind,
        url: &str,
        parent: Option<&Self::Handle>,
    ) -> LafResult<Self::Handle>;

    /// Replace the document of an existing window
    fn load_url(&mut self, handle: &Self::Handle, url: &str);

    /// Show a window whose content finished loading for the first time
    fn reveal(&mut self, handle: &Self::Handle, kind: WindowKind);

    /// Hand a URL to the OS default handler
    fn open_external(&mut self, url: &str) -> LafResult<()>;
}

/// What a routing request ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Loaded in the window that asked
    InPlace,
    /// Loaded into the already-live window of this kind
    Reused(WindowKind),
    /// A new window of this kind was created
    Created(WindowKind),
    /// The secondary window was closed and Primary loaded the URL
    JoinedPrimary { closed: WindowKind },
    /// Delegated to the OS browser
    External,
    /// The source window is gone; nothing was done
    Dropped,
}

/// Consequence of a window closing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosePolicy {
    /// A secondary slot was cleared
    SlotCleared,
    /// The Primary window closed; the window subsystem is done
    ShutDown,
    /// No live window of that kind was registered
    Unknown,
}

struct Slot<H> {
    handle: H,
    revealed: bool,
}

/// One slot per window kind
pub struct WindowRegistry<H> {
    slots: HashMap<WindowKind, Slot<H>>,
}

impl<H> WindowRegistry<H> {
    fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    pub fn get(&self, kind: WindowKind) -> Option<&H> {
        self.slots.get(&kind).map(|slot| &slot.handle)
    }

    pub fn is_live(&self, kind: WindowKind) -> bool {
        self.slots.contains_key(&kind)
    }

    fn set(&mut self, kind: WindowKind, handle: H) {
        let previous = self.slots.insert(
            kind,
            Slot {
                handle,
                revealed: false,
            },
        );
        debug_assert!(previous.is_none(), "slot {} was already occupied", kind);
    }

    fn clear(&mut self, kind: WindowKind) -> Option<H> {
        self.slots.remove(&kind).map(|slot| slot.handle)
    }
}

/// Owns the window slots and applies the routing rules
pub struct WindowManager<H> {
    registry: WindowRegistry<H>,
    classifier: UrlClassifier,
}

impl<H> WindowManager<H> {
    pub fn new(classifier: UrlClassifier) -> Self {
        Self {
            registry: WindowRegistry::new(),
            classifier,
        }
    }

    pub fn classifier(&self) -> &UrlClassifier {
        &self.classifier
    }

    pub fn get(&self, kind: WindowKind) -> Option<&H> {
        self.registry.get(kind)
    }

    pub fn is_live(&self, kind: WindowKind) -> bool {
        self.registry.is_live(kind)
    }

    pub fn live_kinds(&self) -> Vec<WindowKind> {
        WindowKind::ALL
            .into_iter()
            .filter(|kind| self.registry.is_live(*kind))
            .collect()
    }

    /// Find which kind a native handle belongs to
    pub fn find_kind(&self, matches: impl Fn(&H) -> bool) -> Option<WindowKind> {
        WindowKind::ALL
            .into_iter()
            .find(|kind| self.registry.get(*kind).map(&matches).unwrap_or(false))
    }

    /// Create the Primary window unless it is already live.
    ///
    /// Returns `true` when a window was created.
    pub fn ensure_primary<B>(&mut self, backend: &mut B, url: &str) -> LafResult<bool>
    where
        B: WindowBackend<Handle = H>,
    {
        if self.registry.is_live(WindowKind::Primary) {
            log::debug!("Primary window already live, not creating another");
            return Ok(false);
        }

        let handle = backend.create(WindowKind::Primary, url, None)?;
        self.registry.set(WindowKind::Primary, handle);
        log::info!("Created primary window for {}", url);
        Ok(true)
    }

    /// Whether `source` may follow a navigation to `url` without routing.
    ///
    /// Used synchronously from navigation handlers; anything that returns
    /// `false` here must be passed to `route_navigation`.
    pub fn allows_in_place(&self, source: WindowKind, url: &str) -> bool {
        allows_in_place(&self.classifier, source, url)
    }

    /// Route a navigation that `source` asked for
    pub fn route_navigation<B>(
        &mut self,
        backend: &mut B,
        source: WindowKind,
        url: &str,
    ) -> LafResult<RouteOutcome>
    where
        B: WindowBackend<Handle = H>,
    {
        let category = self.classifier.classify(url);
        log::debug!("Routing {} from {} as {:?}", url, source, category);

        let target = match category.window_kind() {
            Some(kind) => kind,
            None => {
                backend.open_external(url)?;
                return Ok(RouteOutcome::External);
            }
        };

        if target == source {
            return match self.registry.get(source) {
                Some(handle) => {
                    backend.load_url(handle, url);
                    Ok(RouteOutcome::InPlace)
                }
                None => {
                    log::warn!("Dropping navigation from closed {} window", source);
                    Ok(RouteOutcome::Dropped)
                }
            };
        }

        if target == WindowKind::Primary {
            // Joining a game from a secondary window replaces that window.
            if self.registry.clear(source).is_some() {
                log::info!("Closing {} window to join {}", source, url);
            }
            if !self.ensure_primary(backend, url)? {
                if let Some(primary) = self.registry.get(WindowKind::Primary) {
                    backend.load_url(primary, url);
                }
            }
            return Ok(RouteOutcome::JoinedPrimary { closed: source });
        }

        if let Some(existing) = self.registry.get(target) {
            backend.load_url(existing, url);
            return Ok(RouteOutcome::Reused(target));
        }

        let handle = backend.create(target, url, self.registry.get(WindowKind::Primary))?;
        self.registry.set(target, handle);
        log::info!("Created {} window for {}", target, url);
        Ok(RouteOutcome::Created(target))
    }

    /// Reveal a window the first time its content is ready.
    ///
    /// Returns `true` only on that first call.
    pub fn mark_ready<B>(&mut self, backend: &mut B, kind: WindowKind) -> bool
    where
        B: WindowBackend<Handle = H>,
    {
        match self.registry.slots.get_mut(&kind) {
            Some(slot) if !slot.revealed => {
                slot.revealed = true;
                backend.reveal(&slot.handle, kind);
                true
            }
            _ => false,
        }
    }

    /// Forget a closed window and drop its handle
    pub fn on_closed(&mut self, kind: WindowKind) -> ClosePolicy {
        match self.registry.clear(kind) {
            None => ClosePolicy::Unknown,
            Some(_) if kind == WindowKind::Primary => {
                log::info!("Primary window closed");
                ClosePolicy::ShutDown
            }
            Some(_) => {
                log::info!("{} window closed", kind);
                ClosePolicy::SlotCleared
            }
        }
    }

    /// Drop every window, secondaries first
    pub fn close_all(&mut self) {
        for kind in [WindowKind::SecondaryB, WindowKind::SecondaryA, WindowKind::Primary] {
            self.registry.clear(kind);
        }
    }
}

/// Standalone form of [`WindowManager::allows_in_place`] for handlers that
/// only hold a classifier
pub fn allows_in_place(classifier: &UrlClassifier, source: WindowKind, url: &str) -> bool {
    if !is_web_url(url) {
        return true;
    }
    classifier.classify(url).window_kind() == Some(source)
}

pub fn is_web_url(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https"))
        .unwrap_or(false)
}

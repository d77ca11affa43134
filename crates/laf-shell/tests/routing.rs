//! Window routing against a recording backend

use laf_core::types::WindowKind;
use laf_core::{LafResult, UrlClassifier};
use laf_shell::{ClosePolicy, RouteOutcome, WindowBackend, WindowManager};
use std::cell::Cell;
use std::rc::Rc;

/// Handle that counts how many instances of a kind are alive
struct TrackedWindow {
    kind: WindowKind,
    live: Rc<[Cell<usize>; 3]>,
}

impl Drop for TrackedWindow {
    fn drop(&mut self) {
        let slot = &self.live[index(self.kind)];
        slot.set(slot.get() - 1);
    }
}

fn index(kind: WindowKind) -> usize {
    match kind {
        WindowKind::Primary => 0,
        WindowKind::SecondaryA => 1,
        WindowKind::SecondaryB => 2,
    }
}

struct Backend {
    live: Rc<[Cell<usize>; 3]>,
    created: usize,
    external: Vec<String>,
}

impl Backend {
    fn new() -> Self {
        Self {
            live: Rc::new([Cell::new(0), Cell::new(0), Cell::new(0)]),
            created: 0,
            external: Vec::new(),
        }
    }

    fn live(&self, kind: WindowKind) -> usize {
        self.live[index(kind)].get()
    }
}

impl WindowBackend for Backend {
    type Handle = TrackedWindow;

    fn create(
        &mut self,
        kind: WindowKind,
        _url: &str,
        _parent: Option<&TrackedWindow>,
    ) -> LafResult<TrackedWindow> {
        self.created += 1;
        let slot = &self.live[index(kind)];
        slot.set(slot.get() + 1);
        Ok(TrackedWindow {
            kind,
            live: Rc::clone(&self.live),
        })
    }

    fn load_url(&mut self, _handle: &TrackedWindow, _url: &str) {}

    fn reveal(&mut self, _handle: &TrackedWindow, _kind: WindowKind) {}

    fn open_external(&mut self, url: &str) -> LafResult<()> {
        self.external.push(url.to_string());
        Ok(())
    }
}

const HOME: &str = "https://laf-primary.example/";

#[test]
fn singleton_holds_for_any_request_sequence() {
    let urls = [
        "https://laf-primary.example/social/hub",
        "https://laf-primary.example/editor",
        "https://laf-primary.example/social.html?p=profile",
        "https://laf-primary.example/match/abc",
        "https://evil.example",
        "https://laf-primary.example/editor.html?map=1",
    ];
    let sources = WindowKind::ALL;

    let mut backend = Backend::new();
    let mut manager = WindowManager::new(UrlClassifier::new("laf-primary.example"));
    manager.ensure_primary(&mut backend, HOME).unwrap();

    for step in 0..200usize {
        let source = sources[step % sources.len()];
        let url = urls[(step * 7 + step / 3) % urls.len()];
        if step % 11 == 10 {
            manager.on_closed(WindowKind::SecondaryA);
        }
        if manager.is_live(source) || source == WindowKind::Primary {
            manager.route_navigation(&mut backend, source, url).unwrap();
        }

        for kind in WindowKind::ALL {
            assert!(backend.live(kind) <= 1, "{} has {} windows", kind, backend.live(kind));
            assert_eq!(backend.live(kind) == 1, manager.is_live(kind));
        }
    }
}

#[test]
fn example_scenario() {
    let mut backend = Backend::new();
    let mut manager = WindowManager::new(UrlClassifier::new("laf-primary.example"));
    manager.ensure_primary(&mut backend, HOME).unwrap();

    let outcome = manager
        .route_navigation(&mut backend, WindowKind::Primary, "https://evil.example")
        .unwrap();
    assert_eq!(outcome, RouteOutcome::External);
    assert_eq!(backend.created, 1);
    assert_eq!(backend.external, vec!["https://evil.example".to_string()]);

    let outcome = manager
        .route_navigation(
            &mut backend,
            WindowKind::Primary,
            "https://laf-primary.example/social/hub",
        )
        .unwrap();
    assert_eq!(outcome, RouteOutcome::Created(WindowKind::SecondaryA));

    let outcome = manager
        .route_navigation(
            &mut backend,
            WindowKind::SecondaryA,
            "https://laf-primary.example/match/abc",
        )
        .unwrap();
    assert_eq!(
        outcome,
        RouteOutcome::JoinedPrimary {
            closed: WindowKind::SecondaryA
        }
    );
    assert_eq!(backend.live(WindowKind::SecondaryA), 0);
    assert_eq!(backend.live(WindowKind::Primary), 1);
}

#[test]
fn closing_primary_shuts_down() {
    let mut backend = Backend::new();
    let mut manager = WindowManager::new(UrlClassifier::new("laf-primary.example"));
    manager.ensure_primary(&mut backend, HOME).unwrap();

    assert_eq!(manager.on_closed(WindowKind::Primary), ClosePolicy::ShutDown);
    assert_eq!(backend.live(WindowKind::Primary), 0);

    // A later join recreates Primary exactly once
    manager.ensure_primary(&mut backend, HOME).unwrap();
    manager.ensure_primary(&mut backend, HOME).unwrap();
    assert_eq!(backend.live(WindowKind::Primary), 1);
}

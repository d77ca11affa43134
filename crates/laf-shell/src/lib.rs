//! Host-side logic of the LaF shell
//!
//! Everything here is independent of the windowing toolkit: the app crate
//! plugs tao/wry in through the `WindowBackend` and `SettingsHost` traits and
//! drives the state machines from its event loop.

pub mod i18n;
pub mod presence;
pub mod prompt;
pub mod settings;
pub mod shortcuts;
pub mod update;
pub mod windows;

pub use i18n::Labels;
pub use presence::{ActivitySnapshot, PresencePayload, PresenceReporter, PresenceSink};
pub use prompt::{PromptBroker, PromptId, PromptOutcome, PromptRequest};
pub use settings::{PanelView, SettingsEngine, SettingsHost, ToolAction};
pub use shortcuts::{Accelerator, ShortcutAction, BINDINGS};
pub use update::{UpdateEffect, UpdateEvent, UpdateMachine};
pub use windows::{ClosePolicy, RouteOutcome, WindowBackend, WindowManager};

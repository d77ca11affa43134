//! Common types used throughout LaF

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of window kinds the shell manages.
///
/// At most one live window exists per kind. `Primary` hosts the game itself,
/// `SecondaryA` the social hub and `SecondaryB` the map editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Primary,
    SecondaryA,
    SecondaryB,
}

impl WindowKind {
    pub const ALL: [WindowKind; 3] = [
        WindowKind::Primary,
        WindowKind::SecondaryA,
        WindowKind::SecondaryB,
    ];

    /// Whether this kind is one of the optional, parented windows
    pub fn is_secondary(self) -> bool {
        !matches!(self, WindowKind::Primary)
    }

    /// Window title shown once the content is ready
    pub fn title(self) -> &'static str {
        match self {
            WindowKind::Primary => "LaF",
            WindowKind::SecondaryA => "LaF: Krunker Hub",
            WindowKind::SecondaryB => "LaF: Krunker Editor",
        }
    }

    /// Initial logical size (width, height)
    pub fn default_size(self) -> (f64, f64) {
        match self {
            WindowKind::Primary => (1200.0, 800.0),
            WindowKind::SecondaryA | WindowKind::SecondaryB => (900.0, 600.0),
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WindowKind::Primary => "primary",
            WindowKind::SecondaryA => "secondary-a",
            WindowKind::SecondaryB => "secondary-b",
        };
        f.write_str(name)
    }
}

/// Result of classifying a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    Primary,
    SecondaryA,
    SecondaryB,
    External,
}

impl ContentCategory {
    /// The window kind that hosts this category, if any
    pub fn window_kind(self) -> Option<WindowKind> {
        match self {
            ContentCategory::Primary => Some(WindowKind::Primary),
            ContentCategory::SecondaryA => Some(WindowKind::SecondaryA),
            ContentCategory::SecondaryB => Some(WindowKind::SecondaryB),
            ContentCategory::External => None,
        }
    }
}

impl From<WindowKind> for ContentCategory {
    fn from(kind: WindowKind) -> Self {
        match kind {
            WindowKind::Primary => ContentCategory::Primary,
            WindowKind::SecondaryA => ContentCategory::SecondaryA,
            WindowKind::SecondaryB => ContentCategory::SecondaryB,
        }
    }
}

/// Phases of the startup update check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePhase {
    Checking,
    Available,
    Downloading,
    Downloaded,
    NotAvailable,
    Errored,
    HandedOff,
}

impl UpdatePhase {
    /// Phases after which no further update events are accepted
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            UpdatePhase::Downloaded
                | UpdatePhase::NotAvailable
                | UpdatePhase::Errored
                | UpdatePhase::HandedOff
        )
    }
}

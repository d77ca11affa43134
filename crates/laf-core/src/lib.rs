//! LaF Core Library
//!
//! This crate provides shared types, errors, URL classification and the
//! persisted configuration store for LaF.

pub mod classify;
pub mod config;
pub mod error;
pub mod types;

pub use classify::UrlClassifier;
pub use config::{AppConfig, ConfigStore};
pub use error::{LafError, LafResult};
pub use types::{ContentCategory, UpdatePhase, WindowKind};

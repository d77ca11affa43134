//! URL classification
//!
//! Decides which window kind a URL belongs to from its host and first path
//! segment. Classification is pure and total: anything that is not a web URL
//! on the primary host is `External`.

use crate::types::ContentCategory;
use url::Url;

/// Host of the hosted game when nothing else is configured
pub const DEFAULT_PRIMARY_HOST: &str = "krunker.io";

/// First path segments that open the map editor
const SECONDARY_B_SEGMENTS: &[&str] = &["editor", "editor.html"];

/// First path segments that open the social hub
const SECONDARY_A_SEGMENTS: &[&str] = &["social", "social.html"];

/// Classifies URLs against one primary host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlClassifier {
    primary_host: String,
}

impl UrlClassifier {
    pub fn new(primary_host: impl Into<String>) -> Self {
        Self {
            primary_host: primary_host.into().trim().to_ascii_lowercase(),
        }
    }

    pub fn primary_host(&self) -> &str {
        &self.primary_host
    }

    /// The landing page of the primary host
    pub fn home_url(&self) -> String {
        format!("https://{}/", self.primary_host)
    }

    /// Classify a URL string.
    ///
    /// SecondaryB shapes are checked before SecondaryA, and both before the
    /// plain primary-host match.
    pub fn classify(&self, url: &str) -> ContentCategory {
        let parsed = match Url::parse(url.trim()) {
            Ok(parsed) => parsed,
            Err(_) => return ContentCategory::External,
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            return ContentCategory::External;
        }

        let on_primary_host = parsed
            .host_str()
            .map(|host| self.is_primary_host(host))
            .unwrap_or(false);
        if !on_primary_host {
            return ContentCategory::External;
        }

        let first_segment = parsed
            .path_segments()
            .and_then(|mut segments| segments.next())
            .unwrap_or("")
            .to_ascii_lowercase();

        if SECONDARY_B_SEGMENTS.contains(&first_segment.as_str()) {
            ContentCategory::SecondaryB
        } else if SECONDARY_A_SEGMENTS.contains(&first_segment.as_str()) {
            ContentCategory::SecondaryA
        } else {
            ContentCategory::Primary
        }
    }

    fn is_primary_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        host == self.primary_host || host.ends_with(&format!(".{}", self.primary_host))
    }
}

impl Default for UrlClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_PRIMARY_HOST)
    }
}

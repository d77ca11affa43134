//! Activity reporting
//!
//! Content reads the game's activity every 500 ms and forwards it here. The
//! reporter turns each reading into the payload an external presence client
//! displays. A failed reading still produces a payload so presence never
//! goes stale.

use serde::{Deserialize, Serialize};

/// Interval at which content reads the activity
pub const TICK_INTERVAL_MS: u64 = 500;

pub const LARGE_IMAGE_KEY: &str = "laf_icon";
pub const LARGE_IMAGE_TEXT: &str = "LaF Client";

/// State shown when the activity could not be read
pub const FALLBACK_STATE: &str = "Playing Krunker";

/// One reading of the game's activity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    #[serde(default)]
    pub map: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    /// Seconds remaining in the current match
    #[serde(default)]
    pub time: Option<f64>,
}

impl ActivitySnapshot {
    /// Neither map nor mode was read. A reading with only one of them is
    /// still shown as is.
    pub fn is_blank(&self) -> bool {
        self.map.is_none() && self.mode.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresencePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Seconds since the epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<u64>,
    /// Milliseconds since the epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_image_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_image_text: Option<String>,
}

/// Receives every payload the reporter emits
pub trait PresenceSink {
    fn publish(&mut self, payload: &PresencePayload);
}

#[derive(Debug, Default)]
pub struct PresenceReporter {
    started_at: Option<u64>,
}

impl PresenceReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    /// Start reporting and emit the start-only payload
    pub fn begin(&mut self, now_ms: u64, sink: &mut dyn PresenceSink) {
        let start = now_ms / 1000;
        self.started_at = Some(start);
        sink.publish(&PresencePayload {
            start_timestamp: Some(start),
            ..Default::default()
        });
    }

    /// Emit the payload for one tick. Returns `false` when not reporting.
    pub fn update(
        &mut self,
        snapshot: Option<ActivitySnapshot>,
        now_ms: u64,
        sink: &mut dyn PresenceSink,
    ) -> bool {
        let Some(start) = self.started_at else {
            return false;
        };

        let mut payload = match snapshot.filter(|snapshot| !snapshot.is_blank()) {
            Some(snapshot) => {
                let end_timestamp = snapshot
                    .time
                    .filter(|secs| secs.is_finite() && *secs > 0.0)
                    .map(|secs| now_ms + (secs * 1000.0) as u64);
                PresencePayload {
                    state: snapshot.map,
                    details: snapshot.mode,
                    end_timestamp,
                    ..Default::default()
                }
            }
            None => PresencePayload {
                state: Some(FALLBACK_STATE.to_string()),
                ..Default::default()
            },
        };
        payload.start_timestamp = Some(start);
        payload.large_image_key = Some(LARGE_IMAGE_KEY.to_string());
        payload.large_image_text = Some(LARGE_IMAGE_TEXT.to_string());

        sink.publish(&payload);
        true
    }

    /// Stop reporting. Returns whether reporting was active.
    pub fn stop(&mut self) -> bool {
        self.started_at.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Recorder(Vec<PresencePayload>);

    impl PresenceSink for Recorder {
        fn publish(&mut self, payload: &PresencePayload) {
            self.0.push(payload.clone());
        }
    }

    #[test]
    fn test_begin_emits_start_only() {
        let mut sink = Recorder::default();
        let mut reporter = PresenceReporter::new();
        reporter.begin(1_700_000_000_999, &mut sink);

        assert_eq!(
            serde_json::to_value(&sink.0[0]).unwrap(),
            json!({ "startTimestamp": 1_700_000_000u64 })
        );
    }

    #[test]
    fn test_snapshot_payload() {
        let mut sink = Recorder::default();
        let mut reporter = PresenceReporter::new();
        reporter.begin(10_000, &mut sink);

        let snapshot = ActivitySnapshot {
            map: Some("Burg".into()),
            mode: Some("Free for All".into()),
            time: Some(90.0),
        };
        assert!(reporter.update(Some(snapshot), 20_000, &mut sink));

        assert_eq!(
            serde_json::to_value(&sink.0[1]).unwrap(),
            json!({
                "state": "Burg",
                "details": "Free for All",
                "startTimestamp": 10,
                "endTimestamp": 110_000,
                "largeImageKey": "laf_icon",
                "largeImageText": "LaF Client"
            })
        );
    }

    #[test]
    fn test_zero_time_has_no_end() {
        let mut sink = Recorder::default();
        let mut reporter = PresenceReporter::new();
        reporter.begin(0, &mut sink);
        let snapshot = ActivitySnapshot {
            map: Some("Burg".into()),
            time: Some(0.0),
            ..Default::default()
        };
        reporter.update(Some(snapshot), 5_000, &mut sink);
        assert_eq!(sink.0[1].end_timestamp, None);
    }

    #[test]
    fn test_failed_read_uses_fallback() {
        let mut sink = Recorder::default();
        let mut reporter = PresenceReporter::new();
        reporter.begin(0, &mut sink);
        reporter.update(None, 500, &mut sink);

        assert_eq!(sink.0[1].state.as_deref(), Some(FALLBACK_STATE));
        assert_eq!(sink.0[1].details, None);
        assert_eq!(sink.0[1].large_image_key.as_deref(), Some(LARGE_IMAGE_KEY));
    }

    #[test]
    fn test_blank_reading_uses_fallback() {
        let mut sink = Recorder::default();
        let mut reporter = PresenceReporter::new();
        reporter.begin(0, &mut sink);

        let snapshot: ActivitySnapshot = serde_json::from_str("{}").unwrap();
        assert!(reporter.update(Some(snapshot), 500, &mut sink));
        let snapshot: ActivitySnapshot = serde_json::from_str(r#"{"time":30}"#).unwrap();
        reporter.update(Some(snapshot), 1_000, &mut sink);

        for payload in &sink.0[1..] {
            assert_eq!(payload.state.as_deref(), Some(FALLBACK_STATE));
            assert_eq!(payload.details, None);
            assert_eq!(payload.end_timestamp, None);
            assert_eq!(payload.start_timestamp, Some(0));
        }
    }

    #[test]
    fn test_map_only_reading_is_kept() {
        let mut sink = Recorder::default();
        let mut reporter = PresenceReporter::new();
        reporter.begin(0, &mut sink);

        let snapshot: ActivitySnapshot = serde_json::from_str(r#"{"map":"Sandstorm"}"#).unwrap();
        reporter.update(Some(snapshot), 500, &mut sink);

        assert_eq!(sink.0[1].state.as_deref(), Some("Sandstorm"));
        assert_eq!(sink.0[1].details, None);
    }

    #[test]
    fn test_nothing_after_stop() {
        let mut sink = Recorder::default();
        let mut reporter = PresenceReporter::new();
        assert!(!reporter.update(None, 0, &mut sink));

        reporter.begin(0, &mut sink);
        assert!(reporter.stop());
        assert!(!reporter.stop());
        assert!(!reporter.update(None, 1_000, &mut sink));
        assert_eq!(sink.0.len(), 1);
    }

    #[test]
    fn test_snapshot_tolerates_missing_fields() {
        let snapshot: ActivitySnapshot = serde_json::from_value(json!({ "map": "Sandstorm" })).unwrap();
        assert_eq!(snapshot.map.as_deref(), Some("Sandstorm"));
        assert_eq!(snapshot.time, None);
    }
}

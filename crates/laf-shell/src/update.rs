//! Startup update flow
//!
//! The machine starts in `Checking` when the splash appears. It consumes
//! events from the update source and clock ticks from the event loop, and
//! answers with effects for the app to perform. It never owns a timer: the
//! event loop asks `next_deadline()` and calls `poll()` when it passes.

use crate::i18n::Labels;
use laf_core::types::UpdatePhase;
use std::time::{Duration, Instant};

/// How long the check may stay in `Checking` before giving up
pub const CHECK_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Delay between a settled check and handing off to the Primary window
pub const HANDOFF_GRACE: Duration = Duration::from_millis(1_000);

/// Delay between a finished download and install-and-restart
pub const INSTALL_GRACE: Duration = Duration::from_millis(3_000);

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateInfo {
    pub version: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub percent: f64,
    pub transferred: u64,
    pub total: u64,
}

/// Events reported by the update source
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateEvent {
    CheckingForUpdate,
    UpdateAvailable(UpdateInfo),
    UpdateNotAvailable,
    Error(String),
    DownloadProgress(Progress),
    UpdateDownloaded(UpdateInfo),
}

/// What the splash surface should display
#[derive(Debug, Clone, PartialEq)]
pub enum SplashStatus {
    Checking,
    Available { version: String },
    Downloading { percent: f64 },
    Downloaded { version: String },
    NotAvailable,
    Errored,
}

impl SplashStatus {
    pub fn text(&self, labels: &Labels) -> String {
        match self {
            SplashStatus::Checking => labels.splash_checking.to_string(),
            SplashStatus::Available { version } => {
                format!("{} (v{})", labels.splash_available, version)
            }
            SplashStatus::Downloading { percent } => {
                format!("{} {:.0}%", labels.splash_downloading, percent)
            }
            SplashStatus::Downloaded { version } => {
                format!("{} (v{})", labels.splash_downloaded, version)
            }
            SplashStatus::NotAvailable => labels.splash_not_available.to_string(),
            SplashStatus::Errored => labels.splash_errored.to_string(),
        }
    }
}

/// Work the app performs on behalf of the machine
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateEffect {
    /// Render this status on the splash
    Status(SplashStatus),
    /// Tear down the splash and show the Primary window
    HandOff,
    /// Run the downloaded installer and exit
    InstallAndRestart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    HandOff,
    Install,
}

#[derive(Debug)]
pub struct UpdateMachine {
    phase: UpdatePhase,
    check_deadline: Option<Instant>,
    deferred: Option<(Instant, Deferred)>,
}

impl UpdateMachine {
    /// Enter `Checking` at `now`
    pub fn new(now: Instant) -> Self {
        Self {
            phase: UpdatePhase::Checking,
            check_deadline: Some(now + CHECK_TIMEOUT),
            deferred: None,
        }
    }

    pub fn phase(&self) -> UpdatePhase {
        self.phase
    }

    /// Earliest instant at which `poll` has something to do
    pub fn next_deadline(&self) -> Option<Instant> {
        let deferred = self.deferred.map(|(at, _)| at);
        match (self.check_deadline, deferred) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Feed one event from the update source
    pub fn handle(&mut self, event: UpdateEvent, now: Instant) -> Vec<UpdateEffect> {
        if self.phase.is_settled() {
            log::debug!("Ignoring update event in {:?}: {:?}", self.phase, event);
            return Vec::new();
        }

        match event {
            UpdateEvent::CheckingForUpdate => {
                if self.phase == UpdatePhase::Checking {
                    vec![UpdateEffect::Status(SplashStatus::Checking)]
                } else {
                    Vec::new()
                }
            }
            UpdateEvent::UpdateAvailable(info) => {
                log::info!("Update available: {}", info.version);
                self.check_deadline = None;
                self.phase = UpdatePhase::Available;
                vec![UpdateEffect::Status(SplashStatus::Available {
                    version: info.version,
                })]
            }
            UpdateEvent::DownloadProgress(progress) => {
                self.check_deadline = None;
                self.phase = UpdatePhase::Downloading;
                vec![UpdateEffect::Status(SplashStatus::Downloading {
                    percent: progress.percent,
                })]
            }
            UpdateEvent::UpdateDownloaded(info) => {
                log::info!("Update {} downloaded, installing shortly", info.version);
                self.check_deadline = None;
                self.phase = UpdatePhase::Downloaded;
                self.deferred = Some((now + INSTALL_GRACE, Deferred::Install));
                vec![UpdateEffect::Status(SplashStatus::Downloaded {
                    version: info.version,
                })]
            }
            UpdateEvent::UpdateNotAvailable => {
                self.settle(UpdatePhase::NotAvailable, now);
                vec![UpdateEffect::Status(SplashStatus::NotAvailable)]
            }
            UpdateEvent::Error(message) => {
                log::warn!("Update check failed: {}", message);
                self.settle(UpdatePhase::Errored, now);
                vec![UpdateEffect::Status(SplashStatus::Errored)]
            }
        }
    }

    /// Advance timers up to `now`
    pub fn poll(&mut self, now: Instant) -> Vec<UpdateEffect> {
        let mut effects = Vec::new();

        if let Some(deadline) = self.check_deadline {
            if now >= deadline && self.phase == UpdatePhase::Checking {
                log::warn!("Update check timed out after {:?}", CHECK_TIMEOUT);
                self.settle(UpdatePhase::NotAvailable, now);
                effects.push(UpdateEffect::Status(SplashStatus::NotAvailable));
            }
        }

        if let Some((at, action)) = self.deferred {
            if now >= at {
                self.deferred = None;
                match action {
                    Deferred::HandOff => effects.extend(self.hand_off()),
                    Deferred::Install => effects.push(UpdateEffect::InstallAndRestart),
                }
            }
        }

        effects
    }

    /// Enter `HandedOff`. Only the first call yields an effect.
    pub fn hand_off(&mut self) -> Option<UpdateEffect> {
        match self.phase {
            UpdatePhase::HandedOff | UpdatePhase::Downloaded => None,
            _ => {
                self.phase = UpdatePhase::HandedOff;
                self.check_deadline = None;
                self.deferred = None;
                Some(UpdateEffect::HandOff)
            }
        }
    }

    fn settle(&mut self, phase: UpdatePhase, now: Instant) {
        self.phase = phase;
        self.check_deadline = None;
        self.deferred = Some((now + HANDOFF_GRACE, Deferred::HandOff));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(version: &str) -> UpdateInfo {
        UpdateInfo {
            version: version.to_string(),
            notes: None,
        }
    }

    #[test]
    fn test_timeout_falls_back_to_hand_off() {
        let start = Instant::now();
        let mut machine = UpdateMachine::new(start);
        assert_eq!(machine.next_deadline(), Some(start + CHECK_TIMEOUT));

        assert!(machine.poll(start + Duration::from_millis(14_999)).is_empty());

        let effects = machine.poll(start + CHECK_TIMEOUT);
        assert_eq!(effects, vec![UpdateEffect::Status(SplashStatus::NotAvailable)]);
        assert_eq!(machine.phase(), UpdatePhase::NotAvailable);

        let handoff_at = start + CHECK_TIMEOUT + HANDOFF_GRACE;
        assert_eq!(machine.next_deadline(), Some(handoff_at));
        assert_eq!(machine.poll(handoff_at), vec![UpdateEffect::HandOff]);
        assert_eq!(machine.phase(), UpdatePhase::HandedOff);
        assert_eq!(machine.next_deadline(), None);
    }

    #[test]
    fn test_available_cancels_timeout() {
        let start = Instant::now();
        let mut machine = UpdateMachine::new(start);
        machine.handle(UpdateEvent::UpdateAvailable(info("1.2.0")), start);

        assert_eq!(machine.next_deadline(), None);
        assert!(machine.poll(start + CHECK_TIMEOUT * 2).is_empty());
        assert_eq!(machine.phase(), UpdatePhase::Available);
    }

    #[test]
    fn test_download_schedules_install() {
        let start = Instant::now();
        let mut machine = UpdateMachine::new(start);
        machine.handle(UpdateEvent::UpdateAvailable(info("1.2.0")), start);
        let effects = machine.handle(
            UpdateEvent::DownloadProgress(Progress {
                percent: 42.0,
                transferred: 42,
                total: 100,
            }),
            start,
        );
        assert_eq!(
            effects,
            vec![UpdateEffect::Status(SplashStatus::Downloading { percent: 42.0 })]
        );

        let done = start + Duration::from_secs(5);
        machine.handle(UpdateEvent::UpdateDownloaded(info("1.2.0")), done);
        assert!(machine.poll(done + Duration::from_millis(2_999)).is_empty());
        assert_eq!(
            machine.poll(done + INSTALL_GRACE),
            vec![UpdateEffect::InstallAndRestart]
        );
        assert_eq!(machine.hand_off(), None);
    }

    #[test]
    fn test_error_hands_off_after_grace() {
        let start = Instant::now();
        let mut machine = UpdateMachine::new(start);
        let effects = machine.handle(UpdateEvent::Error("offline".into()), start);
        assert_eq!(effects, vec![UpdateEffect::Status(SplashStatus::Errored)]);
        assert_eq!(machine.phase(), UpdatePhase::Errored);

        assert_eq!(machine.poll(start + HANDOFF_GRACE), vec![UpdateEffect::HandOff]);
    }

    #[test]
    fn test_events_after_settling_are_ignored() {
        let start = Instant::now();
        let mut machine = UpdateMachine::new(start);
        machine.handle(UpdateEvent::UpdateNotAvailable, start);

        assert!(machine
            .handle(UpdateEvent::UpdateAvailable(info("9.9.9")), start)
            .is_empty());
        assert!(machine.handle(UpdateEvent::Error("late".into()), start).is_empty());
        assert_eq!(machine.phase(), UpdatePhase::NotAvailable);
    }

    #[test]
    fn test_hand_off_is_idempotent() {
        let start = Instant::now();
        let mut machine = UpdateMachine::new(start);
        machine.handle(UpdateEvent::UpdateNotAvailable, start);

        assert_eq!(machine.hand_off(), Some(UpdateEffect::HandOff));
        assert_eq!(machine.hand_off(), None);
        assert!(machine.poll(start + HANDOFF_GRACE).is_empty());
    }

    #[test]
    fn test_status_text_uses_labels() {
        let labels = Labels::for_lang(laf_core::config::Lang::EnUs);
        assert_eq!(
            SplashStatus::Downloading { percent: 12.4 }.text(labels),
            "Downloading update 12%"
        );
        assert_eq!(SplashStatus::NotAvailable.text(labels), "You are up to date");
    }
}

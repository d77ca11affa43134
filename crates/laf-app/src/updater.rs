//! HTTP update source
//!
//! Runs on a worker thread at startup. Fetches a JSON release manifest,
//! compares it with the running version and, when newer, downloads the
//! package for this platform into the cache directory. Every outcome is
//! reported as an `UpdateEvent`; failures never abort startup.

use laf_core::{LafError, LafResult};
use laf_shell::update::{Progress, UpdateInfo};
use laf_shell::UpdateEvent;
use semver::Version;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CHUNK_SIZE: usize = 64 * 1024;

/// Release manifest served at the update feed
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseManifest {
    pub version: String,
    pub platforms: HashMap<String, PlatformAsset>,
    #[serde(default)]
    pub release_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlatformAsset {
    pub url: String,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// A newer release for this platform
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    pub version: Version,
    pub url: String,
    pub sha256: Option<String>,
    pub size: Option<u64>,
    pub notes: Option<String>,
}

impl Release {
    pub fn info(&self) -> UpdateInfo {
        UpdateInfo {
            version: self.version.to_string(),
            notes: self.notes.clone(),
        }
    }
}

/// Messages the source sends to the event loop
#[derive(Debug, Clone, PartialEq)]
pub enum SourceMessage {
    Event(UpdateEvent),
    /// The verified package is on disk, sent before `UpdateDownloaded`
    InstallerReady(PathBuf),
}

/// Platform identifier used as the manifest key, e.g. `win32-x64`
pub fn platform_identifier() -> String {
    let os_name = match std::env::consts::OS {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    };
    let arch_name = match std::env::consts::ARCH {
        "x86_64" => "x64",
        other => other,
    };
    format!("{}-{}", os_name, arch_name)
}

/// Pick the release for `platform` if the manifest is newer than `current`
pub fn select_release(
    manifest: ReleaseManifest,
    current: &Version,
    platform: &str,
) -> LafResult<Option<Release>> {
    let version = Version::parse(&manifest.version).map_err(|e| {
        LafError::update(format!("Invalid manifest version '{}': {}", manifest.version, e))
    })?;

    if version <= *current {
        debug!("Current version {} is up to date (latest: {})", current, version);
        return Ok(None);
    }

    let asset = manifest.platforms.get(platform).ok_or_else(|| {
        LafError::update(format!("No asset found for platform '{}' in manifest", platform))
    })?;

    Ok(Some(Release {
        version,
        url: asset.url.clone(),
        sha256: asset.sha256.clone(),
        size: asset.size,
        notes: manifest.release_notes,
    }))
}

/// Local file name for a downloaded package
pub fn package_file_name(release: &Release) -> String {
    let from_url = url::Url::parse(&release.url).ok().and_then(|url| {
        url.path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string))
            .filter(|name| !name.is_empty())
    });
    from_url.unwrap_or_else(|| format!("laf-{}", release.version))
}

fn percent(transferred: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (transferred as f64 / total as f64 * 100.0).min(100.0)
    }
}

fn verify_sha256(path: &Path, expected: &str) -> LafResult<()> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    let actual = format!("{:x}", hasher.finalize());
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(LafError::update(format!(
            "Checksum mismatch: expected {}, got {}",
            expected, actual
        )));
    }
    Ok(())
}

pub struct HttpUpdateSource {
    feed: Option<String>,
    current: Version,
    download_dir: PathBuf,
}

impl HttpUpdateSource {
    pub fn new(feed: Option<String>, current: Version, download_dir: PathBuf) -> Self {
        Self {
            feed,
            current,
            download_dir,
        }
    }

    /// Run the whole check, reporting through `emit`
    pub fn run(&self, emit: &mut dyn FnMut(SourceMessage)) {
        emit(SourceMessage::Event(UpdateEvent::CheckingForUpdate));

        let Some(feed) = self.feed.as_deref() else {
            info!("No update feed configured");
            emit(SourceMessage::Event(UpdateEvent::UpdateNotAvailable));
            return;
        };

        if let Err(e) = self.check_and_download(feed, emit) {
            warn!("Update check failed: {}", e);
            emit(SourceMessage::Event(UpdateEvent::Error(e.to_string())));
        }
    }

    fn client(&self) -> LafResult<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("LaF/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LafError::update(format!("Failed to build HTTP client: {}", e)))
    }

    fn check_and_download(&self, feed: &str, emit: &mut dyn FnMut(SourceMessage)) -> LafResult<()> {
        let client = self.client()?;
        debug!("Fetching release manifest from: {}", feed);

        let response = client
            .get(feed)
            .send()
            .map_err(|e| LafError::update(format!("Failed to fetch manifest: {}", e)))?;
        if !response.status().is_success() {
            return Err(LafError::update(format!(
                "Manifest server returned status {}",
                response.status()
            )));
        }
        let body = response
            .text()
            .map_err(|e| LafError::update(format!("Failed to read manifest: {}", e)))?;
        let manifest: ReleaseManifest = serde_json::from_str(&body)?;

        let Some(release) = select_release(manifest, &self.current, &platform_identifier())? else {
            emit(SourceMessage::Event(UpdateEvent::UpdateNotAvailable));
            return Ok(());
        };

        info!("Update available: {} -> {}", self.current, release.version);
        emit(SourceMessage::Event(UpdateEvent::UpdateAvailable(release.info())));

        let path = self.download(&client, &release, emit)?;
        emit(SourceMessage::InstallerReady(path));
        emit(SourceMessage::Event(UpdateEvent::UpdateDownloaded(release.info())));
        Ok(())
    }

    fn download(
        &self,
        client: &reqwest::blocking::Client,
        release: &Release,
        emit: &mut dyn FnMut(SourceMessage),
    ) -> LafResult<PathBuf> {
        fs::create_dir_all(&self.download_dir)?;
        let path = self.download_dir.join(package_file_name(release));
        info!("Downloading {} to {:?}", release.url, path);

        let mut response = client
            .get(&release.url)
            .send()
            .map_err(|e| LafError::update(format!("Download failed: {}", e)))?;
        if !response.status().is_success() {
            return Err(LafError::update(format!(
                "Server returned status {}",
                response.status()
            )));
        }

        let total = response
            .content_length()
            .or(release.size)
            .unwrap_or(0);
        let mut file = File::create(&path)?;
        let mut buffer = vec![0u8; CHUNK_SIZE];
        let mut transferred: u64 = 0;

        loop {
            let read = response
                .read(&mut buffer)
                .map_err(|e| LafError::update(format!("Download stream error: {}", e)))?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read])?;
            transferred += read as u64;

            emit(SourceMessage::Event(UpdateEvent::DownloadProgress(Progress {
                percent: percent(transferred, total),
                transferred,
                total,
            })));
        }
        file.flush()?;

        match &release.sha256 {
            Some(expected) => verify_sha256(&path, expected)?,
            None => warn!("Release {} has no checksum; skipping verification", release.version),
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn manifest(version: &str) -> ReleaseManifest {
        serde_json::from_value(serde_json::json!({
            "version": version,
            "release_notes": "Fixes",
            "platforms": {
                "win32-x64": {
                    "url": "https://updates.example/LaF-Setup-2.0.0.exe",
                    "sha256": "abc",
                    "size": 42
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_select_newer_release() {
        let current = Version::parse("1.4.0").unwrap();
        let release = select_release(manifest("2.0.0"), &current, "win32-x64")
            .unwrap()
            .unwrap();

        assert_eq!(release.version, Version::parse("2.0.0").unwrap());
        assert_eq!(release.size, Some(42));
        assert_eq!(
            release.info(),
            UpdateInfo {
                version: "2.0.0".into(),
                notes: Some("Fixes".into())
            }
        );
    }

    #[test]
    fn test_same_or_older_is_not_an_update() {
        let current = Version::parse("2.0.0").unwrap();
        assert!(select_release(manifest("2.0.0"), &current, "win32-x64")
            .unwrap()
            .is_none());
        assert!(select_release(manifest("1.9.9"), &current, "linux-x64")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_missing_platform_and_bad_version_are_errors() {
        let current = Version::parse("1.0.0").unwrap();
        assert!(select_release(manifest("2.0.0"), &current, "linux-x64").is_err());
        assert!(select_release(manifest("two"), &current, "win32-x64").is_err());
    }

    #[test]
    fn test_package_file_name() {
        let current = Version::parse("1.0.0").unwrap();
        let release = select_release(manifest("2.0.0"), &current, "win32-x64")
            .unwrap()
            .unwrap();
        assert_eq!(package_file_name(&release), "LaF-Setup-2.0.0.exe");

        let bare = Release {
            url: "https://updates.example/".into(),
            ..release
        };
        assert_eq!(package_file_name(&bare), "laf-2.0.0");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(50, 200), 25.0);
        assert_eq!(percent(300, 200), 100.0);
    }

    #[test]
    fn test_platform_identifier_shape() {
        let id = platform_identifier();
        let (os, arch) = id.split_once('-').unwrap();
        assert!(!os.is_empty());
        assert!(!arch.is_empty());
    }

    #[test]
    fn test_verify_sha256() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pkg");
        fs::write(&path, b"hello").unwrap();

        verify_sha256(
            &path,
            "2CF24DBA5FB0A30E26E83B2AC5B9E29E1B161E5C1FA7425E73043362938B9824",
        )
        .unwrap();
        assert!(verify_sha256(&path, "00").is_err());
    }

    #[test]
    fn test_no_feed_reports_not_available() {
        let dir = TempDir::new().unwrap();
        let source = HttpUpdateSource::new(None, Version::new(1, 0, 0), dir.path().to_path_buf());

        let mut messages = Vec::new();
        source.run(&mut |msg| messages.push(msg));
        assert_eq!(
            messages,
            vec![
                SourceMessage::Event(UpdateEvent::CheckingForUpdate),
                SourceMessage::Event(UpdateEvent::UpdateNotAvailable),
            ]
        );
    }

    #[test]
    fn test_unreachable_feed_reports_error() {
        let dir = TempDir::new().unwrap();
        let source = HttpUpdateSource::new(
            Some("http://127.0.0.1:9/manifest.json".into()),
            Version::new(1, 0, 0),
            dir.path().to_path_buf(),
        );

        let mut messages = Vec::new();
        source.run(&mut |msg| messages.push(msg));
        assert_eq!(messages.len(), 2);
        assert!(matches!(
            messages[1],
            SourceMessage::Event(UpdateEvent::Error(_))
        ));
    }
}

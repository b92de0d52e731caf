//! Desktop audio backend

use crate::error::AudioError;
use crate::output::DesktopEngine;
use async_trait::async_trait;
use elementa_core::{AssetId, AudioReference};
use elementa_playback::{AudioBackend, AudioEngine, EngineError, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Connect timeout for remote narration
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Loads narration from bundled assets or the network and plays it through cpal
///
/// The overall acquire deadline is enforced by the playback session; this backend only
/// bounds the connect phase.
#[derive(Debug, Clone)]
pub struct DesktopBackend {
    http: reqwest::Client,
    assets_dir: PathBuf,
}

impl DesktopBackend {
    /// Create a backend reading bundled assets from `assets_dir`
    pub fn new(assets_dir: impl Into<PathBuf>) -> std::result::Result<Self, AudioError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("Elementa/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            assets_dir: assets_dir.into(),
        })
    }

    /// Directory holding the bundled assets
    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Full path of a bundled asset
    pub fn asset_path(&self, asset: AssetId) -> PathBuf {
        self.assets_dir.join(asset.file_name())
    }

    async fn read_asset(&self, asset: AssetId) -> Result<Vec<u8>> {
        let path = self.asset_path(asset);
        debug!(path = %path.display(), "Reading bundled asset");

        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EngineError::AssetNotFound(path.display().to_string())
            } else {
                EngineError::AssetNotFound(format!("{}: {}", path.display(), e))
            }
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "Downloading narration");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(AudioError::from)?;
        let bytes = response.bytes().await.map_err(AudioError::from)?;

        debug!(url, bytes = bytes.len(), "Download complete");
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl AudioBackend for DesktopBackend {
    async fn acquire(&self, reference: &AudioReference) -> Result<Box<dyn AudioEngine>> {
        let (bytes, extension) = match reference {
            AudioReference::Local(asset) => (
                self.read_asset(*asset).await?,
                file_extension(asset.file_name()),
            ),
            AudioReference::Remote(url) => (self.download(url).await?, url_extension(url)),
        };

        // The session drops this future on timeout or supersede; the blocking task outlives it
        let cancelled = Arc::new(AtomicBool::new(false));
        let _cancel_on_drop = CancelOnDrop(Arc::clone(&cancelled));

        let engine = tokio::task::spawn_blocking(move || {
            DesktopEngine::prepare(bytes, extension.as_deref(), &cancelled)
        })
        .await
        .map_err(|e| EngineError::Output(format!("audio task failed: {}", e)))??;

        info!(%reference, "Audio engine ready");
        Ok(Box::new(engine))
    }
}

/// Sets the flag when dropped
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

fn file_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Extension of the last path segment, ignoring query and fragment
fn url_extension(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.next_back()?;
    file_extension(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_extension_ignores_query() {
        assert_eq!(
            url_extension("https://cdn.example.org/audio/H.MP3?sig=abc#t=1"),
            Some("mp3".to_string())
        );
        assert_eq!(url_extension("https://cdn.example.org/stream"), None);
        assert_eq!(url_extension("local:unknown"), None);
    }

    #[test]
    fn abandoned_acquire_raises_the_cancel_flag() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let guard = CancelOnDrop(Arc::clone(&cancelled));
        assert!(!cancelled.load(Ordering::Acquire));

        drop(guard);
        assert!(cancelled.load(Ordering::Acquire));
    }

    #[test]
    fn asset_path_joins_file_name() {
        let backend = DesktopBackend::new("/opt/elementa/audio").expect("backend");
        assert_eq!(
            backend.asset_path(AssetId::Conclusion),
            PathBuf::from("/opt/elementa/audio/conclusion.mp3")
        );
    }
}

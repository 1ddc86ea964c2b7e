//! Document download with local-then-remote resolution.
//!
//! The fetch runs on a named worker thread and reports back over a flume
//! channel drained on the app tick. Transfer size is unknown up front, so the
//! overlay shows synthetic progress: +5% every 200ms, capped at 90% until the
//! worker reports a result.

use crate::notification::NotificationManager;
use log::{debug, error, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

const PROGRESS_STEP: u16 = 5;
const PROGRESS_TICK: Duration = Duration::from_millis(200);
const PROGRESS_CAP: u16 = 90;
const OVERLAY_DISMISS_DELAY: Duration = Duration::from_millis(1500);

const FALLBACK_FILE_NAME: &str = "document.pdf";

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("no download directory available")]
    NoDownloadDir,
    #[error("request to {url} failed: {reason}")]
    Http { url: String, reason: String },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Which resolution path produced the saved file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadSource {
    LocalAsset,
    RemoteUrl,
}

#[derive(Debug)]
enum DownloadEvent {
    Finished { path: PathBuf, source: DownloadSource },
    Failed(DownloadError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverlayPhase {
    Running,
    Complete,
}

/// Modal progress state rendered by the download overlay widget.
#[derive(Debug)]
pub struct ProgressOverlay {
    percent: u16,
    caption: String,
    phase: OverlayPhase,
    last_step: Instant,
    dismiss_at: Option<Instant>,
}

impl ProgressOverlay {
    fn new() -> Self {
        Self {
            percent: 0,
            caption: "Saving document...".to_string(),
            phase: OverlayPhase::Running,
            last_step: Instant::now(),
            dismiss_at: None,
        }
    }

    pub fn percent(&self) -> u16 {
        self.percent
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn is_complete(&self) -> bool {
        self.phase == OverlayPhase::Complete
    }

    fn complete(&mut self, caption: String) {
        self.percent = 100;
        self.caption = caption;
        self.phase = OverlayPhase::Complete;
        self.dismiss_at = Some(Instant::now() + OVERLAY_DISMISS_DELAY);
    }
}

pub struct DownloadManager {
    local_asset: PathBuf,
    remote_url: String,
    target_dir: Option<PathBuf>,
    overlay: Option<ProgressOverlay>,
    worker_rx: Option<flume::Receiver<DownloadEvent>>,
}

impl DownloadManager {
    /// `target_dir` of None saves into the user download directory.
    pub fn new(local_asset: PathBuf, remote_url: String, target_dir: Option<PathBuf>) -> Self {
        Self {
            local_asset,
            remote_url,
            target_dir,
            overlay: None,
            worker_rx: None,
        }
    }

    /// A download counts as busy from trigger until its overlay is gone, so
    /// repeated triggers cannot stack workers or overlays.
    pub fn is_busy(&self) -> bool {
        self.overlay.is_some() || self.worker_rx.is_some()
    }

    pub fn overlay(&self) -> Option<&ProgressOverlay> {
        self.overlay.as_ref()
    }

    /// Spawns the fetch worker. Returns false (and does nothing) while busy.
    pub fn start(&mut self) -> bool {
        if self.is_busy() {
            debug!("Download already in progress, ignoring trigger");
            return false;
        }

        let local = self.local_asset.clone();
        let remote = self.remote_url.clone();
        let target = self.target_dir.clone().or_else(dirs::download_dir);
        let (event_tx, event_rx) = flume::unbounded();

        let spawned = std::thread::Builder::new()
            .name("document-download".to_string())
            .spawn(move || {
                let event = match run_download(&local, &remote, target.as_deref()) {
                    Ok((path, source)) => DownloadEvent::Finished { path, source },
                    Err(e) => DownloadEvent::Failed(e),
                };
                let _ = event_tx.send(event);
            });

        match spawned {
            Ok(_) => {
                self.worker_rx = Some(event_rx);
                self.overlay = Some(ProgressOverlay::new());
                info!("Download started");
                true
            }
            Err(e) => {
                error!("Failed to spawn download worker: {e}");
                false
            }
        }
    }

    /// Drains worker results and advances the synthetic progress. Returns
    /// true when the overlay changed and a redraw is needed.
    pub fn on_tick(&mut self, notifications: &mut NotificationManager) -> bool {
        let mut changed = false;

        if let Some(rx) = &self.worker_rx {
            let mut finished = false;
            while let Ok(event) = rx.try_recv() {
                finished = true;
                changed = true;
                match event {
                    DownloadEvent::Finished { path, source } => {
                        let label = match source {
                            DownloadSource::LocalAsset => "local copy",
                            DownloadSource::RemoteUrl => "remote",
                        };
                        info!("Download finished from {label}: {}", path.display());
                        if let Some(overlay) = &mut self.overlay {
                            overlay.complete(format!("Saved {}", path.display()));
                        }
                    }
                    DownloadEvent::Failed(e) => {
                        error!("Download failed: {e}");
                        notifications.error(format!("Download failed: {e}"));
                        if let Some(overlay) = &mut self.overlay {
                            overlay.complete("Download failed".to_string());
                        }
                    }
                }
            }
            if finished {
                self.worker_rx = None;
            }
        }

        if let Some(overlay) = &mut self.overlay {
            match overlay.phase {
                OverlayPhase::Running => {
                    if overlay.last_step.elapsed() >= PROGRESS_TICK {
                        overlay.percent = (overlay.percent + PROGRESS_STEP).min(PROGRESS_CAP);
                        overlay.last_step = Instant::now();
                        changed = true;
                    }
                }
                OverlayPhase::Complete => {
                    if overlay
                        .dismiss_at
                        .is_some_and(|dismiss_at| Instant::now() >= dismiss_at)
                    {
                        self.overlay = None;
                        changed = true;
                    }
                }
            }
        }

        changed
    }
}

/// Resolves the document: copy the local asset when it exists, otherwise
/// fetch the remote URL. Any probe failure (missing file, unreadable
/// metadata) routes to the remote fallback rather than erroring.
fn run_download(
    local: &Path,
    remote: &str,
    target_dir: Option<&Path>,
) -> Result<(PathBuf, DownloadSource), DownloadError> {
    let target_dir = target_dir.ok_or(DownloadError::NoDownloadDir)?;
    let file_name = local
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());
    let dest = target_dir.join(file_name);

    match fs::metadata(local) {
        Ok(meta) if meta.is_file() => {
            fs::copy(local, &dest).map_err(|source| DownloadError::Write {
                path: dest.clone(),
                source,
            })?;
            debug!("Copied local asset {} to {}", local.display(), dest.display());
            return Ok((dest, DownloadSource::LocalAsset));
        }
        Ok(_) => debug!("Local asset {} is not a file, trying remote", local.display()),
        Err(e) => debug!("Local asset probe failed ({e}), trying remote"),
    }

    let agent = ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(10))
        .timeout_read(Duration::from_secs(60))
        .build();
    let response = agent.get(remote).call().map_err(|e| DownloadError::Http {
        url: remote.to_string(),
        reason: e.to_string(),
    })?;

    let mut reader = response.into_reader();
    let mut file = fs::File::create(&dest).map_err(|source| DownloadError::Write {
        path: dest.clone(),
        source,
    })?;
    io::copy(&mut reader, &mut file).map_err(|source| DownloadError::Write {
        path: dest.clone(),
        source,
    })?;

    debug!("Fetched {} to {}", remote, dest.display());
    Ok((dest, DownloadSource::RemoteUrl))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use tempfile::TempDir;

    // Port 1 on loopback is closed; the connection is refused immediately,
    // so no test ever waits on a real network.
    const DEAD_URL: &str = "http://127.0.0.1:1/document.pdf";

    fn drain(manager: &mut DownloadManager, notifications: &mut NotificationManager) {
        for _ in 0..300 {
            manager.on_tick(notifications);
            if !manager.is_busy() {
                return;
            }
            sleep(Duration::from_millis(20));
        }
        panic!("download did not settle");
    }

    #[test]
    fn local_asset_is_copied_when_present() {
        let source_dir = TempDir::new().unwrap();
        let target_dir = TempDir::new().unwrap();
        let asset = source_dir.path().join("document.pdf");
        fs::write(&asset, b"pdf bytes").unwrap();

        let mut manager = DownloadManager::new(
            asset,
            DEAD_URL.to_string(),
            Some(target_dir.path().to_path_buf()),
        );
        let mut notifications = NotificationManager::new();

        assert!(manager.start());
        drain(&mut manager, &mut notifications);

        let saved = target_dir.path().join("document.pdf");
        assert_eq!(fs::read(saved).unwrap(), b"pdf bytes");
        assert!(!notifications.has_notification());
    }

    #[test]
    fn missing_local_asset_falls_back_to_remote() {
        let target_dir = TempDir::new().unwrap();
        let mut manager = DownloadManager::new(
            PathBuf::from("/nonexistent/document.pdf"),
            DEAD_URL.to_string(),
            Some(target_dir.path().to_path_buf()),
        );
        let mut notifications = NotificationManager::new();

        assert!(manager.start());
        drain(&mut manager, &mut notifications);

        // The remote is unreachable, so the fallback surfaces as a failure
        // notification rather than a hung probe error.
        assert!(notifications.has_notification());
        let message = &notifications.current().unwrap().message;
        assert!(message.contains("Download failed"), "got: {message}");
    }

    #[test]
    fn second_trigger_is_ignored_while_busy() {
        let source_dir = TempDir::new().unwrap();
        let target_dir = TempDir::new().unwrap();
        let asset = source_dir.path().join("document.pdf");
        fs::write(&asset, b"pdf bytes").unwrap();

        let mut manager = DownloadManager::new(
            asset,
            DEAD_URL.to_string(),
            Some(target_dir.path().to_path_buf()),
        );
        let mut notifications = NotificationManager::new();

        assert!(manager.start());
        assert!(manager.is_busy());
        assert!(!manager.start());

        drain(&mut manager, &mut notifications);
        assert!(!manager.is_busy());
        assert!(manager.start());
    }

    #[test]
    fn overlay_completes_then_dismisses_after_delay() {
        let source_dir = TempDir::new().unwrap();
        let target_dir = TempDir::new().unwrap();
        let asset = source_dir.path().join("document.pdf");
        fs::write(&asset, b"pdf bytes").unwrap();

        let mut manager = DownloadManager::new(
            asset,
            DEAD_URL.to_string(),
            Some(target_dir.path().to_path_buf()),
        );
        let mut notifications = NotificationManager::new();
        manager.start();

        // Wait for the worker to finish; the overlay hits 100 and lingers.
        let mut saw_complete = false;
        for _ in 0..300 {
            manager.on_tick(&mut notifications);
            if let Some(overlay) = manager.overlay() {
                if overlay.is_complete() {
                    assert_eq!(overlay.percent(), 100);
                    saw_complete = true;
                    break;
                }
            }
            sleep(Duration::from_millis(10));
        }
        assert!(saw_complete);

        sleep(OVERLAY_DISMISS_DELAY + Duration::from_millis(100));
        manager.on_tick(&mut notifications);
        assert!(manager.overlay().is_none());
        assert!(!manager.is_busy());
    }

    #[test]
    fn synthetic_progress_caps_below_completion() {
        let overlay = ProgressOverlay::new();
        assert_eq!(overlay.percent(), 0);
        // 30 steps at +5 would be 150; the cap holds it at 90 until the
        // worker reports.
        let capped = (0..30).fold(0u16, |p, _| (p + PROGRESS_STEP).min(PROGRESS_CAP));
        assert_eq!(capped, PROGRESS_CAP);
    }

    #[test]
    fn missing_download_dir_is_reported() {
        let err = run_download(Path::new("/nonexistent"), DEAD_URL, None).unwrap_err();
        assert!(matches!(err, DownloadError::NoDownloadDir));
    }

    #[test]
    fn error_messages_name_the_failing_url() {
        let target_dir = TempDir::new().unwrap();
        let err = run_download(
            Path::new("/nonexistent/document.pdf"),
            DEAD_URL,
            Some(target_dir.path()),
        )
        .unwrap_err();
        match err {
            DownloadError::Http { url, .. } => assert_eq!(url, DEAD_URL),
            other => panic!("expected Http error, got: {other}"),
        }
    }
}

//! Screen-recording session lifecycle
//!
//! One live recording per device, a hard 180-second ceiling, and
//! reconciliation of sessions whose `screenrecord` has already hit its
//! `--time-limit` on the device side. All session state lives in one
//! map behind a mutex so two concurrent `start` calls cannot both
//! observe an idle device.

use crate::config::TIMING_CONFIG;
use crate::error::{BridgeError, Result};
use crate::AdbRunner;
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// Hard ceiling screenrecord itself enforces via `--time-limit`
pub const MAX_RECORD_SECS: u64 = 180;

/// Lifecycle state of a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Recording,
    Stopped,
    /// Duration ceiling elapsed without an explicit stop
    Expired,
}

/// Caller-facing view of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub session_id: Uuid,
    pub device: String,
    pub state: SessionState,
    pub remote_path: String,
    pub limit_secs: u64,
    pub elapsed_secs: u64,
}

#[derive(Debug, Clone)]
struct RecordingSession {
    id: Uuid,
    device: String,
    started_at: Instant,
    limit: Duration,
    remote_path: String,
    state: SessionState,
}

impl RecordingSession {
    /// The device-side screenrecord terminates on its own at the
    /// limit; flip our view so a session is never reported as live
    /// past its own ceiling.
    fn reconcile(&mut self) {
        if self.state == SessionState::Recording && self.started_at.elapsed() >= self.limit {
            self.state = SessionState::Expired;
        }
    }

    fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id,
            device: self.device.clone(),
            state: self.state,
            remote_path: self.remote_path.clone(),
            limit_secs: self.limit.as_secs(),
            elapsed_secs: self.started_at.elapsed().as_secs().min(self.limit.as_secs()),
        }
    }
}

fn validate_duration(duration_secs: u64) -> Result<()> {
    if duration_secs == 0 || duration_secs > MAX_RECORD_SECS {
        // Rejecting keeps the caller's expectation aligned with the
        // artifact length; silent clamping would not
        return Err(BridgeError::InvalidDuration(duration_secs as u32));
    }
    Ok(())
}

/// Owns per-device recording state; sessions on different devices are
/// fully independent.
pub struct RecordingManager {
    runner: AdbRunner,
    sessions: Mutex<HashMap<String, RecordingSession>>,
}

impl RecordingManager {
    pub fn new(runner: AdbRunner) -> Self {
        Self {
            runner,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Start recording the screen of `serial`.
    ///
    /// Launches `screenrecord` detached and returns immediately.
    /// Fails with `SessionAlreadyActive` while a previous recording on
    /// the same device is still live, and with `InvalidDuration` for
    /// durations of zero or above the 180 s ceiling.
    pub async fn start(
        &self,
        serial: &str,
        duration_secs: u64,
        basename: &str,
    ) -> Result<SessionStatus> {
        validate_duration(duration_secs)?;

        let mut sessions = self.sessions.lock().await;
        if let Some(existing) = sessions.get_mut(serial) {
            existing.reconcile();
            if existing.state == SessionState::Recording {
                return Err(BridgeError::SessionAlreadyActive(serial.to_string()));
            }
        }

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let remote_path = format!("/sdcard/{}_{}.mp4", basename, timestamp);

        self.runner.spawn_detached(
            Some(serial),
            &[
                "shell",
                "screenrecord",
                "--time-limit",
                &duration_secs.to_string(),
                &remote_path,
            ],
        )?;

        let session = RecordingSession {
            id: Uuid::new_v4(),
            device: serial.to_string(),
            started_at: Instant::now(),
            limit: Duration::from_secs(duration_secs),
            remote_path,
            state: SessionState::Recording,
        };
        info!(serial, path = %session.remote_path, limit = duration_secs, "recording started");

        let status = session.status();
        sessions.insert(serial.to_string(), session);
        Ok(status)
    }

    /// Current state of the session on `serial`, reconciled against
    /// elapsed time.
    pub async fn status(&self, serial: &str) -> Result<SessionStatus> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(serial)
            .ok_or_else(|| BridgeError::NoActiveSession(serial.to_string()))?;
        session.reconcile();
        Ok(session.status())
    }

    /// Stop the recording on `serial` and return the device-side
    /// artifact path.
    ///
    /// Safe against auto-expiry: a session whose limit already elapsed
    /// is finalized on the device, so the artifact path is returned
    /// without signaling the (long gone) screenrecord process.
    pub async fn stop(&self, serial: &str) -> Result<String> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(serial)
            .ok_or_else(|| BridgeError::NoActiveSession(serial.to_string()))?;
        session.reconcile();

        match session.state {
            SessionState::Expired => {
                debug!(serial, "stop after auto-expiry, artifact already finalized");
                return Ok(session.remote_path.clone());
            }
            SessionState::Stopped => {
                return Err(BridgeError::NoActiveSession(serial.to_string()));
            }
            SessionState::Recording => {}
        }

        // SIGINT lets screenrecord write the trailing moov atom; a
        // hard kill would leave the file unplayable. The session stays
        // Recording until the signal is actually delivered, so a
        // failed stop can simply be retried.
        self.runner
            .run(
                Some(serial),
                &["shell", "pkill", "-l", "SIGINT", "screenrecord"],
                Some(Duration::from_secs(TIMING_CONFIG.runner.shell_timeout)),
            )
            .await?;

        session.state = SessionState::Stopped;
        let remote_path = session.remote_path.clone();
        drop(sessions);

        tokio::time::sleep(Duration::from_secs_f64(
            TIMING_CONFIG.recording.flush_delay,
        ))
        .await;

        info!(serial, path = %remote_path, "recording stopped");
        Ok(remote_path)
    }

    /// Pull every completed recording off the device into `local_dir`.
    ///
    /// Refuses with `ArtifactNotReady` when a file on the device
    /// belongs to a session that is still recording; stop it first.
    pub async fn pull_artifacts(&self, serial: &str, local_dir: &str) -> Result<Vec<String>> {
        let timeout = Duration::from_secs(TIMING_CONFIG.runner.shell_timeout);
        let listing = self
            .runner
            .run(
                Some(serial),
                &["shell", "ls", "/sdcard/*.mp4"],
                Some(timeout),
            )
            .await?;

        if listing.stdout.contains("No such file") {
            return Ok(Vec::new());
        }

        let remote_files: Vec<String> = listing
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| l.ends_with(".mp4"))
            .map(str::to_string)
            .collect();

        {
            let mut sessions = self.sessions.lock().await;
            if let Some(session) = sessions.get_mut(serial) {
                session.reconcile();
                if session.state == SessionState::Recording
                    && remote_files.iter().any(|f| *f == session.remote_path)
                {
                    return Err(BridgeError::ArtifactNotReady(session.remote_path.clone()));
                }
            }
        }

        std::fs::create_dir_all(local_dir)?;

        let pull_timeout = Duration::from_secs(TIMING_CONFIG.runner.pull_timeout);
        let mut pulled = Vec::new();
        for remote in &remote_files {
            let name = remote.rsplit('/').next().unwrap_or(remote);
            let local = format!("{}/{}", local_dir.trim_end_matches('/'), name);
            self.runner
                .run(Some(serial), &["pull", remote, &local], Some(pull_timeout))
                .await?
                .require_success()?;
            pulled.push(local);
        }

        info!(serial, count = pulled.len(), local_dir, "pulled recordings");
        Ok(pulled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // `true` accepts and ignores any arguments, so the manager can
    // exercise its state machine without a device attached
    fn manager() -> RecordingManager {
        RecordingManager::new(AdbRunner::with_path("true".to_string()))
    }

    async fn backdate(manager: &RecordingManager, serial: &str, by: Duration) {
        let mut sessions = manager.sessions.lock().await;
        let session = sessions.get_mut(serial).unwrap();
        session.started_at = Instant::now() - by;
    }

    #[test]
    fn test_validate_duration() {
        assert!(validate_duration(1).is_ok());
        assert!(validate_duration(180).is_ok());
        assert!(matches!(
            validate_duration(200),
            Err(BridgeError::InvalidDuration(200))
        ));
        assert!(matches!(
            validate_duration(0),
            Err(BridgeError::InvalidDuration(0))
        ));
    }

    #[tokio::test]
    async fn test_start_returns_recording_status() {
        let mgr = manager();
        let status = mgr.start("emulator-5554", 30, "demo").await.unwrap();
        assert_eq!(status.state, SessionState::Recording);
        assert_eq!(status.limit_secs, 30);
        assert!(status.remote_path.starts_with("/sdcard/demo_"));
        assert!(status.remote_path.ends_with(".mp4"));
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let mgr = manager();
        mgr.start("emulator-5554", 30, "demo").await.unwrap();
        match mgr.start("emulator-5554", 30, "demo").await {
            Err(BridgeError::SessionAlreadyActive(serial)) => {
                assert_eq!(serial, "emulator-5554");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_on_second_device_is_independent() {
        let mgr = manager();
        mgr.start("emulator-5554", 30, "demo").await.unwrap();
        assert!(mgr.start("emulator-5556", 30, "demo").await.is_ok());
    }

    #[tokio::test]
    async fn test_status_reports_expired_after_limit() {
        let mgr = manager();
        mgr.start("emulator-5554", 5, "demo").await.unwrap();
        backdate(&mgr, "emulator-5554", Duration::from_secs(10)).await;

        let status = mgr.status("emulator-5554").await.unwrap();
        assert_eq!(status.state, SessionState::Expired);
        assert_eq!(status.elapsed_secs, 5); // capped at the limit
    }

    #[tokio::test]
    async fn test_stop_after_expiry_returns_artifact() {
        let mgr = manager();
        let started = mgr.start("emulator-5554", 5, "demo").await.unwrap();
        backdate(&mgr, "emulator-5554", Duration::from_secs(10)).await;

        let path = mgr.stop("emulator-5554").await.unwrap();
        assert_eq!(path, started.remote_path);
    }

    #[tokio::test]
    async fn test_stop_without_session_fails() {
        let mgr = manager();
        match mgr.stop("emulator-5554").await {
            Err(BridgeError::NoActiveSession(_)) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_expiry_frees_device_for_new_start() {
        let mgr = manager();
        mgr.start("emulator-5554", 5, "demo").await.unwrap();
        backdate(&mgr, "emulator-5554", Duration::from_secs(10)).await;
        assert!(mgr.start("emulator-5554", 5, "demo").await.is_ok());
    }

    #[tokio::test]
    async fn test_explicit_stop_finalizes_session() {
        let mgr = manager();
        let started = mgr.start("emulator-5554", 60, "demo").await.unwrap();
        let path = mgr.stop("emulator-5554").await.unwrap();
        assert_eq!(path, started.remote_path);

        let status = mgr.status("emulator-5554").await.unwrap();
        assert_eq!(status.state, SessionState::Stopped);

        // A second explicit stop has nothing left to stop
        match mgr.stop("emulator-5554").await {
            Err(BridgeError::NoActiveSession(_)) => {}
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_stop_leaves_session_recording() {
        let mut mgr = manager();
        mgr.start("emulator-5554", 60, "demo").await.unwrap();

        // Signal delivery fails when the binary cannot even spawn;
        // the session must stay live so the stop can be retried
        mgr.runner = AdbRunner::with_path("/nonexistent/adb".to_string());
        assert!(mgr.stop("emulator-5554").await.is_err());

        mgr.runner = AdbRunner::with_path("true".to_string());
        let status = mgr.status("emulator-5554").await.unwrap();
        assert_eq!(status.state, SessionState::Recording);
        assert!(mgr.stop("emulator-5554").await.is_ok());
    }

    #[tokio::test]
    async fn test_stopped_device_accepts_new_start() {
        let mgr = manager();
        mgr.start("emulator-5554", 60, "demo").await.unwrap();
        mgr.stop("emulator-5554").await.unwrap();
        assert!(mgr.start("emulator-5554", 60, "demo").await.is_ok());
    }
}

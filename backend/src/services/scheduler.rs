use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::SyncError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshStats {
    pub courses: usize,
    pub teachers: usize,
}

/// Reloads both kinds from the remote store concurrently. Both are attempted
/// even when one fails; the course error wins if both do.
pub async fn refresh_all(state: &AppState) -> Result<RefreshStats, SyncError> {
    let (courses, teachers) = tokio::join!(state.courses.load_all(), state.teachers.load_all());
    Ok(RefreshStats {
        courses: courses?,
        teachers: teachers?,
    })
}

/// Periodically replaces the local lists with the remote snapshot so edits
/// made by other admins show up without a restart.
pub struct RefreshScheduler {
    state: AppState,
    interval: Duration,
}

impl RefreshScheduler {
    pub fn new(state: AppState, interval: Duration) -> Self {
        Self { state, interval }
    }

    pub async fn start(self) {
        info!("Starting refresh scheduler (interval: {:?})", self.interval);

        loop {
            tokio::time::sleep(self.interval).await;

            match refresh_all(&self.state).await {
                Ok(stats) => {
                    info!(
                        "Refresh completed - {} courses, {} teachers",
                        stats.courses, stats.teachers
                    );
                }
                Err(e) => {
                    // keep looping, the next tick may succeed
                    warn!("Refresh failed: {}", e);
                }
            }
        }
    }
}

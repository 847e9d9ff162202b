use tracing::warn;

use crate::content::DEFAULT_STALL_WARNING_SECONDS;

/// Warns once when a running mission goes `threshold_seconds` of mission
/// time without any progress.
#[derive(Debug, Clone)]
pub struct StallWatchdog {
    threshold_seconds: f32,
    last_progress_seconds: f32,
    last_progress_label: &'static str,
    warned: bool,
}

impl Default for StallWatchdog {
    fn default() -> Self {
        Self::new(DEFAULT_STALL_WARNING_SECONDS)
    }
}

impl StallWatchdog {
    pub fn new(threshold_seconds: f32) -> Self {
        let threshold_seconds = if threshold_seconds.is_finite() && threshold_seconds > 0.0 {
            threshold_seconds
        } else {
            DEFAULT_STALL_WARNING_SECONDS
        };
        Self {
            threshold_seconds,
            last_progress_seconds: 0.0,
            last_progress_label: "start",
            warned: false,
        }
    }

    pub fn threshold_seconds(&self) -> f32 {
        self.threshold_seconds
    }

    pub fn has_warned(&self) -> bool {
        self.warned
    }

    pub fn mark_progress(&mut self, now_seconds: f32, label: &'static str) {
        self.last_progress_seconds = now_seconds;
        self.last_progress_label = label;
        self.warned = false;
    }

    /// Returns true when this call emitted the stall warning.
    pub fn observe(&mut self, now_seconds: f32, mission_id: &str, phase_id: &str) -> bool {
        let idle_seconds = now_seconds - self.last_progress_seconds;
        if self.warned || idle_seconds < self.threshold_seconds {
            return false;
        }
        self.warned = true;
        warn!(
            mission_id,
            phase_id,
            idle_seconds,
            last_progress = self.last_progress_label,
            "mission_stalled_no_progress"
        );
        true
    }
}

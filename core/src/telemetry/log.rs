use log::{debug, info, warn};

/// Thin facade over `log` that tags every message with the emitting stage.
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, stage: &str, message: &str) {
        info!("[{}] {}", stage, message);
    }

    pub fn detail(&self, stage: &str, message: &str) {
        debug!("[{}] {}", stage, message);
    }

    pub fn caution(&self, stage: &str, message: &str) {
        warn!("[{}] {}", stage, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

use crate::{RunId, RunPhase};

/// Counters accumulated over one run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunStats {
    pub scans: usize,
    pub queued: usize,
    pub skipped: usize,
    pub failed: usize,
    pub scroll_retries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunView {
    pub phase: RunPhase,
    pub run: RunId,
    pub target: usize,
    pub collected: usize,
    pub pending: usize,
    pub in_flight: Option<String>,
    pub last_status: Option<String>,
    pub last_scan_new: usize,
    pub stats: RunStats,
    pub dirty: bool,
}

impl RunView {
    /// One-line progress summary for terminal output.
    pub fn summary(&self) -> String {
        format!(
            "{:?}: {}/{} collected, {} queued, {} skipped, {} failed",
            self.phase,
            self.collected,
            self.target,
            self.pending,
            self.stats.skipped,
            self.stats.failed
        )
    }
}

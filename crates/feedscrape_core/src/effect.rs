use std::time::Duration;

use crate::{PostRef, RunId, ScanTrigger, ScrapedPost, Timer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Push a status line to the UI (fire-and-forget, latest wins).
    EmitStatus(String),
    /// Query the document for post containers and report back with `Msg::ScanCompleted`.
    Scan { run: RunId, trigger: ScanTrigger },
    /// Extract one post and report back with `Msg::ExtractionFinished`.
    Extract { run: RunId, post: PostRef },
    ScrollToBottom,
    Schedule {
        delay: Delay,
        run: RunId,
        timer: Timer,
    },
    StartObserver,
    StopObserver,
    /// Write the collected posts as CSV and report back with `Msg::ExportFinished`.
    ExportCsv { posts: Vec<ScrapedPost> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delay {
    Fixed(Duration),
    /// `base` plus a uniformly sampled amount in `[0, spread]`.
    Jittered { base: Duration, spread: Duration },
}

impl Delay {
    /// Upper bound of the delay.
    pub fn max(&self) -> Duration {
        match *self {
            Delay::Fixed(d) => d,
            Delay::Jittered { base, spread } => base + spread,
        }
    }

    pub fn min(&self) -> Duration {
        match *self {
            Delay::Fixed(d) => d,
            Delay::Jittered { base, .. } => base,
        }
    }
}

/// Timing knobs of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Pause after each expand click so the content can settle.
    pub expand_settle: Duration,
    /// Wait after scrolling to the bottom before pulling again.
    pub scroll_retry: Duration,
    pub inter_post_base: Duration,
    pub inter_post_spread: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            expand_settle: Duration::from_millis(200),
            scroll_retry: Duration::from_millis(2_000),
            inter_post_base: Duration::from_millis(1_000),
            inter_post_spread: Duration::from_millis(200),
        }
    }
}

impl Pacing {
    pub fn inter_post(&self) -> Delay {
        Delay::Jittered {
            base: self.inter_post_base,
            spread: self.inter_post_spread,
        }
    }

    pub fn scroll_retry(&self) -> Delay {
        Delay::Fixed(self.scroll_retry)
    }
}

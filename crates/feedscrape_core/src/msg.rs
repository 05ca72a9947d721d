use std::path::PathBuf;

use crate::{ExtractOutcome, PostRef, RunId, ScanTrigger, Timer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// UI asked to start scraping; `0` selects the default target.
    StartRequested { max_posts: u32 },
    /// UI asked to stop the current run.
    StopRequested,
    /// UI asked for the collected posts as CSV.
    DownloadRequested,
    /// Candidates found by a discovery scan, in document order.
    ScanCompleted {
        run: RunId,
        trigger: ScanTrigger,
        candidates: Vec<PostRef>,
    },
    /// The single worker finished one post.
    ExtractionFinished {
        run: RunId,
        id: String,
        outcome: ExtractOutcome,
    },
    /// A scheduled continuation came due.
    TimerFired { run: RunId, timer: Timer },
    /// The change observer saw child-list mutations.
    MutationsObserved { added_nodes: usize },
    /// The CSV export finished writing (path) or failed (message).
    ExportFinished { result: Result<PathBuf, String> },
    /// Fallback for placeholder wiring.
    NoOp,
}

use std::collections::HashSet;

use crate::queue::DedupQueue;
use crate::view_model::{RunStats, RunView};
use crate::{Pacing, PostRef, RunId, ScrapedPost};

/// Target used when the UI asks for zero posts.
pub const DEFAULT_MAX_POSTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Active,
    Complete,
    Stopped,
}

impl RunPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunPhase::Complete | RunPhase::Stopped)
    }
}

/// Process-wide state of a scraping run. Reset whenever a run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    phase: RunPhase,
    run: RunId,
    target: usize,
    collected: Vec<ScrapedPost>,
    /// Every id that left the queue during this run, whatever its outcome.
    seen: HashSet<String>,
    pending: DedupQueue,
    in_flight: Option<String>,
    retry_scheduled: bool,
    pacing: Pacing,
    stats: RunStats,
    last_status: Option<String>,
    last_scan_new: usize,
    dirty: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self::with_pacing(Pacing::default())
    }
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pacing(pacing: Pacing) -> Self {
        Self {
            phase: RunPhase::Idle,
            run: 0,
            target: DEFAULT_MAX_POSTS,
            collected: Vec::new(),
            seen: HashSet::new(),
            pending: DedupQueue::new(),
            in_flight: None,
            retry_scheduled: false,
            pacing,
            stats: RunStats::default(),
            last_status: None,
            last_scan_new: 0,
            dirty: false,
        }
    }

    pub fn view(&self) -> RunView {
        RunView {
            phase: self.phase,
            run: self.run,
            target: self.target,
            collected: self.collected.len(),
            pending: self.pending.len(),
            in_flight: self.in_flight.clone(),
            last_status: self.last_status.clone(),
            last_scan_new: self.last_scan_new,
            stats: self.stats.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == RunPhase::Active
    }

    pub fn run(&self) -> RunId {
        self.run
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    pub fn collected(&self) -> &[ScrapedPost] {
        &self.collected
    }

    pub fn pending(&self) -> &DedupQueue {
        &self.pending
    }

    pub fn in_flight(&self) -> Option<&str> {
        self.in_flight.as_deref()
    }

    pub fn has_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }

    pub(crate) fn begin_run(&mut self, target: usize) -> RunId {
        self.run += 1;
        self.phase = RunPhase::Active;
        self.target = target;
        self.collected.clear();
        self.seen.clear();
        self.pending.clear();
        self.in_flight = None;
        self.retry_scheduled = false;
        self.stats = RunStats::default();
        self.last_scan_new = 0;
        self.dirty = true;
        self.run
    }

    pub(crate) fn set_phase(&mut self, phase: RunPhase) {
        if self.phase != phase {
            self.phase = phase;
            self.dirty = true;
        }
    }

    pub(crate) fn set_status(&mut self, status: &str) {
        self.last_status = Some(status.to_string());
        self.dirty = true;
    }

    /// Queues unseen candidates in order; returns how many were new.
    pub(crate) fn enqueue_candidates(&mut self, candidates: Vec<PostRef>) -> usize {
        self.stats.scans += 1;
        let mut queued = 0;
        for post in candidates {
            if self.pending.enqueue_if_absent(post, &self.seen) {
                queued += 1;
            }
        }
        self.stats.queued += queued;
        self.last_scan_new = queued;
        if queued > 0 {
            self.dirty = true;
        }
        queued
    }

    /// Takes the next pending post and marks it in flight.
    pub(crate) fn take_next(&mut self) -> Option<PostRef> {
        let post = self.pending.dequeue()?;
        self.seen.insert(post.id.clone());
        self.in_flight = Some(post.id.clone());
        self.dirty = true;
        Some(post)
    }

    pub(crate) fn clear_in_flight(&mut self) {
        self.in_flight = None;
    }

    /// Appends `post` unless the target is already met. Returns whether it was kept.
    pub(crate) fn push_collected(&mut self, post: ScrapedPost) -> bool {
        if self.collected.len() >= self.target {
            return false;
        }
        self.seen.insert(post.id().to_string());
        self.collected.push(post);
        self.dirty = true;
        true
    }

    pub(crate) fn target_reached(&self) -> bool {
        self.collected.len() >= self.target
    }

    pub(crate) fn record_skip(&mut self) {
        self.stats.skipped += 1;
        self.dirty = true;
    }

    pub(crate) fn record_failure(&mut self) {
        self.stats.failed += 1;
        self.dirty = true;
    }

    /// Marks a retry as scheduled; returns false when one is already pending.
    pub(crate) fn claim_retry(&mut self) -> bool {
        if self.retry_scheduled {
            return false;
        }
        self.retry_scheduled = true;
        self.stats.scroll_retries += 1;
        true
    }

    pub(crate) fn release_retry(&mut self) {
        self.retry_scheduled = false;
    }
}

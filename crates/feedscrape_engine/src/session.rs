use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use feedscrape_core::{
    update, ControlCommand, Delay, Effect, ExtractOutcome, Msg, Pacing, PostRef, RunId, RunPhase,
    RunState, ScanTrigger, StatusMessage, Timer,
};
use rand::Rng;
use scrape_logging::{scrape_debug, scrape_info, scrape_warn};

use crate::clock::Clock;
use crate::export::write_csv_export;
use crate::extract::PostExtractor;
use crate::observer::{ChangeObserver, ObserveScope};
use crate::page::Page;
use crate::scanner::DiscoveryScanner;

/// Receives status updates for the UI.
pub trait StatusSink {
    fn publish(&self, status: &StatusMessage);
}

pub struct ChannelStatusSink {
    tx: mpsc::Sender<StatusMessage>,
}

impl ChannelStatusSink {
    pub fn new(tx: mpsc::Sender<StatusMessage>) -> Self {
        Self { tx }
    }
}

impl StatusSink for ChannelStatusSink {
    fn publish(&self, status: &StatusMessage) {
        // Fire-and-forget: a closed UI just stops listening.
        let _ = self.tx.send(status.clone());
    }
}

#[derive(Debug)]
struct ScheduledTimer {
    due: Duration,
    seq: u64,
    run: RunId,
    timer: Timer,
}

impl PartialEq for ScheduledTimer {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for ScheduledTimer {}

impl PartialOrd for ScheduledTimer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTimer {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// The single logical worker: owns the run state and the page, executes the
/// controller's effects and feeds their results back, one message at a time.
///
/// Nothing runs concurrently. Timed continuations wait in a timer queue until
/// the embedding code advances the clock with [`Session::advance`],
/// [`Session::fire_due_timers`] or [`Session::run_until`].
pub struct Session<P: Page, C: Clock> {
    state: RunState,
    page: P,
    clock: C,
    scanner: DiscoveryScanner,
    extractor: PostExtractor,
    observer: ChangeObserver,
    inbox: VecDeque<Msg>,
    timers: BinaryHeap<Reverse<ScheduledTimer>>,
    next_seq: u64,
    sinks: Vec<Box<dyn StatusSink>>,
    statuses: Vec<String>,
    export_dir: Option<PathBuf>,
    export_date: Option<NaiveDate>,
}

impl<P: Page, C: Clock> Session<P, C> {
    pub fn new(page: P, clock: C) -> Self {
        Self::with_pacing(page, clock, Pacing::default())
    }

    pub fn with_pacing(page: P, clock: C, pacing: Pacing) -> Self {
        Self {
            state: RunState::with_pacing(pacing),
            page,
            clock,
            scanner: DiscoveryScanner::new(),
            extractor: PostExtractor::new(pacing.expand_settle),
            observer: ChangeObserver::new(),
            inbox: VecDeque::new(),
            timers: BinaryHeap::new(),
            next_seq: 0,
            sinks: Vec::new(),
            statuses: Vec::new(),
            export_dir: None,
            export_date: None,
        }
    }

    pub fn with_scanner(mut self, scanner: DiscoveryScanner) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn with_extractor(mut self, extractor: PostExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_observer(mut self, observer: ChangeObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_status_sink(mut self, sink: impl StatusSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Directory that receives CSV downloads.
    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = Some(dir);
        self
    }

    /// Pins the date used in export filenames; defaults to today (UTC).
    pub fn with_export_date(mut self, date: NaiveDate) -> Self {
        self.export_date = Some(date);
        self
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Every status emitted so far, oldest first.
    pub fn statuses(&self) -> &[String] {
        &self.statuses
    }

    pub fn observe_scope(&self) -> Option<ObserveScope> {
        self.observer.scope()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Applies a UI command and runs until no immediate work is left.
    pub fn command(&mut self, command: ControlCommand) {
        self.dispatch(command.into());
    }

    pub fn dispatch(&mut self, msg: Msg) {
        self.inbox.push_back(msg);
        self.run_until_idle();
    }

    /// Scans the document now; returns how many posts were newly queued.
    pub fn scan(&mut self) -> usize {
        if !self.state.is_active() {
            return 0;
        }
        let before = self.state.view().stats.queued;
        let run = self.state.run();
        let candidates = self.discover();
        self.dispatch(Msg::ScanCompleted {
            run,
            trigger: ScanTrigger::Manual,
            candidates,
        });
        self.state.view().stats.queued - before
    }

    /// Processes queued messages, then delivers observed mutations, until both are empty.
    pub fn run_until_idle(&mut self) {
        loop {
            while let Some(msg) = self.inbox.pop_front() {
                self.apply(msg);
            }
            let records = self.page.take_mutations();
            let added_nodes = self.observer.added_nodes(&records);
            if added_nodes == 0 {
                break;
            }
            self.inbox.push_back(Msg::MutationsObserved { added_nodes });
        }
    }

    pub fn next_timer_due(&self) -> Option<Duration> {
        self.timers.peek().map(|Reverse(timer)| timer.due)
    }

    /// Fires every timer already due at the current clock reading.
    pub fn fire_due_timers(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        while self.next_timer_due().is_some_and(|due| due <= now) {
            self.fire_next();
            fired += 1;
        }
        fired
    }

    /// Sleeps until the earliest timer and fires it. Returns false when none is pending.
    pub fn advance(&mut self) -> bool {
        let Some(due) = self.next_timer_due() else {
            return false;
        };
        let now = self.clock.now();
        if due > now {
            self.clock.sleep(due - now);
        }
        self.fire_next();
        true
    }

    /// Advances through timers due no later than `deadline`.
    pub fn run_until(&mut self, deadline: Duration) {
        while self.next_timer_due().is_some_and(|due| due <= deadline) {
            self.advance();
        }
    }

    /// Runs the active run until it ends or `budget` of clock time has passed.
    pub fn run_for(&mut self, budget: Duration) -> RunPhase {
        let deadline = self.clock.now() + budget;
        while self.state.is_active() && self.next_timer_due().is_some_and(|due| due <= deadline) {
            self.advance();
        }
        self.state.phase()
    }

    fn fire_next(&mut self) {
        let Some(Reverse(timer)) = self.timers.pop() else {
            return;
        };
        scrape_logging::set_virtual_ms(self.clock.now().as_millis() as u64);
        self.dispatch(Msg::TimerFired {
            run: timer.run,
            timer: timer.timer,
        });
    }

    fn apply(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::EmitStatus(line) => self.publish(line),
            Effect::Scan { run, trigger } => {
                let candidates = self.discover();
                self.inbox.push_back(Msg::ScanCompleted {
                    run,
                    trigger,
                    candidates,
                });
            }
            Effect::Extract { run, post } => {
                let outcome = self.extract(&post);
                self.inbox.push_back(Msg::ExtractionFinished {
                    run,
                    id: post.id,
                    outcome,
                });
            }
            Effect::ScrollToBottom => {
                if let Err(err) = self.page.scroll_to_bottom() {
                    scrape_warn!("Scroll failed: {err}");
                }
            }
            Effect::Schedule { delay, run, timer } => {
                let due = self.clock.now() + sample(delay);
                self.next_seq += 1;
                self.timers.push(Reverse(ScheduledTimer {
                    due,
                    seq: self.next_seq,
                    run,
                    timer,
                }));
            }
            Effect::StartObserver => match self.observer.start(&mut self.page) {
                Ok(scope) => scrape_debug!("Observing {scope:?}"),
                Err(err) => scrape_warn!("Could not observe the page: {err}"),
            },
            Effect::StopObserver => self.observer.stop(&mut self.page),
            Effect::ExportCsv { posts } => {
                let result = match &self.export_dir {
                    Some(dir) => {
                        let date = self
                            .export_date
                            .unwrap_or_else(|| Utc::now().date_naive());
                        write_csv_export(dir, &posts, date)
                            .map(|summary| summary.path)
                            .map_err(|err| err.to_string())
                    }
                    None => Err("no export directory configured".to_string()),
                };
                self.inbox.push_back(Msg::ExportFinished { result });
            }
        }
    }

    fn discover(&mut self) -> Vec<PostRef> {
        match self.scanner.discover(&self.page) {
            Ok(candidates) => candidates,
            Err(err) => {
                scrape_warn!("Scan failed: {err}");
                Vec::new()
            }
        }
    }

    fn extract(&mut self, post: &PostRef) -> ExtractOutcome {
        let result = self.extractor.extract(&mut self.page, &mut self.clock, post);
        scrape_logging::set_virtual_ms(self.clock.now().as_millis() as u64);
        match result {
            Ok(scraped) => ExtractOutcome::Collected(scraped),
            Err(err) => err.into_outcome(),
        }
    }

    fn publish(&mut self, line: String) {
        scrape_info!("[FB Scraper] {line}");
        let message = StatusMessage::new(line.clone());
        for sink in &self.sinks {
            sink.publish(&message);
        }
        self.statuses.push(line);
    }
}

fn sample(delay: Delay) -> Duration {
    match delay {
        Delay::Fixed(duration) => duration,
        Delay::Jittered { base, spread } => {
            let spread_ms = spread.as_millis() as u64;
            base + Duration::from_millis(rand::rng().random_range(0..=spread_ms))
        }
    }
}

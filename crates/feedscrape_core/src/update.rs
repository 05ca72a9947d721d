use scrape_logging::{scrape_debug, scrape_error, scrape_info};

use crate::state::DEFAULT_MAX_POSTS;
use crate::{Effect, ExtractOutcome, Msg, RunPhase, RunState, ScanTrigger, Timer};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: RunState, msg: Msg) -> (RunState, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested { max_posts } => {
            if state.is_active() {
                scrape_debug!("Start ignored, run {} is already active", state.run());
                return (state, Vec::new());
            }
            let target = if max_posts == 0 {
                DEFAULT_MAX_POSTS
            } else {
                max_posts as usize
            };
            let run = state.begin_run(target);
            vec![
                status(
                    &mut state,
                    format!("Scraping started. Target: {target} posts."),
                ),
                Effect::Scan {
                    run,
                    trigger: ScanTrigger::Initial,
                },
                Effect::StartObserver,
            ]
        }
        Msg::StopRequested => {
            let mut effects = Vec::with_capacity(2);
            if state.is_active() {
                state.set_phase(RunPhase::Stopped);
                effects.push(Effect::StopObserver);
            }
            let collected = state.collected().len();
            effects.push(status(
                &mut state,
                format!("Scraping stopped. Collected {collected} posts."),
            ));
            effects
        }
        Msg::DownloadRequested => {
            if state.collected().is_empty() {
                vec![status(&mut state, "No posts to download.".to_string())]
            } else {
                vec![Effect::ExportCsv {
                    posts: state.collected().to_vec(),
                }]
            }
        }
        Msg::ExportFinished { result } => {
            let line = match result {
                Ok(path) => {
                    scrape_info!("CSV written to {}", path.display());
                    format!("Downloaded {} posts as CSV.", state.collected().len())
                }
                Err(message) => format!("CSV export failed: {message}"),
            };
            vec![status(&mut state, line)]
        }
        Msg::ScanCompleted {
            run,
            trigger,
            candidates,
        } => {
            if run != state.run() || !state.is_active() {
                scrape_debug!("Dropping scan result for inactive run {run}");
                return (state, Vec::new());
            }
            let found = candidates.len();
            let queued = state.enqueue_candidates(candidates);
            scrape_debug!("Scan ({trigger:?}) saw {found} potential posts, {queued} new");

            let mut effects = Vec::new();
            if queued > 0 {
                let queue_len = state.pending().len();
                effects.push(status(
                    &mut state,
                    format!("Found {queued} new posts to process. Queue size: {queue_len}"),
                ));
            }
            match trigger {
                ScanTrigger::Initial | ScanTrigger::Mutation => effects.extend(pull(&mut state)),
                ScanTrigger::QueueDrained => {
                    if state.pending().is_empty() {
                        effects.extend(scroll_and_retry(&mut state));
                    } else {
                        effects.extend(pull(&mut state));
                    }
                }
                ScanTrigger::Manual => {}
            }
            effects
        }
        Msg::ExtractionFinished { run, id, outcome } => {
            if run != state.run() {
                scrape_debug!("Dropping extraction result for stale run {run}");
                return (state, Vec::new());
            }
            if state.in_flight() != Some(id.as_str()) {
                scrape_debug!("Extraction result for {id} does not match the in-flight post");
                return (state, Vec::new());
            }
            let mut effects = Vec::new();
            match outcome {
                ExtractOutcome::Collected(post) => {
                    if state.push_collected(post) {
                        let collected = state.collected().len();
                        let queue_len = state.pending().len();
                        effects.push(status(
                            &mut state,
                            format!("Scraped {collected} posts so far. Queue size: {queue_len}"),
                        ));
                    }
                }
                ExtractOutcome::Skipped(reason) => {
                    state.record_skip();
                    scrape_debug!("Skipping post {id} - {reason}");
                }
                ExtractOutcome::Failed(message) => {
                    state.record_failure();
                    scrape_error!("Error processing post {id}: {message}");
                }
            }

            if !state.is_active() {
                // Stopped while this post was in flight: record it, pull nothing more.
                state.clear_in_flight();
            } else if state.target_reached() {
                effects.extend(complete(&mut state));
            } else {
                effects.push(Effect::Schedule {
                    delay: state.pacing().inter_post(),
                    run,
                    timer: Timer::NextPost,
                });
            }
            effects
        }
        Msg::TimerFired { run, timer } => {
            if run != state.run() {
                return (state, Vec::new());
            }
            match timer {
                Timer::NextPost => state.clear_in_flight(),
                Timer::RetryPull => state.release_retry(),
            }
            pull(&mut state)
        }
        Msg::MutationsObserved { added_nodes } => {
            if added_nodes > 0 && state.is_active() {
                vec![Effect::Scan {
                    run: state.run(),
                    trigger: ScanTrigger::Mutation,
                }]
            } else {
                Vec::new()
            }
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// One step of the single worker. Never re-entrant: returns nothing while a
/// post is in flight or the run is not active.
fn pull(state: &mut RunState) -> Vec<Effect> {
    if !state.is_active() || state.in_flight().is_some() {
        return Vec::new();
    }
    if state.target_reached() {
        return complete(state);
    }
    let run = state.run();
    match state.take_next() {
        Some(post) => {
            scrape_debug!("Processing post: {}", post.id);
            vec![Effect::Extract { run, post }]
        }
        None => vec![Effect::Scan {
            run,
            trigger: ScanTrigger::QueueDrained,
        }],
    }
}

fn scroll_and_retry(state: &mut RunState) -> Vec<Effect> {
    if !state.claim_retry() {
        scrape_debug!("Queue empty, retry already scheduled");
        return Vec::new();
    }
    scrape_debug!("Queue empty, scrolling to load more posts");
    vec![
        Effect::ScrollToBottom,
        Effect::Schedule {
            delay: state.pacing().scroll_retry(),
            run: state.run(),
            timer: Timer::RetryPull,
        },
    ]
}

fn complete(state: &mut RunState) -> Vec<Effect> {
    state.set_phase(RunPhase::Complete);
    state.clear_in_flight();
    let target = state.target();
    vec![
        Effect::StopObserver,
        status(
            state,
            format!("Reached target of {target} posts. Scraping complete."),
        ),
    ]
}

fn status(state: &mut RunState, line: String) -> Effect {
    state.set_status(&line);
    Effect::EmitStatus(line)
}

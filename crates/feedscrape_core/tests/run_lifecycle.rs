use std::path::PathBuf;
use std::sync::Once;

use feedscrape_core::{
    update, Effect, ElementHandle, ExtractOutcome, Msg, PostRef, RunPhase, RunState, ScanTrigger,
    ScrapedPost, Timer, DEFAULT_MAX_POSTS,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(scrape_logging::initialize_for_tests);
}

fn start(max_posts: u32) -> (RunState, Vec<Effect>) {
    update(RunState::new(), Msg::StartRequested { max_posts })
}

fn scanned(state: RunState, ids: &[&str]) -> (RunState, Vec<Effect>) {
    let run = state.run();
    let candidates = ids
        .iter()
        .enumerate()
        .map(|(i, id)| PostRef::new(*id, ElementHandle(i as u64)))
        .collect();
    update(
        state,
        Msg::ScanCompleted {
            run,
            trigger: ScanTrigger::Initial,
            candidates,
        },
    )
}

fn collected(state: RunState, id: &str) -> (RunState, Vec<Effect>) {
    let run = state.run();
    update(
        state,
        Msg::ExtractionFinished {
            run,
            id: id.to_string(),
            outcome: ExtractOutcome::Collected(ScrapedPost::new(id, "Ada", "hello")),
        },
    )
}

#[test]
fn start_resets_and_requests_initial_scan() {
    init_logging();
    let (mut state, effects) = start(5);

    assert_eq!(state.phase(), RunPhase::Active);
    assert_eq!(state.run(), 1);
    assert_eq!(state.target(), 5);
    assert!(state.consume_dirty());
    assert_eq!(
        effects,
        vec![
            Effect::EmitStatus("Scraping started. Target: 5 posts.".to_string()),
            Effect::Scan {
                run: 1,
                trigger: ScanTrigger::Initial,
            },
            Effect::StartObserver,
        ]
    );
}

#[test]
fn zero_target_falls_back_to_default() {
    init_logging();
    let (state, effects) = start(0);

    assert_eq!(state.target(), DEFAULT_MAX_POSTS);
    assert_eq!(
        effects[0],
        Effect::EmitStatus("Scraping started. Target: 100 posts.".to_string())
    );
}

#[test]
fn start_while_active_is_ignored() {
    init_logging();
    let (state, _) = start(5);
    let (state, _) = scanned(state, &["a", "b"]);
    let before = state.clone();

    let (next, effects) = update(state, Msg::StartRequested { max_posts: 9 });

    assert!(effects.is_empty());
    assert_eq!(next, before);
}

#[test]
fn stop_disconnects_observer_and_reports() {
    init_logging();
    let (state, _) = start(5);
    let (state, effects) = update(state, Msg::StopRequested);

    assert_eq!(state.phase(), RunPhase::Stopped);
    assert_eq!(
        effects,
        vec![
            Effect::StopObserver,
            Effect::EmitStatus("Scraping stopped. Collected 0 posts.".to_string()),
        ]
    );
}

#[test]
fn stop_when_idle_only_reports() {
    init_logging();
    let (state, effects) = update(RunState::new(), Msg::StopRequested);

    assert_eq!(state.phase(), RunPhase::Idle);
    assert_eq!(
        effects,
        vec![Effect::EmitStatus(
            "Scraping stopped. Collected 0 posts.".to_string()
        )]
    );
}

#[test]
fn restart_after_completion_resets_run_state() {
    init_logging();
    let (state, _) = start(1);
    let (state, _) = scanned(state, &["a", "b"]);
    let (state, _) = collected(state, "a");
    assert_eq!(state.phase(), RunPhase::Complete);

    let (state, effects) = update(state, Msg::StartRequested { max_posts: 3 });

    assert_eq!(state.phase(), RunPhase::Active);
    assert_eq!(state.run(), 2);
    assert!(state.collected().is_empty());
    assert!(state.pending().is_empty());
    assert!(!state.has_seen("a"));
    assert_eq!(
        effects[1],
        Effect::Scan {
            run: 2,
            trigger: ScanTrigger::Initial,
        }
    );
}

#[test]
fn continuations_from_a_previous_run_are_ignored() {
    init_logging();
    let (state, _) = start(5);
    let (state, _) = scanned(state, &["a", "b"]);
    assert_eq!(state.in_flight(), Some("a"));
    let (state, _) = update(state, Msg::StopRequested);
    let (state, _) = update(state, Msg::StartRequested { max_posts: 5 });
    let (state, _) = scanned(state, &["x"]);
    assert_eq!(state.in_flight(), Some("x"));

    let (state, effects) = update(
        state,
        Msg::TimerFired {
            run: 1,
            timer: Timer::NextPost,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.in_flight(), Some("x"));

    let (state, effects) = update(
        state,
        Msg::ExtractionFinished {
            run: 1,
            id: "a".to_string(),
            outcome: ExtractOutcome::Collected(ScrapedPost::new("a", "Ada", "hello")),
        },
    );
    assert!(effects.is_empty());
    assert!(state.collected().is_empty());
}

#[test]
fn download_without_posts_reports_nothing_to_download() {
    init_logging();
    let (_, effects) = update(RunState::new(), Msg::DownloadRequested);
    assert_eq!(
        effects,
        vec![Effect::EmitStatus("No posts to download.".to_string())]
    );
}

#[test]
fn download_exports_collected_posts_in_order() {
    init_logging();
    let (state, _) = start(5);
    let (state, _) = scanned(state, &["a", "b"]);
    let (state, _) = collected(state, "a");

    let (state, effects) = update(state, Msg::DownloadRequested);
    assert_eq!(
        effects,
        vec![Effect::ExportCsv {
            posts: vec![ScrapedPost::new("a", "Ada", "hello")],
        }]
    );

    let (_, effects) = update(
        state,
        Msg::ExportFinished {
            result: Ok(PathBuf::from("facebook_group_posts_2026-10-16.csv")),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::EmitStatus("Downloaded 1 posts as CSV.".to_string())]
    );
}

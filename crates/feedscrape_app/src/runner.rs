use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use feedscrape_core::{ControlCommand, RunPhase};
use feedscrape_engine::{
    is_group_feed_url, Clock, HtmlPage, ManualClock, Page, Session, SystemClock,
};
use scrape_logging::{scrape_debug, scrape_info, scrape_warn};

use crate::cli::{PageArgs, RunArgs};
use crate::settings::{load_settings, save_settings, Settings};

pub fn load_page(args: &PageArgs) -> Result<HtmlPage> {
    let page = HtmlPage::from_files(&args.page, &args.more)
        .with_context(|| format!("loading page snapshot {:?}", args.page))?;
    let page = match &args.url {
        Some(url) => page.with_location(url.clone()),
        None => page,
    };
    match page.location() {
        Some(url) if is_group_feed_url(url) => scrape_info!("Scraping group feed {url}"),
        Some(url) => scrape_warn!("{url} is not a group feed, selectors may not match"),
        None => scrape_debug!("No page address given"),
    }
    Ok(page)
}

/// Fills a missing start target from the settings; an explicit non-zero
/// target becomes the new saved value.
pub fn apply_saved_target(command: ControlCommand, settings: &mut Settings) -> ControlCommand {
    match command {
        ControlCommand::StartScraping { max_posts: None } => ControlCommand::StartScraping {
            max_posts: Some(settings.max_posts),
        },
        ControlCommand::StartScraping {
            max_posts: Some(count),
        } => {
            if count > 0 {
                settings.max_posts = count;
            }
            ControlCommand::StartScraping {
                max_posts: Some(count),
            }
        }
        other => other,
    }
}

/// [`apply_saved_target`] plus saving the settings when they changed.
pub fn remember_target(
    command: ControlCommand,
    settings: &mut Settings,
    dir: &Path,
) -> ControlCommand {
    let before = settings.clone();
    let command = apply_saved_target(command, settings);
    if *settings != before {
        if let Err(err) = save_settings(dir, settings) {
            scrape_warn!("Could not save settings: {err}");
        }
    }
    command
}

/// Outcome of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub phase: RunPhase,
    pub collected: usize,
    pub statuses: Vec<String>,
}

pub fn run_batch(args: &RunArgs) -> Result<BatchReport> {
    let mut settings = load_settings(&args.page.out);
    let page = load_page(&args.page)?;
    let start = remember_target(
        ControlCommand::StartScraping {
            max_posts: args.max_posts,
        },
        &mut settings,
        &args.page.out,
    );
    let budget = Duration::from_secs(args.max_virtual_secs);
    let report = if args.realtime {
        drive(Session::new(page, SystemClock::new()), start, budget, &args.page.out)
    } else {
        drive(Session::new(page, ManualClock::new()), start, budget, &args.page.out)
    };
    Ok(report)
}

/// Runs one start-to-download cycle on `session`.
pub fn drive<C: Clock>(
    session: Session<HtmlPage, C>,
    start: ControlCommand,
    budget: Duration,
    out: &Path,
) -> BatchReport {
    let mut session = session.with_export_dir(out.to_path_buf());
    session.command(start);
    if session.run_for(budget) == RunPhase::Active {
        scrape_warn!(
            "Gave up after {}s with {} of {} posts",
            budget.as_secs(),
            session.state().collected().len(),
            session.state().target()
        );
        session.command(ControlCommand::StopScraping);
    }
    let phase = session.state().phase();
    session.command(ControlCommand::DownloadCsv);
    BatchReport {
        phase,
        collected: session.state().collected().len(),
        statuses: session.statuses().to_vec(),
    }
}

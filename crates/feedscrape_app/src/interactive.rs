//! Interactive mode: the control protocol over stdin/stdout.
//!
//! Each input line is a command (see [`crate::commands`]); every status the
//! session emits is written to stdout as an `updateStatus` JSON line. Timers
//! run in wall-clock time on a single-threaded runtime.
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use feedscrape_core::StatusMessage;
use feedscrape_engine::{ChannelStatusSink, Session, SystemClock};
use scrape_logging::{scrape_info, scrape_warn};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::cli::PageArgs;
use crate::commands::{parse_input, Input};
use crate::runner::{load_page, remember_target};
use crate::settings::load_settings;

pub fn run_interactive(args: &PageArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;
    runtime.block_on(serve(args))
}

async fn serve(args: &PageArgs) -> Result<()> {
    let mut settings = load_settings(&args.out);
    let (tx, rx) = mpsc::channel();
    let mut session = Session::new(load_page(args)?, SystemClock::new())
        .with_export_dir(args.out.clone())
        .with_status_sink(ChannelStatusSink::new(tx));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    scrape_info!("Waiting for commands on stdin");

    loop {
        flush_statuses(&rx, &mut stdout).await?;
        let wait = session
            .next_timer_due()
            .map(|due| due.saturating_sub(session.now()));

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                match parse_input(&line) {
                    Ok(Input::Control(command)) => {
                        let command = remember_target(command, &mut settings, &args.out);
                        session.command(command);
                    }
                    Ok(Input::Status) => {
                        let summary = StatusMessage::new(session.state().view().summary());
                        write_status(&mut stdout, &summary).await?;
                    }
                    Ok(Input::Quit) => break,
                    Ok(Input::Empty) => {}
                    Err(err) => scrape_warn!("{err}"),
                }
            }
            _ = sleep_for(wait) => {
                session.fire_due_timers();
            }
        }
    }

    flush_statuses(&rx, &mut stdout).await
}

async fn sleep_for(wait: Option<Duration>) {
    match wait {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending().await,
    }
}

async fn flush_statuses<W>(rx: &mpsc::Receiver<StatusMessage>, out: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    for status in rx.try_iter() {
        write_status(out, &status).await?;
    }
    Ok(())
}

async fn write_status<W>(out: &mut W, status: &StatusMessage) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_string(status)?;
    line.push('\n');
    out.write_all(line.as_bytes()).await?;
    out.flush().await?;
    Ok(())
}

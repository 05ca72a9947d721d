use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::logging::LogDestination;

#[derive(Parser, Debug)]
#[command(name = "feedscrape")]
#[command(about = "Collect author and text of posts from a saved group feed page")]
#[command(version)]
pub struct Cli {
    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal, global = true)]
    pub log: LogDestination,

    /// Include per-post diagnostics in the log
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape until the target is reached or the time budget runs out, then write the CSV
    Run(RunArgs),
    /// Read control messages from stdin and print status updates as JSON lines
    Interactive(PageArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    /// Saved HTML of the feed page
    #[arg(long)]
    pub page: PathBuf,

    /// HTML fragment revealed by the next scroll; repeat in loading order
    #[arg(long = "more", value_name = "FRAGMENT")]
    pub more: Vec<PathBuf>,

    /// Address the page was saved from
    #[arg(long)]
    pub url: Option<Url>,

    /// Directory for CSV downloads and saved settings
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Posts to collect (0 means 100); defaults to the last value used
    #[arg(long)]
    pub max_posts: Option<u32>,

    /// Wait in wall-clock time instead of virtual time
    #[arg(long)]
    pub realtime: bool,

    /// Give up after this many seconds of run time
    #[arg(long, default_value_t = 600)]
    pub max_virtual_secs: u64,
}

//! Parsing of lines typed (or piped) into interactive mode.
//!
//! A line is either a JSON control message as the popup would send it
//! (`{"action":"startScraping","maxPosts":50}`) or a short word command.
use feedscrape_core::ControlCommand;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Control(ControlCommand),
    /// Print the current run summary.
    Status,
    Quit,
    Empty,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid control message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("invalid post count {0:?}")]
    InvalidCount(String),
}

pub fn parse_input(line: &str) -> Result<Input, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Empty);
    }
    if line.starts_with('{') {
        return Ok(Input::Control(serde_json::from_str(line)?));
    }

    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default().to_ascii_lowercase();
    let command = match verb.as_str() {
        "start" => {
            let max_posts = match words.next() {
                Some(count) => Some(
                    count
                        .parse::<u32>()
                        .map_err(|_| CommandError::InvalidCount(count.to_string()))?,
                ),
                None => None,
            };
            ControlCommand::StartScraping { max_posts }
        }
        "stop" => ControlCommand::StopScraping,
        "download" | "csv" => ControlCommand::DownloadCsv,
        "status" => return Ok(Input::Status),
        "quit" | "exit" => return Ok(Input::Quit),
        _ => return Err(CommandError::Unknown(line.to_string())),
    };
    Ok(Input::Control(command))
}

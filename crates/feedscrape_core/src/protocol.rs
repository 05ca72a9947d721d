//! Messages exchanged with the UI: commands in, status updates out.
use serde::{Deserialize, Serialize};

use crate::Msg;

/// One-way command sent by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ControlCommand {
    #[serde(rename = "startScraping")]
    StartScraping {
        #[serde(rename = "maxPosts", default, skip_serializing_if = "Option::is_none")]
        max_posts: Option<u32>,
    },
    #[serde(rename = "stopScraping")]
    StopScraping,
    #[serde(rename = "downloadCSV")]
    DownloadCsv,
}

impl From<ControlCommand> for Msg {
    fn from(command: ControlCommand) -> Self {
        match command {
            ControlCommand::StartScraping { max_posts } => Msg::StartRequested {
                max_posts: max_posts.unwrap_or(0),
            },
            ControlCommand::StopScraping => Msg::StopRequested,
            ControlCommand::DownloadCsv => Msg::DownloadRequested,
        }
    }
}

/// Status pushed back to the UI. Latest value wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum StatusMessage {
    #[serde(rename = "updateStatus")]
    UpdateStatus { status: String },
}

impl StatusMessage {
    pub fn new(status: impl Into<String>) -> Self {
        StatusMessage::UpdateStatus {
            status: status.into(),
        }
    }

    pub fn status(&self) -> &str {
        match self {
            StatusMessage::UpdateStatus { status } => status,
        }
    }
}

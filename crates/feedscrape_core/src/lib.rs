//! Feedscrape core: pure run controller, dedup queue and UI protocol types.
mod effect;
mod msg;
mod protocol;
mod queue;
mod state;
mod types;
mod update;
mod view_model;

pub use effect::{Delay, Effect, Pacing};
pub use msg::Msg;
pub use protocol::{ControlCommand, StatusMessage};
pub use queue::{DedupQueue, SeenIds};
pub use state::{RunPhase, RunState, DEFAULT_MAX_POSTS};
pub use types::{
    ElementHandle, ExtractOutcome, PostRef, RunId, ScanTrigger, ScrapedPost, SkipReason, Timer,
};
pub use update::update;
pub use view_model::{RunStats, RunView};

//! Feedscrape engine: page capability, discovery, extraction and the run loop.
mod clock;
mod decode;
mod export;
mod extract;
mod html_page;
mod observer;
mod page;
mod persist;
mod scanner;
mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use decode::{decode_snapshot, DecodeError, DecodedSnapshot};
pub use export::{
    encode_csv, export_filename, parse_csv, write_csv_export, CsvError, CsvRow, ExportError,
    ExportSummary, CSV_HEADER,
};
pub use extract::{
    ExpandControls, ExtractError, FieldStrategy, FirstMatchText, PostExtractor, UNKNOWN_AUTHOR,
};
pub use html_page::{HtmlPage, SnapshotError};
pub use observer::{ChangeObserver, ObserveScope, DEFAULT_FEED_SELECTORS};
pub use page::{
    is_group_feed_url, Detached, MutationRecord, ObserveOptions, ObserverId, Page, PageError,
};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use scanner::{DiscoveryScanner, IdSource, RandomIds, SequentialIds, DEFAULT_POST_SELECTORS};
pub use session::{ChannelStatusSink, Session, StatusSink};

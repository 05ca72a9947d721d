use std::fmt;

/// Opaque reference to an element of the live page.
///
/// Handles are minted by the page implementation; the core only stores and
/// compares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(pub u64);

/// Generation counter of a run. Continuations carry the run they were issued for.
pub type RunId = u64;

/// A discovered post that has not been processed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRef {
    pub id: String,
    pub element: ElementHandle,
}

impl PostRef {
    pub fn new(id: impl Into<String>, element: ElementHandle) -> Self {
        Self {
            id: id.into(),
            element,
        }
    }
}

/// A successfully extracted post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapedPost {
    id: String,
    name: String,
    text: String,
}

impl ScrapedPost {
    pub fn new(id: impl Into<String>, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Why a post was dropped without being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnknownAuthor,
    EmptyText,
    UnknownAuthorAndEmptyText,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownAuthor => write!(f, "unknown author"),
            SkipReason::EmptyText => write!(f, "no text content found"),
            SkipReason::UnknownAuthorAndEmptyText => {
                write!(f, "unknown author and no text content found")
            }
        }
    }
}

/// Result of extracting one queued post, as reported back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    Collected(ScrapedPost),
    Skipped(SkipReason),
    Failed(String),
}

/// What caused a discovery scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTrigger {
    /// First scan of a freshly started run.
    Initial,
    /// The pull loop found the queue empty.
    QueueDrained,
    /// The change observer saw nodes being added.
    Mutation,
    /// Requested directly by the embedding application.
    Manual,
}

/// Timed continuations of the pull loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Clears the in-flight flag after the inter-post pause and pulls again.
    NextPost,
    /// Pulls again after scrolling to load more content.
    RetryPull,
}

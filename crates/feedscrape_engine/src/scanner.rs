use chrono::Utc;
use feedscrape_core::{ElementHandle, PostRef};
use rand::Rng;
use scrape_logging::scrape_debug;

use crate::page::{Page, PageError};

/// Post container shapes, tried together. Class names rotate, so structural
/// selectors come first and class-based ones are fallbacks.
pub const DEFAULT_POST_SELECTORS: &[&str] = &[r#"div[role="article"]"#, "div.x1yztbdb"];

/// Attributes that carry a usable post id, in order of preference.
const ID_ATTRIBUTES: &[&str] = &["id", "aria-labelledby"];

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Supplies ids for posts without an identifying attribute.
pub trait IdSource {
    fn fallback_id(&mut self) -> String;
}

/// `post_<unix millis>_<9 random base-36 chars>`.
///
/// These ids are not stable: the same element gets a new id on every scan.
#[derive(Debug, Default)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn fallback_id(&mut self) -> String {
        let mut rng = rand::rng();
        let suffix: String = (0..9)
            .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
            .collect();
        format!("post_{}_{}", Utc::now().timestamp_millis(), suffix)
    }
}

/// Deterministic fallback ids (`post_seq_1`, `post_seq_2`, ...).
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: u64,
}

impl IdSource for SequentialIds {
    fn fallback_id(&mut self) -> String {
        self.next += 1;
        format!("post_seq_{}", self.next)
    }
}

/// Finds candidate post elements and derives their ids.
pub struct DiscoveryScanner {
    selectors: Vec<String>,
    ids: Box<dyn IdSource>,
}

impl Default for DiscoveryScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl DiscoveryScanner {
    pub fn new() -> Self {
        Self::with_id_source(RandomIds)
    }

    pub fn with_id_source(ids: impl IdSource + 'static) -> Self {
        Self {
            selectors: DEFAULT_POST_SELECTORS.iter().map(|s| s.to_string()).collect(),
            ids: Box::new(ids),
        }
    }

    /// Adds another container shape to the union.
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selectors.push(selector.into());
        self
    }

    /// All candidates currently in the document, in document order, each once.
    pub fn discover(&mut self, page: &dyn Page) -> Result<Vec<PostRef>, PageError> {
        let elements = page.query_all(None, &self.selectors.join(", "))?;
        scrape_debug!("Found {} potential posts on the page", elements.len());
        elements
            .into_iter()
            .map(|element| Ok(PostRef::new(self.post_id(page, element)?, element)))
            .collect()
    }

    fn post_id(&mut self, page: &dyn Page, element: ElementHandle) -> Result<String, PageError> {
        for name in ID_ATTRIBUTES {
            if let Some(value) = page.attribute(element, name)? {
                if !value.is_empty() {
                    return Ok(value);
                }
            }
        }
        Ok(self.ids.fallback_id())
    }
}

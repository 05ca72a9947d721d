use feedscrape_core::ElementHandle;
use thiserror::Error;
use url::Url;

pub type ObserverId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("invalid selector {0:?}")]
    InvalidSelector(String),
    #[error("stale element handle {0:?}")]
    StaleHandle(ElementHandle),
    #[error("node {0:?} is not an element")]
    NotAnElement(ElementHandle),
    #[error("node {0:?} has no parent")]
    NoParent(ElementHandle),
    #[error("document has no body")]
    NoBody,
    #[error("page script failed: {0}")]
    Script(String),
}

/// Child-list observation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObserveOptions {
    /// Also report mutations of every descendant of the target.
    pub subtree: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub observer: ObserverId,
    pub target: ElementHandle,
    pub added_nodes: usize,
    pub removed_nodes: usize,
}

/// Where a detached node came from, so it can be put back in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detached {
    pub node: ElementHandle,
    pub parent: ElementHandle,
    pub next_sibling: Option<ElementHandle>,
}

/// Everything the scraper needs from a live page.
///
/// Queries only ever see nodes attached to the document. Mutations performed
/// through this interface (clicks, detach/reattach, scrolling) are reported to
/// matching observers through [`Page::take_mutations`].
pub trait Page {
    /// All elements matching `selector`, in document order. With a scope, only
    /// descendants of that element are considered.
    fn query_all(
        &self,
        scope: Option<ElementHandle>,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, PageError>;

    fn query_first(
        &self,
        scope: Option<ElementHandle>,
        selector: &str,
    ) -> Result<Option<ElementHandle>, PageError> {
        Ok(self.query_all(scope, selector)?.into_iter().next())
    }

    fn attribute(&self, element: ElementHandle, name: &str) -> Result<Option<String>, PageError>;

    /// Concatenated text of the element and all its descendants.
    fn text_content(&self, element: ElementHandle) -> Result<String, PageError>;

    fn click(&mut self, element: ElementHandle) -> Result<(), PageError>;

    fn detach(&mut self, element: ElementHandle) -> Result<Detached, PageError>;

    /// Puts a detached node back before its former next sibling, or last in its
    /// former parent when that sibling moved away.
    fn reattach(&mut self, detached: &Detached) -> Result<(), PageError>;

    fn is_attached(&self, element: ElementHandle) -> bool;

    fn scroll_to_bottom(&mut self) -> Result<(), PageError>;

    fn body(&self) -> Result<ElementHandle, PageError>;

    fn observe(
        &mut self,
        target: ElementHandle,
        options: ObserveOptions,
    ) -> Result<ObserverId, PageError>;

    /// Drops the subscription together with any records not yet taken.
    fn disconnect(&mut self, observer: ObserverId);

    fn take_mutations(&mut self) -> Vec<MutationRecord>;

    fn location(&self) -> Option<&Url>;
}

/// Whether `url` points at a Facebook group feed.
pub fn is_group_feed_url(url: &Url) -> bool {
    url.scheme() == "https"
        && url.host_str() == Some("www.facebook.com")
        && url.path().starts_with("/groups/")
}

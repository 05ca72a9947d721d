use feedscrape_core::ElementHandle;
use scrape_logging::scrape_debug;

use crate::page::{MutationRecord, ObserveOptions, ObserverId, Page, PageError};

pub const DEFAULT_FEED_SELECTORS: &[&str] = &[r#"div[role="feed"]"#, "div.x1lliihq"];

/// What the observer ended up watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserveScope {
    /// The feed container and everything below it.
    Feed(ElementHandle),
    /// Direct children of the body only.
    Body(ElementHandle),
}

/// Watches the feed for added nodes so new posts get scanned.
#[derive(Debug, Clone)]
pub struct ChangeObserver {
    feed_selectors: Vec<String>,
    subscription: Option<(ObserverId, ObserveScope)>,
}

impl Default for ChangeObserver {
    fn default() -> Self {
        Self {
            feed_selectors: DEFAULT_FEED_SELECTORS.iter().map(|s| s.to_string()).collect(),
            subscription: None,
        }
    }
}

impl ChangeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)subscribes. Falls back to the body when no feed container exists.
    pub fn start(&mut self, page: &mut dyn Page) -> Result<ObserveScope, PageError> {
        self.stop(page);
        let feed = page.query_first(None, &self.feed_selectors.join(", "))?;
        let (scope, options) = match feed {
            Some(container) => (ObserveScope::Feed(container), ObserveOptions { subtree: true }),
            None => {
                scrape_debug!("Could not find feed container, observing body instead");
                (ObserveScope::Body(page.body()?), ObserveOptions { subtree: false })
            }
        };
        let target = match scope {
            ObserveScope::Feed(handle) | ObserveScope::Body(handle) => handle,
        };
        let id = page.observe(target, options)?;
        self.subscription = Some((id, scope));
        Ok(scope)
    }

    pub fn stop(&mut self, page: &mut dyn Page) {
        if let Some((id, _)) = self.subscription.take() {
            page.disconnect(id);
        }
    }

    pub fn scope(&self) -> Option<ObserveScope> {
        self.subscription.map(|(_, scope)| scope)
    }

    pub fn is_observing(&self) -> bool {
        self.subscription.is_some()
    }

    /// Nodes added according to this observer's records; other records are ignored.
    pub fn added_nodes(&self, records: &[MutationRecord]) -> usize {
        let Some((id, _)) = self.subscription else {
            return 0;
        };
        records
            .iter()
            .filter(|record| record.observer == id)
            .map(|record| record.added_nodes)
            .sum()
    }
}

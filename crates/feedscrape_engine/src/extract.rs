use std::time::Duration;

use feedscrape_core::{ElementHandle, ExtractOutcome, PostRef, ScrapedPost, SkipReason};
use scrape_logging::{scrape_debug, scrape_error, scrape_warn};
use thiserror::Error;

use crate::clock::Clock;
use crate::page::{Detached, Page, PageError};

/// Author placeholder; a post that keeps it is never collected.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

const NAME_SELECTORS: &[&str] = &[
    r#"div[data-ad-rendering-role="profile_name"] strong"#,
    r#"a[role="link"] strong"#,
    r#"h3 a[role="link"]"#,
];

const TEXT_SELECTORS: &[&str] = &[
    r#"[data-ad-comet-preview="message"]"#,
    r#"div[dir="auto"]"#,
    "span.x193iq5w",
];

const EXPAND_SELECTORS: &[&str] = &[
    r#"div[role="button"]"#,
    r#"span[role="button"]"#,
    "div.x1i10hfl",
];

const EXPAND_LABEL: &str = "see more";

const HEADING_SELECTOR: &str = "h3";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("skipped: {0}")]
    Skipped(SkipReason),
    #[error(transparent)]
    Page(#[from] PageError),
}

impl ExtractError {
    pub fn into_outcome(self) -> ExtractOutcome {
        match self {
            ExtractError::Skipped(reason) => ExtractOutcome::Skipped(reason),
            ExtractError::Page(err) => ExtractOutcome::Failed(err.to_string()),
        }
    }
}

/// One way of resolving a field of a post.
pub trait FieldStrategy {
    fn describe(&self) -> &str;

    /// `Ok(None)` when this strategy finds nothing usable.
    fn resolve(&self, page: &dyn Page, post: ElementHandle) -> Result<Option<String>, PageError>;
}

/// Trimmed text of the first descendant matching a selector.
#[derive(Debug, Clone)]
pub struct FirstMatchText {
    selector: String,
    keep_empty: bool,
}

impl FirstMatchText {
    /// An element with blank text counts as no match.
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            keep_empty: false,
        }
    }

    /// The first matching element wins even when its text is blank.
    pub fn keeping_empty(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            keep_empty: true,
        }
    }
}

impl FieldStrategy for FirstMatchText {
    fn describe(&self) -> &str {
        &self.selector
    }

    fn resolve(&self, page: &dyn Page, post: ElementHandle) -> Result<Option<String>, PageError> {
        let Some(element) = page.query_first(Some(post), &self.selector)? else {
            return Ok(None);
        };
        let text = page.text_content(element)?.trim().to_string();
        Ok(Some(text).filter(|t| self.keep_empty || !t.is_empty()))
    }
}

/// Finds "see more" style controls inside a post.
#[derive(Debug, Clone)]
pub struct ExpandControls {
    selectors: Vec<String>,
    label: String,
}

impl Default for ExpandControls {
    fn default() -> Self {
        Self {
            selectors: EXPAND_SELECTORS.iter().map(|s| s.to_string()).collect(),
            label: EXPAND_LABEL.to_string(),
        }
    }
}

impl ExpandControls {
    /// Union of all selector matches whose text contains the label, ignoring case.
    /// A match that merely wraps another match is left out.
    pub fn find(
        &self,
        page: &dyn Page,
        post: ElementHandle,
    ) -> Result<Vec<ElementHandle>, PageError> {
        let mut found: Vec<ElementHandle> = Vec::new();
        for selector in &self.selectors {
            for control in page.query_all(Some(post), selector)? {
                if found.contains(&control) {
                    continue;
                }
                if page
                    .text_content(control)?
                    .to_lowercase()
                    .contains(&self.label)
                {
                    found.push(control);
                }
            }
        }

        let mut innermost = Vec::with_capacity(found.len());
        for control in &found {
            let inner = page.query_all(Some(*control), "*")?;
            if !found.iter().any(|other| inner.contains(other)) {
                innermost.push(*control);
            }
        }
        Ok(innermost)
    }

    /// Clicks every control, pausing `settle` after each successful click.
    /// A failing click is logged and the rest are still attempted.
    pub fn expand(
        &self,
        page: &mut dyn Page,
        clock: &mut dyn Clock,
        post: ElementHandle,
        settle: Duration,
    ) -> Result<usize, PageError> {
        let controls = self.find(page, post)?;
        scrape_debug!("Found {} \"See more\" buttons", controls.len());
        for control in &controls {
            match page.click(*control) {
                Ok(()) => clock.sleep(settle),
                Err(err) => scrape_error!("Error clicking \"See more\" button: {err}"),
            }
        }
        Ok(controls.len())
    }
}

/// Keeps a node out of the document while alive and puts it back on drop.
struct DetachGuard<'p> {
    page: &'p mut dyn Page,
    detached: Option<Detached>,
}

impl<'p> DetachGuard<'p> {
    fn detach(page: &'p mut dyn Page, element: ElementHandle) -> Result<Self, PageError> {
        let detached = page.detach(element)?;
        Ok(Self {
            page,
            detached: Some(detached),
        })
    }

    fn page(&self) -> &dyn Page {
        &*self.page
    }

    fn restore(mut self) -> Result<(), PageError> {
        match self.detached.take() {
            Some(detached) => self.page.reattach(&detached),
            None => Ok(()),
        }
    }
}

impl Drop for DetachGuard<'_> {
    fn drop(&mut self) {
        if let Some(detached) = self.detached.take() {
            if let Err(err) = self.page.reattach(&detached) {
                scrape_warn!("Failed to reattach {:?}: {err}", detached.node);
            }
        }
    }
}

/// Heuristic author/body extraction for one post element.
pub struct PostExtractor {
    expand: ExpandControls,
    name_strategies: Vec<Box<dyn FieldStrategy>>,
    text_strategies: Vec<Box<dyn FieldStrategy>>,
    heading_selector: String,
    settle: Duration,
}

impl Default for PostExtractor {
    fn default() -> Self {
        Self::new(Duration::from_millis(200))
    }
}

impl PostExtractor {
    pub fn new(settle: Duration) -> Self {
        Self {
            expand: ExpandControls::default(),
            name_strategies: boxed(NAME_SELECTORS, |s| FirstMatchText::new(s)),
            text_strategies: boxed(TEXT_SELECTORS, |s| FirstMatchText::keeping_empty(s)),
            heading_selector: HEADING_SELECTOR.to_string(),
            settle,
        }
    }

    /// Appends a name lookup after the built-in ones.
    pub fn with_name_strategy(mut self, strategy: impl FieldStrategy + 'static) -> Self {
        self.name_strategies.push(Box::new(strategy));
        self
    }

    /// Appends a body lookup after the built-in ones, before the whole-post fallback.
    /// The first lookup that finds an element decides the body, blank or not.
    pub fn with_text_strategy(mut self, strategy: impl FieldStrategy + 'static) -> Self {
        self.text_strategies.push(Box::new(strategy));
        self
    }

    pub fn settle(&self) -> Duration {
        self.settle
    }

    pub fn extract(
        &self,
        page: &mut dyn Page,
        clock: &mut dyn Clock,
        post: &PostRef,
    ) -> Result<ScrapedPost, ExtractError> {
        let expanded = self.expand.expand(page, clock, post.element, self.settle)?;
        scrape_debug!("Expanded {expanded} \"See more\" buttons in post");

        let name = first_resolved(&self.name_strategies, page, post.element)?
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
        scrape_debug!("Found author: {name}");

        let text = match first_resolved(&self.text_strategies, page, post.element)? {
            Some(text) => text,
            None => self.text_without_heading(page, post.element)?,
        };
        scrape_debug!(
            "Found text ({} chars): {}...",
            text.chars().count(),
            text.chars().take(50).collect::<String>()
        );

        let reason = match (name == UNKNOWN_AUTHOR, text.is_empty()) {
            (false, false) => return Ok(ScrapedPost::new(post.id.clone(), name, text)),
            (true, false) => SkipReason::UnknownAuthor,
            (false, true) => SkipReason::EmptyText,
            (true, true) => SkipReason::UnknownAuthorAndEmptyText,
        };
        Err(ExtractError::Skipped(reason))
    }

    /// Whole-post text with the heading region taken out for the read.
    fn text_without_heading(
        &self,
        page: &mut dyn Page,
        post: ElementHandle,
    ) -> Result<String, PageError> {
        let Some(heading) = page.query_first(Some(post), &self.heading_selector)? else {
            return Ok(page.text_content(post)?.trim().to_string());
        };
        let guard = DetachGuard::detach(page, heading)?;
        let text = guard.page().text_content(post);
        guard.restore()?;
        Ok(text?.trim().to_string())
    }
}

fn boxed(
    selectors: &[&str],
    strategy: fn(&str) -> FirstMatchText,
) -> Vec<Box<dyn FieldStrategy>> {
    selectors
        .iter()
        .map(|s| Box::new(strategy(*s)) as Box<dyn FieldStrategy>)
        .collect()
}

fn first_resolved(
    strategies: &[Box<dyn FieldStrategy>],
    page: &dyn Page,
    post: ElementHandle,
) -> Result<Option<String>, PageError> {
    for strategy in strategies {
        if let Some(value) = strategy.resolve(page, post)? {
            scrape_debug!("Resolved with {}", strategy.describe());
            return Ok(Some(value));
        }
    }
    Ok(None)
}

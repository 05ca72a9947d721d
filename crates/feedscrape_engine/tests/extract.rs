mod common;

use std::time::Duration;

use common::{anonymous_post, feed, init_logging, post};
use feedscrape_core::{ElementHandle, PostRef, SkipReason};
use feedscrape_engine::{
    Clock, Detached, ExtractError, FirstMatchText, HtmlPage, ManualClock, MutationRecord,
    ObserveOptions, ObserverId, Page, PageError, PostExtractor, UNKNOWN_AUTHOR,
};
use pretty_assertions::assert_eq;
use url::Url;

const SETTLE: Duration = Duration::from_millis(200);

fn first_post(page: &HtmlPage) -> PostRef {
    let element = page
        .query_first(None, r#"div[role="article"]"#)
        .unwrap()
        .expect("fixture has a post");
    let id = page.attribute(element, "id").unwrap().unwrap_or_default();
    PostRef::new(id, element)
}

#[test]
fn resolves_author_and_text_from_heading_link_and_message() {
    init_logging();
    let mut page = HtmlPage::parse(&feed(&[post("p1", "Ada Lovelace", "Notes on the engine")]));
    let target = first_post(&page);
    let mut clock = ManualClock::new();

    let scraped = PostExtractor::new(SETTLE)
        .extract(&mut page, &mut clock, &target)
        .unwrap();

    assert_eq!(scraped.id(), "p1");
    assert_eq!(scraped.name(), "Ada Lovelace");
    assert_eq!(scraped.text(), "Notes on the engine");
    assert_eq!(clock.now(), Duration::ZERO);
}

#[test]
fn earlier_name_strategy_wins() {
    init_logging();
    let mut page = HtmlPage::parse(
        r#"<body><div role="article" id="p1">
            <div data-ad-rendering-role="profile_name"><strong>Profile Name</strong></div>
            <h3><a role="link">Heading Name</a></h3>
            <div data-ad-comet-preview="message">Preview text</div>
            <div dir="auto">Other text</div>
        </div></body>"#,
    );
    let target = first_post(&page);

    let scraped = PostExtractor::default()
        .extract(&mut page, &mut ManualClock::new(), &target)
        .unwrap();

    assert_eq!(scraped.name(), "Profile Name");
    assert_eq!(scraped.text(), "Preview text");
}

#[test]
fn custom_strategies_run_after_built_in_ones() {
    init_logging();
    let mut page = HtmlPage::parse(
        r#"<body><div role="article" id="p1"><span class="author">Custom</span><p class="body">Custom body</p></div></body>"#,
    );
    let target = first_post(&page);
    let extractor = PostExtractor::default()
        .with_name_strategy(FirstMatchText::new("span.author"))
        .with_text_strategy(FirstMatchText::new("p.body"));

    let scraped = extractor
        .extract(&mut page, &mut ManualClock::new(), &target)
        .unwrap();

    assert_eq!(scraped.name(), "Custom");
    assert_eq!(scraped.text(), "Custom body");
}

#[test]
fn see_more_controls_are_clicked_with_settle_time() {
    init_logging();
    let mut page = HtmlPage::parse(
        r#"<body><div role="article" id="p1">
            <h3><a role="link">Linus</a></h3>
            <div data-ad-comet-preview="message">Long story<div role="button">See more</div></div>
            <span role="button">SEE MORE</span>
            <div role="button">Like</div>
        </div></body>"#,
    );
    let target = first_post(&page);
    let mut clock = ManualClock::new();

    let scraped = PostExtractor::new(SETTLE)
        .extract(&mut page, &mut clock, &target)
        .unwrap();

    assert_eq!(page.clicks().len(), 2);
    assert_eq!(clock.now(), SETTLE * 2);
    assert_eq!(scraped.text(), "Long story");
}

#[test]
fn wrapped_see_more_clicks_only_the_button() {
    init_logging();
    let mut page = HtmlPage::parse(
        r#"<body><div role="article" id="p1">
            <h3><a role="link">Ada</a></h3>
            <div class="x1i10hfl"><div data-ad-comet-preview="message">Long story here <div role="button">See more</div></div></div>
        </div></body>"#,
    );
    let target = first_post(&page);
    let button = page
        .query_first(Some(target.element), r#"div[role="button"]"#)
        .unwrap()
        .unwrap();
    let wrapper = page
        .query_first(Some(target.element), "div.x1i10hfl")
        .unwrap()
        .unwrap();
    let mut clock = ManualClock::new();

    let scraped = PostExtractor::new(SETTLE)
        .extract(&mut page, &mut clock, &target)
        .unwrap();

    assert_eq!(page.clicks(), &[button]);
    assert!(page.is_attached(wrapper));
    assert_eq!(scraped.text(), "Long story here");
    assert_eq!(clock.now(), SETTLE);
}

#[test]
fn empty_message_element_is_not_replaced_by_other_text() {
    init_logging();
    let mut page = HtmlPage::parse(
        r#"<body><div role="article" id="p1"><h3><a role="link">Ada</a></h3><div dir="auto"></div><p>Sponsored footer</p></div></body>"#,
    );
    let target = first_post(&page);

    let err = PostExtractor::default()
        .extract(&mut page, &mut ManualClock::new(), &target)
        .unwrap_err();

    assert_eq!(err, ExtractError::Skipped(SkipReason::EmptyText));
}

#[test]
fn blank_name_match_falls_through_to_the_next_lookup() {
    init_logging();
    let mut page = HtmlPage::parse(
        r#"<body><div role="article" id="p1">
            <div data-ad-rendering-role="profile_name"><strong> </strong></div>
            <h3><a role="link">Grace</a></h3>
            <div dir="auto">Hello</div>
        </div></body>"#,
    );
    let target = first_post(&page);

    let scraped = PostExtractor::default()
        .extract(&mut page, &mut ManualClock::new(), &target)
        .unwrap();

    assert_eq!(scraped.name(), "Grace");
}

#[test]
fn falls_back_to_post_text_without_heading() {
    init_logging();
    let mut page = HtmlPage::parse(
        r#"<body><div role="article" id="p1"><h3><a role="link">Grace</a></h3><p>  Paragraph body </p></div></body>"#,
    );
    let target = first_post(&page);
    let before = page.html();

    let scraped = PostExtractor::default()
        .extract(&mut page, &mut ManualClock::new(), &target)
        .unwrap();

    assert_eq!(scraped.name(), "Grace");
    assert_eq!(scraped.text(), "Paragraph body");
    // The heading is back where it was.
    assert_eq!(page.html(), before);
}

#[test]
fn unknown_author_is_skipped() {
    init_logging();
    let mut page = HtmlPage::parse(&feed(&[anonymous_post("p1", "Who wrote this?")]));
    let target = first_post(&page);

    let err = PostExtractor::default()
        .extract(&mut page, &mut ManualClock::new(), &target)
        .unwrap_err();

    assert_eq!(err, ExtractError::Skipped(SkipReason::UnknownAuthor));
}

#[test]
fn empty_post_is_skipped_for_both_reasons() {
    init_logging();
    let mut page = HtmlPage::parse(r#"<body><div role="article" id="p1"></div></body>"#);
    let target = first_post(&page);

    let err = PostExtractor::default()
        .extract(&mut page, &mut ManualClock::new(), &target)
        .unwrap_err();

    assert_eq!(err, ExtractError::Skipped(SkipReason::UnknownAuthorAndEmptyText));
    assert_eq!(UNKNOWN_AUTHOR, "Unknown");
}

/// Delegates to an [`HtmlPage`] but fails whole-post reads.
struct FailingPostText {
    inner: HtmlPage,
    post: ElementHandle,
}

impl Page for FailingPostText {
    fn query_all(
        &self,
        scope: Option<ElementHandle>,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, PageError> {
        self.inner.query_all(scope, selector)
    }

    fn attribute(&self, element: ElementHandle, name: &str) -> Result<Option<String>, PageError> {
        self.inner.attribute(element, name)
    }

    fn text_content(&self, element: ElementHandle) -> Result<String, PageError> {
        if element == self.post {
            return Err(PageError::Script("read interrupted".to_string()));
        }
        self.inner.text_content(element)
    }

    fn click(&mut self, element: ElementHandle) -> Result<(), PageError> {
        self.inner.click(element)
    }

    fn detach(&mut self, element: ElementHandle) -> Result<Detached, PageError> {
        self.inner.detach(element)
    }

    fn reattach(&mut self, detached: &Detached) -> Result<(), PageError> {
        self.inner.reattach(detached)
    }

    fn is_attached(&self, element: ElementHandle) -> bool {
        self.inner.is_attached(element)
    }

    fn scroll_to_bottom(&mut self) -> Result<(), PageError> {
        self.inner.scroll_to_bottom()
    }

    fn body(&self) -> Result<ElementHandle, PageError> {
        self.inner.body()
    }

    fn observe(
        &mut self,
        target: ElementHandle,
        options: ObserveOptions,
    ) -> Result<ObserverId, PageError> {
        self.inner.observe(target, options)
    }

    fn disconnect(&mut self, observer: ObserverId) {
        self.inner.disconnect(observer)
    }

    fn take_mutations(&mut self) -> Vec<MutationRecord> {
        self.inner.take_mutations()
    }

    fn location(&self) -> Option<&Url> {
        self.inner.location()
    }
}

#[test]
fn heading_is_reattached_when_the_read_fails() {
    init_logging();
    let inner = HtmlPage::parse(
        r#"<body><div role="article" id="p1"><h3><a role="link">Grace</a></h3><p>Body</p></div></body>"#,
    );
    let target = first_post(&inner);
    let heading = inner.query_first(Some(target.element), "h3").unwrap().unwrap();
    let before = inner.html();
    let mut page = FailingPostText {
        inner,
        post: target.element,
    };

    let err = PostExtractor::default()
        .extract(&mut page, &mut ManualClock::new(), &target)
        .unwrap_err();

    assert!(matches!(err, ExtractError::Page(PageError::Script(_))));
    assert!(page.is_attached(heading));
    assert_eq!(page.inner.html(), before);
}

#[test]
fn page_errors_become_failed_outcomes() {
    let outcome = ExtractError::Page(PageError::NoBody).into_outcome();
    assert_eq!(
        outcome,
        feedscrape_core::ExtractOutcome::Failed("document has no body".to_string())
    );
}

mod common;

use common::{feed, init_logging, post};
use feedscrape_engine::{
    ChangeObserver, DiscoveryScanner, HtmlPage, ObserveScope, Page, SequentialIds,
};
use pretty_assertions::assert_eq;

fn ids(scanner: &mut DiscoveryScanner, page: &HtmlPage) -> Vec<String> {
    scanner
        .discover(page)
        .unwrap()
        .into_iter()
        .map(|post| post.id)
        .collect()
}

#[test]
fn ids_come_from_attributes_in_document_order() {
    init_logging();
    let page = HtmlPage::parse(
        r#"<body>
            <div role="article" id="first"></div>
            <div class="x1yztbdb" aria-labelledby="second"></div>
            <div role="article" id="" aria-labelledby="third"></div>
        </body>"#,
    );
    let mut scanner = DiscoveryScanner::with_id_source(SequentialIds::default());

    assert_eq!(ids(&mut scanner, &page), ["first", "second", "third"]);
}

#[test]
fn elements_matching_several_selectors_are_reported_once() {
    init_logging();
    let page =
        HtmlPage::parse(r#"<body><div role="article" class="x1yztbdb" id="p1"></div></body>"#);
    let mut scanner = DiscoveryScanner::with_id_source(SequentialIds::default());

    assert_eq!(ids(&mut scanner, &page), ["p1"]);
}

#[test]
fn extra_selectors_join_the_union() {
    init_logging();
    let page = HtmlPage::parse(r#"<body><section class="story" id="s1"></section></body>"#);
    let mut scanner =
        DiscoveryScanner::with_id_source(SequentialIds::default()).with_selector("section.story");

    assert_eq!(ids(&mut scanner, &page), ["s1"]);
}

#[test]
fn scanning_twice_yields_the_same_ids() {
    init_logging();
    let page = HtmlPage::parse(&feed(&[post("p1", "Ada", "one"), post("p2", "Grace", "two")]));
    let mut scanner = DiscoveryScanner::new();

    assert_eq!(ids(&mut scanner, &page), ids(&mut scanner, &page));
}

#[test]
fn posts_without_ids_get_a_new_id_per_scan() {
    init_logging();
    let page = HtmlPage::parse(r#"<body><div class="x1yztbdb">anonymous</div></body>"#);
    let mut scanner = DiscoveryScanner::with_id_source(SequentialIds::default());

    // Fallback ids are not derived from the element, so dedup cannot match them.
    assert_eq!(ids(&mut scanner, &page), ["post_seq_1"]);
    assert_eq!(ids(&mut scanner, &page), ["post_seq_2"]);
}

#[test]
fn observer_prefers_the_feed_container() {
    init_logging();
    let mut page = HtmlPage::parse(&feed(&[]));
    let container = page.query_first(None, r#"div[role="feed"]"#).unwrap().unwrap();
    let mut observer = ChangeObserver::new();

    assert_eq!(observer.start(&mut page).unwrap(), ObserveScope::Feed(container));
    assert!(observer.is_observing());
}

#[test]
fn observer_falls_back_to_body_children() {
    init_logging();
    let mut page = HtmlPage::parse(r#"<body><main><div id="deep"></div></main></body>"#);
    let body = page.body().unwrap();
    let main = page.query_first(None, "main").unwrap().unwrap();
    let deep = page.query_first(None, "#deep").unwrap().unwrap();
    let mut observer = ChangeObserver::new();

    assert_eq!(observer.start(&mut page).unwrap(), ObserveScope::Body(body));

    // Only direct children of the body count.
    let detached = page.detach(deep).unwrap();
    page.reattach(&detached).unwrap();
    assert_eq!(observer.added_nodes(&page.take_mutations()), 0);

    let detached = page.detach(main).unwrap();
    page.reattach(&detached).unwrap();
    assert_eq!(observer.added_nodes(&page.take_mutations()), 1);
}

#[test]
fn stopped_observer_reports_nothing() {
    init_logging();
    let mut page = HtmlPage::parse(&feed(&[])).with_feed_batches([post("p1", "Ada", "one")]);
    let mut observer = ChangeObserver::new();
    observer.start(&mut page).unwrap();

    observer.stop(&mut page);
    page.scroll_to_bottom().unwrap();

    assert!(!observer.is_observing());
    assert_eq!(observer.scope(), None);
    assert!(page.take_mutations().is_empty());
}

#[test]
fn restarting_replaces_the_subscription() {
    init_logging();
    let mut page = HtmlPage::parse(&feed(&[])).with_feed_batches([post("p1", "Ada", "one")]);
    let mut observer = ChangeObserver::new();
    observer.start(&mut page).unwrap();
    observer.start(&mut page).unwrap();

    page.scroll_to_bottom().unwrap();

    let records = page.take_mutations();
    assert_eq!(records.len(), 1);
    assert_eq!(observer.added_nodes(&records), 1);
}

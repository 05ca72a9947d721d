#![allow(dead_code)]

use std::sync::Once;

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(scrape_logging::initialize_for_tests);
}

pub fn post(id: &str, author: &str, text: &str) -> String {
    format!(
        r#"<div role="article" id="{id}"><h3><a role="link" href="/u/{id}">{author}</a></h3><div dir="auto">{text}</div></div>"#
    )
}

pub fn anonymous_post(id: &str, text: &str) -> String {
    format!(r#"<div role="article" id="{id}"><div dir="auto">{text}</div></div>"#)
}

pub fn feed(posts: &[String]) -> String {
    format!(
        r#"<html><head><title>Group</title></head><body><div role="banner">Top</div><div role="feed">{}</div></body></html>"#,
        posts.concat()
    )
}

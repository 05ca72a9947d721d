use feedscrape_core::{ControlCommand, Msg, StatusMessage};
use pretty_assertions::assert_eq;

#[test]
fn control_commands_parse_from_ui_messages() {
    let start: ControlCommand =
        serde_json::from_str(r#"{"action":"startScraping","maxPosts":25}"#).unwrap();
    assert_eq!(
        start,
        ControlCommand::StartScraping {
            max_posts: Some(25)
        }
    );
    assert_eq!(Msg::from(start), Msg::StartRequested { max_posts: 25 });

    let stop: ControlCommand = serde_json::from_str(r#"{"action":"stopScraping"}"#).unwrap();
    assert_eq!(Msg::from(stop), Msg::StopRequested);

    let download: ControlCommand = serde_json::from_str(r#"{"action":"downloadCSV"}"#).unwrap();
    assert_eq!(Msg::from(download), Msg::DownloadRequested);
}

#[test]
fn start_without_max_posts_uses_default_target() {
    let start: ControlCommand = serde_json::from_str(r#"{"action":"startScraping"}"#).unwrap();
    assert_eq!(Msg::from(start), Msg::StartRequested { max_posts: 0 });
}

#[test]
fn unknown_action_is_rejected() {
    assert!(serde_json::from_str::<ControlCommand>(r#"{"action":"reload"}"#).is_err());
}

#[test]
fn status_update_serializes_with_action_tag() {
    let json = serde_json::to_string(&StatusMessage::new("Scraping started. Target: 5 posts."))
        .unwrap();
    assert_eq!(
        json,
        r#"{"action":"updateStatus","status":"Scraping started. Target: 5 posts."}"#
    );
}

mod common;

use common::{BROWSER_UA, CONTACT_EMAIL, LINKEDIN_PREVIEW_IP, SLACK_UA, TestApp};
use linkup::application::services::TrackingOutcome;
use linkup::domain::classifier::RequestSignals;
use linkup::domain::visit::Visit;
use linkup::domain::visit_worker::run_visit_worker;
use std::sync::Arc;
use tokio::sync::mpsc;

const LAST_NOTICE: &str = "last alert you'll receive for this link";

fn human(path: &str) -> Visit {
    Visit::new(
        path,
        RequestSignals::new(vec!["203.0.113.5".to_string()], Some(BROWSER_UA.to_string())),
    )
}

fn setup(max_alerts: u32, tag: Option<&str>) -> TestApp {
    let app = TestApp::new(max_alerts);
    app.store.add_user(1, "owner@example.com");
    app.store.add_link("abc", "https://example.com/article", 1, tag);
    app
}

#[tokio::test]
async fn test_four_visits_alert_three_times() {
    let app = setup(3, None);

    let mut outcomes = Vec::new();
    for _ in 0..4 {
        outcomes.push(app.tracker.track(human("abc")).await);
    }

    assert_eq!(
        outcomes,
        vec![
            TrackingOutcome::Alerted { clicks: 1, last: false },
            TrackingOutcome::Alerted { clicks: 2, last: false },
            TrackingOutcome::Alerted { clicks: 3, last: true },
            TrackingOutcome::Counted { clicks: 4 },
        ]
    );
    assert_eq!(app.store.clicks(1), 4);

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 3);
    assert!(sent.iter().all(|m| m.recipient == "owner@example.com"));
    assert!(sent[0].body.contains("1st time"));
    assert!(sent[1].body.contains("2nd time"));
    assert!(sent[2].body.contains("3rd time"));
    assert!(!sent[0].body.contains(LAST_NOTICE));
    assert!(!sent[1].body.contains(LAST_NOTICE));
    assert!(sent[2].body.contains(LAST_NOTICE));
    assert!(sent[2].body.contains(CONTACT_EMAIL));
    assert!(sent[0].body.contains("https://lnk.test/redirect/abc"));
}

#[tokio::test]
async fn test_tagged_link_alert_names_tag() {
    let app = setup(3, Some("spring launch"));

    app.tracker.track(human("abc")).await;

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains("tagged 'spring launch'"));
}

#[tokio::test]
async fn test_zero_budget_counts_without_alerts() {
    let app = setup(0, None);

    for _ in 0..3 {
        app.tracker.track(human("abc")).await;
    }

    assert_eq!(app.store.clicks(1), 3);
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_automated_visits_touch_nothing_after_lookup() {
    let app = setup(3, None);

    let bot = Visit::new("abc", RequestSignals::new(vec![], Some(SLACK_UA.to_string())));
    let preview = Visit::new(
        "abc",
        RequestSignals::new(vec![LINKEDIN_PREVIEW_IP.to_string()], Some(BROWSER_UA.to_string())),
    );

    assert_eq!(app.tracker.track(bot).await, TrackingOutcome::SkippedAutomated);
    assert_eq!(app.tracker.track(preview).await, TrackingOutcome::SkippedAutomated);

    assert_eq!(
        app.store.events(),
        vec!["fetch_record:abc".to_string(), "fetch_record:abc".to_string()]
    );
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_vanished_link_is_dropped() {
    let app = setup(3, None);

    assert_eq!(
        app.tracker.track(human("gone")).await,
        TrackingOutcome::RecordMissing
    );
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_failed_alert_keeps_click() {
    let app = setup(3, None);
    app.notifier.set_failing(true);

    assert_eq!(
        app.tracker.track(human("abc")).await,
        TrackingOutcome::AlertFailed { clicks: 1 }
    );
    assert_eq!(app.store.clicks(1), 1);

    // The failed alert is not retried; the next click gets the next alert.
    app.notifier.set_failing(false);
    assert_eq!(
        app.tracker.track(human("abc")).await,
        TrackingOutcome::Alerted { clicks: 2, last: false }
    );
}

#[tokio::test]
async fn test_worker_drains_queue_on_close() {
    let app = setup(3, None);
    let (tx, rx) = mpsc::channel(16);

    for _ in 0..5 {
        tx.send(human("abc")).await.unwrap();
    }
    drop(tx);

    run_visit_worker(rx, app.tracker.clone(), 2).await;

    assert_eq!(app.store.clicks(1), 5);
    assert_eq!(app.notifier.sent().len(), 3);
}

#[tokio::test]
async fn test_concurrent_visits_never_duplicate_alerts() {
    let app = setup(3, None);
    let (tx, rx) = mpsc::channel(64);

    let worker = tokio::spawn(run_visit_worker(rx, Arc::clone(&app.tracker), 8));
    for _ in 0..20 {
        tx.send(human("abc")).await.unwrap();
    }
    drop(tx);
    worker.await.unwrap();

    assert_eq!(app.store.clicks(1), 20);

    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent.iter().filter(|m| m.body.contains(LAST_NOTICE)).count(), 1);

    let mut positions: Vec<&str> = sent
        .iter()
        .map(|m| {
            ["1st time", "2nd time", "3rd time"]
                .into_iter()
                .find(|p| m.body.contains(p))
                .unwrap()
        })
        .collect();
    positions.sort();
    assert_eq!(positions, vec!["1st time", "2nd time", "3rd time"]);
}

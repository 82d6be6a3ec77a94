use chrono::Utc;
use uuid::Uuid;

use cakeorder_store::domain::mail::{AccountMail, verification_email};
use cakeorder_store::domain::types::OutboxEvent;
use cakeorder_store::usecase::outbox::{OUTBOX_MAX_ATTEMPTS, OutboxRelay, RelayReport};

use crate::helpers::{MockMailer, MockOutboxRepo, OutboxRow};

fn verification_event() -> OutboxEvent {
    verification_email(
        Uuid::now_v7(),
        &AccountMail {
            email: "baker@example.com".to_owned(),
            name: "Baker".to_owned(),
            link: "https://shop.example.com/account/verify-email?token=abc".to_owned(),
        },
    )
}

#[tokio::test]
async fn should_send_due_event_and_mark_processed() {
    let repo = MockOutboxRepo::new(vec![OutboxRow::due(&verification_event(), 0)]);
    let rows = repo.rows_handle();
    let mailer = MockMailer::default();
    let sent = mailer.sent_handle();

    let report = OutboxRelay {
        outbox: repo,
        mailer,
    }
    .run_once()
    .await
    .unwrap();

    assert_eq!(
        report,
        RelayReport {
            sent: 1,
            ..Default::default()
        }
    );
    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "baker@example.com");
    assert!(sent[0].body.contains("verify-email?token=abc"));
    assert!(rows.lock().unwrap()[0].processed);
}

#[tokio::test]
async fn should_schedule_retry_with_backoff_when_send_fails() {
    let repo = MockOutboxRepo::new(vec![OutboxRow::due(&verification_event(), 2)]);
    let rows = repo.rows_handle();
    let before = Utc::now();

    let report = OutboxRelay {
        outbox: repo,
        mailer: MockMailer {
            fail: true,
            ..Default::default()
        },
    }
    .run_once()
    .await
    .unwrap();

    assert_eq!(report.retried, 1);
    let row = rows.lock().unwrap()[0].clone();
    assert_eq!(row.attempts, 3);
    assert!(!row.processed && !row.failed);
    assert_eq!(row.last_error.as_deref(), Some("smtp unavailable"));
    // Third attempt waits 120s.
    assert!(row.next_attempt_at >= before + chrono::Duration::seconds(119));
}

#[tokio::test]
async fn should_not_pick_up_event_before_next_attempt() {
    let mut row = OutboxRow::due(&verification_event(), 1);
    row.next_attempt_at = Utc::now() + chrono::Duration::minutes(5);
    let mailer = MockMailer::default();
    let sent = mailer.sent_handle();

    let report = OutboxRelay {
        outbox: MockOutboxRepo::new(vec![row]),
        mailer,
    }
    .run_once()
    .await
    .unwrap();

    assert_eq!(report, RelayReport::default());
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_mark_failed_after_max_attempts() {
    let repo = MockOutboxRepo::new(vec![OutboxRow::due(
        &verification_event(),
        OUTBOX_MAX_ATTEMPTS - 1,
    )]);
    let rows = repo.rows_handle();

    let report = OutboxRelay {
        outbox: repo,
        mailer: MockMailer {
            fail: true,
            ..Default::default()
        },
    }
    .run_once()
    .await
    .unwrap();

    assert_eq!(report.failed, 1);
    let row = rows.lock().unwrap()[0].clone();
    assert!(row.failed);
    assert_eq!(row.attempts, OUTBOX_MAX_ATTEMPTS);
}

#[tokio::test]
async fn should_fail_unknown_event_kind_without_sending() {
    let mut event = verification_event();
    event.kind = "newsletter".to_owned();
    let repo = MockOutboxRepo::new(vec![OutboxRow::due(&event, 0)]);
    let rows = repo.rows_handle();
    let mailer = MockMailer::default();
    let sent = mailer.sent_handle();

    let report = OutboxRelay {
        outbox: repo,
        mailer,
    }
    .run_once()
    .await
    .unwrap();

    assert_eq!(report.failed, 1);
    assert!(sent.lock().unwrap().is_empty());
    assert!(rows.lock().unwrap()[0].failed);
}

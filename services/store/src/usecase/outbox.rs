//! Outbox relay: delivers account emails written by request handlers.

use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};

use crate::domain::mail::render;
use crate::domain::repository::{MailSender, OutboxRepository};
use crate::error::StoreError;

/// Events fetched per poll.
pub const OUTBOX_BATCH_SIZE: u64 = 20;

/// Attempts after which an event is marked failed.
pub const OUTBOX_MAX_ATTEMPTS: i32 = 8;

const BASE_BACKOFF_SECS: i64 = 30;
const MAX_BACKOFF_SECS: i64 = 60 * 60;

/// Delay before the next attempt: 30s doubling per attempt, capped at 1h.
pub fn backoff(attempts: i32) -> Duration {
    let exp = attempts.saturating_sub(1).clamp(0, 16) as u32;
    Duration::seconds((BASE_BACKOFF_SECS << exp).min(MAX_BACKOFF_SECS))
}

/// Outcome counts of one relay pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RelayReport {
    pub sent: usize,
    pub retried: usize,
    pub failed: usize,
}

pub struct OutboxRelay<R, M>
where
    R: OutboxRepository,
    M: MailSender,
{
    pub outbox: R,
    pub mailer: M,
}

impl<R, M> OutboxRelay<R, M>
where
    R: OutboxRepository,
    M: MailSender,
{
    /// Deliver every due event once.
    pub async fn run_once(&self) -> Result<RelayReport, StoreError> {
        let mut report = RelayReport::default();
        for event in self.outbox.fetch_due(OUTBOX_BATCH_SIZE).await? {
            let attempts = event.attempts + 1;

            let message = match render(&event.kind, &event.payload) {
                Ok(message) => message,
                Err(e) => {
                    tracing::error!(event_id = %event.id, kind = %event.kind, error = %e, "undeliverable outbox event");
                    self.outbox
                        .mark_failed(event.id, attempts, &e.to_string())
                        .await?;
                    report.failed += 1;
                    continue;
                }
            };

            match self.mailer.send(&message).await {
                Ok(()) => {
                    self.outbox.mark_processed(event.id).await?;
                    tracing::info!(event_id = %event.id, kind = %event.kind, "outbox email sent");
                    report.sent += 1;
                }
                Err(e) if attempts >= OUTBOX_MAX_ATTEMPTS => {
                    let error = format!("{e:#}");
                    tracing::error!(event_id = %event.id, kind = %event.kind, attempts, error = %error, "outbox email gave up");
                    self.outbox.mark_failed(event.id, attempts, &error).await?;
                    report.failed += 1;
                }
                Err(e) => {
                    let error = format!("{e:#}");
                    let next_attempt_at = Utc::now() + backoff(attempts);
                    tracing::warn!(event_id = %event.id, kind = %event.kind, attempts, error = %error, %next_attempt_at, "outbox email failed");
                    self.outbox
                        .schedule_retry(event.id, attempts, &error, next_attempt_at)
                        .await?;
                    report.retried += 1;
                }
            }
        }
        Ok(report)
    }

    /// Poll forever. A failed pass is logged and retried on the next tick.
    pub async fn run(self, poll_interval: StdDuration) {
        tracing::info!(poll_secs = poll_interval.as_secs(), "outbox relay started");
        let mut interval = tokio::time::interval(poll_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            match self.run_once().await {
                Ok(report) if report == RelayReport::default() => {}
                Ok(report) => tracing::debug!(?report, "outbox relay pass"),
                Err(e) => tracing::error!(error = ?e, "outbox relay pass failed"),
            }
        }
    }
}

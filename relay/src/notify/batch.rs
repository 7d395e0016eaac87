//! Fan-out of a webhook batch into independent notifications.

use futures::stream::{self, StreamExt};
use tracing::info;

use super::pushover::{DispatchError, Dispatcher};
use crate::event::DomainEvent;

/// Result of sending one event from a batch.
#[derive(Debug)]
pub struct EventOutcome {
    /// Position of the event in the webhook body
    pub index: usize,
    pub event_type: String,
    pub tailnet: String,
    pub result: Result<(), DispatchError>,
}

/// Per-event outcomes of a batch, in the order the events arrived.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<EventOutcome>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// True when every event was delivered. An empty batch counts as delivered.
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &EventOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }
}

/// Send every event, at most `max_in_flight` at a time.
///
/// A failed send never stops the others; each outcome lands in the report.
pub async fn dispatch_batch(
    dispatcher: &Dispatcher,
    events: &[DomainEvent],
    max_in_flight: usize,
) -> BatchReport {
    let sends: Vec<_> = events
        .iter()
        .enumerate()
        .map(|(index, event)| send_one(dispatcher, index, event))
        .collect();

    let outcomes: Vec<EventOutcome> = stream::iter(sends)
        .buffered(max_in_flight.max(1))
        .collect()
        .await;

    let report = BatchReport { outcomes };

    info!(
        total = report.total(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        "dispatch_batch_complete"
    );

    report
}

async fn send_one(dispatcher: &Dispatcher, index: usize, event: &DomainEvent) -> EventOutcome {
    EventOutcome {
        index,
        event_type: event.event_type.clone(),
        tailnet: event.tailnet.clone(),
        result: dispatcher.dispatch(event).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::mock::MockPushover;
    use crate::notify::PushoverCredentials;
    use reqwest::Client;
    use std::time::Duration;

    fn event(index: usize, message: &str) -> DomainEvent {
        DomainEvent {
            timestamp: format!("t{}", index),
            version: 1,
            event_type: format!("event{}", index),
            tailnet: "acme.ts.net".to_string(),
            message: message.to_string(),
            data: None,
        }
    }

    fn dispatcher(base_url: &str) -> Dispatcher {
        Dispatcher::new(
            Client::new(),
            base_url,
            PushoverCredentials::new("app-token".to_string(), "user-key".to_string()),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_batch_all_succeed() {
        let mock = MockPushover::spawn().await;
        let events: Vec<_> = (0..5).map(|i| event(i, "ok")).collect();

        let report = dispatch_batch(&dispatcher(&mock.base_url), &events, 2).await;

        assert_eq!(report.total(), 5);
        assert_eq!(report.succeeded(), 5);
        assert!(report.all_succeeded());
        assert_eq!(mock.received().len(), 5);
        let indexes: Vec<_> = report.outcomes.iter().map(|o| o.index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_batch_one_failure_does_not_stop_others() {
        let mock = MockPushover::spawn().await;
        let events = vec![event(0, "ok"), event(1, "reject"), event(2, "ok"), event(3, "ok")];

        let report = dispatch_batch(&dispatcher(&mock.base_url), &events, 8).await;

        assert_eq!(mock.received().len(), 4);
        assert_eq!(report.succeeded(), 3);
        assert_eq!(report.failed(), 1);
        assert!(!report.all_succeeded());

        let failed: Vec<_> = report.failures().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].index, 1);
        assert_eq!(failed[0].event_type, "event1");
    }

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn test_batch_future_is_send() {
        let dispatcher = dispatcher("http://127.0.0.1:9");
        let events = vec![event(0, "ok")];
        let send = dispatch_batch(&dispatcher, &events, 2);
        assert_send(&send);
    }

    #[tokio::test]
    async fn test_batch_empty() {
        let report = dispatch_batch(&dispatcher("http://127.0.0.1:9"), &[], 4).await;
        assert_eq!(report.total(), 0);
        assert!(report.all_succeeded());
    }

    #[tokio::test]
    async fn test_batch_zero_limit_still_sends() {
        let mock = MockPushover::spawn().await;
        let events = vec![event(0, "ok")];

        let report = dispatch_batch(&dispatcher(&mock.base_url), &events, 0).await;

        assert!(report.all_succeeded());
        assert_eq!(mock.received().len(), 1);
    }
}

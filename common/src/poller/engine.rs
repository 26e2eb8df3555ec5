// Polling loop that turns successive bucket listings into new-key notifications

use crate::errors::StorageError;
use crate::output::LineSink;
use crate::poller::seen::SeenSet;
use crate::storage::ObjectLister;
use crate::telemetry;
use chrono::{DateTime, Utc};
use futures::{stream, Stream, StreamExt};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// A key observed for the first time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub collection: String,
    pub key: String,
    pub discovered_at: DateTime<Utc>,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}--->{}", self.collection, self.key)
    }
}

/// Polls a lister on a fixed interval and reports each key at most once
pub struct ChangePoller<L> {
    lister: L,
    interval: Duration,
    seen: SeenSet,
    cycles: u64,
}

struct PollState<L> {
    poller: ChangePoller<L>,
    pending: VecDeque<Notification>,
    polled: bool,
    failed: bool,
}

impl<L: ObjectLister> ChangePoller<L> {
    pub fn new(lister: L, interval: Duration) -> Self {
        Self {
            lister,
            interval,
            seen: SeenSet::new(),
            cycles: 0,
        }
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run a single listing and return the keys not seen in earlier cycles
    #[instrument(skip(self), fields(collection = %self.lister.collection(), cycle = self.cycles + 1))]
    pub async fn poll_once(&mut self) -> Result<Vec<Notification>, StorageError> {
        info!("Listing bucket");

        let snapshot = self.lister.list().await?;
        let listed = snapshot.len();
        let discovered_at = Utc::now();
        let collection = self.lister.collection().to_string();

        let notifications: Vec<Notification> = self
            .seen
            .observe(snapshot)
            .into_iter()
            .map(|key| Notification {
                collection: collection.clone(),
                key,
                discovered_at,
            })
            .collect();

        self.cycles += 1;
        telemetry::record_poll_cycle(&collection, notifications.len(), self.seen.len());

        debug!(
            listed = listed,
            discovered = notifications.len(),
            seen = self.seen.len(),
            "Poll cycle complete"
        );

        Ok(notifications)
    }

    /// Lazy, infinite sequence of notifications.
    ///
    /// The first listing happens on the first poll of the stream, later ones
    /// one interval after the previous cycle's notifications were drained.
    /// A listing failure is yielded once and ends the stream.
    pub fn notifications(self) -> impl Stream<Item = Result<Notification, StorageError>> {
        let state = PollState {
            poller: self,
            pending: VecDeque::new(),
            polled: false,
            failed: false,
        };

        stream::unfold(state, |mut state| async move {
            if state.failed {
                return None;
            }

            loop {
                if let Some(notification) = state.pending.pop_front() {
                    return Some((Ok(notification), state));
                }

                if state.polled {
                    tokio::time::sleep(state.poller.interval).await;
                }
                state.polled = true;

                match state.poller.poll_once().await {
                    Ok(batch) => state.pending.extend(batch),
                    Err(e) => {
                        state.failed = true;
                        return Some((Err(e), state));
                    }
                }
            }
        })
    }

    /// Write one line per notification until a listing fails
    pub async fn run<S: LineSink>(self, sink: &mut S) -> Result<(), StorageError> {
        info!(
            collection = %self.lister.collection(),
            interval_seconds = self.interval.as_secs_f64(),
            "Starting change poller"
        );

        let notifications = self.notifications();
        futures::pin_mut!(notifications);

        while let Some(item) = notifications.next().await {
            match item {
                Ok(notification) => {
                    debug!(
                        key = %notification.key,
                        discovered_at = %notification.discovered_at,
                        "New key"
                    );
                    sink.write_line(&notification.to_string())?;
                }
                Err(e) => {
                    error!(error = %e, "Listing failed, stopping poller");
                    return Err(e);
                }
            }
        }

        Ok(())
    }
}

//! Memoized category slug → ID lookup.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::FetchError;

use super::Category;

type Table = Arc<HashMap<String, u64>>;

/// Result of a shared refresh as seen by callers waiting on it.
type Outcome = Option<Result<Table, String>>;

enum Slot {
    Empty,
    Ready { fetched_at: Instant, ids: Table },
    Refreshing(watch::Receiver<Outcome>),
}

enum Role {
    Hit(Table),
    Wait(watch::Receiver<Outcome>),
    Lead(watch::Sender<Outcome>),
}

/// Slug → category ID table, refreshed from the full category listing once it
/// is older than `ttl`. Post content is never held here.
///
/// A zero TTL disables the memo and every lookup re-fetches. Failed refreshes
/// are not memoized.
pub struct CategoryIndex {
    ttl: Duration,
    slot: Mutex<Slot>,
}

impl CategoryIndex {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(Slot::Empty),
        }
    }

    /// Return the current table, calling `refresh` if it is missing or stale.
    ///
    /// With a TTL, concurrent callers share one in-flight refresh and all see
    /// its result, failure included. The lock is never held across an await.
    pub async fn table<F, Fut>(&self, refresh: F) -> Result<Table, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Category>, FetchError>>,
    {
        if self.ttl.is_zero() {
            return refresh().await.map(index);
        }

        let tx = match self.claim() {
            Role::Hit(ids) => return Ok(ids),
            Role::Wait(rx) => return wait(rx).await,
            Role::Lead(tx) => tx,
        };

        let result = refresh().await.map(index);
        *self.lock() = match &result {
            Ok(ids) => Slot::Ready {
                fetched_at: Instant::now(),
                ids: ids.clone(),
            },
            Err(_) => Slot::Empty,
        };
        tx.send_replace(Some(
            result.as_ref().map(Arc::clone).map_err(|e| e.to_string()),
        ));

        result
    }

    /// Drop the memoized table.
    pub fn invalidate(&self) {
        let mut slot = self.lock();
        if matches!(*slot, Slot::Ready { .. }) {
            *slot = Slot::Empty;
        }
    }

    fn claim(&self) -> Role {
        let mut slot = self.lock();
        match &*slot {
            Slot::Ready { fetched_at, ids } if fetched_at.elapsed() < self.ttl => {
                return Role::Hit(ids.clone());
            }
            // A closed channel means the leading caller was dropped mid-refresh.
            Slot::Refreshing(rx) if rx.has_changed().is_ok() => return Role::Wait(rx.clone()),
            _ => {}
        }

        let (tx, rx) = watch::channel(None);
        *slot = Slot::Refreshing(rx);
        Role::Lead(tx)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn index(categories: Vec<Category>) -> Table {
    Arc::new(categories.into_iter().map(|c| (c.slug, c.id)).collect())
}

async fn wait(mut rx: watch::Receiver<Outcome>) -> Result<Table, FetchError> {
    let outcome = match rx.wait_for(Option::is_some).await {
        Ok(outcome) => outcome.clone(),
        Err(_) => None,
    };
    match outcome {
        Some(Ok(ids)) => Ok(ids),
        Some(Err(message)) => Err(FetchError::Upstream(message)),
        None => Err(FetchError::Upstream(
            "category refresh was abandoned".to_string(),
        )),
    }
}

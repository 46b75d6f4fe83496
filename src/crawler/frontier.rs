//! Deduplicating work queue shared by all workers
//!
//! The frontier owns the run's visited set. A URL is accepted at most once
//! per run; it is claimed by exactly one worker and counts as in flight until
//! that worker's [`Claim`] is dropped. The frontier is *drained* when the
//! queue is empty and nothing is in flight, which is the only condition under
//! which workers may conclude that the run is over.

use crate::url::PageUrl;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// How a URL entered the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Produced by site discovery before the crawl started
    Seed,
    /// Found as a link on a fetched page
    Link,
}

/// A queued page URL plus where it came from
#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub url: PageUrl,
    pub origin: Origin,
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<FrontierEntry>,
    seen: HashSet<PageUrl>,
    in_flight: usize,
    closed: bool,
}

/// Result of waiting for work
pub enum Take {
    /// An entry was claimed; it stays in flight until the claim is dropped
    Entry(Claim),
    /// Nothing arrived within the idle timeout, but other entries are still in flight
    Idle,
    /// Queue empty and nothing in flight
    Drained,
    /// The frontier was closed; remaining entries are abandoned
    Closed,
}

impl fmt::Debug for Take {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entry(claim) => write!(f, "Entry({})", claim.url()),
            Self::Idle => write!(f, "Idle"),
            Self::Drained => write!(f, "Drained"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// Exclusive ownership of one frontier entry
///
/// Dropping the claim marks the entry done. Links discovered while holding a
/// claim must be offered before it is dropped, so the frontier can never look
/// drained while a worker still has work to add.
pub struct Claim {
    frontier: Arc<Frontier>,
    entry: FrontierEntry,
}

impl Claim {
    /// The claimed URL
    pub fn url(&self) -> &PageUrl {
        &self.entry.url
    }

    /// How the claimed URL entered the frontier
    pub fn origin(&self) -> Origin {
        self.entry.origin
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.frontier.mark_done();
    }
}

/// Concurrent deduplicating frontier
#[derive(Debug, Default)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    changed: Notify,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> MutexGuard<'_, FrontierState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Offers a URL to the frontier
    ///
    /// # Returns
    ///
    /// `true` if the URL was not known before and has been queued; `false` if
    /// it was already seen (queued, in flight or visited) or the frontier is closed.
    pub fn offer(&self, url: PageUrl, origin: Origin) -> bool {
        {
            let mut state = self.state();
            if state.closed || !state.seen.insert(url.clone()) {
                return false;
            }
            state.queue.push_back(FrontierEntry { url, origin });
        }
        self.changed.notify_waiters();
        true
    }

    /// Waits up to `idle` for an entry to claim
    ///
    /// Returns [`Take::Drained`] as soon as the queue is empty and nothing is
    /// in flight, and [`Take::Idle`] when the timeout elapses while other
    /// workers still hold claims that may produce more work.
    pub async fn take(self: &Arc<Self>, idle: Duration) -> Take {
        let deadline = Instant::now() + idle;

        loop {
            let notified = {
                let mut state = self.state();
                if state.closed {
                    return Take::Closed;
                }
                if let Some(entry) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Take::Entry(Claim {
                        frontier: Arc::clone(self),
                        entry,
                    });
                }
                if state.in_flight == 0 {
                    return Take::Drained;
                }
                // Registered under the lock so no offer or completion is missed
                self.changed.notified()
            };

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Take::Idle;
            }
        }
    }

    fn mark_done(&self) {
        {
            let mut state = self.state();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.changed.notify_waiters();
    }

    /// Stops handing out work; queued entries are abandoned and new offers refused
    pub fn close(&self) {
        {
            let mut state = self.state();
            state.closed = true;
            state.queue.clear();
        }
        self.changed.notify_waiters();
    }

    /// Number of entries waiting to be claimed
    pub fn queued(&self) -> usize {
        self.state().queue.len()
    }

    /// Number of claimed entries still being processed
    pub fn in_flight(&self) -> usize {
        self.state().in_flight
    }

    /// Number of distinct URLs ever accepted
    pub fn seen(&self) -> usize {
        self.state().seen.len()
    }
}

//! Time-bounded cache around the compositor window query.
//!
//! Rapid shortcut repeats trigger several layout computations in quick
//! succession; each one needs a compositor snapshot.  [`WindowInfoCache`]
//! keeps the last result per filter key for a short timeout (100 ms by
//! default) so repeats reuse the snapshot while it is still fresh.

use crate::traits::{Clock, CompositorSource, SystemClock};
use crate::window::{CompositorWindowInfo, WindowId};
use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default freshness window of a cached compositor snapshot.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

/// Cache key: `None` is the unfiltered query, otherwise the set of requested
/// identifiers (order-insensitive).
type FilterKey = Option<BTreeSet<WindowId>>;

#[derive(Debug)]
struct Entry {
    fetched_at: Instant,
    windows: Arc<[CompositorWindowInfo]>,
}

/// Caches [`CompositorSource::compositor_windows`] results.
///
/// The clock is a type parameter so tests can advance time by hand.
#[derive(Debug)]
pub struct WindowInfoCache<C: Clock = SystemClock> {
    clock: C,
    timeout: Duration,
    entries: HashMap<FilterKey, Entry>,
}

impl WindowInfoCache<SystemClock> {
    /// A cache on the system clock with the default timeout.
    pub fn new() -> Self {
        Self::with_clock(SystemClock, DEFAULT_TIMEOUT)
    }
}

impl Default for WindowInfoCache<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> WindowInfoCache<C> {
    pub fn with_clock(clock: C, timeout: Duration) -> Self {
        Self {
            clock,
            timeout,
            entries: HashMap::new(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Return compositor windows for `ids` (all on-screen windows when
    /// `None`).
    ///
    /// A hit younger than the timeout returns the cached snapshot itself
    /// (the same `Arc`).  Otherwise `source` is queried and the entry is
    /// overwritten.  A failing source yields an empty snapshot, which is
    /// cached like any other result.
    pub fn get<S: CompositorSource>(
        &mut self,
        source: &S,
        ids: Option<&[WindowId]>,
    ) -> Arc<[CompositorWindowInfo]> {
        let key: FilterKey = ids.map(|ids| ids.iter().cloned().collect());
        let now = self.clock.now();

        if let Some(entry) = self.entries.get(&key) {
            if now.saturating_duration_since(entry.fetched_at) < self.timeout {
                debug!("compositor cache hit ({} windows)", entry.windows.len());
                return Arc::clone(&entry.windows);
            }
        }

        let windows: Arc<[CompositorWindowInfo]> = match source.compositor_windows(ids) {
            Ok(windows) => windows.into(),
            Err(e) => {
                warn!("compositor query failed, treating as empty: {}", e);
                Arc::from(Vec::new())
            }
        };
        debug!("compositor cache refreshed ({} windows)", windows.len());
        self.entries.insert(
            key,
            Entry {
                fetched_at: now,
                windows: Arc::clone(&windows),
            },
        );
        windows
    }

    /// Drop every cached snapshot.
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }
}

//! In-memory dataset cache with a time-to-live.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::{DatasetError, FetchError, RouteSource};
use crate::models::RouteDataset;

/// How long a fetched dataset is served before a refresh is attempted
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

struct CachedDataset {
    dataset: Arc<RouteDataset>,
    fetched_at: Instant,
    invalidated: bool,
}

/// Where a dataset handed out by [`DatasetCache::load`] came from
#[derive(Debug)]
pub enum DatasetLoad {
    /// Cached copy younger than the TTL
    Fresh(Arc<RouteDataset>),
    /// Just fetched from the source
    Refreshed(Arc<RouteDataset>),
    /// The refresh failed; this is the last good copy
    Stale {
        dataset: Arc<RouteDataset>,
        error: Arc<FetchError>,
    },
}

impl DatasetLoad {
    pub fn dataset(&self) -> &Arc<RouteDataset> {
        match self {
            DatasetLoad::Fresh(d) | DatasetLoad::Refreshed(d) => d,
            DatasetLoad::Stale { dataset, .. } => dataset,
        }
    }

    pub fn into_dataset(self) -> Arc<RouteDataset> {
        match self {
            DatasetLoad::Fresh(d) | DatasetLoad::Refreshed(d) => d,
            DatasetLoad::Stale { dataset, .. } => dataset,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, DatasetLoad::Stale { .. })
    }
}

/// Shared cache in front of a [`RouteSource`].
///
/// The TTL is checked lazily on access. A refresh replaces the whole snapshot,
/// so readers holding the previous `Arc` keep a consistent view. Refreshes are
/// serialized; callers that waited on a refresh reuse its result.
pub struct DatasetCache<S> {
    source: S,
    ttl: Duration,
    current: RwLock<Option<CachedDataset>>,
    /// Held for the duration of a fetch; holds the last failure, if any
    refresh: Mutex<Option<Arc<FetchError>>>,
    /// Completed refresh attempts
    attempts: AtomicU64,
}

impl<S: RouteSource> DatasetCache<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            current: RwLock::new(None),
            refresh: Mutex::new(None),
            attempts: AtomicU64::new(0),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current dataset, refreshing it first if it is missing or expired.
    ///
    /// A failed refresh falls back to the previous dataset whatever its age.
    /// Only a failure with nothing cached is an error. Callers that waited on
    /// another caller's refresh take its outcome instead of fetching again.
    pub async fn load(&self) -> Result<DatasetLoad, DatasetError> {
        if let Some(dataset) = self.fresh().await {
            return Ok(DatasetLoad::Fresh(dataset));
        }

        let seen = self.attempts.load(Ordering::Acquire);
        let mut last_error = self.refresh.lock().await;

        // Someone else may have refreshed while we waited for the lock
        if let Some(dataset) = self.fresh().await {
            debug!("Route dataset refreshed by a concurrent request");
            return Ok(DatasetLoad::Fresh(dataset));
        }

        if self.attempts.load(Ordering::Acquire) != seen {
            if let Some(error) = last_error.as_ref() {
                debug!("Reusing failed refresh from a concurrent request");
                return self.fall_back(Arc::clone(error)).await;
            }
        }

        let outcome = self.source.fetch().await;
        self.attempts.fetch_add(1, Ordering::Release);

        match outcome {
            Ok(dataset) => {
                *last_error = None;
                let dataset = Arc::new(dataset);
                *self.current.write().await = Some(CachedDataset {
                    dataset: Arc::clone(&dataset),
                    fetched_at: Instant::now(),
                    invalidated: false,
                });
                info!("Route dataset refreshed: {} routes", dataset.len());
                Ok(DatasetLoad::Refreshed(dataset))
            }
            Err(e) => {
                let error = Arc::new(e);
                *last_error = Some(Arc::clone(&error));
                self.fall_back(error).await
            }
        }
    }

    /// Last good dataset after a failed refresh
    async fn fall_back(&self, error: Arc<FetchError>) -> Result<DatasetLoad, DatasetError> {
        let stale = self
            .current
            .read()
            .await
            .as_ref()
            .map(|cached| Arc::clone(&cached.dataset));

        match stale {
            Some(dataset) => {
                warn!("Route refresh failed, serving stale dataset: {}", error);
                Ok(DatasetLoad::Stale { dataset, error })
            }
            None => {
                error!("Route refresh failed with nothing cached: {}", error);
                Err(DatasetError::Unavailable(error))
            }
        }
    }

    /// Like [`load`](Self::load) without the provenance
    pub async fn get_dataset(&self) -> Result<Arc<RouteDataset>, DatasetError> {
        self.load().await.map(DatasetLoad::into_dataset)
    }

    /// Force the next access to refetch. The current dataset stays available
    /// as a stale fallback.
    pub async fn invalidate(&self) {
        if let Some(cached) = self.current.write().await.as_mut() {
            cached.invalidated = true;
        }
    }

    /// Age of the cached dataset, if any
    pub async fn age(&self) -> Option<Duration> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|cached| cached.fetched_at.elapsed())
    }

    async fn fresh(&self) -> Option<Arc<RouteDataset>> {
        self.current
            .read()
            .await
            .as_ref()
            .filter(|cached| !cached.invalidated && cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| Arc::clone(&cached.dataset))
    }
}

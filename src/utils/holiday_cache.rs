use moka::future::Cache;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::model::holiday_period::HolidayPeriod;

/// Holiday periods keyed by year (`None` = every year).
///
/// Holiday data changes a few times a year and is read on every date-picker
/// render, so lists are kept until the TTL runs out or a write invalidates them.
#[derive(Clone)]
pub struct HolidayCache {
    inner: Cache<Option<i32>, Arc<Vec<HolidayPeriod>>>,
    /// Bumped on every invalidation. A load that straddles a bump may have
    /// read pre-write rows and is not kept.
    generation: Arc<AtomicU64>,
}

impl HolidayCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(256) // one entry per year asked for
                .time_to_live(ttl)
                .build(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Cached list for `year`, running `load` on a miss. Concurrent misses on
    /// the same key share one load.
    pub async fn get_or_load<F, Fut>(
        &self,
        year: Option<i32>,
        load: F,
    ) -> Result<Arc<Vec<HolidayPeriod>>, Arc<sqlx::Error>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<HolidayPeriod>, sqlx::Error>>,
    {
        let generation = self.generation.load(Ordering::Acquire);

        let periods = self
            .inner
            .try_get_with(year, async move { load().await.map(Arc::new) })
            .await?;

        if self.generation.load(Ordering::Acquire) != generation {
            self.inner.invalidate(&year).await;
        }
        Ok(periods)
    }

    /// Drop everything; called after any holiday write.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.inner.invalidate_all();
        tracing::debug!("Holiday period cache invalidated");
    }
}

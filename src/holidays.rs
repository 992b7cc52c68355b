//! National holiday cache.
//!
//! National holidays come from an external feed, one calendar year at a
//! time. The [`HolidayCache`] fetches each year at most once per TTL and
//! hands out shared, immutable slices; readers never block each other.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use chrono::NaiveDate;
//! use dtr_payroll::holidays::{HolidayCache, StaticHolidayFeed};
//! use dtr_payroll::models::NationalHoliday;
//!
//! let feed = StaticHolidayFeed::new(vec![NationalHoliday {
//!     date: NaiveDate::from_ymd_opt(2025, 12, 25).unwrap(),
//!     local_name: "Christmas Day".to_string(),
//! }]);
//! let cache = HolidayCache::new(feed, Duration::from_secs(3600));
//!
//! let holidays = cache.get_or_fetch(2025).unwrap();
//! assert_eq!(holidays.len(), 1);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use chrono::Datelike;
use tracing::{debug, info};

use crate::calculation::is_excluded_national_holiday;
use crate::error::EngineResult;
use crate::models::{DateRange, NationalHoliday};

/// A source of national holidays.
pub trait HolidayFeed: Send + Sync {
    /// Returns every national holiday in a calendar year.
    fn fetch_year(&self, year: i32) -> EngineResult<Vec<NationalHoliday>>;
}

impl<F: HolidayFeed + ?Sized> HolidayFeed for Box<F> {
    fn fetch_year(&self, year: i32) -> EngineResult<Vec<NationalHoliday>> {
        (**self).fetch_year(year)
    }
}

/// A feed backed by a fixed list, typically `national_holidays.yaml`.
#[derive(Debug, Clone, Default)]
pub struct StaticHolidayFeed {
    holidays: Vec<NationalHoliday>,
}

impl StaticHolidayFeed {
    /// Creates a feed serving the given holidays.
    pub fn new(holidays: Vec<NationalHoliday>) -> Self {
        Self { holidays }
    }
}

impl HolidayFeed for StaticHolidayFeed {
    fn fetch_year(&self, year: i32) -> EngineResult<Vec<NationalHoliday>> {
        Ok(self
            .holidays
            .iter()
            .filter(|h| h.date.year() == year)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone)]
struct CachedYear {
    holidays: Arc<[NationalHoliday]>,
    fetched_at: Instant,
}

/// Per-year cache in front of a [`HolidayFeed`].
///
/// Excluded holidays are dropped before a year is stored, so everything
/// the cache returns is observed.
pub struct HolidayCache<F> {
    feed: F,
    ttl: Duration,
    years: RwLock<HashMap<i32, CachedYear>>,
}

impl<F: HolidayFeed> HolidayCache<F> {
    /// Creates an empty cache.
    pub fn new(feed: F, ttl: Duration) -> Self {
        Self {
            feed,
            ttl,
            years: RwLock::new(HashMap::new()),
        }
    }

    /// Returns a year's holidays, fetching when absent or expired.
    ///
    /// A failed fetch is returned to the caller and nothing is cached.
    pub fn get_or_fetch(&self, year: i32) -> EngineResult<Arc<[NationalHoliday]>> {
        if let Some(holidays) = self.fresh(year) {
            debug!(year, "Holiday cache hit");
            return Ok(holidays);
        }

        let fetched = self.feed.fetch_year(year)?;
        let total = fetched.len();
        let mut observed: Vec<NationalHoliday> = fetched
            .into_iter()
            .filter(|h| !is_excluded_national_holiday(&h.local_name))
            .collect();
        observed.sort_by_key(|h| h.date);

        info!(
            year,
            holidays = observed.len(),
            excluded = total - observed.len(),
            "Fetched national holidays"
        );

        let holidays: Arc<[NationalHoliday]> = observed.into();
        let mut years = self.years.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have filled the year while the feed was running.
        let entry = years.entry(year).or_insert_with(|| CachedYear {
            holidays: Arc::clone(&holidays),
            fetched_at: Instant::now(),
        });
        if entry.fetched_at.elapsed() >= self.ttl {
            *entry = CachedYear {
                holidays,
                fetched_at: Instant::now(),
            };
        }
        Ok(Arc::clone(&entry.holidays))
    }

    /// Holidays falling within a date range, across year boundaries.
    pub fn holidays_in(&self, range: &DateRange) -> EngineResult<Vec<NationalHoliday>> {
        let mut holidays = Vec::new();
        for year in range.start.year()..=range.end.year() {
            holidays.extend(
                self.get_or_fetch(year)?
                    .iter()
                    .filter(|h| range.contains(h.date))
                    .cloned(),
            );
        }
        Ok(holidays)
    }

    /// Drops one year so the next lookup refetches it.
    pub fn invalidate(&self, year: i32) {
        self.years
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&year);
    }

    /// Drops every cached year.
    pub fn invalidate_all(&self) {
        self.years
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn fresh(&self, year: i32) -> Option<Arc<[NationalHoliday]>> {
        let years = self.years.read().unwrap_or_else(PoisonError::into_inner);
        years
            .get(&year)
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| Arc::clone(&cached.holidays))
    }
}

impl<F> std::fmt::Debug for HolidayCache<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self
            .years
            .read()
            .map(|years| years.len())
            .unwrap_or_default();
        f.debug_struct("HolidayCache")
            .field("ttl", &self.ttl)
            .field("cached_years", &cached)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFeed {
        inner: StaticHolidayFeed,
        calls: AtomicUsize,
    }

    impl HolidayFeed for CountingFeed {
        fn fetch_year(&self, year: i32) -> EngineResult<Vec<NationalHoliday>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_year(year)
        }
    }

    struct FailingFeed;

    impl HolidayFeed for FailingFeed {
        fn fetch_year(&self, year: i32) -> EngineResult<Vec<NationalHoliday>> {
            Err(EngineError::HolidayFeed {
                year,
                message: "upstream unavailable".to_string(),
            })
        }
    }

    fn holiday(y: i32, m: u32, d: u32, name: &str) -> NationalHoliday {
        NationalHoliday {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            local_name: name.to_string(),
        }
    }

    fn counting_feed() -> CountingFeed {
        CountingFeed {
            inner: StaticHolidayFeed::new(vec![
                holiday(2025, 1, 1, "New Year's Day"),
                holiday(2025, 6, 6, "Eid al-Adha (Feast of the Sacrifice)"),
                holiday(2025, 12, 30, "Rizal Day"),
                holiday(2026, 1, 1, "New Year's Day"),
            ]),
            calls: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_year_fetched_once_within_ttl() {
        let cache = HolidayCache::new(counting_feed(), Duration::from_secs(3600));

        let first = cache.get_or_fetch(2025).unwrap();
        let second = cache.get_or_fetch(2025).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.feed.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_excluded_holiday_never_cached() {
        let cache = HolidayCache::new(counting_feed(), Duration::from_secs(3600));
        let holidays = cache.get_or_fetch(2025).unwrap();

        assert_eq!(holidays.len(), 2);
        assert!(holidays.iter().all(|h| !h.local_name.contains("Eid")));
    }

    #[test]
    fn test_expired_year_is_refetched() {
        let cache = HolidayCache::new(counting_feed(), Duration::ZERO);
        cache.get_or_fetch(2025).unwrap();
        cache.get_or_fetch(2025).unwrap();
        assert_eq!(cache.feed.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let cache = HolidayCache::new(counting_feed(), Duration::from_secs(3600));
        cache.get_or_fetch(2025).unwrap();
        cache.get_or_fetch(2026).unwrap();

        cache.invalidate(2025);
        cache.get_or_fetch(2025).unwrap();
        cache.get_or_fetch(2026).unwrap();
        assert_eq!(cache.feed.calls.load(Ordering::SeqCst), 3);

        cache.invalidate_all();
        cache.get_or_fetch(2026).unwrap();
        assert_eq!(cache.feed.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_holidays_in_spans_years() {
        let cache = HolidayCache::new(counting_feed(), Duration::from_secs(3600));
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 12, 16).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        )
        .unwrap();

        let names: Vec<String> = cache
            .holidays_in(&range)
            .unwrap()
            .into_iter()
            .map(|h| h.local_name)
            .collect();
        assert_eq!(names, vec!["Rizal Day", "New Year's Day"]);
    }

    #[test]
    fn test_feed_failure_is_not_cached() {
        let cache = HolidayCache::new(FailingFeed, Duration::from_secs(3600));
        let result = cache.get_or_fetch(2025);

        match result {
            Err(EngineError::HolidayFeed { year, .. }) => assert_eq!(year, 2025),
            other => panic!("Expected HolidayFeed error, got {other:?}"),
        }
        assert_eq!(format!("{cache:?}"), "HolidayCache { ttl: 3600s, cached_years: 0 }");
    }
}

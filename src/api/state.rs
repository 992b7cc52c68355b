//! Application state for the DTR and payroll API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ConfigLoader;
use crate::holidays::{HolidayCache, HolidayFeed, StaticHolidayFeed};

/// Holiday cache over whichever feed the server was started with.
pub type SharedHolidayCache = HolidayCache<Box<dyn HolidayFeed>>;

/// Shared application state.
///
/// Contains resources that are shared across all request handlers: the
/// loaded configuration and the national holiday cache.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    holidays: Arc<SharedHolidayCache>,
}

impl AppState {
    /// Creates state whose holiday feed serves `national_holidays.yaml`.
    pub fn new(config: ConfigLoader) -> Self {
        let feed = StaticHolidayFeed::new(config.national_holidays().to_vec());
        Self::with_feed(config, feed)
    }

    /// Creates state with a custom holiday feed.
    pub fn with_feed(config: ConfigLoader, feed: impl HolidayFeed + 'static) -> Self {
        let ttl = Duration::from_secs(config.settings().holiday_cache.ttl_hours * 3600);
        let feed: Box<dyn HolidayFeed> = Box::new(feed);
        Self {
            holidays: Arc::new(HolidayCache::new(feed, ttl)),
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the national holiday cache.
    pub fn holidays(&self) -> &SharedHolidayCache {
        &self.holidays
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_is_clone() {
        // Verify AppState can be cloned (required for axum state)
        fn assert_clone<T: Clone + Send + Sync>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_holiday_cache_seeded_from_config() {
        let config = ConfigLoader::load("./config/default").unwrap();
        let state = AppState::new(config);
        let holidays = state.holidays().get_or_fetch(2025).unwrap();
        assert!(!holidays.is_empty());
        assert!(holidays.iter().all(|h| !h.local_name.contains("Eid al-Adha")));
    }
}

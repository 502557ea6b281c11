use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::AppConfig;
use crate::store::{seed::seed_state, Store};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Store,
}

impl AppState {
    pub fn build(config: AppConfig) -> Self {
        let store = if config.seed_demo_data {
            Store::new(seed_state())
        } else {
            Store::empty()
        };
        Self {
            config: Arc::new(config),
            store,
        }
    }

    /// Reference date for status classification: an explicit query override,
    /// else today in the authority's timezone.
    pub fn reference_date(&self, requested: Option<NaiveDate>) -> NaiveDate {
        requested.unwrap_or_else(|| self.config.today())
    }
}

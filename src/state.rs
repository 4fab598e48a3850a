use crate::config::Config;
use crate::dates::current_year;
use std::{path::Path, sync::Arc};

/// Handlers reload the CSV on every request; only configuration is shared.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.config.data_path
    }

    pub fn year(&self) -> i32 {
        self.config.year.unwrap_or_else(current_year)
    }
}

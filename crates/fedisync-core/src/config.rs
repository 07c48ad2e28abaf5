use std::path::{Path, PathBuf};

use crate::constants::{MAX_CACHE_ITEMS, PAGE_SIZE};

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    /// Server page size; a page shorter than this means the feed is exhausted
    pub page_size: usize,
    /// Upper bound of cached items per session
    pub max_cache_items: usize,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            page_size: PAGE_SIZE,
            max_cache_items: MAX_CACHE_ITEMS,
        }
    }

    pub fn cache_db_path(&self) -> PathBuf {
        self.data_dir.join(crate::constants::CACHE_DB_FILE)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new("fedisync_data")
    }
}

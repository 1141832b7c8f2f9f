use std::path::PathBuf;

use crate::filter::{DETAIL_PAGE_SIZE, SUMMARY_PAGE_SIZE};
use crate::schema::export;

/// Runtime settings for loading, paging and exporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Directory the source sheet is resolved against
    pub base_path: PathBuf,
    /// Source sheet file name inside `base_path`
    pub data_file: String,
    /// Where table exports and the report document are written
    pub output_dir: PathBuf,
    pub summary_page_size: usize,
    pub detail_page_size: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("data"),
            data_file: export::DEFAULT_SOURCE_FILE.to_string(),
            output_dir: PathBuf::from("exports"),
            summary_page_size: SUMMARY_PAGE_SIZE,
            detail_page_size: DETAIL_PAGE_SIZE,
        }
    }
}

impl DashboardConfig {
    pub fn data_path(&self) -> PathBuf {
        self.base_path.join(&self.data_file)
    }
}

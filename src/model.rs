use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregation::{
    self, AgeBucketReport, BackorderReport, CategoryMetrics, InventorySummary, RollupEntry,
    StatusCount, WarehouseRollupEntry,
};
use crate::config::DashboardConfig;
use crate::error::{InventoryError, Result};
use crate::export::{self, ExportFormat};
use crate::filter::{self, DateRange, RecordFilter, Selection};
use crate::loader;
use crate::record::InventoryRecord;
use crate::schema::export as names;
use crate::visualization::{self, ReportConfig, ReportSection};

/// Where the record collection is in its single load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Loaded,
    Failed(String),
}

/// One page of the record table.
#[derive(Debug, Clone, Serialize)]
pub struct RecordPage {
    pub page: usize,
    pub page_count: usize,
    pub total_records: usize,
    pub records: Vec<InventoryRecord>,
}

/// One row of the summary table: a record's product and its quantities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductQuantityRow {
    pub product_name: String,
    pub order_item_quantity: u64,
    pub available_quantity: u64,
}

/// One page of the summary table, in record order.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryTablePage {
    pub page: usize,
    pub page_count: usize,
    pub total_records: usize,
    pub rows: Vec<ProductQuantityRow>,
}

/// Owns the loaded records and answers aggregate queries over them.
///
/// Filter selections are always passed in by the caller; the model keeps no
/// view state between calls.
#[cfg_attr(feature = "python", pyo3::pyclass(name = "InventoryModel"))]
pub struct InventoryModel {
    pub(crate) config: DashboardConfig,
    state: LoadState,
    records: Vec<InventoryRecord>,
}

impl InventoryModel {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            state: LoadState::Pending,
            records: Vec::new(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load the source sheet. `filename` overrides the configured file name
    /// and is resolved against the base path.
    ///
    /// A failure leaves the model in `LoadState::Failed`; there is no retry.
    pub fn load(&mut self, filename: Option<&str>) -> Result<usize> {
        let path = match filename {
            Some(name) => self.config.base_path.join(name),
            None => self.config.data_path(),
        };

        match loader::load_inventory_file(&path) {
            Ok(records) => Ok(self.set_records(records)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "inventory load failed");
                self.records.clear();
                self.state = LoadState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Install records obtained elsewhere (tests, other sources).
    pub fn set_records(&mut self, records: Vec<InventoryRecord>) -> usize {
        self.records = records;
        self.state = LoadState::Loaded;
        self.records.len()
    }

    /// The loaded records. Refuses while the load is pending or failed.
    pub fn records(&self) -> Result<&[InventoryRecord]> {
        match &self.state {
            LoadState::Loaded => Ok(&self.records),
            LoadState::Pending => Err(InventoryError::NotLoaded("inventory records".into())),
            LoadState::Failed(reason) => Err(InventoryError::NotLoaded(format!(
                "inventory records (load failed: {reason})"
            ))),
        }
    }

    // ── Rollups ─────────────────────────────────────────────────────────────

    pub fn category_rollup(&self) -> Result<Vec<RollupEntry>> {
        Ok(aggregation::rollup_by_category(self.records()?))
    }

    pub fn vendor_rollup(&self) -> Result<Vec<RollupEntry>> {
        Ok(aggregation::rollup_by_vendor(self.records()?))
    }

    pub fn warehouse_rollup(&self) -> Result<Vec<WarehouseRollupEntry>> {
        Ok(aggregation::rollup_warehouses(self.records()?))
    }

    // ── Counts ──────────────────────────────────────────────────────────────

    pub fn status_counts(&self) -> Result<StatusCount> {
        Ok(aggregation::count_by_status(self.records()?))
    }

    pub fn summary(&self) -> Result<InventorySummary> {
        Ok(aggregation::summarize(self.records()?))
    }

    pub fn categories(&self) -> Result<Vec<String>> {
        Ok(aggregation::distinct_categories(self.records()?))
    }

    /// Metrics for `category`, or for the first category when nothing is
    /// selected. `None` when there are no records at all.
    pub fn category_metrics(&self, category: Option<&str>) -> Result<Option<CategoryMetrics>> {
        let records = self.records()?;
        let chosen = match Selection::from(category) {
            Selection::Value(c) => Some(c),
            Selection::Nothing => aggregation::distinct_categories(records).into_iter().next(),
        };
        Ok(chosen.map(|c| aggregation::category_metrics(records, &c)))
    }

    // ── Backorders and aging ────────────────────────────────────────────────

    pub fn backorders(&self, category: Option<&str>) -> Result<BackorderReport> {
        Ok(aggregation::backorders(
            self.records()?,
            category.unwrap_or_default(),
        ))
    }

    pub fn aging_by_category(
        &self,
        category: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AgeBucketReport> {
        Ok(aggregation::age_buckets_by_category(
            self.records()?,
            category.unwrap_or_default(),
            now,
        ))
    }

    pub fn aging_by_product(
        &self,
        product: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AgeBucketReport> {
        Ok(aggregation::age_buckets_by_product(
            self.records()?,
            product.unwrap_or_default(),
            now,
        ))
    }

    // ── Record table ────────────────────────────────────────────────────────

    /// One page of records whose order date falls inside `range`.
    pub fn records_page(&self, range: DateRange, page: usize) -> Result<RecordPage> {
        let filtered: Vec<InventoryRecord> = RecordFilter::OrderDateRange(range)
            .apply(self.records()?)
            .into_iter()
            .cloned()
            .collect();
        let per_page = self.config.detail_page_size;

        Ok(RecordPage {
            page,
            page_count: filter::page_count(filtered.len(), per_page),
            total_records: filtered.len(),
            records: filter::paginate(&filtered, page, per_page).to_vec(),
        })
    }

    /// One page of the summary table over every loaded record.
    pub fn summary_table_page(&self, page: usize) -> Result<SummaryTablePage> {
        let records = self.records()?;
        let per_page = self.config.summary_page_size;

        Ok(SummaryTablePage {
            page,
            page_count: filter::page_count(records.len(), per_page),
            total_records: records.len(),
            rows: filter::paginate(records, page, per_page)
                .iter()
                .map(|r| ProductQuantityRow {
                    product_name: r.product_name.clone(),
                    order_item_quantity: r.order_item_quantity,
                    available_quantity: r.available_quantity,
                })
                .collect(),
        })
    }

    // ── Export ──────────────────────────────────────────────────────────────

    /// Write the category and warehouse tables to the output directory.
    pub fn export_tables(&self, format: ExportFormat) -> Result<Vec<PathBuf>> {
        let dir = &self.config.output_dir;
        let mut categories = export::category_frame(&self.category_rollup()?)?;
        let mut warehouses = export::warehouse_frame(&self.warehouse_rollup()?)?;

        Ok(vec![
            export::write_table(&mut categories, dir, names::CATEGORY_DATA, format)?,
            export::write_table(&mut warehouses, dir, names::WAREHOUSE_DATA, format)?,
        ])
    }

    /// Report pages in print order: summary, status, vendors, category
    /// metrics, then aging and backorders for the selected category.
    pub fn report_sections(
        &self,
        category: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReportSection>> {
        let mut sections = vec![
            ReportSection::Summary(self.summary()?),
            ReportSection::StatusChart(self.status_counts()?),
            ReportSection::VendorChart(self.vendor_rollup()?),
        ];
        if let Some(metrics) = self.category_metrics(category)? {
            sections.push(ReportSection::CategoryMetrics(metrics));
        }
        if let Selection::Value(selected) = Selection::from(category) {
            sections.push(ReportSection::Aging {
                report: self.aging_by_category(Some(&selected), now)?,
                subject: selected,
            });
            sections.push(ReportSection::Backorders(self.backorders(category)?));
        }
        Ok(sections)
    }

    pub fn render_report(&self, category: Option<&str>, now: DateTime<Utc>) -> Result<String> {
        let sections = self.report_sections(category, now)?;
        let config = ReportConfig {
            generated_at: now,
            ..Default::default()
        };
        Ok(visualization::generate_report_html(&sections, &config))
    }

    /// Render the report and write it as `inventory-summary.html`.
    pub fn save_report(&self, category: Option<&str>, now: DateTime<Utc>) -> Result<PathBuf> {
        let html = self.render_report(category, now)?;
        fs::create_dir_all(&self.config.output_dir)?;
        let path = self.config.output_dir.join(names::REPORT_FILE);
        fs::write(&path, html)?;
        info!(path = %path.display(), "saved report");
        Ok(path)
    }
}

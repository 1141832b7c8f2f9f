use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDateTime, PyModule};
use pyo3_polars::PyDataFrame;

use crate::config::DashboardConfig;
use crate::export::{self, ExportFormat};
use crate::filter::DateRange;
use crate::model::InventoryModel;
use crate::schema;

#[pymethods]
impl InventoryModel {
    #[new]
    #[pyo3(signature = (base_path, output_dir=None))]
    fn py_new(base_path: String, output_dir: Option<String>) -> Self {
        let mut config = DashboardConfig {
            base_path: PathBuf::from(base_path),
            ..Default::default()
        };
        if let Some(dir) = output_dir {
            config.output_dir = PathBuf::from(dir);
        }
        Self::new(config)
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load the inventory CSV. Returns the number of records.
    #[pyo3(name = "load", signature = (filename=None))]
    fn py_load(&mut self, filename: Option<&str>) -> PyResult<usize> {
        Ok(self.load(filename)?)
    }

    #[getter]
    fn load_state(&self) -> String {
        match self.state() {
            crate::model::LoadState::Pending => "pending".to_string(),
            crate::model::LoadState::Loaded => "loaded".to_string(),
            crate::model::LoadState::Failed(reason) => format!("failed: {reason}"),
        }
    }

    // ── Rollups ─────────────────────────────────────────────────────────────

    #[pyo3(name = "category_rollup")]
    fn py_category_rollup(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(export::category_frame(&self.category_rollup()?)?))
    }

    #[pyo3(name = "vendor_rollup")]
    fn py_vendor_rollup(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(export::vendor_frame(&self.vendor_rollup()?)?))
    }

    #[pyo3(name = "warehouse_rollup")]
    fn py_warehouse_rollup(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(export::warehouse_frame(
            &self.warehouse_rollup()?,
        )?))
    }

    // ── Counts ──────────────────────────────────────────────────────────────

    #[pyo3(name = "status_counts")]
    fn py_status_counts(&self) -> PyResult<HashMap<String, u64>> {
        let counts = self.status_counts()?;
        Ok(HashMap::from([
            (schema::status::SHIPPED.to_string(), counts.shipped),
            (schema::status::RECEIVED.to_string(), counts.received),
        ]))
    }

    #[pyo3(name = "summary")]
    fn py_summary(&self) -> PyResult<HashMap<String, u64>> {
        let s = self.summary()?;
        Ok(HashMap::from([
            ("categories".to_string(), s.categories as u64),
            ("warehouses".to_string(), s.warehouses as u64),
            ("products".to_string(), s.products as u64),
            ("vendors".to_string(), s.vendors as u64),
            ("shipped".to_string(), s.shipped),
            ("received".to_string(), s.received),
        ]))
    }

    #[pyo3(name = "categories")]
    fn py_categories(&self) -> PyResult<Vec<String>> {
        Ok(self.categories()?)
    }

    /// One page of the summary table as (product, ordered, available) rows.
    #[pyo3(name = "summary_table", signature = (page=1))]
    fn py_summary_table(&self, page: usize) -> PyResult<Vec<(String, u64, u64)>> {
        let page = self.summary_table_page(page)?;
        Ok(page
            .rows
            .into_iter()
            .map(|r| (r.product_name, r.order_item_quantity, r.available_quantity))
            .collect())
    }

    // ── Backorders and aging ────────────────────────────────────────────────

    /// Backorder quantity per product, or None when no category is selected.
    #[pyo3(name = "backorders", signature = (category=None))]
    fn py_backorders(&self, category: Option<&str>) -> PyResult<Option<Vec<(String, u64)>>> {
        let report = self.backorders(category)?;
        Ok(report.category.map(|_| {
            report
                .products
                .into_iter()
                .map(|e| (e.product, e.quantity))
                .collect()
        }))
    }

    /// Aging buckets as ordered (label, quantity) pairs.
    ///
    /// `now` must be a naive datetime (interpreted as UTC); defaults to the
    /// current time.
    #[pyo3(name = "aging_by_category", signature = (category=None, now=None))]
    fn py_aging_by_category(
        &self,
        category: Option<&str>,
        now: Option<Bound<'_, PyDateTime>>,
    ) -> PyResult<Vec<(String, u64)>> {
        let report = self.aging_by_category(category, resolve_now(now)?)?;
        Ok(report.iter().map(|(l, q)| (l.to_string(), q)).collect())
    }

    #[pyo3(name = "aging_by_product", signature = (product=None, now=None))]
    fn py_aging_by_product(
        &self,
        product: Option<&str>,
        now: Option<Bound<'_, PyDateTime>>,
    ) -> PyResult<Vec<(String, u64)>> {
        let report = self.aging_by_product(product, resolve_now(now)?)?;
        Ok(report.iter().map(|(l, q)| (l.to_string(), q)).collect())
    }

    // ── Record table ────────────────────────────────────────────────────────

    /// One page of records as a DataFrame, filtered by ISO dates (YYYY-MM-DD).
    #[pyo3(name = "records_page", signature = (page=1, start=None, end=None))]
    fn py_records_page(
        &self,
        page: usize,
        start: Option<&str>,
        end: Option<&str>,
    ) -> PyResult<PyDataFrame> {
        let range = DateRange::new(parse_day(start)?, parse_day(end)?);
        let page = self.records_page(range, page)?;
        Ok(PyDataFrame(export::records_frame(&page.records)?))
    }

    // ── Export ──────────────────────────────────────────────────────────────

    #[pyo3(name = "export_tables", signature = (format="csv"))]
    fn py_export_tables(&self, format: &str) -> PyResult<Vec<String>> {
        let paths = self.export_tables(ExportFormat::parse(format)?)?;
        Ok(paths.iter().map(|p| p.display().to_string()).collect())
    }

    /// Render the printable report as a self-contained HTML string.
    #[pyo3(name = "render_report", signature = (category=None, now=None))]
    fn py_render_report(
        &self,
        category: Option<&str>,
        now: Option<Bound<'_, PyDateTime>>,
    ) -> PyResult<String> {
        Ok(self.render_report(category, resolve_now(now)?)?)
    }
}

fn resolve_now(now: Option<Bound<'_, PyDateTime>>) -> PyResult<DateTime<Utc>> {
    let Some(timestamp) = now else {
        return Ok(Utc::now());
    };
    // Reject timezone-aware datetimes
    if !timestamp.getattr("tzinfo")?.is_none() {
        return Err(PyValueError::new_err(
            "inventory-lens requires naive datetime objects (no timezone info), \
             interpreted as UTC",
        ));
    }
    let dt: NaiveDateTime = timestamp.extract()?;
    Ok(dt.and_utc())
}

fn parse_day(raw: Option<&str>) -> PyResult<Option<chrono::NaiveDate>> {
    raw.filter(|s| !s.is_empty())
        .map(|s| {
            chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
                PyValueError::new_err(format!("Invalid date '{s}': expected YYYY-MM-DD ({e})"))
            })
        })
        .transpose()
}

/// Export schema constants as Python submodules
pub(crate) fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Record
    let record = PyModule::new(m.py(), "record")?;
    record.add("CATEGORY_NAME", schema::record::CATEGORY_NAME)?;
    record.add("PRODUCT_NAME", schema::record::PRODUCT_NAME)?;
    record.add("VENDOR_NAME", schema::record::VENDOR_NAME)?;
    record.add("WAREHOUSE_NAME", schema::record::WAREHOUSE_NAME)?;
    record.add("ORDER_ITEM_QUANTITY", schema::record::ORDER_ITEM_QUANTITY)?;
    record.add("AVAILABLE_QUANTITY", schema::record::AVAILABLE_QUANTITY)?;
    record.add("ORDER_DATE", schema::record::ORDER_DATE)?;
    record.add("EMPLOYEE_HIRE_DATE", schema::record::EMPLOYEE_HIRE_DATE)?;
    record.add("STATUS", schema::record::STATUS)?;
    m.add_submodule(&record)?;

    // Rollup
    let rollup = PyModule::new(m.py(), "rollup")?;
    rollup.add("CATEGORY", schema::rollup::CATEGORY)?;
    rollup.add("VENDOR", schema::rollup::VENDOR)?;
    rollup.add("WAREHOUSE", schema::rollup::WAREHOUSE)?;
    rollup.add("TOTAL_ORDER_QTY", schema::rollup::TOTAL_ORDER_QTY)?;
    rollup.add("TOTAL_AVAILABLE_QTY", schema::rollup::TOTAL_AVAILABLE_QTY)?;
    rollup.add("SHIPPED_QTY", schema::rollup::SHIPPED_QTY)?;
    rollup.add("RECEIVED_QTY", schema::rollup::RECEIVED_QTY)?;
    m.add_submodule(&rollup)?;

    // Aging
    let aging = PyModule::new(m.py(), "aging")?;
    aging.add("BUCKETS", schema::aging::ALL.to_vec())?;
    m.add_submodule(&aging)?;

    Ok(())
}

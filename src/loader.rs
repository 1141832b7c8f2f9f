//! Record source: reads the spreadsheet export into `InventoryRecord`s.
//!
//! The sheet is read with every column as a string, then each cell is
//! coerced on the way into a record. Quantity cells go through
//! `coerce_quantity`; date cells that are not numeric become `None`.

use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::date;
use crate::error::{InventoryError, Result};
use crate::record::{coerce_quantity, InventoryRecord, OrderStatus};
use crate::schema::record;

/// Columns that must exist for the sheet to be usable.
pub const REQUIRED_COLUMNS: [&str; 2] = [record::CATEGORY_NAME, record::PRODUCT_NAME];

/// Read a CSV file with all columns as String dtype.
/// Trims whitespace from column names and normalizes the available-quantity spelling.
pub fn read_csv_as_strings(path: &Path) -> Result<DataFrame> {
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;

    normalize_column_names(df)
}

/// Rename the legacy `AvaliableQuantity` column to `AvailableQuantity`.
///
/// When both spellings are present the canonical column wins and the legacy
/// one is dropped.
pub fn normalize_column_names(df: DataFrame) -> Result<DataFrame> {
    let schema = df.schema();
    let has_legacy = schema.contains(record::AVAILABLE_QUANTITY_LEGACY);
    let has_canonical = schema.contains(record::AVAILABLE_QUANTITY);

    match (has_legacy, has_canonical) {
        (true, false) => Ok(df
            .lazy()
            .rename(
                [record::AVAILABLE_QUANTITY_LEGACY],
                [record::AVAILABLE_QUANTITY],
                true,
            )
            .collect()?),
        (true, true) => {
            warn!("both available-quantity spellings present, keeping the canonical column");
            Ok(df.drop(record::AVAILABLE_QUANTITY_LEGACY)?)
        }
        _ => Ok(df),
    }
}

pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<()> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(InventoryError::MissingColumn(col_name.to_string()));
        }
    }
    Ok(())
}

/// Convert a string-typed frame into records, one per row, in row order.
///
/// Optional columns that are absent behave like blank cells.
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<InventoryRecord>> {
    require_columns(df, &REQUIRED_COLUMNS)?;

    let category = text_column(df, record::CATEGORY_NAME)?;
    let product = text_column(df, record::PRODUCT_NAME)?;
    let vendor = text_column(df, record::VENDOR_NAME)?;
    let warehouse = text_column(df, record::WAREHOUSE_NAME)?;
    let ordered = text_column(df, record::ORDER_ITEM_QUANTITY)?;
    let available = text_column(df, record::AVAILABLE_QUANTITY)?;
    let order_date = text_column(df, record::ORDER_DATE)?;
    let hire_date = text_column(df, record::EMPLOYEE_HIRE_DATE)?;
    let status = text_column(df, record::STATUS)?;

    let mut detail_columns: Vec<(&str, &StringChunked)> = Vec::new();
    for column in df.get_columns() {
        let name = column.name().as_str();
        if !record::ALL.contains(&name) {
            detail_columns.push((name, column.str()?));
        }
    }

    let cell = |col: Option<&StringChunked>, i: usize| -> Option<String> {
        col.and_then(|c| c.get(i)).map(str::to_string)
    };

    let mut records = Vec::with_capacity(df.height());
    let mut undated = 0usize;
    for i in 0..df.height() {
        let order_serial = serial_cell(order_date, i, record::ORDER_DATE);
        if order_serial.is_none() {
            undated += 1;
        }

        records.push(InventoryRecord {
            category_name: cell(category, i).unwrap_or_default(),
            product_name: cell(product, i).unwrap_or_default(),
            vendor_name: cell(vendor, i).unwrap_or_default(),
            warehouse_name: cell(warehouse, i).unwrap_or_default(),
            order_item_quantity: coerce_quantity(ordered.and_then(|c| c.get(i))),
            available_quantity: coerce_quantity(available.and_then(|c| c.get(i))),
            order_date: order_serial,
            employee_hire_date: serial_cell(hire_date, i, record::EMPLOYEE_HIRE_DATE),
            status: OrderStatus::parse(status.and_then(|c| c.get(i)).unwrap_or("")),
            details: detail_columns
                .iter()
                .map(|(name, c)| (name.to_string(), c.get(i).unwrap_or("").to_string()))
                .collect(),
        });
    }

    if undated > 0 {
        warn!(undated, "records without a usable order date are excluded from aging");
    }
    Ok(records)
}

fn text_column<'a>(df: &'a DataFrame, name: &str) -> Result<Option<&'a StringChunked>> {
    match df.column(name) {
        Ok(column) => Ok(Some(column.str()?)),
        Err(_) => Ok(None),
    }
}

fn serial_cell(col: Option<&StringChunked>, row: usize, column: &str) -> Option<f64> {
    let raw = col.and_then(|c| c.get(row))?;
    if raw.trim().is_empty() {
        return None;
    }
    match date::parse_serial(raw) {
        Ok(serial) => Some(serial),
        Err(err) => {
            debug!(row, column, error = %err, "unparsable date cell");
            None
        }
    }
}

/// Load the inventory sheet at `path`.
pub fn load_inventory_file(path: &Path) -> Result<Vec<InventoryRecord>> {
    let df = read_csv_as_strings(path)?;
    let records = records_from_frame(&df)?;
    info!(
        path = %path.display(),
        rows = records.len(),
        "loaded inventory records"
    );
    Ok(records)
}

//! Rollup tables as polars frames, written back out as spreadsheet files.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;

use crate::aggregation::{RollupEntry, WarehouseRollupEntry};
use crate::date;
use crate::error::{InventoryError, Result};
use crate::record::InventoryRecord;
use crate::schema::{record, rollup};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Parquet,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }

    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "parquet" => Ok(Self::Parquet),
            other => Err(InventoryError::InvalidData(format!(
                "Invalid export format: '{other}'. Must be 'csv' or 'parquet'"
            ))),
        }
    }
}

/// Frame with the key column named `key_column` followed by the two totals.
pub fn rollup_frame(entries: &[RollupEntry], key_column: &str) -> Result<DataFrame> {
    let keys: Vec<String> = entries.iter().map(|e| e.key.clone()).collect();
    let ordered: Vec<u64> = entries.iter().map(|e| e.total_order_qty).collect();
    let available: Vec<u64> = entries.iter().map(|e| e.total_available_qty).collect();

    Ok(DataFrame::new(vec![
        Column::new(key_column.into(), keys),
        Column::new(rollup::TOTAL_ORDER_QTY.into(), ordered),
        Column::new(rollup::TOTAL_AVAILABLE_QTY.into(), available),
    ])?)
}

pub fn category_frame(entries: &[RollupEntry]) -> Result<DataFrame> {
    rollup_frame(entries, rollup::CATEGORY)
}

pub fn vendor_frame(entries: &[RollupEntry]) -> Result<DataFrame> {
    rollup_frame(entries, rollup::VENDOR)
}

pub fn warehouse_frame(entries: &[WarehouseRollupEntry]) -> Result<DataFrame> {
    let totals: Vec<RollupEntry> = entries.iter().map(|e| e.rollup.clone()).collect();
    let mut df = rollup_frame(&totals, rollup::WAREHOUSE)?;

    let shipped: Vec<u64> = entries.iter().map(|e| e.shipped).collect();
    let received: Vec<u64> = entries.iter().map(|e| e.received).collect();
    df.with_column(Column::new(rollup::SHIPPED_QTY.into(), shipped))?;
    df.with_column(Column::new(rollup::RECEIVED_QTY.into(), received))?;
    Ok(df)
}

/// Record table with canonical column names. Date serials are rendered as
/// ISO calendar days; blank or unusable dates stay null. Display-only
/// columns carried in `details` are appended after the canonical ones.
pub fn records_frame(records: &[InventoryRecord]) -> Result<DataFrame> {
    let text = |f: fn(&InventoryRecord) -> &str| -> Vec<String> {
        records.iter().map(|r| f(r).to_string()).collect()
    };
    let iso_day = |f: fn(&InventoryRecord) -> Option<f64>| -> Vec<Option<String>> {
        records
            .iter()
            .map(|r| {
                f(r).and_then(|s| date::to_naive_date(s).ok())
                    .map(|d| d.format("%Y-%m-%d").to_string())
            })
            .collect()
    };

    let mut columns = vec![
        Column::new(record::CATEGORY_NAME.into(), text(|r| r.category_name.as_str())),
        Column::new(record::PRODUCT_NAME.into(), text(|r| r.product_name.as_str())),
        Column::new(record::VENDOR_NAME.into(), text(|r| r.vendor_name.as_str())),
        Column::new(record::WAREHOUSE_NAME.into(), text(|r| r.warehouse_name.as_str())),
        Column::new(
            record::ORDER_ITEM_QUANTITY.into(),
            records.iter().map(|r| r.order_item_quantity).collect::<Vec<u64>>(),
        ),
        Column::new(
            record::AVAILABLE_QUANTITY.into(),
            records.iter().map(|r| r.available_quantity).collect::<Vec<u64>>(),
        ),
        Column::new(record::ORDER_DATE.into(), iso_day(|r| r.order_date)),
        Column::new(
            record::EMPLOYEE_HIRE_DATE.into(),
            iso_day(|r| r.employee_hire_date),
        ),
        Column::new(record::STATUS.into(), text(|r| r.status.as_str())),
    ];

    // Display-only columns follow, in source order.
    let mut detail_names: Vec<&str> = Vec::new();
    for (name, _) in records.iter().flat_map(|r| r.details.iter()) {
        if !detail_names.contains(&name.as_str()) {
            detail_names.push(name.as_str());
        }
    }
    for name in detail_names {
        let values: Vec<Option<String>> = records
            .iter()
            .map(|r| r.detail(name).map(str::to_string))
            .collect();
        columns.push(Column::new(name.into(), values));
    }

    Ok(DataFrame::new(columns)?)
}

/// Write `df` to `<dir>/<name>.<ext>`, creating `dir` if needed.
pub fn write_table(
    df: &mut DataFrame,
    dir: &Path,
    name: &str,
    format: ExportFormat,
) -> Result<PathBuf> {
    if name.is_empty() {
        return Err(InventoryError::InvalidData(
            "export dataset name must not be empty".to_string(),
        ));
    }
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{name}.{}", format.extension()));
    let mut file = File::create(&path)?;

    match format {
        ExportFormat::Csv => {
            CsvWriter::new(&mut file).include_header(true).finish(df)?;
        }
        ExportFormat::Parquet => {
            ParquetWriter::new(&mut file).finish(df)?;
        }
    }

    info!(path = %path.display(), rows = df.height(), "exported table");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<RollupEntry> {
        vec![
            RollupEntry {
                key: "Tools".into(),
                total_order_qty: 17,
                total_available_qty: 5,
            },
            RollupEntry {
                key: "Garden".into(),
                total_order_qty: 3,
                total_available_qty: 8,
            },
        ]
    }

    #[test]
    fn category_frame_has_named_columns() {
        let df = category_frame(&entries()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(
            df.get_column_names_str(),
            ["Category", "Total Order Quantity", "Total Available Quantity"]
        );
        let keys = df.column("Category").unwrap().str().unwrap();
        assert_eq!(keys.get(1), Some("Garden"));
    }

    #[test]
    fn warehouse_frame_appends_status_columns() {
        let entries = vec![WarehouseRollupEntry {
            rollup: RollupEntry {
                key: "North".into(),
                total_order_qty: 15,
                total_available_qty: 5,
            },
            shipped: 10,
            received: 0,
        }];
        let df = warehouse_frame(&entries).unwrap();
        assert_eq!(df.width(), 5);
        let shipped = df.column("Shipped Quantity").unwrap().u64().unwrap();
        assert_eq!(shipped.get(0), Some(10));
    }

    #[test]
    fn csv_export_uses_dataset_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut df = category_frame(&entries()).unwrap();
        let path = write_table(&mut df, dir.path(), "CategoryData", ExportFormat::Csv).unwrap();
        assert_eq!(path.file_name().unwrap(), "CategoryData.csv");

        let written = std::fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("Category,Total Order Quantity,Total Available Quantity")
        );
        assert_eq!(lines.next(), Some("Tools,17,5"));
    }

    #[test]
    fn parquet_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut df = category_frame(&entries()).unwrap();
        let path =
            write_table(&mut df, dir.path(), "CategoryData", ExportFormat::Parquet).unwrap();
        assert!(path.ends_with("CategoryData.parquet"));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn records_frame_renders_dates() {
        let records = vec![
            InventoryRecord::new("Tools", "Hammer")
                .with_quantities(10, 4)
                .with_status("Shipped")
                .with_order_date(45000.0),
            InventoryRecord::new("Tools", "Saw"),
        ];
        let df = records_frame(&records).unwrap();
        assert_eq!(df.height(), 2);
        let dates = df.column("OrderDate").unwrap().str().unwrap();
        assert_eq!(dates.get(0), Some("2023-03-15"));
        assert_eq!(dates.get(1), None);
        let status = df.column("Status").unwrap().str().unwrap();
        assert_eq!(status.get(0), Some("Shipped"));
    }

    #[test]
    fn records_frame_keeps_display_columns() {
        let mut hammer = InventoryRecord::new("Tools", "Hammer");
        hammer.details = vec![
            ("City".to_string(), "Oslo".to_string()),
            ("Profit".to_string(), "12.5".to_string()),
        ];
        let df = records_frame(&[hammer, InventoryRecord::new("Tools", "Saw")]).unwrap();

        let names = df.get_column_names_str();
        assert_eq!(names[names.len() - 2..], ["City", "Profit"]);
        let city = df.column("City").unwrap().str().unwrap();
        assert_eq!(city.get(0), Some("Oslo"));
        assert_eq!(city.get(1), None);
    }

    #[test]
    fn format_parsing() {
        assert_eq!(ExportFormat::parse("CSV").unwrap(), ExportFormat::Csv);
        assert!(ExportFormat::parse("xlsx").is_err());
    }
}

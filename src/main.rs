use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use inventory_lens::export::ExportFormat;
use inventory_lens::filter::DateRange;
use inventory_lens::{DashboardConfig, InventoryModel};

#[derive(Parser)]
#[command(name = "inventory-lens")]
#[command(about = "Inventory rollups, aging and backorder reports from a sheet export")]
struct Cli {
    /// Directory the data file is resolved against
    #[arg(long, default_value = "data")]
    base_path: PathBuf,

    /// Inventory sheet file name (CSV)
    #[arg(long, env = "INVENTORY_DATA_FILE", default_value = "inventoryData.csv")]
    data_file: String,

    /// Where exports and the report are written
    #[arg(long, env = "INVENTORY_OUTPUT_DIR", default_value = "exports")]
    output_dir: PathBuf,

    /// Reference time for aging, RFC 3339 (default: now)
    #[arg(long)]
    as_of: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Distinct counts and status totals, or one page of the summary table
    Summary {
        /// Summary-table page (1-based)
        #[arg(long)]
        page: Option<usize>,
    },
    /// Order and available totals per key
    Rollup {
        #[arg(value_enum)]
        by: RollupKey,
    },
    /// Shipped and received record counts
    Status,
    /// Backorder quantity per product in a category
    Backorders { category: String },
    /// Available quantity per age bucket
    Aging(AgingArgs),
    /// One page of the record table
    Records {
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// First order day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last order day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Write CategoryData and WarehouseData tables
    Export {
        #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
        format: FormatArg,
    },
    /// Write the printable HTML report
    Report {
        /// Category for the aging and backorder pages
        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct AgingArgs {
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    product: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum RollupKey {
    Category,
    Vendor,
    Warehouse,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Parquet,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Parquet => ExportFormat::Parquet,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig {
        base_path: cli.base_path,
        data_file: cli.data_file,
        output_dir: cli.output_dir,
        ..Default::default()
    };
    let now = cli.as_of.unwrap_or_else(Utc::now);

    let mut model = InventoryModel::new(config);
    let count = model
        .load(None)
        .with_context(|| format!("loading {}", model.config().data_path().display()))?;
    info!(records = count, "inventory loaded");

    match cli.command {
        Command::Summary { page: None } => print(&model.summary()?),
        Command::Summary { page: Some(page) } => print(&model.summary_table_page(page)?),
        Command::Rollup { by } => match by {
            RollupKey::Category => print(&model.category_rollup()?),
            RollupKey::Vendor => print(&model.vendor_rollup()?),
            RollupKey::Warehouse => print(&model.warehouse_rollup()?),
        },
        Command::Status => print(&model.status_counts()?),
        Command::Backorders { category } => print(&model.backorders(Some(&category))?),
        Command::Aging(args) => {
            let report = match (args.category, args.product) {
                (Some(category), _) => model.aging_by_category(Some(&category), now)?,
                (None, Some(product)) => model.aging_by_product(Some(&product), now)?,
                (None, None) => bail!("either --category or --product is required"),
            };
            print(&report)
        }
        Command::Records { page, from, to } => {
            print(&model.records_page(DateRange::new(from, to), page)?)
        }
        Command::Export { format } => {
            let paths = model.export_tables(format.into())?;
            print(&paths)
        }
        Command::Report { category } => {
            let path = model.save_report(category.as_deref(), now)?;
            print(&json!({ "report": path }))
        }
    }
}

fn print<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub mod aggregation;
pub mod config;
pub mod date;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod record;
pub mod schema;
pub mod visualization;

#[cfg(feature = "python")]
mod python;

pub use config::DashboardConfig;
pub use error::{InventoryError, Result};
pub use model::{InventoryModel, LoadState};
pub use record::{InventoryRecord, OrderStatus};

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<InventoryModel>()?;
    python::add_schema_exports(m)?;
    Ok(())
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Data not loaded: {0}")]
    NotLoaded(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    General(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("InvalidData: {0}")]
    InvalidData(String),

    #[error("Invalid date input: {0}")]
    InvalidDateInput(String),
}

pub type Result<T> = std::result::Result<T, InventoryError>;

#[cfg(feature = "python")]
impl From<InventoryError> for pyo3::PyErr {
    fn from(err: InventoryError) -> pyo3::PyErr {
        pyo3::exceptions::PyRuntimeError::new_err(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<pyo3::PyErr> for InventoryError {
    fn from(err: pyo3::PyErr) -> Self {
        InventoryError::General(err.to_string())
    }
}

use serde::Serialize;

use crate::schema::status;

/// Shipment status of an order line.
///
/// Only the two observed values are recognised; anything else is kept
/// verbatim and ignored by status counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OrderStatus {
    Shipped,
    Received,
    Other(String),
}

impl OrderStatus {
    /// Exact, case-sensitive match against the source values.
    pub fn parse(raw: &str) -> Self {
        match raw {
            status::SHIPPED => Self::Shipped,
            status::RECEIVED => Self::Received,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Shipped => status::SHIPPED,
            Self::Received => status::RECEIVED,
            Self::Other(raw) => raw,
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

/// One row of the inventory spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryRecord {
    pub category_name: String,
    pub product_name: String,
    pub vendor_name: String,
    pub warehouse_name: String,
    pub order_item_quantity: u64,
    pub available_quantity: u64,
    /// Spreadsheet date serial; `None` when the cell was blank or not numeric.
    pub order_date: Option<f64>,
    pub employee_hire_date: Option<f64>,
    pub status: OrderStatus,
    /// Display-only columns, in source order.
    pub details: Vec<(String, String)>,
}

impl InventoryRecord {
    pub fn new(category_name: impl Into<String>, product_name: impl Into<String>) -> Self {
        Self {
            category_name: category_name.into(),
            product_name: product_name.into(),
            ..Default::default()
        }
    }

    pub fn with_quantities(mut self, ordered: u64, available: u64) -> Self {
        self.order_item_quantity = ordered;
        self.available_quantity = available;
        self
    }

    pub fn with_vendor(mut self, vendor_name: impl Into<String>) -> Self {
        self.vendor_name = vendor_name.into();
        self
    }

    pub fn with_warehouse(mut self, warehouse_name: impl Into<String>) -> Self {
        self.warehouse_name = warehouse_name.into();
        self
    }

    pub fn with_status(mut self, raw: &str) -> Self {
        self.status = OrderStatus::parse(raw);
        self
    }

    pub fn with_order_date(mut self, serial: f64) -> Self {
        self.order_date = Some(serial);
        self
    }

    /// Shortfall of ordered over available stock, if any.
    pub fn backorder_quantity(&self) -> Option<u64> {
        (self.order_item_quantity > self.available_quantity)
            .then(|| self.order_item_quantity - self.available_quantity)
    }

    pub fn detail(&self, column: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

/// Quantity defaulting policy: the one conversion used for every quantity cell.
///
/// Trimmed text that parses to a finite, non-negative number is truncated to
/// an integer. Blank, non-numeric, negative and NaN cells all become 0.
pub fn coerce_quantity(raw: Option<&str>) -> u64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.trunc() as u64)
        .unwrap_or(0)
}

/// Column-name constants for the inventory spreadsheet and derived tables.
/// Single source of truth - exported to Python via PyO3.

// ── Source record columns ───────────────────────────────────────────────────
pub mod record {
    pub const CATEGORY_NAME: &str = "CategoryName";
    pub const PRODUCT_NAME: &str = "ProductName";
    pub const VENDOR_NAME: &str = "VendorName";
    pub const WAREHOUSE_NAME: &str = "WarehouseName";
    pub const ORDER_ITEM_QUANTITY: &str = "OrderItemQuantity";
    pub const AVAILABLE_QUANTITY: &str = "AvailableQuantity";
    /// Spelling used by the spreadsheet export; renamed to `AVAILABLE_QUANTITY` on load.
    pub const AVAILABLE_QUANTITY_LEGACY: &str = "AvaliableQuantity";
    pub const ORDER_DATE: &str = "OrderDate";
    pub const EMPLOYEE_HIRE_DATE: &str = "EmployeeHireDate";
    pub const STATUS: &str = "Status";

    pub const ALL: [&str; 10] = [
        CATEGORY_NAME,
        PRODUCT_NAME,
        VENDOR_NAME,
        WAREHOUSE_NAME,
        ORDER_ITEM_QUANTITY,
        AVAILABLE_QUANTITY,
        ORDER_DATE,
        EMPLOYEE_HIRE_DATE,
        STATUS,
        AVAILABLE_QUANTITY_LEGACY,
    ];
}

// ── Status values ───────────────────────────────────────────────────────────
pub mod status {
    pub const SHIPPED: &str = "Shipped";
    pub const RECEIVED: &str = "Received";
}

// ── Rollup table columns ────────────────────────────────────────────────────
pub mod rollup {
    pub const CATEGORY: &str = "Category";
    pub const VENDOR: &str = "Vendor";
    pub const WAREHOUSE: &str = "Warehouse";
    pub const TOTAL_ORDER_QTY: &str = "Total Order Quantity";
    pub const TOTAL_AVAILABLE_QTY: &str = "Total Available Quantity";
    pub const SHIPPED_QTY: &str = "Shipped Quantity";
    pub const RECEIVED_QTY: &str = "Received Quantity";
}

// ── Aging bucket labels ─────────────────────────────────────────────────────
pub mod aging {
    pub const DAYS_0_30: &str = "0-30 Days";
    pub const DAYS_31_60: &str = "31-60 Days";
    pub const DAYS_61_90: &str = "61-90 Days";
    pub const DAYS_91_120: &str = "91-120 Days";
    pub const OTHERS: &str = "Others";

    pub const ALL: [&str; 5] = [DAYS_0_30, DAYS_31_60, DAYS_61_90, DAYS_91_120, OTHERS];
}

// ── Export dataset names ────────────────────────────────────────────────────
pub mod export {
    pub const CATEGORY_DATA: &str = "CategoryData";
    pub const WAREHOUSE_DATA: &str = "WarehouseData";
    pub const REPORT_FILE: &str = "inventory-summary.html";
    pub const DEFAULT_SOURCE_FILE: &str = "inventoryData.csv";
}

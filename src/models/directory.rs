use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Customer: row of the `core_customer` dimension
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: String,
    pub customer_name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub segment: Option<String>,
    pub kyc_level: Option<String>,
    pub joined_date: Option<String>,
}

// ---------------------------------------------------------------------------
// Merchant: row of the `core_merchant` dimension
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Merchant {
    pub merchant_id: String,
    pub merchant_name: Option<String>,
    pub business_type: Option<String>,
    pub category: Option<String>,
    pub settlement_account: Option<String>,
    pub integration_type: Option<String>,
    /// Percentage of each transaction kept as commission.
    pub commission_rate: Option<Decimal>,
    pub is_active: Option<bool>,
}

impl Merchant {
    pub fn status_label(&self) -> &'static str {
        if self.is_active.unwrap_or(false) {
            "Active"
        } else {
            "Inactive"
        }
    }
}

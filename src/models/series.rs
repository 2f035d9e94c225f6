use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

// ---------------------------------------------------------------------------
// SeriesPoint: one day of the transaction trend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub bucket_key: NaiveDate,
    pub count: u64,
    pub amount_sum: Decimal,
    pub successful_count: u64,
    /// Percentage (0–100); serialized with two decimals.
    #[serde(serialize_with = "two_decimals")]
    pub success_rate: f64,
}

impl SeriesPoint {
    /// Success rate as shown on the chart tooltip, e.g. `"66.67"`.
    pub fn success_rate_label(&self) -> String {
        format!("{:.2}", self.success_rate)
    }

    pub fn chart_point(&self) -> ChartPoint {
        ChartPoint {
            x: self.bucket_key.format("%Y-%m-%d").to_string(),
            y: self.count,
        }
    }
}

fn two_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.2}", value))
}

// ---------------------------------------------------------------------------
// DistributionBucket: share of volume per category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionBucket {
    pub label: String,
    pub value_sum: Decimal,
    pub count: u64,
}

impl DistributionBucket {
    pub fn chart_slice(&self) -> ChartSlice {
        ChartSlice {
            name: self.label.clone(),
            value: self.value_sum.to_f64().unwrap_or(0.0),
        }
    }
}

// ---------------------------------------------------------------------------
// MerchantPerformancePoint: one day of a merchant's activity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantPerformancePoint {
    pub date: NaiveDate,
    pub volume: Decimal,
    pub commission: Decimal,
    pub successful: u64,
    pub failed: u64,
}

// ---------------------------------------------------------------------------
// Chart shapes
// ---------------------------------------------------------------------------

/// Line-chart point: `x` is the day, `y` the transaction count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: String,
    pub y: u64,
}

/// Pie/bar slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: f64,
}

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MetricTrends: period-over-period deltas
// ---------------------------------------------------------------------------

/// Percentage change of each headline metric against the previous window.
///
/// Values are exact; use [`format_trend`] for display.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricTrends {
    pub count_trend: f64,
    pub volume_trend: f64,
    pub users_trend: f64,
    pub success_rate_trend: f64,
}

// ---------------------------------------------------------------------------
// MetricsSnapshot: headline dashboard metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_count: u64,
    pub total_volume: Decimal,
    /// Row count standing in for active users. Not a distinct-customer
    /// count; see `distinct_customers`.
    pub active_users_proxy: u64,
    /// Distinct non-null customer references in the window.
    pub distinct_customers: u64,
    /// Successful rows as a percentage of all rows (0–100).
    pub success_rate: f64,
    pub trends: MetricTrends,
}

impl MetricsSnapshot {
    pub fn empty() -> Self {
        Self {
            total_count: 0,
            total_volume: Decimal::ZERO,
            active_users_proxy: 0,
            distinct_customers: 0,
            success_rate: 0.0,
            trends: MetricTrends::default(),
        }
    }

    /// The four dashboard cards, in display order.
    pub fn cards(&self, currency: &str) -> Vec<MetricCard> {
        vec![
            MetricCard::new("Total Transactions", self.total_count.to_string(), self.trends.count_trend),
            MetricCard::new(
                "Transaction Volume",
                format_volume(self.total_volume, currency),
                self.trends.volume_trend,
            ),
            MetricCard::new("Active Users", self.active_users_proxy.to_string(), self.trends.users_trend),
            MetricCard::new(
                "Success Rate",
                format!("{:.1}%", self.success_rate),
                self.trends.success_rate_trend,
            ),
        ]
    }
}

// ---------------------------------------------------------------------------
// MetricCard: display-ready metric
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCard {
    pub title: String,
    pub value: String,
    pub trend: f64,
}

impl MetricCard {
    pub fn new(title: &str, value: String, trend: f64) -> Self {
        Self {
            title: title.to_string(),
            value,
            trend,
        }
    }

    /// Arrow direction: flat counts as up.
    pub fn is_up(&self) -> bool {
        self.trend >= 0.0
    }

    /// Magnitude of the trend with one decimal, e.g. `"12.5%"`.
    pub fn trend_label(&self) -> String {
        format!("{}%", format_trend(self.trend.abs()))
    }
}

/// Round a trend to one decimal place for display.
pub fn format_trend(trend: f64) -> String {
    format!("{:.1}", trend)
}

/// Compact currency rendering: `GHS 1.2M`, `GHS 3.4K`, `GHS 12.00`.
pub fn format_volume(volume: Decimal, currency: &str) -> String {
    let value = volume.to_f64().unwrap_or(0.0);
    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        format!("{} {:.1}M", currency, value / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{} {:.1}K", currency, value / 1_000.0)
    } else {
        format!("{} {:.2}", currency, value)
    }
}

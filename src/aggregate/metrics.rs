//! Headline metrics and period-over-period trends.

use std::collections::HashSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{MetricTrends, MetricsSnapshot, TransactionRow};

/// Scalar totals of one window, before trends are attached.
#[derive(Debug, Clone, PartialEq)]
struct WindowTotals {
    count: u64,
    volume: Decimal,
    users_proxy: u64,
    distinct_customers: u64,
    success_rate: f64,
}

impl WindowTotals {
    fn of(rows: &[TransactionRow]) -> Self {
        let count = rows.len() as u64;
        let volume = saturating_sum(rows.iter().map(|r| r.amount));
        let successful = rows.iter().filter(|r| r.is_successful()).count() as u64;
        let distinct_customers = rows
            .iter()
            .filter_map(|r| r.customer_ref.as_deref())
            .collect::<HashSet<_>>()
            .len() as u64;

        Self {
            count,
            volume,
            // Row count, not distinct customers.
            users_proxy: count,
            distinct_customers,
            success_rate: success_rate(successful, count),
        }
    }
}

/// Compute the dashboard metrics for `current`, with trends against
/// `previous`.
///
/// Total over any input: empty windows produce zeroed metrics and a zero
/// baseline produces a zero trend. Volumes saturate at `Decimal::MAX` /
/// `Decimal::MIN` rather than overflow.
pub fn aggregate(current: &[TransactionRow], previous: &[TransactionRow]) -> MetricsSnapshot {
    let now = WindowTotals::of(current);
    let before = WindowTotals::of(previous);

    MetricsSnapshot {
        total_count: now.count,
        total_volume: now.volume,
        active_users_proxy: now.users_proxy,
        distinct_customers: now.distinct_customers,
        success_rate: now.success_rate,
        trends: MetricTrends {
            count_trend: trend(now.count as f64, before.count as f64),
            volume_trend: decimal_trend(now.volume, before.volume),
            users_trend: trend(now.users_proxy as f64, before.users_proxy as f64),
            success_rate_trend: trend(now.success_rate, before.success_rate),
        },
    }
}

/// Percentage change from `previous` to `current`; 0 when `previous` is 0.
pub fn trend(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }
    (current - previous) / previous * 100.0
}

/// [`trend`] over exact decimals.
///
/// Falls back to the `f64` computation when the exact ratio does not fit
/// in a `Decimal`.
pub fn decimal_trend(current: Decimal, previous: Decimal) -> f64 {
    if previous.is_zero() {
        return 0.0;
    }
    current
        .checked_sub(previous)
        .and_then(|delta| delta.checked_div(previous))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|pct| pct.to_f64())
        .unwrap_or_else(|| {
            trend(
                current.to_f64().unwrap_or(0.0),
                previous.to_f64().unwrap_or(0.0),
            )
        })
}

/// Sum of `amounts`, clamped to the `Decimal` range.
pub fn saturating_sum<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |acc, amount| acc.saturating_add(amount))
}

/// `successful / total` as a percentage; 0 for an empty window.
pub fn success_rate(successful: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    successful as f64 / total as f64 * 100.0
}

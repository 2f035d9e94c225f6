//! Bucketing of transaction rows into chart series.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::metrics::success_rate;
use crate::models::{DistributionBucket, MerchantPerformancePoint, SeriesPoint, TransactionRow};

// Amount sums in this module saturate at the `Decimal` bounds instead of
// overflowing.

/// Label for rows whose grouping field is missing.
pub const UNKNOWN_LABEL: &str = "unknown";

#[derive(Debug, Default)]
struct DayAccumulator {
    count: u64,
    amount_sum: Decimal,
    successful: u64,
}

impl DayAccumulator {
    fn into_point(self, day: NaiveDate) -> SeriesPoint {
        SeriesPoint {
            bucket_key: day,
            count: self.count,
            amount_sum: self.amount_sum,
            successful_count: self.successful,
            success_rate: success_rate(self.successful, self.count),
        }
    }
}

// ---------------------------------------------------------------------------
// Daily trend
// ---------------------------------------------------------------------------

/// Group rows by calendar day.
///
/// Buckets are returned in ascending date order regardless of input order.
pub fn bucketize_by_date(rows: &[TransactionRow]) -> Vec<SeriesPoint> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for row in rows {
        let acc = days.entry(row.occurred_on).or_default();
        acc.count += 1;
        acc.amount_sum = acc.amount_sum.saturating_add(row.amount);
        if row.is_successful() {
            acc.successful += 1;
        }
    }
    days.into_iter()
        .map(|(day, acc)| acc.into_point(day))
        .collect()
}

/// Merge points sharing a bucket key and recompute their success rate.
///
/// The output of [`bucketize_by_date`] is a fixed point of this function.
pub fn regroup_series(points: &[SeriesPoint]) -> Vec<SeriesPoint> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for point in points {
        let acc = days.entry(point.bucket_key).or_default();
        acc.count += point.count;
        acc.amount_sum = acc.amount_sum.saturating_add(point.amount_sum);
        acc.successful += point.successful_count;
    }
    days.into_iter()
        .map(|(day, acc)| acc.into_point(day))
        .collect()
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// Volume per payment channel, largest first.
pub fn bucketize_by_channel(rows: &[TransactionRow]) -> Vec<DistributionBucket> {
    distribution(rows, |r| r.payment_channel.as_deref())
}

/// Volume per payment type, largest first.
pub fn bucketize_by_payment_type(rows: &[TransactionRow]) -> Vec<DistributionBucket> {
    distribution(rows, |r| r.payment_type.as_deref())
}

/// Sum amounts per label and sort descending by sum.
///
/// Equal sums keep the order in which their labels first appeared.
fn distribution<F>(rows: &[TransactionRow], label_of: F) -> Vec<DistributionBucket>
where
    F: Fn(&TransactionRow) -> Option<&str>,
{
    let mut buckets: Vec<DistributionBucket> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let label = label_of(row).unwrap_or(UNKNOWN_LABEL);
        let slot = match index.get(label) {
            Some(&i) => i,
            None => {
                buckets.push(DistributionBucket {
                    label: label.to_string(),
                    value_sum: Decimal::ZERO,
                    count: 0,
                });
                index.insert(label.to_string(), buckets.len() - 1);
                buckets.len() - 1
            }
        };
        let bucket = &mut buckets[slot];
        bucket.value_sum = bucket.value_sum.saturating_add(row.amount);
        bucket.count += 1;
    }

    buckets.sort_by(|a, b| b.value_sum.cmp(&a.value_sum));
    buckets
}

// ---------------------------------------------------------------------------
// Merchant performance
// ---------------------------------------------------------------------------

/// Daily volume, commission and outcome counts for one merchant's rows.
///
/// `commission_rate` is a percentage; volume and commission saturate at
/// the `Decimal` bounds. Rows that are not successful,
/// including rows without a status, count as failed.
pub fn merchant_performance(
    rows: &[TransactionRow],
    commission_rate: Decimal,
) -> Vec<MerchantPerformancePoint> {
    let rate = commission_rate / Decimal::ONE_HUNDRED;
    let mut days: BTreeMap<NaiveDate, MerchantPerformancePoint> = BTreeMap::new();

    for row in rows {
        let point = days
            .entry(row.occurred_on)
            .or_insert_with(|| MerchantPerformancePoint {
                date: row.occurred_on,
                volume: Decimal::ZERO,
                commission: Decimal::ZERO,
                successful: 0,
                failed: 0,
            });
        point.volume = point.volume.saturating_add(row.amount);
        point.commission = point
            .commission
            .saturating_add(row.amount.saturating_mul(rate));
        if row.is_successful() {
            point.successful += 1;
        } else {
            point.failed += 1;
        }
    }

    days.into_values().collect()
}

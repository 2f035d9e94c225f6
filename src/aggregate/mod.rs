//! Pure aggregation of transaction rows into dashboard values.
//!
//! Every function here is a single pass over the rows it is given. Nothing
//! performs I/O, keeps state between calls or returns an error.

pub mod metrics;
pub mod series;

pub use metrics::{aggregate, decimal_trend, saturating_sum, success_rate, trend};
pub use series::{
    bucketize_by_channel, bucketize_by_date, bucketize_by_payment_type, merchant_performance,
    regroup_series, UNKNOWN_LABEL,
};

//! Dashboard views: fetch rows from a [`RowSource`] and run them through the
//! aggregation pipeline.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregate;
use crate::error::Result;
use crate::models::{
    ChartPoint, ChartSlice, DateRange, DistributionBucket, MerchantPerformancePoint,
    MetricsSnapshot, SeriesPoint,
};
use crate::source::{RowFilter, RowSource};

// ---------------------------------------------------------------------------
// DashboardData
// ---------------------------------------------------------------------------

/// Everything the overview page renders for one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub range: DateRange,
    pub metrics: MetricsSnapshot,
    pub trends: Vec<SeriesPoint>,
    pub distribution: Vec<DistributionBucket>,
}

impl DashboardData {
    pub fn chart_points(&self) -> Vec<ChartPoint> {
        self.trends.iter().map(SeriesPoint::chart_point).collect()
    }

    pub fn chart_slices(&self) -> Vec<ChartSlice> {
        self.distribution
            .iter()
            .map(DistributionBucket::chart_slice)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// DashboardQuery
// ---------------------------------------------------------------------------

/// Dashboard computations over any row source.
pub struct DashboardQuery<'a> {
    source: &'a dyn RowSource,
}

impl<'a> DashboardQuery<'a> {
    pub fn new(source: &'a dyn RowSource) -> Self {
        Self { source }
    }

    /// Headline metrics for `range`, with trends against the window of the
    /// same length immediately before it.
    pub fn metrics(&self, range: &DateRange) -> Result<MetricsSnapshot> {
        self.metrics_filtered(&RowFilter::new(*range))
    }

    /// [`metrics`](Self::metrics) with additional equality filters.
    pub fn metrics_filtered(&self, filter: &RowFilter) -> Result<MetricsSnapshot> {
        let current = self.source.fetch_rows(filter)?;
        let previous = self
            .source
            .fetch_rows(&filter.with_range(filter.range.previous()))?;
        Ok(aggregate::aggregate(&current, &previous))
    }

    /// Daily transaction series, oldest day first.
    pub fn trends(&self, range: &DateRange) -> Result<Vec<SeriesPoint>> {
        let rows = self.source.fetch_rows(&RowFilter::new(*range))?;
        Ok(aggregate::bucketize_by_date(&rows))
    }

    /// Volume per payment channel, largest first.
    pub fn payment_distribution(&self, range: &DateRange) -> Result<Vec<DistributionBucket>> {
        let rows = self.source.fetch_rows(&RowFilter::new(*range))?;
        Ok(aggregate::bucketize_by_channel(&rows))
    }

    /// Volume per payment type, largest first.
    pub fn payment_type_distribution(
        &self,
        range: &DateRange,
    ) -> Result<Vec<DistributionBucket>> {
        let rows = self.source.fetch_rows(&RowFilter::new(*range))?;
        Ok(aggregate::bucketize_by_payment_type(&rows))
    }

    /// Daily performance of one merchant. `commission_rate` is a percentage.
    pub fn merchant_performance(
        &self,
        merchant_id: &str,
        range: &DateRange,
        commission_rate: Decimal,
    ) -> Result<Vec<MerchantPerformancePoint>> {
        let rows = self
            .source
            .fetch_rows(&RowFilter::new(*range).merchant(merchant_id))?;
        Ok(aggregate::merchant_performance(&rows, commission_rate))
    }

    /// Metrics, trend and distribution for `range`.
    ///
    /// Any failed fetch fails the whole load.
    pub fn load(&self, range: &DateRange) -> Result<DashboardData> {
        let filter = RowFilter::new(*range);
        let current = self.source.fetch_rows(&filter)?;
        let previous = self.source.fetch_rows(&filter.with_range(range.previous()))?;

        Ok(DashboardData {
            range: *range,
            metrics: aggregate::aggregate(&current, &previous),
            trends: aggregate::bucketize_by_date(&current),
            distribution: aggregate::bucketize_by_channel(&current),
        })
    }
}

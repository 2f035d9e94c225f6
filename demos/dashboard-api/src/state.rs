/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// Dispatches blocking SDK work to the blocking thread pool.
    pub sdk: paydash_sdk::AsyncDashboardSdk,

    /// Currency code for the metric cards.
    pub currency: String,
}

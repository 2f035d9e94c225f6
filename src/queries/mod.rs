//! Query modules for the dashboard SDK.
//!
//! Each query struct borrows from a [`Connection`](crate::connection::Connection)
//! (or, for [`DashboardQuery`], any [`RowSource`](crate::source::RowSource))
//! and returns typed models.

pub mod customers;
pub mod dashboard;
pub mod merchants;
pub mod transactions;

pub use customers::CustomerQuery;
pub use dashboard::{DashboardData, DashboardQuery};
pub use merchants::MerchantQuery;
pub use transactions::TransactionQuery;

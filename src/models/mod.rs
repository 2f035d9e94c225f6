pub mod directory;
pub mod metrics;
pub mod range;
pub mod series;
pub mod transaction;

pub use directory::*;
pub use metrics::*;
pub use range::*;
pub use series::*;
pub use transaction::*;

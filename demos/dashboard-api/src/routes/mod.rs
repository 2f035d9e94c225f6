pub mod dashboard;
pub mod directory;

use paydash_sdk::models::RangePreset;
use serde::Deserialize;

/// `?range=last7` style preset selection; unknown names mean `last30`.
#[derive(Deserialize)]
pub struct RangeParams {
    pub range: Option<String>,
}

impl RangeParams {
    pub fn preset(&self) -> RangePreset {
        self.range
            .as_deref()
            .map(RangePreset::from_name)
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

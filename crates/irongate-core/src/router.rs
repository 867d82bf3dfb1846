//! Router: a pure function of (score, thresholds).

use irongate_types::RouteThresholds;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Passthrough,
    CloudMasked,
    PrivateLlm,
}

pub fn route(score: u8, thresholds: RouteThresholds) -> Route {
    if score <= thresholds.passthrough_max {
        Route::Passthrough
    } else if score <= thresholds.cloud_masked_max {
        Route::CloudMasked
    } else {
        Route::PrivateLlm
    }
}

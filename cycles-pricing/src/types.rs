use candid::{CandidType, Deserialize, Nat};

use crate::error::Result;

/// Amount of cycles one ICP buys unless configured otherwise.
pub const CYCLES_PER_ICP: u64 = 10_000_000_000_000;

/// Number of e8s in one ICP.
pub const E8S_PER_ICP: u64 = 100_000_000;

/// Number of usage samples the moving average is computed over unless configured otherwise.
pub const DEFAULT_USAGE_WINDOW: u64 = 30;

/// Largest accepted usage window.
pub const MAX_USAGE_WINDOW: u64 = 10_000;

/// ICP amount in 10^-8 units.
pub type IcpE8s = u64;

/// IC time in nanoseconds since the epoch.
pub type Timestamp = u64;

/// Tagged result of the `calculate_cycles` and `purchase_cycles` endpoints.
///
/// Encodes as `variant { ok : nat; err : text }`.
#[derive(CandidType, Debug, Clone, Deserialize, PartialEq, Eq)]
pub enum CyclesResult {
    #[serde(rename = "ok")]
    Ok(Nat),
    #[serde(rename = "err")]
    Err(String),
}

impl From<Result<Nat>> for CyclesResult {
    fn from(result: Result<Nat>) -> Self {
        match result {
            Ok(cycles) => Self::Ok(cycles),
            Err(e) => Self::Err(e.to_string()),
        }
    }
}

#[derive(CandidType, Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AccountBalance {
    pub icp_e8s: IcpE8s,
    pub cycles: Nat,
}

/// Snapshot of the pricing configuration and usage statistics.
#[derive(CandidType, Debug, Clone, Deserialize, PartialEq)]
pub struct PricingInfo {
    /// Current USD price of one ICP, if set.
    pub icp_price: Option<f64>,

    /// Cycles credited for one ICP.
    pub cycles_per_icp: u64,

    /// IC time of the last price update.
    pub price_updated_at: Option<Timestamp>,

    /// Moving average of the recorded usage samples.
    pub average_usage: f64,

    /// Number of samples the average currently covers.
    pub usage_samples: u64,

    /// Maximum number of samples the average covers.
    pub usage_window: u64,
}

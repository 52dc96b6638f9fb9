use candid::{CandidType, Deserialize};

use crate::error::{CyclesError, Result};
use crate::types::Timestamp;

/// Returns true if the value can be used as an ICP price.
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// The ICP/USD price set by the shop controller. Only the current value is kept.
#[derive(CandidType, Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PricingState {
    icp_price: Option<f64>,
    updated_at: Option<Timestamp>,
}

impl PricingState {
    pub fn new(icp_price: Option<f64>, now: Timestamp) -> Result<Self> {
        let mut state = Self::default();
        if let Some(price) = icp_price {
            state.set_icp_price(price, now)?;
        }

        Ok(state)
    }

    /// The price as it was set, or `None` if it was never set.
    pub fn icp_price(&self) -> Option<f64> {
        self.icp_price
    }

    /// The price usable for conversions.
    pub fn current_price(&self) -> Result<f64> {
        self.icp_price
            .filter(|price| is_valid_price(*price))
            .ok_or(CyclesError::PriceUnavailable)
    }

    pub fn updated_at(&self) -> Option<Timestamp> {
        self.updated_at
    }

    /// Replaces the stored price. The state is left untouched if the price is rejected.
    pub fn set_icp_price(&mut self, price: f64, now: Timestamp) -> Result<()> {
        if !is_valid_price(price) {
            return Err(CyclesError::InvalidPrice(price));
        }

        self.icp_price = Some(price);
        self.updated_at = Some(now);
        Ok(())
    }
}

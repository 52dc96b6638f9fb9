use candid::{CandidType, Deserialize, Nat};
use num_bigint::BigUint;
use num_traits::FromPrimitive;

use crate::error::{CyclesError, Result};
use crate::price::is_valid_price;
use crate::types::CYCLES_PER_ICP;

/// Converts USD and ICP amounts into cycles.
///
/// The calculation is the same for both currencies: a USD amount is first converted into ICP
/// using the price, and the ICP amount is then multiplied by the cycles-per-ICP rate. Fractions
/// of a cycle are truncated.
#[derive(CandidType, Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct CyclesCalculator {
    cycles_per_icp: u64,
}

impl Default for CyclesCalculator {
    fn default() -> Self {
        Self {
            cycles_per_icp: CYCLES_PER_ICP,
        }
    }
}

impl CyclesCalculator {
    pub fn new(cycles_per_icp: u64) -> Result<Self> {
        if cycles_per_icp == 0 {
            return Err(CyclesError::InvalidConfig(
                "cycles per ICP rate must be positive".into(),
            ));
        }

        Ok(Self { cycles_per_icp })
    }

    pub fn cycles_per_icp(&self) -> u64 {
        self.cycles_per_icp
    }

    /// Computes the amount of cycles for the `amount` of USD (`is_icp == false`) or ICP
    /// (`is_icp == true`).
    ///
    /// The price is only consulted for USD amounts. If it is not set or is not positive,
    /// [`CyclesError::PriceUnavailable`] is returned.
    pub fn calculate(&self, amount: f64, is_icp: bool, price: Option<f64>) -> Result<Nat> {
        let icp = icp_amount(amount, is_icp, price)?;
        self.cycles_for_icp(icp)
    }

    /// Computes the amount of cycles for the given amount of ICP.
    pub fn cycles_for_icp(&self, icp: f64) -> Result<Nat> {
        validate_amount(icp)?;

        let cycles = (icp * self.cycles_per_icp as f64).floor();
        if !cycles.is_finite() {
            return Err(CyclesError::InvalidAmount(format!(
                "{icp} ICP is out of the supported range"
            )));
        }

        if cycles < 1.0 {
            return Err(CyclesError::InvalidAmount(format!(
                "{icp} ICP is worth less than one cycle"
            )));
        }

        BigUint::from_f64(cycles).map(Nat).ok_or_else(|| {
            CyclesError::InvalidAmount(format!("{icp} ICP cannot be converted to cycles"))
        })
    }
}

/// Converts the `amount` into ICP. ICP amounts are returned as is, after validation.
pub fn icp_amount(amount: f64, is_icp: bool, price: Option<f64>) -> Result<f64> {
    validate_amount(amount)?;

    if is_icp {
        return Ok(amount);
    }

    let price = price
        .filter(|price| is_valid_price(*price))
        .ok_or(CyclesError::PriceUnavailable)?;

    Ok(amount / price)
}

fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(CyclesError::InvalidAmount(format!(
            "{amount} is not a positive finite number"
        )))
    }
}

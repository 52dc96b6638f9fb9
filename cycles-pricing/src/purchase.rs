use candid::{CandidType, Deserialize, Nat, Principal};

use crate::calculator::CyclesCalculator;
use crate::error::{CyclesError, Result};
use crate::ledger::Ledger;
use crate::price::PricingState;
use crate::types::{IcpE8s, E8S_PER_ICP};

/// Outcome of a successful purchase.
#[derive(CandidType, Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Purchase {
    pub cycles: Nat,
    pub icp_cost_e8s: IcpE8s,
}

/// Buys cycles for `buyer`, paying with the buyer's ICP balance in the `ledger`.
///
/// A purchase is always priced against a set ICP price, even if the amount is given in ICP.
/// Every check is done before the ledger is touched, and the ICP debit is refunded if the cycles
/// cannot be credited, so a failed purchase leaves the ledger as it was.
///
/// The operation is not idempotent: every successful call is a new purchase.
pub fn purchase_cycles<L: Ledger>(
    calculator: &CyclesCalculator,
    pricing: &PricingState,
    ledger: &mut L,
    buyer: Principal,
    amount: f64,
    is_icp: bool,
) -> Result<Purchase> {
    let price = pricing.current_price()?;
    let icp = crate::calculator::icp_amount(amount, is_icp, Some(price))?;
    let cycles = calculator.cycles_for_icp(icp)?;
    let icp_cost_e8s = icp_to_e8s(icp)?;

    ledger.debit_icp(buyer, icp_cost_e8s)?;

    if let Err(credit_error) = ledger.credit_cycles(buyer, &cycles) {
        log::error!("Failed to credit {cycles} cycles to {buyer}: {credit_error}");
        return match ledger.credit_icp(buyer, icp_cost_e8s) {
            Ok(_) => Err(CyclesError::LedgerFailure(credit_error.to_string())),
            Err(refund_error) => Err(CyclesError::LedgerFailure(format!(
                "{credit_error}; refund of {icp_cost_e8s} e8s failed: {refund_error}"
            ))),
        };
    }

    Ok(Purchase {
        cycles,
        icp_cost_e8s,
    })
}

/// Rounds the ICP amount up to whole e8s.
fn icp_to_e8s(icp: f64) -> Result<IcpE8s> {
    let e8s = (icp * E8S_PER_ICP as f64).ceil();
    if !e8s.is_finite() || e8s >= u64::MAX as f64 {
        return Err(CyclesError::InvalidAmount(format!(
            "{icp} ICP exceeds the maximum payment"
        )));
    }

    Ok((e8s as IcpE8s).max(1))
}

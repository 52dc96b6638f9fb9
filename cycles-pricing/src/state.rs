use candid::{CandidType, Deserialize, Nat, Principal};

use crate::calculator::CyclesCalculator;
use crate::error::{CyclesError, Result};
use crate::ledger::{AccountLedger, Ledger};
use crate::price::PricingState;
use crate::purchase::{purchase_cycles, Purchase};
use crate::types::{
    AccountBalance, IcpE8s, PricingInfo, Timestamp, CYCLES_PER_ICP, DEFAULT_USAGE_WINDOW,
};
use crate::usage::UsageTracker;

/// Validated configuration of a new shop.
#[derive(Debug, Clone, PartialEq)]
pub struct ShopConfig {
    pub controller: Principal,
    pub icp_price: Option<f64>,
    pub cycles_per_icp: u64,
    pub usage_window: u64,
}

impl ShopConfig {
    pub fn new(controller: Principal) -> Self {
        Self {
            controller,
            icp_price: None,
            cycles_per_icp: CYCLES_PER_ICP,
            usage_window: DEFAULT_USAGE_WINDOW,
        }
    }
}

/// Serializable form of the [`ShopState`].
#[derive(CandidType, Debug, Clone, Deserialize, PartialEq)]
pub struct ShopSnapshot {
    pub controller: Principal,
    pub calculator: CyclesCalculator,
    pub pricing: PricingState,
    pub usage_window: u64,
    pub usage_samples: Vec<Nat>,
    pub ledger: AccountLedger,
}

/// All of the shop state: the price, the usage statistics and the accounts.
#[derive(Debug)]
pub struct ShopState {
    controller: Principal,
    calculator: CyclesCalculator,
    pricing: PricingState,
    usage: UsageTracker,
    ledger: AccountLedger,
}

impl ShopState {
    pub fn new(config: ShopConfig, now: Timestamp) -> Result<Self> {
        Ok(Self {
            controller: config.controller,
            calculator: CyclesCalculator::new(config.cycles_per_icp)?,
            pricing: PricingState::new(config.icp_price, now)?,
            usage: UsageTracker::new(config.usage_window)?,
            ledger: AccountLedger::default(),
        })
    }

    pub fn restore(snapshot: ShopSnapshot) -> Result<Self> {
        Ok(Self {
            controller: snapshot.controller,
            calculator: snapshot.calculator,
            pricing: snapshot.pricing,
            usage: UsageTracker::from_samples(snapshot.usage_window, snapshot.usage_samples)?,
            ledger: snapshot.ledger,
        })
    }

    pub fn snapshot(&self) -> ShopSnapshot {
        ShopSnapshot {
            controller: self.controller,
            calculator: self.calculator,
            pricing: self.pricing.clone(),
            usage_window: self.usage.window(),
            usage_samples: self.usage.samples(),
            ledger: self.ledger.clone(),
        }
    }

    pub fn controller(&self) -> Principal {
        self.controller
    }

    pub fn authorize_controller(&mut self, caller: Principal) -> Result<Authorized<Controller>> {
        if caller == self.controller {
            Ok(Authorized::<Controller<'_>> {
                auth: Controller { state: self },
            })
        } else {
            Err(CyclesError::Unauthorized(caller.to_string()))
        }
    }

    pub fn icp_price(&self) -> Option<f64> {
        self.pricing.icp_price()
    }

    pub fn update_icp_price(
        &mut self,
        caller: Principal,
        price: f64,
        now: Timestamp,
    ) -> Result<()> {
        self.authorize_controller(caller)?.set_icp_price(price, now)
    }

    pub fn average_usage(&self) -> f64 {
        self.usage.average()
    }

    pub fn record_usage(&mut self, caller: Principal, sample: Nat) -> Result<()> {
        self.authorize_controller(caller)?.record_usage(sample);
        Ok(())
    }

    pub fn calculate_cycles(&self, amount: f64, is_icp: bool) -> Result<Nat> {
        let result = self
            .calculator
            .calculate(amount, is_icp, self.pricing.icp_price());
        if let Err(e) = &result {
            log::debug!("Cycles calculation for {amount} (is_icp: {is_icp}) rejected: {e}");
        }

        result
    }

    pub fn purchase_cycles(
        &mut self,
        buyer: Principal,
        amount: f64,
        is_icp: bool,
    ) -> Result<Purchase> {
        let result = purchase_cycles(
            &self.calculator,
            &self.pricing,
            &mut self.ledger,
            buyer,
            amount,
            is_icp,
        );

        match &result {
            Ok(purchase) => log::info!(
                "{buyer} purchased {} cycles for {} e8s",
                purchase.cycles,
                purchase.icp_cost_e8s
            ),
            Err(e) => log::warn!("Purchase of {amount} (is_icp: {is_icp}) by {buyer} failed: {e}"),
        }

        result
    }

    pub fn balance_of(&self, owner: &Principal) -> AccountBalance {
        self.ledger.balance_of(owner)
    }

    pub fn deposit_icp(
        &mut self,
        caller: Principal,
        to: Principal,
        amount: IcpE8s,
    ) -> Result<AccountBalance> {
        self.authorize_controller(caller)?.deposit_icp(to, amount)
    }

    pub fn set_controller(&mut self, caller: Principal, controller: Principal) -> Result<()> {
        self.authorize_controller(caller)?.set_controller(controller);
        Ok(())
    }

    pub fn pricing_info(&self) -> PricingInfo {
        PricingInfo {
            icp_price: self.pricing.icp_price(),
            cycles_per_icp: self.calculator.cycles_per_icp(),
            price_updated_at: self.pricing.updated_at(),
            average_usage: self.usage.average(),
            usage_samples: self.usage.len() as u64,
            usage_window: self.usage.window(),
        }
    }
}

/// A wrapper that helps us separate controller methods with a
/// compile-time check that a non-controller cannot access them.
pub struct Authorized<T> {
    auth: T,
}

pub struct Controller<'a> {
    state: &'a mut ShopState,
}

impl<'a> Authorized<Controller<'a>> {
    pub fn set_icp_price(&mut self, price: f64, now: Timestamp) -> Result<()> {
        self.auth.state.pricing.set_icp_price(price, now)?;
        log::info!("ICP price set to {price} USD");
        Ok(())
    }

    pub fn record_usage(&mut self, sample: Nat) {
        log::debug!("Recording usage sample {sample}");
        self.auth.state.usage.record(sample);
    }

    pub fn deposit_icp(&mut self, to: Principal, amount: IcpE8s) -> Result<AccountBalance> {
        if amount == 0 {
            return Err(CyclesError::InvalidAmount(
                "deposit must be a positive amount of e8s".into(),
            ));
        }

        self.auth.state.ledger.credit_icp(to, amount)?;
        log::info!("Deposited {amount} e8s to {to}");
        Ok(self.auth.state.ledger.balance_of(&to))
    }

    pub fn set_controller(&mut self, controller: Principal) {
        log::info!("Shop controller changed to {controller}");
        self.auth.state.controller = controller;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::E8S_PER_ICP;

    fn controller() -> Principal {
        Principal::from_slice(&[1; 29])
    }

    fn user() -> Principal {
        Principal::from_slice(&[2; 29])
    }

    fn shop() -> ShopState {
        ShopState::new(ShopConfig::new(controller()), 0).unwrap()
    }

    #[test]
    fn new_shop_has_no_price() {
        let shop = shop();
        assert_eq!(shop.icp_price(), None);
        assert_eq!(shop.average_usage(), 0.0);
        assert_eq!(
            shop.calculate_cycles(10.0, false),
            Err(CyclesError::PriceUnavailable)
        );
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ShopConfig {
            usage_window: 0,
            ..ShopConfig::new(controller())
        };
        assert!(matches!(
            ShopState::new(config, 0),
            Err(CyclesError::InvalidConfig(_))
        ));

        let config = ShopConfig {
            icp_price: Some(0.0),
            ..ShopConfig::new(controller())
        };
        assert!(matches!(
            ShopState::new(config, 0),
            Err(CyclesError::InvalidPrice(_))
        ));
    }

    #[test]
    fn controller_updates_price() {
        let mut shop = shop();
        shop.update_icp_price(controller(), 7.5, 100).unwrap();
        assert_eq!(shop.icp_price(), Some(7.5));
        assert_eq!(shop.pricing_info().price_updated_at, Some(100));
        assert_eq!(
            shop.calculate_cycles(10.0, false),
            Ok(Nat::from(13_333_333_333_333u64))
        );
    }

    #[test]
    fn only_controller_administers() {
        let mut shop = shop();
        assert_eq!(
            shop.update_icp_price(user(), 7.5, 0),
            Err(CyclesError::Unauthorized(user().to_string()))
        );
        assert_eq!(
            shop.record_usage(user(), Nat::from(5u64)),
            Err(CyclesError::Unauthorized(user().to_string()))
        );
        assert!(matches!(
            shop.deposit_icp(user(), user(), 10),
            Err(CyclesError::Unauthorized(_))
        ));
        assert!(matches!(
            shop.set_controller(user(), user()),
            Err(CyclesError::Unauthorized(_))
        ));

        assert_eq!(shop.icp_price(), None);
        assert_eq!(shop.average_usage(), 0.0);
        assert_eq!(shop.controller(), controller());
    }

    #[test]
    fn controller_can_be_handed_over() {
        let mut shop = shop();
        shop.set_controller(controller(), user()).unwrap();
        assert_eq!(shop.controller(), user());
        assert!(shop.update_icp_price(controller(), 1.0, 0).is_err());
        assert!(shop.update_icp_price(user(), 1.0, 0).is_ok());
    }

    #[test]
    fn usage_is_averaged() {
        let mut shop = shop();
        for sample in [4u64, 8, 12] {
            shop.record_usage(controller(), Nat::from(sample)).unwrap();
        }
        assert_eq!(shop.average_usage(), 8.0);
        assert_eq!(shop.pricing_info().usage_samples, 3);
    }

    #[test]
    fn zero_deposit_is_rejected() {
        let mut shop = shop();
        assert!(matches!(
            shop.deposit_icp(controller(), user(), 0),
            Err(CyclesError::InvalidAmount(_))
        ));
        assert_eq!(shop.balance_of(&user()), AccountBalance::default());
    }

    #[test]
    fn purchase_after_deposit() {
        let mut shop = shop();
        shop.update_icp_price(controller(), 7.5, 0).unwrap();
        shop.deposit_icp(controller(), user(), E8S_PER_ICP).unwrap();

        let purchase = shop.purchase_cycles(user(), 7.5, false).unwrap();
        assert_eq!(purchase.cycles, Nat::from(10_000_000_000_000u64));
        assert_eq!(
            shop.balance_of(&user()),
            AccountBalance {
                icp_e8s: 0,
                cycles: Nat::from(10_000_000_000_000u64),
            }
        );
    }

    #[test]
    fn snapshot_restores_state() {
        let mut shop = shop();
        shop.update_icp_price(controller(), 3.25, 9).unwrap();
        shop.record_usage(controller(), Nat::from(70u64)).unwrap();
        shop.deposit_icp(controller(), user(), 42).unwrap();

        let snapshot = shop.snapshot();
        let restored = ShopState::restore(snapshot.clone()).unwrap();

        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.pricing_info(), shop.pricing_info());
        assert_eq!(restored.balance_of(&user()).icp_e8s, 42);
    }
}

use candid::{Nat, Principal};
use cycles_log::{Logs, Pagination};
use cycles_pricing::{AccountBalance, CyclesError, CyclesResult, PricingInfo, ShopState};
use ic_cdk::api::{caller, time};
use ic_cdk_macros::{init, post_upgrade, pre_upgrade, query, update};

use crate::config::InitArgs;
use crate::stable::{self, StableShopState};
use crate::state;

#[init]
fn init(args: Option<InitArgs>) {
    let args = args.unwrap_or_default();
    state::init_logger(args.log_settings());

    let config = args.shop_config(caller());
    let controller = config.controller;
    match ShopState::new(config, time()) {
        Ok(shop) => state::reset(shop),
        Err(e) => ic_cdk::trap(&format!("Invalid init arguments: {e}")),
    }

    log::info!("Cycles shop initialized, controller: {controller}");
}

#[pre_upgrade]
fn pre_upgrade() {
    if let Err(e) = stable::write(&state::stable_state()) {
        ic_cdk::trap(&format!("Failed to write the state to stable memory: {e}"));
    }
}

#[post_upgrade]
fn post_upgrade() {
    let StableShopState { shop, log_settings } = match stable::read::<StableShopState>() {
        Ok(stored) => stored,
        Err(e) => ic_cdk::trap(&format!("Failed to read the state from stable memory: {e}")),
    };

    state::init_logger(log_settings);
    match ShopState::restore(shop) {
        Ok(shop) => state::reset(shop),
        Err(e) => ic_cdk::trap(&format!("Failed to restore the state: {e}")),
    }

    log::info!("Cycles shop upgraded");
}

#[query]
fn get_icp_price() -> f64 {
    state::with_shop(|shop| shop.icp_price().unwrap_or(0.0))
}

#[update]
fn update_icp_price(price: f64) {
    let result = state::with_shop_mut(|shop| shop.update_icp_price(caller(), price, time()));
    if let Err(e) = result {
        ic_cdk::trap(&e.to_string());
    }
}

#[query]
fn get_average_usage() -> f64 {
    state::with_shop(|shop| shop.average_usage())
}

#[update]
fn record_usage(usage: Nat) {
    let result = state::with_shop_mut(|shop| shop.record_usage(caller(), usage));
    if let Err(e) = result {
        ic_cdk::trap(&e.to_string());
    }
}

#[query]
fn calculate_cycles(amount: f64, is_icp: bool) -> CyclesResult {
    state::with_shop(|shop| shop.calculate_cycles(amount, is_icp)).into()
}

#[update]
fn purchase_cycles(amount: f64, is_icp: bool) -> CyclesResult {
    state::with_shop_mut(|shop| shop.purchase_cycles(caller(), amount, is_icp))
        .map(|purchase| purchase.cycles)
        .into()
}

#[query]
fn get_balance() -> AccountBalance {
    state::with_shop(|shop| shop.balance_of(&caller()))
}

#[update]
fn deposit_icp(to: Principal, amount: u64) -> Result<AccountBalance, CyclesError> {
    state::with_shop_mut(|shop| shop.deposit_icp(caller(), to, amount))
}

#[query]
fn get_pricing_info() -> PricingInfo {
    state::with_shop(|shop| shop.pricing_info())
}

#[update]
fn set_controller(controller: Principal) -> Result<(), CyclesError> {
    state::with_shop_mut(|shop| shop.set_controller(caller(), controller))
}

#[query]
fn get_logs(pagination: Pagination) -> Result<Logs, CyclesError> {
    state::check_controller(caller())?;
    Ok(cycles_log::take_memory_records(pagination))
}

#[update]
fn set_logger_filter(filter: String) -> Result<(), CyclesError> {
    state::check_controller(caller())?;
    state::set_logger_filter(filter);
    Ok(())
}

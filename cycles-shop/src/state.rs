use std::cell::RefCell;

use candid::Principal;
use cycles_log::{LogSettings, LoggerConfig};
use cycles_pricing::{CyclesError, Result, ShopState};

use crate::stable::StableShopState;

thread_local! {
    static SHOP: RefCell<Option<ShopState>> = RefCell::new(None);
    static LOG_SETTINGS: RefCell<LogSettings> = RefCell::new(LogSettings::default());
    static LOGGER: RefCell<Option<LoggerConfig>> = RefCell::new(None);
}

/// Replaces the canister state.
pub fn reset(shop: ShopState) {
    SHOP.with(|state| *state.borrow_mut() = Some(shop));
}

pub fn with_shop<R>(f: impl FnOnce(&ShopState) -> R) -> R {
    SHOP.with(|state| match state.borrow().as_ref() {
        Some(shop) => f(shop),
        None => ic_cdk::trap("cycles shop is not initialized"),
    })
}

pub fn with_shop_mut<R>(f: impl FnOnce(&mut ShopState) -> R) -> R {
    SHOP.with(|state| match state.borrow_mut().as_mut() {
        Some(shop) => f(shop),
        None => ic_cdk::trap("cycles shop is not initialized"),
    })
}

pub fn check_controller(caller: Principal) -> Result<()> {
    if with_shop(|shop| shop.controller()) == caller {
        Ok(())
    } else {
        Err(CyclesError::Unauthorized(caller.to_string()))
    }
}

/// Installs the global logger. A failure is reported on the console and leaves the canister
/// running without logs.
pub fn init_logger(settings: LogSettings) {
    match cycles_log::init_log(&settings) {
        Ok(config) => LOGGER.with(|logger| *logger.borrow_mut() = Some(config)),
        Err(e) => ic_cdk::println!("Failed to initialize the logger: {e}"),
    }

    LOG_SETTINGS.with(|stored| *stored.borrow_mut() = settings);
}

pub fn set_logger_filter(filter: String) {
    LOGGER.with(|logger| {
        if let Some(config) = logger.borrow().as_ref() {
            config.update_filters(&filter);
        }
    });

    log::info!("Logger filter set to {filter}");
    LOG_SETTINGS.with(|settings| settings.borrow_mut().log_filter = filter);
}

pub fn stable_state() -> StableShopState {
    StableShopState {
        shop: with_shop(|shop| shop.snapshot()),
        log_settings: LOG_SETTINGS.with(|settings| settings.borrow().clone()),
    }
}

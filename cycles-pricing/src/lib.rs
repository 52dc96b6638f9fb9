//! Pricing and purchase logic of the cycles shop canister.
//!
//! The crate does not touch the IC system API: the canister passes the caller principal and the
//! current IC time into every operation, which keeps the whole domain testable natively.
//!
//! * [`CyclesCalculator`] converts a USD or ICP amount into cycles given the current ICP price.
//! * [`PricingState`] holds the administratively set ICP price.
//! * [`UsageTracker`] keeps a moving average of the recorded usage samples.
//! * [`Ledger`] is the interface the purchase handler debits payment from and credits cycles to,
//!   with [`AccountLedger`] as the in-canister implementation.
//! * [`ShopState`] owns all of the above and is the single state object of the canister.
//!
//! ```
//! use candid::{Nat, Principal};
//! use cycles_pricing::{ShopConfig, ShopState};
//!
//! let controller = Principal::from_slice(&[1; 29]);
//! let mut shop = ShopState::new(ShopConfig::new(controller), 0).unwrap();
//! shop.update_icp_price(controller, 7.5, 1).unwrap();
//!
//! let cycles = shop.calculate_cycles(1.0, true).unwrap();
//! assert_eq!(cycles, Nat::from(10_000_000_000_000u64));
//! ```

pub mod calculator;
pub mod error;
pub mod ledger;
pub mod price;
pub mod purchase;
pub mod state;
pub mod types;
pub mod usage;

pub use self::calculator::CyclesCalculator;
pub use self::error::{CyclesError, Result};
pub use self::ledger::{AccountLedger, Ledger, LedgerError};
pub use self::price::PricingState;
pub use self::purchase::{purchase_cycles, Purchase};
pub use self::state::{Authorized, Controller, ShopConfig, ShopSnapshot, ShopState};
pub use self::types::*;
pub use self::usage::UsageTracker;

//! Cycles shop canister.
//!
//! Exposes the pricing and purchase logic of [`cycles_pricing`] as canister endpoints, keeps the
//! shop in a thread local state and carries it, together with the log settings, across upgrades
//! in versioned stable memory. The Candid interface is in `cycles_shop.did`.

mod api;
pub mod config;
pub mod stable;
pub mod state;

pub use self::config::InitArgs;
pub use self::stable::{StableError, StableShopState, Versioned};

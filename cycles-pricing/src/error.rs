use candid::{CandidType, Deserialize};
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::types::IcpE8s;

#[derive(Error, CandidType, Debug, Clone, Deserialize, PartialEq)]
pub enum CyclesError {
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid ICP price {0}: the price must be a positive finite number")]
    InvalidPrice(f64),

    #[error("ICP price is not set")]
    PriceUnavailable,

    #[error("insufficient funds: {required} e8s required, {available} e8s available")]
    InsufficientFunds {
        required: IcpE8s,
        available: IcpE8s,
    },

    #[error("ledger failure: {0}")]
    LedgerFailure(String),

    #[error("the principal {0} is not the shop controller")]
    Unauthorized(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<LedgerError> for CyclesError {
    fn from(error: LedgerError) -> Self {
        match error {
            LedgerError::InsufficientFunds {
                required,
                available,
            } => Self::InsufficientFunds {
                required,
                available,
            },
            LedgerError::Fatal(message) => Self::LedgerFailure(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, CyclesError>;

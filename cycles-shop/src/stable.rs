//! Versioned data for stable storage.
//!
//! The first four bytes hold the version number as a little-endian [`u32`], the remaining bytes
//! are the Candid encoded payload.
//! ```text
//!  0 1 2 3 ...
//! +-+-+-+-+-+-+-+-+-+
//! |V|E|R|S| Payload |
//! +-+-+-+-+-+-+-+-+-+
//! ```
//!
//! When the layout of the stored state changes, add a new type, set its `Previous` type to the
//! old one and implement `upgrade`. Reading an older version walks the chain of `Previous` types
//! and upgrades the value step by step, so it is possible to go from v1 to v3 in one go.
//! Reading a version newer than the one the canister knows fails with
//! [`StableError::AttemptedDowngrade`].

use std::mem::size_of;

use candid::de::IDLDeserialize;
use candid::ser::IDLBuilder;
use candid::{CandidType, Deserialize};
use cycles_log::LogSettings;
use cycles_pricing::ShopSnapshot;
use ic_cdk::api::stable::{stable_bytes, StableMemoryError, StableWriter};
use thiserror::Error;

const VERSION_SIZE: usize = size_of::<u32>();

pub type Result<T> = std::result::Result<T, StableError>;

#[derive(Debug, Error)]
pub enum StableError {
    #[error("Insufficient space available")]
    InsufficientSpace,

    #[error("Stable memory error")]
    StableMemory,

    #[error(
        "Attempted downgrade, or trying to load a version older than what is currently stored"
    )]
    AttemptedDowngrade,

    #[error("No state of version {0} can be built from an empty state")]
    MissingState(u32),

    #[error("Candid error: {0}")]
    Candid(#[from] candid::Error),
}

// `StableMemoryError` does not implement `std::error::Error`.
impl From<StableMemoryError> for StableError {
    fn from(_: StableMemoryError) -> Self {
        Self::StableMemory
    }
}

/// Versioned data that can be written to, and read from stable storage.
pub trait Versioned: for<'de> Deserialize<'de> + CandidType {
    /// The previous version of this data, or a unit (`()`) for the first version.
    type Previous: Versioned;

    fn version() -> u32;

    /// Upgrade to this version from the previous version.
    fn upgrade(previous: Self::Previous) -> Result<Self>;
}

impl Versioned for () {
    type Previous = ();

    fn version() -> u32 {
        0
    }

    fn upgrade((): ()) -> Result<Self> {
        Ok(())
    }
}

/// State of the canister that survives upgrades.
#[derive(Debug, Clone, CandidType, Deserialize, PartialEq)]
pub struct StableShopState {
    pub shop: ShopSnapshot,
    pub log_settings: LogSettings,
}

impl Versioned for StableShopState {
    type Previous = ();

    fn version() -> u32 {
        1
    }

    fn upgrade((): ()) -> Result<Self> {
        Err(StableError::MissingState(Self::version()))
    }
}

/// Load a [`Versioned`] from stable storage.
pub fn read<T: Versioned>() -> Result<T> {
    decode(&stable_bytes())
}

/// Write a [`Versioned`] to stable storage, overwriting anything that was stored before.
pub fn write<T: Versioned>(payload: &T) -> Result<()> {
    let bytes = encode(payload)?;
    let mut writer = StableWriter::default();
    writer.write(&bytes)?;
    Ok(())
}

/// Serializes the payload prefixed with its version.
pub fn encode<T: Versioned>(payload: &T) -> Result<Vec<u8>> {
    let mut bytes = T::version().to_le_bytes().to_vec();
    let mut serializer = IDLBuilder::new();
    serializer.arg(payload)?.serialize(&mut bytes)?;
    Ok(bytes)
}

/// Deserializes a versioned payload, upgrading it when an older version is stored.
pub fn decode<T: Versioned>(bytes: &[u8]) -> Result<T> {
    if bytes.len() < VERSION_SIZE {
        return Err(StableError::InsufficientSpace);
    }

    let (version, payload) = bytes.split_at(VERSION_SIZE);
    let mut version_bytes = [0u8; VERSION_SIZE];
    version_bytes.copy_from_slice(version);
    let version = u32::from_le_bytes(version_bytes);
    if T::version() < version {
        return Err(StableError::AttemptedDowngrade);
    }

    recursive_upgrade::<T>(version, payload)
}

fn recursive_upgrade<T: Versioned>(version: u32, bytes: &[u8]) -> Result<T> {
    if version == T::version() {
        let mut de = IDLDeserialize::new(bytes)?;
        let res = de.get_value()?;
        Ok(res)
    } else {
        let val = recursive_upgrade::<T::Previous>(version, bytes)?;
        T::upgrade(val)
    }
}

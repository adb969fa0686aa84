//! Foundation types for Meterbook.
//!
//! This crate provides the identifiers, scaled units, and record shapes
//! used throughout the Meterbook system. Every other `mb-` crate depends
//! on `mb-types`.
//!
//! # Key Types
//!
//! - [`StationId`], [`DateKey`], [`PeriodKey`] — exact-match ledger keys
//! - [`AccountId`] — principal identity derived from an ed25519 key
//! - [`ContentHash`] — BLAKE3 commitment to an external evidence artifact
//! - [`EnergyTenths`], [`TariffBps`] — opaque pre-scaled integers
//! - [`Revision`] — bounded 1-based settlement revision number
//! - [`Role`], [`PauseState`] — access-control primitives
//! - [`SnapshotPayload`], [`SnapshotRecord`], [`SettlementFields`],
//!   [`SettlementRecord`] — the stored record shapes

pub mod access;
pub mod account;
pub mod error;
pub mod hash;
pub mod keys;
pub mod records;
pub mod revision;
pub mod time;
pub mod units;

pub use access::{PauseState, Role};
pub use account::AccountId;
pub use error::TypeError;
pub use hash::ContentHash;
pub use keys::{DateKey, PeriodKey, StationId, MAX_STATION_ID_LEN};
pub use records::{
    SettlementFields, SettlementRecord, SnapshotPayload, SnapshotRecord, EXPECTED_SAMPLE_COUNT,
};
pub use revision::Revision;
pub use time::Timestamp;
pub use units::{EnergyTenths, TariffBps};

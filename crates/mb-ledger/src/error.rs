//! Error taxonomy for ledger operations.
//!
//! Every failure an operation can produce is a distinct variant, so callers
//! and transports can map them without string matching. Rejections leave the
//! ledger state exactly as it was.

use mb_types::{AccountId, DateKey, PeriodKey, Role, StationId};

/// Errors returned by [`StationLedger`](crate::StationLedger) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The calling account does not hold the role the operation requires.
    #[error("account {account} does not hold role {role}")]
    Unauthorized { account: AccountId, role: Role },

    /// The ledger is paused; mutating operations are rejected until resumed.
    #[error("ledger is paused")]
    SystemPaused,

    /// The attestation did not verify against the submitted payload.
    #[error("attestation rejected: {0}")]
    InvalidSignature(String),

    /// The snapshot does not carry the expected number of metering intervals.
    #[error("sample count {actual} does not match the required {expected} intervals")]
    InvalidSampleCount { expected: u16, actual: u16 },

    /// A snapshot is already recorded for this station and date.
    #[error("snapshot already recorded for {station} on {date}")]
    SnapshotExists { station: StationId, date: DateKey },

    /// An initial settlement is already filed for this station and period.
    #[error("settlement already filed for {station} in {period}; amend it instead")]
    SettlementInitialized { station: StationId, period: PeriodKey },

    /// No initial settlement exists to amend.
    #[error("no settlement filed for {station} in {period}; file the initial record first")]
    SettlementNotInitialized { station: StationId, period: PeriodKey },

    /// The revision counter for this station and period is exhausted.
    #[error("revision limit reached for {station} in {period}")]
    RevisionOverflow { station: StationId, period: PeriodKey },

    /// No snapshot is recorded for this station and date.
    #[error("no snapshot recorded for {station} on {date}")]
    SnapshotNotFound { station: StationId, date: DateKey },

    /// No settlement is filed for this station and period.
    #[error("no settlement filed for {station} in {period}")]
    SettlementNotFound { station: StationId, period: PeriodKey },

    /// The requested revision does not exist for this station and period.
    #[error("revision {revision} does not exist for {station} in {period}")]
    RevisionNotFound {
        station: StationId,
        period: PeriodKey,
        revision: u16,
    },

    /// A state lock was poisoned by a panicking writer.
    #[error("ledger state lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, LedgerError>;

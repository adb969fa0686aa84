//! Settlement and snapshot ledger for Meterbook.
//!
//! This crate is the heart of Meterbook. It provides:
//! - [`StationLedger`], the single service value owning all mutable state
//! - Role-gated, pausable mutation with a fixed check order
//! - [`SnapshotBook`], write-once evidence records keyed by station and date
//! - [`SettlementBook`], append-only settlement revisions with an
//!   effective-revision pointer per station and period
//! - A discriminated [`LedgerError`] taxonomy; failing calls commit nothing
//!
//! Every committed mutation is appended to the crate's
//! [`NoticeJournal`](mb_events::NoticeJournal) before the write lock is
//! released, so the stream order is the commit order.

pub mod error;
pub mod ledger;
pub mod roles;
pub mod settlements;
pub mod snapshots;

pub use error::LedgerError;
pub use ledger::StationLedger;
pub use roles::RoleSet;
pub use settlements::SettlementBook;
pub use snapshots::SnapshotBook;

//! Notification stream for Meterbook.
//!
//! Every committed ledger mutation produces exactly one notice (two for
//! amendments: the amendment notice, then the full-record notice), appended
//! to an ordered in-memory journal and fanned out to filtered subscribers.
//! Notices are self-describing and never retracted, so the stream alone
//! reconstructs ledger state ([`RebuiltState`]). An optional append-only
//! file archive serves external consumers; it is driven by a subscriber,
//! never by the commit path.

pub mod archive;
pub mod error;
pub mod journal;
pub mod notice;
pub mod rebuild;

pub use archive::NoticeArchive;
pub use error::EventError;
pub use journal::{JournalConfig, NoticeFilter, NoticeJournal, NoticeStream};
pub use notice::{
    LedgerNotice, NoticeKind, PauseChanged, RoleChanged, SequencedNotice, SettlementAmended,
    SettlementStored, SnapshotStored,
};
pub use rebuild::RebuiltState;

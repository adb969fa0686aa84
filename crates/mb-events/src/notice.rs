use serde::{Deserialize, Serialize};

use mb_crypto::SnapshotDigest;
use mb_types::{
    AccountId, DateKey, PauseState, PeriodKey, Revision, Role, SettlementRecord, SnapshotRecord,
    StationId, Timestamp,
};

/// Classification of ledger notices, used by subscription filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeKind {
    SnapshotStored,
    SettlementStored,
    SettlementAmended,
    RoleGranted,
    RoleRevoked,
    PauseChanged,
}

impl std::fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::SnapshotStored => "SnapshotStored",
            Self::SettlementStored => "SettlementStored",
            Self::SettlementAmended => "SettlementAmended",
            Self::RoleGranted => "RoleGranted",
            Self::RoleRevoked => "RoleRevoked",
            Self::PauseChanged => "PauseChanged",
        };
        write!(f, "{s}")
    }
}

/// A daily snapshot was accepted and committed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotStored {
    pub station: StationId,
    pub date: DateKey,
    /// The attestation digest the signer endorsed.
    pub digest: SnapshotDigest,
    /// The stored record, exactly as committed.
    pub record: SnapshotRecord,
}

/// A settlement revision was committed (initial filing or amendment).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementStored {
    pub station: StationId,
    pub period: PeriodKey,
    /// The full new revision, exactly as committed.
    pub record: SettlementRecord,
}

/// An existing settlement was amended. Always followed immediately by the
/// [`SettlementStored`] notice for `new_revision`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementAmended {
    pub station: StationId,
    pub period: PeriodKey,
    pub prior_revision: Revision,
    pub new_revision: Revision,
    /// Submitter-provided justification, e.g. `"Red invoice correction"`.
    pub reason: String,
}

/// A role was granted to or revoked from a principal. For a renounce,
/// `by` equals `account`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChanged {
    pub account: AccountId,
    pub role: Role,
    pub by: AccountId,
}

/// The pause switch was toggled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseChanged {
    pub state: PauseState,
    pub by: AccountId,
}

/// One committed ledger mutation.
///
/// Every notice is self-describing: it carries the full new record plus
/// its key, so a reader can reconstruct ledger state from the stream alone
/// (see [`crate::rebuild::RebuiltState`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerNotice {
    SnapshotStored(SnapshotStored),
    SettlementStored(SettlementStored),
    SettlementAmended(SettlementAmended),
    RoleGranted(RoleChanged),
    RoleRevoked(RoleChanged),
    PauseChanged(PauseChanged),
}

impl LedgerNotice {
    pub fn kind(&self) -> NoticeKind {
        match self {
            Self::SnapshotStored(_) => NoticeKind::SnapshotStored,
            Self::SettlementStored(_) => NoticeKind::SettlementStored,
            Self::SettlementAmended(_) => NoticeKind::SettlementAmended,
            Self::RoleGranted(_) => NoticeKind::RoleGranted,
            Self::RoleRevoked(_) => NoticeKind::RoleRevoked,
            Self::PauseChanged(_) => NoticeKind::PauseChanged,
        }
    }

    /// The station this notice pertains to, when it is station-scoped.
    pub fn station(&self) -> Option<&StationId> {
        match self {
            Self::SnapshotStored(n) => Some(&n.station),
            Self::SettlementStored(n) => Some(&n.station),
            Self::SettlementAmended(n) => Some(&n.station),
            Self::RoleGranted(_) | Self::RoleRevoked(_) | Self::PauseChanged(_) => None,
        }
    }
}

/// A notice with its position in the stream.
///
/// `seq` is 1-based and dense: notice `n` is the `n`-th mutation ever
/// committed. The integrity hash covers (seq, recorded_at, notice), so a
/// reordered or altered archive entry is detectable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedNotice {
    pub seq: u64,
    pub recorded_at: Timestamp,
    pub notice: LedgerNotice,
    /// BLAKE3 integrity hash over (seq, recorded_at, notice).
    pub integrity_hash: [u8; 32],
}

impl SequencedNotice {
    /// Build a sequenced notice, computing its integrity hash.
    pub fn new(seq: u64, recorded_at: Timestamp, notice: LedgerNotice) -> Self {
        let integrity_hash = Self::compute_integrity(seq, recorded_at, &notice);
        Self {
            seq,
            recorded_at,
            notice,
            integrity_hash,
        }
    }

    /// Verify the integrity hash matches the content.
    pub fn verify_integrity(&self) -> bool {
        self.integrity_hash == Self::compute_integrity(self.seq, self.recorded_at, &self.notice)
    }

    pub fn kind(&self) -> NoticeKind {
        self.notice.kind()
    }

    /// Short hex of the integrity hash, for logs.
    pub fn short_hash(&self) -> String {
        hex::encode(&self.integrity_hash[..4])
    }

    fn compute_integrity(seq: u64, recorded_at: Timestamp, notice: &LedgerNotice) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"mb-notice-v1:");
        hasher.update(&seq.to_le_bytes());
        hasher.update(&recorded_at.as_millis().to_le_bytes());
        if let Ok(bytes) = bincode::serialize(notice) {
            hasher.update(&bytes);
        }
        *hasher.finalize().as_bytes()
    }
}

impl std::fmt::Display for SequencedNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {} [{}]", self.seq, self.kind(), self.short_hash())
    }
}

//! Record shapes stored by the two ledgers.

use serde::{Deserialize, Serialize};

use crate::account::AccountId;
use crate::hash::ContentHash;
use crate::keys::{DateKey, StationId};
use crate::revision::Revision;
use crate::time::Timestamp;
use crate::units::{EnergyTenths, TariffBps};

/// Samples expected in one daily snapshot: quarter-hour metering over a
/// 24-hour day.
pub const EXPECTED_SAMPLE_COUNT: u16 = 96;

/// Daily snapshot submission as signed by a data team.
///
/// This is the exact structure bound by the attestation digest. Changing
/// any field invalidates the signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    pub station: StationId,
    pub date: DateKey,
    /// Total energy generated over the day (kWh x 10).
    pub generated: EnergyTenths,
    /// Energy delivered into the grid (kWh x 10).
    pub grid_delivered: EnergyTenths,
    /// Energy consumed on site (kWh x 10).
    pub self_consumed: EnergyTenths,
    /// Number of metering samples backing the totals.
    pub sample_count: u16,
    /// Hash of the underlying evidence artifact (CSV or similar).
    pub evidence_hash: ContentHash,
}

/// Stored daily snapshot. Write-once per (station, date); never mutated
/// or deleted afterward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub generated: EnergyTenths,
    pub grid_delivered: EnergyTenths,
    pub self_consumed: EnergyTenths,
    pub sample_count: u16,
    pub evidence_hash: ContentHash,
    /// Identity recovered from the attestation at commit time.
    pub signer: AccountId,
}

impl SnapshotRecord {
    /// Build the stored record from an accepted payload and its recovered
    /// signer.
    pub fn from_payload(payload: &SnapshotPayload, signer: AccountId) -> Self {
        Self {
            generated: payload.generated,
            grid_delivered: payload.grid_delivered,
            self_consumed: payload.self_consumed,
            sample_count: payload.sample_count,
            evidence_hash: payload.evidence_hash,
            signer,
        }
    }
}

/// Business fields of a monthly settlement submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementFields {
    /// Energy delivered into the grid over the period (kWh x 10).
    pub grid_delivered: EnergyTenths,
    /// Energy consumed on site over the period (kWh x 10).
    pub self_consumed: EnergyTenths,
    /// Settlement tariff (basis points, value x 10000).
    pub tariff: TariffBps,
    /// Hash of the aggregated evidence set for the period.
    pub agg_evidence_hash: ContentHash,
    /// Hash of the primary audit document (e.g. the invoice).
    pub audit_doc_hash: ContentHash,
    /// Hash of a payment receipt, when one exists at filing time.
    pub receipt_hash: Option<ContentHash>,
}

/// One immutable settlement revision.
///
/// All revisions of a (station, period) persist for the life of the
/// ledger; only the effective-revision pointer moves.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRecord {
    pub grid_delivered: EnergyTenths,
    pub self_consumed: EnergyTenths,
    pub tariff: TariffBps,
    pub agg_evidence_hash: ContentHash,
    pub audit_doc_hash: ContentHash,
    pub receipt_hash: Option<ContentHash>,
    /// Position of this record in the key's revision sequence (1-based).
    pub revision: Revision,
    /// Wall-clock commit time.
    pub recorded_at: Timestamp,
    /// Principal that filed this revision.
    pub submitted_by: AccountId,
}

impl SettlementRecord {
    pub fn new(
        fields: SettlementFields,
        revision: Revision,
        recorded_at: Timestamp,
        submitted_by: AccountId,
    ) -> Self {
        Self {
            grid_delivered: fields.grid_delivered,
            self_consumed: fields.self_consumed,
            tariff: fields.tariff,
            agg_evidence_hash: fields.agg_evidence_hash,
            audit_doc_hash: fields.audit_doc_hash,
            receipt_hash: fields.receipt_hash,
            revision,
            recorded_at,
            submitted_by,
        }
    }

    /// The business fields of this revision, without commit metadata.
    pub fn fields(&self) -> SettlementFields {
        SettlementFields {
            grid_delivered: self.grid_delivered,
            self_consumed: self.self_consumed,
            tariff: self.tariff,
            agg_evidence_hash: self.agg_evidence_hash,
            audit_doc_hash: self.audit_doc_hash,
            receipt_hash: self.receipt_hash,
        }
    }
}

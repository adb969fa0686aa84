//! Append-only book of monthly settlement revisions.
//!
//! Each `(station, period)` key owns a dense revision history starting at
//! revision 1 and an effective-revision pointer. Amendments append; nothing
//! is ever rewritten or removed, so every superseded filing stays readable.

use std::collections::HashMap;

use mb_types::{
    AccountId, PeriodKey, Revision, SettlementFields, SettlementRecord, StationId, Timestamp,
};

use crate::error::{LedgerError, Result};

/// Revision history for one station and billing period.
///
/// `revisions[i]` holds revision `i + 1`; `effective` always points at the
/// last element. Both move together inside this module only.
#[derive(Debug, Clone)]
struct PeriodEntry {
    revisions: Vec<SettlementRecord>,
    effective: Revision,
}

#[derive(Debug, Clone, Default)]
pub struct SettlementBook {
    entries: HashMap<(StationId, PeriodKey), PeriodEntry>,
}

impl SettlementBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files the initial settlement for `(station, period)` as revision 1.
    /// Fails with [`LedgerError::SettlementInitialized`] if any filing
    /// already exists for the key.
    pub fn file_initial(
        &mut self,
        station: StationId,
        period: PeriodKey,
        fields: SettlementFields,
        recorded_at: Timestamp,
        submitted_by: AccountId,
    ) -> Result<&SettlementRecord> {
        let key = (station, period);
        if self.entries.contains_key(&key) {
            return Err(LedgerError::SettlementInitialized {
                station: key.0,
                period: key.1,
            });
        }
        let record = SettlementRecord::new(fields, Revision::FIRST, recorded_at, submitted_by);
        let entry = self.entries.entry(key).or_insert(PeriodEntry {
            revisions: Vec::new(),
            effective: Revision::FIRST,
        });
        entry.revisions.push(record);
        Ok(&entry.revisions[0])
    }

    /// Appends an amendment as the next revision and advances the effective
    /// pointer to it. Returns the superseded revision number alongside the
    /// stored record.
    pub fn amend(
        &mut self,
        station: &StationId,
        period: &PeriodKey,
        fields: SettlementFields,
        recorded_at: Timestamp,
        submitted_by: AccountId,
    ) -> Result<(Revision, &SettlementRecord)> {
        let key = (station.clone(), period.clone());
        let entry = self
            .entries
            .get_mut(&key)
            .ok_or_else(|| LedgerError::SettlementNotInitialized {
                station: station.clone(),
                period: period.clone(),
            })?;
        let prior = entry.effective;
        let next = prior.next().ok_or_else(|| LedgerError::RevisionOverflow {
            station: station.clone(),
            period: period.clone(),
        })?;

        let record = SettlementRecord::new(fields, next, recorded_at, submitted_by);
        entry.revisions.push(record);
        entry.effective = next;
        Ok((prior, &entry.revisions[next.get() as usize - 1]))
    }

    /// The record the effective pointer designates, or
    /// [`LedgerError::SettlementNotFound`] when nothing is filed for the key.
    pub fn effective(&self, station: &StationId, period: &PeriodKey) -> Result<&SettlementRecord> {
        let entry = self.entry(station, period)?;
        let index = entry.effective.get() as usize - 1;
        Ok(&entry.revisions[index])
    }

    /// A specific revision by raw number. Zero, anything past the effective
    /// pointer, and any revision of an unfiled key yield
    /// [`LedgerError::RevisionNotFound`].
    pub fn by_revision(
        &self,
        station: &StationId,
        period: &PeriodKey,
        revision: u16,
    ) -> Result<&SettlementRecord> {
        let entry = self
            .entries
            .get(&(station.clone(), period.clone()))
            .ok_or_else(|| LedgerError::RevisionNotFound {
                station: station.clone(),
                period: period.clone(),
                revision,
            })?;
        if revision == 0 {
            return Err(LedgerError::RevisionNotFound {
                station: station.clone(),
                period: period.clone(),
                revision,
            });
        }
        entry
            .revisions
            .get(revision as usize - 1)
            .ok_or_else(|| LedgerError::RevisionNotFound {
                station: station.clone(),
                period: period.clone(),
                revision,
            })
    }

    /// The current effective revision for the key, if anything is filed.
    pub fn effective_revision(&self, station: &StationId, period: &PeriodKey) -> Option<Revision> {
        self.entries
            .get(&(station.clone(), period.clone()))
            .map(|entry| entry.effective)
    }

    /// Number of `(station, period)` keys with at least one filing.
    pub fn period_count(&self) -> usize {
        self.entries.len()
    }

    /// Total settlement records across all keys and revisions.
    pub fn revision_count(&self) -> usize {
        self.entries.values().map(|entry| entry.revisions.len()).sum()
    }

    fn entry(&self, station: &StationId, period: &PeriodKey) -> Result<&PeriodEntry> {
        self.entries
            .get(&(station.clone(), period.clone()))
            .ok_or_else(|| LedgerError::SettlementNotFound {
                station: station.clone(),
                period: period.clone(),
            })
    }
}

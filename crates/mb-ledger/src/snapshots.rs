//! Write-once book of daily generation snapshots.
//!
//! Records are keyed by station and calendar date. The book exposes insert
//! and read operations only; there is no update or delete, so a stored
//! snapshot cannot change after commit.

use std::collections::HashMap;

use mb_types::{DateKey, SnapshotRecord, StationId};

use crate::error::{LedgerError, Result};

#[derive(Debug, Clone, Default)]
pub struct SnapshotBook {
    records: HashMap<(StationId, DateKey), SnapshotRecord>,
}

impl SnapshotBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a snapshot for `(station, date)`. Fails with
    /// [`LedgerError::SnapshotExists`] if one is already recorded, leaving
    /// the existing record untouched.
    pub fn insert(
        &mut self,
        station: StationId,
        date: DateKey,
        record: SnapshotRecord,
    ) -> Result<()> {
        let key = (station, date);
        if self.records.contains_key(&key) {
            return Err(LedgerError::SnapshotExists {
                station: key.0,
                date: key.1,
            });
        }
        self.records.insert(key, record);
        Ok(())
    }

    pub fn get(&self, station: &StationId, date: &DateKey) -> Option<&SnapshotRecord> {
        self.records.get(&(station.clone(), date.clone()))
    }

    pub fn contains(&self, station: &StationId, date: &DateKey) -> bool {
        self.records.contains_key(&(station.clone(), date.clone()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mb_types::{AccountId, ContentHash, EnergyTenths, SnapshotPayload, EXPECTED_SAMPLE_COUNT};

    fn payload(station: &str, date: &str) -> SnapshotPayload {
        SnapshotPayload {
            station: station.parse().unwrap(),
            date: date.parse().unwrap(),
            generated: EnergyTenths::new(4_200),
            grid_delivered: EnergyTenths::new(3_100),
            self_consumed: EnergyTenths::new(1_100),
            sample_count: EXPECTED_SAMPLE_COUNT,
            evidence_hash: ContentHash::of_bytes(b"interval-file"),
        }
    }

    fn record(station: &str, date: &str, signer_tag: u8) -> SnapshotRecord {
        SnapshotRecord::from_payload(&payload(station, date), AccountId::from_raw([signer_tag; 32]))
    }

    #[test]
    fn insert_then_get_returns_the_record() {
        let mut book = SnapshotBook::new();
        let station: StationId = "STATION-001".parse().unwrap();
        let date: DateKey = "2025-01-15".parse().unwrap();

        book.insert(station.clone(), date.clone(), record("STATION-001", "2025-01-15", 7))
            .unwrap();

        let stored = book.get(&station, &date).unwrap();
        assert_eq!(stored.signer, AccountId::from_raw([7; 32]));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn second_insert_for_same_key_is_rejected() {
        let mut book = SnapshotBook::new();
        let station: StationId = "STATION-001".parse().unwrap();
        let date: DateKey = "2025-01-15".parse().unwrap();

        book.insert(station.clone(), date.clone(), record("STATION-001", "2025-01-15", 7))
            .unwrap();
        let err = book
            .insert(station.clone(), date.clone(), record("STATION-001", "2025-01-15", 9))
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::SnapshotExists {
                station: station.clone(),
                date: date.clone(),
            }
        );
        // The original record survives the rejected overwrite.
        assert_eq!(book.get(&station, &date).unwrap().signer, AccountId::from_raw([7; 32]));
    }

    #[test]
    fn same_station_different_dates_are_independent() {
        let mut book = SnapshotBook::new();
        let station: StationId = "STATION-001".parse().unwrap();

        book.insert(
            station.clone(),
            "2025-01-15".parse().unwrap(),
            record("STATION-001", "2025-01-15", 1),
        )
        .unwrap();
        book.insert(
            station.clone(),
            "2025-01-16".parse().unwrap(),
            record("STATION-001", "2025-01-16", 1),
        )
        .unwrap();

        assert_eq!(book.len(), 2);
        assert!(book.contains(&station, &"2025-01-15".parse().unwrap()));
        assert!(book.contains(&station, &"2025-01-16".parse().unwrap()));
    }
}

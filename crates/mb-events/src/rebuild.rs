//! Ledger state reconstruction from the notice stream.
//!
//! Notices are self-describing, so folding them in order reproduces the
//! ledger's current state without consulting live storage. This module is
//! the executable form of that guarantee; off-chain consumers use the same
//! technique.

use std::collections::{HashMap, HashSet};

use mb_types::{
    AccountId, DateKey, PauseState, PeriodKey, Revision, Role, SettlementRecord, SnapshotRecord,
    StationId,
};

use crate::notice::{LedgerNotice, SequencedNotice};

/// Ledger state as reconstructed from a notice stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RebuiltState {
    pub snapshots: HashMap<(StationId, DateKey), SnapshotRecord>,
    /// All revisions per key, in revision order (index 0 is revision 1).
    pub settlements: HashMap<(StationId, PeriodKey), Vec<SettlementRecord>>,
    pub effective: HashMap<(StationId, PeriodKey), Revision>,
    pub roles: HashMap<Role, HashSet<AccountId>>,
    pub pause: PauseState,
}

impl RebuiltState {
    /// Fold an ordered notice stream into ledger state.
    pub fn from_notices<'a, I>(notices: I) -> Self
    where
        I: IntoIterator<Item = &'a SequencedNotice>,
    {
        let mut state = Self::default();
        for sequenced in notices {
            state.apply(&sequenced.notice);
        }
        state
    }

    /// Apply a single notice.
    pub fn apply(&mut self, notice: &LedgerNotice) {
        match notice {
            LedgerNotice::SnapshotStored(n) => {
                self.snapshots
                    .insert((n.station.clone(), n.date.clone()), n.record.clone());
            }
            LedgerNotice::SettlementStored(n) => {
                let key = (n.station.clone(), n.period.clone());
                self.settlements
                    .entry(key.clone())
                    .or_default()
                    .push(n.record.clone());
                self.effective.insert(key, n.record.revision);
            }
            // The amendment notice is informational; the paired
            // SettlementStored notice carries the state change.
            LedgerNotice::SettlementAmended(_) => {}
            LedgerNotice::RoleGranted(n) => {
                self.roles.entry(n.role).or_default().insert(n.account);
            }
            LedgerNotice::RoleRevoked(n) => {
                if let Some(members) = self.roles.get_mut(&n.role) {
                    members.remove(&n.account);
                }
            }
            LedgerNotice::PauseChanged(n) => {
                self.pause = n.state;
            }
        }
    }

    /// The record at the effective revision, if any.
    pub fn effective_settlement(
        &self,
        station: &StationId,
        period: &PeriodKey,
    ) -> Option<&SettlementRecord> {
        let key = (station.clone(), period.clone());
        let revision = self.effective.get(&key)?;
        self.settlements
            .get(&key)?
            .get(revision.get() as usize - 1)
    }

    pub fn has_role(&self, account: &AccountId, role: Role) -> bool {
        self.roles
            .get(&role)
            .is_some_and(|members| members.contains(account))
    }
}

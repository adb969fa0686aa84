//! The ledger service.
//!
//! [`StationLedger`] is the single long-lived value owning all mutable
//! state: role membership, the pause switch, and both record books. Every
//! operation takes the caller's identity explicitly; the surrounding
//! transport is trusted to have authenticated it. Mutations run under one
//! exclusive lock and emit their notices before releasing it, so the
//! journal's order is the commit order.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use mb_crypto::{recover_signer, Attestation, AttestationDomain};
use mb_events::{
    JournalConfig, LedgerNotice, NoticeJournal, PauseChanged, RoleChanged, SettlementAmended,
    SettlementStored, SnapshotStored,
};
use mb_types::{
    AccountId, DateKey, PauseState, PeriodKey, Revision, Role, SettlementFields, SettlementRecord,
    SnapshotPayload, SnapshotRecord, StationId, Timestamp, EXPECTED_SAMPLE_COUNT,
};

use crate::error::{LedgerError, Result};
use crate::roles::RoleSet;
use crate::settlements::SettlementBook;
use crate::snapshots::SnapshotBook;

struct LedgerState {
    roles: RoleSet,
    pause: PauseState,
    snapshots: SnapshotBook,
    settlements: SettlementBook,
}

/// Settlement-of-record ledger for generation stations.
///
/// Constructed once per deployment with the attestation domain it answers
/// to and the bootstrap admin. The admin starts with [`Role::Admin`] and
/// [`Role::SettlementSubmitter`], so settlements can be filed without a
/// separate grant; both bootstrap grants appear in the notice stream.
pub struct StationLedger {
    domain: AttestationDomain,
    inner: RwLock<LedgerState>,
    journal: Arc<NoticeJournal>,
}

impl StationLedger {
    pub fn new(domain: AttestationDomain, admin: AccountId) -> Self {
        Self::with_config(domain, admin, JournalConfig::default())
    }

    pub fn with_config(domain: AttestationDomain, admin: AccountId, config: JournalConfig) -> Self {
        let journal = Arc::new(NoticeJournal::new(config));
        for role in [Role::Admin, Role::SettlementSubmitter] {
            journal.append(LedgerNotice::RoleGranted(RoleChanged {
                account: admin,
                role,
                by: admin,
            }));
        }
        info!(admin = %admin, realm = %domain.realm(), "ledger bootstrapped");

        Self {
            domain,
            inner: RwLock::new(LedgerState {
                roles: RoleSet::bootstrap(admin),
                pause: PauseState::Active,
                snapshots: SnapshotBook::new(),
                settlements: SettlementBook::new(),
            }),
            journal,
        }
    }

    /// The attestation domain snapshot submissions must be signed under.
    pub fn domain(&self) -> &AttestationDomain {
        &self.domain
    }

    /// The notice stream fed by this ledger.
    pub fn journal(&self) -> &Arc<NoticeJournal> {
        &self.journal
    }

    // ----- snapshot operations -------------------------------------------

    /// Stores one daily evidence snapshot.
    ///
    /// Checks run in a fixed order: the caller must hold
    /// [`Role::SnapshotSubmitter`], the ledger must be active, the
    /// attestation must recover a signer for this exact payload and domain,
    /// the sample count must equal [`EXPECTED_SAMPLE_COUNT`], and no
    /// snapshot may exist yet for `(station, date)`. A rejection at any
    /// step leaves no trace. There is no update or delete counterpart.
    pub fn store_daily_snapshot(
        &self,
        caller: AccountId,
        payload: &SnapshotPayload,
        attestation: &Attestation,
    ) -> Result<SnapshotStored> {
        let mut state = self.write_state()?;
        state.roles.require(&caller, Role::SnapshotSubmitter)?;
        require_active(&state)?;

        let digest = self.domain.snapshot_digest(payload);
        let signer = recover_signer(&digest, attestation)
            .map_err(|e| LedgerError::InvalidSignature(e.to_string()))?;

        if payload.sample_count != EXPECTED_SAMPLE_COUNT {
            return Err(LedgerError::InvalidSampleCount {
                expected: EXPECTED_SAMPLE_COUNT,
                actual: payload.sample_count,
            });
        }

        let record = SnapshotRecord::from_payload(payload, signer);
        state
            .snapshots
            .insert(payload.station.clone(), payload.date.clone(), record.clone())?;

        let stored = SnapshotStored {
            station: payload.station.clone(),
            date: payload.date.clone(),
            digest,
            record,
        };
        self.journal
            .append(LedgerNotice::SnapshotStored(stored.clone()));
        info!(
            station = %stored.station,
            date = %stored.date,
            signer = %stored.record.signer,
            digest = %stored.digest.short_hex(),
            "snapshot stored"
        );
        Ok(stored)
    }

    /// The stored snapshot for `(station, date)`.
    pub fn snapshot(&self, station: &StationId, date: &DateKey) -> Result<SnapshotRecord> {
        let state = self.read_state()?;
        state
            .snapshots
            .get(station, date)
            .cloned()
            .ok_or_else(|| LedgerError::SnapshotNotFound {
                station: station.clone(),
                date: date.clone(),
            })
    }

    pub fn has_snapshot(&self, station: &StationId, date: &DateKey) -> Result<bool> {
        Ok(self.read_state()?.snapshots.contains(station, date))
    }

    // ----- settlement operations -----------------------------------------

    /// Files the initial monthly settlement for `(station, period)` as
    /// revision 1 and points the effective revision at it.
    pub fn store_monthly_settlement(
        &self,
        caller: AccountId,
        station: StationId,
        period: PeriodKey,
        fields: SettlementFields,
    ) -> Result<SettlementRecord> {
        let mut state = self.write_state()?;
        state.roles.require(&caller, Role::SettlementSubmitter)?;
        require_active(&state)?;

        let record = state
            .settlements
            .file_initial(
                station.clone(),
                period.clone(),
                fields,
                Timestamp::now(),
                caller,
            )?
            .clone();

        self.journal
            .append(LedgerNotice::SettlementStored(SettlementStored {
                station: station.clone(),
                period: period.clone(),
                record: record.clone(),
            }));
        info!(
            %station,
            %period,
            revision = %record.revision,
            submitter = %caller,
            "settlement filed"
        );
        Ok(record)
    }

    /// Appends an amendment as the next revision for `(station, period)`
    /// and advances the effective pointer to it.
    ///
    /// Emits two notices in fixed order: the amendment (prior revision,
    /// new revision, reason), then the full new record. The superseded
    /// revisions stay stored and readable unchanged.
    pub fn amend_monthly_settlement(
        &self,
        caller: AccountId,
        station: StationId,
        period: PeriodKey,
        reason: impl Into<String>,
        fields: SettlementFields,
    ) -> Result<SettlementRecord> {
        let mut state = self.write_state()?;
        state.roles.require(&caller, Role::SettlementSubmitter)?;
        require_active(&state)?;

        let (prior, record) =
            state
                .settlements
                .amend(&station, &period, fields, Timestamp::now(), caller)?;
        let record = record.clone();

        self.journal
            .append(LedgerNotice::SettlementAmended(SettlementAmended {
                station: station.clone(),
                period: period.clone(),
                prior_revision: prior,
                new_revision: record.revision,
                reason: reason.into(),
            }));
        self.journal
            .append(LedgerNotice::SettlementStored(SettlementStored {
                station: station.clone(),
                period: period.clone(),
                record: record.clone(),
            }));
        info!(
            %station,
            %period,
            prior = %prior,
            revision = %record.revision,
            submitter = %caller,
            "settlement amended"
        );
        Ok(record)
    }

    /// The settlement at the current effective revision.
    pub fn effective_settlement(
        &self,
        station: &StationId,
        period: &PeriodKey,
    ) -> Result<SettlementRecord> {
        Ok(self.read_state()?.settlements.effective(station, period)?.clone())
    }

    /// A settlement at an exact revision number, current or superseded.
    pub fn settlement_by_revision(
        &self,
        station: &StationId,
        period: &PeriodKey,
        revision: u16,
    ) -> Result<SettlementRecord> {
        Ok(self
            .read_state()?
            .settlements
            .by_revision(station, period, revision)?
            .clone())
    }

    /// The effective revision for `(station, period)`, `None` if nothing
    /// is filed.
    pub fn effective_revision(
        &self,
        station: &StationId,
        period: &PeriodKey,
    ) -> Result<Option<Revision>> {
        Ok(self.read_state()?.settlements.effective_revision(station, period))
    }

    // ----- pause switch ---------------------------------------------------

    /// Halts all snapshot and settlement mutations. Reads stay available.
    pub fn pause(&self, caller: AccountId) -> Result<()> {
        self.set_pause(caller, PauseState::Paused)
    }

    /// Resumes snapshot and settlement mutations.
    pub fn unpause(&self, caller: AccountId) -> Result<()> {
        self.set_pause(caller, PauseState::Active)
    }

    pub fn is_paused(&self) -> Result<bool> {
        Ok(self.read_state()?.pause.is_paused())
    }

    /// Repeating the current state is a no-op and emits nothing; only an
    /// actual transition is journaled.
    fn set_pause(&self, caller: AccountId, target: PauseState) -> Result<()> {
        let mut state = self.write_state()?;
        state.roles.require(&caller, Role::Admin)?;
        if state.pause == target {
            return Ok(());
        }
        state.pause = target;
        self.journal
            .append(LedgerNotice::PauseChanged(PauseChanged {
                state: target,
                by: caller,
            }));
        info!(state = %target, by = %caller, "pause switch toggled");
        Ok(())
    }

    // ----- role administration --------------------------------------------
    //
    // Role changes are deliberately not pause-gated: the pause switch
    // halts record intake, and the admin must still be able to rotate
    // submitters while investigating an incident.

    /// Grants `role` to `account`. Admin only. Returns whether membership
    /// changed; re-granting a held role is a silent no-op.
    pub fn grant_role(&self, caller: AccountId, account: AccountId, role: Role) -> Result<bool> {
        let mut state = self.write_state()?;
        state.roles.require(&caller, Role::Admin)?;
        let changed = state.roles.grant(account, role);
        if changed {
            self.journal
                .append(LedgerNotice::RoleGranted(RoleChanged {
                    account,
                    role,
                    by: caller,
                }));
            info!(%account, %role, by = %caller, "role granted");
        }
        Ok(changed)
    }

    /// Revokes `role` from `account`. Admin only.
    pub fn revoke_role(&self, caller: AccountId, account: AccountId, role: Role) -> Result<bool> {
        let mut state = self.write_state()?;
        state.roles.require(&caller, Role::Admin)?;
        let changed = state.roles.revoke(&account, role);
        if changed {
            self.journal
                .append(LedgerNotice::RoleRevoked(RoleChanged {
                    account,
                    role,
                    by: caller,
                }));
            info!(%account, %role, by = %caller, "role revoked");
        }
        Ok(changed)
    }

    /// Drops one of the caller's own roles. Requires no authorization.
    pub fn renounce_role(&self, caller: AccountId, role: Role) -> Result<bool> {
        let mut state = self.write_state()?;
        let changed = state.roles.revoke(&caller, role);
        if changed {
            self.journal
                .append(LedgerNotice::RoleRevoked(RoleChanged {
                    account: caller,
                    role,
                    by: caller,
                }));
            info!(account = %caller, %role, "role renounced");
        }
        Ok(changed)
    }

    pub fn has_role(&self, account: &AccountId, role: Role) -> Result<bool> {
        Ok(self.read_state()?.roles.has_role(account, role))
    }

    pub fn roles_of(&self, account: &AccountId) -> Result<Vec<Role>> {
        Ok(self.read_state()?.roles.roles_of(account))
    }

    // ----- gauges ----------------------------------------------------------

    /// Stored snapshots across all stations and dates.
    pub fn snapshot_count(&self) -> Result<usize> {
        Ok(self.read_state()?.snapshots.len())
    }

    /// `(station, period)` keys with at least one settlement filed.
    pub fn settlement_period_count(&self) -> Result<usize> {
        Ok(self.read_state()?.settlements.period_count())
    }

    /// Settlement records across all keys and revisions.
    pub fn settlement_revision_count(&self) -> Result<usize> {
        Ok(self.read_state()?.settlements.revision_count())
    }

    // ----- locking ----------------------------------------------------------

    fn read_state(&self) -> Result<RwLockReadGuard<'_, LedgerState>> {
        self.inner.read().map_err(|_| LedgerError::Poisoned)
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, LedgerState>> {
        self.inner.write().map_err(|_| LedgerError::Poisoned)
    }
}

fn require_active(state: &LedgerState) -> Result<()> {
    if state.pause.is_paused() {
        Err(LedgerError::SystemPaused)
    } else {
        Ok(())
    }
}

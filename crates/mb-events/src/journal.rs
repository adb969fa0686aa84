use std::sync::RwLock;

use tokio::sync::broadcast;
use tracing::debug;

use mb_types::{StationId, Timestamp};

use crate::notice::{LedgerNotice, NoticeKind, SequencedNotice};

/// Filter for subscribing to a subset of the notice stream.
#[derive(Clone, Debug, Default)]
pub struct NoticeFilter {
    /// If set, only notices scoped to these stations are delivered.
    /// Station-less notices (role and pause changes) never match.
    pub stations: Option<Vec<StationId>>,
    /// If set, only notices of these kinds are delivered.
    pub kinds: Option<Vec<NoticeKind>>,
}

impl NoticeFilter {
    /// Returns `true` if the given notice matches this filter.
    pub fn matches(&self, notice: &SequencedNotice) -> bool {
        if let Some(ref stations) = self.stations {
            match notice.notice.station() {
                Some(station) if stations.contains(station) => {}
                _ => return false,
            }
        }
        if let Some(ref kinds) = self.kinds {
            if !kinds.contains(&notice.kind()) {
                return false;
            }
        }
        true
    }
}

/// A broadcast receiver of sequenced notices.
pub type NoticeStream = broadcast::Receiver<SequencedNotice>;

/// Internal subscriber: a filter paired with a broadcast sender.
struct Subscriber {
    filter: NoticeFilter,
    sender: broadcast::Sender<SequencedNotice>,
}

/// Fan-out router delivering notices to matching subscribers.
struct NoticeRouter {
    subscribers: RwLock<Vec<Subscriber>>,
}

impl NoticeRouter {
    fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    fn subscribe(&self, filter: NoticeFilter, capacity: usize) -> NoticeStream {
        let (tx, rx) = broadcast::channel(capacity);
        self.subscribers
            .write()
            .expect("router lock poisoned")
            .push(Subscriber { filter, sender: tx });
        rx
    }

    /// Route a notice to all matching subscribers, pruning stale ones.
    fn route(&self, notice: &SequencedNotice) {
        let mut subs = self.subscribers.write().expect("router lock poisoned");
        subs.retain(|sub| {
            if sub.filter.matches(notice) {
                // A failed send means no receivers remain.
                sub.sender.send(notice.clone()).is_ok()
            } else {
                sub.sender.receiver_count() > 0
            }
        });
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers.read().expect("router lock poisoned").len()
    }
}

/// Configuration for the [`NoticeJournal`].
#[derive(Clone, Debug)]
pub struct JournalConfig {
    /// Capacity of per-subscriber broadcast channels.
    pub channel_capacity: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// The ordered notice stream.
///
/// Appends are strictly sequential: the journal assigns a dense 1-based
/// sequence number, stamps the wall clock, keeps the notice in its
/// in-memory log, and fans it out to live subscribers. Nothing is ever
/// retracted or reordered; [`replay`](Self::replay) returns the entire
/// history in order.
///
/// The journal performs no I/O. Durability is layered on externally (see
/// [`crate::archive::NoticeArchive`]), never on the commit path.
pub struct NoticeJournal {
    log: RwLock<Vec<SequencedNotice>>,
    router: NoticeRouter,
    config: JournalConfig,
}

impl NoticeJournal {
    pub fn new(config: JournalConfig) -> Self {
        Self {
            log: RwLock::new(Vec::new()),
            router: NoticeRouter::new(),
            config,
        }
    }

    /// Append one committed mutation to the stream.
    ///
    /// Callers serialize appends (the ledger holds its state lock across
    /// the call), so stream order equals commit order.
    pub fn append(&self, notice: LedgerNotice) -> SequencedNotice {
        let mut log = self.log.write().expect("journal lock poisoned");
        let seq = log.len() as u64 + 1;
        let sequenced = SequencedNotice::new(seq, Timestamp::now(), notice);
        log.push(sequenced.clone());
        drop(log);

        self.router.route(&sequenced);
        debug!(seq, kind = %sequenced.kind(), "notice appended");
        sequenced
    }

    /// Subscribe to notices matching the given filter.
    pub fn subscribe(&self, filter: NoticeFilter) -> NoticeStream {
        self.router.subscribe(filter, self.config.channel_capacity)
    }

    /// The full stream from the beginning, in order.
    pub fn replay(&self) -> Vec<SequencedNotice> {
        self.log.read().expect("journal lock poisoned").clone()
    }

    /// The stream suffix starting at `seq` (inclusive). Used by archive
    /// drains to re-sync after broadcast lag.
    pub fn replay_from(&self, seq: u64) -> Vec<SequencedNotice> {
        let log = self.log.read().expect("journal lock poisoned");
        if seq <= 1 {
            return log.clone();
        }
        log.iter().filter(|n| n.seq >= seq).cloned().collect()
    }

    /// Sequence number of the most recent notice (0 if none).
    pub fn last_seq(&self) -> u64 {
        self.log.read().expect("journal lock poisoned").len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.last_seq() == 0
    }

    pub fn subscriber_count(&self) -> usize {
        self.router.subscriber_count()
    }
}

impl Default for NoticeJournal {
    fn default() -> Self {
        Self::new(JournalConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::{PauseChanged, RoleChanged, SettlementAmended};
    use mb_types::{AccountId, PauseState, PeriodKey, Revision, Role};

    fn pause_notice() -> LedgerNotice {
        LedgerNotice::PauseChanged(PauseChanged {
            state: PauseState::Paused,
            by: AccountId::from_raw([1; 32]),
        })
    }

    fn role_notice() -> LedgerNotice {
        LedgerNotice::RoleGranted(RoleChanged {
            account: AccountId::from_raw([2; 32]),
            role: Role::SnapshotSubmitter,
            by: AccountId::from_raw([1; 32]),
        })
    }

    fn amended_notice(station: &str) -> LedgerNotice {
        LedgerNotice::SettlementAmended(SettlementAmended {
            station: StationId::new(station).unwrap(),
            period: PeriodKey::new("2025-01").unwrap(),
            prior_revision: Revision::FIRST,
            new_revision: Revision::new(2).unwrap(),
            reason: "correction".into(),
        })
    }

    #[test]
    fn sequence_numbers_are_dense_and_one_based() {
        let journal = NoticeJournal::default();
        let a = journal.append(pause_notice());
        let b = journal.append(role_notice());
        let c = journal.append(pause_notice());
        assert_eq!((a.seq, b.seq, c.seq), (1, 2, 3));
        assert_eq!(journal.last_seq(), 3);
    }

    #[test]
    fn replay_returns_full_history_in_order() {
        let journal = NoticeJournal::default();
        journal.append(pause_notice());
        journal.append(role_notice());
        let replayed = journal.replay();
        assert_eq!(replayed.len(), 2);
        assert_eq!(replayed[0].seq, 1);
        assert_eq!(replayed[1].seq, 2);
        assert!(replayed.iter().all(|n| n.verify_integrity()));
    }

    #[test]
    fn replay_from_returns_suffix() {
        let journal = NoticeJournal::default();
        for _ in 0..5 {
            journal.append(pause_notice());
        }
        let suffix = journal.replay_from(4);
        assert_eq!(suffix.len(), 2);
        assert_eq!(suffix[0].seq, 4);
        assert_eq!(journal.replay_from(1).len(), 5);
        assert!(journal.replay_from(99).is_empty());
    }

    #[test]
    fn subscriber_receives_matching_kinds_only() {
        let journal = NoticeJournal::default();
        let mut stream = journal.subscribe(NoticeFilter {
            kinds: Some(vec![NoticeKind::RoleGranted]),
            ..Default::default()
        });
        assert_eq!(journal.subscriber_count(), 1);

        journal.append(pause_notice());
        journal.append(role_notice());

        let received = stream.try_recv().unwrap();
        assert_eq!(received.kind(), NoticeKind::RoleGranted);
        assert!(stream.try_recv().is_err());
    }

    #[test]
    fn station_filter_excludes_station_less_notices() {
        let journal = NoticeJournal::default();
        let mut stream = journal.subscribe(NoticeFilter {
            stations: Some(vec![StationId::new("STATION-001").unwrap()]),
            ..Default::default()
        });

        journal.append(pause_notice()); // station-less
        journal.append(amended_notice("STATION-002"));
        journal.append(amended_notice("STATION-001"));

        let received = stream.try_recv().unwrap();
        assert_eq!(
            received.notice.station().map(|s| s.as_str()),
            Some("STATION-001")
        );
        assert!(stream.try_recv().is_err());
    }

    #[test]
    fn empty_filter_matches_everything() {
        let journal = NoticeJournal::default();
        let mut stream = journal.subscribe(NoticeFilter::default());
        journal.append(pause_notice());
        journal.append(role_notice());
        assert!(stream.try_recv().is_ok());
        assert!(stream.try_recv().is_ok());
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let journal = NoticeJournal::default();
        let stream = journal.subscribe(NoticeFilter::default());
        drop(stream);
        journal.append(pause_notice());
        assert_eq!(journal.subscriber_count(), 0);
    }

    #[test]
    fn concurrent_appends_produce_unique_seqs() {
        use std::collections::HashSet;
        use std::sync::Arc;
        use std::thread;

        let journal = Arc::new(NoticeJournal::default());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let journal = Arc::clone(&journal);
            handles.push(thread::spawn(move || {
                (0..25)
                    .map(|_| journal.append(pause_notice()).seq)
                    .collect::<Vec<_>>()
            }));
        }

        let mut seen = HashSet::new();
        for h in handles {
            for seq in h.join().unwrap() {
                assert!(seen.insert(seq), "duplicate seq {seq}");
            }
        }
        assert_eq!(seen.len(), 100);
        assert_eq!(journal.last_seq(), 100);
    }
}

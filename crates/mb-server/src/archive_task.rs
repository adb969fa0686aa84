//! Notice archive drain.
//!
//! A subscriber task copies the notice stream into a [`NoticeArchive`]
//! file. It runs outside the commit path: the ledger never waits on disk.
//! After broadcast lag or a restart, the task re-syncs from the journal by
//! sequence number, so the archive converges on the full stream.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use mb_events::{NoticeArchive, NoticeFilter, NoticeJournal};

/// Tail the journal into the archive until the journal is dropped.
pub async fn drain_to_archive(journal: Arc<NoticeJournal>, archive: NoticeArchive) {
    let mut stream = journal.subscribe(NoticeFilter::default());
    info!(path = %archive.path().display(), "notice archive drain started");

    // Catch up on anything committed before we subscribed.
    sync_from_journal(&journal, &archive);

    loop {
        match stream.recv().await {
            Ok(notice) => {
                if notice.seq < archive.next_seq() {
                    continue; // already archived during a sync
                }
                if notice.seq > archive.next_seq() {
                    sync_from_journal(&journal, &archive);
                    continue;
                }
                if let Err(e) = archive.append(&notice) {
                    warn!(seq = notice.seq, error = %e, "archive append failed");
                }
            }
            Err(RecvError::Lagged(missed)) => {
                warn!(missed, "archive drain lagged; re-syncing from journal");
                sync_from_journal(&journal, &archive);
            }
            Err(RecvError::Closed) => break,
        }
    }
    info!("notice archive drain stopped");
}

fn sync_from_journal(journal: &NoticeJournal, archive: &NoticeArchive) {
    for notice in journal.replay_from(archive.next_seq()) {
        if let Err(e) = archive.append(&notice) {
            warn!(seq = notice.seq, error = %e, "archive sync append failed");
            return;
        }
    }
}

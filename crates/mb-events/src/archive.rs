use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::{EventError, Result};
use crate::notice::SequencedNotice;

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

/// Internal mutable state for the archive writer.
struct ArchiveWriter {
    writer: BufWriter<File>,
    /// Sequence number the next appended notice must carry.
    next_seq: u64,
}

/// Append-only file archive of the notice stream.
///
/// On-disk format, per entry:
/// ```text
/// [4 bytes: entry length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized SequencedNotice)]
/// ```
///
/// Committed entries are never rewritten or compacted: notices are
/// permanent. Appends must arrive in sequence order; a drain that lagged
/// re-syncs from the journal by sequence number and resumes. On open, the
/// file is scanned front-to-back and the longest valid dense prefix wins;
/// a torn tail from a crash is cut off so resumed appends land where the
/// scan can reach them.
pub struct NoticeArchive {
    path: PathBuf,
    writer: Mutex<ArchiveWriter>,
}

impl NoticeArchive {
    /// Open (or create) an archive file at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Scan whatever is already there to find the resume point.
        let (existing, valid_len) = if path.exists() {
            scan_entries(path)?
        } else {
            (Vec::new(), 0)
        };
        let next_seq = existing.last().map(|n| n.seq + 1).unwrap_or(1);

        // A torn tail must not survive into append mode: new entries would
        // land behind the garbage, unreachable by the front-to-back scan.
        if path.exists() {
            let file_len = fs::metadata(path)?.len();
            if file_len > valid_len {
                warn!(
                    path = %path.display(),
                    file_len,
                    valid_len,
                    "truncating torn archive tail"
                );
                let file = OpenOptions::new().write(true).open(path)?;
                file.set_len(valid_len)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        debug!(path = %path.display(), next_seq, "archive opened");
        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(ArchiveWriter {
                writer: BufWriter::new(file),
                next_seq,
            }),
        })
    }

    /// Append one notice. The notice's `seq` must be exactly the next
    /// expected sequence number.
    pub fn append(&self, notice: &SequencedNotice) -> Result<()> {
        let payload = bincode::serialize(notice)
            .map_err(|e| EventError::Serialization(e.to_string()))?;
        let length = payload.len() as u32;
        let crc = crc32fast::hash(&payload);

        let mut w = self.writer.lock().expect("archive mutex poisoned");
        if notice.seq != w.next_seq {
            return Err(EventError::SequenceGap {
                expected: w.next_seq,
                actual: notice.seq,
            });
        }

        w.writer.write_all(&length.to_le_bytes())?;
        w.writer.write_all(&crc.to_le_bytes())?;
        w.writer.write_all(&payload)?;
        w.writer.flush()?;
        w.next_seq += 1;

        debug!(seq = notice.seq, len = payload.len(), "archive append");
        Ok(())
    }

    /// Sequence number the next append must carry.
    pub fn next_seq(&self) -> u64 {
        self.writer.lock().expect("archive mutex poisoned").next_seq
    }

    /// Read the full archived stream from disk.
    pub fn read_all(&self) -> Result<Vec<SequencedNotice>> {
        Ok(scan_entries(&self.path)?.0)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Scan an archive file front-to-back, returning the longest valid dense
/// prefix and its byte length. Stops (with a warning) at the first torn,
/// corrupt, or out-of-sequence entry.
fn scan_entries(path: &Path) -> Result<(Vec<SequencedNotice>, u64)> {
    let mut reader = BufReader::new(File::open(path)?);
    let file_len = reader.get_ref().metadata()?.len();
    let mut entries: Vec<SequencedNotice> = Vec::new();
    let mut offset: u64 = 0;

    while offset + HEADER_SIZE as u64 <= file_len {
        let mut header = [0u8; HEADER_SIZE];
        match reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }

        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        if length == 0 || offset + HEADER_SIZE as u64 + length as u64 > file_len {
            warn!(offset, length, file_len, "torn archive entry; ignoring tail");
            break;
        }

        let mut payload = vec![0u8; length as usize];
        match reader.read_exact(&mut payload) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                warn!(offset, "truncated archive entry; ignoring tail");
                break;
            }
            Err(e) => return Err(e.into()),
        }

        if crc32fast::hash(&payload) != expected_crc {
            warn!(offset, "archive CRC mismatch; ignoring tail");
            break;
        }

        let notice: SequencedNotice = match bincode::deserialize(&payload) {
            Ok(n) => n,
            Err(e) => {
                warn!(offset, error = %e, "undecodable archive entry; ignoring tail");
                break;
            }
        };

        let expected_seq = entries.last().map(|n| n.seq + 1).unwrap_or(notice.seq);
        if notice.seq != expected_seq || !notice.verify_integrity() {
            warn!(
                offset,
                seq = notice.seq,
                expected_seq,
                "archive entry fails sequence or integrity check; ignoring tail"
            );
            break;
        }

        entries.push(notice);
        offset += HEADER_SIZE as u64 + length as u64;
    }

    debug!(count = entries.len(), valid_len = offset, "archive scan complete");
    Ok((entries, offset))
}

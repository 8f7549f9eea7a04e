//! Hash-chained record of stored tunable values
//!
//! Each entry hashes its own content together with the previous entry's
//! hash (SHA-256), so editing or dropping an entry breaks the chain.

use crate::error::{ProvenanceError, ProvenanceResult};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tunable_core::{BackendError, FieldRecord, TunableSink};

/// Hash before the first entry
pub const GENESIS_HASH: [u8; 32] = [0u8; 32];

/// One recorded value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    /// Position in the log, from 0
    pub seq: u64,
    /// Store batch the value belongs to, from 0
    pub batch: u64,
    /// Time of recording
    pub timestamp: DateTime<Utc>,
    /// External key
    pub key: String,
    /// External text
    pub value: String,
    /// Declaration description
    pub description: String,
    /// Hash of the previous entry
    #[serde(with = "hex::serde")]
    pub prev_hash: [u8; 32],
    /// Hash of this entry
    #[serde(with = "hex::serde")]
    pub hash: [u8; 32],
}

impl ProvenanceEntry {
    /// Hash this entry's content would have
    #[must_use]
    pub fn compute_hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.seq.to_le_bytes());
        hasher.update(self.batch.to_le_bytes());
        hasher.update(
            self.timestamp
                .to_rfc3339_opts(SecondsFormat::Nanos, true)
                .as_bytes(),
        );
        hasher.update(self.key.as_bytes());
        hasher.update([0]);
        hasher.update(self.value.as_bytes());
        hasher.update([0]);
        hasher.update(self.description.as_bytes());
        hasher.update([0]);
        hasher.update(self.prev_hash);
        hasher.finalize().into()
    }

    /// `key = value  # description`
    #[must_use]
    pub fn render_line(&self) -> String {
        format!("{} = {}  # {}", self.key, self.value, self.description)
    }
}

#[derive(Debug, Default)]
struct LogState {
    entries: Vec<ProvenanceEntry>,
    batch: u64,
}

/// Append-only provenance log
///
/// Write-only from the interceptor's point of view: it is a sink, never a
/// source. `&ProvenanceLog` is also a sink, so one log can be shared.
#[derive(Debug, Default)]
pub struct ProvenanceLog {
    inner: Mutex<LogState>,
}

impl ProvenanceLog {
    /// Create empty log
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one value to the current batch
    pub fn append(&self, key: &str, value: &str, description: &str) -> ProvenanceEntry {
        let mut state = self.inner.lock();
        let prev_hash = state.entries.last().map_or(GENESIS_HASH, |e| e.hash);
        let mut entry = ProvenanceEntry {
            seq: state.entries.len() as u64,
            batch: state.batch,
            timestamp: Utc::now(),
            key: key.to_string(),
            value: value.to_string(),
            description: description.to_string(),
            prev_hash,
            hash: GENESIS_HASH,
        };
        entry.hash = entry.compute_hash();
        tracing::info!(
            seq = entry.seq,
            batch = entry.batch,
            key = %entry.key,
            value = %entry.value,
            "tunable recorded"
        );
        state.entries.push(entry.clone());
        entry
    }

    /// Close the current batch, returning its number
    pub fn close_batch(&self) -> u64 {
        let mut state = self.inner.lock();
        let closed = state.batch;
        let recorded = state.entries.iter().filter(|e| e.batch == closed).count();
        state.batch += 1;
        tracing::info!(batch = closed, recorded, "provenance batch closed");
        closed
    }

    /// Copy of every entry
    #[must_use]
    pub fn entries(&self) -> Vec<ProvenanceEntry> {
        self.inner.lock().entries.clone()
    }

    /// Entries of one batch
    #[must_use]
    pub fn batch_entries(&self, batch: u64) -> Vec<ProvenanceEntry> {
        self.inner
            .lock()
            .entries
            .iter()
            .filter(|e| e.batch == batch)
            .cloned()
            .collect()
    }

    /// Number of closed batches
    #[must_use]
    pub fn batches(&self) -> u64 {
        self.inner.lock().batch
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Check if log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Hex hash of the newest entry
    #[must_use]
    pub fn head_hash(&self) -> Option<String> {
        self.inner.lock().entries.last().map(|e| hex::encode(e.hash))
    }

    /// Re-walk the hash chain
    ///
    /// # Errors
    /// Returns [`ProvenanceError::IntegrityViolation`] at the first entry
    /// whose link or content hash does not match
    pub fn verify_integrity(&self) -> ProvenanceResult<()> {
        let state = self.inner.lock();
        let mut prev = GENESIS_HASH;
        for (index, entry) in state.entries.iter().enumerate() {
            if entry.seq != index as u64 {
                return Err(ProvenanceError::IntegrityViolation {
                    seq: entry.seq,
                    reason: "sequence gap",
                });
            }
            if entry.prev_hash != prev {
                return Err(ProvenanceError::IntegrityViolation {
                    seq: entry.seq,
                    reason: "previous hash mismatch",
                });
            }
            if entry.hash != entry.compute_hash() {
                return Err(ProvenanceError::IntegrityViolation {
                    seq: entry.seq,
                    reason: "content hash mismatch",
                });
            }
            prev = entry.hash;
        }
        Ok(())
    }

    /// One `key = value  # description` line per entry
    #[must_use]
    pub fn render_lines(&self) -> Vec<String> {
        self.inner
            .lock()
            .entries
            .iter()
            .map(ProvenanceEntry::render_line)
            .collect()
    }

    /// Export entries as JSON lines
    ///
    /// # Errors
    /// Returns [`ProvenanceError::Serialization`] if an entry fails to serialize
    pub fn to_json_lines(&self) -> ProvenanceResult<String> {
        let state = self.inner.lock();
        let mut out = String::new();
        for entry in &state.entries {
            out.push_str(&serde_json::to_string(entry)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Import entries exported by [`to_json_lines`](Self::to_json_lines)
    ///
    /// The chain is not checked; call
    /// [`verify_integrity`](Self::verify_integrity) afterwards.
    ///
    /// Every imported batch counts as closed, including one that was still
    /// open at export time. New entries start the batch after the last one.
    ///
    /// # Errors
    /// Returns [`ProvenanceError::Serialization`] for malformed lines
    pub fn from_json_lines(text: &str) -> ProvenanceResult<Self> {
        let entries = text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str::<ProvenanceEntry>)
            .collect::<Result<Vec<_>, _>>()?;
        let batch = entries.last().map_or(0, |e| e.batch + 1);
        Ok(Self {
            inner: Mutex::new(LogState { entries, batch }),
        })
    }
}

impl TunableSink for ProvenanceLog {
    fn record(&mut self, record: FieldRecord<'_>) -> Result<(), BackendError> {
        self.append(record.key, record.value, &record.meta.description);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        self.close_batch();
        Ok(())
    }
}

impl TunableSink for &ProvenanceLog {
    fn record(&mut self, record: FieldRecord<'_>) -> Result<(), BackendError> {
        self.append(record.key, record.value, &record.meta.description);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), BackendError> {
        self.close_batch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_links_entries() {
        let log = ProvenanceLog::new();
        let first = log.append("a.x", "1", "X");
        let second = log.append("a.y", "2", "Y");

        assert_eq!(first.prev_hash, GENESIS_HASH);
        assert_eq!(second.prev_hash, first.hash);
        assert_eq!(second.seq, 1);
        assert!(log.verify_integrity().is_ok());
        assert_eq!(log.head_hash(), Some(hex::encode(second.hash)));
    }

    #[test]
    fn batches_advance_on_close() {
        let log = ProvenanceLog::new();
        log.append("a.x", "1", "X");
        assert_eq!(log.close_batch(), 0);
        log.append("a.x", "2", "X");

        assert_eq!(log.batches(), 1);
        assert_eq!(log.batch_entries(0).len(), 1);
        assert_eq!(log.batch_entries(1)[0].value, "2");
    }

    #[test]
    fn render_line_format() {
        let log = ProvenanceLog::new();
        log.append("layout.iterations", "10", "Number of iterations");
        assert_eq!(log.render_lines(), vec!["layout.iterations = 10  # Number of iterations"]);
    }

    #[test]
    fn import_closes_the_open_batch() {
        let log = ProvenanceLog::new();
        log.append("a.x", "1", "X");
        log.close_batch();
        log.append("a.x", "2", "X");
        assert_eq!(log.batches(), 1);

        let imported = ProvenanceLog::from_json_lines(&log.to_json_lines().unwrap()).unwrap();
        assert_eq!(imported.batches(), 2);
        let next = imported.append("a.x", "3", "X");
        assert_eq!(next.batch, 2);
        assert_eq!(next.seq, 2);
        assert!(imported.verify_integrity().is_ok());
    }

    #[test]
    fn empty_log_verifies() {
        let log = ProvenanceLog::new();
        assert!(log.is_empty());
        assert!(log.verify_integrity().is_ok());
        assert_eq!(log.head_hash(), None);
    }
}

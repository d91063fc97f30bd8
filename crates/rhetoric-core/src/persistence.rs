// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Adjustment Persistence
// ─────────────────────────────────────────────────────────────────────
//! Durable storage for adjustment records, off the hot path.
//!
//! The calibrator never waits on disk: writes are queued to a
//! background thread and failures are logged, not returned. The
//! in-memory store stays authoritative for the process lifetime.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::Mutex;

use rhetoric_types::{AdjustmentRecord, GuardError, GuardResult};

/// Trait for durable key-value backends keyed by pattern id.
pub trait PersistenceBackend: Send + Sync {
    fn save(&self, record: &AdjustmentRecord) -> GuardResult<()>;
    fn remove(&self, pattern_id: &str) -> GuardResult<()>;
    fn load_all(&self) -> GuardResult<Vec<AdjustmentRecord>>;
}

/// One pretty-printed JSON file per pattern id.
pub struct JsonFilePersistence {
    dir: PathBuf,
}

impl JsonFilePersistence {
    /// Open (creating if needed) the storage directory.
    pub fn open(dir: impl Into<PathBuf>) -> GuardResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            GuardError::Persistence(format!("cannot create {}: {e}", dir.display()))
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, pattern_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", encode_file_stem(pattern_id)))
    }
}

/// Injective file-name encoding: `[A-Za-z0-9_-]` pass through, every
/// other byte becomes `%XX`.
fn encode_file_stem(pattern_id: &str) -> String {
    let mut out = String::with_capacity(pattern_id.len());
    for b in pattern_id.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

impl PersistenceBackend for JsonFilePersistence {
    fn save(&self, record: &AdjustmentRecord) -> GuardResult<()> {
        let path = self.path_for(record.pattern_id());
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(record)
            .map_err(|e| GuardError::Persistence(format!("serialize: {e}")))?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, pattern_id: &str) -> GuardResult<()> {
        match fs::remove_file(self.path_for(pattern_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn load_all(&self) -> GuardResult<Vec<AdjustmentRecord>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path)?;
            match serde_json::from_slice::<AdjustmentRecord>(&bytes) {
                Ok(r) => records.push(r),
                Err(e) => log::warn!("Skipping unreadable record {}: {e}", path.display()),
            }
        }
        records.sort_by(|a, b| a.pattern_id().cmp(b.pattern_id()));
        Ok(records)
    }
}

enum PersistOp {
    Save(AdjustmentRecord),
    Remove(String),
    Flush(Sender<()>),
}

/// Fire-and-forget writer thread in front of a backend.
pub struct PersistenceWriter {
    sender: Mutex<Option<Sender<PersistOp>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl PersistenceWriter {
    pub fn spawn(backend: Arc<dyn PersistenceBackend>) -> GuardResult<Self> {
        let (tx, rx) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name("rhetoric-persist".to_string())
            .spawn(move || writer_loop(backend, rx))
            .map_err(|e| GuardError::Persistence(format!("cannot spawn writer: {e}")))?;
        Ok(Self {
            sender: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
        })
    }

    fn send(&self, op: PersistOp) -> bool {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(tx) => tx.send(op).is_ok(),
            None => false,
        }
    }

    pub fn save(&self, record: AdjustmentRecord) {
        let id = record.pattern_id().to_string();
        if !self.send(PersistOp::Save(record)) {
            log::error!("Persistence writer gone; record '{id}' kept in memory only");
        }
    }

    pub fn remove(&self, pattern_id: &str) {
        if !self.send(PersistOp::Remove(pattern_id.to_string())) {
            log::error!("Persistence writer gone; removal of '{pattern_id}' not persisted");
        }
    }

    /// Block until every queued write has been attempted, or `timeout`
    /// elapses. Returns false on timeout or a dead writer.
    pub fn flush(&self, timeout: Duration) -> bool {
        let (ack_tx, ack_rx) = mpsc::channel();
        if !self.send(PersistOp::Flush(ack_tx)) {
            return false;
        }
        ack_rx.recv_timeout(timeout).is_ok()
    }
}

impl Drop for PersistenceWriter {
    fn drop(&mut self) {
        // Closing the channel lets the loop drain and exit.
        self.sender.lock().take();
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                log::error!("Persistence writer thread panicked");
            }
        }
    }
}

fn writer_loop(backend: Arc<dyn PersistenceBackend>, rx: Receiver<PersistOp>) {
    for op in rx {
        match op {
            PersistOp::Save(record) => {
                if let Err(e) = backend.save(&record) {
                    log::error!("Failed to persist '{}': {e}", record.pattern_id());
                }
            }
            PersistOp::Remove(id) => {
                if let Err(e) = backend.remove(&id) {
                    log::error!("Failed to remove persisted '{id}': {e}");
                }
            }
            PersistOp::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, delta: f64) -> AdjustmentRecord {
        let mut r = AdjustmentRecord::new(id);
        r.apply_delta(delta, 0.3);
        r
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFilePersistence::open(dir.path()).unwrap();
        backend.save(&record("urgency-deadline", -0.1)).unwrap();
        backend.save(&record("a/b", 0.05)).unwrap();
        let loaded = backend.load_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].pattern_id(), "a/b");
        assert!((loaded[1].adjustment_factor() + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_distinct_ids_never_share_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFilePersistence::open(dir.path()).unwrap();
        backend.save(&record("a/b", 0.1)).unwrap();
        backend.save(&record("a_b", -0.2)).unwrap();
        backend.save(&record("a%2Fb", 0.05)).unwrap();
        let loaded = backend.load_all().unwrap();
        let ids: Vec<&str> = loaded.iter().map(|r| r.pattern_id()).collect();
        assert_eq!(ids, vec!["a%2Fb", "a/b", "a_b"]);
        assert!((loaded[1].adjustment_factor() - 0.1).abs() < 1e-12);
        assert!((loaded[2].adjustment_factor() + 0.2).abs() < 1e-12);

        backend.remove("a/b").unwrap();
        let ids: Vec<String> = backend
            .load_all()
            .unwrap()
            .iter()
            .map(|r| r.pattern_id().to_string())
            .collect();
        assert_eq!(ids, vec!["a%2Fb".to_string(), "a_b".to_string()]);
    }

    #[test]
    fn test_file_stem_encoding() {
        assert_eq!(encode_file_stem("urgency-deadline"), "urgency-deadline");
        assert_eq!(encode_file_stem("a/b"), "a%2Fb");
        assert_eq!(encode_file_stem("a%2Fb"), "a%252Fb");
        assert_eq!(encode_file_stem("é"), "%C3%A9");
    }

    #[test]
    fn test_remove_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFilePersistence::open(dir.path()).unwrap();
        assert!(backend.remove("never-saved").is_ok());
    }

    #[test]
    fn test_load_skips_garbage() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("junk.json"), b"{oops").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
        let backend = JsonFilePersistence::open(dir.path()).unwrap();
        backend.save(&record("p", 0.05)).unwrap();
        assert_eq!(backend.load_all().unwrap().len(), 1);
    }

    #[test]
    fn test_writer_flush_persists() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(JsonFilePersistence::open(dir.path()).unwrap());
        let writer = PersistenceWriter::spawn(backend.clone()).unwrap();
        writer.save(record("p", 0.05));
        writer.save(record("q", -0.05));
        writer.remove("q");
        assert!(writer.flush(Duration::from_secs(5)));
        let loaded = backend.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].pattern_id(), "p");
    }

    struct FailingBackend;

    impl PersistenceBackend for FailingBackend {
        fn save(&self, _record: &AdjustmentRecord) -> GuardResult<()> {
            Err(GuardError::Persistence("disk full".into()))
        }
        fn remove(&self, _pattern_id: &str) -> GuardResult<()> {
            Err(GuardError::Persistence("disk full".into()))
        }
        fn load_all(&self) -> GuardResult<Vec<AdjustmentRecord>> {
            Err(GuardError::Persistence("unavailable".into()))
        }
    }

    #[test]
    fn test_writer_survives_backend_failure() {
        let writer = PersistenceWriter::spawn(Arc::new(FailingBackend)).unwrap();
        writer.save(record("p", 0.05));
        assert!(writer.flush(Duration::from_secs(5)));
        writer.save(record("p", 0.1));
        assert!(writer.flush(Duration::from_secs(5)));
    }

    #[test]
    fn test_drop_drains_queue() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(JsonFilePersistence::open(dir.path()).unwrap());
        {
            let writer = PersistenceWriter::spawn(backend.clone()).unwrap();
            writer.save(record("p", 0.05));
        }
        assert_eq!(backend.load_all().unwrap().len(), 1);
    }
}

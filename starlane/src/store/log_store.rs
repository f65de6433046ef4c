//! File-backed append-only store.
//!
//! Each table directory holds a single `data.log`. Every write appends one
//! record:
//!
//! ```text
//! | tag u8 | key_len u32 LE | value_len u32 LE | key | value | crc32 u32 LE |
//! ```
//!
//! The tag is `1` for a put and `2` for a delete (tombstone, empty value).
//! The checksum covers everything before it. On open the log is replayed into
//! an ordered in-memory index. A record cut short at the end of the log is
//! the remains of an interrupted write and is truncated away; a checksum
//! mismatch or unknown tag is reported as [`StoreError::Corrupt`]. When dead
//! records outweigh live ones the log is rewritten before the store is
//! handed out.
//!
//! An open store holds an exclusive lock on `LOCK` in its directory until it
//! is dropped, so a second handle on the same table fails with
//! [`StoreError::Locked`].

use crc::{Crc, CRC_32_ISCSI};
use fs2::FileExt;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::r#trait::{Store, StoreError};

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);

const LOG_FILE: &str = "data.log";
const COMPACT_FILE: &str = "data.log.compact";
const LOCK_FILE: &str = "LOCK";

const TAG_PUT: u8 = 1;
const TAG_DELETE: u8 = 2;

const HEADER_LEN: usize = 9;
const CHECKSUM_LEN: usize = 4;

/// Dead bytes tolerated before open-time compaction is considered.
const COMPACT_MIN_DEAD_BYTES: u64 = 64 * 1024;

/// Store persisted as an append-only log with an in-memory index.
#[derive(Debug)]
pub struct LogStore {
    path: PathBuf,
    file: File,
    _lock: File,
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
    file_len: u64,
    live_bytes: u64,
}

impl LogStore {
    /// Open (or create) the store kept in `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let lock = lock_directory(dir)?;
        let path = dir.join(LOG_FILE);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        let Replay { entries, valid_len } = replay(&path, &bytes)?;
        if valid_len < bytes.len() {
            tracing::warn!(
                path = %path.display(),
                offset = valid_len,
                dropped = bytes.len() - valid_len,
                "Truncating partial record at end of store log"
            );
            let file = OpenOptions::new().write(true).open(&path)?;
            file.set_len(valid_len as u64)?;
            file.sync_all()?;
        }
        let live_bytes = entries
            .iter()
            .map(|(key, value)| record_len(key, value))
            .sum();

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut store = Self {
            path,
            file,
            _lock: lock,
            entries,
            file_len: valid_len as u64,
            live_bytes,
        };

        let dead = store.dead_bytes();
        if dead > COMPACT_MIN_DEAD_BYTES && dead > store.live_bytes {
            tracing::debug!(path = %store.path.display(), dead, "Compacting store log");
            store.compact()?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the log file.
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Bytes in the log that no longer back a live key.
    pub fn dead_bytes(&self) -> u64 {
        self.file_len.saturating_sub(self.live_bytes)
    }

    /// Rewrite the log with only live records.
    pub fn compact(&mut self) -> Result<(), StoreError> {
        let compact_path = self.path.with_file_name(COMPACT_FILE);
        {
            let mut out = File::create(&compact_path)?;
            let mut buffer = Vec::with_capacity(self.live_bytes as usize);
            for (key, value) in &self.entries {
                buffer.extend_from_slice(&encode_record(TAG_PUT, key, value)?);
            }
            out.write_all(&buffer)?;
            out.sync_all()?;
        }
        fs::rename(&compact_path, &self.path)?;

        self.file = OpenOptions::new().append(true).open(&self.path)?;
        self.file_len = self.live_bytes;
        Ok(())
    }

    fn append(&mut self, record: &[u8]) -> Result<(), StoreError> {
        self.file.write_all(record)?;
        self.file_len += record.len() as u64;
        Ok(())
    }
}

impl Store for LogStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let record = encode_record(TAG_PUT, key, value)?;
        self.append(&record)?;
        if let Some(old) = self.entries.insert(key.to_vec(), value.to_vec()) {
            self.live_bytes -= record_len(key, &old);
        }
        self.live_bytes += record.len() as u64;
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<bool, StoreError> {
        let Some(old) = self.entries.get(key) else {
            return Ok(false);
        };
        let freed = record_len(key, old);
        let record = encode_record(TAG_DELETE, key, &[])?;
        self.append(&record)?;
        self.entries.remove(key);
        self.live_bytes -= freed;
        Ok(true)
    }

    fn keys(&self) -> Vec<Vec<u8>> {
        self.entries.keys().cloned().collect()
    }

    fn count(&self) -> usize {
        self.entries.len()
    }

    fn flush(&mut self) -> Result<(), StoreError> {
        self.file.sync_data()?;
        Ok(())
    }
}

fn lock_directory(dir: &Path) -> Result<File, StoreError> {
    let lock = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(dir.join(LOCK_FILE))?;
    match lock.try_lock_exclusive() {
        Ok(()) => Ok(lock),
        Err(err)
            if err.kind() == io::ErrorKind::WouldBlock
                || err.raw_os_error() == fs2::lock_contended_error().raw_os_error() =>
        {
            Err(StoreError::Locked(dir.to_path_buf()))
        }
        Err(err) => Err(err.into()),
    }
}

fn record_len(key: &[u8], value: &[u8]) -> u64 {
    (HEADER_LEN + key.len() + value.len() + CHECKSUM_LEN) as u64
}

fn encode_record(tag: u8, key: &[u8], value: &[u8]) -> Result<Vec<u8>, StoreError> {
    let key_len = u32::try_from(key.len()).map_err(|_| StoreError::TooLarge(key.len()))?;
    let value_len = u32::try_from(value.len()).map_err(|_| StoreError::TooLarge(value.len()))?;

    let mut record = Vec::with_capacity(record_len(key, value) as usize);
    record.push(tag);
    record.extend_from_slice(&key_len.to_le_bytes());
    record.extend_from_slice(&value_len.to_le_bytes());
    record.extend_from_slice(key);
    record.extend_from_slice(value);
    let checksum = CRC32.checksum(&record);
    record.extend_from_slice(&checksum.to_le_bytes());
    Ok(record)
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(word)
}

struct Replay {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
    /// Length of the log up to the last complete record.
    valid_len: usize,
}

fn replay(path: &Path, bytes: &[u8]) -> Result<Replay, StoreError> {
    let corrupt = |offset: usize, reason: &str| StoreError::Corrupt {
        path: path.to_path_buf(),
        offset: offset as u64,
        reason: reason.to_string(),
    };

    let mut entries = BTreeMap::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let rest = &bytes[offset..];
        if rest.len() < HEADER_LEN {
            break;
        }
        let tag = rest[0];
        let key_len = read_u32(rest, 1) as usize;
        let value_len = read_u32(rest, 5) as usize;

        let body_end = HEADER_LEN + key_len + value_len;
        if rest.len() < body_end + CHECKSUM_LEN {
            break;
        }
        let stored = read_u32(rest, body_end);
        if CRC32.checksum(&rest[..body_end]) != stored {
            return Err(corrupt(offset, "checksum mismatch"));
        }

        let key = rest[HEADER_LEN..HEADER_LEN + key_len].to_vec();
        match tag {
            TAG_PUT => {
                entries.insert(key, rest[HEADER_LEN + key_len..body_end].to_vec());
            }
            TAG_DELETE => {
                entries.remove(&key);
            }
            _ => return Err(corrupt(offset, "unknown record tag")),
        }
        offset += body_end + CHECKSUM_LEN;
    }
    Ok(Replay {
        entries,
        valid_len: offset,
    })
}

//! Chat-log store interface and the default file-backed implementation.

use crate::error::ChatLogError;
use crate::model::{ChatLogRecord, Feedback, NewChatLog};
use chrono::Utc;
use log::{debug, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Schema version written into the persisted envelope.
pub const STORE_SCHEMA_VERSION: u32 = 1;

/// Durable, append-only record of chat exchanges.
///
/// Implementations serialize `append` and `update_feedback` against each other
/// and never expose a half-applied mutation to `list_all`.
pub trait ChatLogStore: Send + Sync {
    /// Validate and append an entry, returning the stored record with its key.
    fn append(&self, entry: NewChatLog) -> Result<ChatLogRecord, ChatLogError>;
    /// Look up a record by exact timestamp key.
    fn get(&self, ts: i64) -> Result<Option<ChatLogRecord>, ChatLogError>;
    /// Overwrite the feedback of the record keyed by `ts`.
    ///
    /// Returns [`ChatLogError::NotFound`] without touching state when no record
    /// carries the key.
    fn update_feedback(
        &self,
        ts: i64,
        feedback: Option<Feedback>,
    ) -> Result<ChatLogRecord, ChatLogError>;
    /// Every record in insertion order.
    fn list_all(&self) -> Result<Vec<ChatLogRecord>, ChatLogError>;
}

/// Pick the key for a new record: the current second, bumped past the last
/// assigned key so keys stay unique and increasing.
///
/// Returns `None` once the last key is `i64::MAX`.
pub(crate) fn next_timestamp(last: Option<i64>, now: i64) -> Option<i64> {
    match last {
        Some(last) if last >= now => last.checked_add(1),
        _ => Some(now),
    }
}

/// In-memory collection shared by the store implementations.
#[derive(Debug, Clone, Default)]
pub(crate) struct LogBook {
    seq: u64,
    last_ts: Option<i64>,
    logs: Vec<ChatLogRecord>,
}

impl LogBook {
    /// Rebuild a book from persisted parts, numbering records that predate ids.
    pub(crate) fn from_parts(seq: u64, mut logs: Vec<ChatLogRecord>) -> Self {
        let max_id = logs.iter().map(|record| record.id).max().unwrap_or(0);
        let mut seq = seq.max(max_id);
        for record in logs.iter_mut().filter(|record| record.id == 0) {
            seq += 1;
            record.id = seq;
        }
        let last_ts = logs.iter().map(|record| record.ts).max();
        Self { seq, last_ts, logs }
    }

    pub(crate) fn append(
        &mut self,
        entry: NewChatLog,
        now: i64,
    ) -> Result<ChatLogRecord, ChatLogError> {
        let ts = next_timestamp(self.last_ts, now)
            .ok_or(ChatLogError::KeysExhausted(self.last_ts.unwrap_or(now)))?;
        self.seq += 1;
        let record = entry.into_record(ts, self.seq);
        self.last_ts = Some(ts);
        self.logs.push(record.clone());
        Ok(record)
    }

    pub(crate) fn position(&self, ts: i64) -> Option<usize> {
        self.logs.iter().position(|record| record.ts == ts)
    }

    pub(crate) fn get(&self, ts: i64) -> Option<&ChatLogRecord> {
        self.position(ts).map(|idx| &self.logs[idx])
    }

    pub(crate) fn set_feedback(
        &mut self,
        ts: i64,
        feedback: Option<Feedback>,
    ) -> Result<ChatLogRecord, ChatLogError> {
        let idx = self.position(ts).ok_or(ChatLogError::NotFound(ts))?;
        let record = &mut self.logs[idx];
        record.feedback = feedback;
        Ok(record.clone())
    }

    pub(crate) fn records(&self) -> &[ChatLogRecord] {
        &self.logs
    }
}

/// Persisted envelope, borrowed for writing.
#[derive(Serialize)]
struct StoredLogsRef<'a> {
    schema_version: u32,
    seq: u64,
    logs: &'a [ChatLogRecord],
}

/// Persisted envelope as read back.
#[derive(Deserialize)]
struct StoredLogs {
    schema_version: u32,
    #[serde(default)]
    seq: u64,
    #[serde(default)]
    logs: Vec<ChatLogRecord>,
}

/// Unversioned `{seq, logs}` envelope written by older deployments.
#[derive(Deserialize)]
struct SequencedLogs {
    #[serde(default)]
    seq: u64,
    logs: Vec<ChatLogRecord>,
}

/// Decode any supported on-disk layout into a book.
fn decode_book(contents: &str) -> Result<LogBook, ChatLogError> {
    if contents.trim().is_empty() {
        return Ok(LogBook::default());
    }
    let value: Value = serde_json::from_str(contents)?;
    if value.is_array() {
        let logs: Vec<ChatLogRecord> = serde_json::from_value(value)?;
        return Ok(LogBook::from_parts(0, logs));
    }
    let versioned = match value.as_object() {
        Some(map) => map.contains_key("schema_version"),
        None => {
            return Err(ChatLogError::Invalid(format!(
                "expected an object or array, found {}",
                json_kind(&value)
            )));
        }
    };
    if versioned {
        let stored: StoredLogs = serde_json::from_value(value)?;
        if stored.schema_version > STORE_SCHEMA_VERSION {
            return Err(ChatLogError::UnsupportedSchema(stored.schema_version));
        }
        Ok(LogBook::from_parts(stored.seq, stored.logs))
    } else {
        let stored: SequencedLogs = serde_json::from_value(value)?;
        Ok(LogBook::from_parts(stored.seq, stored.logs))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// File-backed store keeping the whole collection in one JSON document.
///
/// Each mutation rewrites the document to a sibling temp file and renames it
/// over the original, so readers of the file never see a partial write.
#[derive(Debug)]
pub struct FileChatLogStore {
    /// Location of the JSON document.
    path: PathBuf,
    /// Loaded collection; the write guard serializes mutations.
    book: RwLock<LogBook>,
}

impl FileChatLogStore {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// A missing file yields an empty store. A file that exists but cannot be
    /// decoded is reported as [`ChatLogError::Corrupt`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ChatLogError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let book = load_book(&path)?;
        info!(
            "opened chat log store (path={}, records={})",
            path.display(),
            book.records().len()
        );
        Ok(Self {
            path,
            book: RwLock::new(book),
        })
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the temporary document used during rewrites.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Rewrite the document atomically.
    fn write_book(&self, book: &LogBook) -> Result<(), ChatLogError> {
        let temp_path = self.temp_path();
        {
            let file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            let mut writer = BufWriter::new(file);
            let stored = StoredLogsRef {
                schema_version: STORE_SCHEMA_VERSION,
                seq: book.seq,
                logs: book.records(),
            };
            serde_json::to_writer_pretty(&mut writer, &stored)?;
            writer.write_all(b"\n")?;
            let file = writer.into_inner().map_err(|err| err.into_error())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

/// Load the book at `path`, treating a missing file as first run.
fn load_book(path: &Path) -> Result<LogBook, ChatLogError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("chat log store missing, starting empty (path={})", path.display());
            return Ok(LogBook::default());
        }
        Err(err) => return Err(ChatLogError::Io(err)),
    };
    decode_book(&contents).map_err(|err| match err {
        ChatLogError::UnsupportedSchema(version) => ChatLogError::UnsupportedSchema(version),
        other => ChatLogError::Corrupt {
            path: path.display().to_string(),
            message: other.to_string(),
        },
    })
}

impl ChatLogStore for FileChatLogStore {
    fn append(&self, entry: NewChatLog) -> Result<ChatLogRecord, ChatLogError> {
        entry.validate()?;
        let mut book = self.book.write();
        let mut next = book.clone();
        let record = next.append(entry, Utc::now().timestamp())?;
        self.write_book(&next)?;
        *book = next;
        debug!(
            "appended chat log (ts={}, id={}, model={}, feature={})",
            record.ts, record.id, record.model, record.feature
        );
        Ok(record)
    }

    fn get(&self, ts: i64) -> Result<Option<ChatLogRecord>, ChatLogError> {
        Ok(self.book.read().get(ts).cloned())
    }

    fn update_feedback(
        &self,
        ts: i64,
        feedback: Option<Feedback>,
    ) -> Result<ChatLogRecord, ChatLogError> {
        let mut book = self.book.write();
        if book.position(ts).is_none() {
            return Err(ChatLogError::NotFound(ts));
        }
        let mut next = book.clone();
        let record = next.set_feedback(ts, feedback)?;
        self.write_book(&next)?;
        *book = next;
        debug!(
            "updated chat log feedback (ts={}, feedback={})",
            ts,
            feedback.map_or("none", |value| value.as_str())
        );
        Ok(record)
    }

    fn list_all(&self) -> Result<Vec<ChatLogRecord>, ChatLogError> {
        Ok(self.book.read().records().to_vec())
    }
}

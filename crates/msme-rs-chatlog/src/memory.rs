//! Volatile store used for tests and `provider = "memory"` deployments.

use crate::error::ChatLogError;
use crate::model::{ChatLogRecord, Feedback, NewChatLog};
use crate::store::{ChatLogStore, LogBook};
use chrono::Utc;
use log::debug;
use parking_lot::RwLock;

/// Store that keeps records in process memory only.
#[derive(Debug, Default)]
pub struct MemoryChatLogStore {
    book: RwLock<LogBook>,
}

impl MemoryChatLogStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with existing records, kept in the given order.
    pub fn with_records(records: Vec<ChatLogRecord>) -> Self {
        Self {
            book: RwLock::new(LogBook::from_parts(0, records)),
        }
    }
}

impl ChatLogStore for MemoryChatLogStore {
    fn append(&self, entry: NewChatLog) -> Result<ChatLogRecord, ChatLogError> {
        entry.validate()?;
        let record = self.book.write().append(entry, Utc::now().timestamp())?;
        debug!("appended in-memory chat log (ts={}, id={})", record.ts, record.id);
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
        self.book.write().set_feedback(ts, feedback)
    }

    fn list_all(&self) -> Result<Vec<ChatLogRecord>, ChatLogError> {
        Ok(self.book.read().records().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryChatLogStore;
    use crate::{ChatLogStore, Feedback, NewChatLog};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn concurrent_appends_keep_unique_keys() {
        let store = Arc::new(MemoryChatLogStore::new());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = store.clone();
                thread::spawn(move || {
                    for idx in 0..25 {
                        store
                            .append(NewChatLog::new(
                                format!("{worker}-{idx}"),
                                "r",
                                "gemma2:2b",
                                "rag",
                                "default",
                            ))
                            .expect("append");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("join");
        }

        let records = store.list_all().expect("list");
        assert_eq!(records.len(), 200);
        assert!(records.windows(2).all(|pair| pair[0].ts < pair[1].ts));
        assert!(records.windows(2).all(|pair| pair[0].id + 1 == pair[1].id));
    }

    #[test]
    fn clearing_feedback_round_trips() {
        let store = MemoryChatLogStore::new();
        let record = store
            .append(NewChatLog::new("q", "r", "m", "f", "v").with_feedback(Some(Feedback::Negative)))
            .expect("append");
        assert_eq!(record.feedback, Some(Feedback::Negative));
        let cleared = store.update_feedback(record.ts, None).expect("clear");
        assert_eq!(cleared.feedback, None);
    }
}

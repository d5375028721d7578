use msme_rs_chatlog::{ChatLogError, ChatLogRecord, ChatLogStore, Feedback, NewChatLog};
use std::io;

/// Store whose reads succeed with fixed records and whose writes always fail.
#[derive(Debug, Clone, Default)]
pub struct FailingStore {
    records: Vec<ChatLogRecord>,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<ChatLogRecord>) -> Self {
        Self { records }
    }

    fn write_error() -> ChatLogError {
        ChatLogError::Io(io::Error::other("disk full"))
    }
}

impl ChatLogStore for FailingStore {
    fn append(&self, _entry: NewChatLog) -> Result<ChatLogRecord, ChatLogError> {
        Err(Self::write_error())
    }

    fn get(&self, ts: i64) -> Result<Option<ChatLogRecord>, ChatLogError> {
        Ok(self.records.iter().find(|record| record.ts == ts).cloned())
    }

    fn update_feedback(
        &self,
        ts: i64,
        _feedback: Option<Feedback>,
    ) -> Result<ChatLogRecord, ChatLogError> {
        if self.records.iter().all(|record| record.ts != ts) {
            return Err(ChatLogError::NotFound(ts));
        }
        Err(Self::write_error())
    }

    fn list_all(&self) -> Result<Vec<ChatLogRecord>, ChatLogError> {
        Ok(self.records.clone())
    }
}

//! Feedback annotation over a chat-log store.

use crate::error::ChatLogError;
use crate::model::{ChatLogRecord, FeedbackLabel};
use crate::store::ChatLogStore;
use log::info;
use std::sync::Arc;

/// Applies moderator feedback labels to stored records.
#[derive(Clone)]
pub struct FeedbackAnnotator {
    store: Arc<dyn ChatLogStore>,
}

impl FeedbackAnnotator {
    /// Wrap a store.
    pub fn new(store: Arc<dyn ChatLogStore>) -> Self {
        Self { store }
    }

    /// Set (or, with [`FeedbackLabel::None`], clear) the feedback on a record.
    ///
    /// Repeating the same label is a no-op on observable state.
    pub fn set_feedback(
        &self,
        ts: i64,
        label: FeedbackLabel,
    ) -> Result<ChatLogRecord, ChatLogError> {
        let record = self.store.update_feedback(ts, label.into_feedback())?;
        info!("feedback set (ts={}, label={})", ts, label);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::FeedbackAnnotator;
    use crate::{ChatLogStore, Feedback, FeedbackLabel, MemoryChatLogStore, NewChatLog};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn labels_map_onto_record_feedback() {
        let store = Arc::new(MemoryChatLogStore::new());
        let record = store
            .append(NewChatLog::new("Hi", "Hello", "gemma2:2b", "rag", "default"))
            .expect("append");
        let annotator = FeedbackAnnotator::new(store.clone());

        let updated = annotator
            .set_feedback(record.ts, FeedbackLabel::Positive)
            .expect("positive");
        assert_eq!(updated.feedback, Some(Feedback::Positive));

        let cleared = annotator
            .set_feedback(record.ts, FeedbackLabel::None)
            .expect("none");
        assert_eq!(cleared.feedback, None);
        assert_eq!(store.list_all().expect("list")[0].feedback, None);
    }

    #[test]
    fn missing_record_reports_not_found() {
        let annotator = FeedbackAnnotator::new(Arc::new(MemoryChatLogStore::new()));
        let err = annotator
            .set_feedback(42, FeedbackLabel::Negative)
            .unwrap_err();
        assert!(err.is_not_found());
    }
}

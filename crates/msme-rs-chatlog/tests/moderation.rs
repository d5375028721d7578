//! End-to-end moderation flow over the file store.

use msme_rs_chatlog::{
    ChatLogStats, ChatLogStore, Feedback, FeedbackAnnotator, FeedbackLabel, FileChatLogStore,
    LogQuery, ModelFilter, NewChatLog,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::tempdir;

/// Appended records come back with no feedback, then pick up a label.
#[test]
fn append_then_label_then_filter() {
    let temp = tempdir().expect("tempdir");
    let store: Arc<dyn ChatLogStore> =
        Arc::new(FileChatLogStore::open(temp.path().join("chatlogs.json")).expect("open"));

    let hi = store
        .append(NewChatLog::new("Hi", "Hello", "gemma2:2b", "rag", "default"))
        .expect("append hi");
    let listed = store.list_all().expect("list");
    assert_eq!(listed.iter().filter(|r| r.ts == hi.ts).count(), 1);
    assert_eq!(listed[0].question, "Hi");
    assert_eq!(listed[0].feedback, None);

    let annotator = FeedbackAnnotator::new(store.clone());
    annotator
        .set_feedback(hi.ts, FeedbackLabel::Positive)
        .expect("label");
    assert_eq!(
        store.get(hi.ts).expect("get").expect("record").feedback,
        Some(Feedback::Positive)
    );

    let err = annotator
        .set_feedback(9_999_999, FeedbackLabel::Negative)
        .unwrap_err();
    assert!(err.is_not_found());

    let phi = store
        .append(NewChatLog::new("Yo", "Hey", "phi3", "lora", "v2").with_user("u-7"))
        .expect("append phi");
    store
        .append(NewChatLog::new("Bye", "Ciao", "gemma2:2b", "rag", "default"))
        .expect("append bye");
    annotator
        .set_feedback(phi.ts, FeedbackLabel::Negative)
        .expect("label phi");

    let gemma = LogQuery {
        model: ModelFilter::parse(Some("gemma2")),
        ..LogQuery::default()
    }
    .apply(store.list_all().expect("list"));
    assert_eq!(
        gemma.iter().map(|r| r.question.as_str()).collect::<Vec<_>>(),
        vec!["Hi", "Bye"]
    );

    let phi_wide = LogQuery {
        model: ModelFilter::parse(Some("phi3.1:3b")),
        ..LogQuery::default()
    }
    .apply(store.list_all().expect("list"));
    assert_eq!(phi_wide.len(), 1);
    assert_eq!(phi_wide[0].user_id, "u-7");

    let unlabelled = LogQuery {
        feedback: "none".parse().expect("filter"),
        ..LogQuery::default()
    }
    .apply(store.list_all().expect("list"));
    assert_eq!(unlabelled.len(), 1);
    assert_eq!(unlabelled[0].question, "Bye");

    let stats = ChatLogStats::from_records(&store.list_all().expect("list"));
    assert_eq!((stats.total, stats.positive, stats.negative, stats.none), (3, 1, 1, 1));
}

//! Moderation filters over the full record set.

use crate::error::ChatLogError;
use crate::model::{ChatLogRecord, Feedback};
use std::str::FromStr;

/// Model identifier filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelFilter {
    #[default]
    All,
    /// Case-folded mutual substring match against the record's model.
    Matching(String),
}

impl ModelFilter {
    /// Build a filter from a raw query value; blank or `all` disables it.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("all") => ModelFilter::All,
            Some(model) => ModelFilter::Matching(model.to_string()),
        }
    }

    /// A record matches when either model string contains the other.
    pub fn matches(&self, model: &str) -> bool {
        match self {
            ModelFilter::All => true,
            ModelFilter::Matching(filter) => {
                let filter = filter.to_lowercase();
                let model = model.to_lowercase();
                model.contains(&filter) || filter.contains(&model)
            }
        }
    }
}

/// Feedback state filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackFilter {
    #[default]
    All,
    /// Records with no feedback.
    Unset,
    Exact(Feedback),
}

impl FeedbackFilter {
    pub fn matches(&self, feedback: Option<Feedback>) -> bool {
        match self {
            FeedbackFilter::All => true,
            FeedbackFilter::Unset => feedback.is_none(),
            FeedbackFilter::Exact(expected) => feedback == Some(*expected),
        }
    }
}

impl FromStr for FeedbackFilter {
    type Err = ChatLogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "" | "all" => Ok(FeedbackFilter::All),
            "none" => Ok(FeedbackFilter::Unset),
            "positive" => Ok(FeedbackFilter::Exact(Feedback::Positive)),
            "negative" => Ok(FeedbackFilter::Exact(Feedback::Negative)),
            other => Err(ChatLogError::Invalid(format!(
                "unknown feedback filter: {other}"
            ))),
        }
    }
}

/// Conjunction of moderation filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogQuery {
    pub model: ModelFilter,
    pub feedback: FeedbackFilter,
    /// Exact caller id match when set.
    pub user_id: Option<String>,
}

impl LogQuery {
    pub fn matches(&self, record: &ChatLogRecord) -> bool {
        self.model.matches(&record.model)
            && self.feedback.matches(record.feedback)
            && self
                .user_id
                .as_deref()
                .is_none_or(|user_id| record.user_id == user_id)
    }

    /// Keep matching records, preserving their relative order.
    pub fn apply(&self, records: Vec<ChatLogRecord>) -> Vec<ChatLogRecord> {
        records
            .into_iter()
            .filter(|record| self.matches(record))
            .collect()
    }
}

/// Slice a result set for display; `limit = None` keeps everything after `skip`.
pub fn paginate(
    records: Vec<ChatLogRecord>,
    skip: usize,
    limit: Option<usize>,
) -> Vec<ChatLogRecord> {
    let iter = records.into_iter().skip(skip);
    match limit {
        Some(limit) => iter.take(limit).collect(),
        None => iter.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{FeedbackFilter, LogQuery, ModelFilter, paginate};
    use crate::{ChatLogRecord, Feedback};
    use pretty_assertions::assert_eq;

    fn record(ts: i64, model: &str, feedback: Option<Feedback>) -> ChatLogRecord {
        ChatLogRecord {
            ts,
            id: ts as u64,
            user_id: if ts % 2 == 0 { "even" } else { "odd" }.to_string(),
            question: format!("q{ts}"),
            reply: format!("r{ts}"),
            model: model.to_string(),
            feature: "rag".to_string(),
            version: "default".to_string(),
            feedback,
        }
    }

    fn sample() -> Vec<ChatLogRecord> {
        vec![
            record(1, "gemma2:2b", Some(Feedback::Positive)),
            record(2, "phi3", Some(Feedback::Negative)),
            record(3, "Gemma2:2B", None),
            record(4, "llama3", Some(Feedback::Positive)),
            record(5, "phi3", None),
        ]
    }

    fn stamps(records: &[ChatLogRecord]) -> Vec<i64> {
        records.iter().map(|record| record.ts).collect()
    }

    #[test]
    fn model_filter_matches_in_either_direction() {
        let filter = ModelFilter::parse(Some("gemma2"));
        assert!(filter.matches("gemma2:2b"));
        assert!(filter.matches("GEMMA2:2B"));
        assert!(!filter.matches("phi3"));

        let filter = ModelFilter::parse(Some("phi3.1:3b"));
        assert!(filter.matches("phi3"));
        assert!(!filter.matches("phi3.5"));
    }

    #[test]
    fn model_filter_all_and_blank_disable_matching() {
        assert_eq!(ModelFilter::parse(None), ModelFilter::All);
        assert_eq!(ModelFilter::parse(Some("  ")), ModelFilter::All);
        assert_eq!(ModelFilter::parse(Some("all")), ModelFilter::All);
    }

    #[test]
    fn feedback_filter_none_selects_unlabelled() {
        let records = vec![
            record(1, "m", Some(Feedback::Positive)),
            record(2, "m", Some(Feedback::Negative)),
            record(3, "m", None),
        ];
        let query = LogQuery {
            feedback: "none".parse().expect("filter"),
            ..LogQuery::default()
        };
        assert_eq!(stamps(&query.apply(records)), vec![3]);
        assert!("sideways".parse::<FeedbackFilter>().is_err());
    }

    #[test]
    fn combined_filters_equal_intersection() {
        let models = [ModelFilter::All, ModelFilter::parse(Some("phi3")), ModelFilter::parse(Some("gemma2"))];
        let feedbacks = [
            FeedbackFilter::All,
            FeedbackFilter::Unset,
            FeedbackFilter::Exact(Feedback::Positive),
            FeedbackFilter::Exact(Feedback::Negative),
        ];
        for model in &models {
            for feedback in &feedbacks {
                let both = LogQuery {
                    model: model.clone(),
                    feedback: *feedback,
                    user_id: None,
                }
                .apply(sample());
                let by_model = LogQuery {
                    model: model.clone(),
                    ..LogQuery::default()
                }
                .apply(sample());
                let by_feedback = LogQuery {
                    feedback: *feedback,
                    ..LogQuery::default()
                }
                .apply(sample());
                let intersection: Vec<_> = by_model
                    .into_iter()
                    .filter(|record| by_feedback.contains(record))
                    .collect();
                assert_eq!(both, intersection);
                assert!(both.windows(2).all(|pair| pair[0].ts < pair[1].ts));
            }
        }
    }

    #[test]
    fn user_filter_and_paging() {
        let query = LogQuery {
            user_id: Some("odd".to_string()),
            ..LogQuery::default()
        };
        let odd = query.apply(sample());
        assert_eq!(stamps(&odd), vec![1, 3, 5]);
        assert_eq!(stamps(&paginate(odd.clone(), 1, Some(1))), vec![3]);
        assert_eq!(stamps(&paginate(odd, 1, None)), vec![3, 5]);
    }
}

//! Aggregate counts and CSV export for the admin console.

use crate::model::{ChatLogRecord, Feedback};
use serde::{Deserialize, Serialize};

/// Feedback tallies over a record set.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatLogStats {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub none: usize,
}

impl ChatLogStats {
    pub fn from_records(records: &[ChatLogRecord]) -> Self {
        records.iter().fold(Self::default(), |mut stats, record| {
            stats.total += 1;
            match record.feedback {
                Some(Feedback::Positive) => stats.positive += 1,
                Some(Feedback::Negative) => stats.negative += 1,
                None => stats.none += 1,
            }
            stats
        })
    }
}

const CSV_HEADER: [&str; 9] = [
    "id", "ts", "user_id", "question", "reply", "model", "feature", "version", "feedback",
];

/// Render records as CSV, newest first.
///
/// Line breaks inside question and reply are flattened to spaces so each
/// record stays on one line.
pub fn to_csv(records: &[ChatLogRecord]) -> String {
    let mut ordered: Vec<&ChatLogRecord> = records.iter().collect();
    ordered.sort_by(|a, b| b.ts.cmp(&a.ts));

    let mut out = String::new();
    push_row(&mut out, CSV_HEADER.iter().map(|field| field.to_string()));
    for record in ordered {
        push_row(
            &mut out,
            [
                record.id.to_string(),
                record.ts.to_string(),
                record.user_id.clone(),
                flatten_lines(&record.question),
                flatten_lines(&record.reply),
                record.model.clone(),
                record.feature.clone(),
                record.version.clone(),
                record
                    .feedback
                    .map(|feedback| feedback.as_str().to_string())
                    .unwrap_or_default(),
            ],
        );
    }
    out
}

fn flatten_lines(value: &str) -> String {
    value.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    let row: Vec<String> = fields.into_iter().map(|field| escape_field(&field)).collect();
    out.push_str(&row.join(","));
    out.push_str("\r\n");
}

/// Quote a field when it contains a delimiter, quote, or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

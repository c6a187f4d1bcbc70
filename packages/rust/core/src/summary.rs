//! Statistics reported after a merge.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use qamerge_shared::QaRecord;

use crate::merge::MergeOutcome;

/// What a merge run did, suitable for printing or JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct MergeSummary {
    /// Records in the existing collection before the merge.
    pub before: usize,
    /// Records in the merged collection.
    pub after: usize,
    /// Rows read from the tabular input.
    pub manual_rows: usize,
    /// Manual rows that replaced an existing record.
    pub replaced: usize,
    /// Manual rows added under a new question.
    pub added: usize,
    /// Manual rows overridden by a later row with the same question.
    pub superseded: usize,
    /// Duplicate questions dropped from the existing collection.
    pub base_duplicates_collapsed: usize,
    /// Records in the output whose source is `manual`.
    pub manual_records: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    pub by_source: BTreeMap<String, usize>,
    /// Where the merged collection went.
    pub output_path: PathBuf,
    /// SHA-256 of the written file. `None` on a dry run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_sha256: Option<String>,
    pub dry_run: bool,
}

impl MergeSummary {
    /// Build a summary from a merge outcome.
    pub fn from_outcome(
        outcome: &MergeOutcome,
        manual_rows: usize,
        output_path: PathBuf,
        output_sha256: Option<String>,
    ) -> Self {
        let records = &outcome.records;
        Self {
            before: outcome.base_count,
            after: records.len(),
            manual_rows,
            replaced: outcome.replaced,
            added: outcome.added,
            superseded: outcome.superseded,
            base_duplicates_collapsed: outcome.base_duplicates_collapsed,
            manual_records: records.iter().filter(|r| r.is_manual()).count(),
            by_category: count_by(records, |r| r.category.clone()),
            by_priority: count_by(records, |r| r.priority.to_string()),
            by_source: count_by(records, |r| r.source.clone()),
            dry_run: output_sha256.is_none(),
            output_path,
            output_sha256,
        }
    }
}

fn count_by(records: &[QaRecord], key: impl Fn(&QaRecord) -> String) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(key(record)).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::{MatchOptions, merge};
    use qamerge_shared::Priority;

    fn rec(question: &str, category: &str, source: &str, priority: Priority) -> QaRecord {
        QaRecord {
            question: question.into(),
            answer: "answer".into(),
            category: category.into(),
            source: source.into(),
            priority,
        }
    }

    #[test]
    fn summary_counts_and_breakdowns() {
        let base = vec![
            rec("Hours?", "hours", "scraped", Priority::Low),
            rec("Parking?", "location", "scraped", Priority::Medium),
        ];
        let manual = vec![
            rec("hours?", "hours", "manual", Priority::High),
            rec("Insurance?", "insurance", "manual", Priority::High),
        ];
        let outcome = merge(base, manual, &MatchOptions::default());

        let summary = MergeSummary::from_outcome(
            &outcome,
            2,
            PathBuf::from("out.json"),
            Some("abc".into()),
        );

        assert_eq!(summary.before, 2);
        assert_eq!(summary.after, 3);
        assert_eq!(summary.replaced, 1);
        assert_eq!(summary.added, 1);
        assert_eq!(summary.manual_records, 2);
        assert_eq!(summary.by_category["hours"], 1);
        assert_eq!(summary.by_category["insurance"], 1);
        assert_eq!(summary.by_priority["high"], 2);
        assert_eq!(summary.by_priority["medium"], 1);
        assert!(!summary.by_priority.contains_key("low"));
        assert_eq!(summary.by_source["scraped"], 1);
        assert!(!summary.dry_run);
    }

    #[test]
    fn dry_run_summary_omits_checksum() {
        let outcome = merge(Vec::new(), Vec::new(), &MatchOptions::default());
        let summary = MergeSummary::from_outcome(&outcome, 0, PathBuf::from("out.json"), None);

        assert!(summary.dry_run);
        let json = serde_json::to_value(&summary).expect("serialize");
        assert!(json.get("output_sha256").is_none());
        assert_eq!(json["after"], 0);
    }
}

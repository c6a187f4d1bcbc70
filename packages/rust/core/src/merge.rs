//! Reconciling manual rows with an existing collection.
//!
//! Records are keyed by their normalized question. Manual rows win on
//! conflict and take over the position of the record they replace; rows
//! with a new key are appended in input order.
//!
//! Case is matched with `str::to_lowercase`, not full Unicode case folding
//! (`ß` is never expanded to `ss`), so "STRASSE" and "straße" remain
//! different questions.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument, warn};

use qamerge_shared::QaRecord;

/// How questions are folded into a dedup key.
#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    /// Collapse runs of inner whitespace to a single space.
    pub collapse_whitespace: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            collapse_whitespace: true,
        }
    }
}

/// Result of a merge, with the counters the summary reports.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Merged records in output order.
    pub records: Vec<QaRecord>,
    /// Number of records in the base before the merge.
    pub base_count: usize,
    /// Manual rows that replaced a base record.
    pub replaced: usize,
    /// Manual rows appended under a new key.
    pub added: usize,
    /// Manual rows that replaced an earlier manual row of the same run.
    pub superseded: usize,
    /// Base records dropped because an earlier base record had the same key.
    pub base_duplicates_collapsed: usize,
}

/// Fold a question into its dedup key: trim, lowercase, and optionally
/// collapse inner whitespace. Lowercasing is not a full Unicode case fold.
pub fn normalize_question(question: &str, options: &MatchOptions) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    let lowered = question.trim().to_lowercase();
    if options.collapse_whitespace {
        WS_RE.replace_all(&lowered, " ").into_owned()
    } else {
        lowered
    }
}

/// Where a key currently lives in the output.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Base(usize),
    Manual(usize),
}

impl Slot {
    fn index(self) -> usize {
        match self {
            Self::Base(i) | Self::Manual(i) => i,
        }
    }
}

/// Merge `manual` records into `base`.
///
/// The result never holds two records with the same normalized question.
#[instrument(skip_all, fields(base = base.len(), manual = manual.len()))]
pub fn merge(base: Vec<QaRecord>, manual: Vec<QaRecord>, options: &MatchOptions) -> MergeOutcome {
    let mut outcome = MergeOutcome {
        base_count: base.len(),
        ..Default::default()
    };

    let mut slots: HashMap<String, Slot> = HashMap::with_capacity(base.len() + manual.len());
    let mut records: Vec<QaRecord> = Vec::with_capacity(base.len() + manual.len());

    for record in base {
        let key = normalize_question(&record.question, options);
        match slots.get(&key).copied() {
            Some(slot) => {
                warn!(question = %record.question, "duplicate question in existing collection, keeping the later record");
                records[slot.index()] = record;
                outcome.base_duplicates_collapsed += 1;
            }
            None => {
                slots.insert(key, Slot::Base(records.len()));
                records.push(record);
            }
        }
    }

    for record in manual {
        let key = normalize_question(&record.question, options);
        match slots.get(&key).copied() {
            Some(Slot::Base(i)) => {
                debug!(question = %record.question, "manual row replaces existing record");
                records[i] = record;
                // Later rows with this key now supersede a manual record.
                slots.insert(key, Slot::Manual(i));
                outcome.replaced += 1;
            }
            Some(Slot::Manual(i)) => {
                warn!(question = %record.question, "question repeated in manual rows, keeping the later row");
                records[i] = record;
                outcome.superseded += 1;
            }
            None => {
                debug!(question = %record.question, "manual row added");
                slots.insert(key, Slot::Manual(records.len()));
                records.push(record);
                outcome.added += 1;
            }
        }
    }

    outcome.records = records;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use qamerge_shared::Priority;

    fn rec(question: &str, answer: &str, source: &str, priority: Priority) -> QaRecord {
        QaRecord {
            question: question.into(),
            answer: answer.into(),
            category: "general".into(),
            source: source.into(),
            priority,
        }
    }

    fn manual(question: &str, answer: &str) -> QaRecord {
        rec(question, answer, "manual", Priority::High)
    }

    fn scraped(question: &str, answer: &str) -> QaRecord {
        rec(question, answer, "scraped", Priority::Low)
    }

    fn opts() -> MatchOptions {
        MatchOptions::default()
    }

    #[test]
    fn normalization_folds_case_and_whitespace() {
        assert_eq!(
            normalize_question("  What are   your\thours? ", &opts()),
            "what are your hours?"
        );

        let strict = MatchOptions {
            collapse_whitespace: false,
        };
        assert_eq!(
            normalize_question("  What are   your hours? ", &strict),
            "what are   your hours?"
        );
    }

    #[test]
    fn lowercasing_is_not_full_case_folding() {
        assert_eq!(normalize_question("ÉTÉ?", &opts()), "été?");
        assert_ne!(
            normalize_question("STRASSE", &opts()),
            normalize_question("straße", &opts())
        );
    }

    #[test]
    fn case_differing_question_is_replaced() {
        let mut hours = manual("What are your hours?", "9-5 Mon-Fri");
        hours.category = "hours".into();
        let mut old = scraped("what are your hours?", "unknown");
        old.category = "hours".into();

        let outcome = merge(vec![old], vec![hours.clone()], &opts());

        assert_eq!(outcome.records, vec![hours]);
        assert_eq!(outcome.records[0].answer, "9-5 Mon-Fri");
        assert_eq!(outcome.records[0].source, "manual");
        assert_eq!(outcome.records[0].priority, Priority::High);
        assert_eq!(outcome.replaced, 1);
        assert_eq!(outcome.added, 0);
    }

    #[test]
    fn new_questions_are_appended_in_order() {
        let outcome = merge(
            Vec::new(),
            vec![manual("Do you take Delta?", "Yes"), manual("Is parking free?", "Yes")],
            &opts(),
        );

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.replaced, 0);
        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.records[0].question, "Do you take Delta?");
        assert_eq!(outcome.records[1].question, "Is parking free?");
    }

    #[test]
    fn replacement_keeps_base_position() {
        let base = vec![
            scraped("Where are you?", "Main St"),
            scraped("What are your hours?", "unknown"),
            scraped("Who is the dentist?", "Dr. Lee"),
        ];
        let outcome = merge(
            base,
            vec![manual("New question?", "New"), manual("WHAT ARE YOUR HOURS?", "9-5")],
            &opts(),
        );

        let questions: Vec<_> = outcome.records.iter().map(|r| r.question.as_str()).collect();
        assert_eq!(
            questions,
            vec!["Where are you?", "WHAT ARE YOUR HOURS?", "Who is the dentist?", "New question?"]
        );
        assert_eq!(outcome.base_count, 3);
    }

    #[test]
    fn union_is_complete() {
        let base = vec![scraped("A?", "a"), scraped("B?", "b")];
        let rows = vec![manual("b?", "B!"), manual("C?", "c")];
        let outcome = merge(base.clone(), rows.clone(), &opts());

        for record in base.iter().chain(rows.iter()) {
            let key = normalize_question(&record.question, &opts());
            assert!(
                outcome
                    .records
                    .iter()
                    .any(|r| normalize_question(&r.question, &opts()) == key),
                "missing {key}"
            );
        }
        assert_eq!(outcome.records.len(), 3);
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let base = vec![scraped("A?", "a"), scraped("what are your hours?", "unknown")];
        let rows = vec![manual("What are your hours?", "9-5"), manual("C?", "c")];

        let first = merge(base, rows.clone(), &opts());
        let second = merge(first.records.clone(), rows, &opts());

        assert_eq!(first.records, second.records);
        assert_eq!(second.added, 0);
        assert_eq!(second.replaced, 2);
    }

    #[test]
    fn repeated_manual_rows_keep_the_last() {
        let outcome = merge(
            vec![scraped("Hours?", "unknown")],
            vec![
                manual("Hours?", "9-5"),
                manual("Parking?", "Lot"),
                manual("hours?", "8-4"),
                manual("parking?", "Street"),
            ],
            &opts(),
        );

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].answer, "8-4");
        assert_eq!(outcome.records[1].answer, "Street");
        assert_eq!(outcome.replaced, 1);
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.superseded, 2);
    }

    #[test]
    fn base_duplicates_are_collapsed() {
        let outcome = merge(
            vec![
                scraped("Hours?", "old"),
                scraped("Parking?", "Lot"),
                scraped("  hours? ", "newer"),
            ],
            Vec::new(),
            &opts(),
        );

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].answer, "newer");
        assert_eq!(outcome.base_duplicates_collapsed, 1);
    }

    #[test]
    fn near_duplicates_stay_distinct() {
        let outcome = merge(
            vec![scraped("What are your hours?", "unknown")],
            vec![manual("What are your office hours?", "9-5")],
            &opts(),
        );
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.added, 1);
    }
}

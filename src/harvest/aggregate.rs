//! Merging per-page outcomes into the final result set.

use super::model::PostRecord;
use super::page::PageOutcome;

/// Summary of how the scheduled pages fared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestReport {
    pub pages_scheduled: usize,
    pub pages_with_records: usize,
    pub empty_pages: usize,
    pub degraded_pages: usize,
    pub records: usize,
}

/// Concatenate page outcomes in the order given.
///
/// Empty and degraded pages contribute no records but are still counted.
#[must_use]
pub fn aggregate(outcomes: Vec<PageOutcome>) -> (Vec<PostRecord>, HarvestReport) {
    let mut report = HarvestReport {
        pages_scheduled: outcomes.len(),
        ..HarvestReport::default()
    };
    let mut records = Vec::new();

    for outcome in outcomes {
        match &outcome {
            PageOutcome::Fetched(page) if !page.is_empty() => report.pages_with_records += 1,
            PageOutcome::Fetched(_) | PageOutcome::Empty => report.empty_pages += 1,
            PageOutcome::Degraded { .. } => report.degraded_pages += 1,
        }
        records.extend(outcome.into_records());
    }

    report.records = records.len();
    (records, report)
}

//! Analysis result model
//!
//! An `AnalysisResult` is the frozen aggregate of one batch of log lines. The
//! `errors`, `warnings` and `critical_count` fields are always derived from
//! the category counts; they are recomputed whenever a result is assembled and
//! never mutated on their own.

use crate::patterns::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum number of ranked categories retained in `top_categories`
pub const TOP_CATEGORY_LIMIT: usize = 5;

/// A periodic sample of the analyzed lines
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineSample {
    /// 1-based ordinal among the retained lines of the whole batch
    pub line: u64,
    /// Line text, truncated for display
    pub sample: String,
}

/// Aggregate statistics for one batch of log lines
///
/// Only serialized: a result is always built through `from_parts` so the
/// derived fields cannot disagree with the category counts.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalysisResult {
    total: u64,
    errors: u64,
    warnings: u64,
    critical_count: u64,
    error_rate: f64,
    #[serde(rename = "by_hour")]
    hour_histogram: BTreeMap<String, u64>,
    #[serde(rename = "error_types")]
    category_counts: BTreeMap<Category, u64>,
    #[serde(rename = "top_errors")]
    top_categories: Vec<(Category, u64)>,
    timeline: Vec<TimelineSample>,
}

impl AnalysisResult {
    /// Assemble a result from raw tallies, deriving every dependent field
    ///
    /// Every category gets a key, missing ones counting 0. Timeline samples
    /// are sorted by line ordinal.
    pub fn from_parts(
        total: u64,
        counts: BTreeMap<Category, u64>,
        hour_histogram: BTreeMap<String, u64>,
        mut timeline: Vec<TimelineSample>,
    ) -> Self {
        let mut category_counts = Self::zeroed_counts();
        category_counts.extend(counts);

        let count = |category: Category| category_counts.get(&category).copied().unwrap_or(0);
        let errors = count(Category::Error);
        let warnings = count(Category::Warning);
        let critical_count = count(Category::Critical);

        let error_rate = if total > 0 {
            errors as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        timeline.sort_by_key(|sample| sample.line);

        let top_categories = Self::rank(&category_counts);

        Self {
            total,
            errors,
            warnings,
            critical_count,
            error_rate,
            hour_histogram,
            category_counts,
            top_categories,
            timeline,
        }
    }

    /// An empty result with every category at zero
    pub fn empty() -> Self {
        Self::from_parts(0, BTreeMap::new(), BTreeMap::new(), Vec::new())
    }

    fn zeroed_counts() -> BTreeMap<Category, u64> {
        Category::ALL.iter().map(|&c| (c, 0)).collect()
    }

    /// Rank categories by count, descending
    ///
    /// The map iterates in registry order and the sort is stable, so equal
    /// counts keep registry order. Categories that never matched are left out.
    fn rank(category_counts: &BTreeMap<Category, u64>) -> Vec<(Category, u64)> {
        let mut ranked: Vec<(Category, u64)> = category_counts
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(&category, &count)| (category, count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(TOP_CATEGORY_LIMIT);
        ranked
    }

    /// Merge partial results produced from disjoint partitions of one batch
    ///
    /// Counts and histogram buckets are summed, timeline samples concatenated
    /// in line order, and every derived field recomputed from the merged totals.
    pub fn merge(parts: impl IntoIterator<Item = AnalysisResult>) -> Self {
        let mut total = 0;
        let mut category_counts = Self::zeroed_counts();
        let mut hour_histogram: BTreeMap<String, u64> = BTreeMap::new();
        let mut timeline = Vec::new();

        for part in parts {
            total += part.total;
            for (category, count) in part.category_counts {
                *category_counts.entry(category).or_insert(0) += count;
            }
            for (hour, count) in part.hour_histogram {
                *hour_histogram.entry(hour).or_insert(0) += count;
            }
            timeline.extend(part.timeline);
        }

        Self::from_parts(total, category_counts, hour_histogram, timeline)
    }

    /// Number of non-empty lines processed
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn errors(&self) -> u64 {
        self.errors
    }

    pub fn warnings(&self) -> u64 {
        self.warnings
    }

    pub fn critical_count(&self) -> u64 {
        self.critical_count
    }

    /// Percentage of lines matching the error category (0 for empty batches)
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    pub fn hour_histogram(&self) -> &BTreeMap<String, u64> {
        &self.hour_histogram
    }

    pub fn category_counts(&self) -> &BTreeMap<Category, u64> {
        &self.category_counts
    }

    /// Count for one category, 0 when absent
    pub fn count(&self, category: Category) -> u64 {
        self.category_counts.get(&category).copied().unwrap_or(0)
    }

    pub fn top_categories(&self) -> &[(Category, u64)] {
        &self.top_categories
    }

    pub fn timeline(&self) -> &[TimelineSample] {
        &self.timeline
    }

    /// Hour with the highest line count, ties going to the earliest label
    pub fn peak_hour(&self) -> Option<(&str, u64)> {
        let mut peak: Option<(&str, u64)> = None;
        for (hour, &count) in &self.hour_histogram {
            match peak {
                Some((_, best)) if count <= best => {}
                _ => peak = Some((hour.as_str(), count)),
            }
        }
        peak
    }
}

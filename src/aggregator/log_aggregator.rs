//! Batch aggregation of log lines into an `AnalysisResult`
//!
//! The aggregator makes a single pass over the lines, classifying each
//! non-empty line and tallying categories, hour-of-day buckets and periodic
//! timeline samples. Partitions of a batch can be analyzed independently and
//! merged, as long as each partition knows the global ordinal offset of its
//! first retained line.

use crate::aggregator::analysis::{AnalysisResult, TimelineSample};
use crate::classifier::Classifier;
use crate::patterns::{Category, PatternRegistry};
use log::debug;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Every Nth retained line is kept as a timeline sample
pub const TIMELINE_INTERVAL: u64 = 100;

/// Maximum number of characters kept in a timeline sample
pub const SAMPLE_MAX_CHARS: usize = 100;

static RE_TIMESTAMP: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"([0-9]{2}):[0-9]{2}:[0-9]{2}").ok());

/// Extract the hour label from the first `HH:MM:SS` occurrence in a line
///
/// Returns `None` when there is no such occurrence or its hour is not a valid
/// hour of day.
pub fn extract_hour(line: &str) -> Option<&str> {
    let re = RE_TIMESTAMP.as_ref()?;
    let hour = re.captures(line)?.get(1)?.as_str();
    match hour.parse::<u8>() {
        Ok(h) if h < 24 => Some(hour),
        _ => None,
    }
}

/// Truncate a line for display in the timeline
pub fn truncate_sample(line: &str) -> String {
    match line.char_indices().nth(SAMPLE_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line.to_string(),
    }
}

/// Running tallies for one partition
struct Tally {
    total: u64,
    category_counts: BTreeMap<Category, u64>,
    hour_histogram: BTreeMap<String, u64>,
    timeline: Vec<TimelineSample>,
}

impl Tally {
    fn new(registry: &PatternRegistry) -> Self {
        Self {
            total: 0,
            category_counts: registry.categories().map(|c| (c, 0)).collect(),
            hour_histogram: BTreeMap::new(),
            timeline: Vec::new(),
        }
    }

    fn into_result(self) -> AnalysisResult {
        AnalysisResult::from_parts(
            self.total,
            self.category_counts,
            self.hour_histogram,
            self.timeline,
        )
    }
}

/// Aggregates batches of log lines into analysis results
#[derive(Debug, Clone, Copy)]
pub struct LogAggregator<'a> {
    classifier: Classifier<'a>,
}

impl<'a> LogAggregator<'a> {
    /// Create an aggregator classifying lines against `registry`
    ///
    /// # Examples
    ///
    /// ```
    /// use logscan::aggregator::LogAggregator;
    /// use logscan::patterns::PatternRegistry;
    ///
    /// let registry = PatternRegistry::builtin();
    /// let result = LogAggregator::new(&registry).analyze(["12:00:00 ERROR boom", ""]);
    /// assert_eq!(result.total(), 1);
    /// assert_eq!(result.errors(), 1);
    /// ```
    pub fn new(registry: &'a PatternRegistry) -> Self {
        Self {
            classifier: Classifier::new(registry),
        }
    }

    /// Analyze a whole batch of lines
    pub fn analyze<I, S>(&self, lines: I) -> AnalysisResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.analyze_partition(lines, 0)
    }

    /// Analyze one contiguous partition of a batch
    ///
    /// # Arguments
    ///
    /// * `lines` - The partition's lines, in order
    /// * `offset` - Number of retained (non-empty) lines preceding this partition
    pub fn analyze_partition<I, S>(&self, lines: I, offset: u64) -> AnalysisResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tally = Tally::new(self.classifier.registry());

        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() {
                continue;
            }

            tally.total += 1;
            let ordinal = offset + tally.total;

            for category in self.classifier.classify(line) {
                *tally.category_counts.entry(category).or_insert(0) += 1;
            }

            if let Some(hour) = extract_hour(line) {
                *tally.hour_histogram.entry(hour.to_string()).or_insert(0) += 1;
            }

            if ordinal % TIMELINE_INTERVAL == 0 {
                tally.timeline.push(TimelineSample {
                    line: ordinal,
                    sample: truncate_sample(line),
                });
            }
        }

        let result = tally.into_result();
        debug!(
            "Analyzed {} lines from offset {} ({} errors, {} warnings, {} critical)",
            result.total(),
            offset,
            result.errors(),
            result.warnings(),
            result.critical_count()
        );
        result
    }

    /// Analyze a batch split across `workers` threads and merge the partitions
    ///
    /// Produces the same result as [`LogAggregator::analyze`].
    pub fn analyze_parallel<S>(&self, lines: &[S], workers: usize) -> AnalysisResult
    where
        S: AsRef<str> + Sync,
    {
        let workers = workers.max(1);
        if workers == 1 || lines.len() < 2 {
            return self.analyze(lines);
        }

        let chunk_size = lines.len().div_ceil(workers);
        let chunks: Vec<&[S]> = lines.chunks(chunk_size).collect();

        // Offsets count retained lines, so empty lines in earlier chunks must not shift ordinals
        let mut offsets = Vec::with_capacity(chunks.len());
        let mut retained = 0u64;
        for chunk in &chunks {
            offsets.push(retained);
            retained += chunk
                .iter()
                .filter(|line| !line.as_ref().trim().is_empty())
                .count() as u64;
        }

        let parts: Vec<AnalysisResult> = std::thread::scope(|scope| {
            let handles: Vec<_> = chunks
                .iter()
                .zip(offsets.iter())
                .map(|(&chunk, &offset)| {
                    let aggregator = *self;
                    scope.spawn(move || aggregator.analyze_partition(chunk, offset))
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| match handle.join() {
                    Ok(part) => part,
                    Err(payload) => std::panic::resume_unwind(payload),
                })
                .collect()
        });

        debug!("Merging {} partial results", parts.len());
        AnalysisResult::merge(parts)
    }
}

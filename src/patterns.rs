//! Pattern registry for log line classification
//!
//! The registry is an ordered, immutable list of `(Category, Regex)` pairs.
//! Registry order is only significant for breaking ties when ranking
//! categories; every pattern is tested independently against a line.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// A named class of log condition
///
/// Variants are declared in registry order, so the derived `Ord` doubles as the
/// tie-break order used by rankings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Error,
    Warning,
    Critical,
    Timeout,
    Memory,
    Connection,
    Permission,
    Disk,
}

impl Category {
    /// All categories in registry order
    pub const ALL: [Category; 8] = [
        Category::Error,
        Category::Warning,
        Category::Critical,
        Category::Timeout,
        Category::Memory,
        Category::Connection,
        Category::Permission,
        Category::Disk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Error => "error",
            Category::Warning => "warning",
            Category::Critical => "critical",
            Category::Timeout => "timeout",
            Category::Memory => "memory",
            Category::Connection => "connection",
            Category::Permission => "permission",
            Category::Disk => "disk",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! category_pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

category_pattern!(RE_ERROR, r"(?i)error|failed|exception|err\s");
category_pattern!(RE_WARNING, r"(?i)warning|warn");
category_pattern!(RE_CRITICAL, r"(?i)panic|fatal|emergency|segmentation");
category_pattern!(RE_TIMEOUT, r"(?i)timeout|timed\s+out");
category_pattern!(RE_MEMORY, r"(?i)out of memory|oom|memory\s+error");
category_pattern!(
    RE_CONNECTION,
    r"(?i)connection refused|failed to connect|connection timeout"
);
category_pattern!(
    RE_PERMISSION,
    r"(?i)permission denied|access denied|forbidden"
);
category_pattern!(RE_DISK, r"(?i)disk full|no space|disk error");

/// A single category and the pattern that detects it
#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    category: Category,
    regex: &'static LazyLock<Option<Regex>>,
}

impl PatternRule {
    pub fn category(&self) -> Category {
        self.category
    }

    /// Test the rule against a line
    ///
    /// A pattern that failed to compile never matches.
    pub fn matches(&self, line: &str) -> bool {
        match self.regex.as_ref() {
            Some(re) => re.is_match(line),
            None => false,
        }
    }
}

/// Ordered table of pattern rules, built once and shared across runs
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    rules: Vec<PatternRule>,
}

impl Default for PatternRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PatternRegistry {
    /// The built-in failure patterns, in registry order
    pub fn builtin() -> Self {
        let rules = Category::ALL
            .iter()
            .map(|&category| PatternRule {
                category,
                regex: Self::regex_for(category),
            })
            .collect();
        Self { rules }
    }

    fn regex_for(category: Category) -> &'static LazyLock<Option<Regex>> {
        match category {
            Category::Error => &RE_ERROR,
            Category::Warning => &RE_WARNING,
            Category::Critical => &RE_CRITICAL,
            Category::Timeout => &RE_TIMEOUT,
            Category::Memory => &RE_MEMORY,
            Category::Connection => &RE_CONNECTION,
            Category::Permission => &RE_PERMISSION,
            Category::Disk => &RE_DISK,
        }
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Categories in registry order
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.rules.iter().map(|rule| rule.category)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

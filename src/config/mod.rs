//! Bucket and rule-table configuration for the age scorer.
//!
//! A [`BucketConfiguration`] is validated once when it is built or loaded and
//! is immutable afterwards, so it can be shared across threads behind an `Arc`.
//!
//! Rule ranges are half-open `[low, high)`: a value equal to `low` belongs to
//! the range, a value equal to `high` does not. Bucket bounds are inclusive
//! lower bounds on the raw score.

mod file;
mod presets;

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use log::debug;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::FeatureName;

pub use presets::Preset;

/// Half-open interval `[low, high)`. A missing side is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ValueRange {
    pub low: Option<f64>,
    pub high: Option<f64>,
}

impl ValueRange {
    pub const fn new(low: Option<f64>, high: Option<f64>) -> Self {
        Self { low, high }
    }

    /// `(-inf, high)`
    pub const fn below(high: f64) -> Self {
        Self::new(None, Some(high))
    }

    /// `[low, +inf)`
    pub const fn at_least(low: f64) -> Self {
        Self::new(Some(low), None)
    }

    /// `[low, high)`
    pub const fn between(low: f64, high: f64) -> Self {
        Self::new(Some(low), Some(high))
    }

    fn lo(&self) -> f64 {
        self.low.unwrap_or(f64::NEG_INFINITY)
    }

    fn hi(&self) -> f64 {
        self.high.unwrap_or(f64::INFINITY)
    }

    pub fn contains(&self, value: f64) -> bool {
        !value.is_nan()
            && self.low.is_none_or(|low| value >= low)
            && self.high.is_none_or(|high| value < high)
    }

    pub fn is_empty(&self) -> bool {
        !(self.lo() < self.hi())
    }

    pub fn overlaps(&self, other: &ValueRange) -> bool {
        self.lo() < other.hi() && other.lo() < self.hi()
    }
}

/// One conditional contribution to the score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRule {
    pub range: ValueRange,
    pub score_delta: i32,
    pub confidence_weight: f64,
}

impl ScoreRule {
    pub const fn new(range: ValueRange, score_delta: i32, confidence_weight: f64) -> Self {
        Self {
            range,
            score_delta,
            confidence_weight,
        }
    }
}

/// Ordered rules for a single feature. The first matching rule wins.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleTable {
    pub feature: FeatureName,
    pub rules: Vec<ScoreRule>,
}

impl RuleTable {
    pub fn new(feature: FeatureName) -> Self {
        Self {
            feature,
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, range: ValueRange, score_delta: i32, confidence_weight: f64) -> Self {
        self.rules
            .push(ScoreRule::new(range, score_delta, confidence_weight));
        self
    }

    /// First rule whose range contains `value`.
    pub fn evaluate(&self, value: f64) -> Option<&ScoreRule> {
        self.rules.iter().find(|r| r.range.contains(value))
    }

    fn validate(&self) -> Result<()> {
        for (i, rule) in self.rules.iter().enumerate() {
            let range = rule.range;
            if range.low.is_some_and(f64::is_nan) || range.high.is_some_and(f64::is_nan) {
                return Err(Error::configuration(format!(
                    "{}: rule {} has a NaN bound",
                    self.feature, i
                )));
            }
            if range.is_empty() {
                return Err(Error::configuration(format!(
                    "{}: rule {} has an empty range {:?}..{:?}",
                    self.feature, i, range.low, range.high
                )));
            }
            if !rule.confidence_weight.is_finite() || rule.confidence_weight < 0.0 {
                return Err(Error::configuration(format!(
                    "{}: rule {} has invalid confidence weight {}",
                    self.feature, i, rule.confidence_weight
                )));
            }
            for (j, other) in self.rules.iter().enumerate().skip(i + 1) {
                if range.overlaps(&other.range) {
                    return Err(Error::configuration(format!(
                        "{}: rules {} and {} have overlapping ranges",
                        self.feature, i, j
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Opaque presentation metadata; the scorer never reads it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DisplayHint {
    pub color: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeBucket {
    pub id: u32,
    pub label: String,
    /// Inclusive lower bound on the raw score. `None` catches every remaining score.
    pub lower_bound: Option<i32>,
    pub display_hint: DisplayHint,
}

impl AgeBucket {
    pub fn new(
        id: u32,
        label: impl Into<String>,
        lower_bound: impl Into<Option<i32>>,
        color: [u8; 3],
    ) -> Self {
        Self {
            id,
            label: label.into(),
            lower_bound: lower_bound.into(),
            display_hint: DisplayHint { color },
        }
    }

    pub fn admits(&self, raw_score: i32) -> bool {
        self.lower_bound.is_none_or(|bound| bound <= raw_score)
    }
}

/// Validated, immutable scoring configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketConfiguration {
    // Youngest first, strictly decreasing bounds.
    bounded: Vec<AgeBucket>,
    catch_all: AgeBucket,
    // Sorted by feature, at most one per feature.
    rule_tables: Vec<RuleTable>,
}

impl BucketConfiguration {
    pub fn builder() -> BucketConfigurationBuilder {
        BucketConfigurationBuilder::new()
    }

    /// Validate `buckets` (youngest first) and `rule_tables` into a configuration.
    pub fn new(buckets: Vec<AgeBucket>, rule_tables: Vec<RuleTable>) -> Result<Self> {
        let mut bounded = buckets;
        let catch_all = bounded
            .pop()
            .ok_or_else(|| Error::configuration("at least one bucket is required"))?;

        if let Some(bound) = catch_all.lower_bound {
            return Err(Error::configuration(format!(
                "last bucket '{}' must omit its lower bound (found {})",
                catch_all.label, bound
            )));
        }

        let mut previous: Option<i32> = None;
        for bucket in &bounded {
            let Some(bound) = bucket.lower_bound else {
                return Err(Error::configuration(format!(
                    "bucket '{}' has no lower bound but is not the last bucket",
                    bucket.label
                )));
            };
            if let Some(prev) = previous {
                if bound >= prev {
                    return Err(Error::configuration(format!(
                        "bucket bounds must be strictly decreasing: '{}' has {} after {}",
                        bucket.label, bound, prev
                    )));
                }
            }
            previous = Some(bound);
        }

        let mut ids = HashSet::new();
        for bucket in bounded.iter().chain(std::iter::once(&catch_all)) {
            if bucket.label.trim().is_empty() {
                return Err(Error::configuration(format!(
                    "bucket {} has an empty label",
                    bucket.id
                )));
            }
            if !ids.insert(bucket.id) {
                return Err(Error::configuration(format!(
                    "duplicate bucket id {}",
                    bucket.id
                )));
            }
        }

        let mut rule_tables = rule_tables;
        rule_tables.sort_by_key(|t| t.feature);
        for pair in rule_tables.windows(2) {
            if pair[0].feature == pair[1].feature {
                return Err(Error::configuration(format!(
                    "more than one rule table for {}",
                    pair[0].feature
                )));
            }
        }
        for table in &rule_tables {
            table.validate()?;
        }

        debug!(
            "bucket configuration: {} buckets, {} rule tables",
            bounded.len() + 1,
            rule_tables.len()
        );

        Ok(Self {
            bounded,
            catch_all,
            rule_tables,
        })
    }

    /// One of the built-in configurations.
    pub fn preset(preset: Preset) -> Result<Self> {
        preset.build()
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        file::parse(text)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loading bucket configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Buckets from youngest to oldest; the last one is the catch-all.
    pub fn buckets(&self) -> impl Iterator<Item = &AgeBucket> {
        self.bounded.iter().chain(std::iter::once(&self.catch_all))
    }

    pub fn bucket_count(&self) -> usize {
        self.bounded.len() + 1
    }

    pub fn rule_tables(&self) -> &[RuleTable] {
        &self.rule_tables
    }

    pub fn rule_table(&self, feature: FeatureName) -> Option<&RuleTable> {
        self.rule_tables.iter().find(|t| t.feature == feature)
    }

    /// Features referenced by at least one rule table.
    pub fn required_features(&self) -> BTreeSet<FeatureName> {
        self.rule_tables.iter().map(|t| t.feature).collect()
    }

    /// The unique bucket for `raw_score`.
    pub fn bucket_for(&self, raw_score: i32) -> &AgeBucket {
        self.bounded
            .iter()
            .find(|b| b.admits(raw_score))
            .unwrap_or(&self.catch_all)
    }
}

/// Builder for [`BucketConfiguration`]. Buckets are added youngest first.
#[derive(Debug, Default)]
pub struct BucketConfigurationBuilder {
    buckets: Vec<AgeBucket>,
    rule_tables: Vec<RuleTable>,
}

impl BucketConfigurationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket(mut self, bucket: AgeBucket) -> Self {
        self.buckets.push(bucket);
        self
    }

    pub fn rule_table(mut self, table: RuleTable) -> Self {
        self.rule_tables.push(table);
        self
    }

    pub fn build(self) -> Result<BucketConfiguration> {
        BucketConfiguration::new(self.buckets, self.rule_tables)
    }
}

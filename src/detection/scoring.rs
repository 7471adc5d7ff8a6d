//! Rule-table scoring of a [`FeatureSet`] into an age bucket.

use std::sync::Arc;

use log::trace;

use crate::config::BucketConfiguration;
use crate::models::{FeatureSet, ScoreResult};

/// Scores feature sets against a shared configuration.
#[derive(Debug, Clone)]
pub struct AgeScorer {
    config: Arc<BucketConfiguration>,
}

impl AgeScorer {
    pub fn new(config: Arc<BucketConfiguration>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BucketConfiguration {
        &self.config
    }

    pub fn score(&self, features: &FeatureSet) -> ScoreResult {
        score(features, &self.config)
    }
}

/// Accumulate every rule table's first matching rule and pick the bucket.
///
/// A feature missing from `features` skips its rule group entirely. A value
/// that matches no rule still counts as an evaluated group and adds nothing,
/// which lowers the confidence.
pub fn score(features: &FeatureSet, config: &BucketConfiguration) -> ScoreResult {
    let mut raw_score: i32 = 0;
    let mut confidence_sum = 0.0;
    let mut groups = 0u32;

    for table in config.rule_tables() {
        let Some(value) = features.get(table.feature) else {
            trace!("{}: not extracted, skipped", table.feature);
            continue;
        };
        groups += 1;

        match table.evaluate(value) {
            Some(rule) => {
                raw_score = raw_score.saturating_add(rule.score_delta);
                confidence_sum += rule.confidence_weight;
                trace!(
                    "{} = {:.4}: {:+} (weight {})",
                    table.feature, value, rule.score_delta, rule.confidence_weight
                );
            }
            None => trace!("{} = {:.4}: no rule", table.feature, value),
        }
    }

    let confidence = if groups == 0 {
        0.0
    } else {
        (confidence_sum / groups as f64).min(1.0)
    };

    ScoreResult {
        bucket: config.bucket_for(raw_score).clone(),
        raw_score,
        confidence,
    }
}

use clap::ValueEnum;

use super::{AgeBucket, BucketConfiguration, RuleTable, ValueRange};
use crate::error::Result;
use crate::models::FeatureName;

/// Built-in bucket configurations.
///
/// Higher scores mean younger. `Nine` is the most detailed heuristic and the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
    /// Five coarse classes; every rule weighs 1.0.
    Five,
    /// Six classes over size, texture, contrast and edges.
    Six,
    /// Nine classes over six feature groups.
    #[default]
    Nine,
}

impl Preset {
    pub fn build(self) -> Result<BucketConfiguration> {
        match self {
            Preset::Five => five(),
            Preset::Six => six(),
            Preset::Nine => nine(),
        }
    }
}

fn five() -> Result<BucketConfiguration> {
    BucketConfiguration::builder()
        .bucket(AgeBucket::new(0, "child (0-12)", 4, [255, 0, 255]))
        .bucket(AgeBucket::new(1, "teen (13-19)", 2, [0, 255, 255]))
        .bucket(AgeBucket::new(2, "young adult (20-35)", 0, [0, 255, 0]))
        .bucket(AgeBucket::new(3, "middle-aged (36-55)", -2, [255, 255, 0]))
        .bucket(AgeBucket::new(4, "senior (56+)", None, [255, 0, 0]))
        .rule_table(
            RuleTable::new(FeatureName::Area)
                .rule(ValueRange::below(5000.0), 2, 1.0)
                .rule(ValueRange::at_least(15000.0), -1, 1.0),
        )
        .rule_table(
            RuleTable::new(FeatureName::TextureVariance)
                .rule(ValueRange::at_least(500.0), 2, 1.0)
                .rule(ValueRange::between(200.0, 500.0), 1, 1.0)
                .rule(ValueRange::below(200.0), -1, 1.0),
        )
        .rule_table(
            RuleTable::new(FeatureName::Contrast)
                .rule(ValueRange::at_least(60.0), 1, 1.0)
                .rule(ValueRange::below(30.0), -1, 1.0),
        )
        .rule_table(
            RuleTable::new(FeatureName::EdgeDensity)
                .rule(ValueRange::below(0.1), 1, 1.0)
                .rule(ValueRange::at_least(0.2), -1, 1.0),
        )
        .rule_table(RuleTable::new(FeatureName::HistMean).rule(ValueRange::at_least(100.0), 1, 1.0))
        .build()
}

fn six() -> Result<BucketConfiguration> {
    BucketConfiguration::builder()
        .bucket(AgeBucket::new(0, "child (0-12)", 4, [255, 0, 255]))
        .bucket(AgeBucket::new(1, "teen (13-17)", 2, [0, 255, 255]))
        .bucket(AgeBucket::new(2, "young adult (18-25)", 0, [0, 255, 0]))
        .bucket(AgeBucket::new(3, "adult (26-35)", -1, [0, 128, 255]))
        .bucket(AgeBucket::new(4, "middle-aged (36-50)", -2, [255, 255, 0]))
        .bucket(AgeBucket::new(5, "senior (50+)", None, [255, 0, 0]))
        .rule_table(
            RuleTable::new(FeatureName::Area)
                .rule(ValueRange::below(5000.0), 2, 0.7)
                .rule(ValueRange::between(5000.0, 10000.0), 1, 0.6)
                .rule(ValueRange::at_least(20000.0), -1, 0.5),
        )
        .rule_table(
            RuleTable::new(FeatureName::TextureVariance)
                .rule(ValueRange::at_least(500.0), 2, 0.8)
                .rule(ValueRange::between(200.0, 500.0), 1, 0.6)
                .rule(ValueRange::below(100.0), -2, 0.8),
        )
        .rule_table(
            RuleTable::new(FeatureName::Contrast)
                .rule(ValueRange::at_least(50.0), 1, 0.5)
                .rule(ValueRange::below(30.0), -1, 0.5),
        )
        .rule_table(
            RuleTable::new(FeatureName::EdgeDensity)
                .rule(ValueRange::below(0.1), 1, 0.6)
                .rule(ValueRange::at_least(0.2), -1, 0.6),
        )
        .build()
}

fn nine() -> Result<BucketConfiguration> {
    BucketConfiguration::builder()
        .bucket(AgeBucket::new(0, "infant (0-2)", 8, [255, 192, 203]))
        .bucket(AgeBucket::new(1, "toddler (3-6)", 6, [255, 165, 0]))
        .bucket(AgeBucket::new(2, "child (7-12)", 4, [255, 255, 0]))
        .bucket(AgeBucket::new(3, "teen (13-17)", 2, [0, 255, 255]))
        .bucket(AgeBucket::new(4, "young adult (18-25)", 0, [0, 255, 0]))
        .bucket(AgeBucket::new(5, "adult (26-35)", -2, [0, 128, 255]))
        .bucket(AgeBucket::new(6, "middle-aged (36-50)", -4, [128, 0, 255]))
        .bucket(AgeBucket::new(7, "senior (51-65)", -6, [255, 0, 128]))
        .bucket(AgeBucket::new(8, "elderly (65+)", None, [128, 128, 128]))
        .rule_table(
            RuleTable::new(FeatureName::Area)
                .rule(ValueRange::below(3000.0), 3, 0.8)
                .rule(ValueRange::between(3000.0, 6000.0), 2, 0.7)
                .rule(ValueRange::between(6000.0, 12000.0), 1, 0.6)
                .rule(ValueRange::at_least(20000.0), -1, 0.5),
        )
        .rule_table(
            RuleTable::new(FeatureName::TextureVariance)
                .rule(ValueRange::at_least(800.0), 2, 0.7)
                .rule(ValueRange::between(400.0, 800.0), 1, 0.6)
                .rule(ValueRange::below(100.0), -2, 0.8)
                .rule(ValueRange::between(100.0, 200.0), -1, 0.6),
        )
        .rule_table(
            RuleTable::new(FeatureName::Contrast)
                .rule(ValueRange::at_least(60.0), 1, 0.5)
                .rule(ValueRange::below(30.0), -1, 0.5),
        )
        .rule_table(
            RuleTable::new(FeatureName::EdgeDensity)
                .rule(ValueRange::below(0.05), 2, 0.7)
                .rule(ValueRange::between(0.05, 0.1), 1, 0.5)
                .rule(ValueRange::at_least(0.2), -2, 0.8)
                .rule(ValueRange::between(0.15, 0.2), -1, 0.6),
        )
        .rule_table(
            RuleTable::new(FeatureName::Smoothness)
                .rule(ValueRange::below(5.0), 2, 0.6)
                .rule(ValueRange::between(5.0, 10.0), 1, 0.4)
                .rule(ValueRange::at_least(20.0), -1, 0.4),
        )
        .rule_table(
            RuleTable::new(FeatureName::GradientMean)
                .rule(ValueRange::below(15.0), 1, 0.3)
                .rule(ValueRange::at_least(30.0), -1, 0.3),
        )
        .build()
}

//! TOML representation of a bucket configuration.

use serde::Deserialize;

use super::{AgeBucket, BucketConfiguration, RuleTable, ScoreRule, ValueRange};
use crate::error::Result;
use crate::models::FeatureName;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(rename = "bucket", default)]
    buckets: Vec<BucketEntry>,
    #[serde(rename = "rule_table", default)]
    rule_tables: Vec<RuleTableEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BucketEntry {
    id: u32,
    label: String,
    lower_bound: Option<i32>,
    #[serde(default)]
    color: [u8; 3],
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleTableEntry {
    feature: FeatureName,
    #[serde(default)]
    rules: Vec<RuleEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleEntry {
    /// Inclusive low end.
    from: Option<f64>,
    /// Exclusive high end.
    below: Option<f64>,
    score: i32,
    #[serde(default)]
    weight: f64,
}

pub(super) fn parse(text: &str) -> Result<BucketConfiguration> {
    let file: ConfigFile = toml::from_str(text)?;

    let buckets = file
        .buckets
        .into_iter()
        .map(|b| AgeBucket::new(b.id, b.label, b.lower_bound, b.color))
        .collect();

    let rule_tables = file
        .rule_tables
        .into_iter()
        .map(|t| RuleTable {
            feature: t.feature,
            rules: t
                .rules
                .into_iter()
                .map(|r| ScoreRule::new(ValueRange::new(r.from, r.below), r.score, r.weight))
                .collect(),
        })
        .collect();

    BucketConfiguration::new(buckets, rule_tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const SMALL: &str = r#"
        [[bucket]]
        id = 0
        label = "young"
        lower_bound = 1
        color = [0, 255, 0]

        [[bucket]]
        id = 1
        label = "old"

        [[rule_table]]
        feature = "contrast"
        rules = [
            { from = 60, score = 1, weight = 0.5 },
            { below = 30, score = -1, weight = 0.5 },
        ]
    "#;

    #[test]
    fn parses_small_file() {
        let config = parse(SMALL).unwrap();
        assert_eq!(config.bucket_count(), 2);
        let table = config.rule_table(FeatureName::Contrast).unwrap();
        assert_eq!(table.rules[0].range, ValueRange::at_least(60.0));
        assert_eq!(table.rules[1].range, ValueRange::below(30.0));
        assert_eq!(config.bucket_for(1).label, "young");
        assert_eq!(config.bucket_for(0).label, "old");
    }

    #[test]
    fn unknown_feature_is_a_parse_error() {
        let text = SMALL.replace("\"contrast\"", "\"wrinkles\"");
        assert!(matches!(parse(&text), Err(Error::ConfigParse(_))));
    }

    #[test]
    fn shared_bound_is_a_configuration_error() {
        let text = r#"
            [[bucket]]
            id = 0
            label = "a"
            lower_bound = 2

            [[bucket]]
            id = 1
            label = "b"
            lower_bound = 2

            [[bucket]]
            id = 2
            label = "c"
        "#;
        assert!(matches!(parse(text), Err(Error::Configuration(_))));
    }
}

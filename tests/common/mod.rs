mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from faceage for tests
pub use faceage::{
    AgeBucket, AgeEstimator, AgeScorer, BucketConfiguration, Error, FaceBox, FeatureExtractor,
    FeatureName, FeatureSet, FixedRegionDetector, Preset, RuleTable, ScoreResult, ValueRange,
    WholeImageDetector,
};

//! # faceage
//!
//! Heuristic age-bucket estimation for face crops.
//!
//! A [`FeatureExtractor`] turns a cropped face into a [`FeatureSet`] of image
//! statistics (texture, contrast, edge density, smoothness, gradient, size).
//! An [`AgeScorer`] runs the per-feature rule tables of a
//! [`BucketConfiguration`] over those values, sums a signed score and maps it
//! to one [`AgeBucket`] together with a confidence in `[0, 1]`.
//!
//! Higher scores mean younger in the shipped presets. None of the thresholds
//! are calibrated against real ages.
//!
//! ```no_run
//! use std::sync::Arc;
//! use faceage::{AgeEstimator, BucketConfiguration, Preset, WholeImageDetector};
//!
//! let config = Arc::new(BucketConfiguration::preset(Preset::Nine)?);
//! let estimator = AgeEstimator::new(Arc::new(WholeImageDetector), config);
//! let img = image::open("face.png")?;
//! for face in estimator.analyze(&img)? {
//!     println!("{} ({:.0}%)", face.result.bucket.label, face.result.confidence * 100.0);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod detection;
mod error;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod stats;

pub use config::{
    AgeBucket, BucketConfiguration, BucketConfigurationBuilder, DisplayHint, Preset, RuleTable,
    ScoreRule, ValueRange,
};
pub use detection::AgeEstimator;
pub use detection::detector::{FaceDetector, FixedRegionDetector, WholeImageDetector};
pub use detection::features::{ExtractorParams, FeatureExtractor};
pub use detection::scoring::{AgeScorer, score};
pub use error::{Error, Result};
pub use models::{FaceAnalysis, FaceBox, FeatureName, FeatureSet, ScoreResult};
pub use pipeline::{DebugConfig, Pipeline, PipelineContext, PipelineData, PipelineStep};
pub use stats::AgeStats;

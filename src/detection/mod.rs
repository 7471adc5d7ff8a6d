pub mod annotate;
pub mod detector;
pub mod features;
pub mod preprocessing;
pub mod scoring;
pub mod steps;

use std::path::PathBuf;
use std::sync::Arc;

use image::DynamicImage;
use log::info;

use crate::config::BucketConfiguration;
use crate::models::FaceAnalysis;
use crate::pipeline::Pipeline;
use detector::FaceDetector;
use features::FeatureExtractor;
use scoring::AgeScorer;

/// Detect, measure and score every face in an image
pub struct AgeEstimator {
    detector: Arc<dyn FaceDetector>,
    extractor: FeatureExtractor,
    scorer: AgeScorer,
}

impl AgeEstimator {
    /// Estimator whose extractor computes only what `config` needs
    pub fn new(detector: Arc<dyn FaceDetector>, config: Arc<BucketConfiguration>) -> Self {
        Self {
            detector,
            extractor: FeatureExtractor::for_configuration(&config),
            scorer: AgeScorer::new(config),
        }
    }

    pub fn with_extractor(mut self, extractor: FeatureExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &BucketConfiguration {
        self.scorer.config()
    }

    /// The detection pipeline this estimator runs
    pub fn pipeline(&self) -> Pipeline {
        build_standard_pipeline(
            self.detector.clone(),
            self.extractor.clone(),
            self.scorer.clone(),
        )
    }

    /// Run the full pipeline on an image.
    /// Faces with an empty crop are skipped; the others are still reported.
    pub fn analyze(&self, img: &DynamicImage) -> anyhow::Result<Vec<FaceAnalysis>> {
        self.run(self.pipeline(), img)
    }

    /// Like [`AgeEstimator::analyze`], saving every step's crops under `dir`,
    /// which must be empty or missing
    pub fn analyze_with_debug(
        &self,
        img: &DynamicImage,
        dir: PathBuf,
    ) -> anyhow::Result<Vec<FaceAnalysis>> {
        self.run(self.pipeline().with_debug(dir)?, img)
    }

    fn run(&self, pipeline: Pipeline, img: &DynamicImage) -> anyhow::Result<Vec<FaceAnalysis>> {
        let results = pipeline.run(img.clone())?;
        let faces: Vec<FaceAnalysis> = results.iter().filter_map(|item| item.analysis()).collect();

        for face in &faces {
            info!(
                "face at ({}, {}) {}x{}: {} (score {}, confidence {:.2})",
                face.face.x,
                face.face.y,
                face.face.width,
                face.face.height,
                face.result.bucket.label,
                face.result.raw_score,
                face.result.confidence
            );
        }

        Ok(faces)
    }
}

/// Build a standard age estimation pipeline using the composable pipeline system
pub fn build_standard_pipeline(
    detector: Arc<dyn FaceDetector>,
    extractor: FeatureExtractor,
    scorer: AgeScorer,
) -> Pipeline {
    use crate::detection::steps::*;

    Pipeline::new()
        .add_step(Arc::new(FaceDetectionStep { detector }))
        .add_step(Arc::new(FeatureExtractionStep { extractor }))
        .add_step(Arc::new(AgeScoringStep { scorer }))
}

use std::sync::Arc;

use anyhow::{bail, Result};
use log::{debug, warn};
use rayon::prelude::*;

use crate::detection::detector::FaceDetector;
use crate::detection::features::FeatureExtractor;
use crate::detection::scoring::AgeScorer;
use crate::pipeline::{PipelineContext, PipelineData, PipelineStep};

/// Find faces - splits one image into one item per face
pub struct FaceDetectionStep {
    pub detector: Arc<dyn FaceDetector>,
}

impl PipelineStep for FaceDetectionStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let mut result = Vec::new();

        for item in data {
            let faces = self.detector.detect(&item.image);
            debug!("detector found {} faces", faces.len());

            // Each face becomes its own PipelineData, cropped from the original
            for face in faces {
                let cropped = face.crop(&item.original);
                result.push(PipelineData::from_face(cropped, item.original.clone(), face));
            }
        }

        Ok(result)
    }

    fn name(&self) -> &str {
        "Face Detection"
    }
}

/// Measure every face. Faces the extractor rejects are dropped, the rest continue.
pub struct FeatureExtractionStep {
    pub extractor: FeatureExtractor,
}

impl PipelineStep for FeatureExtractionStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        let result = data
            .into_par_iter()
            .filter_map(|mut item| match self.extractor.extract(&item.image) {
                Ok(features) => {
                    item.features = Some(features);
                    Some(item)
                }
                Err(e) => {
                    warn!("skipping face {:?}: {}", item.face, e);
                    None
                }
            })
            .collect();

        Ok(result)
    }

    fn name(&self) -> &str {
        "Feature Extraction"
    }
}

/// Assign each measured face to an age bucket
pub struct AgeScoringStep {
    pub scorer: AgeScorer,
}

impl PipelineStep for AgeScoringStep {
    fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
        if data.iter().any(|item| item.features.is_none()) {
            bail!("{} needs extracted features; add a feature extraction step first", self.name());
        }

        let result = data
            .into_par_iter()
            .map(|mut item| {
                item.score = item.features.as_ref().map(|f| self.scorer.score(f));
                item
            })
            .collect();

        Ok(result)
    }

    fn name(&self) -> &str {
        "Age Scoring"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BucketConfiguration, Preset};
    use crate::detection::detector::FixedRegionDetector;
    use crate::models::FaceBox;
    use image::DynamicImage;

    #[test]
    fn detection_splits_and_extraction_drops_empty_faces() {
        let img = DynamicImage::new_luma8(100, 100);
        let context = PipelineContext::default();
        let detect = FaceDetectionStep {
            detector: Arc::new(FixedRegionDetector::new(vec![
                FaceBox::new(0, 0, 50, 50),
                FaceBox::new(500, 500, 10, 10),
                FaceBox::new(50, 50, 50, 50),
            ])),
        };
        let faces = detect
            .process(vec![PipelineData::from_image(img)], &context)
            .unwrap();
        assert_eq!(faces.len(), 3);

        let extract = FeatureExtractionStep {
            extractor: FeatureExtractor::new(),
        };
        let measured = extract.process(faces, &context).unwrap();
        assert_eq!(measured.len(), 2);
        assert_eq!(measured[0].face, Some(FaceBox::new(0, 0, 50, 50)));
        assert_eq!(measured[1].face, Some(FaceBox::new(50, 50, 50, 50)));
    }

    #[test]
    fn scoring_without_features_is_an_error() {
        let config = Arc::new(BucketConfiguration::preset(Preset::Nine).unwrap());
        let step = AgeScoringStep {
            scorer: AgeScorer::new(config),
        };
        let item = PipelineData::from_image(DynamicImage::new_luma8(4, 4));
        assert!(step.process(vec![item], &PipelineContext::default()).is_err());
    }
}

use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Result;
use log::{debug, info};

use crate::models::{FaceAnalysis, FaceBox, FeatureSet, ScoreResult};

/// Data that flows through the pipeline
/// Each PipelineData is either the full input image or one face cut out of it
#[derive(Clone)]
pub struct PipelineData {
    /// The image data (full image before detection, face crop after)
    pub image: DynamicImage,

    /// Reference to the original image (shared efficiently via Arc)
    pub original: Arc<DynamicImage>,

    /// Face box in the original image (None means full image)
    pub face: Option<FaceBox>,

    /// Filled in by the feature extraction step
    pub features: Option<FeatureSet>,

    /// Filled in by the scoring step
    pub score: Option<ScoreResult>,
}

impl PipelineData {
    /// Create PipelineData for a full image
    pub fn from_image(image: DynamicImage) -> Self {
        let original = Arc::new(image.clone());
        Self {
            image,
            original,
            face: None,
            features: None,
            score: None,
        }
    }

    /// Create PipelineData for one face of an image
    pub fn from_face(image: DynamicImage, original: Arc<DynamicImage>, face: FaceBox) -> Self {
        Self {
            image,
            original,
            face: Some(face),
            features: None,
            score: None,
        }
    }

    /// Completed analysis, if every step has run on this item
    pub fn analysis(&self) -> Option<FaceAnalysis> {
        Some(FaceAnalysis {
            face: self.face?,
            features: self.features.clone()?,
            result: self.score.clone()?,
        })
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Process data and return transformed data
    /// Steps can split data (1 → many), filter (many → fewer), or transform (many → many)
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>>;

    /// Human-readable name for this step (used in logs and debug directories)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box (for convenience)
    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step on an input image
    pub fn run(&self, input: DynamicImage) -> Result<Vec<PipelineData>> {
        self.run_partial(input, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, input: DynamicImage, num_steps: usize) -> Result<Vec<PipelineData>> {
        let mut data = vec![PipelineData::from_image(input)];
        self.save_debug_outputs("00_input", &data)?;

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            debug!("Running step: {} (processing {} items)", step.name(), data.len());

            data = step.process(data, &self.context)?;

            let step_dir_name = format!(
                "{:02}_{}",
                step_idx + 1,
                step.name().to_lowercase().replace(' ', "_")
            );
            self.save_debug_outputs(&step_dir_name, &data)?;

            info!("{}: {} items", step.name(), data.len());
        }

        Ok(data)
    }

    fn save_debug_outputs(&self, step_dir_name: &str, data: &[PipelineData]) -> Result<()> {
        let Some(debug_config) = &self.context.debug else {
            return Ok(());
        };

        let step_dir = debug_config.output_dir.join(step_dir_name);
        std::fs::create_dir_all(&step_dir)?;

        let mut saved = 0;
        for (idx, item) in data.iter().enumerate() {
            // Empty crops cannot be encoded.
            if item.image.width() == 0 || item.image.height() == 0 {
                continue;
            }
            save_image(&item.image, &step_dir.join(format!("{:02}.png", idx + 1)))?;
            saved += 1;
        }

        debug!("Debug: saved {} images to {}/", saved, step_dir_name);
        Ok(())
    }
}

fn save_image(image: &DynamicImage, path: &Path) -> Result<()> {
    image
        .save(path)
        .map_err(|e| anyhow::anyhow!("Failed to save debug image {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Halve;

    impl PipelineStep for Halve {
        fn process(&self, data: Vec<PipelineData>, _context: &PipelineContext) -> Result<Vec<PipelineData>> {
            Ok(data
                .into_iter()
                .map(|mut item| {
                    let (w, h) = (item.image.width() / 2, item.image.height());
                    item.image = item.image.crop_imm(0, 0, w, h);
                    item
                })
                .collect())
        }

        fn name(&self) -> &str {
            "Halve Width"
        }
    }

    #[test]
    fn runs_steps_in_order() {
        let pipeline = Pipeline::new()
            .add_step(Arc::new(Halve))
            .add_step_boxed(Box::new(Halve));
        let out = pipeline.run(DynamicImage::new_luma8(40, 10)).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].image.width(), 10);
        assert_eq!(out[0].original.width(), 40);

        let partial = pipeline.run_partial(DynamicImage::new_luma8(40, 10), 1).unwrap();
        assert_eq!(partial[0].image.width(), 20);
    }

    #[test]
    fn analysis_requires_every_stage() {
        let item = PipelineData::from_image(DynamicImage::new_luma8(4, 4));
        assert!(item.analysis().is_none());
    }

    #[test]
    fn debug_dir_must_be_empty() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("stale.txt"), "x").unwrap();
        assert!(Pipeline::new().with_debug(dir.path().to_path_buf()).is_err());
    }

    #[test]
    fn debug_mode_writes_each_step() {
        let dir = tempfile::TempDir::new().unwrap();
        let out_dir = dir.path().join("debug");
        let pipeline = Pipeline::new()
            .with_debug(out_dir.clone())
            .unwrap()
            .add_step(Arc::new(Halve));
        pipeline.run(DynamicImage::new_luma8(8, 8)).unwrap();
        assert!(out_dir.join("00_input/01.png").exists());
        assert!(out_dir.join("01_halve_width/01.png").exists());
    }
}

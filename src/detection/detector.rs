use image::DynamicImage;

use crate::models::FaceBox;

/// Pluggable face detection backend.
///
/// The scoring core never calls a detector itself; the pipeline's face
/// detection step does. Any model a detector needs is owned by the implementor.
pub trait FaceDetector: Send + Sync {
    /// Bounding boxes of the faces in `image`, with any confidence threshold
    /// already applied.
    fn detect(&self, image: &DynamicImage) -> Vec<FaceBox>;
}

impl<F> FaceDetector for F
where
    F: Fn(&DynamicImage) -> Vec<FaceBox> + Send + Sync,
{
    fn detect(&self, image: &DynamicImage) -> Vec<FaceBox> {
        self(image)
    }
}

/// Treats the whole input as one face. For inputs that are already cropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct WholeImageDetector;

impl FaceDetector for WholeImageDetector {
    fn detect(&self, image: &DynamicImage) -> Vec<FaceBox> {
        vec![FaceBox::new(0, 0, image.width(), image.height())]
    }
}

/// Reports caller-supplied boxes, clamped to each image.
#[derive(Debug, Clone, Default)]
pub struct FixedRegionDetector {
    faces: Vec<FaceBox>,
}

impl FixedRegionDetector {
    pub fn new(faces: Vec<FaceBox>) -> Self {
        Self { faces }
    }
}

impl FaceDetector for FixedRegionDetector {
    fn detect(&self, image: &DynamicImage) -> Vec<FaceBox> {
        self.faces
            .iter()
            .map(|f| f.clamped(image.width(), image.height()))
            .collect()
    }
}

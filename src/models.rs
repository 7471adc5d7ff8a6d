use std::collections::BTreeMap;
use std::fmt;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::config::AgeBucket;

/// Scalar measurements the extractor can produce.
///
/// Declaration order is the evaluation order used by the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureName {
    Area,
    Width,
    Height,
    AspectRatio,
    TextureVariance,
    Contrast,
    EdgeDensity,
    Smoothness,
    GradientMean,
    HistMean,
    HistStd,
}

impl FeatureName {
    pub const ALL: [FeatureName; 11] = [
        FeatureName::Area,
        FeatureName::Width,
        FeatureName::Height,
        FeatureName::AspectRatio,
        FeatureName::TextureVariance,
        FeatureName::Contrast,
        FeatureName::EdgeDensity,
        FeatureName::Smoothness,
        FeatureName::GradientMean,
        FeatureName::HistMean,
        FeatureName::HistStd,
    ];

    /// Features derived from the region size alone.
    pub const GEOMETRY: [FeatureName; 4] = [
        FeatureName::Area,
        FeatureName::Width,
        FeatureName::Height,
        FeatureName::AspectRatio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureName::Area => "area",
            FeatureName::Width => "width",
            FeatureName::Height => "height",
            FeatureName::AspectRatio => "aspect_ratio",
            FeatureName::TextureVariance => "texture_variance",
            FeatureName::Contrast => "contrast",
            FeatureName::EdgeDensity => "edge_density",
            FeatureName::Smoothness => "smoothness",
            FeatureName::GradientMean => "gradient_mean",
            FeatureName::HistMean => "hist_mean",
            FeatureName::HistStd => "hist_std",
        }
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable feature values for one face.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureSet {
    values: BTreeMap<FeatureName, f64>,
}

impl FeatureSet {
    pub fn get(&self, name: FeatureName) -> Option<f64> {
        self.values.get(&name).copied()
    }

    pub fn contains(&self, name: FeatureName) -> bool {
        self.values.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureName, f64)> + '_ {
        self.values.iter().map(|(name, value)| (*name, *value))
    }
}

impl FromIterator<(FeatureName, f64)> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = (FeatureName, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[(FeatureName, f64); N]> for FeatureSet {
    fn from(pairs: [(FeatureName, f64); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Face bounding box reported by a detector, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaceBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Detector confidence. The scorer never looks at it.
    pub confidence: f32,
}

impl FaceBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            confidence: 1.0,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn center(&self) -> (u32, u32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Shrink the box so it lies inside a `width` x `height` image.
    /// A box entirely outside the image collapses to zero size.
    pub fn clamped(&self, width: u32, height: u32) -> FaceBox {
        let x = self.x.min(width);
        let y = self.y.min(height);
        FaceBox {
            x,
            y,
            width: self.width.min(width - x),
            height: self.height.min(height - y),
            confidence: self.confidence,
        }
    }

    /// Crop this box out of `img`. The result may be empty; the extractor rejects it.
    pub fn crop(&self, img: &DynamicImage) -> DynamicImage {
        let b = self.clamped(img.width(), img.height());
        img.crop_imm(b.x, b.y, b.width, b.height)
    }
}

/// Outcome of scoring one face.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub bucket: AgeBucket,
    pub raw_score: i32,
    /// Always within `[0, 1]`.
    pub confidence: f64,
}

/// Everything known about one analysed face.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaceAnalysis {
    pub face: FaceBox,
    pub features: FeatureSet,
    pub result: ScoreResult,
}

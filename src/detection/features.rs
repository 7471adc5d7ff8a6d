//! Per-face image statistics.

use std::collections::BTreeSet;

use image::{DynamicImage, GrayImage};
use log::trace;

use super::preprocessing::{self, GrayF32};
use crate::config::BucketConfiguration;
use crate::error::{Error, Result};
use crate::models::{FeatureName, FeatureSet};

/// Tunable constants for the image statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractorParams {
    pub canny_low: f32,
    pub canny_high: f32,
    /// Sigma of the blur that `smoothness` compares against.
    /// 1.1 is what a 5x5 kernel with automatic sigma uses.
    pub blur_sigma: f32,
}

impl Default for ExtractorParams {
    fn default() -> Self {
        Self {
            canny_low: 50.0,
            canny_high: 150.0,
            blur_sigma: 1.1,
        }
    }
}

/// Computes a [`FeatureSet`] from a cropped face region.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    enabled: BTreeSet<FeatureName>,
    params: ExtractorParams,
}

impl FeatureExtractor {
    /// Extractor producing every feature with default parameters.
    pub fn new() -> Self {
        Self {
            enabled: FeatureName::ALL.into_iter().collect(),
            params: ExtractorParams::default(),
        }
    }

    /// Geometry plus every feature the configuration's rule tables read.
    pub fn for_configuration(config: &BucketConfiguration) -> Self {
        Self::new().with_features(
            FeatureName::GEOMETRY
                .into_iter()
                .chain(config.required_features()),
        )
    }

    pub fn with_features<I: IntoIterator<Item = FeatureName>>(mut self, features: I) -> Self {
        self.enabled = features.into_iter().collect();
        self
    }

    pub fn with_params(mut self, params: ExtractorParams) -> Result<Self> {
        if !(params.blur_sigma > 0.0) {
            return Err(Error::configuration(format!(
                "blur sigma must be positive, got {}",
                params.blur_sigma
            )));
        }
        if !(params.canny_low >= 0.0 && params.canny_low <= params.canny_high) {
            return Err(Error::configuration(format!(
                "canny thresholds must satisfy 0 <= low <= high, got {} / {}",
                params.canny_low, params.canny_high
            )));
        }
        self.params = params;
        Ok(self)
    }

    pub fn enabled(&self) -> &BTreeSet<FeatureName> {
        &self.enabled
    }

    pub fn params(&self) -> &ExtractorParams {
        &self.params
    }

    /// Measure `region`. Fails only when the region has no pixels.
    pub fn extract(&self, region: &DynamicImage) -> Result<FeatureSet> {
        let (width, height) = (region.width(), region.height());
        if width == 0 || height == 0 {
            return Err(Error::InvalidRegion { width, height });
        }

        let gray = preprocessing::to_grayscale(region);
        let mut measure = Measurements::new(&gray, self.params);

        let features: FeatureSet = self
            .enabled
            .iter()
            .map(|&name| (name, measure.get(name)))
            .collect();

        trace!("{}x{} region: {:?}", width, height, features);
        Ok(features)
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazily computed intermediates shared between features.
struct Measurements<'a> {
    gray: &'a GrayImage,
    params: ExtractorParams,
    gray_f32: Option<GrayF32>,
    histogram: Option<[u32; 256]>,
}

impl<'a> Measurements<'a> {
    fn new(gray: &'a GrayImage, params: ExtractorParams) -> Self {
        Self {
            gray,
            params,
            gray_f32: None,
            histogram: None,
        }
    }

    fn area(&self) -> f64 {
        self.gray.width() as f64 * self.gray.height() as f64
    }

    fn gray_f32(&mut self) -> &GrayF32 {
        let gray = self.gray;
        self.gray_f32
            .get_or_insert_with(|| preprocessing::to_f32(gray))
    }

    fn histogram(&mut self) -> [u32; 256] {
        let gray = self.gray;
        *self
            .histogram
            .get_or_insert_with(|| preprocessing::intensity_histogram(gray))
    }

    fn get(&mut self, name: FeatureName) -> f64 {
        match name {
            FeatureName::Area => self.area(),
            FeatureName::Width => self.gray.width() as f64,
            FeatureName::Height => self.gray.height() as f64,
            FeatureName::AspectRatio => self.gray.width() as f64 / self.gray.height() as f64,
            FeatureName::TextureVariance => {
                let response = preprocessing::laplacian(self.gray_f32());
                preprocessing::mean_variance(response.iter().map(|v| *v as f64)).1
            }
            FeatureName::Contrast => {
                let (_, var) =
                    preprocessing::mean_variance(self.gray.as_raw().iter().map(|p| *p as f64));
                var.sqrt()
            }
            FeatureName::EdgeDensity => {
                let edges = preprocessing::detect_edges(
                    self.gray,
                    self.params.canny_low,
                    self.params.canny_high,
                );
                let count = edges.as_raw().iter().filter(|p| **p > 0).count();
                count as f64 / self.area()
            }
            FeatureName::Smoothness => {
                let blurred = preprocessing::apply_blur(self.gray, self.params.blur_sigma);
                let total: f64 = self
                    .gray
                    .as_raw()
                    .iter()
                    .zip(blurred.as_raw().iter())
                    .map(|(a, b)| (*a as f64 - *b as f64).abs())
                    .sum();
                total / self.area()
            }
            FeatureName::GradientMean => {
                let magnitude = preprocessing::gradient_magnitude(self.gray_f32());
                preprocessing::mean_variance(magnitude.iter().map(|v| *v as f64)).0
            }
            FeatureName::HistMean => {
                let hist = self.histogram();
                preprocessing::mean_variance(hist.iter().map(|c| *c as f64)).0
            }
            FeatureName::HistStd => {
                let hist = self.histogram();
                preprocessing::mean_variance(hist.iter().map(|c| *c as f64))
                    .1
                    .sqrt()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn flat(width: u32, height: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([value])))
    }

    fn checkerboard(size: u32, cell: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(size, size, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Luma([30u8])
            } else {
                Luma([220u8])
            }
        }))
    }

    #[test]
    fn zero_area_region_is_rejected() {
        let extractor = FeatureExtractor::new();
        for (w, h) in [(0, 0), (0, 10), (10, 0)] {
            let err = extractor.extract(&DynamicImage::new_luma8(w, h)).unwrap_err();
            assert!(matches!(err, Error::InvalidRegion { width, height } if width == w && height == h));
        }
    }

    #[test]
    fn geometry_features() {
        let features = FeatureExtractor::new().extract(&flat(40, 20, 0)).unwrap();
        assert_eq!(features.get(FeatureName::Area), Some(800.0));
        assert_eq!(features.get(FeatureName::Width), Some(40.0));
        assert_eq!(features.get(FeatureName::Height), Some(20.0));
        assert_eq!(features.get(FeatureName::AspectRatio), Some(2.0));
        assert_eq!(features.get(FeatureName::HistMean), Some(800.0 / 256.0));
    }

    #[test]
    fn flat_region_has_no_texture() {
        let features = FeatureExtractor::new().extract(&flat(32, 32, 0)).unwrap();
        for name in [
            FeatureName::TextureVariance,
            FeatureName::Contrast,
            FeatureName::EdgeDensity,
            FeatureName::Smoothness,
            FeatureName::GradientMean,
        ] {
            let value = features.get(name).unwrap();
            assert!(value.abs() < 1e-6, "{} = {}", name, value);
        }
    }

    #[test]
    fn textured_region_scores_higher_than_flat() {
        let extractor = FeatureExtractor::new();
        let rough = extractor.extract(&checkerboard(64, 4)).unwrap();
        let smooth = extractor.extract(&flat(64, 64, 0)).unwrap();
        for name in [
            FeatureName::TextureVariance,
            FeatureName::Contrast,
            FeatureName::EdgeDensity,
            FeatureName::Smoothness,
            FeatureName::GradientMean,
        ] {
            assert!(rough.get(name).unwrap() > smooth.get(name).unwrap(), "{}", name);
        }
        // Two intensities in equal measure.
        assert!((rough.get(FeatureName::Contrast).unwrap() - 95.0).abs() < 1e-9);
    }

    #[test]
    fn only_enabled_features_are_computed() {
        let extractor =
            FeatureExtractor::new().with_features([FeatureName::Area, FeatureName::Contrast]);
        let features = extractor.extract(&checkerboard(16, 2)).unwrap();
        assert_eq!(features.len(), 2);
        assert!(features.contains(FeatureName::Contrast));
        assert!(!features.contains(FeatureName::EdgeDensity));
    }

    #[test]
    fn extraction_is_deterministic() {
        let extractor = FeatureExtractor::new();
        let img = checkerboard(48, 3);
        assert_eq!(extractor.extract(&img).unwrap(), extractor.extract(&img).unwrap());
    }

    #[test]
    fn colour_regions_are_converted_to_gray() {
        let rgb = DynamicImage::new_rgb8(10, 12);
        let features = FeatureExtractor::new().extract(&rgb).unwrap();
        assert_eq!(features.get(FeatureName::Area), Some(120.0));
    }

    #[test]
    fn rejects_bad_params() {
        let bad_sigma = ExtractorParams {
            blur_sigma: 0.0,
            ..Default::default()
        };
        assert!(FeatureExtractor::new().with_params(bad_sigma).is_err());

        let swapped = ExtractorParams {
            canny_low: 200.0,
            canny_high: 100.0,
            ..Default::default()
        };
        assert!(FeatureExtractor::new().with_params(swapped).is_err());
    }
}

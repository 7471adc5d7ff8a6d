use faceage::{BucketConfiguration, FeatureName, FeatureSet, Preset};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Features of a small, smooth, low-detail face.
pub fn young_features() -> FeatureSet {
    FeatureSet::from([
        (FeatureName::Area, 3000.0),
        (FeatureName::TextureVariance, 850.0),
        (FeatureName::Contrast, 65.0),
        (FeatureName::EdgeDensity, 0.03),
        (FeatureName::Smoothness, 4.0),
        (FeatureName::GradientMean, 10.0),
    ])
}

/// Features of a large, flat, edge-heavy face.
pub fn old_features() -> FeatureSet {
    FeatureSet::from([
        (FeatureName::Area, 25000.0),
        (FeatureName::TextureVariance, 80.0),
        (FeatureName::Contrast, 25.0),
        (FeatureName::EdgeDensity, 0.22),
        (FeatureName::Smoothness, 25.0),
        (FeatureName::GradientMean, 35.0),
    ])
}

/// Replace one value in a feature set.
pub fn with_feature(features: &FeatureSet, name: FeatureName, value: f64) -> FeatureSet {
    features
        .iter()
        .filter(|(n, _)| *n != name)
        .chain(std::iter::once((name, value)))
        .collect()
}

pub fn shared_preset(preset: Preset) -> Arc<BucketConfiguration> {
    Arc::new(BucketConfiguration::preset(preset).expect("preset must validate"))
}

/// Uniform gray image.
pub fn flat_image(width: u32, height: u32, value: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([value])))
}

/// Checkerboard of `cell`-sized squares alternating between `dark` and `light`.
pub fn checkerboard(width: u32, height: u32, cell: u32, dark: u8, light: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(ImageBuffer::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Luma([dark])
        } else {
            Luma([light])
        }
    }))
}

/// Writes a 64x48 RGB gradient PNG and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_image() -> NamedTempFile {
    let img = ImageBuffer::from_fn(64, 48, |x, y| Rgb([(x * 4) as u8, (y * 5) as u8, 128u8]));
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

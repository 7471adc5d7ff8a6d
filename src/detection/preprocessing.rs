use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::edges::canny;
use imageproc::filter::{filter3x3, gaussian_blur_f32};
use imageproc::stats::histogram;

pub type GrayF32 = ImageBuffer<Luma<f32>, Vec<f32>>;

const K_LAPLACIAN: [f32; 9] = [0.0, 1.0, 0.0, 1.0, -4.0, 1.0, 0.0, 1.0, 0.0];
const K_SOBEL_X: [f32; 9] = [-1.0, 0.0, 1.0, -2.0, 0.0, 2.0, -1.0, 0.0, 1.0];
const K_SOBEL_Y: [f32; 9] = [-1.0, -2.0, -1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 1.0];

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

pub fn to_f32(img: &GrayImage) -> GrayF32 {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        Luma([img.get_pixel(x, y)[0] as f32])
    })
}

/// Apply Gaussian blur to reduce noise
pub fn apply_blur(img: &GrayImage, sigma: f32) -> GrayImage {
    gaussian_blur_f32(img, sigma)
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// Second-derivative response, one value per pixel.
pub fn laplacian(img: &GrayF32) -> Vec<f32> {
    filter3x3(img, &K_LAPLACIAN).into_raw()
}

/// Sobel gradient magnitude, one value per pixel.
pub fn gradient_magnitude(img: &GrayF32) -> Vec<f32> {
    let gx: Vec<f32> = filter3x3(img, &K_SOBEL_X).into_raw();
    let gy: Vec<f32> = filter3x3(img, &K_SOBEL_Y).into_raw();
    gx.iter()
        .zip(gy.iter())
        .map(|(x, y)| (x * x + y * y).sqrt())
        .collect()
}

/// 256-bin intensity histogram.
pub fn intensity_histogram(img: &GrayImage) -> [u32; 256] {
    histogram(img).channels[0]
}

/// Population mean and variance. Returns zeros for an empty input.
pub fn mean_variance<I>(values: I) -> (f64, f64)
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: Clone,
{
    let values = values.into_iter();
    let (sum, count) = values
        .clone()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / count as f64;
    let var = values.map(|v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;
    (mean, var)
}

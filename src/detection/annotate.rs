use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::models::FaceAnalysis;

const BORDER: u32 = 2;

/// Draw every analysed face box in its bucket's display colour.
pub fn annotate(img: &DynamicImage, faces: &[FaceAnalysis]) -> RgbImage {
    let mut canvas = img.to_rgb8();
    for face in faces {
        let color = Rgb(face.result.bucket.display_hint.color);
        let b = face.face.clamped(canvas.width(), canvas.height());
        // Inset one rectangle per pixel of border width.
        for inset in 0..BORDER {
            let (w, h) = (
                b.width.saturating_sub(2 * inset),
                b.height.saturating_sub(2 * inset),
            );
            if w == 0 || h == 0 {
                break;
            }
            let rect = Rect::at((b.x + inset) as i32, (b.y + inset) as i32).of_size(w, h);
            draw_hollow_rect_mut(&mut canvas, rect, color);
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgeBucket;
    use crate::models::{FaceBox, FeatureSet, ScoreResult};

    fn analysis(face: FaceBox, color: [u8; 3]) -> FaceAnalysis {
        FaceAnalysis {
            face,
            features: FeatureSet::default(),
            result: ScoreResult {
                bucket: AgeBucket::new(0, "test", None, color),
                raw_score: 0,
                confidence: 0.5,
            },
        }
    }

    #[test]
    fn draws_box_outline_in_bucket_color() {
        let img = DynamicImage::new_rgb8(50, 50);
        let out = annotate(&img, &[analysis(FaceBox::new(10, 10, 20, 20), [255, 0, 0])]);
        assert_eq!(out.get_pixel(10, 10), &Rgb([255, 0, 0]));
        assert_eq!(out.get_pixel(11, 15), &Rgb([255, 0, 0]));
        assert_eq!(out.get_pixel(20, 20), &Rgb([0, 0, 0]));
    }

    #[test]
    fn empty_boxes_are_ignored() {
        let img = DynamicImage::new_rgb8(8, 8);
        let out = annotate(&img, &[analysis(FaceBox::new(20, 20, 4, 4), [1, 2, 3])]);
        assert!(out.pixels().all(|p| p == &Rgb([0, 0, 0])));
    }
}

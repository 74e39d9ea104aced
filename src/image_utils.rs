use std::path::Path;

use image::{GrayImage, Luma, RgbImage};

/// Extensions accepted as batch inputs, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

/// Perceptual (ITU-R 601) luma conversion, rounded to the nearest level.
pub fn rgb_to_gray(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut gray = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        let lum = 0.299 * pixel[0] as f64 + 0.587 * pixel[1] as f64 + 0.114 * pixel[2] as f64;
        gray.put_pixel(x, y, Luma([clamp_channel(lum)]));
    }

    gray
}

pub fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

pub fn mean_luminance(image: &RgbImage) -> f64 {
    let gray = rgb_to_gray(image);
    let count = gray.len();
    if count == 0 {
        return 0.0;
    }
    gray.iter().map(|&v| v as f64).sum::<f64>() / count as f64
}

/// Per-channel means `[r, g, b]`.
pub fn channel_means(image: &RgbImage) -> [f64; 3] {
    let count = (image.width() as u64 * image.height() as u64) as f64;
    if count == 0.0 {
        return [0.0; 3];
    }

    let mut sums = [0u64; 3];
    for pixel in image.pixels() {
        for (sum, &value) in sums.iter_mut().zip(pixel.0.iter()) {
            *sum += value as u64;
        }
    }

    [
        sums[0] as f64 / count,
        sums[1] as f64 / count,
        sums[2] as f64 / count,
    ]
}

/// Copies `src` into `dest` with its top-left corner at the offset, dropping
/// whatever falls outside `dest`.
pub fn copy_image_to(dest: &mut RgbImage, src: &RgbImage, offset_x: u32, offset_y: u32) {
    let (dest_w, dest_h) = dest.dimensions();
    let (src_w, src_h) = src.dimensions();

    for y in 0..src_h {
        for x in 0..src_w {
            let dx = offset_x + x;
            let dy = offset_y + y;
            if dx < dest_w && dy < dest_h {
                dest.put_pixel(dx, dy, *src.get_pixel(x, y));
            }
        }
    }
}

pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use image::Rgb;

    use super::*;

    #[test]
    fn test_gray_of_neutral_pixel_keeps_level() {
        let image = RgbImage::from_pixel(4, 4, Rgb([100, 100, 100]));
        assert_eq!(mean_luminance(&image), 100.0);
    }

    #[test]
    fn test_channel_means() {
        let mut image = RgbImage::from_pixel(2, 1, Rgb([100, 0, 50]));
        image.put_pixel(1, 0, Rgb([200, 10, 150]));
        assert_eq!(channel_means(&image), [150.0, 5.0, 100.0]);
    }

    #[test]
    fn test_clamp_channel_saturates() {
        assert_eq!(clamp_channel(300.0), 255);
        assert_eq!(clamp_channel(-40.0), 0);
        assert_eq!(clamp_channel(127.5), 128);
        assert_eq!(clamp_channel(f64::NAN), 0);
    }

    #[test]
    fn test_supported_extensions_ignore_case() {
        assert!(has_supported_extension(Path::new("a/Photo.JPG")));
        assert!(has_supported_extension(Path::new("b.jpeg")));
        assert!(has_supported_extension(Path::new("c.Gif")));
        assert!(!has_supported_extension(Path::new("notes.txt")));
        assert!(!has_supported_extension(Path::new("processed")));
    }
}

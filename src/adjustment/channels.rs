use image::RgbImage;

use crate::image_utils::clamp_channel;

/// Tint added to red and green at 100% bronze: a tenth of the channel range.
pub const BRONZE_FULL_SCALE: f64 = 255.0 * 0.1;

pub fn apply_brightness(image: &RgbImage, multiplier: f64) -> RgbImage {
    let mut adjusted = image.clone();
    brightness_in_place(&mut adjusted, multiplier);
    adjusted
}

pub fn apply_temperature(image: &RgbImage, offset: f64) -> RgbImage {
    let mut adjusted = image.clone();
    temperature_in_place(&mut adjusted, offset);
    adjusted
}

pub fn apply_bronze(image: &RgbImage, percentage: f64) -> RgbImage {
    let mut adjusted = image.clone();
    bronze_in_place(&mut adjusted, percentage);
    adjusted
}

pub(crate) fn brightness_in_place(buffer: &mut RgbImage, multiplier: f64) {
    if multiplier == 1.0 {
        return;
    }
    for pixel in buffer.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = clamp_channel(*channel as f64 * multiplier);
        }
    }
}

pub(crate) fn temperature_in_place(buffer: &mut RgbImage, offset: f64) {
    if offset == 0.0 {
        return;
    }
    for pixel in buffer.pixels_mut() {
        pixel[0] = clamp_channel(pixel[0] as f64 + offset);
        pixel[2] = clamp_channel(pixel[2] as f64 - offset);
    }
}

pub(crate) fn bronze_in_place(buffer: &mut RgbImage, percentage: f64) {
    let tint = percentage / 100.0 * BRONZE_FULL_SCALE;
    if tint == 0.0 {
        return;
    }
    for pixel in buffer.pixels_mut() {
        pixel[0] = clamp_channel(pixel[0] as f64 + tint);
        pixel[1] = clamp_channel(pixel[1] as f64 + tint);
    }
}

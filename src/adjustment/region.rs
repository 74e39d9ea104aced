use image::{RgbImage, imageops};
use serde::Serialize;

use crate::{
    adjustment::Adjustment,
    error::{Result, ToneError},
    image_utils::copy_image_to,
};

/// Pixel rectangle with exclusive `right`/`bottom` edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Region {
    /// Builds a region that is non-empty and lies fully inside a
    /// `width` x `height` image.
    pub fn try_new(left: i64, top: i64, right: i64, bottom: i64, width: u32, height: u32) -> Result<Self> {
        let fits = 0 <= left
            && 0 <= top
            && left < right
            && top < bottom
            && right <= width as i64
            && bottom <= height as i64;

        if !fits {
            return Err(ToneError::InvalidRegion {
                left,
                top,
                right,
                bottom,
                width,
                height,
            });
        }

        Ok(Self {
            left: left as u32,
            top: top as u32,
            right: right as u32,
            bottom: bottom as u32,
        })
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    fn check_within(&self, image: &RgbImage) -> Result<()> {
        let (width, height) = image.dimensions();
        Self::try_new(
            self.left as i64,
            self.top as i64,
            self.right as i64,
            self.bottom as i64,
            width,
            height,
        )
        .map(|_| ())
    }
}

/// Adjusts the pixels inside `region` on a copy of `image`; everything
/// outside the rectangle is copied through unchanged.
pub fn apply_region(image: &RgbImage, region: &Region, adjustment: &Adjustment) -> Result<RgbImage> {
    region.check_within(image)?;

    let mut patch = imageops::crop_imm(image, region.left, region.top, region.width(), region.height()).to_image();
    adjustment.apply_in_place(&mut patch);

    let mut composed = image.clone();
    copy_image_to(&mut composed, &patch, region.left, region.top);

    Ok(composed)
}

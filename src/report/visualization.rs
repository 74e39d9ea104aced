use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{Rgb, RgbImage};
use log::{debug, warn};
use rusttype::{Font, Scale, point};
use serde::{Deserialize, Serialize};

use crate::{
    adjustment::Adjustment,
    error::Result,
    image_utils::copy_image_to,
    report::font,
};

const SYSTEM_FONT_DIRS: [&str; 6] = [
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/TTF",
    "/Library/Fonts",
    "/System/Library/Fonts/Supplemental",
    "C:\\Windows\\Fonts",
];

const SYSTEM_FONT_FILES: [&str; 4] = [
    "DejaVuSans.ttf",
    "LiberationSans-Regular.ttf",
    "Arial.ttf",
    "arial.ttf",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// TrueType font for labels. When unset, common system fonts are tried
    /// before falling back to the built-in bitmap font.
    pub font_path: Option<PathBuf>,
    pub search_system_fonts: bool,
    pub font_size: f32,
    pub text_color: [u8; 3],
    pub margin: u32,
    /// Vertical position of the adjustment annotation.
    pub annotation_y: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_path: None,
            search_system_fonts: true,
            font_size: 40.0,
            text_color: [255, 255, 255],
            margin: 10,
            annotation_y: 60,
        }
    }
}

/// Side-by-side comparison image and where it will be written.
#[derive(Debug, Clone)]
pub struct ComparisonArtifact {
    pub image: RgbImage,
    pub path: PathBuf,
}

impl ComparisonArtifact {
    pub fn save(&self) -> Result<()> {
        self.image.save(&self.path)?;
        Ok(())
    }
}

enum LabelFont {
    TrueType(Font<'static>),
    Bitmap,
}

pub struct ComparisonRenderer {
    config: RenderConfig,
    font: LabelFont,
}

impl ComparisonRenderer {
    pub fn new(config: RenderConfig) -> Self {
        let font = match Self::load_font(&config) {
            Some(font) => LabelFont::TrueType(font),
            None => {
                debug!("No TrueType font available, using bitmap labels");
                LabelFont::Bitmap
            }
        };

        Self { config, font }
    }

    /// Renderer that never touches the file system for fonts.
    pub fn with_bitmap_font(config: RenderConfig) -> Self {
        Self {
            config,
            font: LabelFont::Bitmap,
        }
    }

    pub fn uses_truetype(&self) -> bool {
        matches!(self.font, LabelFont::TrueType(_))
    }

    fn load_font(config: &RenderConfig) -> Option<Font<'static>> {
        if let Some(ref path) = config.font_path {
            match Self::read_font(path) {
                Some(font) => return Some(font),
                None => warn!("Could not load font {}, falling back", path.display()),
            }
        }

        if !config.search_system_fonts {
            return None;
        }

        SYSTEM_FONT_DIRS
            .iter()
            .flat_map(|dir| SYSTEM_FONT_FILES.iter().map(move |file| Path::new(dir).join(file)))
            .filter(|path| path.exists())
            .find_map(|path| Self::read_font(&path))
    }

    fn read_font(path: &Path) -> Option<Font<'static>> {
        let data = fs::read(path).ok()?;
        let font = Font::try_from_vec(data)?;
        debug!("Loaded label font from {}", path.display());
        Some(font)
    }

    /// Original on the left, processed on the right, on a black canvas as
    /// wide as both and as tall as the taller one. Labels and the
    /// annotation are drawn onto the canvas only.
    pub fn render(
        &self,
        original: &RgbImage,
        processed: &RgbImage,
        body: &Adjustment,
        face: &Adjustment,
    ) -> RgbImage {
        let width = original.width() + processed.width();
        let height = original.height().max(processed.height());
        let mut canvas = RgbImage::new(width, height);

        copy_image_to(&mut canvas, original, 0, 0);
        copy_image_to(&mut canvas, processed, original.width(), 0);

        let margin = self.config.margin;
        let right_x = original.width() + margin;

        self.draw_text(&mut canvas, margin, margin, "Original");
        self.draw_text(&mut canvas, right_x, margin, "Processed");

        let line_height = self.line_height();
        for (i, line) in annotation_lines(body, face).iter().enumerate() {
            let y = self.config.annotation_y + i as u32 * line_height;
            self.draw_text(&mut canvas, right_x, y, line);
        }

        canvas
    }

    pub fn render_artifact(
        &self,
        original: &RgbImage,
        processed: &RgbImage,
        body: &Adjustment,
        face: &Adjustment,
        path: PathBuf,
    ) -> ComparisonArtifact {
        ComparisonArtifact {
            image: self.render(original, processed, body, face),
            path,
        }
    }

    fn color(&self) -> Rgb<u8> {
        Rgb(self.config.text_color)
    }

    fn bitmap_scale(&self) -> u32 {
        ((self.config.font_size / (font::GLYPH_HEIGHT + 1) as f32).round() as u32).max(1)
    }

    fn line_height(&self) -> u32 {
        match self.font {
            LabelFont::TrueType(ref ttf) => {
                let v = ttf.v_metrics(Scale::uniform(self.config.font_size));
                (v.ascent - v.descent + v.line_gap).ceil().max(1.0) as u32
            }
            LabelFont::Bitmap => font::line_height(self.bitmap_scale()),
        }
    }

    fn draw_text(&self, canvas: &mut RgbImage, x: u32, y: u32, text: &str) {
        match self.font {
            LabelFont::TrueType(ref ttf) => self.draw_truetype(ttf, canvas, x, y, text),
            LabelFont::Bitmap => font::draw_text(canvas, x, y, text, self.color(), self.bitmap_scale()),
        }
    }

    fn draw_truetype(&self, ttf: &Font<'static>, canvas: &mut RgbImage, x: u32, y: u32, text: &str) {
        let (width, height) = canvas.dimensions();
        let scale = Scale::uniform(self.config.font_size);
        let v_metrics = ttf.v_metrics(scale);
        let start = point(x as f32, y as f32 + v_metrics.ascent);
        let color = self.color();

        for glyph in ttf.layout(text, scale, start) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = bb.min.x + gx as i32;
                let py = bb.min.y + gy as i32;
                if px < 0 || py < 0 || px >= width as i32 || py >= height as i32 {
                    return;
                }

                let alpha = coverage.clamp(0.0, 1.0);
                let base = canvas.get_pixel(px as u32, py as u32);
                let blended = Rgb([
                    ((1.0 - alpha) * base[0] as f32 + alpha * color[0] as f32) as u8,
                    ((1.0 - alpha) * base[1] as f32 + alpha * color[1] as f32) as u8,
                    ((1.0 - alpha) * base[2] as f32 + alpha * color[2] as f32) as u8,
                ]);
                canvas.put_pixel(px as u32, py as u32, blended);
            });
        }
    }
}

impl Default for ComparisonRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

/// Brightness as a percentage, temperature and bronze as raw values, one
/// decimal each.
pub fn annotation_lines(body: &Adjustment, face: &Adjustment) -> [String; 2] {
    [describe("Body", body), describe("Face", face)]
}

fn describe(label: &str, adjustment: &Adjustment) -> String {
    format!(
        "{} - Brightness: {:.1}%, Temp: {:.1}, Bronze: {:.1}%",
        label,
        adjustment.brightness * 100.0,
        adjustment.temperature,
        adjustment.bronze
    )
}

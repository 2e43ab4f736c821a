//! Font loading and multi-line text measurement.
//!
//! Hit-test boxes must match what the user visually sees, so the same
//! measured layout feeds both the paint routine and hit-testing. The
//! font ships embedded; system fonts are a fallback for builds that
//! strip the asset.

use ab_glyph::{Font, FontArc, Glyph, PxScale, ScaleFont, point};

use crate::constants::LINE_HEIGHT_FACTOR;
use crate::error::{MemeError, Result};
use crate::geometry::{Point, Rect};

/// Embedded default font.
const FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// System font paths tried when the embedded font fails to parse.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/Carlito-Regular.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// The deterministic text-metrics source shared by painting and
/// hit-testing.
#[derive(Debug, Clone)]
pub struct FontStore {
    font: FontArc,
}

impl FontStore {
    /// Load the embedded font, falling back to common system fonts.
    ///
    /// Fails with [`MemeError::MeasurementUnavailable`] when no font
    /// can be loaded; without one the engine cannot measure text and
    /// callers should skip caption geometry for the frame.
    pub fn load() -> Result<Self> {
        match FontArc::try_from_slice(FONT_DATA) {
            Ok(font) => return Ok(Self { font }),
            Err(e) => log::warn!("embedded font failed to parse: {e}"),
        }

        for path in SYSTEM_FONTS {
            if let Ok(data) = std::fs::read(path) {
                if let Ok(font) = FontArc::try_from_vec(data) {
                    log::debug!("loaded fallback font from {path}");
                    return Ok(Self { font });
                }
            }
        }

        Err(MemeError::MeasurementUnavailable {
            message: "no usable font found".to_string(),
        })
    }

    /// Use an explicit font (e.g. a user-supplied TTF).
    pub fn from_font_bytes(data: Vec<u8>) -> Result<Self> {
        let font = FontArc::try_from_vec(data).map_err(|e| MemeError::MeasurementUnavailable {
            message: format!("font failed to parse: {e}"),
        })?;
        Ok(Self { font })
    }

    /// Measure multi-line text at the given font size.
    pub fn measure(&self, text: &str, font_size: f32) -> TextLayout {
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        let line_widths: Vec<f32> = lines.iter().map(|line| self.line_width(line, font_size)).collect();
        let max_width = line_widths.iter().copied().fold(0.0, f32::max);

        let line_height = font_size * LINE_HEIGHT_FACTOR;
        let line_count = lines.len();

        TextLayout {
            lines,
            line_widths,
            max_width,
            font_size,
            line_height,
            total_height: line_count as f32 * line_height,
            // Top of the first line's em box to the bottom of the last.
            ink_height: (line_count - 1) as f32 * line_height + font_size,
        }
    }

    /// Kerned advance width of a single line.
    fn line_width(&self, line: &str, font_size: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(font_size));
        let mut width = 0.0;
        let mut prev: Option<ab_glyph::GlyphId> = None;
        for ch in line.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev_id) = prev {
                width += scaled.kern(prev_id, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    /// Position the glyphs of one line so its advance box is centered
    /// horizontally on `center_x` and its em box vertically on
    /// `center_y`. Painting consumes exactly the widths that
    /// [`measure`](Self::measure) reports, so the two never diverge.
    pub(crate) fn layout_line(
        &self,
        line: &str,
        font_size: f32,
        center_x: f32,
        center_y: f32,
    ) -> Vec<Glyph> {
        let scale = PxScale::from(font_size);
        let scaled = self.font.as_scaled(scale);

        // Center the ascent..descent band on center_y.
        let baseline = center_y + (scaled.ascent() + scaled.descent()) / 2.0;
        let mut pen_x = center_x - self.line_width(line, font_size) / 2.0;

        let mut glyphs = Vec::with_capacity(line.len());
        let mut prev: Option<ab_glyph::GlyphId> = None;
        for ch in line.chars() {
            let id = self.font.glyph_id(ch);
            if let Some(prev_id) = prev {
                pen_x += scaled.kern(prev_id, id);
            }
            glyphs.push(id.with_scale_and_position(scale, point(pen_x, baseline)));
            pen_x += scaled.h_advance(id);
            prev = Some(id);
        }
        glyphs
    }

    pub(crate) fn font(&self) -> &FontArc {
        &self.font
    }
}

/// Measured multi-line text metrics for one annotation.
#[derive(Debug, Clone)]
pub struct TextLayout {
    /// The caption split on newlines.
    pub lines: Vec<String>,
    /// Measured advance width of each line.
    pub line_widths: Vec<f32>,
    /// Widest line's width.
    pub max_width: f32,
    /// Font size the measurement was taken at.
    pub font_size: f32,
    /// `font_size * 1.4`.
    pub line_height: f32,
    /// `line_count * line_height`.
    pub total_height: f32,
    /// Top of first line to bottom of last:
    /// `(line_count - 1) * line_height + font_size`.
    pub ink_height: f32,
}

impl TextLayout {
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Vertical center of line `index` for a caption centered on
    /// `center_y`: the first line sits at
    /// `center_y - total_height/2 + line_height/2`, each subsequent
    /// line one `line_height` below.
    pub fn line_center_y(&self, center_y: f32, index: usize) -> f32 {
        center_y - self.total_height / 2.0 + self.line_height / 2.0 + index as f32 * self.line_height
    }

    /// The measured text bounds for a caption centered at `center`.
    /// This same rectangle (plus the fixed padding) is the selection
    /// box and the hit-test target.
    pub fn text_rect(&self, center: Point) -> Rect {
        Rect::from_center(center, self.max_width, self.ink_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_font_loads() {
        assert!(FontStore::load().is_ok());
    }

    #[test]
    fn test_multi_line_heights() {
        let fonts = FontStore::load().unwrap();
        let layout = fonts.measure("one\ntwo\nthree", 40.0);

        assert_eq!(layout.line_count(), 3);
        assert!((layout.line_height - 56.0).abs() < f32::EPSILON);
        assert!((layout.total_height - 168.0).abs() < 0.001);
        assert!((layout.ink_height - 152.0).abs() < 0.001);
    }

    #[test]
    fn test_widest_line_wins() {
        let fonts = FontStore::load().unwrap();
        let layout = fonts.measure("i\nWWWW", 40.0);
        assert_eq!(layout.max_width, layout.line_widths[1]);
        assert!(layout.line_widths[1] > layout.line_widths[0]);
    }

    #[test]
    fn test_line_centers_step_by_line_height() {
        let fonts = FontStore::load().unwrap();
        let layout = fonts.measure("a\nb", 40.0);

        let first = layout.line_center_y(100.0, 0);
        let second = layout.line_center_y(100.0, 1);
        assert!((second - first - layout.line_height).abs() < 0.001);
        // The two lines are symmetric around the caption center.
        assert!((first + second - 200.0).abs() < 0.001);
    }

    #[test]
    fn test_text_rect_centered_on_annotation() {
        let fonts = FontStore::load().unwrap();
        let layout = fonts.measure("HELLO", 40.0);
        let rect = layout.text_rect(Point::new(250.0, 125.0));

        let center = rect.center();
        assert!((center.x - 250.0).abs() < 0.01);
        assert!((center.y - 125.0).abs() < 0.01);
        assert!((rect.width - layout.max_width).abs() < 0.001);
        assert!((rect.height - 40.0).abs() < 0.001);
    }

    #[test]
    fn test_layout_matches_measurement() {
        let fonts = FontStore::load().unwrap();
        let layout = fonts.measure("CENTERED", 40.0);
        let glyphs = fonts.layout_line("CENTERED", 40.0, 200.0, 100.0);

        // First glyph's pen position starts half the measured width
        // left of center.
        let start = glyphs.first().unwrap().position.x;
        assert!((start - (200.0 - layout.max_width / 2.0)).abs() < 0.001);
    }

    #[test]
    fn test_empty_text_is_single_zero_width_line() {
        let fonts = FontStore::load().unwrap();
        let layout = fonts.measure("", 40.0);
        assert_eq!(layout.line_count(), 1);
        assert_eq!(layout.max_width, 0.0);
    }
}

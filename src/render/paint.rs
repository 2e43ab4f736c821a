//! The caption paint routine, hit-testing, and export.
//!
//! Painting and hit-testing share one measurement path through
//! [`FontStore`], which keeps the selection box, the hit-test target,
//! and the painted pixels in agreement at every scale.

use ab_glyph::{Font, Glyph};
use image::{Rgba, RgbaImage, imageops};

use crate::annotation::{MemeStore, TextAnnotation};
use crate::color;
use crate::constants::{
    SELECTION_COLOR, SELECTION_DASH, SELECTION_PADDING, SELECTION_STROKE_WIDTH, STROKE_COLOR,
    STROKE_WIDTH,
};
use crate::error::{MemeError, Result};
use crate::geometry::{Point, Rect};
use crate::render::Surface;
use crate::source::ImageHandle;
use crate::text::FontStore;

/// The render/hit-test engine.
///
/// Holds the font store and nothing else; all state comes in through
/// the arguments, so one painter can serve any number of stores and
/// surfaces.
#[derive(Debug, Clone)]
pub struct Painter {
    fonts: FontStore,
}

impl Painter {
    /// Create a painter with the default font.
    pub fn new() -> Result<Self> {
        Ok(Self {
            fonts: FontStore::load()?,
        })
    }

    /// Create a painter over an explicit font store.
    pub fn with_fonts(fonts: FontStore) -> Self {
        Self { fonts }
    }

    pub fn fonts(&self) -> &FontStore {
        &self.fonts
    }

    /// Paint the store's image and annotations onto a display surface,
    /// including the dashed selection box for the selected annotation.
    ///
    /// A store without an image just clears the surface.
    pub fn paint(&self, store: &MemeStore, surface: &mut Surface) {
        let Some(image) = store.image() else {
            surface.clear();
            return;
        };
        self.paint_scaled(
            image,
            store.annotations(),
            store.selected(),
            surface,
            1.0,
            1.0,
        );
    }

    /// Produce the full-resolution export surface: the paint routine
    /// re-run at the image's natural dimensions, with every
    /// annotation's position, font size, and stroke width scaled by
    /// `natural / display`. The selection box is never exported.
    pub fn export(
        &self,
        store: &MemeStore,
        display_width: u32,
        display_height: u32,
    ) -> Result<Surface> {
        let image = store.image().ok_or_else(|| MemeError::ImageLoad {
            message: "no image loaded".to_string(),
        })?;

        let natural_w = image.natural_width();
        let natural_h = image.natural_height();
        let scale_x = natural_w as f32 / display_width.max(1) as f32;
        let scale_y = natural_h as f32 / display_height.max(1) as f32;

        let mut surface = Surface::new(natural_w, natural_h);
        self.paint_scaled(image, store.annotations(), None, &mut surface, scale_x, scale_y);
        log::debug!(
            "exported {natural_w}x{natural_h} raster (scale {scale_x:.2}x{scale_y:.2})"
        );
        Ok(surface)
    }

    /// Export and encode to PNG bytes.
    pub fn export_png(
        &self,
        store: &MemeStore,
        display_width: u32,
        display_height: u32,
    ) -> Result<Vec<u8>> {
        let surface = self.export(store, display_width, display_height)?;
        let mut data = Vec::new();
        surface
            .pixels()
            .write_to(&mut std::io::Cursor::new(&mut data), image::ImageFormat::Png)?;
        Ok(data)
    }

    /// Which annotation, if any, occupies `point`?
    ///
    /// Iterates from most- to least-recently added so the topmost
    /// painted annotation wins on overlap. The box tested is exactly
    /// the selection-box geometry.
    pub fn hit_test(&self, point: Point, annotations: &[TextAnnotation]) -> Option<usize> {
        for (index, annotation) in annotations.iter().enumerate().rev() {
            if self.caption_bounds(annotation).contains(point) {
                return Some(index);
            }
        }
        None
    }

    /// The selection/hit-test rectangle for an annotation: the
    /// measured text bounds padded on every side.
    pub fn caption_bounds(&self, annotation: &TextAnnotation) -> Rect {
        self.fonts
            .measure(&annotation.text, annotation.font_size)
            .text_rect(Point::new(annotation.x, annotation.y))
            .expanded(SELECTION_PADDING)
    }

    /// The measured (unpadded) text rectangle, used by drag clamping.
    pub(crate) fn text_rect(&self, annotation: &TextAnnotation) -> Rect {
        self.fonts
            .measure(&annotation.text, annotation.font_size)
            .text_rect(Point::new(annotation.x, annotation.y))
    }

    fn paint_scaled(
        &self,
        image: &ImageHandle,
        annotations: &[TextAnnotation],
        selected: Option<usize>,
        surface: &mut Surface,
        scale_x: f32,
        scale_y: f32,
    ) {
        surface.clear();
        draw_image_stretched(image, surface);

        for (index, annotation) in annotations.iter().enumerate() {
            let scaled = TextAnnotation {
                text: annotation.text.clone(),
                x: annotation.x * scale_x,
                y: annotation.y * scale_y,
                font_size: annotation.font_size * scale_x,
                color: annotation.color.clone(),
            };
            self.draw_caption(surface, &scaled, STROKE_WIDTH * scale_x);

            if selected == Some(index) {
                let rect = self
                    .fonts
                    .measure(&scaled.text, scaled.font_size)
                    .text_rect(Point::new(scaled.x, scaled.y))
                    .expanded(SELECTION_PADDING);
                draw_dashed_rect(surface, rect, Rgba(SELECTION_COLOR));
            }
        }
    }

    /// Stroke-then-fill one caption: every line is outlined in black
    /// before being filled with the annotation color, so overlapping
    /// lines never show outline over fill.
    fn draw_caption(&self, surface: &mut Surface, annotation: &TextAnnotation, stroke_width: f32) {
        let layout = self.fonts.measure(&annotation.text, annotation.font_size);
        let fill = color::fill_color(&annotation.color);

        for (index, line) in layout.lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let center_y = layout.line_center_y(annotation.y, index);
            let glyphs =
                self.fonts
                    .layout_line(line, annotation.font_size, annotation.x, center_y);

            let Some(mask) = CoverageMask::rasterize(self.fonts.font(), &glyphs) else {
                continue;
            };

            let outline = mask.dilated(stroke_width / 2.0);
            outline.blend_onto(surface.pixels_mut(), Rgba(STROKE_COLOR));
            mask.blend_onto(surface.pixels_mut(), fill);
        }
    }
}

/// Draw the image stretched to exactly fill the surface. This is the
/// single scaling transform between image space and surface space; it
/// need not be uniform.
fn draw_image_stretched(image: &ImageHandle, surface: &mut Surface) {
    let (w, h) = (surface.width(), surface.height());
    if image.natural_width() == w && image.natural_height() == h {
        *surface.pixels_mut() = image.image().clone();
        return;
    }
    *surface.pixels_mut() = imageops::resize(image.image(), w, h, imageops::FilterType::Triangle);
}

/// Anti-aliased glyph coverage for one line of text, anchored at an
/// absolute surface position.
struct CoverageMask {
    origin_x: i32,
    origin_y: i32,
    width: u32,
    height: u32,
    coverage: Vec<f32>,
}

impl CoverageMask {
    /// Rasterize positioned glyphs into a single coverage buffer.
    /// Returns `None` when nothing has ink (e.g. all spaces).
    fn rasterize(font: &ab_glyph::FontArc, glyphs: &[Glyph]) -> Option<Self> {
        let outlined: Vec<_> = glyphs
            .iter()
            .filter_map(|g| font.outline_glyph(g.clone()))
            .collect();
        if outlined.is_empty() {
            return None;
        }

        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for o in &outlined {
            let b = o.px_bounds();
            min_x = min_x.min(b.min.x);
            min_y = min_y.min(b.min.y);
            max_x = max_x.max(b.max.x);
            max_y = max_y.max(b.max.y);
        }

        let origin_x = min_x.floor() as i32;
        let origin_y = min_y.floor() as i32;
        let width = (max_x.ceil() as i32 - origin_x).max(1) as u32;
        let height = (max_y.ceil() as i32 - origin_y).max(1) as u32;
        let mut coverage = vec![0.0f32; (width * height) as usize];

        for o in &outlined {
            let bounds = o.px_bounds();
            o.draw(|px, py, cov| {
                let x = bounds.min.x as i32 + px as i32 - origin_x;
                let y = bounds.min.y as i32 + py as i32 - origin_y;
                if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                    let cell = &mut coverage[(y as u32 * width + x as u32) as usize];
                    *cell = cell.max(cov.clamp(0.0, 1.0));
                }
            });
        }

        Some(Self {
            origin_x,
            origin_y,
            width,
            height,
            coverage,
        })
    }

    fn get(&self, x: i32, y: i32) -> f32 {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return 0.0;
        }
        self.coverage[(y as u32 * self.width + x as u32) as usize]
    }

    /// Dilate the coverage by `radius` pixels by compositing every
    /// offset inside the disk, producing the stroke band around (and
    /// under) the ink.
    fn dilated(&self, radius: f32) -> Self {
        let pad = radius.ceil() as i32 + 1;
        let width = self.width + 2 * pad as u32;
        let height = self.height + 2 * pad as u32;
        let mut out = Self {
            origin_x: self.origin_x - pad,
            origin_y: self.origin_y - pad,
            width,
            height,
            coverage: vec![0.0; (width * height) as usize],
        };

        let limit = radius * radius + 0.5;
        for dy in -pad..=pad {
            for dx in -pad..=pad {
                if (dx * dx + dy * dy) as f32 > limit {
                    continue;
                }
                for y in 0..height as i32 {
                    for x in 0..width as i32 {
                        let c = self.get(x - pad - dx, y - pad - dy);
                        if c > 0.0 {
                            let cell = &mut out.coverage[(y as u32 * width + x as u32) as usize];
                            *cell = cell.max(c);
                        }
                    }
                }
            }
        }
        out
    }

    /// Source-over blend the mask onto the target, tinted `color`.
    fn blend_onto(&self, target: &mut RgbaImage, color: Rgba<u8>) {
        let color_alpha = color.0[3] as f32 / 255.0;
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let cov = self.get(x, y);
                if cov <= 0.0 {
                    continue;
                }
                let tx = self.origin_x + x;
                let ty = self.origin_y + y;
                if tx < 0 || ty < 0 || tx as u32 >= target.width() || ty as u32 >= target.height() {
                    continue;
                }
                blend_pixel(target, tx as u32, ty as u32, color, cov * color_alpha);
            }
        }
    }
}

fn blend_pixel(target: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>, alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    let dst = target.get_pixel_mut(x, y);
    for channel in 0..3 {
        let src = color.0[channel] as f32;
        let old = dst.0[channel] as f32;
        dst.0[channel] = (src * alpha + old * (1.0 - alpha)).round() as u8;
    }
    let old_a = dst.0[3] as f32 / 255.0;
    dst.0[3] = ((alpha + old_a * (1.0 - alpha)) * 255.0).round() as u8;
}

/// Draw a dashed rectangle outline (5 px on / 5 px off, 2 px stroke).
fn draw_dashed_rect(surface: &mut Surface, rect: Rect, color: Rgba<u8>) {
    let x0 = rect.x.round() as i32;
    let y0 = rect.y.round() as i32;
    let x1 = (rect.x + rect.width).round() as i32;
    let y1 = (rect.y + rect.height).round() as i32;
    let thickness = SELECTION_STROKE_WIDTH as i32;

    for t in 0..thickness {
        draw_dashed_hline(surface, x0, x1, y0 + t, color);
        draw_dashed_hline(surface, x0, x1, y1 - t, color);
        draw_dashed_vline(surface, y0, y1, x0 + t, color);
        draw_dashed_vline(surface, y0, y1, x1 - t, color);
    }
}

fn draw_dashed_hline(surface: &mut Surface, x0: i32, x1: i32, y: i32, color: Rgba<u8>) {
    let dash = SELECTION_DASH as i32;
    for x in x0..=x1 {
        if ((x - x0) / dash) % 2 == 0 {
            put_pixel(surface, x, y, color);
        }
    }
}

fn draw_dashed_vline(surface: &mut Surface, y0: i32, y1: i32, x: i32, color: Rgba<u8>) {
    let dash = SELECTION_DASH as i32;
    for y in y0..=y1 {
        if ((y - y0) / dash) % 2 == 0 {
            put_pixel(surface, x, y, color);
        }
    }
}

fn put_pixel(surface: &mut Surface, x: i32, y: i32, color: Rgba<u8>) {
    let pixels = surface.pixels_mut();
    if x >= 0 && y >= 0 && (x as u32) < pixels.width() && (y as u32) < pixels.height() {
        pixels.put_pixel(x as u32, y as u32, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::MemeStore;
    use crate::constants::SELECTION_PADDING;

    fn black_image_store(width: u32, height: u32) -> MemeStore {
        let mut store = MemeStore::new();
        store.set_image(ImageHandle::from_image(RgbaImage::from_pixel(
            width,
            height,
            Rgba([0, 0, 0, 255]),
        )));
        store
    }

    /// Bounding box of pixels that differ from solid black.
    fn ink_bbox(pixels: &RgbaImage) -> Option<Rect> {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        let mut found = false;
        for (x, y, p) in pixels.enumerate_pixels() {
            if p.0[0] > 16 || p.0[1] > 16 || p.0[2] > 16 {
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);
                found = true;
            }
        }
        found.then(|| {
            Rect::new(
                min_x as f32,
                min_y as f32,
                (max_x - min_x + 1) as f32,
                (max_y - min_y + 1) as f32,
            )
        })
    }

    fn has_color(pixels: &RgbaImage, color: [u8; 4]) -> bool {
        pixels.pixels().any(|p| p.0 == color)
    }

    #[test]
    fn test_hit_test_empty_list_is_none() {
        let painter = Painter::new().unwrap();
        assert_eq!(painter.hit_test(Point::new(10.0, 10.0), &[]), None);
    }

    #[test]
    fn test_hit_test_center_point_hits() {
        let painter = Painter::new().unwrap();
        let annotations = vec![
            TextAnnotation::new(250.0, 125.0, 40.0, "#ffffff").with_text("HELLO"),
            TextAnnotation::new(600.0, 300.0, 24.0, "#ffffff").with_text("a\nmulti\nline"),
        ];
        assert_eq!(
            painter.hit_test(Point::new(250.0, 125.0), &annotations),
            Some(0)
        );
        assert_eq!(
            painter.hit_test(Point::new(600.0, 300.0), &annotations),
            Some(1)
        );
    }

    #[test]
    fn test_hit_test_overlap_prefers_later_annotation() {
        let painter = Painter::new().unwrap();
        let annotations = vec![
            TextAnnotation::new(100.0, 100.0, 40.0, "#ffffff"),
            TextAnnotation::new(100.0, 100.0, 40.0, "#ff0000"),
        ];
        assert_eq!(
            painter.hit_test(Point::new(100.0, 100.0), &annotations),
            Some(1)
        );
    }

    #[test]
    fn test_hit_test_outside_bounds_is_none() {
        let painter = Painter::new().unwrap();
        let annotations = vec![TextAnnotation::new(100.0, 100.0, 40.0, "").with_text("HI")];
        assert_eq!(painter.hit_test(Point::new(400.0, 400.0), &annotations), None);
    }

    #[test]
    fn test_paint_without_image_clears_surface() {
        let painter = Painter::new().unwrap();
        let store = MemeStore::new();
        let mut surface = Surface::new(10, 10);
        surface.pixels_mut().put_pixel(3, 3, Rgba([9, 9, 9, 255]));

        painter.paint(&store, &mut surface);
        assert!(surface.pixels().pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn test_paint_puts_ink_near_annotation_center() {
        let painter = Painter::new().unwrap();
        let mut store = black_image_store(400, 200);
        store.add_text(200.0, 100.0, 40.0, "#ffffff");
        store.update_text(0, crate::annotation::TextPatch::new().text("MEME")).unwrap();
        store.select(None).unwrap();

        let mut surface = Surface::new(400, 200);
        painter.paint(&store, &mut surface);

        let ink = ink_bbox(surface.pixels()).expect("caption ink");
        let center = ink.center();
        assert!((center.x - 200.0).abs() < 8.0, "ink center x {}", center.x);
        assert!((center.y - 100.0).abs() < 8.0, "ink center y {}", center.y);
    }

    #[test]
    fn test_paint_and_hit_geometry_agree() {
        let painter = Painter::new().unwrap();
        let mut store = black_image_store(400, 200);
        store.add_text(200.0, 100.0, 40.0, "#ffffff");
        store.update_text(0, crate::annotation::TextPatch::new().text("MEME")).unwrap();
        store.select(None).unwrap();

        let mut surface = Surface::new(400, 200);
        painter.paint(&store, &mut surface);

        let ink = ink_bbox(surface.pixels()).expect("caption ink");
        // Painted ink (including the 6 px stroke) stays inside the
        // hit-test box expanded by the stroke radius.
        let hit = painter
            .caption_bounds(&store.annotations()[0])
            .expanded(STROKE_WIDTH / 2.0 + 1.0);
        assert!(ink.x >= hit.x && ink.y >= hit.y);
        assert!(ink.x + ink.width <= hit.x + hit.width);
        assert!(ink.y + ink.height <= hit.y + hit.height);
    }

    #[test]
    fn test_selection_box_painted_on_display_only() {
        let painter = Painter::new().unwrap();
        let mut store = black_image_store(400, 200);
        store.add_text(200.0, 100.0, 40.0, "#ffffff");

        let mut surface = Surface::new(400, 200);
        painter.paint(&store, &mut surface);
        assert!(has_color(surface.pixels(), SELECTION_COLOR));

        let export = painter.export(&store, 400, 200).unwrap();
        assert!(!has_color(export.pixels(), SELECTION_COLOR));
    }

    #[test]
    fn test_export_uses_natural_dimensions_and_scales() {
        let painter = Painter::new().unwrap();
        let mut store = black_image_store(1000, 500);
        // Display surface is 500x250, scale factor 2 on both axes.
        store.add_text(250.0, 125.0, 40.0, "#ffffff");
        store.update_text(0, crate::annotation::TextPatch::new().text("MEME")).unwrap();
        store.select(None).unwrap();

        let mut display = Surface::new(500, 250);
        painter.paint(&store, &mut display);
        let display_ink = ink_bbox(display.pixels()).expect("display ink");

        let export = painter.export(&store, 500, 250).unwrap();
        assert_eq!(export.width(), 1000);
        assert_eq!(export.height(), 500);

        let export_ink = ink_bbox(export.pixels()).expect("export ink");
        let center = export_ink.center();
        assert!((center.x - 500.0).abs() < 12.0, "export center x {}", center.x);
        assert!((center.y - 250.0).abs() < 12.0, "export center y {}", center.y);

        // Font size and stroke width scale with the surface, so the
        // ink box roughly doubles.
        let ratio = export_ink.width / display_ink.width;
        assert!((1.8..=2.2).contains(&ratio), "width ratio {ratio}");
    }

    #[test]
    fn test_export_without_image_fails() {
        let painter = Painter::new().unwrap();
        let store = MemeStore::new();
        assert!(painter.export(&store, 100, 100).is_err());
    }

    #[test]
    fn test_export_png_encodes() {
        let painter = Painter::new().unwrap();
        let mut store = black_image_store(64, 64);
        store.add_text(32.0, 32.0, 16.0, "#ffffff");
        store.select(None).unwrap();

        let png = painter.export_png(&store, 64, 64).unwrap();
        assert!(png.starts_with(&[0x89, 0x50, 0x4E, 0x47]));
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 64);
    }

    #[test]
    fn test_caption_bounds_padding() {
        let painter = Painter::new().unwrap();
        let annotation = TextAnnotation::new(100.0, 100.0, 40.0, "").with_text("HI");
        let text = painter.text_rect(&annotation);
        let bounds = painter.caption_bounds(&annotation);
        assert!((bounds.width - text.width - SELECTION_PADDING * 2.0).abs() < 0.001);
        assert!((bounds.height - text.height - SELECTION_PADDING * 2.0).abs() < 0.001);
    }
}

//! Pixel-addressable drawing surfaces and display sizing.

use image::RgbaImage;

use crate::constants::MIN_SURFACE_EDGE;

/// An owned RGBA drawing target.
///
/// On-screen and export rendering use the same type; the only
/// difference is the pixel dimensions it is created with.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// Create a transparent surface of the given pixel dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width.max(1), height.max(1)),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Borrow the rendered pixels.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Take ownership of the rendered pixels.
    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    /// Reset every pixel to transparent.
    pub(crate) fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = image::Rgba([0, 0, 0, 0]);
        }
    }
}

/// Compute the largest display size that fits the available rectangle
/// while preserving the image's aspect ratio.
///
/// Either edge is raised to the 200 px minimum with the other edge
/// re-derived from the aspect ratio, so extreme aspect ratios and
/// narrow viewports still leave usable editing space.
pub fn fit_display(
    natural_width: u32,
    natural_height: u32,
    avail_width: f32,
    avail_height: f32,
) -> (u32, u32) {
    let aspect = natural_width as f32 / natural_height.max(1) as f32;
    let avail_aspect = avail_width / avail_height.max(1.0);

    let (mut width, mut height) = if aspect > avail_aspect {
        // Image is wider than the viewport: fit to width.
        (avail_width, avail_width / aspect)
    } else {
        // Image is taller: fit to height.
        (avail_height * aspect, avail_height)
    };

    if width < MIN_SURFACE_EDGE {
        width = MIN_SURFACE_EDGE;
        height = width / aspect;
    }
    if height < MIN_SURFACE_EDGE {
        height = MIN_SURFACE_EDGE;
        width = height * aspect;
    }

    (width.round().max(1.0) as u32, height.round().max(1.0) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_wide_image_to_width() {
        let (w, h) = fit_display(2000, 1000, 800.0, 600.0);
        assert_eq!((w, h), (800, 400));
    }

    #[test]
    fn test_fit_tall_image_to_height() {
        let (w, h) = fit_display(500, 1000, 800.0, 600.0);
        assert_eq!((w, h), (300, 600));
    }

    #[test]
    fn test_minimum_edge_enforced() {
        // A very wide strip would otherwise collapse to a sliver.
        let (w, h) = fit_display(4000, 200, 800.0, 600.0);
        assert_eq!(h, 200);
        assert_eq!(w, 4000);

        // A narrow viewport cannot shrink the surface below 200.
        let (w, h) = fit_display(1000, 1000, 120.0, 600.0);
        assert!(w >= 200);
        assert!(h >= 200);
    }

    #[test]
    fn test_aspect_preserved() {
        let (w, h) = fit_display(1000, 500, 700.0, 700.0);
        assert!((w as f32 / h as f32 - 2.0).abs() < 0.01);
    }

    #[test]
    fn test_surface_dimensions() {
        let surface = Surface::new(500, 250);
        assert_eq!(surface.width(), 500);
        assert_eq!(surface.height(), 250);
    }
}

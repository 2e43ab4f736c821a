//! Rendering: surface sizing, the caption paint routine, hit-testing,
//! and full-resolution export.

mod paint;
mod surface;

pub use paint::Painter;
pub use surface::{Surface, fit_display};

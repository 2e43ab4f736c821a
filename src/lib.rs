//! memely - meme caption compositing engine
//!
//! A headless engine for composing memes: it owns a decoded raster
//! image plus an ordered list of positioned text annotations, paints
//! them with the classic stroke-then-fill meme style, answers pointer
//! hit-tests, supports drag relocation, and re-renders a
//! full-resolution export that matches what was composed on screen.
//!
//! Persistence, authentication, and UI chrome live outside this crate;
//! the boundary is plain data (an image source string plus an
//! annotation list, see [`persist::SavedMeme`]).
//!
//! ```no_run
//! use memely::{MemeStore, Painter, Surface, fit_display};
//!
//! # fn main() -> memely::Result<()> {
//! let mut store = MemeStore::new();
//! store.load_image("templates/distracted.jpg")?;
//!
//! let image = store.image().unwrap();
//! let (w, h) = fit_display(image.natural_width(), image.natural_height(), 1280.0, 720.0);
//! store.add_text(w as f32 / 2.0, 60.0, 48.0, "#ffffff");
//!
//! let painter = Painter::new()?;
//! let mut surface = Surface::new(w, h);
//! painter.paint(&store, &mut surface);
//! let png = painter.export_png(&store, w, h)?;
//! # let _ = png;
//! # Ok(())
//! # }
//! ```

pub mod annotation;
pub mod color;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod input;
pub mod persist;
pub mod render;
pub mod source;
pub mod text;

pub use annotation::{MemeStore, TextAnnotation, TextPatch};
pub use error::{MemeError, Result};
pub use geometry::{Point, Rect};
pub use input::{PointerInput, PointerOutcome, SurfaceRect};
pub use persist::SavedMeme;
pub use render::{Painter, Surface, fit_display};
pub use source::ImageHandle;
pub use text::{FontStore, TextLayout};

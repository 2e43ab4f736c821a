//! Annotation data model and the editor store.
//!
//! This module provides the core types for meme captions:
//! - [`TextAnnotation`], a positioned, styled piece of text
//! - [`TextPatch`], a partial update applied to one annotation
//! - [`MemeStore`], the single source of truth the renderer consumes

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TEXT;
use crate::error::{MemeError, Result};
use crate::source::ImageHandle;

// ============================================================================
// Text Annotation
// ============================================================================

/// A single positioned, styled piece of text overlaid on the image.
///
/// `(x, y)` is the annotation's center point in display-surface
/// coordinates for the lifetime of an editing session. Natural-image
/// coordinates appear only at the export and persistence boundaries,
/// where the conversion is explicit (see [`crate::render`] and
/// [`crate::persist`]). `text` may contain literal newlines; each line
/// is independently centered on `x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TextAnnotation {
    /// The caption text (may contain `\n`).
    pub text: String,
    /// Center X in surface pixels.
    pub x: f32,
    /// Center Y in surface pixels.
    pub y: f32,
    /// Font size in surface pixels (positive).
    pub font_size: f32,
    /// CSS hex fill color; empty string means the default white.
    pub color: String,
}

impl TextAnnotation {
    /// Create an annotation with the placeholder text.
    pub fn new(x: f32, y: f32, font_size: f32, color: impl Into<String>) -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            x,
            y,
            font_size,
            color: color.into(),
        }
    }

    /// Replace the placeholder text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// A partial update merged into an existing annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct TextPatch {
    pub text: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub font_size: Option<f32>,
    pub color: Option<String>,
}

impl TextPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn font_size(mut self, font_size: f32) -> Self {
        self.font_size = Some(font_size);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Merge the set fields into `target`.
    fn apply(self, target: &mut TextAnnotation) {
        if let Some(text) = self.text {
            target.text = text;
        }
        if let Some(x) = self.x {
            target.x = x;
        }
        if let Some(y) = self.y {
            target.y = y;
        }
        if let Some(font_size) = self.font_size {
            target.font_size = font_size;
        }
        if let Some(color) = self.color {
            target.color = color;
        }
    }
}

// ============================================================================
// Meme Store
// ============================================================================

/// The annotation store: one decoded image, an ordered caption list,
/// and at most one selected index.
///
/// List order is insertion order, which is also paint order (earlier
/// entries render behind later ones) and reverse hit-test priority.
/// The selection invariant holds across every mutation: it is always
/// `None` or a valid in-bounds index, never dangling.
#[derive(Debug, Clone, Default)]
pub struct MemeStore {
    image: Option<ImageHandle>,
    annotations: Vec<TextAnnotation>,
    selected: Option<usize>,
}

impl MemeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the image, clearing all annotations and the selection
    /// atomically. Annotations are always defined relative to exactly
    /// one image generation; stale captions must never render against
    /// a new image.
    pub fn set_image(&mut self, image: ImageHandle) {
        log::debug!(
            "image replaced ({}x{}), clearing {} annotation(s)",
            image.natural_width(),
            image.natural_height(),
            self.annotations.len()
        );
        self.image = Some(image);
        self.annotations.clear();
        self.selected = None;
    }

    /// Decode an image from a source string and commit it.
    ///
    /// Decoding happens before the replacement commits, so a failed
    /// load leaves the current image and annotations untouched.
    pub fn load_image(&mut self, source: &str) -> Result<()> {
        let image = crate::source::load(source)?;
        self.set_image(image);
        Ok(())
    }

    /// The current image, if one has been loaded.
    pub fn image(&self) -> Option<&ImageHandle> {
        self.image.as_ref()
    }

    /// All annotations in paint order.
    pub fn annotations(&self) -> &[TextAnnotation] {
        &self.annotations
    }

    /// The selected index, if any.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// The selected annotation, if any.
    pub fn selected_annotation(&self) -> Option<&TextAnnotation> {
        self.selected.and_then(|i| self.annotations.get(i))
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Append a new annotation with the placeholder text at the given
    /// surface position and select it.
    pub fn add_text(
        &mut self,
        x: f32,
        y: f32,
        font_size: f32,
        color: impl Into<String>,
    ) -> &TextAnnotation {
        self.annotations
            .push(TextAnnotation::new(x, y, font_size, color));
        self.selected = Some(self.annotations.len() - 1);
        log::debug!(
            "added annotation #{} at ({x:.0}, {y:.0})",
            self.annotations.len() - 1
        );
        &self.annotations[self.annotations.len() - 1]
    }

    /// Merge a patch into the annotation at `index`.
    pub fn update_text(&mut self, index: usize, patch: TextPatch) -> Result<()> {
        let len = self.annotations.len();
        let annotation = self
            .annotations
            .get_mut(index)
            .ok_or(MemeError::IndexOutOfRange { index, len })?;
        patch.apply(annotation);
        Ok(())
    }

    /// Remove the annotation at `index` and repair the selection:
    /// afterwards the last annotation is selected, or nothing if the
    /// list became empty.
    pub fn delete_text(&mut self, index: usize) -> Result<TextAnnotation> {
        let len = self.annotations.len();
        if index >= len {
            return Err(MemeError::IndexOutOfRange { index, len });
        }
        let removed = self.annotations.remove(index);
        self.selected = self.annotations.len().checked_sub(1);
        log::debug!("deleted annotation #{index}, selection now {:?}", self.selected);
        Ok(removed)
    }

    /// Remove the currently selected annotation, if any. Bound to the
    /// Delete/Backspace keys by the input adapter.
    pub fn delete_selected(&mut self) -> Option<TextAnnotation> {
        let index = self.selected?;
        self.delete_text(index).ok()
    }

    /// Set the selection directly. Out-of-range indices are rejected
    /// so the selection invariant cannot break.
    pub fn select(&mut self, index: Option<usize>) -> Result<()> {
        if let Some(i) = index {
            if i >= self.annotations.len() {
                return Err(MemeError::IndexOutOfRange {
                    index: i,
                    len: self.annotations.len(),
                });
            }
        }
        self.selected = index;
        Ok(())
    }

    /// Replace the whole annotation list (used when restoring a saved
    /// meme). The selection is cleared.
    pub fn replace_annotations(&mut self, annotations: Vec<TextAnnotation>) {
        self.annotations = annotations;
        self.selected = None;
    }
}

// ============================================================================
// Tests
// ============================================================================

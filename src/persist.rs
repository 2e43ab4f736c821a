//! Persistence boundary for composed memes.
//!
//! The external persistence collaborator accepts an image URL, an
//! annotation list, a title, and a public/private flag. Annotations
//! cross this boundary normalized to natural-image space so a saved
//! meme renders identically at any display size; they are converted
//! back to surface space on restore. The schema is strict: unknown
//! fields and out-of-domain values are rejected here rather than
//! trusted implicitly.

use serde::{Deserialize, Serialize};

use crate::annotation::{MemeStore, TextAnnotation};
use crate::color;
use crate::error::{MemeError, Result};

/// A composed meme in its persisted form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SavedMeme {
    pub title: String,
    pub image_url: String,
    pub is_public: bool,
    /// Annotations in natural-image space.
    pub text_boxes: Vec<TextAnnotation>,
}

impl SavedMeme {
    /// Capture the store's current annotations, scaling them from the
    /// display surface into natural-image space.
    pub fn capture(
        store: &MemeStore,
        display_width: u32,
        display_height: u32,
        title: impl Into<String>,
        image_url: impl Into<String>,
        is_public: bool,
    ) -> Result<Self> {
        let image = store.image().ok_or_else(|| MemeError::ImageLoad {
            message: "no image loaded".to_string(),
        })?;

        let scale_x = image.natural_width() as f32 / display_width.max(1) as f32;
        let scale_y = image.natural_height() as f32 / display_height.max(1) as f32;

        let text_boxes = store
            .annotations()
            .iter()
            .map(|a| TextAnnotation {
                text: a.text.clone(),
                x: a.x * scale_x,
                y: a.y * scale_y,
                font_size: a.font_size * scale_x,
                color: a.color.clone(),
            })
            .collect();

        Ok(Self {
            title: title.into(),
            image_url: image_url.into(),
            is_public,
            text_boxes,
        })
    }

    /// Map the saved annotations back into a display surface of the
    /// given size.
    pub fn display_annotations(
        &self,
        natural_width: u32,
        natural_height: u32,
        display_width: u32,
        display_height: u32,
    ) -> Vec<TextAnnotation> {
        let scale_x = display_width as f32 / natural_width.max(1) as f32;
        let scale_y = display_height as f32 / natural_height.max(1) as f32;

        self.text_boxes
            .iter()
            .map(|a| TextAnnotation {
                text: a.text.clone(),
                x: a.x * scale_x,
                y: a.y * scale_y,
                font_size: a.font_size * scale_x,
                color: a.color.clone(),
            })
            .collect()
    }

    /// Load the saved annotations into a store that already holds the
    /// meme's image, converting them to the given display size.
    pub fn restore_into(
        &self,
        store: &mut MemeStore,
        display_width: u32,
        display_height: u32,
    ) -> Result<()> {
        let image = store.image().ok_or_else(|| MemeError::ImageLoad {
            message: "no image loaded".to_string(),
        })?;
        let annotations = self.display_annotations(
            image.natural_width(),
            image.natural_height(),
            display_width,
            display_height,
        );
        store.replace_annotations(annotations);
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate a persisted meme.
    pub fn from_json(json: &str) -> Result<Self> {
        let meme: Self = serde_json::from_str(json)?;
        meme.validate()?;
        Ok(meme)
    }

    /// Boundary validation: every annotation must have finite
    /// coordinates, a positive font size, and an empty or parseable
    /// color.
    pub fn validate(&self) -> Result<()> {
        for (index, a) in self.text_boxes.iter().enumerate() {
            if !(a.x.is_finite() && a.y.is_finite()) {
                return Err(MemeError::InvalidData {
                    message: format!("annotation {index} has non-finite coordinates"),
                });
            }
            if !a.font_size.is_finite() || a.font_size <= 0.0 {
                return Err(MemeError::InvalidData {
                    message: format!("annotation {index} has invalid font size {}", a.font_size),
                });
            }
            if !a.color.is_empty() {
                color::parse_hex(&a.color)?;
            }
        }
        Ok(())
    }
}

//! Previously uploaded images, newest first.
//!
//! Images are stored as PNG after being downscaled to fit the configured
//! longest edge. The host persists the whole gallery through serde and hands
//! it back at startup.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::{decode_image_no_orientation, resize_to_fit, DecodeError, FilterType};
use crate::encode::{encode_png, EncodeError};
use crate::PixelBuffer;

const DEFAULT_MAX_EDGE: u32 = 2048;

fn default_max_edge() -> u32 {
    DEFAULT_MAX_EDGE
}

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("No gallery entry with id {0}")]
    NotFound(u64),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub id: u64,
    pub width: u32,
    pub height: u32,
    /// PNG bytes.
    pub image: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gallery {
    entries: VecDeque<GalleryEntry>,
    next_id: u64,
    #[serde(default = "default_max_edge")]
    max_edge: u32,
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EDGE)
    }
}

impl Gallery {
    pub fn new(max_edge: u32) -> Self {
        Self {
            entries: VecDeque::new(),
            next_id: 1,
            max_edge: max_edge.max(1),
        }
    }

    /// Rebuild a gallery from stored entries (newest first).
    pub fn from_entries(entries: Vec<GalleryEntry>, max_edge: u32) -> Self {
        let next_id = entries.iter().map(|e| e.id).max().map_or(1, |id| id + 1);
        Self {
            entries: entries.into(),
            next_id,
            max_edge: max_edge.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_edge(&self) -> u32 {
        self.max_edge
    }

    /// Store an image at the front and return its id.
    pub fn insert(&mut self, image: &PixelBuffer) -> Result<u64, GalleryError> {
        let fitted = resize_to_fit(image, self.max_edge, FilterType::Lanczos3)?;
        let png = encode_png(&fitted)?;

        let id = self.next_id;
        self.next_id += 1;
        self.entries.push_front(GalleryEntry {
            id,
            width: fitted.width(),
            height: fitted.height(),
            image: png,
        });

        log::debug!("Gallery: stored image {} ({}x{})", id, fitted.width(), fitted.height());
        Ok(id)
    }

    /// Delete an entry. Returns false if no entry had that id.
    pub fn remove(&mut self, id: u64) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: u64) -> Option<&GalleryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Decode an entry's pixels.
    pub fn load(&self, id: u64) -> Result<PixelBuffer, GalleryError> {
        let entry = self.get(id).ok_or(GalleryError::NotFound(id))?;
        Ok(decode_image_no_orientation(&entry.image)?)
    }

    /// Entries newest first.
    pub fn iter(&self) -> impl Iterator<Item = &GalleryEntry> {
        self.entries.iter()
    }
}

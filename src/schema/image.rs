//! Bitmap data consumed from the collaborator boundary.
//!
//! The engine never decodes images or rasterizes fonts itself. The external
//! preprocessor delivers the target image as a grid of grayscale blocks, and
//! the external glyph renderer delivers one bitmap per alphabet character.
//! Both are validated once at construction and stay immutable for a run.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A grayscale bitmap with row-major `u8` luminance samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bitmap {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Row-major luminance data, exactly `width * height` samples.
    pub data: Vec<u8>,
}

impl Bitmap {
    /// Create a bitmap, checking that the data length matches the dimensions.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ImageError> {
        if data.len() != width * height {
            return Err(ImageError::DataLength {
                expected: width * height,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create a bitmap filled with a single luminance value.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Pixel dimensions as `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Mean luminance over all samples, 0.0 for an empty bitmap.
    pub fn mean_luminance(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|&v| v as f64).sum::<f64>() / self.data.len() as f64
    }
}

/// Rendered glyph bitmaps for an alphabet, all sharing one block size.
///
/// Built once from the glyph renderer's output and read-only afterwards, so
/// parallel fitness evaluation can share it without locking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlyphCache {
    /// Block width shared by every glyph.
    pub block_width: usize,
    /// Block height shared by every glyph.
    pub block_height: usize,
    glyphs: HashMap<char, Bitmap>,
}

impl GlyphCache {
    /// Build a cache from rendered glyphs, rejecting any bitmap that does not
    /// match the block size.
    pub fn new(
        block_width: usize,
        block_height: usize,
        glyphs: impl IntoIterator<Item = (char, Bitmap)>,
    ) -> Result<Self, ImageError> {
        let mut map = HashMap::new();
        for (ch, bitmap) in glyphs {
            if bitmap.dimensions() != (block_width, block_height) {
                return Err(ImageError::GlyphBlockMismatch {
                    glyph: ch,
                    expected: (block_width, block_height),
                    actual: bitmap.dimensions(),
                });
            }
            map.insert(ch, bitmap);
        }
        Ok(Self {
            block_width,
            block_height,
            glyphs: map,
        })
    }

    /// Look up the rendered bitmap for a character.
    pub fn get(&self, ch: char) -> Option<&Bitmap> {
        self.glyphs.get(&ch)
    }

    /// Whether a character has a rendered glyph.
    pub fn contains(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch)
    }

    /// Number of cached glyphs.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether the cache holds no glyphs.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Block dimensions as `(width, height)`.
    pub fn block_size(&self) -> (usize, usize) {
        (self.block_width, self.block_height)
    }

    /// Iterate over cached characters and their bitmaps.
    pub fn iter(&self) -> impl Iterator<Item = (char, &Bitmap)> {
        self.glyphs.iter().map(|(&ch, bitmap)| (ch, bitmap))
    }
}

/// The target image, pre-cut into a `width x height` grid of blocks.
///
/// The preprocessor crops the source image so the grid is exact; every block
/// has the grid's block dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetGrid {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Block width in pixels.
    pub block_width: usize,
    /// Block height in pixels.
    pub block_height: usize,
    blocks: Vec<Bitmap>,
}

impl TargetGrid {
    /// Assemble a target grid, checking the block count and every block's
    /// dimensions.
    pub fn new(
        width: usize,
        height: usize,
        block_width: usize,
        block_height: usize,
        blocks: Vec<Bitmap>,
    ) -> Result<Self, ImageError> {
        if blocks.len() != width * height {
            return Err(ImageError::BlockCount {
                expected: width * height,
                actual: blocks.len(),
            });
        }
        for (i, block) in blocks.iter().enumerate() {
            if block.dimensions() != (block_width, block_height) {
                return Err(ImageError::TargetBlockMismatch {
                    index: i,
                    expected: (block_width, block_height),
                    actual: block.dimensions(),
                });
            }
        }
        Ok(Self {
            width,
            height,
            block_width,
            block_height,
            blocks,
        })
    }

    /// The block at cell `(x, y)`.
    pub fn block(&self, x: usize, y: usize) -> &Bitmap {
        &self.blocks[y * self.width + x]
    }

    /// Grid dimensions in cells as `(width, height)`.
    pub fn grid_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Block dimensions in pixels as `(width, height)`.
    pub fn block_size(&self) -> (usize, usize) {
        (self.block_width, self.block_height)
    }

    /// Number of cells in the grid.
    pub fn cell_count(&self) -> usize {
        self.blocks.len()
    }
}

/// Errors constructing bitmap data at the collaborator boundary.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Bitmap data length {actual} does not match dimensions ({expected} expected)")]
    DataLength { expected: usize, actual: usize },
    #[error("Glyph {glyph:?} is {actual:?} but the block size is {expected:?}")]
    GlyphBlockMismatch {
        glyph: char,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    #[error("Target grid has {actual} blocks, expected {expected}")]
    BlockCount { expected: usize, actual: usize },
    #[error("Target block {index} is {actual:?} but the block size is {expected:?}")]
    TargetBlockMismatch {
        index: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

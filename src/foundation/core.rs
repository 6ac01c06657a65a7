use crate::foundation::error::{FastBitmapError, FastBitmapResult};

/// One 32-bit packed pixel. Byte order in memory is the source's channel order.
pub type Pixel = u32;

/// Bytes occupied by one [`Pixel`].
pub const BYTES_PER_PIXEL: usize = 4;

/// Pack four channel bytes into a [`Pixel`] whose in-memory bytes are `bytes`.
#[inline]
pub const fn pack_pixel(bytes: [u8; 4]) -> Pixel {
    u32::from_ne_bytes(bytes)
}

/// Inverse of [`pack_pixel`].
#[inline]
pub const fn unpack_pixel(px: Pixel) -> [u8; 4] {
    px.to_ne_bytes()
}

/// Pixel dimensions plus the byte distance between consecutive scanlines.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
    pub stride: usize, // bytes, >= width * 4
}

impl Geometry {
    /// Tightly packed rows: `stride == width * 4`.
    pub fn packed(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            stride: width * BYTES_PER_PIXEL,
        }
    }

    pub fn pixel_count(self) -> usize {
        self.width.saturating_mul(self.height)
    }

    /// Stride expressed in whole pixels.
    pub fn stride_pixels(self) -> usize {
        self.stride / BYTES_PER_PIXEL
    }

    /// Bytes between the first pixel of row 0 and the end of the last pixel of the last row.
    pub fn span_bytes(self) -> Option<usize> {
        if self.width == 0 || self.height == 0 {
            return Some(0);
        }
        let row_bytes = self.width.checked_mul(BYTES_PER_PIXEL)?;
        (self.height - 1)
            .checked_mul(self.stride)?
            .checked_add(row_bytes)
    }

    pub fn validate(self) -> FastBitmapResult<()> {
        if !self.stride.is_multiple_of(BYTES_PER_PIXEL) {
            return Err(FastBitmapError::validation(format!(
                "stride {} is not a multiple of {BYTES_PER_PIXEL}",
                self.stride
            )));
        }
        let row_bytes = self
            .width
            .checked_mul(BYTES_PER_PIXEL)
            .ok_or_else(|| FastBitmapError::validation("row byte length overflows usize"))?;
        if self.stride < row_bytes {
            return Err(FastBitmapError::validation(format!(
                "stride {} is shorter than a {}-pixel row",
                self.stride, self.width
            )));
        }
        self.span_bytes()
            .ok_or_else(|| FastBitmapError::validation("bitmap byte span overflows usize"))?;
        Ok(())
    }

    pub fn contains(self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Whether the `size`-sided square with top-left corner `(x, y)` lies inside.
    pub fn contains_square(self, x: usize, y: usize, size: usize) -> bool {
        matches!(x.checked_add(size), Some(r) if r <= self.width)
            && matches!(y.checked_add(size), Some(b) if b <= self.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

//! The boundary to whatever image object owns the pixels.
//!
//! A [`FastBitmap`](crate::FastBitmap) never reads an image directly. On lock it asks the
//! source to fill a direct memory region, and on unlock it hands the region back.

use std::ops::DerefMut;

use image::{ImageBuffer, Rgba};

use crate::foundation::core::{Pixel, pack_pixel, unpack_pixel};
use crate::foundation::error::{FastBitmapError, FastBitmapResult};

/// An image that can copy its 32bpp pixels into, and back out of, a caller-owned region.
///
/// Both copies operate on exactly `width * height` tightly packed pixels in row-major order.
pub trait PixelSource {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Fill `dst` with the current pixel contents.
    fn copy_pixels_to_buffer(&self, dst: &mut [Pixel]) -> FastBitmapResult<()>;

    /// Overwrite the pixel contents with `src`.
    fn copy_pixels_from_buffer(&mut self, src: &[Pixel]) -> FastBitmapResult<()>;
}

/// Length check shared by [`PixelSource`] implementations.
pub fn expect_pixel_len(source: &dyn PixelSource, len: usize) -> FastBitmapResult<()> {
    let expected = (source.width() as usize)
        .checked_mul(source.height() as usize)
        .ok_or_else(|| FastBitmapError::validation("bitmap pixel count overflows usize"))?;
    if len != expected {
        return Err(FastBitmapError::validation(format!(
            "pixel buffer holds {len} pixels, bitmap is {}x{} ({expected})",
            source.width(),
            source.height()
        )));
    }
    Ok(())
}

/// RGBA8 images map each pixel's four bytes, in order, onto one native-endian [`Pixel`].
impl<C> PixelSource for ImageBuffer<Rgba<u8>, C>
where
    C: DerefMut<Target = [u8]>,
{
    fn width(&self) -> u32 {
        ImageBuffer::width(self)
    }

    fn height(&self) -> u32 {
        ImageBuffer::height(self)
    }

    fn copy_pixels_to_buffer(&self, dst: &mut [Pixel]) -> FastBitmapResult<()> {
        expect_pixel_len(self, dst.len())?;
        for (d, px) in dst.iter_mut().zip(self.pixels()) {
            *d = pack_pixel(px.0);
        }
        Ok(())
    }

    fn copy_pixels_from_buffer(&mut self, src: &[Pixel]) -> FastBitmapResult<()> {
        expect_pixel_len(&*self, src.len())?;
        for (px, &s) in self.pixels_mut().zip(src) {
            px.0 = unpack_pixel(s);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/source.rs"]
mod tests;

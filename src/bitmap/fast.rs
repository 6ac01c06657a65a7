//! Locked, scanline-level access to 32bpp pixels.
//!
//! A [`FastBitmap`] is either bound to a [`PixelSource`] (pixels are copied into a direct
//! memory region on [`lock_bits`](FastBitmap::lock_bits) and written back on
//! [`unlock_bits`](FastBitmap::unlock_bits)) or wraps caller-owned memory described by raw
//! geometry. Scanlines are reachable through an unchecked pointer path ([`row_ptr`]) and a
//! checked slice path ([`row`], [`row_mut`], [`pixel`], [`set_pixel`]).
//!
//! [`row_ptr`]: FastBitmap::row_ptr
//! [`row`]: FastBitmap::row
//! [`row_mut`]: FastBitmap::row_mut
//! [`pixel`]: FastBitmap::pixel
//! [`set_pixel`]: FastBitmap::set_pixel

use std::fmt;
use std::marker::PhantomData;
use std::ptr;
use std::slice;

use crate::bitmap::source::PixelSource;
use crate::foundation::core::{BYTES_PER_PIXEL, Geometry, Pixel};
use crate::foundation::error::{FastBitmapError, FastBitmapResult};

/// Wrapper around a 32bpp bitmap that allows direct pixel manipulation.
///
/// Release is guaranteed: dropping the value unlocks it, and unlocking twice is a no-op.
/// The type holds raw pointers and is neither `Send` nor `Sync`.
pub struct FastBitmap<'a> {
    bitmap: Option<&'a mut dyn PixelSource>,
    // Present exactly while locked.
    data: Option<Vec<Pixel>>,
    scan0: *mut u8,
    stride: usize,
    width: usize,
    height: usize,
    _memory: PhantomData<&'a mut [Pixel]>,
}

impl<'a> FastBitmap<'a> {
    /// Wrap `bitmap`, optionally locking its pixels immediately.
    ///
    /// Fails with [`FastBitmapError::InvalidState`] when `lock_bits` is set and `bitmap` is
    /// `None`.
    pub fn new(
        bitmap: Option<&'a mut dyn PixelSource>,
        lock_bits: bool,
    ) -> FastBitmapResult<Self> {
        let mut fast = Self::unbound();
        fast.bitmap = bitmap;
        if lock_bits {
            fast.lock_bits()?;
        }
        Ok(fast)
    }

    /// A buffer with neither a bitmap nor memory. Every scanline accessor returns `None`.
    pub fn unbound() -> Self {
        Self {
            bitmap: None,
            data: None,
            scan0: ptr::null_mut(),
            stride: 0,
            width: 0,
            height: 0,
            _memory: PhantomData,
        }
    }

    /// View caller-owned memory without any validation.
    ///
    /// # Safety
    ///
    /// For the whole lifetime `'a`, `scan0` must point to `height` rows spaced `stride` bytes
    /// apart, each holding at least `width` readable and writable [`Pixel`]s, with every row
    /// start aligned for `u32`. Nothing else may access that memory while the view is in use.
    pub unsafe fn from_raw_parts(
        width: usize,
        height: usize,
        stride: usize,
        scan0: *mut u8,
    ) -> Self {
        Self {
            bitmap: None,
            data: None,
            scan0,
            stride,
            width,
            height,
            _memory: PhantomData,
        }
    }

    /// View a mutable pixel slice laid out with `stride` bytes per row.
    pub fn from_slice(
        pixels: &'a mut [Pixel],
        width: usize,
        height: usize,
        stride: usize,
    ) -> FastBitmapResult<Self> {
        let geometry = Geometry {
            width,
            height,
            stride,
        };
        geometry.validate()?;
        let span = geometry.span_bytes().unwrap_or(usize::MAX);
        let available = pixels.len().saturating_mul(BYTES_PER_PIXEL);
        if span > available {
            return Err(FastBitmapError::validation(format!(
                "{width}x{height} bitmap with stride {stride} needs {span} bytes, slice has {available}"
            )));
        }
        // SAFETY: the slice is exclusively borrowed for 'a, is u32-aligned, and covers the
        // validated span; stride is a multiple of 4 so every row start stays aligned.
        Ok(unsafe { Self::from_raw_parts(width, height, stride, pixels.as_mut_ptr().cast()) })
    }

    /// Copy the bitmap's pixels into a direct memory region and expose it.
    ///
    /// Locking an already locked buffer does nothing.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn lock_bits(&mut self) -> FastBitmapResult<()> {
        let Some(bitmap) = self.bitmap.as_deref_mut() else {
            return Err(FastBitmapError::invalid_state("underlying bitmap is null"));
        };
        if self.data.is_some() {
            return Ok(());
        }

        let width = bitmap.width() as usize;
        let height = bitmap.height() as usize;
        let len = width
            .checked_mul(height)
            .ok_or_else(|| FastBitmapError::validation("bitmap pixel count overflows usize"))?;
        let mut data: Vec<Pixel> = vec![0; len];
        bitmap.copy_pixels_to_buffer(&mut data)?;

        self.scan0 = data.as_mut_ptr().cast();
        self.stride = width * BYTES_PER_PIXEL;
        self.width = width;
        self.height = height;
        self.data = Some(data);
        tracing::debug!(width, height, stride = self.stride, "locked bitmap pixels");
        Ok(())
    }

    /// Write the direct memory region back into the bitmap and release it.
    ///
    /// Does nothing without a bitmap or without an active lock. The region is written back
    /// even if it was only read. If the write-back fails the buffer is still released and
    /// the error is returned.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn unlock_bits(&mut self) -> FastBitmapResult<()> {
        let Some(bitmap) = self.bitmap.as_deref_mut() else {
            return Ok(());
        };
        let Some(data) = self.data.take() else {
            return Ok(());
        };

        self.scan0 = ptr::null_mut();
        self.width = 0;
        self.height = 0;
        self.stride = 0;

        // TODO: skip the write-back for read-only locks once callers can declare one.
        bitmap.copy_pixels_from_buffer(&data)?;
        tracing::debug!(pixels = data.len(), "unlocked bitmap pixels");
        Ok(())
    }

    /// Release the buffer, surfacing any write-back error that `Drop` would only log.
    pub fn dispose(mut self) -> FastBitmapResult<()> {
        self.unlock_bits()
    }

    /// Pointer to the first pixel of scanline `y`: `scan0 + y * stride`.
    ///
    /// Not bounds-checked. The pointer is only valid to dereference for `y < height()` while
    /// the buffer is mapped.
    #[inline]
    pub fn row_ptr(&self, y: usize) -> *mut Pixel {
        self.scan0.wrapping_add(y.wrapping_mul(self.stride)).cast()
    }

    pub fn row(&self, y: usize) -> Option<&[Pixel]> {
        if !self.is_mapped() || y >= self.height {
            return None;
        }
        // SAFETY: a mapped buffer has `height` rows of `width` aligned pixels at `stride`
        // byte intervals, and `&self` rules out a live `row_mut`.
        Some(unsafe { slice::from_raw_parts(self.row_ptr(y), self.width) })
    }

    pub fn row_mut(&mut self, y: usize) -> Option<&mut [Pixel]> {
        if !self.is_mapped() || y >= self.height {
            return None;
        }
        // SAFETY: as in `row`, and `&mut self` makes this the only live view of the row.
        Some(unsafe { slice::from_raw_parts_mut(self.row_ptr(y), self.width) })
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Pixel> {
        self.row(y)?.get(x).copied()
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, value: Pixel) -> FastBitmapResult<()> {
        let (width, height) = (self.width, self.height);
        let slot = self
            .row_mut(y)
            .and_then(|row| row.get_mut(x))
            .ok_or_else(|| {
                FastBitmapError::out_of_bounds(format!(
                    "pixel ({x}, {y}) outside {width}x{height} bitmap"
                ))
            })?;
        *slot = value;
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes between the starts of consecutive scanlines.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Address of the first pixel byte, or null when nothing is mapped.
    pub fn scan0(&self) -> *mut u8 {
        self.scan0
    }

    pub fn geometry(&self) -> Geometry {
        Geometry {
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }

    /// Whether a direct memory region acquired from the bitmap is active.
    pub fn is_locked(&self) -> bool {
        self.data.is_some()
    }

    /// Whether scanlines can be accessed, through a lock or caller-owned memory.
    pub fn is_mapped(&self) -> bool {
        !self.scan0.is_null()
    }

    pub fn has_bitmap(&self) -> bool {
        self.bitmap.is_some()
    }

    /// The bound bitmap. While locked its contents lag behind the direct memory region.
    pub fn bitmap(&self) -> Option<&dyn PixelSource> {
        self.bitmap.as_deref()
    }
}

impl Drop for FastBitmap<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.unlock_bits() {
            tracing::warn!(error = %err, "failed to write locked pixels back to bitmap");
        }
    }
}

impl fmt::Debug for FastBitmap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastBitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("scan0", &self.scan0)
            .field("has_bitmap", &self.has_bitmap())
            .field("is_locked", &self.is_locked())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/fast.rs"]
mod tests;

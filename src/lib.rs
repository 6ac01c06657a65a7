//! fastbitmap gives direct, locked access to the pixels of a 32bpp bitmap.
//!
//! A [`FastBitmap`] wraps either an image implementing [`PixelSource`] or caller-owned
//! memory described by raw geometry. While an image is locked its pixels live in a direct
//! memory region that can be read and written scanline by scanline; unlocking (explicitly,
//! through [`FastBitmap::dispose`], or on drop) writes them back.
//!
//! # Access paths
//!
//! - **Unchecked**: [`FastBitmap::row_ptr`], [`FastBitmap::move_portion`] and
//!   [`FastBitmap::from_raw_parts`] do no bounds checks; the caller upholds every precondition.
//! - **Checked**: [`FastBitmap::row`], [`FastBitmap::row_mut`], [`FastBitmap::pixel`],
//!   [`FastBitmap::set_pixel`], [`FastBitmap::copy_portion`],
//!   [`FastBitmap::copy_portion_within`] and [`FastBitmap::from_slice`] report misuse as
//!   [`FastBitmapError`].
//!
//! ```
//! use fastbitmap::{FastBitmap, pack_pixel};
//! use image::RgbaImage;
//!
//! # fn main() -> fastbitmap::FastBitmapResult<()> {
//! let mut img = RgbaImage::new(4, 4);
//! let mut fast = FastBitmap::new(Some(&mut img), true)?;
//! fast.set_pixel(1, 2, pack_pixel([255, 0, 0, 255]))?;
//! fast.dispose()?;
//! assert_eq!(img.get_pixel(1, 2).0, [255, 0, 0, 255]);
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_op_in_unsafe_fn)]

mod bitmap;
mod foundation;

pub use bitmap::fast::FastBitmap;
pub use bitmap::source::{PixelSource, expect_pixel_len};
pub use foundation::core::{BYTES_PER_PIXEL, Geometry, Pixel, pack_pixel, unpack_pixel};
pub use foundation::error::{FastBitmapError, FastBitmapResult};

use std::cell::Cell;

use image::{Rgba, RgbaImage};

use super::*;
use crate::foundation::core::{pack_pixel, unpack_pixel};

/// Tracks how often the bitmap is copied in each direction.
struct CountingSource {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
    copies_out: Cell<usize>,
    copies_in: usize,
    fail_write_back: bool,
}

impl CountingSource {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: (0..width * height).collect(),
            copies_out: Cell::new(0),
            copies_in: 0,
            fail_write_back: false,
        }
    }
}

impl PixelSource for CountingSource {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn copy_pixels_to_buffer(&self, dst: &mut [Pixel]) -> FastBitmapResult<()> {
        self.copies_out.set(self.copies_out.get() + 1);
        dst.copy_from_slice(&self.pixels);
        Ok(())
    }

    fn copy_pixels_from_buffer(&mut self, src: &[Pixel]) -> FastBitmapResult<()> {
        self.copies_in += 1;
        if self.fail_write_back {
            return Err(anyhow::anyhow!("surface lost").into());
        }
        self.pixels.copy_from_slice(src);
        Ok(())
    }
}

fn checkerboard(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        if (x + y) % 2 == 0 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    })
}

#[test]
fn lock_on_construction_exposes_geometry() {
    let mut img = checkerboard(5, 3);
    let fast = FastBitmap::new(Some(&mut img), true).unwrap();

    assert!(fast.is_locked());
    assert!(fast.is_mapped());
    assert_eq!(fast.width(), 5);
    assert_eq!(fast.height(), 3);
    assert_eq!(fast.stride(), 20);
    assert_eq!(fast.geometry(), Geometry::packed(5, 3));
    assert!(!fast.scan0().is_null());
}

#[test]
fn construct_without_lock_holds_only_the_bitmap() {
    let mut img = checkerboard(2, 2);
    let mut fast = FastBitmap::new(Some(&mut img), false).unwrap();

    assert!(fast.has_bitmap());
    assert!(!fast.is_locked());
    assert!(fast.scan0().is_null());
    assert_eq!(fast.geometry(), Geometry::default());
    assert!(fast.row(0).is_none());

    fast.lock_bits().unwrap();
    assert!(fast.is_locked());
    assert_eq!(fast.bitmap().map(|b| (b.width(), b.height())), Some((2, 2)));
}

#[test]
fn row_ptr_is_scan0_plus_row_times_stride() {
    let mut img = checkerboard(3, 4);
    let fast = FastBitmap::new(Some(&mut img), true).unwrap();

    let base = fast.scan0() as usize;
    for y in 0..fast.height() {
        assert_eq!(fast.row_ptr(y) as usize, base + y * fast.stride());
    }
}

#[test]
fn row_ptr_honors_padded_stride() {
    let mut backing = vec![0u32; 4 * 3];
    let fast = FastBitmap::from_slice(&mut backing, 3, 3, 16).unwrap();

    let base = fast.scan0() as usize;
    assert_eq!(fast.row_ptr(2) as usize, base + 32);
    assert_eq!(fast.row(1).map(<[Pixel]>::len), Some(3));
}

#[test]
fn round_trip_without_changes_keeps_pixels() {
    let original = checkerboard(4, 4);
    let mut img = original.clone();
    {
        let mut fast = FastBitmap::new(Some(&mut img), true).unwrap();
        fast.unlock_bits().unwrap();
    }
    assert_eq!(img, original);
}

#[test]
fn writes_through_row_ptr_reach_the_image() {
    let mut img = checkerboard(4, 4);
    let value = pack_pixel([10, 20, 30, 40]);
    {
        let fast = FastBitmap::new(Some(&mut img), true).unwrap();
        // SAFETY: row 2 and column 3 are inside the locked 4x4 region.
        unsafe { fast.row_ptr(2).add(3).write(value) };
        fast.dispose().unwrap();
    }
    assert_eq!(img.get_pixel(3, 2).0, [10, 20, 30, 40]);
    assert_eq!(img.get_pixel(2, 2).0, [255, 255, 255, 255]);
}

#[test]
fn set_pixel_then_drop_writes_back() {
    let mut img = RgbaImage::new(3, 2);
    {
        let mut fast = FastBitmap::new(Some(&mut img), true).unwrap();
        fast.set_pixel(2, 1, pack_pixel([1, 2, 3, 4])).unwrap();
        assert_eq!(fast.pixel(2, 1).map(unpack_pixel), Some([1, 2, 3, 4]));
    }
    assert_eq!(img.get_pixel(2, 1).0, [1, 2, 3, 4]);
}

#[test]
fn unlock_resets_geometry() {
    let mut img = checkerboard(2, 2);
    let mut fast = FastBitmap::new(Some(&mut img), true).unwrap();
    fast.unlock_bits().unwrap();

    assert!(!fast.is_locked());
    assert!(fast.scan0().is_null());
    assert_eq!((fast.width(), fast.height(), fast.stride()), (0, 0, 0));
    assert!(fast.row(0).is_none());
}

#[test]
fn second_unlock_is_a_noop() {
    let mut src = CountingSource::new(2, 2);
    {
        let mut fast = FastBitmap::new(Some(&mut src), true).unwrap();
        fast.set_pixel(0, 0, 99).unwrap();
        fast.unlock_bits().unwrap();
        fast.unlock_bits().unwrap();
    }
    assert_eq!(src.copies_in, 1);
    assert_eq!(src.pixels[0], 99);
}

#[test]
fn second_lock_does_not_recopy_or_reallocate() {
    let mut src = CountingSource::new(3, 3);
    {
        let mut fast = FastBitmap::new(Some(&mut src), true).unwrap();
        fast.set_pixel(1, 1, 7).unwrap();
        let scan0 = fast.scan0();
        let geometry = fast.geometry();

        fast.lock_bits().unwrap();

        assert_eq!(fast.scan0(), scan0);
        assert_eq!(fast.geometry(), geometry);
        assert_eq!(fast.pixel(1, 1), Some(7));
    }
    assert_eq!(src.copies_out.get(), 1);
    assert_eq!(src.copies_in, 1);
}

#[test]
fn drop_writes_back_exactly_once() {
    let mut src = CountingSource::new(1, 1);
    {
        let _fast = FastBitmap::new(Some(&mut src), true).unwrap();
    }
    assert_eq!(src.copies_in, 1);

    {
        let fast = FastBitmap::new(Some(&mut src), true).unwrap();
        fast.dispose().unwrap();
    }
    assert_eq!(src.copies_in, 2);
}

#[test]
fn lock_without_bitmap_is_invalid_state() {
    let err = FastBitmap::new(None, true).unwrap_err();
    assert!(matches!(err, FastBitmapError::InvalidState(_)));
    assert!(err.to_string().contains("underlying bitmap is null"));
}

#[test]
fn failed_lock_leaves_fields_untouched() {
    let mut backing = vec![5u32; 4];
    let mut fast = FastBitmap::from_slice(&mut backing, 2, 2, 8).unwrap();
    let before = (fast.scan0(), fast.geometry());

    assert!(matches!(
        fast.lock_bits(),
        Err(FastBitmapError::InvalidState(_))
    ));
    assert_eq!((fast.scan0(), fast.geometry()), before);
    assert!(!fast.is_locked());
}

#[test]
fn unlock_without_bitmap_keeps_caller_memory_mapped() {
    let mut backing = vec![1u32, 2, 3, 4];
    let mut fast = FastBitmap::from_slice(&mut backing, 2, 2, 8).unwrap();
    fast.unlock_bits().unwrap();

    assert!(fast.is_mapped());
    assert_eq!(fast.row(1), Some(&[3u32, 4][..]));
}

#[test]
fn failed_write_back_still_releases() {
    let mut src = CountingSource::new(2, 1);
    src.fail_write_back = true;
    let mut fast = FastBitmap::new(Some(&mut src), true).unwrap();

    let err = fast.unlock_bits().unwrap_err();
    assert!(matches!(err, FastBitmapError::Other(_)));
    assert!(!fast.is_locked());
    assert!(fast.scan0().is_null());

    // Nothing left to flush.
    fast.unlock_bits().unwrap();
    drop(fast);
    assert_eq!(src.copies_in, 1);
}

#[test]
fn raw_parts_view_reads_and_writes_caller_memory() {
    // Two rows of three pixels, padded to four.
    let mut backing = vec![1u32, 2, 3, 0, 4, 5, 6, 0];
    {
        // SAFETY: `backing` outlives the view and holds 2 rows of 16 bytes.
        let mut fast =
            unsafe { FastBitmap::from_raw_parts(3, 2, 16, backing.as_mut_ptr().cast()) };
        assert!(!fast.has_bitmap());
        assert_eq!(fast.row(1), Some(&[4u32, 5, 6][..]));
        fast.row_mut(0).unwrap()[2] = 30;
        fast.dispose().unwrap();
    }
    assert_eq!(backing, vec![1, 2, 30, 0, 4, 5, 6, 0]);
}

#[test]
fn from_slice_rejects_short_slices_and_bad_strides() {
    let mut backing = vec![0u32; 7];
    assert!(matches!(
        FastBitmap::from_slice(&mut backing, 2, 3, 16),
        Err(FastBitmapError::Validation(_))
    ));
    assert!(matches!(
        FastBitmap::from_slice(&mut backing, 2, 2, 6),
        Err(FastBitmapError::Validation(_))
    ));
    assert!(matches!(
        FastBitmap::from_slice(&mut backing, 3, 2, 8),
        Err(FastBitmapError::Validation(_))
    ));
    // The last row needs no trailing padding.
    FastBitmap::from_slice(&mut backing, 3, 2, 16).unwrap();
}

#[test]
fn checked_accessors_reject_out_of_range() {
    let mut img = checkerboard(2, 2);
    let mut fast = FastBitmap::new(Some(&mut img), true).unwrap();

    assert!(fast.row(2).is_none());
    assert!(fast.row_mut(5).is_none());
    assert_eq!(fast.pixel(2, 0), None);
    assert!(matches!(
        fast.set_pixel(0, 2, 1),
        Err(FastBitmapError::OutOfBounds(_))
    ));
}

#[test]
fn unbound_buffer_has_nothing_to_release() {
    let mut fast = FastBitmap::unbound();
    assert!(!fast.has_bitmap());
    assert!(!fast.is_mapped());
    fast.unlock_bits().unwrap();
    assert!(matches!(
        fast.lock_bits(),
        Err(FastBitmapError::InvalidState(_))
    ));
}

#[test]
fn debug_output_names_the_lock_state() {
    let mut img = checkerboard(1, 1);
    let fast = FastBitmap::new(Some(&mut img), true).unwrap();
    let dbg = format!("{fast:?}");
    assert!(dbg.contains("FastBitmap"));
    assert!(dbg.contains("is_locked: true"));
}

use crate::bitmap::fast::FastBitmap;
use crate::foundation::error::{FastBitmapError, FastBitmapResult};

impl FastBitmap<'_> {
    /// Copy the `size × size` square at `(src_x, src_y)` in `src` to `(dst_x, dst_y)` in `dst`.
    ///
    /// Pixels are copied one at a time, row by row, left to right. `src` and `dst` may be the
    /// same buffer; overlapping squares then see earlier writes, exactly as that order implies.
    ///
    /// # Safety
    ///
    /// Both buffers must be mapped, both squares must lie inside their buffers, and no slice
    /// obtained from [`row`](FastBitmap::row) or [`row_mut`](FastBitmap::row_mut) of `dst`
    /// may be alive.
    pub unsafe fn move_portion(
        src_x: usize,
        src_y: usize,
        dst_x: usize,
        dst_y: usize,
        src: &FastBitmap<'_>,
        dst: &FastBitmap<'_>,
        size: usize,
    ) {
        for y in 0..size {
            let src_row = src.row_ptr(src_y + y);
            let dst_row = dst.row_ptr(dst_y + y);
            for x in 0..size {
                // SAFETY: the caller keeps both squares inside mapped memory.
                unsafe {
                    dst_row
                        .add(dst_x + x)
                        .write(src_row.add(src_x + x).read());
                }
            }
        }
    }

    /// Bounds-checked [`move_portion`](FastBitmap::move_portion) between two buffers.
    pub fn copy_portion(
        src_x: usize,
        src_y: usize,
        dst_x: usize,
        dst_y: usize,
        src: &FastBitmap<'_>,
        dst: &mut FastBitmap<'_>,
        size: usize,
    ) -> FastBitmapResult<()> {
        src.check_square("source", src_x, src_y, size)?;
        dst.check_square("destination", dst_x, dst_y, size)?;
        // SAFETY: both squares were checked, and `&mut dst` rules out live row slices.
        unsafe { Self::move_portion(src_x, src_y, dst_x, dst_y, src, dst, size) };
        Ok(())
    }

    /// Bounds-checked copy of one square to another inside this buffer.
    ///
    /// Overlap is not special-cased: the copy runs in plain row-major order.
    pub fn copy_portion_within(
        &mut self,
        src_x: usize,
        src_y: usize,
        dst_x: usize,
        dst_y: usize,
        size: usize,
    ) -> FastBitmapResult<()> {
        self.check_square("source", src_x, src_y, size)?;
        self.check_square("destination", dst_x, dst_y, size)?;
        let this: &FastBitmap<'_> = self;
        // SAFETY: both squares were checked, and `&mut self` rules out live row slices.
        unsafe { Self::move_portion(src_x, src_y, dst_x, dst_y, this, this, size) };
        Ok(())
    }

    fn check_square(&self, role: &str, x: usize, y: usize, size: usize) -> FastBitmapResult<()> {
        if !self.is_mapped() {
            return Err(FastBitmapError::invalid_state(format!(
                "{role} bitmap is not locked or mapped"
            )));
        }
        let geometry = self.geometry();
        if !geometry.contains_square(x, y, size) {
            return Err(FastBitmapError::out_of_bounds(format!(
                "{role} square {size}x{size} at ({x}, {y}) exceeds {}x{} bitmap",
                geometry.width, geometry.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bitmap/portion.rs"]
mod tests;

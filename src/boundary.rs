// boundary.rs — Edge policy and numeric saturation shared by the kernels.
//
// BORDER HANDLING: Clamp (replicate edge values).
// A read that falls outside the buffer is redirected to the nearest valid
// coordinate on that axis. Never wrapped, never zero-padded:
//
//   extent = 5      -2 -1 | 0 1 2 3 4 | 5 6
//   reads from       0  0 | 0 1 2 3 4 | 4 4

/// Clamp a signed coordinate to `[0, extent - 1]`.
///
/// `extent` must be non-zero; domains guarantee that.
#[inline]
pub fn clamp_coord(x: isize, extent: usize) -> usize {
    debug_assert!(extent > 0);
    x.clamp(0, extent as isize - 1) as usize
}

/// Saturating float → u8 conversion: clamps to `[0, 255]`, then truncates
/// toward zero. 254.9 becomes 254, not 255. NaN becomes 0.
#[inline]
pub fn saturate_u8(v: f32) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

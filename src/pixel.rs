// pixel.rs — Packed 32-bit ARGB pixels.
//
// Layout, most significant byte first:
//
//   bits  31..24  23..16  15..8   7..0
//         alpha   red     green   blue
//
// The bit positions are fixed; every kernel that touches packed pixels goes
// through `unpack`/`pack` so the layout lives in exactly one place.

use crate::buffer::FlatBuffer;

/// Channels of one pixel, in `[a, r, g, b]` order.
pub type Argb = [u8; 4];

#[inline]
pub fn unpack(p: u32) -> Argb {
    [(p >> 24) as u8, (p >> 16) as u8, (p >> 8) as u8, p as u8]
}

#[inline]
pub fn pack([a, r, g, b]: Argb) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Split a packed image into four single-channel planes `[a, r, g, b]`.
pub fn split_channels(img: &FlatBuffer<u32>) -> [FlatBuffer<u8>; 4] {
    let (rows, cols) = (img.rows(), img.cols());
    let mut planes = [
        FlatBuffer::new(rows, cols),
        FlatBuffer::new(rows, cols),
        FlatBuffer::new(rows, cols),
        FlatBuffer::new(rows, cols),
    ];
    for (i, &p) in img.as_slice().iter().enumerate() {
        for (plane, ch) in planes.iter_mut().zip(unpack(p)) {
            plane.as_mut_slice()[i] = ch;
        }
    }
    planes
}

/// Inverse of `split_channels`.
///
/// # Panics
/// Panics if the planes do not all share one shape.
pub fn merge_channels(planes: &[FlatBuffer<u8>; 4]) -> FlatBuffer<u32> {
    let (rows, cols) = (planes[0].rows(), planes[0].cols());
    assert!(
        planes.iter().all(|p| p.rows() == rows && p.cols() == cols),
        "channel planes must share one shape"
    );
    let [a, r, g, b] = planes.each_ref().map(|p| p.as_slice());
    let data = (0..rows * cols).map(|i| pack([a[i], r[i], g[i], b[i]])).collect();
    FlatBuffer::from_vec(rows, cols, data)
}

// grayscale.rs — Channel reduction on packed ARGB pixels.
//
//   gray = (red + green + blue) / 3        (integer division, floor)
//   out  = alpha | gray | gray | gray
//
// A pure per-pixel map with no neighbour reads, so it runs in place as
// readily as out-of-place.

use crate::buffer::FlatBuffer;
use crate::domain::Coord;
use crate::error::Result;
use crate::kernel::{MapKernel, Mapped};
use crate::pixel::{pack, unpack};
use crate::strategy::{Executor, Launch};

#[derive(Debug, Clone, Copy, Default)]
pub struct Grayscale;

/// Grayscale value of one packed pixel, alpha preserved.
#[inline]
pub fn to_gray(p: u32) -> u32 {
    let [a, r, g, b] = unpack(p);
    let gray = ((r as u32 + g as u32 + b as u32) / 3) as u8;
    pack([a, gray, gray, gray])
}

impl MapKernel for Grayscale {
    type Value = u32;

    fn name(&self) -> &str {
        "grayscale"
    }

    #[inline]
    fn map(&self, _at: Coord, value: u32) -> u32 {
        to_gray(value)
    }
}

/// Convert `input` to grayscale into `output`.
pub fn grayscale(
    exec: &Executor,
    launch: impl Into<Launch>,
    input: &FlatBuffer<u32>,
    output: &mut FlatBuffer<u32>,
) -> Result<()> {
    exec.run(&Mapped::new(&Grayscale, input), launch, output.as_mut_slice())
}

/// Convert `image` to grayscale in place.
pub fn grayscale_in_place(exec: &Executor, launch: impl Into<Launch>, image: &mut FlatBuffer<u32>) -> Result<()> {
    exec.run_in_place(&Grayscale, launch, image)
}

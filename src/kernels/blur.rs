// blur.rs — Square stencil convolution over one 8-bit channel.
//
// For each output coordinate (r, c):
//
//   out[r, c] = saturate( Σ  in[clamp(r+dr), clamp(c+dc)] · w[dr, dc] )
//                       dr,dc ∈ [-W/2, W/2]
//
// The window width W is odd so the window has a centre. Weights are an
// arbitrary W×W table in row-major order plus a divisor applied once after
// accumulation. `Filter::uniform` builds the box blur as unit weights over a
// divisor of W², so a constant neighbourhood blurs to exactly its own value.
//
// The result is clamped to [0, 255] and truncated, so a hot neighbourhood
// saturates at 255 instead of wrapping.
//
// Packed ARGB images are blurred one channel at a time (`blur_argb`): red,
// green and blue are three independent tasks under the same strategy, and
// alpha is carried over untouched.

use crate::boundary::{clamp_coord, saturate_u8};
use crate::buffer::FlatBuffer;
use crate::domain::Coord;
use crate::error::{Error, Result};
use crate::kernel::Kernel;
use crate::pixel::{merge_channels, split_channels};
use crate::strategy::{Executor, Launch};

/// Window width of the default box filter.
pub const FILTER_WIDTH: usize = 31;

/// A square convolution window of odd width.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    width: usize,
    weights: Vec<f32>,
    divisor: f32,
}

impl Filter {
    /// A filter with explicit row-major weights.
    ///
    /// Fails with `InvalidFilter` if `width` is even or zero, or if
    /// `weights.len() != width * width`.
    pub fn new(width: usize, weights: Vec<f32>) -> Result<Self> {
        Self::with_divisor(width, weights, 1.0)
    }

    /// A filter whose weighted sum is divided by `divisor` before saturation.
    pub fn with_divisor(width: usize, weights: Vec<f32>, divisor: f32) -> Result<Self> {
        if divisor == 0.0 || !divisor.is_finite() {
            return Err(Error::InvalidFilter(format!("divisor must be finite and non-zero, got {divisor}")));
        }
        if width % 2 == 0 {
            return Err(Error::InvalidFilter(format!("width must be odd, got {width}")));
        }
        if weights.len() != width * width {
            return Err(Error::InvalidFilter(format!(
                "{width}×{width} filter needs {} weights, got {}",
                width * width,
                weights.len()
            )));
        }
        Ok(Filter { width, weights, divisor })
    }

    /// Box filter: every effective weight is `1 / width²`.
    pub fn uniform(width: usize) -> Result<Self> {
        Self::with_divisor(width, vec![1.0; width * width], (width * width) as f32)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    pub fn divisor(&self) -> f32 {
        self.divisor
    }

    /// Weight at window offset `(dr, dc)` after the divisor is applied.
    pub fn effective_weight(&self, dr: isize, dc: isize) -> f32 {
        let half = self.half();
        self.weights[(dr + half) as usize * self.width + (dc + half) as usize] / self.divisor
    }

    #[inline]
    fn half(&self) -> isize {
        (self.width / 2) as isize
    }
}

impl Default for Filter {
    fn default() -> Self {
        let n = FILTER_WIDTH * FILTER_WIDTH;
        Filter { width: FILTER_WIDTH, weights: vec![1.0; n], divisor: n as f32 }
    }
}

/// Stencil kernel over one channel plane.
pub struct BlurKernel<'a> {
    input: &'a FlatBuffer<u8>,
    filter: &'a Filter,
    name: &'a str,
}

impl<'a> BlurKernel<'a> {
    pub fn new(input: &'a FlatBuffer<u8>, filter: &'a Filter) -> Self {
        BlurKernel { input, filter, name: "blur" }
    }

    /// Same kernel, reported under a different task name.
    pub fn named(mut self, name: &'a str) -> Self {
        self.name = name;
        self
    }
}

impl Kernel for BlurKernel<'_> {
    type Output = u8;

    fn name(&self) -> &str {
        self.name
    }

    fn input_shapes(&self) -> Vec<(usize, usize)> {
        vec![(self.input.rows(), self.input.cols())]
    }

    fn eval(&self, at: Coord) -> u8 {
        let (rows, cols) = (self.input.rows(), self.input.cols());
        let half = self.filter.half();
        let width = self.filter.width;
        let weights = &self.filter.weights;
        let (r, c) = (at.row as isize, at.col as isize);

        let mut acc = 0.0f32;
        for dr in -half..=half {
            let ir = clamp_coord(r + dr, rows);
            let src = self.input.row(ir);
            let wrow = &weights[(dr + half) as usize * width..][..width];
            for (dc, &w) in (-half..=half).zip(wrow) {
                let ic = clamp_coord(c + dc, cols);
                acc += src[ic] as f32 * w;
            }
        }
        saturate_u8(acc / self.filter.divisor)
    }
}

/// Blur one channel plane into `output`.
pub fn blur(
    exec: &Executor,
    launch: impl Into<Launch>,
    input: &FlatBuffer<u8>,
    filter: &Filter,
    output: &mut FlatBuffer<u8>,
) -> Result<()> {
    exec.run(&BlurKernel::new(input, filter), launch, output.as_mut_slice())
}

/// Blur the red, green and blue channels of a packed ARGB image.
///
/// Runs three tasks (`blur.red`, `blur.green`, `blur.blue`) under the
/// executor's strategy; alpha is copied through unchanged.
pub fn blur_argb(
    exec: &Executor,
    launch: impl Into<Launch>,
    image: &FlatBuffer<u32>,
    filter: &Filter,
) -> Result<FlatBuffer<u32>> {
    let launch = launch.into();
    let [alpha, red, green, blue] = split_channels(image);

    let channel = |task: &str, src: &FlatBuffer<u8>| -> Result<FlatBuffer<u8>> {
        let mut out = FlatBuffer::new(src.rows(), src.cols());
        exec.run(&BlurKernel::new(src, filter).named(task), launch, out.as_mut_slice())?;
        Ok(out)
    };
    let red = channel("blur.red", &red)?;
    let green = channel("blur.green", &green)?;
    let blue = channel("blur.blue", &blue)?;
    Ok(merge_channels(&[alpha, red, green, blue]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IndexDomain;
    use crate::strategy::Strategy;

    #[test]
    fn test_filter_validation() {
        assert!(matches!(Filter::uniform(4), Err(Error::InvalidFilter(_))));
        assert!(matches!(Filter::uniform(0), Err(Error::InvalidFilter(_))));
        assert!(matches!(Filter::new(3, vec![0.0; 8]), Err(Error::InvalidFilter(_))));
        assert!(matches!(Filter::with_divisor(3, vec![1.0; 9], 0.0), Err(Error::InvalidFilter(_))));
        let f = Filter::uniform(3).unwrap();
        assert_eq!(f.weights().len(), 9);
        assert!((f.effective_weight(-1, 1) - 1.0 / 9.0).abs() < 1e-7);
        assert_eq!(Filter::default(), Filter::uniform(FILTER_WIDTH).unwrap());
    }

    #[test]
    fn test_single_pixel_is_fixed_point() {
        let domain = IndexDomain::new_2d(1, 1).unwrap();
        for strategy in Strategy::ALL {
            let exec = Executor::new(strategy);
            let launch: Launch = if strategy.requires_grid() { domain.grid().into() } else { domain.into() };
            for width in (1..=31).step_by(2) {
                let filter = Filter::uniform(width).unwrap();
                for v in [0u8, 3, 7, 200, 254, 255] {
                    let input = FlatBuffer::from_vec(1, 1, vec![v]);
                    let mut out = FlatBuffer::new(1, 1);
                    blur(&exec, launch, &input, &filter, &mut out).unwrap();
                    assert_eq!(out.get(0, 0), v, "{strategy}, width {width}");
                }
            }
        }
    }

    #[test]
    fn test_constant_image_unchanged() {
        let input = FlatBuffer::from_vec(5, 7, vec![29u8; 35]);
        let filter = Filter::uniform(5).unwrap();
        let k = BlurKernel::new(&input, &filter);
        for r in 0..5 {
            for c in 0..7 {
                assert_eq!(k.eval(Coord::new(r, c)), 29);
            }
        }
    }

    #[test]
    fn test_identity_filter_single_pixel_exact() {
        let input = FlatBuffer::from_vec(1, 1, vec![77u8]);
        for width in [1usize, 3, 7] {
            let mut w = vec![0.0; width * width];
            w[width * width / 2] = 1.0;
            let filter = Filter::new(width, w).unwrap();
            assert_eq!(BlurKernel::new(&input, &filter).eval(Coord::new(0, 0)), 77);
        }
    }

    #[test]
    fn test_saturates_at_255() {
        let input = FlatBuffer::from_vec(2, 2, vec![200u8; 4]);
        let filter = Filter::new(3, vec![1.0; 9]).unwrap();
        let k = BlurKernel::new(&input, &filter);
        for at in [Coord::new(0, 0), Coord::new(1, 1)] {
            assert_eq!(k.eval(at), 255);
        }
    }

    #[test]
    fn test_edge_clamps_not_zero_pads() {
        // Only the left neighbour is weighted. At column 0 it clamps to
        // column 0 itself; zero padding would read 0 instead.
        let input = FlatBuffer::from_vec(1, 2, vec![90u8, 10]);
        let mut w = vec![0.0; 9];
        w[3] = 1.0;
        let filter = Filter::new(3, w).unwrap();
        let k = BlurKernel::new(&input, &filter);
        assert_eq!(k.eval(Coord::new(0, 0)), 90);
        assert_eq!(k.eval(Coord::new(0, 1)), 90);
    }

    #[test]
    fn test_argb_keeps_alpha_and_names_tasks() {
        let image = FlatBuffer::from_fn(4, 4, |r, c| 0x7f_00_00_00 | ((r * 4 + c) as u32 * 10) << 16);
        let domain = image.domain().unwrap();
        let filter = Filter::uniform(3).unwrap();
        let out = blur_argb(&Executor::new(Strategy::Threaded), domain, &image, &filter).unwrap();
        for (_, _, p) in out.elements() {
            assert_eq!(p >> 24, 0x7f);
            assert_eq!(p & 0xffff, 0);
        }

        // The grid strategy reports the first channel task when unpartitioned.
        let err = blur_argb(&Executor::new(Strategy::IndexedGrid), domain, &image, &filter).unwrap_err();
        assert!(matches!(err, Error::PartitionRequired { ref task } if task == "blur.red"));
    }
}

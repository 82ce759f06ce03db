// dft.rs — Naive discrete Fourier transform, one output bin per coordinate.
//
// For bin k of an n-point signal:
//
//   θ(t)   = 2π · t · k / n
//   re[k]  =   Σ  in_re[t]·cos θ + in_im[t]·sin θ
//   im[k]  = - Σ (in_re[t]·sin θ + in_im[t]·cos θ)
//             t
//
// Every work item reads the entire input signal, O(n²) work in total. The
// stencil reads a neighbourhood; this kernel reads everything, which is the
// other end of the access-pattern range the strategies must handle.
//
// All arithmetic is f32. Each bin is a fixed sequential sum, so every
// strategy produces bit-identical output.

use std::f32::consts::PI;

use crate::buffer::FlatBuffer;
use crate::domain::Coord;
use crate::error::Result;
use crate::kernel::Kernel;
use crate::strategy::{Executor, Launch};

/// Bins may differ from a reference by at most this much.
pub const DFT_TOLERANCE: f32 = 0.1;

pub struct DftKernel<'a> {
    re: &'a FlatBuffer<f32>,
    im: &'a FlatBuffer<f32>,
}

impl<'a> DftKernel<'a> {
    pub fn new(re: &'a FlatBuffer<f32>, im: &'a FlatBuffer<f32>) -> Self {
        DftKernel { re, im }
    }
}

impl Kernel for DftKernel<'_> {
    type Output = (f32, f32);

    fn name(&self) -> &str {
        "dft"
    }

    fn input_shapes(&self) -> Vec<(usize, usize)> {
        vec![(self.re.rows(), self.re.cols()), (self.im.rows(), self.im.cols())]
    }

    fn eval(&self, at: Coord) -> (f32, f32) {
        // Bin number is the row-major index, so an n×m launch over n×m
        // buffers computes bins 0..n·m exactly as the 1-D launch does.
        let k = (at.row * self.re.cols() + at.col) as f32;
        let n = self.re.len() as f32;
        let mut sum_re = 0.0f32;
        let mut sum_im = 0.0f32;
        for (t, (&x_re, &x_im)) in self.re.as_slice().iter().zip(self.im.as_slice()).enumerate() {
            let angle = (2.0 * PI * t as f32 * k) / n;
            let (sin, cos) = angle.sin_cos();
            sum_re += x_re * cos + x_im * sin;
            sum_im += -(x_re * sin + x_im * cos);
        }
        (sum_re, sum_im)
    }
}

/// Transform `(in_re, in_im)` into `(out_re, out_im)`. All four buffers
/// match the launch's shape; bin k lands at row-major index k, so 1-D and
/// 2-D launches of the same length produce the same flat output.
pub fn dft(
    exec: &Executor,
    launch: impl Into<Launch>,
    in_re: &FlatBuffer<f32>,
    in_im: &FlatBuffer<f32>,
    out_re: &mut FlatBuffer<f32>,
    out_im: &mut FlatBuffer<f32>,
) -> Result<()> {
    exec.run(
        &DftKernel::new(in_re, in_im),
        launch,
        (out_re.as_mut_slice(), out_im.as_mut_slice()),
    )
}

// julia.rs — Escape-time iteration for the Julia set z ← z² + c.
//
// Coordinate (r, c) of a rows × cols domain maps into the complex plane as
//
//   zx = 1.5 · (r - rows/2) / (0.5 · zoom · rows) + move_x
//   zy =       (c - cols/2) / (0.5 · zoom · cols) + move_y
//
// (rows/2 and cols/2 are integer halves.) Starting from z = zx + i·zy the
// recurrence runs until |z|² ≥ 4 or the iteration budget is spent. A
// counter k starts at max_iterations and counts down once per step, so on
// exit k is the budget left over:
//
//   hue        = max_iterations / k     escaped with k > 0
//   brightness = 1
//
//   hue        = 0                       never escaped (k == 0)
//   brightness = 0
//
// The k == 0 case is defined explicitly; there is no division by zero.
//
// Trip counts vary wildly between neighbouring coordinates (1 step far from
// the set, the full budget inside it), but every coordinate is independent.

use crate::buffer::FlatBuffer;
use crate::domain::{Coord, IndexDomain};
use crate::error::Result;
use crate::kernel::Kernel;
use crate::strategy::{Executor, Launch};

pub const MAX_ITERATIONS: u32 = 1000;

/// Parameters of the Julia image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JuliaConfig {
    pub max_iterations: u32,
    pub zoom: f32,
    /// Real part of the constant c.
    pub cx: f32,
    /// Imaginary part of the constant c.
    pub cy: f32,
    pub move_x: f32,
    pub move_y: f32,
}

impl Default for JuliaConfig {
    fn default() -> Self {
        JuliaConfig {
            max_iterations: MAX_ITERATIONS,
            zoom: 1.0,
            cx: -0.7,
            cy: 0.27015,
            move_x: 0.0,
            move_y: 0.0,
        }
    }
}

/// Escape-time kernel producing `(hue, brightness)` per coordinate.
#[derive(Debug, Clone, Copy)]
pub struct JuliaKernel {
    config: JuliaConfig,
    rows: usize,
    cols: usize,
}

impl JuliaKernel {
    pub fn new(config: JuliaConfig, domain: &IndexDomain) -> Self {
        JuliaKernel { config, rows: domain.rows(), cols: domain.cols() }
    }

    /// Starting point of the iteration for coordinate `at`.
    pub fn start(&self, at: Coord) -> (f32, f32) {
        let cfg = &self.config;
        let dr = at.row as i64 - (self.rows / 2) as i64;
        let dc = at.col as i64 - (self.cols / 2) as i64;
        let zx = 1.5 * dr as f32 / (0.5 * cfg.zoom * self.rows as f32) + cfg.move_x;
        let zy = dc as f32 / (0.5 * cfg.zoom * self.cols as f32) + cfg.move_y;
        (zx, zy)
    }

    /// Iteration budget left when the orbit of `at` escaped; 0 if it never did.
    pub fn remaining(&self, at: Coord) -> u32 {
        let cfg = &self.config;
        let (mut zx, mut zy) = self.start(at);
        let mut k = cfg.max_iterations;
        while zx * zx + zy * zy < 4.0 && k > 0 {
            let tmp = zx * zx - zy * zy + cfg.cx;
            zy = 2.0 * zx * zy + cfg.cy;
            zx = tmp;
            k -= 1;
        }
        k
    }
}

impl Kernel for JuliaKernel {
    type Output = (f32, f32);

    fn name(&self) -> &str {
        "julia"
    }

    fn eval(&self, at: Coord) -> (f32, f32) {
        match self.remaining(at) {
            0 => (0.0, 0.0),
            k => (self.config.max_iterations as f32 / k as f32, 1.0),
        }
    }
}

/// Fill `hue` and `brightness` for every coordinate of `launch`.
pub fn julia(
    exec: &Executor,
    launch: impl Into<Launch>,
    config: JuliaConfig,
    hue: &mut FlatBuffer<f32>,
    brightness: &mut FlatBuffer<f32>,
) -> Result<()> {
    let launch = launch.into();
    let kernel = JuliaKernel::new(config, launch.domain());
    exec.run(&kernel, launch, (hue.as_mut_slice(), brightness.as_mut_slice()))
}

// ---------------------------------------------------------------------------
// Colouring
// ---------------------------------------------------------------------------

/// HSB → packed opaque RGB (`0xff_rr_gg_bb`).
///
/// Hue wraps modulo 1; saturation and brightness are in `[0, 1]`.
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> u32 {
    let to_byte = |v: f32| (v * 255.0 + 0.5) as u32;
    let (r, g, b) = if saturation == 0.0 {
        let v = to_byte(brightness);
        (v, v, v)
    } else {
        let h = (hue - hue.floor()) * 6.0;
        let f = h - h.floor();
        let p = brightness * (1.0 - saturation);
        let q = brightness * (1.0 - saturation * f);
        let t = brightness * (1.0 - saturation * (1.0 - f));
        match h as u32 {
            0 => (to_byte(brightness), to_byte(t), to_byte(p)),
            1 => (to_byte(q), to_byte(brightness), to_byte(p)),
            2 => (to_byte(p), to_byte(brightness), to_byte(t)),
            3 => (to_byte(p), to_byte(q), to_byte(brightness)),
            4 => (to_byte(t), to_byte(p), to_byte(brightness)),
            5 => (to_byte(brightness), to_byte(p), to_byte(q)),
            _ => (0, 0, 0),
        }
    };
    0xff00_0000 | r << 16 | g << 8 | b
}

/// Per-coordinate colouring of a `(hue, brightness)` pair at saturation 1.
pub struct Colorize<'a> {
    hue: &'a FlatBuffer<f32>,
    brightness: &'a FlatBuffer<f32>,
}

impl<'a> Colorize<'a> {
    pub fn new(hue: &'a FlatBuffer<f32>, brightness: &'a FlatBuffer<f32>) -> Self {
        Colorize { hue, brightness }
    }
}

impl Kernel for Colorize<'_> {
    type Output = u32;

    fn name(&self) -> &str {
        "julia.colorize"
    }

    fn input_shapes(&self) -> Vec<(usize, usize)> {
        vec![
            (self.hue.rows(), self.hue.cols()),
            (self.brightness.rows(), self.brightness.cols()),
        ]
    }

    fn eval(&self, at: Coord) -> u32 {
        let h = self.hue.get(at.row, at.col);
        let b = self.brightness.get(at.row, at.col);
        hsb_to_rgb(h % 1.0, 1.0, b)
    }
}

/// Turn julia output into a packed RGB image.
pub fn colorize(
    exec: &Executor,
    launch: impl Into<Launch>,
    hue: &FlatBuffer<f32>,
    brightness: &FlatBuffer<f32>,
) -> Result<FlatBuffer<u32>> {
    let launch = launch.into();
    let mut out = FlatBuffer::for_domain(launch.domain());
    exec.run(&Colorize::new(hue, brightness), launch, out.as_mut_slice())?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::Strategy;

    fn domain(n: usize) -> IndexDomain {
        IndexDomain::new_2d(n, n).unwrap()
    }

    #[test]
    fn test_centre_maps_to_origin() {
        let k = JuliaKernel::new(JuliaConfig::default(), &domain(64));
        assert_eq!(k.start(Coord::new(32, 32)), (0.0, 0.0));

        let cfg = JuliaConfig { move_x: 0.25, move_y: -0.5, ..Default::default() };
        let k = JuliaKernel::new(cfg, &domain(64));
        assert_eq!(k.start(Coord::new(32, 32)), (0.25, -0.5));
    }

    #[test]
    fn test_far_point_escapes_immediately() {
        let cfg = JuliaConfig { move_x: 10.0, ..Default::default() };
        let k = JuliaKernel::new(cfg, &domain(8));
        assert_eq!(k.remaining(Coord::new(4, 4)), MAX_ITERATIONS);
        assert_eq!(k.eval(Coord::new(4, 4)), (1.0, 1.0));
    }

    #[test]
    fn test_trapped_point_has_zero_hue() {
        // Find a coordinate whose orbit never escapes; its outputs are defined.
        let d = domain(64);
        let k = JuliaKernel::new(JuliaConfig::default(), &d);
        let trapped = d.coords().find(|&at| k.remaining(at) == 0);
        let at = trapped.expect("64×64 default view contains points of the filled set");
        assert_eq!(k.eval(at), (0.0, 0.0));
    }

    #[test]
    fn test_small_budget_never_divides_by_zero() {
        let cfg = JuliaConfig { max_iterations: 1, ..Default::default() };
        let k = JuliaKernel::new(cfg, &domain(16));
        for at in domain(16).coords() {
            let (hue, bright) = k.eval(at);
            assert!(hue.is_finite());
            assert!(bright == 0.0 || bright == 1.0);
        }
    }

    #[test]
    fn test_hsb_primary_colours() {
        assert_eq!(hsb_to_rgb(0.0, 1.0, 1.0), 0xff_ff_00_00);
        assert_eq!(hsb_to_rgb(1.0 / 3.0, 1.0, 1.0), 0xff_00_ff_00);
        assert_eq!(hsb_to_rgb(2.0 / 3.0, 1.0, 1.0), 0xff_00_00_ff);
        assert_eq!(hsb_to_rgb(0.5, 1.0, 0.0), 0xff_00_00_00);
        assert_eq!(hsb_to_rgb(0.7, 0.0, 1.0), 0xff_ff_ff_ff);
    }

    #[test]
    fn test_colorize_black_inside_set() {
        let d = domain(32);
        let exec = Executor::new(Strategy::Sequential);
        let mut hue = FlatBuffer::for_domain(&d);
        let mut bright = FlatBuffer::for_domain(&d);
        julia(&exec, d, JuliaConfig::default(), &mut hue, &mut bright).unwrap();
        let rgb = colorize(&exec, d, &hue, &bright).unwrap();
        for (r, c, p) in rgb.elements() {
            if bright.get(r, c) == 0.0 {
                assert_eq!(p, 0xff_00_00_00);
            }
        }
    }
}

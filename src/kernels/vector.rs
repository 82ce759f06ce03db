// vector.rs — Element-wise arithmetic on 4-wide float vectors.
//
// A 1-D domain of n Float4 elements; each work item combines a[i] and b[i]
// lane by lane. Float4 is `#[repr(C)]` and `Pod`, so a buffer of them is
// also a flat `[f32]` of 4n floats for anything that wants raw lanes.

use std::ops::{Add, Sub};

use bytemuck::{Pod, Zeroable};

use crate::buffer::{Element, FlatBuffer};
use crate::domain::Coord;
use crate::error::Result;
use crate::kernel::Kernel;
use crate::strategy::{Executor, Launch};

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Float4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Element for Float4 {}

impl Float4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Float4 { x, y, z, w }
    }

    pub const fn splat(v: f32) -> Self {
        Float4 { x: v, y: v, z: v, w: v }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl Add for Float4 {
    type Output = Float4;

    fn add(self, o: Float4) -> Float4 {
        Float4::new(self.x + o.x, self.y + o.y, self.z + o.z, self.w + o.w)
    }
}

impl Sub for Float4 {
    type Output = Float4;

    fn sub(self, o: Float4) -> Float4 {
        Float4::new(self.x - o.x, self.y - o.y, self.z - o.z, self.w - o.w)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorOp {
    Add,
    Sub,
}

impl VectorOp {
    #[inline]
    pub fn apply(self, a: Float4, b: Float4) -> Float4 {
        match self {
            VectorOp::Add => a + b,
            VectorOp::Sub => a - b,
        }
    }
}

pub struct VectorKernel<'a> {
    op: VectorOp,
    a: &'a FlatBuffer<Float4>,
    b: &'a FlatBuffer<Float4>,
}

impl<'a> VectorKernel<'a> {
    pub fn new(op: VectorOp, a: &'a FlatBuffer<Float4>, b: &'a FlatBuffer<Float4>) -> Self {
        VectorKernel { op, a, b }
    }
}

impl Kernel for VectorKernel<'_> {
    type Output = Float4;

    fn name(&self) -> &str {
        match self.op {
            VectorOp::Add => "vector.add",
            VectorOp::Sub => "vector.sub",
        }
    }

    fn input_shapes(&self) -> Vec<(usize, usize)> {
        vec![(self.a.rows(), self.a.cols()), (self.b.rows(), self.b.cols())]
    }

    #[inline]
    fn eval(&self, at: Coord) -> Float4 {
        self.op.apply(self.a.get(at.row, at.col), self.b.get(at.row, at.col))
    }
}

/// `out[i] = a[i] op b[i]` for every coordinate of `launch`.
pub fn vector_op(
    exec: &Executor,
    launch: impl Into<Launch>,
    op: VectorOp,
    a: &FlatBuffer<Float4>,
    b: &FlatBuffer<Float4>,
    out: &mut FlatBuffer<Float4>,
) -> Result<()> {
    exec.run(&VectorKernel::new(op, a, b), launch, out.as_mut_slice())
}

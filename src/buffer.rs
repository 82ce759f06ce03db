// buffer.rs — Fixed-length, row-major numeric buffer.
//
// A FlatBuffer holds one image channel, one component of a complex signal,
// or one vector field. It is the only storage type the strategies read and
// write. Addressing is always row-major:
//
//   index(r, c) = r * cols + c
//
//   data index:  0  1  2  3   4  5  6  7   8  9 10 11
//   element:     ■  ■  ■  ■   ■  ■  ■  ■   ■  ■  ■  ■
//   row:         |- row 0 -|  |- row 1 -|  |- row 2 -|
//
// 1-D buffers are stored as `n × 1`, so `index(i, 0) == i` and the same
// arithmetic serves both shapes. The buffer remembers whether it was built
// 1-D so that `domain()` hands back a 1-D domain (and a 1-D default grid).
//
// Unlike an image with stride padding, a FlatBuffer has no padding at all:
// the slice handed to a strategy is exactly `rows * cols` elements long, and
// a strategy can split it into disjoint row chunks with `split_at_mut`.
//
// NEW RUST CONCEPTS:
// - Supertrait bounds that come from another crate (`bytemuck::Pod`):
//   any Element can be viewed as raw bytes without `unsafe`.
// - `into_vec(self)` — consuming accessor that hands the heap allocation
//   back to the caller without copying.

use std::fmt;

use crate::domain::{Dims, IndexDomain};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Element Trait
// ---------------------------------------------------------------------------

/// Trait for types that can be stored in a FlatBuffer.
///
/// `Pod` makes every element plain old data (no pointers, no padding
/// invariants), which is what lets `as_bytes` hand the buffer to file
/// writers or foreign APIs as-is.
pub trait Element: bytemuck::Pod + Default + Send + Sync + fmt::Debug {}

impl Element for u8 {}
impl Element for u32 {}
impl Element for i32 {}
impl Element for f32 {}

// ---------------------------------------------------------------------------
// FlatBuffer<T>
// ---------------------------------------------------------------------------

/// A contiguous buffer with a fixed `rows × cols` shape.
///
/// The length is set at construction and never changes: there is no
/// `push`, `resize`, or `truncate`.
#[derive(Clone)]
pub struct FlatBuffer<T: Element> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
    dims: Dims,
}

impl<T: Element> FlatBuffer<T> {
    // --- Constructors ---

    /// Create a zero-initialized 2-D buffer.
    pub fn new(rows: usize, cols: usize) -> Self {
        FlatBuffer {
            data: vec![T::default(); rows * cols],
            rows,
            cols,
            dims: Dims::Two,
        }
    }

    /// Create a zero-initialized 1-D buffer of length `n`.
    pub fn new_1d(n: usize) -> Self {
        FlatBuffer { dims: Dims::One, ..Self::new(n, 1) }
    }

    /// Create a zero-initialized buffer shaped like `domain`.
    pub fn for_domain(domain: &IndexDomain) -> Self {
        FlatBuffer { dims: domain.dims(), ..Self::new(domain.rows(), domain.cols()) }
    }

    /// Wrap an existing row-major vector.
    ///
    /// # Panics
    /// Panics if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "data length ({}) must equal rows * cols ({})",
            data.len(),
            rows * cols,
        );
        FlatBuffer { data, rows, cols, dims: Dims::Two }
    }

    /// Wrap an existing vector as a 1-D buffer.
    pub fn from_vec_1d(data: Vec<T>) -> Self {
        let n = data.len();
        FlatBuffer { data, rows: n, cols: 1, dims: Dims::One }
    }

    /// Build a 2-D buffer by evaluating `f(r, c)` at every coordinate.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        FlatBuffer { data, rows, cols, dims: Dims::Two }
    }

    // --- Accessors ---

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of elements. Always `rows * cols`.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the buffer was built 1-D (`new_1d`, `from_vec_1d`) or 2-D.
    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// The index domain matching this buffer's shape: 1-D for buffers
    /// built 1-D, 2-D otherwise.
    ///
    /// Fails with `InvalidDomain` for an empty buffer.
    pub fn domain(&self) -> Result<IndexDomain> {
        match self.dims {
            Dims::One => IndexDomain::new_1d(self.rows),
            Dims::Two => IndexDomain::new_2d(self.rows, self.cols),
        }
    }

    /// Get the element at row `r`, column `c`.
    ///
    /// # Panics
    /// Panics if `(r, c)` is out of bounds.
    #[inline]
    pub fn get(&self, r: usize, c: usize) -> T {
        self.bounds_check(r, c);
        self.data[r * self.cols + c]
    }

    /// Set the element at row `r`, column `c`.
    #[inline]
    pub fn set(&mut self, r: usize, c: usize, value: T) {
        self.bounds_check(r, c);
        self.data[r * self.cols + c] = value;
    }

    /// Borrow one row as a slice.
    #[inline]
    pub fn row(&self, r: usize) -> &[T] {
        assert!(r < self.rows, "row {r} out of bounds (rows {})", self.rows);
        let start = r * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Iterate over all elements as `(r, c, value)` in row-major order.
    pub fn elements(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        let cols = self.cols;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, &v)| (i / cols, i % cols, v))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// View the buffer as raw bytes (native endianness).
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Consume the buffer and return its storage.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    // --- Internal helpers ---

    #[inline]
    fn bounds_check(&self, r: usize, c: usize) {
        assert!(
            r < self.rows && c < self.cols,
            "element ({r},{c}) out of bounds for buffer {}×{}",
            self.rows,
            self.cols,
        );
    }
}

// Equality is shape and contents; an n×1 2-D buffer equals the 1-D buffer
// of length n holding the same data.
impl<T: Element + PartialEq> PartialEq for FlatBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows && self.cols == other.cols && self.data == other.data
    }
}

// Debug formatting — prints the top-left corner, enough for test failures.
impl<T: Element> fmt::Debug for FlatBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "FlatBuffer<{}> {{ {}×{} }}",
            std::any::type_name::<T>(),
            self.rows,
            self.cols,
        )?;
        for r in 0..self.rows.min(8) {
            write!(f, "  row {r}: [")?;
            for c in 0..self.cols.min(16) {
                if c > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:?}", self.get(r, c))?;
            }
            if self.cols > 16 {
                write!(f, ", ...")?;
            }
            writeln!(f, "]")?;
        }
        if self.rows > 8 {
            writeln!(f, "  ...")?;
        }
        Ok(())
    }
}

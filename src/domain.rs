// domain.rs — Iteration spaces.
//
// An IndexDomain is the set of coordinates a kernel must visit exactly once.
// It is an immutable value: extents are validated at construction and never
// change afterwards.
//
// 1-D domains are stored as `n × 1`. That keeps a single addressing rule,
//
//   linear_index(r, c) = r * cols + c
//
// for every buffer and every kernel, and makes `linear_index(i, 0) == i`.
// The boundary clamping in the stencil kernel and the band splitting in the
// strategies both assume exactly this convention.

use crate::error::{Error, Result};
use crate::grid::{LocalSize, WorkerGrid};

/// A position in an index domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    #[inline]
    pub const fn new(row: usize, col: usize) -> Self {
        Coord { row, col }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Dimensionality of a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dims {
    One,
    Two,
}

/// A validated 1-D or 2-D iteration space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDomain {
    rows: usize,
    cols: usize,
    dims: Dims,
}

impl IndexDomain {
    /// Create a `rows × cols` domain.
    ///
    /// Fails with `InvalidDomain` if either extent is zero or the size
    /// does not fit in `usize`.
    pub fn new_2d(rows: usize, cols: usize) -> Result<Self> {
        match rows.checked_mul(cols) {
            Some(size) if size > 0 => Ok(IndexDomain { rows, cols, dims: Dims::Two }),
            _ => {
                tracing::warn!(rows, cols, "rejecting empty or oversized domain");
                Err(Error::InvalidDomain { rows, cols })
            }
        }
    }

    /// Create a 1-D domain of length `n`.
    pub fn new_1d(n: usize) -> Result<Self> {
        if n == 0 {
            tracing::warn!("rejecting empty 1-D domain");
            return Err(Error::InvalidDomain { rows: 0, cols: 1 });
        }
        Ok(IndexDomain { rows: n, cols: 1, dims: Dims::One })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn dims(&self) -> Dims {
        self.dims
    }

    /// Total number of coordinates.
    #[inline]
    pub fn size(&self) -> usize {
        self.rows * self.cols
    }

    /// Row-major linear index of `(r, c)`.
    #[inline]
    pub fn linear_index(&self, r: usize, c: usize) -> usize {
        debug_assert!(r < self.rows && c < self.cols, "({r},{c}) outside {}×{}", self.rows, self.cols);
        r * self.cols + c
    }

    /// Inverse of `linear_index`.
    #[inline]
    pub fn coord(&self, index: usize) -> Coord {
        debug_assert!(index < self.size());
        Coord { row: index / self.cols, col: index % self.cols }
    }

    #[inline]
    pub fn contains(&self, at: Coord) -> bool {
        at.row < self.rows && at.col < self.cols
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.size()).map(move |i| self.coord(i))
    }

    /// Partition the domain into local tiles of `local_rows × local_cols`.
    ///
    /// Fails with `InvalidPartition` unless both local extents are non-zero
    /// and divide the corresponding global extent exactly. For a 1-D domain
    /// `local_cols` must be 1; see `partition_1d`.
    pub fn partition(&self, local_rows: usize, local_cols: usize) -> Result<WorkerGrid> {
        WorkerGrid::new(*self, Some(LocalSize::new(local_rows, local_cols)))
    }

    /// Partition a 1-D domain into groups of `local` work items.
    pub fn partition_1d(&self, local: usize) -> Result<WorkerGrid> {
        self.partition(local, 1)
    }

    /// A worker grid with no explicit local size.
    ///
    /// The grid still batches work items into groups, using the default
    /// local size from `LocalSize::default_for`.
    pub fn grid(&self) -> WorkerGrid {
        WorkerGrid::with_default_local(*self)
    }
}

impl std::fmt::Display for IndexDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.dims {
            Dims::One => write!(f, "[{}]", self.rows),
            Dims::Two => write!(f, "{}×{}", self.rows, self.cols),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Axis;

    #[test]
    fn test_zero_extent_rejected() {
        assert!(matches!(
            IndexDomain::new_2d(0, 5),
            Err(Error::InvalidDomain { rows: 0, cols: 5 })
        ));
        assert!(matches!(
            IndexDomain::new_2d(5, 0),
            Err(Error::InvalidDomain { rows: 5, cols: 0 })
        ));
        assert!(IndexDomain::new_1d(0).is_err());
    }

    #[test]
    fn test_overflowing_size_rejected() {
        assert!(IndexDomain::new_2d(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_linear_index_row_major() {
        let d = IndexDomain::new_2d(3, 4).unwrap();
        assert_eq!(d.size(), 12);
        assert_eq!(d.linear_index(0, 0), 0);
        assert_eq!(d.linear_index(0, 3), 3);
        assert_eq!(d.linear_index(1, 0), 4);
        assert_eq!(d.linear_index(2, 3), 11);
        for i in 0..d.size() {
            let at = d.coord(i);
            assert_eq!(d.linear_index(at.row, at.col), i);
        }
    }

    #[test]
    fn test_one_d_domain_uses_rows() {
        let d = IndexDomain::new_1d(7).unwrap();
        assert_eq!(d.dims(), Dims::One);
        assert_eq!(d.cols(), 1);
        assert_eq!(d.linear_index(5, 0), 5);
        assert_eq!(d.coord(5), Coord::new(5, 0));
    }

    #[test]
    fn test_partition_divisibility() {
        let d = IndexDomain::new_2d(100, 100).unwrap();
        assert!(d.partition(5, 5).is_ok());

        let d = IndexDomain::new_2d(101, 100).unwrap();
        assert!(matches!(
            d.partition(5, 5),
            Err(Error::InvalidPartition { axis: Axis::Rows, extent: 101, local: 5 })
        ));
    }

    #[test]
    fn test_partition_zero_local_rejected() {
        let d = IndexDomain::new_2d(4, 4).unwrap();
        assert!(d.partition(0, 2).is_err());
        assert!(d.partition(2, 0).is_err());
    }

    #[test]
    fn test_partition_1d() {
        let d = IndexDomain::new_1d(8192).unwrap();
        let g = d.partition_1d(256).unwrap();
        assert_eq!(g.num_groups(), 32);
        // A 1-D domain cannot be tiled across columns.
        assert!(d.partition(256, 2).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(IndexDomain::new_2d(3, 4).unwrap().to_string(), "3×4");
        assert_eq!(IndexDomain::new_1d(9).unwrap().to_string(), "[9]");
    }
}

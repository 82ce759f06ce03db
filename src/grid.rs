// grid.rs — Explicit work-item grids for the indexed-grid strategy.
//
// A WorkerGrid maps work-item ids onto domain coordinates. Ids follow the
// domain's row-major order, so the mapping is a bijection by construction:
//
//   global_index(id) = (id / cols, id % cols)
//
// Work items are batched into local groups (tiles). A group is a
// `local.rows × local.cols` block of the domain:
//
//        col →  0 1 2 3 | 4 5 6 7
//   row 0       ■ ■ ■ ■ | □ □ □ □      group (0,0) = ■
//   row 1       ■ ■ ■ ■ | □ □ □ □      group (0,1) = □
//        ───────────────┼────────
//   row 2       ▲ ▲ ▲ ▲ | ◆ ◆ ◆ ◆      group (1,0) = ▲
//   row 3       ▲ ▲ ▲ ▲ | ◆ ◆ ◆ ◆      group (1,1) = ◆
//
// The local size must divide each extent exactly. Grouping only changes how
// work items are batched, never which coordinate a work item visits.
//
// Lifecycle: a domain is partitioned into a grid, the grid is handed to one
// dispatch, and then dropped. WorkerGrid is a small Copy value, so nothing
// is shared between runs.

use std::fmt;

use crate::domain::{Coord, Dims, IndexDomain};
use crate::error::{Axis, Error, Result};

/// Upper bounds for the default local size, per dimensionality.
/// 16 columns × 8 rows = 128 items per group.
const DEFAULT_LOCAL_COLS: usize = 16;
const DEFAULT_LOCAL_ROWS: usize = 8;
const DEFAULT_LOCAL_1D: usize = 256;

// ---------------------------------------------------------------------------
// LocalSize
// ---------------------------------------------------------------------------

/// The extent of one local group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSize {
    pub rows: usize,
    pub cols: usize,
}

impl LocalSize {
    pub const fn new(rows: usize, cols: usize) -> Self {
        LocalSize { rows, cols }
    }

    /// Work items per group.
    pub fn total(&self) -> usize {
        self.rows * self.cols
    }

    /// The local size used when a grid is built without one.
    ///
    /// Picks the largest divisor of each extent that does not exceed the
    /// default bound, so the result always partitions the domain. A prime
    /// extent larger than the bound falls back to 1 along that axis.
    pub fn default_for(domain: &IndexDomain) -> Self {
        match domain.dims() {
            Dims::One => LocalSize::new(largest_divisor_up_to(domain.rows(), DEFAULT_LOCAL_1D), 1),
            Dims::Two => LocalSize::new(
                largest_divisor_up_to(domain.rows(), DEFAULT_LOCAL_ROWS),
                largest_divisor_up_to(domain.cols(), DEFAULT_LOCAL_COLS),
            ),
        }
    }

    fn validate(&self, domain: &IndexDomain) -> Result<()> {
        for (axis, extent, local) in [
            (Axis::Rows, domain.rows(), self.rows),
            (Axis::Cols, domain.cols(), self.cols),
        ] {
            if local == 0 || extent % local != 0 {
                tracing::warn!(%axis, extent, local, "local size does not partition domain");
                return Err(Error::InvalidPartition { axis, extent, local });
            }
        }
        Ok(())
    }
}

impl fmt::Display for LocalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{} ({} work items)", self.rows, self.cols, self.total())
    }
}

fn largest_divisor_up_to(n: usize, bound: usize) -> usize {
    (1..=bound.min(n)).rev().find(|d| n % d == 0).unwrap_or(1)
}

// ---------------------------------------------------------------------------
// WorkItem
// ---------------------------------------------------------------------------

/// One unit of kernel invocation, with its place in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    /// Global work-item id (row-major over the domain).
    pub id: usize,
    /// The domain coordinate this work item visits.
    pub global: Coord,
    /// Which local group the work item belongs to.
    pub group: Coord,
    /// Position inside its local group.
    pub local: Coord,
}

// ---------------------------------------------------------------------------
// WorkerGrid
// ---------------------------------------------------------------------------

/// A partitioned domain: one work item per coordinate, batched into groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerGrid {
    domain: IndexDomain,
    local: LocalSize,
    explicit_local: bool,
}

impl WorkerGrid {
    /// Build a grid, validating the local size if one is given.
    pub fn new(domain: IndexDomain, local: Option<LocalSize>) -> Result<Self> {
        match local {
            Some(local) => {
                local.validate(&domain)?;
                Ok(WorkerGrid { domain, local, explicit_local: true })
            }
            None => Ok(Self::with_default_local(domain)),
        }
    }

    pub(crate) fn with_default_local(domain: IndexDomain) -> Self {
        WorkerGrid {
            domain,
            local: LocalSize::default_for(&domain),
            explicit_local: false,
        }
    }

    #[inline]
    pub fn domain(&self) -> &IndexDomain {
        &self.domain
    }

    #[inline]
    pub fn local_size(&self) -> LocalSize {
        self.local
    }

    /// Whether the local size was chosen by the caller rather than defaulted.
    pub fn has_explicit_local(&self) -> bool {
        self.explicit_local
    }

    /// Number of work items. Always equal to the domain size.
    pub fn num_work_items(&self) -> usize {
        self.domain.size()
    }

    /// Number of groups along each axis, as `(group_rows, group_cols)`.
    pub fn group_counts(&self) -> (usize, usize) {
        (
            self.domain.rows() / self.local.rows,
            self.domain.cols() / self.local.cols,
        )
    }

    pub fn num_groups(&self) -> usize {
        let (gr, gc) = self.group_counts();
        gr * gc
    }

    /// The coordinate visited by work item `id`.
    ///
    /// # Panics
    /// Panics if `id >= num_work_items()`.
    #[inline]
    pub fn global_index(&self, id: usize) -> Coord {
        assert!(
            id < self.num_work_items(),
            "work item {id} out of range for grid of {}",
            self.num_work_items()
        );
        self.domain.coord(id)
    }

    /// Full description of work item `id`.
    pub fn work_item(&self, id: usize) -> WorkItem {
        let global = self.global_index(id);
        WorkItem {
            id,
            global,
            group: Coord::new(global.row / self.local.rows, global.col / self.local.cols),
            local: Coord::new(global.row % self.local.rows, global.col % self.local.cols),
        }
    }

    /// Group coordinates in row-major order.
    pub fn groups(&self) -> impl Iterator<Item = Coord> {
        let (gr, gc) = self.group_counts();
        (0..gr).flat_map(move |r| (0..gc).map(move |c| Coord::new(r, c)))
    }

    /// Work items of one group, in local row-major order.
    pub fn group_items(&self, group: Coord) -> impl Iterator<Item = WorkItem> + '_ {
        let LocalSize { rows: lr, cols: lc } = self.local;
        let (r0, c0) = (group.row * lr, group.col * lc);
        (0..lr).flat_map(move |r| {
            (0..lc).map(move |c| {
                let global = Coord::new(r0 + r, c0 + c);
                WorkItem {
                    id: self.domain.linear_index(global.row, global.col),
                    global,
                    group,
                    local: Coord::new(r, c),
                }
            })
        })
    }
}

impl fmt::Display for WorkerGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkerGrid {{ global: {}, local: {} }}", self.domain, self.local)
    }
}

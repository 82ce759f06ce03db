// strategy.rs — Execution strategies: one kernel, four ways to drive it.
//
// Every strategy has the same postcondition: each coordinate of the domain
// is visited exactly once and its output slot holds the kernel's value for
// that coordinate. They differ only in how coordinates are scheduled:
//
//   Sequential    one thread, row-major order. The correctness oracle.
//
//   Threaded      the outer (row) dimension is cut into bands spread over
//                 the worker pool; inside a row the columns are split again
//                 and run as independent tasks. Join barrier before return.
//
//   IndexedLoop   both axes declared independent: the domain is flattened
//                 and split recursively into runs of `loop_grain`
//                 coordinates, each an independent unit with no ordering
//                 between them. This is the contract an offload target
//                 needs from a nested parallel loop.
//
//   IndexedGrid   the domain must be partitioned into a WorkerGrid first.
//                 One work item per coordinate; work items are batched by
//                 local group. Each band of group rows is contiguous in
//                 memory and runs as one task; the groups inside a band run
//                 in group order, their work items in local row-major order.
//
// Validation is eager and total: every check runs before the first kernel
// call, so a run either covers the whole domain or fails without touching
// the outputs.
//
// NEW RUST CONCEPTS:
// - `rayon::join` for recursive divide-and-conquer over a splittable sink.
// - `ThreadPool::install` to run a parallel section on a dedicated pool.
// - Higher-ranked closure bounds (`F: Fn(Coord, &mut S, usize)`): the
//   closure accepts a `&mut S` of any lifetime the caller picks.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use rayon::prelude::*;

use crate::buffer::{Element, FlatBuffer};
use crate::domain::{Coord, IndexDomain};
use crate::error::{Error, Result};
use crate::grid::WorkerGrid;
use crate::kernel::{Kernel, MapKernel};
use crate::sink::{split_chunks, Sink};

/// Smallest run of coordinates the indexed-loop strategy gives one task.
pub const DEFAULT_LOOP_GRAIN: usize = 1024;

/// Row bands per worker for the threaded strategy.
const BANDS_PER_WORKER: usize = 4;

// ---------------------------------------------------------------------------
// Strategy
// ---------------------------------------------------------------------------

/// Which execution strategy drives a kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Sequential,
    Threaded,
    IndexedLoop,
    IndexedGrid,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Sequential,
        Strategy::Threaded,
        Strategy::IndexedLoop,
        Strategy::IndexedGrid,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Threaded => "threaded",
            Strategy::IndexedLoop => "indexed-loop",
            Strategy::IndexedGrid => "indexed-grid",
        }
    }

    /// Whether this strategy needs a partitioned launch.
    pub fn requires_grid(self) -> bool {
        self == Strategy::IndexedGrid
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    /// Parse a strategy selector. Accepts the long names, the short
    /// aliases `seq`, `mt`, `loop`, `grid`, and an optional leading `--`.
    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().trim_start_matches("--").to_ascii_lowercase();
        match key.as_str() {
            "sequential" | "seq" => Ok(Strategy::Sequential),
            "threaded" | "mt" => Ok(Strategy::Threaded),
            "indexed-loop" | "loop" | "tornado" => Ok(Strategy::IndexedLoop),
            "indexed-grid" | "grid" | "tornadocontext" => Ok(Strategy::IndexedGrid),
            _ => Err(Error::UnknownStrategy(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Launch
// ---------------------------------------------------------------------------

/// What a dispatch iterates over: a bare domain, or a partitioned grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    Domain(IndexDomain),
    Grid(WorkerGrid),
}

impl Launch {
    pub fn domain(&self) -> &IndexDomain {
        match self {
            Launch::Domain(d) => d,
            Launch::Grid(g) => g.domain(),
        }
    }

    pub fn worker_grid(&self) -> Option<&WorkerGrid> {
        match self {
            Launch::Domain(_) => None,
            Launch::Grid(g) => Some(g),
        }
    }
}

impl From<IndexDomain> for Launch {
    fn from(d: IndexDomain) -> Self {
        Launch::Domain(d)
    }
}

impl From<WorkerGrid> for Launch {
    fn from(g: WorkerGrid) -> Self {
        Launch::Grid(g)
    }
}

impl From<&IndexDomain> for Launch {
    fn from(d: &IndexDomain) -> Self {
        Launch::Domain(*d)
    }
}

impl From<&WorkerGrid> for Launch {
    fn from(g: &WorkerGrid) -> Self {
        Launch::Grid(*g)
    }
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// Executor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Worker count for a dedicated pool. `None` uses rayon's global pool,
    /// which is sized to the host's available parallelism.
    pub threads: Option<usize>,
    /// Smallest run of coordinates handed to one indexed-loop task.
    pub loop_grain: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig {
            threads: None,
            loop_grain: DEFAULT_LOOP_GRAIN,
        }
    }
}

/// Runs kernels under one selected strategy.
///
/// Buffers are borrowed only for the duration of a `run` call; the executor
/// keeps no reference to them afterwards and holds no other mutable state,
/// so one executor can serve any number of runs.
pub struct Executor {
    strategy: Strategy,
    config: ExecutorConfig,
    pool: Option<rayon::ThreadPool>,
}

impl Executor {
    /// An executor with default configuration.
    pub fn new(strategy: Strategy) -> Self {
        Executor {
            strategy,
            config: ExecutorConfig::default(),
            pool: None,
        }
    }

    /// An executor with explicit configuration.
    ///
    /// Builds a dedicated worker pool when `config.threads` is set and the
    /// strategy is parallel.
    pub fn with_config(strategy: Strategy, config: ExecutorConfig) -> Result<Self> {
        let pool = match config.threads {
            Some(n) if strategy != Strategy::Sequential => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("tessera-{i}"))
                    .build()?,
            ),
            _ => None,
        };
        let executor = Executor { strategy, config, pool };
        tracing::debug!(
            strategy = %executor.strategy,
            workers = executor.workers(),
            "executor ready"
        );
        Ok(executor)
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Number of worker threads a run may use.
    pub fn workers(&self) -> usize {
        match (self.strategy, &self.pool) {
            (Strategy::Sequential, _) => 1,
            (_, Some(pool)) => pool.current_num_threads(),
            (_, None) => rayon::current_num_threads(),
        }
    }

    /// Run an out-of-place kernel over `launch`, storing results in `outputs`.
    ///
    /// `outputs` is one mutable slice, or a tuple of slices for kernels with
    /// several outputs. Fails with `DomainMismatch`/`ShapeMismatch` if a
    /// buffer disagrees with the domain and with `PartitionRequired` if the
    /// indexed-grid strategy is given a bare domain.
    pub fn run<K, S>(&self, kernel: &K, launch: impl Into<Launch>, outputs: S) -> Result<()>
    where
        K: Kernel,
        S: Sink<Value = K::Output>,
    {
        let launch = launch.into();
        check_inputs(kernel.name(), &kernel.input_shapes(), launch.domain())?;
        self.dispatch(kernel.name(), &launch, outputs, &|at: Coord, sink: &mut S, offset: usize| {
            sink.store(offset, kernel.eval(at))
        })
    }

    /// Run an in-place kernel: each element of `buffer` is replaced by
    /// `kernel.map(at, old)`.
    pub fn run_in_place<K, T>(
        &self,
        kernel: &K,
        launch: impl Into<Launch>,
        buffer: &mut FlatBuffer<T>,
    ) -> Result<()>
    where
        K: MapKernel<Value = T>,
        T: Element,
    {
        let launch = launch.into();
        let shape = (buffer.rows(), buffer.cols());
        check_inputs(kernel.name(), &[shape], launch.domain())?;
        self.dispatch(kernel.name(), &launch, buffer.as_mut_slice(), &|at: Coord, sink: &mut &mut [T], offset: usize| {
            let old = sink.fetch(offset);
            sink.store(offset, kernel.map(at, old));
        })
    }

    fn dispatch<S, F>(&self, task: &str, launch: &Launch, sink: S, visit: &F) -> Result<()>
    where
        S: Sink,
        F: Fn(Coord, &mut S, usize) + Sync,
    {
        let domain = *launch.domain();
        if let Err(e) = sink.check_len(domain.size()) {
            tracing::warn!(task, %domain, error = %e, "output buffer rejected");
            return Err(e);
        }

        let span = tracing::debug_span!("dispatch", task, strategy = %self.strategy, %domain);
        let _enter = span.enter();
        let start = Instant::now();

        match (self.strategy, launch) {
            (Strategy::Sequential, _) => run_sequential(&domain, sink, visit),
            (Strategy::Threaded, _) => {
                let workers = self.workers();
                self.install(|| run_threaded(&domain, sink, visit, workers))
            }
            (Strategy::IndexedLoop, _) => {
                let grain = self.config.loop_grain.max(1);
                self.install(|| split_visit(sink, 0, grain, &domain, visit))
            }
            (Strategy::IndexedGrid, Launch::Grid(grid)) => {
                tracing::trace!(local = %grid.local_size(), groups = grid.num_groups(), "grid launch");
                self.install(|| run_indexed_grid(grid, sink, visit))
            }
            (Strategy::IndexedGrid, Launch::Domain(_)) => {
                tracing::warn!(task, "indexed-grid dispatch without a worker grid");
                return Err(Error::PartitionRequired { task: task.to_string() });
            }
        }

        tracing::debug!(elapsed_us = start.elapsed().as_micros() as u64, "dispatch complete");
        Ok(())
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl From<Strategy> for Executor {
    fn from(strategy: Strategy) -> Self {
        Executor::new(strategy)
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("strategy", &self.strategy)
            .field("config", &self.config)
            .field("workers", &self.workers())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn check_inputs(task: &str, shapes: &[(usize, usize)], domain: &IndexDomain) -> Result<()> {
    let expected = (domain.rows(), domain.cols());
    for &(rows, cols) in shapes {
        let actual = rows * cols;
        if actual != domain.size() {
            tracing::warn!(task, %domain, actual, "input buffer length disagrees with domain");
            return Err(Error::DomainMismatch { expected: domain.size(), actual });
        }
        if (rows, cols) != expected {
            tracing::warn!(task, %domain, rows, cols, "input buffer shape disagrees with domain");
            return Err(Error::ShapeMismatch { expected, actual: (rows, cols) });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Strategy bodies
// ---------------------------------------------------------------------------

fn run_sequential<S, F>(domain: &IndexDomain, mut sink: S, visit: &F)
where
    S: Sink,
    F: Fn(Coord, &mut S, usize),
{
    for index in 0..domain.size() {
        visit(domain.coord(index), &mut sink, index);
    }
}

fn run_threaded<S, F>(domain: &IndexDomain, sink: S, visit: &F, workers: usize)
where
    S: Sink,
    F: Fn(Coord, &mut S, usize) + Sync,
{
    let workers = workers.max(1);
    let cols = domain.cols();
    let band_rows = domain.rows().div_ceil(workers * BANDS_PER_WORKER).max(1);
    let inner_grain = cols.div_ceil(workers);

    split_chunks(sink, band_rows * cols)
        .into_par_iter()
        .for_each(|(band_base, band)| {
            for (row_base, row) in split_chunks(band, cols) {
                split_visit(row, band_base + row_base, inner_grain, domain, visit);
            }
        });
}

/// Visit `sink` (covering `[base, base + extent)` of the domain), splitting
/// it in halves across rayon tasks until a piece is at most `grain` long.
fn split_visit<S, F>(sink: S, base: usize, grain: usize, domain: &IndexDomain, visit: &F)
where
    S: Sink,
    F: Fn(Coord, &mut S, usize) + Sync,
{
    let len = sink.extent();
    if len <= grain {
        let mut sink = sink;
        for offset in 0..len {
            visit(domain.coord(base + offset), &mut sink, offset);
        }
        return;
    }
    let mid = len / 2;
    let (lo, hi) = sink.split(mid);
    rayon::join(
        || split_visit(lo, base, grain, domain, visit),
        || split_visit(hi, base + mid, grain, domain, visit),
    );
}

fn run_indexed_grid<S, F>(grid: &WorkerGrid, sink: S, visit: &F)
where
    S: Sink,
    F: Fn(Coord, &mut S, usize) + Sync,
{
    let band_len = grid.local_size().rows * grid.domain().cols();
    let (_, group_cols) = grid.group_counts();

    split_chunks(sink, band_len)
        .into_par_iter()
        .for_each(|(base, mut band)| {
            let group_row = base / band_len;
            for gc in 0..group_cols {
                for item in grid.group_items(Coord::new(group_row, gc)) {
                    visit(item.global, &mut band, item.id - base);
                }
            }
        });
}

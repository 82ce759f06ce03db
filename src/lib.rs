// tessera: one kernel, four execution strategies
// Data-parallel kernels over row-major buffers, run sequentially, on a
// thread pool, as an indexed parallel loop, or as an explicit work-item grid.
//
// Every strategy visits each coordinate of the domain exactly once; the
// sequential strategy is the oracle the others are checked against.

pub mod error;
pub mod buffer;
pub mod domain;
pub mod grid;
pub mod sink;
pub mod kernel;
pub mod strategy;
pub mod boundary;
pub mod pixel;
pub mod kernels;

pub use buffer::{Element, FlatBuffer};
pub use domain::{Coord, Dims, IndexDomain};
pub use error::{Axis, Error, Result};
pub use grid::{LocalSize, WorkItem, WorkerGrid};
pub use kernel::{Kernel, MapKernel, Mapped};
pub use sink::Sink;
pub use strategy::{Executor, ExecutorConfig, Launch, Strategy};

// kernel.rs — The per-coordinate computation contract.
//
// A kernel is a pure function of its inputs and one domain coordinate.
// It never writes output itself: it *returns* the value for its coordinate
// and the strategy stores it. That makes the "no cross-coordinate side
// effects" rule a property of the signature rather than a convention:
//
//   - `&self` — a kernel cannot mutate its own state between coordinates
//   - `Sync`  — the same kernel is shared by every worker thread
//   - return  — there is no `&mut` output parameter to write through
//
// A kernel may still read as much input as it likes. The stencil reads a
// W×W neighbourhood; the DFT reads the whole input signal per coordinate.
//
// Two shapes of kernel exist:
//
//   Kernel     out-of-place: eval(at) -> value
//   MapKernel  in-place:     map(at, old) -> new
//
// `Mapped` turns any MapKernel into a Kernel over a separate input buffer,
// so an in-place kernel body is written once and serves both forms.

use crate::buffer::{Element, FlatBuffer};
use crate::domain::Coord;

/// An out-of-place, per-coordinate computation.
pub trait Kernel: Sync {
    /// The value produced at one coordinate (a tuple for multi-output kernels).
    type Output: Copy + Send;

    /// Task name, used in logs and errors.
    fn name(&self) -> &str;

    /// Shapes `(rows, cols)` of the input buffers, checked against the
    /// domain before dispatch.
    fn input_shapes(&self) -> Vec<(usize, usize)> {
        Vec::new()
    }

    /// Compute the output for coordinate `at`.
    fn eval(&self, at: Coord) -> Self::Output;
}

/// An in-place, per-coordinate update.
pub trait MapKernel: Sync {
    type Value: Element;

    fn name(&self) -> &str;

    /// Compute the new value at `at` from the value currently stored there.
    fn map(&self, at: Coord, value: Self::Value) -> Self::Value;
}

/// Adapter running a MapKernel out-of-place, reading from `input`.
pub struct Mapped<'a, K: MapKernel> {
    kernel: &'a K,
    input: &'a FlatBuffer<K::Value>,
}

impl<'a, K: MapKernel> Mapped<'a, K> {
    pub fn new(kernel: &'a K, input: &'a FlatBuffer<K::Value>) -> Self {
        Mapped { kernel, input }
    }
}

impl<K: MapKernel> Kernel for Mapped<'_, K> {
    type Output = K::Value;

    fn name(&self) -> &str {
        self.kernel.name()
    }

    fn input_shapes(&self) -> Vec<(usize, usize)> {
        vec![(self.input.rows(), self.input.cols())]
    }

    #[inline]
    fn eval(&self, at: Coord) -> K::Value {
        self.kernel.map(at, self.input.get(at.row, at.col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AddRow;

    impl MapKernel for AddRow {
        type Value = u32;

        fn name(&self) -> &str {
            "add_row"
        }

        fn map(&self, at: Coord, value: u32) -> u32 {
            value + at.row as u32
        }
    }

    #[test]
    fn test_mapped_reads_input_at_coordinate() {
        let input = FlatBuffer::from_vec(2, 2, vec![10u32, 20, 30, 40]);
        let k = Mapped::new(&AddRow, &input);
        assert_eq!(k.name(), "add_row");
        assert_eq!(k.input_shapes(), vec![(2, 2)]);
        assert_eq!(k.eval(Coord::new(0, 1)), 20);
        assert_eq!(k.eval(Coord::new(1, 0)), 31);
    }
}

// sink.rs — Output slices that strategies can split across workers.
//
// A strategy never shares one `&mut` buffer between threads. Instead it
// splits the output into disjoint chunks (`split`), hands each chunk to a
// worker, and the worker stores values at chunk-local offsets. Disjointness
// is proven by the borrow checker, so no locks are needed to keep concurrent
// coordinates from writing over each other.
//
// Kernels with several outputs (julia: hue + brightness, dft: real + imag)
// use a tuple sink. Both halves are split at the same offset, so element i
// of every output buffer always travels together.
//
// NEW RUST CONCEPTS:
// - Implementing a local trait for a foreign type (`&'a mut [T]`).
// - Fully-qualified calls (`<[T]>::len(self)`) to reach the inherent slice
//   method instead of recursing into the trait method of the same shape.

use crate::buffer::Element;
use crate::error::{Error, Result};

/// A splittable destination for per-coordinate kernel results.
pub trait Sink: Send + Sized {
    /// The value stored at one coordinate.
    type Value: Copy + Send;

    /// Number of coordinates this sink covers.
    fn extent(&self) -> usize;

    /// Check every underlying buffer against the domain size.
    fn check_len(&self, expected: usize) -> Result<()>;

    /// Split into `[0, mid)` and `[mid, extent)`.
    fn split(self, mid: usize) -> (Self, Self);

    fn store(&mut self, offset: usize, value: Self::Value);

    fn fetch(&self, offset: usize) -> Self::Value;
}

impl<'a, T: Element> Sink for &'a mut [T] {
    type Value = T;

    #[inline]
    fn extent(&self) -> usize {
        <[T]>::len(self)
    }

    fn check_len(&self, expected: usize) -> Result<()> {
        let actual = <[T]>::len(self);
        if actual != expected {
            return Err(Error::DomainMismatch { expected, actual });
        }
        Ok(())
    }

    #[inline]
    fn split(self, mid: usize) -> (Self, Self) {
        <[T]>::split_at_mut(self, mid)
    }

    #[inline]
    fn store(&mut self, offset: usize, value: T) {
        self[offset] = value;
    }

    #[inline]
    fn fetch(&self, offset: usize) -> T {
        self[offset]
    }
}

impl<A: Sink, B: Sink> Sink for (A, B) {
    type Value = (A::Value, B::Value);

    #[inline]
    fn extent(&self) -> usize {
        self.0.extent()
    }

    fn check_len(&self, expected: usize) -> Result<()> {
        self.0.check_len(expected)?;
        self.1.check_len(expected)
    }

    #[inline]
    fn split(self, mid: usize) -> (Self, Self) {
        let (a_lo, a_hi) = self.0.split(mid);
        let (b_lo, b_hi) = self.1.split(mid);
        ((a_lo, b_lo), (a_hi, b_hi))
    }

    #[inline]
    fn store(&mut self, offset: usize, value: Self::Value) {
        self.0.store(offset, value.0);
        self.1.store(offset, value.1);
    }

    #[inline]
    fn fetch(&self, offset: usize) -> Self::Value {
        (self.0.fetch(offset), self.1.fetch(offset))
    }
}

/// Cut a sink into consecutive chunks of `chunk` elements (the last may be
/// shorter), each tagged with its global base offset.
pub(crate) fn split_chunks<S: Sink>(mut sink: S, chunk: usize) -> Vec<(usize, S)> {
    let chunk = chunk.max(1);
    let mut out = Vec::with_capacity(sink.extent().div_ceil(chunk));
    let mut base = 0;
    while sink.extent() > chunk {
        let (head, tail) = sink.split(chunk);
        out.push((base, head));
        base += chunk;
        sink = tail;
    }
    out.push((base, sink));
    out
}

//! Seed order: Fisher-Yates over an injected random source.

use rand::Rng;

/// Source of uniformly chosen indices.
pub trait RandomSource {
    /// An index in `0..bound`. `bound` is always at least 1.
    fn next_index(&mut self, bound: usize) -> usize;
}

/// Adapts any `rand` generator (thread-local in production, seeded in tests).
#[derive(Clone, Debug)]
pub struct RngSource<R>(pub R);

impl RngSource<rand::rngs::ThreadRng> {
    pub fn thread() -> Self {
        RngSource(rand::thread_rng())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_index(&mut self, bound: usize) -> usize {
        self.0.gen_range(0..bound)
    }
}

/// Keeps the input order (every swap is with itself): seeding by registration order.
#[derive(Clone, Copy, Debug, Default)]
pub struct PreserveOrder;

impl RandomSource for PreserveOrder {
    fn next_index(&mut self, bound: usize) -> usize {
        bound - 1
    }
}

/// Uniformly random permutation of `items`. The input is left untouched.
pub fn shuffle<T: Clone>(items: &[T], source: &mut impl RandomSource) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = source.next_index(i + 1);
        out.swap(i, j);
    }
    out
}

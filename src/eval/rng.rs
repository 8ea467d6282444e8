use crate::Int;

pub type DefaultRng = rand::rngs::ThreadRng;

/// The source of randomness for an evaluation. Both methods count as a
/// single primitive draw; the evaluator charges its budget once per
/// call.
pub trait DiceRng {
    /// A uniform draw from `lo..=hi`. Callers guarantee `lo <= hi`.
    fn uniform_inclusive(&mut self, lo: Int, hi: Int) -> Int;

    /// A uniform draw from `options`, which is never empty.
    fn choose_one(&mut self, options: &[Int]) -> Int {
        let i = self.uniform_inclusive(0, options.len() as Int - 1);
        options[i as usize]
    }
}

impl<R: rand::Rng> DiceRng for R {
    fn uniform_inclusive(&mut self, lo: Int, hi: Int) -> Int {
        self.gen_range(lo..=hi)
    }
}

#[cfg(test)]
pub(crate) use testing::{CountingRng, ScriptedRng};

//! Three ways to compute the n-th Fibonacci number, with `fib(0) = 0` and
//! `fib(1) = 1`. They always agree; they differ only in how the loop is
//! written down.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use numseq_tailrec::tailrec;
use tracing::{debug, trace};

use crate::error::Error;

/// Keep a `(current, next)` pair and advance it `n` times.
#[must_use]
pub fn fib_iterative(n: u64) -> BigUint {
    debug!(n, "computing fibonacci iteratively");
    let mut cur = BigUint::zero();
    let mut nxt = BigUint::one();
    for _ in 0..n {
        let sum = &cur + &nxt;
        cur = std::mem::replace(&mut nxt, sum);
    }
    cur
}

/// The same pair update as [`fib_iterative`], as a fold over `0..=n`.
///
/// Starting one step early from `(1, 0)` lands on `(fib(n), fib(n + 1))`.
#[must_use]
pub fn fib_fold(n: u64) -> BigUint {
    debug!(n, "computing fibonacci by fold");
    (0..=n)
        .fold((BigUint::one(), BigUint::zero()), |(a, b), _| {
            let sum = &a + &b;
            (b, sum)
        })
        .0
}

tailrec! {
    /// Linear recursion carrying the pair as accumulators.
    ///
    /// The self-call in tail position is turned into a loop at compile time,
    /// so deep inputs do not exhaust the stack.
    #[must_use]
    pub fn fib_recursive(n: u64) -> BigUint {
        debug!(n, "computing fibonacci recursively");
        go(n, BigUint::zero(), BigUint::one())
    }

    fn go(n: u64, cur: BigUint, nxt: BigUint) -> BigUint {
        if n == 0 {
            cur
        } else {
            let sum = &cur + &nxt;
            go(n - 1, nxt, sum)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum FibStrategy {
    #[default]
    Iterative,
    Fold,
    Recursive,
}

impl FibStrategy {
    pub const ALL: [FibStrategy; 3] = [
        FibStrategy::Iterative,
        FibStrategy::Fold,
        FibStrategy::Recursive,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FibStrategy::Iterative => "iterative",
            FibStrategy::Fold => "fold",
            FibStrategy::Recursive => "recursive",
        }
    }

    #[must_use]
    pub fn compute(self, n: u64) -> BigUint {
        trace!(strategy = self.name(), n, "dispatching fibonacci");
        match self {
            FibStrategy::Iterative => fib_iterative(n),
            FibStrategy::Fold => fib_fold(n),
            FibStrategy::Recursive => fib_recursive(n),
        }
    }
}

impl fmt::Display for FibStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FibStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FibStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownStrategy {
                name: s.to_string(),
            })
    }
}

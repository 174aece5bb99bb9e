//! Factorial, Fibonacci and FizzBuzz, each written a few different ways.
//!
//! Every computation is a pure function of a single non-negative index.
//! Big results are [`BigUint`](num_bigint::BigUint) so nothing overflows.

pub mod error;
pub mod factorial;
pub mod fibonacci;
pub mod fizzbuzz;

pub use error::{parse_index, parse_length, Error, Result};
pub use factorial::{factorial, factorial_tail};
pub use fibonacci::{fib_fold, fib_iterative, fib_recursive, FibStrategy};
pub use fizzbuzz::{fizzbuzz, fizzbuzz_default, fizzbuzz_iter, FizzBuzz, DEFAULT_LEN};

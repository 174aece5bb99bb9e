use std::fmt;

use tracing::debug;

/// Length used when no length is given.
pub const DEFAULT_LEN: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FizzBuzz {
    Fizz,
    Buzz,
    FizzBuzz,
    Number(u64),
}

impl FizzBuzz {
    /// The element for the 1-based index `i`.
    pub fn classify(i: u64) -> FizzBuzz {
        match (i % 3 == 0, i % 5 == 0) {
            (true, true) => FizzBuzz::FizzBuzz,
            (true, false) => FizzBuzz::Fizz,
            (false, true) => FizzBuzz::Buzz,
            (false, false) => FizzBuzz::Number(i),
        }
    }
}

impl fmt::Display for FizzBuzz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FizzBuzz::Fizz => f.write_str("Fizz"),
            FizzBuzz::Buzz => f.write_str("Buzz"),
            FizzBuzz::FizzBuzz => f.write_str("FizzBuzz"),
            FizzBuzz::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Lazily yields the elements for `1..=n`.
pub fn fizzbuzz_iter(n: u64) -> impl Iterator<Item = FizzBuzz> {
    (1..=n).map(FizzBuzz::classify)
}

/// The first `n` elements. `n == 0` gives an empty sequence.
#[must_use]
pub fn fizzbuzz(n: u64) -> Vec<FizzBuzz> {
    debug!(n, "computing fizzbuzz");
    fizzbuzz_iter(n).collect()
}

#[must_use]
pub fn fizzbuzz_default() -> Vec<FizzBuzz> {
    fizzbuzz(DEFAULT_LEN)
}

#[cfg(test)]
mod tests {
    use super::FizzBuzz::{Buzz, Fizz, Number};
    use super::*;

    #[test]
    fn test_first_fifteen() {
        assert_eq!(
            fizzbuzz(15),
            vec![
                Number(1),
                Number(2),
                Fizz,
                Number(4),
                Buzz,
                Fizz,
                Number(7),
                Number(8),
                Fizz,
                Buzz,
                Number(11),
                Fizz,
                Number(13),
                Number(14),
                FizzBuzz::FizzBuzz,
            ]
        );
    }

    #[test]
    fn test_lengths() {
        assert!(fizzbuzz(0).is_empty());
        assert_eq!(fizzbuzz(1), vec![Number(1)]);
        assert_eq!(fizzbuzz_default().len(), 100);
        assert_eq!(fizzbuzz_iter(1_000).count(), 1_000);
    }

    #[test]
    fn test_residues_mod_15() {
        // every residue class repeats with period 15
        for i in 1..=300u64 {
            let expected = match i % 15 {
                0 => FizzBuzz::FizzBuzz,
                3 | 6 | 9 | 12 => Fizz,
                5 | 10 => Buzz,
                _ => Number(i),
            };
            assert_eq!(FizzBuzz::classify(i), expected, "i = {i}");
        }
    }

    #[test]
    fn test_display() {
        let rendered: Vec<String> = fizzbuzz(15).iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered.join(" "),
            "1 2 Fizz 4 Buzz Fizz 7 8 Fizz Buzz 11 Fizz 13 14 FizzBuzz"
        );
    }
}

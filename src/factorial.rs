use num_bigint::BigUint;
use num_traits::One;
use numseq_tailrec::tailrec;
use tracing::debug;

/// `n!`, multiplying `1..=n` into a running product.
///
/// ```
/// assert_eq!(numseq::factorial(10), num_bigint::BigUint::from(3_628_800u32));
/// ```
#[must_use]
pub fn factorial(n: u64) -> BigUint {
    debug!(n, "computing factorial");
    (1..=n).fold(BigUint::one(), |acc, i| acc * i)
}

tailrec! {
    /// `n!` written as accumulator-passing recursion. Runs in constant stack.
    #[must_use]
    pub fn factorial_tail(n: u64) -> BigUint {
        debug!(n, "computing factorial by tail recursion");
        fac(n, BigUint::one())
    }

    fn fac(n: u64, acc: BigUint) -> BigUint {
        if n > 1 {
            fac(n - 1, acc * n)
        } else {
            acc
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_cases() {
        assert_eq!(factorial(0), BigUint::one());
        assert_eq!(factorial(1), BigUint::one());
    }

    #[test]
    fn test_known_values() {
        assert_eq!(factorial(5), BigUint::from(120u32));
        assert_eq!(factorial(10), BigUint::from(3_628_800u32));
        assert_eq!(
            factorial(25).to_string(),
            "15511210043330985984000000"
        );
    }

    #[test]
    fn test_recurrence() {
        for n in 1..60u64 {
            assert_eq!(factorial(n), factorial(n - 1) * n, "n = {n}");
        }
    }

    #[test]
    fn test_tail_matches_iterative() {
        for n in 0..100u64 {
            assert_eq!(factorial_tail(n), factorial(n), "n = {n}");
        }
    }

    #[test]
    fn test_tail_deep_recursion() {
        let big = factorial_tail(10_000);
        assert_eq!(big, factorial(10_000));
    }

    #[test]
    fn test_beyond_u128() {
        // 35! no longer fits in a u128
        let f = factorial(35);
        assert!(f > BigUint::from(u128::MAX));
        assert_eq!(f.to_string(), "10333147966386144929666651337523200000000");
    }
}

//! # Oracle — Trial-Division Primality Test
//!
//! Deterministic primality test for `u64` candidates using a 6k±1 wheel.
//! Every prime above 3 is of the form 6k−1 or 6k+1, so after ruling out
//! divisibility by 2 and 3 the loop only tries divisors `i` and `i + 2` for
//! `i = 5, 11, 17, …`.
//!
//! The loop bound is written as `i <= n / i` rather than `i * i <= n`: the
//! square of a divisor near `2^32` overflows `u64`, while the quotient form
//! cannot. Cost is O(√n) divisions per candidate, which dominates total work
//! and grows with the candidate, so the upper end of a range is markedly more
//! expensive than the lower end.
//!
//! The function is pure and touches no shared state; workers call it
//! concurrently without any synchronization.

/// Returns true if `n` is prime.
pub fn is_prime(n: u64) -> bool {
    if n <= 1 {
        return false;
    }
    if n <= 3 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }

    let mut i: u64 = 5;
    while i <= n / i {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// Single-threaded scan of `[2, max_range]` in ascending order.
///
/// Baseline for checking the parallel engine: any strategy at any thread
/// count must return exactly this sequence.
pub fn sequential_primes(max_range: u64) -> Vec<u64> {
    if max_range < 2 {
        return Vec::new();
    }
    (2..=max_range).filter(|&n| is_prime(n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plain division by every integer below n, used only as a cross-check.
    fn naive_is_prime(n: u64) -> bool {
        n >= 2 && (2..n).take_while(|d| d * d <= n).all(|d| n % d != 0)
    }

    // ── Small Values ────────────────────────────────────────────────

    #[test]
    fn zero_and_one_are_not_prime() {
        assert!(!is_prime(0));
        assert!(!is_prime(1));
    }

    #[test]
    fn two_and_three_are_prime() {
        assert!(is_prime(2));
        assert!(is_prime(3));
    }

    #[test]
    fn first_primes_below_100() {
        let expected = vec![
            2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79,
            83, 89, 97,
        ];
        assert_eq!(sequential_primes(100), expected);
    }

    #[test]
    fn agrees_with_naive_division_up_to_5000() {
        for n in 0..5000u64 {
            assert_eq!(is_prime(n), naive_is_prime(n), "mismatch at {}", n);
        }
    }

    // ── Wheel Edge Cases ────────────────────────────────────────────

    /// Squares of 6k±1 primes are the first composites the wheel must catch
    /// on the `i` and `i + 2` branches respectively.
    #[test]
    fn squares_of_wheel_primes_are_composite() {
        for p in [5u64, 7, 11, 13, 17, 19, 23, 29, 31] {
            assert!(!is_prime(p * p), "{}^2 reported prime", p);
        }
        assert!(!is_prime(5 * 7));
        assert!(!is_prime(11 * 13));
    }

    // ── Overflow Safety ─────────────────────────────────────────────

    #[test]
    fn composites_near_u64_max() {
        // 2^64 - 1 = 3 * 5 * 17 * 257 * 641 * 65537 * 6700417
        assert!(!is_prime(u64::MAX));
        assert!(!is_prime(u64::MAX - 1));
    }

    #[test]
    fn square_of_16_bit_prime_is_composite() {
        let p: u64 = 65_521;
        assert!(is_prime(p));
        assert!(!is_prime(p * p));
        assert!(!is_prime(p * 65_519));
    }

    /// Near u64::MAX the divisor square would overflow. The quotient bound
    /// must still terminate and give the right answer.
    #[test]
    #[ignore] // ~7e8 trial divisions per call
    fn largest_primes_below_u64_max() {
        assert!(is_prime(18_446_744_073_709_551_557));
        let p: u64 = 4_294_967_291;
        assert!(!is_prime(p * p));
    }

    #[test]
    fn sequential_primes_boundaries() {
        assert!(sequential_primes(0).is_empty());
        assert!(sequential_primes(1).is_empty());
        assert_eq!(sequential_primes(2), vec![2]);
        assert_eq!(sequential_primes(3), vec![2, 3]);
        assert_eq!(sequential_primes(4), vec![2, 3]);
    }
}

// Exact two-sided binomial test
//
// Used to check whether a variation received its allocated share of a
// participant population. Probability mass comes from statrs in log space, so
// populations in the millions neither overflow the binomial coefficient nor
// underflow the individual terms.

use statrs::distribution::{Binomial, Discrete};

/// Relative tolerance when comparing outcome likelihoods, so that outcomes
/// equally likely as the observed one are not dropped to rounding error.
const RELATIVE_ERROR: f64 = 1.0 + 1e-7;

/// Log mass below which `exp` underflows to zero
const LN_MIN_MASS: f64 = -745.0;

/// Observed outcome of a binomial experiment and its null hypothesis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinomialTrials {
    pub successful_trials: i64,
    pub total_trials: i64,
    /// Success probability under the null hypothesis
    pub probability_of_success: f64,
}

/// Two-sided p-value of observing `successful_trials` out of `total_trials`
///
/// Sums the probability of every outcome of Binomial(`total_trials`,
/// `probability_of_success`) that is at most as likely as the observed one.
/// The sum walks outward from the mode on both sides and stops once the mass
/// underflows, so the cost grows with the standard deviation, not with
/// `total_trials`.
///
/// Degenerate inputs follow numeric conventions instead of failing:
/// - probability outside `[0, 1]` (including NaN) → NaN
/// - negative counts or more successes than trials → NaN
/// - zero trials → 1
/// - probability 0 or 1 → 1 if the outcome is the only possible one, else 0
///
/// # Example
/// ```
/// use experiment_health::health::{binomial_prob_value, BinomialTrials};
///
/// let p = binomial_prob_value(BinomialTrials {
///     successful_trials: 0,
///     total_trials: 10,
///     probability_of_success: 0.5,
/// });
/// assert!((p - 2.0 / 1024.0).abs() < 1e-12);
/// ```
pub fn binomial_prob_value(trials: BinomialTrials) -> f64 {
    let BinomialTrials {
        successful_trials: k,
        total_trials: n,
        probability_of_success: p,
    } = trials;

    if !(0.0..=1.0).contains(&p) || k < 0 || n < 0 || k > n {
        return f64::NAN;
    }
    if n == 0 {
        return 1.0;
    }
    if p == 0.0 {
        return if k == 0 { 1.0 } else { 0.0 };
    }
    if p == 1.0 {
        return if k == n { 1.0 } else { 0.0 };
    }

    let (k, n) = (k as u64, n as u64);
    let Ok(distribution) = Binomial::new(p, n) else {
        return f64::NAN;
    };

    let ln_threshold = distribution.ln_pmf(k) + RELATIVE_ERROR.ln();
    let mode = (((n + 1) as f64 * p).floor() as u64).min(n);

    let tail = tail_mass(&distribution, ln_threshold, (0..=mode).rev())
        + tail_mass(&distribution, ln_threshold, mode + 1..=n);

    tail.min(1.0)
}

// Mass decreases monotonically along `outcomes` (away from the mode), so
// everything past the first underflowing term is zero as well.
fn tail_mass(
    distribution: &Binomial,
    ln_threshold: f64,
    outcomes: impl Iterator<Item = u64>,
) -> f64 {
    let mut mass = 0.0;
    for outcome in outcomes {
        let ln_mass = distribution.ln_pmf(outcome);
        if ln_mass < LN_MIN_MASS {
            break;
        }
        if ln_mass <= ln_threshold {
            mass += ln_mass.exp();
        }
    }
    mass
}

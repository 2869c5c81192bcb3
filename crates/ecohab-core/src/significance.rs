//! One-sided exact binomial test on following versus avoiding counts.

use crate::error::{EcohabError, Result};
use serde::{Deserialize, Serialize};

/// `P(X >= k)` for `X ~ Binomial(n, p)`.
///
/// Terms are summed in log space so large `n` neither overflows the
/// binomial coefficient nor underflows `p^j`.
pub fn binomial_survival(k: u64, n: u64, p: f64) -> f64 {
    if k == 0 {
        return 1.0;
    }
    if k > n {
        return 0.0;
    }
    if p <= 0.0 {
        return 0.0;
    }
    if p >= 1.0 {
        return 1.0;
    }

    let ln_fact = ln_factorials(n);
    let (ln_p, ln_q) = (p.ln(), (1.0 - p).ln());
    let terms: Vec<f64> = (k..=n)
        .map(|j| {
            let (j_, n_) = (j as usize, n as usize);
            ln_fact[n_] - ln_fact[j_] - ln_fact[n_ - j_] + j as f64 * ln_p + (n - j) as f64 * ln_q
        })
        .collect();

    let max = terms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let sum: f64 = terms.iter().map(|t| (t - max).exp()).sum();
    (max + sum.ln()).exp().min(1.0)
}

fn ln_factorials(n: u64) -> Vec<f64> {
    let mut out = Vec::with_capacity(n as usize + 1);
    out.push(0.0);
    let mut acc = 0.0;
    for i in 1..=n {
        acc += (i as f64).ln();
        out.push(acc);
    }
    out
}

/// Round half away from zero to three decimals.
pub fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// How a significant result is turned into a number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreConvention {
    /// Magnitude `1 - p`: stronger evidence gives a larger magnitude.
    #[default]
    Confidence,
    /// Magnitude `p`, matching historical outputs. Very small p-values round
    /// to zero and become indistinguishable from "not significant".
    LegacyPValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Following,
    Avoiding,
    NotSignificant,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignificanceResult {
    pub followed: u64,
    pub avoided: u64,
    /// `P(X >= followed)` under the null.
    pub pf: f64,
    /// `P(X >= avoided)` under the null.
    pub pa: f64,
    pub verdict: Verdict,
    /// Signed score: positive for following, negative for avoiding, 0 otherwise.
    pub score: f64,
}

/// Decides whether a pair's counts depart from a fair coin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificanceTester {
    pub alpha: f64,
    #[serde(default)]
    pub convention: ScoreConvention,
}

impl Default for SignificanceTester {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            convention: ScoreConvention::default(),
        }
    }
}

impl SignificanceTester {
    /// Success probability under the null hypothesis.
    pub const NULL_P: f64 = 0.5;

    pub fn new(alpha: f64, convention: ScoreConvention) -> Result<Self> {
        let tester = Self { alpha, convention };
        tester.validate()?;
        Ok(tester)
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_convention(mut self, convention: ScoreConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.alpha > 0.0 && self.alpha < 1.0 {
            Ok(())
        } else {
            Err(EcohabError::out_of_range("alpha", 0.0, 1.0, self.alpha))
        }
    }

    pub fn test(&self, followed: u64, avoided: u64) -> SignificanceResult {
        let n = followed + avoided;
        let pf = binomial_survival(followed, n, Self::NULL_P);
        let pa = binomial_survival(avoided, n, Self::NULL_P);

        let (verdict, p, sign) = if pf < pa && pf < self.alpha {
            (Verdict::Following, pf, 1.0)
        } else if pa < pf && pa < self.alpha {
            (Verdict::Avoiding, pa, -1.0)
        } else {
            (Verdict::NotSignificant, 0.0, 0.0)
        };

        let score = match verdict {
            Verdict::NotSignificant => 0.0,
            _ => match self.convention {
                ScoreConvention::Confidence => sign * round3(1.0 - p),
                ScoreConvention::LegacyPValue => sign * round3(p),
            },
        };

        SignificanceResult {
            followed,
            avoided,
            pf,
            pa,
            verdict,
            score,
        }
    }

    /// Signed score only.
    pub fn score(&self, followed: u64, avoided: u64) -> f64 {
        self.test(followed, avoided).score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn survival_known_values() {
        assert_relative_eq!(binomial_survival(0, 10, 0.5), 1.0);
        assert_relative_eq!(binomial_survival(3, 3, 0.5), 0.125);
        assert_relative_eq!(binomial_survival(9, 10, 0.5), 11.0 / 1024.0, epsilon = 1e-12);
        assert_relative_eq!(binomial_survival(1, 10, 0.5), 1023.0 / 1024.0, epsilon = 1e-12);
        assert_eq!(binomial_survival(11, 10, 0.5), 0.0);
    }

    #[test]
    fn survival_stays_finite_for_large_n() {
        let p = binomial_survival(2500, 5000, 0.5);
        assert!(p.is_finite());
        assert!(p > 0.5 && p < 0.6);
        let tail = binomial_survival(4000, 5000, 0.5);
        assert!(tail >= 0.0 && tail < 1e-100);
    }

    #[test]
    fn nine_to_one_is_following() {
        let result = SignificanceTester::default().test(9, 1);
        assert_eq!(result.verdict, Verdict::Following);
        assert_relative_eq!(result.score, 0.989);
    }

    #[test]
    fn one_to_nine_is_avoiding() {
        let result = SignificanceTester::default().test(1, 9);
        assert_eq!(result.verdict, Verdict::Avoiding);
        assert_relative_eq!(result.score, -0.989);
    }

    #[test]
    fn balanced_counts_are_not_significant() {
        let tester = SignificanceTester::default();
        assert_eq!(tester.score(5, 5), 0.0);
        assert_eq!(tester.score(0, 0), 0.0);
        assert_eq!(tester.test(6, 4).verdict, Verdict::NotSignificant);
    }

    #[test]
    fn legacy_convention_reports_p_value() {
        let tester = SignificanceTester::default().with_convention(ScoreConvention::LegacyPValue);
        assert_relative_eq!(tester.score(9, 1), 0.011);
        assert_relative_eq!(tester.score(1, 9), -0.011);
    }

    #[test]
    fn alpha_is_respected() {
        let strict = SignificanceTester::default().with_alpha(0.01);
        assert_eq!(strict.score(9, 1), 0.0);
        assert!(SignificanceTester::new(1.5, ScoreConvention::Confidence).is_err());
        assert!(SignificanceTester::new(0.0, ScoreConvention::Confidence).is_err());
    }

    #[test]
    fn rounding() {
        assert_eq!(round3(0.0107421875), 0.011);
        assert_eq!(round3(0.9892578125), 0.989);
    }
}

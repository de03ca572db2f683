//! Column scalers for the feature matrix.
//!
//! Scalers are refit from scratch on the full catalog at every similarity
//! query, so results are deterministic for a fixed table and there is no
//! incremental state to invalidate when the table changes.

/// Z-score standardization (zero mean, unit variance, population variance).
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: f32,
    std: f32,
}

impl StandardScaler {
    /// Fit over the present values of a column.
    pub fn fit(values: &[f32]) -> Self {
        if values.is_empty() {
            return Self { mean: 0.0, std: 0.0 };
        }
        let n = values.len() as f32;
        let mean = values.iter().sum::<f32>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
        Self {
            mean,
            std: variance.sqrt(),
        }
    }

    /// Transform one value; constant columns map to 0.0.
    pub fn transform(&self, value: f32) -> f32 {
        if self.std > 0.0 {
            (value - self.mean) / self.std
        } else {
            0.0
        }
    }
}

/// Probabilities are clipped away from 0 and 1 before the probit map.
const P_CLIP: f64 = 1e-7;

/// Maps a column onto a normal output distribution through its empirical
/// CDF. Used for the heavy-tailed member counts, where a plain z-score
/// would let a handful of mega-popular titles dominate the column.
#[derive(Debug, Clone)]
pub struct QuantileNormalScaler {
    sorted: Vec<f32>,
}

impl QuantileNormalScaler {
    pub fn fit(values: &[f32]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Self { sorted }
    }

    pub fn transform(&self, value: f32) -> f32 {
        let n = self.sorted.len();
        if n < 2 {
            return 0.0;
        }
        // Mid-rank empirical CDF; ties share their average rank.
        let below = self.sorted.partition_point(|&x| x < value);
        let at_or_below = self.sorted.partition_point(|&x| x <= value);
        let rank = (below + at_or_below) as f64 / 2.0;
        let p = (rank / n as f64).clamp(P_CLIP, 1.0 - P_CLIP);
        probit(p) as f32
    }
}

/// Inverse of the standard normal CDF.
///
/// Acklam's rational approximation; relative error stays below 1.2e-9
/// across the open unit interval, far tighter than the feature columns need.
pub fn probit(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969683028665376e+01,
        2.209460984245205e+02,
        -2.759285104469687e+02,
        1.383577518672690e+02,
        -3.066479806614716e+01,
        2.506628277459239e+00,
    ];
    const B: [f64; 5] = [
        -5.447609879822406e+01,
        1.615858368580409e+02,
        -1.556989798598866e+02,
        6.680131188771972e+01,
        -1.328068155288572e+01,
    ];
    const C: [f64; 6] = [
        -7.784894002430293e-03,
        -3.223964580411365e-01,
        -2.400758277161838e+00,
        -2.549732539343734e+00,
        4.374664141464968e+00,
        2.938163982698783e+00,
    ];
    const D: [f64; 4] = [
        7.784695709041462e-03,
        3.224671290700398e-01,
        2.445134137142996e+00,
        3.754408661907416e+00,
    ];
    const P_LOW: f64 = 0.02425;

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

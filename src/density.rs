// 🌡️ Kernel Density - 2-D Gaussian KDE with Scott's bandwidth
// Evaluated at the input points themselves, then min-max normalized to [0, 1]

use serde::Serialize;

/// Below this many points no density is computed
pub const MIN_DENSITY_POINTS: usize = 11;

/// Added to the covariance diagonal when the sample covariance is singular
/// (all points identical or collinear)
const SINGULAR_RIDGE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityEstimate {
    /// Raw density at each input point
    pub values: Vec<f64>,
    /// `values` rescaled to [0, 1]; all zeros when every value is equal
    pub normalized: Vec<f64>,
}

/// Bivariate Gaussian KDE
#[derive(Debug, Clone)]
pub struct GaussianKde2d {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Inverse of the kernel covariance, row-major [a, b, c, d]
    inv_cov: [f64; 4],
    /// 1 / (n * sqrt(det(2π Σ)))
    norm: f64,
}

impl GaussianKde2d {
    /// Fit to the given points. Needs at least two points; `None` otherwise.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let n = xs.len().min(ys.len());
        if n < 2 {
            return None;
        }
        let (xs, ys) = (&xs[..n], &ys[..n]);

        let factor = scott_factor(n);
        let [sxx, sxy, syy] = sample_covariance(xs, ys);
        let f2 = factor * factor;
        let (mut a, b, mut d) = (sxx * f2, sxy * f2, syy * f2);

        let mut det = a * d - b * b;
        if det <= 0.0 || !det.is_finite() {
            let ridge = SINGULAR_RIDGE.max((a + d).abs() * 1e-9);
            a += ridge;
            d += ridge;
            det = a * d - b * b;
            log::debug!("KDE covariance singular; applied ridge {ridge:e}");
        }
        if det <= 0.0 || !det.is_finite() {
            return None;
        }

        let inv_cov = [d / det, -b / det, -b / det, a / det];
        let two_pi = 2.0 * std::f64::consts::PI;
        let norm = 1.0 / (n as f64 * (two_pi * two_pi * det).sqrt());

        Some(GaussianKde2d {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            inv_cov,
            norm,
        })
    }

    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        let [ia, ib, ic, id] = self.inv_cov;
        let sum: f64 = self
            .xs
            .iter()
            .zip(&self.ys)
            .map(|(xi, yi)| {
                let (dx, dy) = (x - xi, y - yi);
                let mahalanobis = dx * (ia * dx + ib * dy) + dy * (ic * dx + id * dy);
                (-0.5 * mahalanobis).exp()
            })
            .sum();
        sum * self.norm
    }
}

/// Scott's rule for d = 2: n^(-1/(d+4))
pub fn scott_factor(n: usize) -> f64 {
    (n as f64).powf(-1.0 / 6.0)
}

/// Unbiased (n - 1) covariance: [var_x, cov_xy, var_y]
fn sample_covariance(xs: &[f64], ys: &[f64]) -> [f64; 3] {
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    let ddof = n - 1.0;
    [sxx / ddof, sxy / ddof, syy / ddof]
}

/// Min-max scale to [0, 1]; a constant input maps to all zeros
pub fn normalize_min_max(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max > min {
        values.iter().map(|v| (v - min) / (max - min)).collect()
    } else {
        vec![0.0; values.len()]
    }
}

/// Density of each point among all points (longitude as x, latitude as y).
/// Returns `None` below `MIN_DENSITY_POINTS`; callers fall back to plain markers.
pub fn estimate_density(xs: &[f64], ys: &[f64]) -> Option<DensityEstimate> {
    if xs.len() < MIN_DENSITY_POINTS || ys.len() < MIN_DENSITY_POINTS {
        log::debug!("Skipping KDE: only {} points", xs.len().min(ys.len()));
        return None;
    }

    let Some(kde) = GaussianKde2d::fit(xs, ys) else {
        log::warn!("KDE calculation failed for {} points", xs.len());
        return None;
    };

    let values: Vec<f64> = xs.iter().zip(ys).map(|(x, y)| kde.evaluate(*x, *y)).collect();
    let normalized = normalize_min_max(&values);
    Some(DensityEstimate { values, normalized })
}

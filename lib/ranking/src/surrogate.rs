//! Gradient-boosted regression surrogate
//!
//! Squared-loss boosting over depth-1 regression trees (stumps). Small and
//! exact: every round scans every split point of every feature.

use nutrank_core::{Error, Result};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingConfig {
    pub n_rounds: usize,
    pub learning_rate: f64,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            learning_rate: 0.1,
        }
    }
}

/// `x[feature] <= threshold ? left : right`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stump {
    pub feature: usize,
    pub threshold: f64,
    pub left: f64,
    pub right: f64,
}

impl Stump {
    #[inline]
    pub fn predict(&self, x: &[f64]) -> f64 {
        if x[self.feature] <= self.threshold {
            self.left
        } else {
            self.right
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedRegressor {
    base: f64,
    learning_rate: f64,
    stumps: Vec<Stump>,
    n_features: usize,
}

impl GradientBoostedRegressor {
    /// Fit on `features` (one row per sample) against `targets`.
    ///
    /// Stops early once no split reduces the residual error.
    pub fn fit(features: &[Vec<f64>], targets: &[f64], config: BoostingConfig) -> Result<Self> {
        if features.is_empty() {
            return Err(Error::InvalidUserInput("cannot fit a surrogate on zero samples".to_string()));
        }
        if features.len() != targets.len() {
            return Err(Error::InvalidDimension {
                expected: features.len(),
                actual: targets.len(),
            });
        }
        let n_features = features[0].len();
        if let Some(row) = features.iter().find(|r| r.len() != n_features) {
            return Err(Error::InvalidDimension {
                expected: n_features,
                actual: row.len(),
            });
        }

        let n = targets.len() as f64;
        let base = targets.iter().sum::<f64>() / n;
        let mut predictions = vec![base; targets.len()];
        let mut stumps = Vec::with_capacity(config.n_rounds);

        // Sample order per feature never changes across rounds
        let orders: Vec<Vec<usize>> = (0..n_features)
            .map(|f| {
                let mut order: Vec<usize> = (0..features.len()).collect();
                order.sort_by_key(|&i| OrderedFloat(features[i][f]));
                order
            })
            .collect();

        for _ in 0..config.n_rounds {
            let residuals: Vec<f64> = targets
                .iter()
                .zip(&predictions)
                .map(|(y, p)| y - p)
                .collect();

            let stump = match best_stump(features, &residuals, &orders) {
                Some(stump) => stump,
                None => break,
            };

            for (p, x) in predictions.iter_mut().zip(features) {
                *p += config.learning_rate * stump.predict(x);
            }
            stumps.push(stump);
        }

        Ok(Self {
            base,
            learning_rate: config.learning_rate,
            stumps,
            n_features,
        })
    }

    pub fn predict(&self, x: &[f64]) -> Result<f64> {
        if x.len() != self.n_features {
            return Err(Error::InvalidDimension {
                expected: self.n_features,
                actual: x.len(),
            });
        }
        Ok(self.base
            + self.learning_rate * self.stumps.iter().map(|s| s.predict(x)).sum::<f64>())
    }

    pub fn stumps(&self) -> &[Stump] {
        &self.stumps
    }

    /// Mean squared error over a sample set
    pub fn mse(&self, features: &[Vec<f64>], targets: &[f64]) -> Result<f64> {
        if targets.is_empty() {
            return Ok(0.0);
        }
        let mut total = 0.0;
        for (x, y) in features.iter().zip(targets) {
            total += (self.predict(x)? - y).powi(2);
        }
        Ok(total / targets.len() as f64)
    }
}

/// Split minimizing the squared error of the residuals, if any improves on
/// predicting their mean.
fn best_stump(features: &[Vec<f64>], residuals: &[f64], orders: &[Vec<usize>]) -> Option<Stump> {
    let n = residuals.len();
    let total: f64 = residuals.iter().sum();
    // Minimizing SSE is maximizing sum_l^2/n_l + sum_r^2/n_r
    let baseline = total * total / n as f64;
    let mut best: Option<(f64, Stump)> = None;

    for (feature, order) in orders.iter().enumerate() {
        let mut left_sum = 0.0;
        for split in 1..n {
            let prev = order[split - 1];
            left_sum += residuals[prev];

            let lo = features[prev][feature];
            let hi = features[order[split]][feature];
            if lo == hi {
                continue;
            }

            let n_left = split as f64;
            let n_right = (n - split) as f64;
            let right_sum = total - left_sum;
            let gain = left_sum * left_sum / n_left + right_sum * right_sum / n_right;

            if gain > baseline + 1e-12 && best.as_ref().map_or(true, |(g, _)| gain > *g) {
                best = Some((
                    gain,
                    Stump {
                        feature,
                        threshold: (lo + hi) / 2.0,
                        left: left_sum / n_left,
                        right: right_sum / n_right,
                    },
                ));
            }
        }
    }

    best.map(|(_, stump)| stump)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fits_step_function() {
        let features: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..10).map(|i| if i < 5 { -1.0 } else { 1.0 }).collect();

        let model = GradientBoostedRegressor::fit(&features, &targets, BoostingConfig::default()).unwrap();
        assert_eq!(model.stumps()[0].threshold, 4.5);
        // 100 rounds at rate 0.1 close all but 0.9^100 of the gap
        assert!(model.predict(&[0.0]).unwrap() < -0.99);
        assert!(model.predict(&[9.0]).unwrap() > 0.99);
    }

    #[test]
    fn test_boosting_reduces_error() {
        let features: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![i as f64, ((i * 7) % 5) as f64])
            .collect();
        let targets: Vec<f64> = features.iter().map(|x| 0.5 * x[0] - x[1]).collect();
        let mean = targets.iter().sum::<f64>() / targets.len() as f64;
        let baseline = targets.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / targets.len() as f64;

        let model = GradientBoostedRegressor::fit(&features, &targets, BoostingConfig::default()).unwrap();
        assert!(model.mse(&features, &targets).unwrap() < baseline * 0.25);
    }

    #[test]
    fn test_constant_features_predict_mean() {
        let features = vec![vec![1.0], vec![1.0], vec![1.0]];
        let targets = vec![1.0, 2.0, 6.0];
        let model = GradientBoostedRegressor::fit(&features, &targets, BoostingConfig::default()).unwrap();
        assert!(model.stumps().is_empty());
        assert!((model.predict(&[1.0]).unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_feature_rows() {
        let features = vec![vec![], vec![]];
        let model = GradientBoostedRegressor::fit(&features, &[2.0, 4.0], BoostingConfig::default()).unwrap();
        assert_eq!(model.predict(&[]).unwrap(), 3.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(GradientBoostedRegressor::fit(&[], &[], BoostingConfig::default()).is_err());
        assert!(GradientBoostedRegressor::fit(&[vec![1.0]], &[1.0, 2.0], BoostingConfig::default()).is_err());
        assert!(GradientBoostedRegressor::fit(&[vec![1.0], vec![1.0, 2.0]], &[1.0, 2.0], BoostingConfig::default()).is_err());
    }
}

//! Population statistics and standardization
//!
//! Mean and standard deviation per nutrient, fit once over the full reference
//! population. Both the ranker and the synthesizer normalize against these so
//! scores stay comparable regardless of which candidates survive filtering.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Per-nutrient mean and population standard deviation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PopulationStats {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl PopulationStats {
    /// Fit over rows of equal length. Uses the population (ddof = 0) deviation.
    pub fn fit<'a, I>(rows: I, dim: usize) -> Result<Self>
    where
        I: IntoIterator<Item = &'a [f64]>,
    {
        // Welford accumulation
        let mut count = 0usize;
        let mut means = vec![0.0f64; dim];
        let mut m2 = vec![0.0f64; dim];

        for row in rows {
            if row.len() != dim {
                return Err(Error::InvalidDimension { expected: dim, actual: row.len() });
            }
            count += 1;
            let n = count as f64;
            for (i, x) in row.iter().enumerate() {
                let delta = x - means[i];
                means[i] += delta / n;
                m2[i] += delta * (x - means[i]);
            }
        }

        if count == 0 {
            return Err(Error::ReferenceData(
                "cannot fit population statistics over an empty dataset".to_string(),
            ));
        }

        let n = count as f64;
        let stds = m2.iter().map(|m| (m / n).max(0.0).sqrt()).collect();

        Ok(Self { means, stds })
    }

    pub fn from_parts(means: Vec<f64>, stds: Vec<f64>) -> Result<Self> {
        if means.len() != stds.len() {
            return Err(Error::InvalidDimension { expected: means.len(), actual: stds.len() });
        }
        Ok(Self { means, stds })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.means.len()
    }

    #[inline]
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    #[inline]
    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    /// Divisor used for a component; zero-variance nutrients scale by 1.
    #[inline]
    fn scale(&self, i: usize) -> f64 {
        let std = self.stds[i];
        if std > f64::EPSILON {
            std
        } else {
            1.0
        }
    }

    /// Z-score a raw nutrient vector
    pub fn normalize(&self, raw: &[f64]) -> Result<Vec<f64>> {
        self.check(raw.len())?;
        Ok(raw
            .iter()
            .enumerate()
            .map(|(i, x)| (x - self.means[i]) / self.scale(i))
            .collect())
    }

    /// Map a standardized vector back to raw nutrient units
    pub fn denormalize(&self, standardized: &[f64]) -> Result<Vec<f64>> {
        self.check(standardized.len())?;
        Ok(standardized
            .iter()
            .enumerate()
            .map(|(i, z)| z * self.scale(i) + self.means[i])
            .collect())
    }

    #[inline]
    fn check(&self, actual: usize) -> Result<()> {
        if actual != self.means.len() {
            return Err(Error::InvalidDimension { expected: self.means.len(), actual });
        }
        Ok(())
    }
}

/// Element-wise `max(0, x)`: below-average components become neutral.
pub fn rectify(values: &mut [f64]) {
    for v in values {
        if *v < 0.0 {
            *v = 0.0;
        }
    }
}

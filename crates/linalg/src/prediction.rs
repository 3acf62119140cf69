use linfa::Float;
use ndarray::{Array1, Zip};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Posterior predictive mean and variance aligned index for index
/// with the evaluation points given to the model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Prediction<F: Float> {
    /// Predictive means
    pub mean: Array1<F>,
    /// Predictive variances
    pub variance: Array1<F>,
}

impl<F: Float> Prediction<F> {
    /// Number of evaluation points
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// Whether there is no evaluation point
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Predictive standard deviations
    pub fn std_dev(&self) -> Array1<F> {
        self.variance.mapv(|v| v.sqrt())
    }
}

/// Probability mass of a credible band
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum CredibleLevel {
    /// 90% credible band
    P90,
    /// 95% credible band
    #[default]
    P95,
    /// 99% credible band
    P99,
}

impl CredibleLevel {
    /// Standard normal quantile giving the band half-width in standard deviations
    pub fn z(&self) -> f64 {
        match self {
            CredibleLevel::P90 => 1.645,
            CredibleLevel::P95 => 1.96,
            CredibleLevel::P99 => 2.576,
        }
    }

    /// Level from a probability (0.90, 0.95 or 0.99), any other value gives 95%.
    pub fn from_probability(p: f64) -> Self {
        const TOL: f64 = 1e-9;
        if (p - 0.90).abs() < TOL {
            CredibleLevel::P90
        } else if (p - 0.99).abs() < TOL {
            CredibleLevel::P99
        } else {
            CredibleLevel::P95
        }
    }

    /// Probability mass
    pub fn probability(&self) -> f64 {
        match self {
            CredibleLevel::P90 => 0.90,
            CredibleLevel::P95 => 0.95,
            CredibleLevel::P99 => 0.99,
        }
    }
}

/// Lower and upper bounds of a credible band around the predictive mean
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct CredibleBand<F: Float> {
    /// `mean - z.std`
    pub lower: Array1<F>,
    /// Predictive means
    pub mean: Array1<F>,
    /// `mean + z.std`
    pub upper: Array1<F>,
}

impl<F: Float> CredibleBand<F> {
    /// Band `mean +/- z.sqrt(variance)` at the given level
    pub fn from_prediction(pred: &Prediction<F>, level: CredibleLevel) -> Self {
        let z = F::cast(level.z());
        let mut lower = Array1::zeros(pred.len());
        let mut upper = Array1::zeros(pred.len());
        Zip::from(&mut lower)
            .and(&mut upper)
            .and(&pred.mean)
            .and(&pred.variance)
            .for_each(|lo, up, &m, &v| {
                let half = z * v.max(F::zero()).sqrt();
                *lo = m - half;
                *up = m + half;
            });
        CredibleBand {
            lower,
            mean: pred.mean.to_owned(),
            upper,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_levels() {
        assert_eq!(CredibleLevel::from_probability(0.90), CredibleLevel::P90);
        assert_eq!(CredibleLevel::from_probability(0.95), CredibleLevel::P95);
        assert_eq!(CredibleLevel::from_probability(0.99), CredibleLevel::P99);
        assert_eq!(CredibleLevel::from_probability(0.5), CredibleLevel::P95);
        assert_eq!(CredibleLevel::default().z(), 1.96);
        assert_eq!(CredibleLevel::P99.probability(), 0.99);
    }

    #[test]
    fn test_band_from_prediction() {
        let pred = Prediction {
            mean: array![0., 1., -2.],
            variance: array![1., 4., 0.],
        };
        let band = CredibleBand::from_prediction(&pred, CredibleLevel::P90);
        assert_abs_diff_eq!(band.lower, array![-1.645, 1. - 3.29, -2.], epsilon = 1e-12);
        assert_abs_diff_eq!(band.upper, array![1.645, 1. + 3.29, -2.], epsilon = 1e-12);
        assert_eq!(band.mean, pred.mean);
        assert_abs_diff_eq!(pred.std_dev(), array![1., 2., 0.], epsilon = 1e-12);
    }
}

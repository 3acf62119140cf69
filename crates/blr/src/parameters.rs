use crate::errors::{BlrError, Result};
use crate::{BLR_DEFAULT_NOISE_VARIANCE, BLR_DEFAULT_PRIOR_VARIANCE};
use linfa::{Float, ParamGuard};
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, Ix2};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// A set of validated bayesian linear regression parameters.
///
/// Parameters vector is `[intercept, slope]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct BlrValidParams<F: Float> {
    /// Prior mean of `[intercept, slope]`
    pub(crate) prior_mean: Array1<F>,
    /// Prior (2, 2) covariance of `[intercept, slope]`
    pub(crate) prior_cov: Array2<F>,
    /// Known variance of the gaussian observation noise
    pub(crate) noise_variance: F,
}

impl<F: Float> Default for BlrValidParams<F> {
    fn default() -> BlrValidParams<F> {
        BlrValidParams {
            prior_mean: Array1::zeros(2),
            prior_cov: Array2::eye(2).mapv(|v: F| v * F::cast(BLR_DEFAULT_PRIOR_VARIANCE)),
            noise_variance: F::cast(BLR_DEFAULT_NOISE_VARIANCE),
        }
    }
}

impl<F: Float> BlrValidParams<F> {
    /// Get prior mean `[intercept, slope]`
    pub fn prior_mean(&self) -> &Array1<F> {
        &self.prior_mean
    }

    /// Get prior covariance
    pub fn prior_cov(&self) -> &Array2<F> {
        &self.prior_cov
    }

    /// Get observation noise variance
    pub fn noise_variance(&self) -> F {
        self.noise_variance
    }
}

#[derive(Clone, Debug, Default)]
/// The set of hyperparameters that can be specified for the execution of
/// the [BLR algorithm](crate::BayesianLinearRegression).
pub struct BlrParams<F: Float>(BlrValidParams<F>);

impl<F: Float> BlrParams<F> {
    /// A constructor for parameters with a zero mean, unit variance prior
    pub fn new() -> BlrParams<F> {
        Self(BlrValidParams::default())
    }

    /// Set prior mean `[intercept, slope]`.
    pub fn prior_mean(mut self, prior_mean: Array1<F>) -> Self {
        self.0.prior_mean = prior_mean;
        self
    }

    /// Set prior (2, 2) covariance.
    pub fn prior_cov(mut self, prior_cov: Array2<F>) -> Self {
        self.0.prior_cov = prior_cov;
        self
    }

    /// Set observation noise variance.
    pub fn noise_variance(mut self, noise_variance: F) -> Self {
        self.0.noise_variance = noise_variance;
        self
    }
}

impl<F: Float> From<BlrValidParams<F>> for BlrParams<F> {
    fn from(valid: BlrValidParams<F>) -> Self {
        BlrParams(valid)
    }
}

/// Check prior shapes: 2-dim mean and symmetric (2, 2) covariance with finite values
pub(crate) fn check_prior<F: Float>(
    mean: &ArrayBase<impl Data<Elem = F>, Ix1>,
    cov: &ArrayBase<impl Data<Elem = F>, Ix2>,
) -> Result<()> {
    if mean.len() != 2 || cov.dim() != (2, 2) {
        return Err(BlrError::InvalidValueError(format!(
            "prior should be 2-dim [intercept, slope], got mean of length {} and covariance {:?}",
            mean.len(),
            cov.dim()
        )));
    }
    if !mean.iter().chain(cov.iter()).all(|v| v.is_finite()) {
        return Err(BlrError::InvalidValueError(
            "prior should have finite values".to_string(),
        ));
    }
    if cov[[0, 1]] != cov[[1, 0]] || cov[[0, 0]] <= F::zero() || cov[[1, 1]] <= F::zero() {
        return Err(BlrError::InvalidValueError(
            "prior covariance should be symmetric with positive variances".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn check_noise_variance<F: Float>(noise_variance: F) -> Result<()> {
    if noise_variance > F::zero() && noise_variance.is_finite() {
        Ok(())
    } else {
        Err(BlrError::InvalidValueError(format!(
            "`noise_variance` should be strictly positive, got {noise_variance}"
        )))
    }
}

impl<F: Float> ParamGuard for BlrParams<F> {
    type Checked = BlrValidParams<F>;
    type Error = BlrError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        check_prior(&self.0.prior_mean, &self.0.prior_cov)?;
        check_noise_variance(self.0.noise_variance)?;
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

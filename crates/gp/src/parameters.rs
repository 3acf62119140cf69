use crate::errors::{GpError, Result};
use crate::kernels::Kernel;
use crate::GP_DEFAULT_NOISE_VARIANCE;
use linfa::{Float, ParamGuard};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// A set of validated GP parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct GpValidParams<F: Float, K: Kernel<F>> {
    /// Covariance kernel of the zero mean prior
    pub(crate) kernel: K,
    /// Variance of the gaussian observation noise
    pub(crate) noise_variance: F,
}

impl<F: Float, K: Kernel<F> + Default> Default for GpValidParams<F, K> {
    fn default() -> GpValidParams<F, K> {
        GpValidParams {
            kernel: K::default(),
            noise_variance: F::cast(GP_DEFAULT_NOISE_VARIANCE),
        }
    }
}

impl<F: Float, K: Kernel<F>> GpValidParams<F, K> {
    /// Get covariance kernel k(x, x')
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Get observation noise variance
    pub fn noise_variance(&self) -> F {
        self.noise_variance
    }
}

#[derive(Clone, Debug)]
/// The set of hyperparameters that can be specified for the execution of
/// the [GP algorithm](crate::GaussianProcess).
pub struct GpParams<F: Float, K: Kernel<F>>(GpValidParams<F, K>);

impl<F: Float, K: Kernel<F>> GpParams<F, K> {
    /// A constructor for GP parameters given a covariance kernel
    pub fn new(kernel: K) -> GpParams<F, K> {
        Self(GpValidParams {
            kernel,
            noise_variance: F::cast(GP_DEFAULT_NOISE_VARIANCE),
        })
    }

    /// Set covariance kernel.
    pub fn kernel(mut self, kernel: K) -> Self {
        self.0.kernel = kernel;
        self
    }

    /// Set observation noise variance.
    pub fn noise_variance(mut self, noise_variance: F) -> Self {
        self.0.noise_variance = noise_variance;
        self
    }
}

impl<F: Float, K: Kernel<F>> From<GpValidParams<F, K>> for GpParams<F, K> {
    fn from(valid: GpValidParams<F, K>) -> Self {
        GpParams(valid)
    }
}

pub(crate) fn check_noise_variance<F: Float>(noise_variance: F) -> Result<()> {
    if noise_variance >= F::zero() && noise_variance.is_finite() {
        Ok(())
    } else {
        Err(GpError::InvalidValueError(format!(
            "`noise_variance` should be positive, got {noise_variance}"
        )))
    }
}

impl<F: Float, K: Kernel<F>> ParamGuard for GpParams<F, K> {
    type Checked = GpValidParams<F, K>;
    type Error = GpError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        self.0.kernel.check()?;
        check_noise_variance(self.0.noise_variance)?;
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::{PeriodicKernel, RbfKernel};

    #[test]
    fn test_params_check() {
        let params = GpParams::new(RbfKernel::new(0.5, 2.)).noise_variance(0.2);
        let valid = params.check_ref().expect("valid params");
        assert_eq!(valid.noise_variance(), 0.2);
        assert_eq!(valid.kernel().length_scale(), 0.5);

        assert!(GpParams::new(RbfKernel::new(0.5, 2.))
            .noise_variance(-1.)
            .check()
            .is_err());
        assert!(GpParams::new(PeriodicKernel::new(1., 1., -2.))
            .check()
            .is_err());
        // noiseless interpolation is allowed
        assert!(GpParams::new(RbfKernel::<f64>::default())
            .noise_variance(0.)
            .check()
            .is_ok());
    }

    #[test]
    fn test_default_params() {
        let params = GpValidParams::<f64, RbfKernel<f64>>::default();
        assert_eq!(params.noise_variance(), GP_DEFAULT_NOISE_VARIANCE);
        assert_eq!(*params.kernel(), RbfKernel::default());
    }
}

//! A module for covariance kernels used as the prior of the GP model.
//!
//! The following kernels of one scalar input are implemented:
//! * radial basis function (squared exponential),
//! * matern 3/2,
//! * periodic,
//! * linear.
//!
//! Hyperparameters are given by the user, they are never estimated.

use crate::errors::{GpError, Result};
use linfa::Float;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trait for using a covariance kernel in GP regression.
///
/// A kernel is symmetric: `compute(a, b) == compute(b, a)`.
pub trait Kernel<F: Float>: Clone + fmt::Debug + fmt::Display + Sync {
    /// Covariance `k(x1, x2)`
    fn compute(&self, x1: F, x2: F) -> F;

    /// Check hyperparameters values
    fn check(&self) -> Result<()>;

    /// Covariance matrix `K[i][j] = k(x1[i], x2[j])` of shape (len(x1), len(x2))
    fn compute_matrix(
        &self,
        x1: &ArrayBase<impl Data<Elem = F>, Ix1>,
        x2: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Array2<F> {
        Array2::from_shape_fn((x1.len(), x2.len()), |(i, j)| self.compute(x1[i], x2[j]))
    }

    /// Prior variances `k(x[i], x[i])`
    fn diag(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<F> {
        x.mapv(|v| self.compute(v, v))
    }
}

fn check_positive<F: Float>(name: &str, value: F) -> Result<()> {
    if value > F::zero() && value.is_finite() {
        Ok(())
    } else {
        Err(GpError::InvalidValueError(format!(
            "`{name}` should be strictly positive, got {value}"
        )))
    }
}

/// Radial basis function (squared exponential) kernel
///
/// `k(x1, x2) = signal_variance * exp(-(x1 - x2)^2 / (2 * length_scale^2))`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct RbfKernel<F: Float> {
    length_scale: F,
    signal_variance: F,
}

impl<F: Float> Default for RbfKernel<F> {
    fn default() -> Self {
        Self::new(F::one(), F::one())
    }
}

impl<F: Float> RbfKernel<F> {
    /// Constructor
    pub fn new(length_scale: F, signal_variance: F) -> Self {
        RbfKernel {
            length_scale,
            signal_variance,
        }
    }

    /// Set length scale
    pub fn with_length_scale(mut self, length_scale: F) -> Self {
        self.length_scale = length_scale;
        self
    }

    /// Change length scale in place
    pub fn set_length_scale(&mut self, length_scale: F) {
        self.length_scale = length_scale;
    }

    /// Set signal variance
    pub fn with_signal_variance(mut self, signal_variance: F) -> Self {
        self.signal_variance = signal_variance;
        self
    }

    /// Change signal variance in place
    pub fn set_signal_variance(&mut self, signal_variance: F) {
        self.signal_variance = signal_variance;
    }

    /// Length scale
    pub fn length_scale(&self) -> F {
        self.length_scale
    }

    /// Signal variance
    pub fn signal_variance(&self) -> F {
        self.signal_variance
    }
}

impl<F: Float> Kernel<F> for RbfKernel<F> {
    fn compute(&self, x1: F, x2: F) -> F {
        let d = x1 - x2;
        if d == F::zero() {
            // avoids 0/0 when length scale underflows
            return self.signal_variance;
        }
        let l2 = self.length_scale * self.length_scale;
        self.signal_variance * (-(d * d) / (F::cast(2.) * l2)).exp()
    }

    fn check(&self) -> Result<()> {
        check_positive("length_scale", self.length_scale)?;
        check_positive("signal_variance", self.signal_variance)
    }
}

impl<F: Float> fmt::Display for RbfKernel<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "RBF(length_scale={}, signal_variance={})",
            self.length_scale, self.signal_variance
        )
    }
}

/// Matern 3/2 kernel
///
/// `k(x1, x2) = signal_variance * (1 + sqrt(3) * r / length_scale) * exp(-sqrt(3) * r / length_scale)`
/// with `r = |x1 - x2|`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Matern32Kernel<F: Float> {
    length_scale: F,
    signal_variance: F,
}

impl<F: Float> Default for Matern32Kernel<F> {
    fn default() -> Self {
        Self::new(F::one(), F::one())
    }
}

impl<F: Float> Matern32Kernel<F> {
    /// Constructor
    pub fn new(length_scale: F, signal_variance: F) -> Self {
        Matern32Kernel {
            length_scale,
            signal_variance,
        }
    }

    /// Set length scale
    pub fn with_length_scale(mut self, length_scale: F) -> Self {
        self.length_scale = length_scale;
        self
    }

    /// Change length scale in place
    pub fn set_length_scale(&mut self, length_scale: F) {
        self.length_scale = length_scale;
    }

    /// Set signal variance
    pub fn with_signal_variance(mut self, signal_variance: F) -> Self {
        self.signal_variance = signal_variance;
        self
    }

    /// Change signal variance in place
    pub fn set_signal_variance(&mut self, signal_variance: F) {
        self.signal_variance = signal_variance;
    }

    /// Length scale
    pub fn length_scale(&self) -> F {
        self.length_scale
    }

    /// Signal variance
    pub fn signal_variance(&self) -> F {
        self.signal_variance
    }
}

impl<F: Float> Kernel<F> for Matern32Kernel<F> {
    fn compute(&self, x1: F, x2: F) -> F {
        let r = (x1 - x2).abs();
        if r == F::zero() {
            return self.signal_variance;
        }
        let s = F::cast(3.).sqrt() * r / self.length_scale;
        let decay = (-s).exp();
        // avoid inf * 0 when the length scale vanishes
        if !s.is_finite() || decay == F::zero() {
            return F::zero();
        }
        self.signal_variance * (F::one() + s) * decay
    }

    fn check(&self) -> Result<()> {
        check_positive("length_scale", self.length_scale)?;
        check_positive("signal_variance", self.signal_variance)
    }
}

impl<F: Float> fmt::Display for Matern32Kernel<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Matern32(length_scale={}, signal_variance={})",
            self.length_scale, self.signal_variance
        )
    }
}

/// Periodic kernel
///
/// `k(x1, x2) = signal_variance * exp(-2 * sin^2(pi * r / period) / length_scale^2)`
/// with `r = |x1 - x2|`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct PeriodicKernel<F: Float> {
    length_scale: F,
    signal_variance: F,
    period: F,
}

impl<F: Float> Default for PeriodicKernel<F> {
    fn default() -> Self {
        Self::new(F::one(), F::one(), F::one())
    }
}

impl<F: Float> PeriodicKernel<F> {
    /// Constructor
    pub fn new(length_scale: F, signal_variance: F, period: F) -> Self {
        PeriodicKernel {
            length_scale,
            signal_variance,
            period,
        }
    }

    /// Set length scale
    pub fn with_length_scale(mut self, length_scale: F) -> Self {
        self.length_scale = length_scale;
        self
    }

    /// Change length scale in place
    pub fn set_length_scale(&mut self, length_scale: F) {
        self.length_scale = length_scale;
    }

    /// Set signal variance
    pub fn with_signal_variance(mut self, signal_variance: F) -> Self {
        self.signal_variance = signal_variance;
        self
    }

    /// Change signal variance in place
    pub fn set_signal_variance(&mut self, signal_variance: F) {
        self.signal_variance = signal_variance;
    }

    /// Set period
    pub fn with_period(mut self, period: F) -> Self {
        self.period = period;
        self
    }

    /// Change period in place
    pub fn set_period(&mut self, period: F) {
        self.period = period;
    }

    /// Length scale
    pub fn length_scale(&self) -> F {
        self.length_scale
    }

    /// Signal variance
    pub fn signal_variance(&self) -> F {
        self.signal_variance
    }

    /// Period
    pub fn period(&self) -> F {
        self.period
    }
}

impl<F: Float> Kernel<F> for PeriodicKernel<F> {
    fn compute(&self, x1: F, x2: F) -> F {
        let r = (x1 - x2).abs();
        let sin = (F::cast(std::f64::consts::PI) * r / self.period).sin();
        let sin2 = sin * sin;
        if sin2 == F::zero() {
            return self.signal_variance;
        }
        let l2 = self.length_scale * self.length_scale;
        self.signal_variance * (F::cast(-2.) * sin2 / l2).exp()
    }

    fn check(&self) -> Result<()> {
        check_positive("length_scale", self.length_scale)?;
        check_positive("signal_variance", self.signal_variance)?;
        check_positive("period", self.period)
    }
}

impl<F: Float> fmt::Display for PeriodicKernel<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Periodic(length_scale={}, signal_variance={}, period={})",
            self.length_scale, self.signal_variance, self.period
        )
    }
}

/// Linear kernel
///
/// `k(x1, x2) = bias_variance + signal_variance * (x1 - center) * (x2 - center)`
///
/// A GP with this kernel is a bayesian linear regression with an independent
/// gaussian prior on intercept (variance `bias_variance`) and slope (variance `signal_variance`)
/// when `center` is zero.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct LinearKernel<F: Float> {
    signal_variance: F,
    bias_variance: F,
    center: F,
}

impl<F: Float> Default for LinearKernel<F> {
    fn default() -> Self {
        Self::new(F::one(), F::one(), F::zero())
    }
}

impl<F: Float> LinearKernel<F> {
    /// Constructor
    pub fn new(signal_variance: F, bias_variance: F, center: F) -> Self {
        LinearKernel {
            signal_variance,
            bias_variance,
            center,
        }
    }

    /// Set signal variance
    pub fn with_signal_variance(mut self, signal_variance: F) -> Self {
        self.signal_variance = signal_variance;
        self
    }

    /// Change signal variance in place
    pub fn set_signal_variance(&mut self, signal_variance: F) {
        self.signal_variance = signal_variance;
    }

    /// Set bias variance
    pub fn with_bias_variance(mut self, bias_variance: F) -> Self {
        self.bias_variance = bias_variance;
        self
    }

    /// Change bias variance in place
    pub fn set_bias_variance(&mut self, bias_variance: F) {
        self.bias_variance = bias_variance;
    }

    /// Set center
    pub fn with_center(mut self, center: F) -> Self {
        self.center = center;
        self
    }

    /// Change center in place
    pub fn set_center(&mut self, center: F) {
        self.center = center;
    }

    /// Signal variance (slope prior variance)
    pub fn signal_variance(&self) -> F {
        self.signal_variance
    }

    /// Bias variance (intercept prior variance)
    pub fn bias_variance(&self) -> F {
        self.bias_variance
    }

    /// Center
    pub fn center(&self) -> F {
        self.center
    }
}

impl<F: Float> Kernel<F> for LinearKernel<F> {
    fn compute(&self, x1: F, x2: F) -> F {
        self.bias_variance + self.signal_variance * (x1 - self.center) * (x2 - self.center)
    }

    fn check(&self) -> Result<()> {
        check_positive("signal_variance", self.signal_variance)?;
        if self.bias_variance >= F::zero() && self.center.is_finite() {
            Ok(())
        } else {
            Err(GpError::InvalidValueError(format!(
                "`bias_variance` should be positive and `center` finite, got {} and {}",
                self.bias_variance, self.center
            )))
        }
    }
}

impl<F: Float> fmt::Display for LinearKernel<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Linear(signal_variance={}, bias_variance={}, center={})",
            self.signal_variance, self.bias_variance, self.center
        )
    }
}

/// Any of the available kernels, allows to switch the kernel family
/// of a GP at runtime (see [`GaussianProcess::set_kernel`](crate::GaussianProcess::set_kernel)).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum AnyKernel<F: Float> {
    /// Radial basis function
    Rbf(RbfKernel<F>),
    /// Matern 3/2
    Matern32(Matern32Kernel<F>),
    /// Periodic
    Periodic(PeriodicKernel<F>),
    /// Linear
    Linear(LinearKernel<F>),
}

impl<F: Float> Default for AnyKernel<F> {
    fn default() -> Self {
        AnyKernel::Rbf(RbfKernel::default())
    }
}

impl<F: Float> Kernel<F> for AnyKernel<F> {
    fn compute(&self, x1: F, x2: F) -> F {
        match self {
            AnyKernel::Rbf(k) => k.compute(x1, x2),
            AnyKernel::Matern32(k) => k.compute(x1, x2),
            AnyKernel::Periodic(k) => k.compute(x1, x2),
            AnyKernel::Linear(k) => k.compute(x1, x2),
        }
    }

    fn check(&self) -> Result<()> {
        match self {
            AnyKernel::Rbf(k) => k.check(),
            AnyKernel::Matern32(k) => k.check(),
            AnyKernel::Periodic(k) => k.check(),
            AnyKernel::Linear(k) => k.check(),
        }
    }
}

impl<F: Float> fmt::Display for AnyKernel<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnyKernel::Rbf(k) => k.fmt(f),
            AnyKernel::Matern32(k) => k.fmt(f),
            AnyKernel::Periodic(k) => k.fmt(f),
            AnyKernel::Linear(k) => k.fmt(f),
        }
    }
}

impl<F: Float> From<RbfKernel<F>> for AnyKernel<F> {
    fn from(k: RbfKernel<F>) -> Self {
        AnyKernel::Rbf(k)
    }
}

impl<F: Float> From<Matern32Kernel<F>> for AnyKernel<F> {
    fn from(k: Matern32Kernel<F>) -> Self {
        AnyKernel::Matern32(k)
    }
}

impl<F: Float> From<PeriodicKernel<F>> for AnyKernel<F> {
    fn from(k: PeriodicKernel<F>) -> Self {
        AnyKernel::Periodic(k)
    }
}

impl<F: Float> From<LinearKernel<F>> for AnyKernel<F> {
    fn from(k: LinearKernel<F>) -> Self {
        AnyKernel::Linear(k)
    }
}

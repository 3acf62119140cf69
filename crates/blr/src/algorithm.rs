use crate::errors::{BlrError, Result};
use crate::parameters::{check_noise_variance, check_prior, BlrParams, BlrValidParams};

use linfa::prelude::{DatasetBase, Fit, Float};
use probreg_linalg::{
    gaussian_2d_pdf, inverse, sample_multivariate_normal, CredibleBand, CredibleLevel, Prediction,
};

use ndarray::{array, Array1, Array2, ArrayBase, Data, Ix1, Ix2, Zip};
use ndarray_rand::rand::Rng;

use log::debug;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Default variance of the observation noise
pub const BLR_DEFAULT_NOISE_VARIANCE: f64 = 1.0;
/// Default prior variance of intercept and slope
pub const BLR_DEFAULT_PRIOR_VARIANCE: f64 = 1.0;

/// Bivariate normal density evaluated on a (slope, intercept) grid.
///
/// `density[[i, j]]` is the density at `slope = slopes[j]` and `intercept = intercepts[i]`,
/// that is slopes along columns (horizontal axis) and intercepts along rows (vertical axis).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct ContourGrid<F: Float> {
    /// Horizontal axis values
    pub slopes: Array1<F>,
    /// Vertical axis values
    pub intercepts: Array1<F>,
    /// (len(intercepts), len(slopes)) density values
    pub density: Array2<F>,
}

/// Ordinary least squares line
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct OlsEstimate<F: Float> {
    /// Intercept
    pub intercept: F,
    /// Slope
    pub slope: F,
}

/// Bayesian linear regression of a scalar output with respect to one scalar input
///
/// `y = b0 + b1.x + e` with `e ~ Normal(0, noise_variance)` where the noise variance is known
/// and weights `b = [b0, b1]` (intercept, slope) have a gaussian prior `Normal(mu0, S0)`.
///
/// Prior and likelihood are conjugate so that the posterior is `Normal(mun, Sn)` with
///
/// * `Sn = (S0^-1 + Xt.X / noise_variance)^-1`
/// * `mun = Sn.(S0^-1.mu0 + Xt.y / noise_variance)`
///
/// where `X` is the (n, 2) design matrix with rows `[1, x_i]`.
///
/// The posterior is recomputed from scratch on each [fit](BayesianLinearRegression::fit),
/// [set_prior](BayesianLinearRegression::set_prior) or
/// [set_noise](BayesianLinearRegression::set_noise) call. Without training data the
/// posterior is the prior ([has_data](BayesianLinearRegression::has_data) returns false).
///
/// # Example
///
/// ```
/// use probreg_blr::BayesianLinearRegression;
/// use probreg_linalg::{CredibleLevel, Lcg};
/// use ndarray::{array, Array};
/// use ndarray_rand::rand::SeedableRng;
///
/// let x = array![0., 1., 2., 3., 4.];
/// let y = array![2.1, 3.4, 5.2, 6.4, 8.1];
///
/// let mut blr = BayesianLinearRegression::params()
///     .noise_variance(0.25)
///     .build()
///     .expect("valid parameters");
/// blr.fit(&x, &y).expect("BLR fitted");
///
/// let band = blr.credible_band(&Array::linspace(-1., 5., 20), CredibleLevel::P90);
/// let weights = blr.sample_posterior_weights(5, &mut Lcg::seed_from_u64(7));
/// assert_eq!(weights.dim(), (5, 2));
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(serialize = "F: Serialize", deserialize = "F: Deserialize<'de>"))
)]
pub struct BayesianLinearRegression<F: Float> {
    /// Prior and noise used to fit this model
    params: BlrValidParams<F>,
    /// Training dataset (input, output)
    training_data: (Array1<F>, Array1<F>),
    /// Posterior mean of `[intercept, slope]`
    posterior_mean: Array1<F>,
    /// Posterior (2, 2) covariance of `[intercept, slope]`
    posterior_cov: Array2<F>,
}

impl<F: Float> fmt::Display for BayesianLinearRegression<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "BLR(intercept={}, slope={}, noise_variance={}, n_points={})",
            self.posterior_mean[0],
            self.posterior_mean[1],
            self.params.noise_variance,
            self.n_points()
        )
    }
}

impl<F: Float> Default for BayesianLinearRegression<F> {
    fn default() -> Self {
        BayesianLinearRegression::new(BlrValidParams::default())
    }
}

impl<F: Float> BayesianLinearRegression<F> {
    /// Blr parameters constructor
    pub fn params() -> BlrParams<F> {
        BlrParams::new()
    }

    /// Model in prior only state given validated parameters
    pub fn new(params: BlrValidParams<F>) -> Self {
        let posterior_mean = params.prior_mean.to_owned();
        let posterior_cov = params.prior_cov.to_owned();
        BayesianLinearRegression {
            params,
            training_data: (Array1::zeros(0), Array1::zeros(0)),
            posterior_mean,
            posterior_cov,
        }
    }

    /// Replace training data with the given `x` inputs and `y` outputs and
    /// compute the posterior. An empty dataset brings the posterior back to the prior.
    pub fn fit(
        &mut self,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<()> {
        if x.len() != y.len() {
            return Err(BlrError::InvalidValueError(format!(
                "x and y should have the same length, got {} and {}",
                x.len(),
                y.len()
            )));
        }
        self.training_data = (x.to_owned(), y.to_owned());
        self.update();
        Ok(())
    }

    /// Forget training data, back to prior only state
    pub fn reset(&mut self) {
        self.training_data = (Array1::zeros(0), Array1::zeros(0));
        self.update();
    }

    /// Set gaussian prior of `[intercept, slope]`, the posterior is recomputed when trained
    pub fn set_prior(
        &mut self,
        mean: &ArrayBase<impl Data<Elem = F>, Ix1>,
        cov: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<()> {
        check_prior(mean, cov)?;
        self.params.prior_mean = mean.to_owned();
        self.params.prior_cov = cov.to_owned();
        self.update();
        Ok(())
    }

    /// Set observation noise variance, the posterior is recomputed when trained
    pub fn set_noise(&mut self, noise_variance: F) -> Result<()> {
        check_noise_variance(noise_variance)?;
        self.params.noise_variance = noise_variance;
        self.update();
        Ok(())
    }

    /// Conjugate update of the prior given the training data
    fn update(&mut self) {
        let (xt, yt) = &self.training_data;
        let prior_mean = &self.params.prior_mean;
        let prior_cov = &self.params.prior_cov;
        if xt.is_empty() {
            debug!("BLR without training data, prior only");
            self.posterior_mean = prior_mean.to_owned();
            self.posterior_cov = prior_cov.to_owned();
            return;
        }
        let now = Instant::now();
        let inv_noise = F::one() / self.params.noise_variance;
        let n = F::cast(xt.len());
        let sx = xt.sum();
        let sxx = xt.dot(xt);
        let sy = yt.sum();
        let sxy = xt.dot(yt);

        let prior_precision = inverse(prior_cov);
        // Xt.X = [[n, sum x], [sum x, sum x^2]] and Xt.y = [sum y, sum xy]
        let xtx = array![[n, sx], [sx, sxx]];
        let xty = array![sy, sxy];

        let precision = &prior_precision + &xtx.mapv(|v| v * inv_noise);
        let mut cov = inverse(&precision);
        // keep exact symmetry for factorization at sampling time
        let off = (cov[[0, 1]] + cov[[1, 0]]) * F::cast(0.5);
        cov[[0, 1]] = off;
        cov[[1, 0]] = off;
        let rhs = prior_precision.dot(prior_mean) + xty.mapv(|v| v * inv_noise);
        self.posterior_mean = cov.dot(&rhs);
        self.posterior_cov = cov;
        debug!(
            "BLR fitted on {} points: intercept={}, slope={} (elapsed {:?})",
            xt.len(),
            self.posterior_mean[0],
            self.posterior_mean[1],
            now.elapsed()
        );
    }

    /// Whether the model has training data
    pub fn has_data(&self) -> bool {
        !self.training_data.0.is_empty()
    }

    /// Number of training points
    pub fn n_points(&self) -> usize {
        self.training_data.0.len()
    }

    /// Training dataset (input, output)
    pub fn training_data(&self) -> (&Array1<F>, &Array1<F>) {
        (&self.training_data.0, &self.training_data.1)
    }

    /// Prior mean of `[intercept, slope]`
    pub fn prior_mean(&self) -> &Array1<F> {
        &self.params.prior_mean
    }

    /// Prior covariance of `[intercept, slope]`
    pub fn prior_cov(&self) -> &Array2<F> {
        &self.params.prior_cov
    }

    /// Posterior mean of `[intercept, slope]`, the prior mean without training data
    pub fn posterior_mean(&self) -> &Array1<F> {
        &self.posterior_mean
    }

    /// Posterior covariance of `[intercept, slope]`, the prior covariance without training data
    pub fn posterior_cov(&self) -> &Array2<F> {
        &self.posterior_cov
    }

    /// Observation noise variance
    pub fn noise_variance(&self) -> F {
        self.params.noise_variance
    }

    /// Parameters used by this model
    pub fn params_used(&self) -> &BlrValidParams<F> {
        &self.params
    }

    /// Posterior predictive mean and variance at a single `x` point.
    ///
    /// With `phi = [1, x]`, mean is `mun.phi` and variance `phit.Sn.phi + noise_variance`.
    pub fn predict_one(&self, x: F) -> (F, F) {
        let mu = &self.posterior_mean;
        let s = &self.posterior_cov;
        let mean = mu[0] + mu[1] * x;
        let variance =
            s[[0, 0]] + (s[[0, 1]] + s[[1, 0]]) * x + s[[1, 1]] * x * x + self.params.noise_variance;
        (mean, variance)
    }

    /// Posterior predictive means and variances at `x` points.
    ///
    /// Variances include the observation noise.
    pub fn predict(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Prediction<F> {
        let mut mean = Array1::zeros(x.len());
        let mut variance = Array1::zeros(x.len());
        Zip::from(&mut mean)
            .and(&mut variance)
            .and(x)
            .for_each(|m, v, &xi| (*m, *v) = self.predict_one(xi));
        Prediction { mean, variance }
    }

    /// Credible band `mean +/- z.std` of the posterior predictive at `x` points
    pub fn credible_band(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        level: CredibleLevel,
    ) -> CredibleBand<F> {
        CredibleBand::from_prediction(&self.predict(x), level)
    }

    /// Prior density of the weights on the given (slope, intercept) grid
    pub fn prior_contours(
        &self,
        slopes: &ArrayBase<impl Data<Elem = F>, Ix1>,
        intercepts: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> ContourGrid<F> {
        contours(
            &self.params.prior_mean,
            &self.params.prior_cov,
            slopes,
            intercepts,
        )
    }

    /// Posterior density of the weights on the given (slope, intercept) grid
    pub fn posterior_contours(
        &self,
        slopes: &ArrayBase<impl Data<Elem = F>, Ix1>,
        intercepts: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> ContourGrid<F> {
        contours(&self.posterior_mean, &self.posterior_cov, slopes, intercepts)
    }

    /// Sample `n` weight vectors `[intercept, slope]` from the posterior.
    ///
    /// Returns a (n, 2) array, one sample per row.
    pub fn sample_posterior_weights<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Array2<F> {
        sample_multivariate_normal(&self.posterior_mean, &self.posterior_cov, n, rng)
    }

    /// Sample `n` regression lines from the posterior evaluated at `x` points.
    ///
    /// Returns a (n, len(x)) array, one line per row.
    pub fn sample_posterior_lines<R: Rng + ?Sized>(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        n: usize,
        rng: &mut R,
    ) -> Array2<F> {
        let weights = self.sample_posterior_weights(n, rng);
        Array2::from_shape_fn((n, x.len()), |(k, i)| {
            weights[[k, 0]] + weights[[k, 1]] * x[i]
        })
    }

    /// Ordinary least squares line fitted on `x` and `y`.
    ///
    /// With less than two points or a constant `x`, the slope is zero and
    /// the intercept is the mean of `y` (zero when `y` is empty).
    pub fn ols_estimate(
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> OlsEstimate<F> {
        debug_assert_eq!(x.len(), y.len(), "x and y lengths differ");
        if y.is_empty() {
            return OlsEstimate {
                intercept: F::zero(),
                slope: F::zero(),
            };
        }
        let n = F::cast(y.len());
        let x_mean = x.sum() / n;
        let y_mean = y.sum() / n;
        let mut sxx = F::zero();
        let mut sxy = F::zero();
        Zip::from(x).and(y).for_each(|&xi, &yi| {
            sxx = sxx + (xi - x_mean) * (xi - x_mean);
            sxy = sxy + (xi - x_mean) * (yi - y_mean);
        });
        if y.len() < 2 || !(sxx > F::epsilon()) {
            return OlsEstimate {
                intercept: y_mean,
                slope: F::zero(),
            };
        }
        let slope = sxy / sxx;
        OlsEstimate {
            intercept: y_mean - slope * x_mean,
            slope,
        }
    }
}

/// Density of `Normal(mean, cov)` over `[intercept, slope]` evaluated with axes swapped,
/// slope horizontally and intercept vertically.
fn contours<F: Float>(
    mean: &Array1<F>,
    cov: &Array2<F>,
    slopes: &ArrayBase<impl Data<Elem = F>, Ix1>,
    intercepts: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> ContourGrid<F> {
    let swapped_mean = array![mean[1], mean[0]];
    let swapped_cov = array![[cov[[1, 1]], cov[[1, 0]]], [cov[[0, 1]], cov[[0, 0]]]];
    let density = Array2::from_shape_fn((intercepts.len(), slopes.len()), |(i, j)| {
        gaussian_2d_pdf(slopes[j], intercepts[i], &swapped_mean, &swapped_cov)
    });
    ContourGrid {
        slopes: slopes.to_owned(),
        intercepts: intercepts.to_owned(),
        density,
    }
}

impl<F: Float> BlrParams<F> {
    /// Build a model in prior only state after checking the parameters
    pub fn build(self) -> Result<BayesianLinearRegression<F>> {
        use linfa::ParamGuard;
        Ok(BayesianLinearRegression::new(self.check()?))
    }
}

impl<F: Float, D: Data<Elem = F>> Fit<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>, BlrError>
    for BlrValidParams<F>
{
    type Object = BayesianLinearRegression<F>;

    /// Fit BLR given a dataset of (n, 1) inputs and (n,) outputs
    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>>,
    ) -> Result<Self::Object> {
        let x = dataset.records();
        if x.ncols() != 1 {
            return Err(BlrError::InvalidValueError(format!(
                "BLR expects one input feature, got {}",
                x.ncols()
            )));
        }
        let mut blr = BayesianLinearRegression::new(self.clone());
        blr.fit(&x.column(0), dataset.targets())?;
        Ok(blr)
    }
}

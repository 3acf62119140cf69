use crate::errors::{GpError, Result};
use crate::kernels::Kernel;
use crate::parameters::{check_noise_variance, GpParams, GpValidParams};

use linfa::prelude::{DatasetBase, Fit, Float};
use probreg_linalg::{
    cholesky_jittered, sample_with_factor, solve_lower, solve_lower_matrix,
    solve_lower_transposed, CredibleBand, CredibleLevel, Prediction,
};

use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2, Zip};
use ndarray_rand::rand::Rng;

use log::debug;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Default variance of the observation noise
pub const GP_DEFAULT_NOISE_VARIANCE: f64 = 0.1;
/// Jitter added to covariance diagonals before factorization
pub const GP_JITTER: f64 = 1e-8;
/// Lower bound of predictive variances
pub const GP_MIN_VARIANCE: f64 = 1e-8;

/// Cached factorization of the training covariance,
/// rebuilt from scratch on each fit or hyperparameter change
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub(crate) struct GpPosterior<F: Float> {
    /// Cholesky factor `L` of `K + (noise_variance + jitter).I`
    chol: Array2<F>,
    /// Solution of `(K + noise_variance.I).alpha = y`
    alpha: Array1<F>,
}

/// A GP regression models an unknown function `f` as a zero mean gaussian
/// process governed by a covariance kernel `k`, observed through gaussian noise:
///
/// `f ~ GP(0, k)` and `y_i = f(x_i) + e_i` with `e_i ~ Normal(0, noise_variance)`
///
/// # Implementation
///
/// * Training factorizes `K + noise_variance.I = L.Lt` then solves `L.y' = y`
///   and `Lt.alpha = y'`, the inverse of `K` is never formed. This is the `O(n^3)`
///   part which is fully recomputed on each [fit](GaussianProcess::fit),
///   [set_kernel](GaussianProcess::set_kernel) or [set_noise](GaussianProcess::set_noise) call.
/// * Predictions and samples only read the cached factorization.
/// * Without training data, the model stays in a prior only state
///   ([has_data](GaussianProcess::has_data) returns false) where predictions and samples
///   come from the prior.
/// * Degenerate hyperparameters (e.g. length scale close to zero) never fail:
///   the Cholesky diagonal is clamped and variances are floored at [GP_MIN_VARIANCE].
///
/// # Example
///
/// ```
/// use probreg_gp::{GaussianProcess, RbfKernel};
/// use probreg_linalg::{CredibleLevel, Lcg};
/// use ndarray::{array, Array};
/// use ndarray_rand::rand::SeedableRng;
///
/// let xt = array![-2.0, -1.0, 0.0, 1.0, 2.0];
/// let yt = xt.mapv(f64::sin);
///
/// let mut gp = GaussianProcess::params(RbfKernel::new(1.0, 1.0))
///     .noise_variance(0.01)
///     .build()
///     .expect("valid parameters");
/// gp.fit(&xt, &yt).expect("GP fitted");
///
/// let x = Array::linspace(-3., 3., 50);
/// let band = gp.credible_band(&x, CredibleLevel::P95).expect("band");
/// let curves = gp.sample_posterior(&x, 3, &mut Lcg::seed_from_u64(42)).expect("samples");
/// assert_eq!(curves.dim(), (3, 50));
/// ```
///
/// # Reference:
///
/// C. E. Rasmussen and C. K. I. Williams, Gaussian Processes for Machine Learning,
/// the MIT Press, 2006, Algorithm 2.1.
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(bound(
        serialize = "F: Serialize, K: Serialize",
        deserialize = "F: Deserialize<'de>, K: Deserialize<'de>"
    ))
)]
pub struct GaussianProcess<F: Float, K: Kernel<F>> {
    /// Parameters used to fit this model
    params: GpValidParams<F, K>,
    /// Training dataset (input, output)
    training_data: (Array1<F>, Array1<F>),
    /// None while in prior only state
    posterior: Option<GpPosterior<F>>,
}

impl<F: Float, K: Kernel<F>> fmt::Display for GaussianProcess<F, K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "GP(kernel={}, noise_variance={}, n_points={})",
            self.params.kernel,
            self.params.noise_variance,
            self.n_points()
        )
    }
}

impl<F: Float, K: Kernel<F>> GaussianProcess<F, K> {
    /// Gp parameters contructor
    pub fn params(kernel: K) -> GpParams<F, K> {
        GpParams::new(kernel)
    }

    /// Model in prior only state given validated parameters
    pub fn new(params: GpValidParams<F, K>) -> Self {
        GaussianProcess {
            params,
            training_data: (Array1::zeros(0), Array1::zeros(0)),
            posterior: None,
        }
    }

    /// Replace training data with the given `x` inputs and `y` outputs and
    /// fit the model. An empty dataset puts the model back in prior only state.
    pub fn fit(
        &mut self,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<()> {
        if x.len() != y.len() {
            return Err(GpError::InvalidValueError(format!(
                "x and y should have the same length, got {} and {}",
                x.len(),
                y.len()
            )));
        }
        self.training_data = (x.to_owned(), y.to_owned());
        self.refit()
    }

    /// Forget training data, back to prior only state
    pub fn reset(&mut self) {
        self.training_data = (Array1::zeros(0), Array1::zeros(0));
        self.posterior = None;
    }

    /// Set covariance kernel, the model is refitted when trained
    pub fn set_kernel(&mut self, kernel: K) -> Result<()> {
        kernel.check()?;
        self.params.kernel = kernel;
        self.refit()
    }

    /// Set observation noise variance, the model is refitted when trained
    pub fn set_noise(&mut self, noise_variance: F) -> Result<()> {
        check_noise_variance(noise_variance)?;
        self.params.noise_variance = noise_variance;
        self.refit()
    }

    /// Rebuild cached factorization from training data
    fn refit(&mut self) -> Result<()> {
        let (xt, yt) = &self.training_data;
        if xt.is_empty() {
            debug!("GP without training data, prior only");
            self.posterior = None;
            return Ok(());
        }
        let now = Instant::now();
        let k = self.params.kernel.compute_matrix(xt, xt);
        let chol = cholesky_jittered(&k, self.params.noise_variance + F::cast(GP_JITTER));
        let y_ = solve_lower(&chol, yt)?;
        let alpha = solve_lower_transposed(&chol, &y_)?;
        debug!(
            "GP fitted on {} points with {} (elapsed {:?})",
            xt.len(),
            self.params.kernel,
            now.elapsed()
        );
        self.posterior = Some(GpPosterior { chol, alpha });
        Ok(())
    }

    /// Whether the model has training data
    pub fn has_data(&self) -> bool {
        self.posterior.is_some()
    }

    /// Number of training points
    pub fn n_points(&self) -> usize {
        self.training_data.0.len()
    }

    /// Training dataset (input, output)
    pub fn training_data(&self) -> (&Array1<F>, &Array1<F>) {
        (&self.training_data.0, &self.training_data.1)
    }

    /// Covariance kernel
    pub fn kernel(&self) -> &K {
        &self.params.kernel
    }

    /// Observation noise variance
    pub fn noise_variance(&self) -> F {
        self.params.noise_variance
    }

    /// Parameters used by this model
    pub fn params_used(&self) -> &GpValidParams<F, K> {
        &self.params
    }

    /// Compute `V = L \ Kt*` where `K*` is the (m, n) cross covariance between `x` and training inputs.
    /// Returns (K*, V).
    fn cross_terms(
        &self,
        posterior: &GpPosterior<F>,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<(Array2<F>, Array2<F>)> {
        let k_star = self.params.kernel.compute_matrix(x, &self.training_data.0);
        let v = solve_lower_matrix(&posterior.chol, &k_star.t().to_owned())?;
        Ok((k_star, v))
    }

    /// Predict posterior predictive means and variances at `x` points.
    ///
    /// Variances include the observation noise and are floored at [GP_MIN_VARIANCE].
    pub fn predict(&self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<Prediction<F>> {
        let noise = self.params.noise_variance;
        let min_var = F::cast(GP_MIN_VARIANCE);
        let prior_var = self.params.kernel.diag(x);
        let Some(posterior) = &self.posterior else {
            return Ok(Prediction {
                mean: Array1::zeros(x.len()),
                variance: prior_var.mapv(|v| (v + noise).max(min_var)),
            });
        };

        let (k_star, v) = self.cross_terms(posterior, x)?;
        let mean = k_star.dot(&posterior.alpha);
        let vv = v.mapv(|e| e * e).sum_axis(Axis(0));
        let mut variance = prior_var;
        Zip::from(&mut variance)
            .and(&vv)
            .for_each(|var, &s| *var = (*var - s + noise).max(min_var));
        Ok(Prediction { mean, variance })
    }

    /// Credible band `mean +/- z.std` of the posterior predictive at `x` points
    pub fn credible_band(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        level: CredibleLevel,
    ) -> Result<CredibleBand<F>> {
        let pred = self.predict(x)?;
        Ok(CredibleBand::from_prediction(&pred, level))
    }

    /// Sample `n_traj` function curves from the zero mean prior at `x` points.
    ///
    /// Returns a (n_traj, len(x)) array, one curve per row.
    pub fn sample_prior<R: Rng + ?Sized>(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        n_traj: usize,
        rng: &mut R,
    ) -> Array2<F> {
        let kss = self.params.kernel.compute_matrix(x, x);
        let chol = cholesky_jittered(&kss, F::cast(GP_JITTER));
        sample_with_factor(&Array1::zeros(x.len()), &chol, n_traj, rng)
    }

    /// Sample `n_traj` function curves from the posterior at `x` points,
    /// from the prior when the model has no training data.
    ///
    /// Non finite sampled values are replaced by the posterior mean.
    /// Returns a (n_traj, len(x)) array, one curve per row.
    pub fn sample_posterior<R: Rng + ?Sized>(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        n_traj: usize,
        rng: &mut R,
    ) -> Result<Array2<F>> {
        let Some(posterior) = &self.posterior else {
            return Ok(self.sample_prior(x, n_traj, rng));
        };
        let (k_star, v) = self.cross_terms(posterior, x)?;
        let mean = k_star.dot(&posterior.alpha);
        let kss = self.params.kernel.compute_matrix(x, x);
        let cov = kss - v.t().dot(&v);
        let chol = cholesky_jittered(&cov, F::cast(GP_JITTER));

        let mut samples = sample_with_factor(&mean, &chol, n_traj, rng);
        let n_fixed = replace_non_finite(&mut samples, &mean);
        if n_fixed > 0 {
            debug!("GP sampling: {n_fixed} non finite value(s) replaced by the mean");
        }
        Ok(samples)
    }

    /// Log marginal likelihood `log p(y | x)` of the training data
    /// given current hyperparameters, 0 without training data.
    pub fn log_marginal_likelihood(&self) -> F {
        let Some(posterior) = &self.posterior else {
            return F::zero();
        };
        let yt = &self.training_data.1;
        let n = F::cast(yt.len());
        let data_fit = F::cast(-0.5) * yt.dot(&posterior.alpha);
        let log_det = posterior.chol.diag().mapv(|v| v.ln()).sum();
        let two_pi = F::cast(2. * std::f64::consts::PI);
        data_fit - log_det - F::cast(0.5) * n * two_pi.ln()
    }
}

/// Replace non finite values of each sampled curve (rows of `samples`)
/// by the mean at the same index. Returns the number of replaced values.
fn replace_non_finite<F: Float>(samples: &mut Array2<F>, mean: &Array1<F>) -> usize {
    let mut n_fixed = 0;
    for mut curve in samples.rows_mut() {
        Zip::from(&mut curve).and(mean).for_each(|s, &m| {
            if !s.is_finite() {
                *s = m;
                n_fixed += 1;
            }
        });
    }
    n_fixed
}

#[cfg(feature = "persistent")]
impl<F, K> GaussianProcess<F, K>
where
    F: Float + Serialize + for<'de> Deserialize<'de>,
    K: Kernel<F> + Serialize + for<'de> Deserialize<'de>,
{
    /// Save the model in the given file as json
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Load a model from the given json file
    pub fn load(path: &str) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

impl<F: Float, K: Kernel<F>> GpParams<F, K> {
    /// Build a model in prior only state after checking the parameters
    pub fn build(self) -> Result<GaussianProcess<F, K>> {
        use linfa::ParamGuard;
        Ok(GaussianProcess::new(self.check()?))
    }
}

impl<F: Float, K: Kernel<F>, D: Data<Elem = F>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>, GpError> for GpValidParams<F, K>
{
    type Object = GaussianProcess<F, K>;

    /// Fit GP given a dataset of (n, 1) inputs and (n,) outputs
    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>>,
    ) -> Result<Self::Object> {
        let x = dataset.records();
        if x.ncols() != 1 {
            return Err(GpError::InvalidValueError(format!(
                "GP expects one input feature, got {}",
                x.ncols()
            )));
        }
        let mut gp = GaussianProcess::new(self.clone());
        gp.fit(&x.column(0), dataset.targets())?;
        Ok(gp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::*;
    use approx::assert_abs_diff_eq;
    use linfa::prelude::Dataset;
    use ndarray::{array, Array};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Normal;
    use ndarray_rand::RandomExt;
    use paste::paste;
    use probreg_linalg::Lcg;
    use rand_xoshiro::Xoshiro256Plus;

    const NOISE_STD: f64 = 0.2;

    /// 15 noisy observations of sin(x) on [-3, 3]
    fn sine_dataset() -> (Array1<f64>, Array1<f64>) {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let xt = Array::linspace(-3., 3., 15);
        let noise = Array::random_using(15, Normal::new(0., NOISE_STD).unwrap(), &mut rng);
        let yt = xt.mapv(f64::sin) + noise;
        (xt, yt)
    }

    fn fitted_gp() -> GaussianProcess<f64, RbfKernel<f64>> {
        let (xt, yt) = sine_dataset();
        let mut gp = GaussianProcess::params(RbfKernel::new(1.0, 1.0))
            .noise_variance(0.1)
            .build()
            .expect("GP params");
        gp.fit(&xt, &yt).expect("GP fit");
        gp
    }

    #[test]
    fn test_prior_only_predict() {
        let mut gp = GaussianProcess::params(RbfKernel::new(1.0, 2.0))
            .noise_variance(0.1)
            .build()
            .unwrap();
        assert!(!gp.has_data());
        let x = array![-1., 0., 3.];
        let pred = gp.predict(&x).unwrap();
        assert_eq!(pred.mean, Array1::<f64>::zeros(3));
        assert_abs_diff_eq!(pred.variance, Array1::from_elem(3, 2.1), epsilon = 1e-12);

        gp.fit(&Array1::<f64>::zeros(0), &Array1::zeros(0)).unwrap();
        assert!(!gp.has_data());
        assert_eq!(gp.predict(&x).unwrap(), pred);
        assert_eq!(gp.log_marginal_likelihood(), 0.);
    }

    #[test]
    fn test_fit_sine() {
        let gp = fitted_gp();
        assert!(gp.has_data());
        assert_eq!(gp.n_points(), 15);
        let (xt, yt) = sine_dataset();
        let pred = gp.predict(&xt).unwrap();
        for (m, y) in pred.mean.iter().zip(yt.iter()) {
            assert!((m - y).abs() < 4. * NOISE_STD, "mean {m} too far from {y}");
        }
        // smoothed predictions are close to the true function
        let x = Array::linspace(-2.5, 2.5, 11);
        let pred = gp.predict(&x).unwrap();
        assert_abs_diff_eq!(pred.mean, x.mapv(f64::sin), epsilon = 0.5);
        // near training data variance is close to the noise variance
        assert!(pred.variance.iter().all(|&v| v > 0.1 && v < 0.2));
    }

    #[test]
    fn test_variance_far_from_data() {
        let gp = fitted_gp();
        let pred = gp.predict(&array![50.]).unwrap();
        assert_abs_diff_eq!(pred.mean[0], 0., epsilon = 1e-9);
        assert_abs_diff_eq!(pred.variance[0], 1.1, epsilon = 1e-9);
    }

    #[test]
    fn test_fit_mismatched_lengths() {
        let mut gp = GaussianProcess::params(RbfKernel::default()).build().unwrap();
        assert!(matches!(
            gp.fit(&array![1., 2.], &array![1.]),
            Err(GpError::InvalidValueError(_))
        ));
    }

    #[test]
    fn test_credible_band_ordering() {
        let x = Array::linspace(-5., 5., 101);
        let gp = fitted_gp();
        let mut prior = gp.clone();
        prior.reset();
        for model in [gp, prior] {
            for level in [CredibleLevel::P90, CredibleLevel::P95, CredibleLevel::P99] {
                let band = model.credible_band(&x, level).unwrap();
                Zip::from(&band.lower)
                    .and(&band.mean)
                    .and(&band.upper)
                    .for_each(|lo, m, up| assert!(up >= m && m >= lo));
            }
        }
    }

    #[test]
    fn test_vanishing_length_scale() {
        let (xt, yt) = sine_dataset();
        let kernels: Vec<AnyKernel<f64>> = [1e-3, 1e-12, 1e-300, 1e-320]
            .iter()
            .flat_map(|&l| {
                [
                    RbfKernel::new(l, 1.0).into(),
                    Matern32Kernel::new(l, 1.0).into(),
                ]
            })
            .collect();
        for kernel in kernels {
            let mut gp = GaussianProcess::params(kernel)
                .noise_variance(0.)
                .build()
                .unwrap();
            gp.fit(&xt, &yt).expect("no failure");
            let x = Array::linspace(-3., 3., 31);
            let pred = gp.predict(&x).unwrap();
            assert!(pred.mean.iter().all(|v| v.is_finite()));
            assert!(pred
                .variance
                .iter()
                .all(|&v| v.is_finite() && v >= GP_MIN_VARIANCE));
            let samples = gp.sample_posterior(&x, 3, &mut Lcg::seed_from_u64(0)).unwrap();
            assert!(samples.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_replace_non_finite_samples() {
        let mean = array![0.5, -1., 2.];
        let mut samples = array![[1., f64::NAN, 3.], [f64::INFINITY, 0., f64::NEG_INFINITY]];
        assert_eq!(replace_non_finite(&mut samples, &mean), 3);
        assert_eq!(samples, array![[1., -1., 3.], [0.5, 0., 2.]]);
        assert_eq!(replace_non_finite(&mut samples, &mean), 0);
    }

    #[test]
    fn test_set_kernel_and_noise_refit() {
        let mut gp = fitted_gp();
        let x = array![0.3, 1.7];
        let before = gp.predict(&x).unwrap();

        let kernel = gp.kernel().with_length_scale(0.3);
        gp.set_kernel(kernel).unwrap();
        assert!(gp.has_data());
        let after = gp.predict(&x).unwrap();
        assert!((after.mean[0] - before.mean[0]).abs() > 1e-6);

        // same as fitting from scratch with the new kernel
        let (xt, yt) = sine_dataset();
        let mut fresh = GaussianProcess::params(kernel)
            .noise_variance(0.1)
            .build()
            .unwrap();
        fresh.fit(&xt, &yt).unwrap();
        assert_abs_diff_eq!(fresh.predict(&x).unwrap().mean, after.mean, epsilon = 1e-12);

        gp.set_noise(0.5).unwrap();
        assert_eq!(gp.noise_variance(), 0.5);
        assert!(gp.predict(&x).unwrap().variance[0] > after.variance[0]);
        assert!(gp.set_noise(-0.5).is_err());
        assert!(gp.set_kernel(RbfKernel::new(0., 1.)).is_err());
        assert_eq!(gp.noise_variance(), 0.5);
    }

    #[test]
    fn test_set_kernel_on_prior_keeps_prior_state() {
        let mut gp = GaussianProcess::params(AnyKernel::default()).build().unwrap();
        gp.set_kernel(PeriodicKernel::new(1., 1., 2.).into()).unwrap();
        assert!(!gp.has_data());
        let pred = gp.predict(&array![0., 2.]).unwrap();
        assert_abs_diff_eq!(pred.variance, array![1.1, 1.1], epsilon = 1e-12);
    }

    #[test]
    fn test_sampling_reproducible() {
        let gp = fitted_gp();
        let x = Array::linspace(-3., 3., 40);
        let a = gp.sample_posterior(&x, 5, &mut Lcg::seed_from_u64(7)).unwrap();
        let b = gp.sample_posterior(&x, 5, &mut Lcg::seed_from_u64(7)).unwrap();
        assert_eq!(a.dim(), (5, 40));
        assert_eq!(a, b);
        let p1 = gp.sample_prior(&x, 5, &mut Lcg::seed_from_u64(7));
        let p2 = gp.sample_prior(&x, 5, &mut Lcg::seed_from_u64(7));
        assert_eq!(p1, p2);
    }

    fn assert_moments(samples: &Array2<f64>, mean: f64, variance: f64) {
        let n = samples.nrows() as f64;
        let column = samples.column(0);
        let emp_mean = column.mean().unwrap();
        let emp_var = column.var(1.);
        let se_mean = (variance / n).sqrt();
        let se_var = variance * (2. / (n - 1.)).sqrt();
        assert!(
            (emp_mean - mean).abs() < 4. * se_mean,
            "mean {emp_mean} vs {mean}"
        );
        assert!(
            (emp_var - variance).abs() < 4. * se_var,
            "variance {emp_var} vs {variance}"
        );
    }

    #[test]
    fn test_sample_moments() {
        let gp = fitted_gp();
        let noise = gp.noise_variance();
        let mut rng = Xoshiro256Plus::seed_from_u64(42);

        // sampled curves are noise free latent functions
        for x in [array![0.4], array![3.5]] {
            let pred = gp.predict(&x).unwrap();
            let samples = gp.sample_posterior(&x, 1000, &mut rng).unwrap();
            assert_moments(&samples, pred.mean[0], pred.variance[0] - noise);
        }

        let mut prior = gp.clone();
        prior.reset();
        let x = array![0.4];
        let pred = prior.predict(&x).unwrap();
        let samples = prior.sample_prior(&x, 1000, &mut rng);
        assert_moments(&samples, pred.mean[0], pred.variance[0] - noise);
        let samples = prior.sample_posterior(&x, 1000, &mut rng).unwrap();
        assert_moments(&samples, pred.mean[0], pred.variance[0] - noise);
    }

    #[test]
    fn test_log_marginal_likelihood() {
        let gp = fitted_gp();
        let lml = gp.log_marginal_likelihood();
        assert!(lml.is_finite());

        let mut rough = gp.clone();
        rough.set_kernel(RbfKernel::new(0.01, 1.0)).unwrap();
        assert!(lml > rough.log_marginal_likelihood());

        // single point: log N(y; 0, k(x, x) + noise)
        let mut gp = GaussianProcess::params(RbfKernel::new(1.0, 1.0))
            .noise_variance(0.5)
            .build()
            .unwrap();
        gp.fit(&array![0.], &array![1.]).unwrap();
        let var = 1.5 + GP_JITTER;
        let expected = -0.5 / var - 0.5 * var.ln() - 0.5 * (2. * std::f64::consts::PI).ln();
        assert_abs_diff_eq!(gp.log_marginal_likelihood(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_fit_dataset() {
        let (xt, yt) = sine_dataset();
        let ds = Dataset::new(xt.clone().insert_axis(Axis(1)), yt);
        let gp = GaussianProcess::params(RbfKernel::new(1.0, 1.0))
            .noise_variance(0.1)
            .fit(&ds)
            .expect("GP fit");
        assert_abs_diff_eq!(
            gp.predict(&xt).unwrap().mean,
            fitted_gp().predict(&xt).unwrap().mean,
            epsilon = 1e-12
        );

        let ds = Dataset::new(array![[0., 1.], [1., 2.]], array![1., 2.]);
        assert!(GaussianProcess::params(RbfKernel::new(1.0, 1.0))
            .fit(&ds)
            .is_err());
    }

    #[cfg(feature = "persistent")]
    #[test]
    fn test_save_load() {
        let test_dir = "target/tests";
        std::fs::create_dir_all(test_dir).ok();
        let filename = format!("{test_dir}/gp_sine.json");
        let gp = fitted_gp();
        gp.save(&filename).expect("GP saved");
        let loaded = GaussianProcess::<f64, RbfKernel<f64>>::load(&filename).expect("GP loaded");
        let x = Array::linspace(-3., 3., 7);
        assert_abs_diff_eq!(
            loaded.predict(&x).unwrap().mean,
            gp.predict(&x).unwrap().mean,
            epsilon = 1e-12
        );
        assert_eq!(loaded.n_points(), 15);
    }

    macro_rules! test_gp {
        ($kernel:ident, $build:expr) => {
            paste! {
                #[test]
                fn [<test_gp_ $kernel:snake _interpolation>]() {
                    let (xt, yt) = sine_dataset();
                    let mut gp = GaussianProcess::params($build)
                        .noise_variance(1e-4)
                        .build()
                        .expect("GP params");
                    gp.fit(&xt, &yt).expect("GP fit");
                    let pred = gp.predict(&xt).unwrap();
                    // almost noiseless: interpolates training outputs
                    assert_abs_diff_eq!(pred.mean, yt, epsilon = 5e-2);
                    assert!(pred.variance.iter().all(|&v| v < 1e-2));
                    let x = Array::linspace(-4., 4., 20);
                    let samples = gp.sample_posterior(&x, 4, &mut Lcg::seed_from_u64(3)).unwrap();
                    assert!(samples.iter().all(|v| v.is_finite()));
                }
            }
        };
    }

    test_gp!(Rbf, RbfKernel::new(0.5, 1.0));
    test_gp!(Matern32, Matern32Kernel::new(0.5, 1.0));
    test_gp!(Periodic, PeriodicKernel::new(0.4, 1.0, 8.0));
}

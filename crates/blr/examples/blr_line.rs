use ndarray::{s, Array};
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::{Normal, Uniform};
use ndarray_rand::RandomExt;
use probreg_blr::BayesianLinearRegression;
use probreg_linalg::{CredibleLevel, Lcg};
use rand_xoshiro::Xoshiro256Plus;

// Watch the posterior of a noisy line `y = 2 + 1.5x` concentrate as data comes in.
// Run with `RUST_LOG=debug` to see fitting logs.
fn main() {
    env_logger::init();

    let mut rng = Xoshiro256Plus::seed_from_u64(42);
    let x = Array::random_using(200, Uniform::new(-3., 3.), &mut rng);
    let noise = Array::random_using(200, Normal::new(0., 1.5).unwrap(), &mut rng);
    let y = x.mapv(|v| 2. + 1.5 * v) + noise;

    let mut blr = BayesianLinearRegression::params()
        .noise_variance(2.25)
        .build()
        .expect("BLR params");
    println!("prior: {blr}");

    let xplot = Array::linspace(-3., 3., 7);
    for n in [5, 10, 20, 50, 100, 200] {
        let (xs, ys) = (x.slice(s![..n]), y.slice(s![..n]));
        blr.fit(&xs, &ys).expect("BLR fit");
        let trace = blr.posterior_cov().diag().sum();
        let ols = BayesianLinearRegression::ols_estimate(&xs, &ys);
        println!(
            "{blr} trace(cov)={trace:.4} ols=({:.3}, {:.3})",
            ols.intercept, ols.slope
        );
    }

    let band = blr.credible_band(&xplot, CredibleLevel::P95);
    for i in 0..xplot.len() {
        println!(
            "x={:5.2} mean={:6.3} 95% band=[{:6.3}, {:6.3}]",
            xplot[i], band.mean[i], band.lower[i], band.upper[i]
        );
    }

    let weights = blr.sample_posterior_weights(5, &mut Lcg::seed_from_u64(7));
    println!("posterior weight samples [intercept, slope]:\n{weights:.3}");

    let slopes = Array::linspace(1., 2., 5);
    let intercepts = Array::linspace(1.5, 2.5, 5);
    let grid = blr.posterior_contours(&slopes, &intercepts);
    println!("posterior density on (slope, intercept) grid:\n{:.2}", grid.density);
}

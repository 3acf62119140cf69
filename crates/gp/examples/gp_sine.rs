use ndarray::{Array, Array1};
use ndarray_npy::write_npy;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;
use probreg_gp::{AnyKernel, GaussianProcess, Matern32Kernel, PeriodicKernel, RbfKernel};
use probreg_linalg::{CredibleLevel, Lcg};
use rand_xoshiro::Xoshiro256Plus;

// Fit noisy sine observations with each kernel and dump mean, band and
// posterior curves as npy files for plotting.
// Run with `RUST_LOG=debug` to see fitting logs.
fn main() {
    env_logger::init();

    let mut rng = Xoshiro256Plus::seed_from_u64(42);
    let xt = Array::linspace(-4., 4., 15);
    let yt: Array1<f64> =
        xt.mapv(f64::sin) + Array::random_using(15, Normal::new(0., 0.2).unwrap(), &mut rng);
    let xplot = Array::linspace(-6., 6., 200);

    let kernels: [AnyKernel<f64>; 3] = [
        RbfKernel::new(1.0, 1.0).into(),
        Matern32Kernel::new(1.0, 1.0).into(),
        PeriodicKernel::new(1.0, 1.0, 2. * std::f64::consts::PI).into(),
    ];

    let mut gp = GaussianProcess::params(kernels[0])
        .noise_variance(0.04)
        .build()
        .expect("GP params");
    gp.fit(&xt, &yt).expect("GP fit");

    let test_dir = "target/examples";
    std::fs::create_dir_all(test_dir).ok();
    write_npy(format!("{test_dir}/gp_xplot.npy"), &xplot).expect("x saved");

    for (i, kernel) in kernels.iter().enumerate() {
        gp.set_kernel(*kernel).expect("GP refit");
        let band = gp
            .credible_band(&xplot, CredibleLevel::P95)
            .expect("GP band");
        let curves = gp
            .sample_posterior(&xplot, 5, &mut Lcg::seed_from_u64(7))
            .expect("GP sampling");
        println!(
            "{} log marginal likelihood = {:.3}",
            kernel,
            gp.log_marginal_likelihood()
        );
        write_npy(format!("{test_dir}/gp_mean_{i}.npy"), &band.mean).expect("mean saved");
        write_npy(format!("{test_dir}/gp_lower_{i}.npy"), &band.lower).expect("lower saved");
        write_npy(format!("{test_dir}/gp_upper_{i}.npy"), &band.upper).expect("upper saved");
        write_npy(format!("{test_dir}/gp_curves_{i}.npy"), &curves).expect("curves saved");
    }
}

use crate::matrix::cholesky;
use linfa::Float;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, Ix2, Zip};
use ndarray_rand::rand::{Error, Rng, RngCore, SeedableRng};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const LCG_MULTIPLIER: u64 = 6364136223846793005;
const LCG_INCREMENT: u64 = 1442695040888963407;

/// A seeded 64-bit linear congruential generator (Knuth MMIX constants).
///
/// It is cheap to create from a seed, so a caller can rebuild the same
/// stream at each redraw and get bit-identical samples.
/// Any other [Rng] (e.g. `Xoshiro256Plus`) can be used in its place.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Constructor given the initial state
    pub fn new(seed: u64) -> Self {
        Lcg { state: seed }
    }
}

impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        // high bits have the longest period
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_INCREMENT);
        self.state
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Lcg {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Lcg::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Lcg::new(state)
    }
}

/// Draw a standard normal value using Box-Muller transform
/// on two uniform values of the given random generator.
pub fn standard_normal<F: Float, R: Rng + ?Sized>(rng: &mut R) -> F {
    // u1 in (0, 1] to keep log finite
    let u1: f64 = 1. - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    F::cast((-2. * u1.ln()).sqrt() * (2. * PI * u2).cos())
}

/// Draw `n` samples `mean + L.z` where `L` is the given lower triangular factor
/// of the covariance and `z` a vector of independent standard normal values.
///
/// Returns a (n, dim) array, one sample per row.
pub fn sample_with_factor<F: Float, R: Rng + ?Sized>(
    mean: &ArrayBase<impl Data<Elem = F>, Ix1>,
    l: &ArrayBase<impl Data<Elem = F>, Ix2>,
    n: usize,
    rng: &mut R,
) -> Array2<F> {
    debug_assert_eq!(mean.len(), l.nrows(), "mean and factor dimensions differ");
    let dim = mean.len();
    let mut samples = Array2::zeros((n, dim));
    for mut sample in samples.rows_mut() {
        let z = Array1::from_shape_fn(dim, |_| standard_normal::<F, R>(rng));
        Zip::from(&mut sample)
            .and(mean)
            .and(&l.dot(&z))
            .for_each(|s, &m, &lz| *s = m + lz);
    }
    samples
}

/// Draw `n` samples from the multivariate normal distribution `N(mean, cov)`.
///
/// The covariance is factorized with [cholesky], the same random generator state
/// gives the same samples. Returns a (n, dim) array, one sample per row.
pub fn sample_multivariate_normal<F: Float, R: Rng + ?Sized>(
    mean: &ArrayBase<impl Data<Elem = F>, Ix1>,
    cov: &ArrayBase<impl Data<Elem = F>, Ix2>,
    n: usize,
    rng: &mut R,
) -> Array2<F> {
    debug_assert_eq!(mean.len(), cov.nrows(), "mean and covariance dimensions differ");
    let l = cholesky(cov);
    sample_with_factor(mean, &l, n, rng)
}

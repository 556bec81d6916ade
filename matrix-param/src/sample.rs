use ndarray::prelude::*;
use rand::Rng;
use rand_distr::{Beta, Distribution, Gamma};

/// Sample a probability vector from `Dirichlet(alpha)`
///
/// If X_i ~ Gamma(alpha_i, 1), then X_i / sum_j X_j ~ Dirichlet(alpha).
/// Draws are kept away from zero so that every entry stays positive.
pub fn rdirichlet<R>(alpha: &[f64], rng: &mut R) -> anyhow::Result<Array1<f64>>
where
    R: Rng + ?Sized,
{
    let mut draws = Array1::<f64>::zeros(alpha.len());
    for (x, &a) in draws.iter_mut().zip(alpha) {
        let gamma = Gamma::new(a, 1.0).map_err(|e| anyhow::anyhow!("Gamma({}, 1): {}", a, e))?;
        *x = gamma.sample(rng).max(f64::MIN_POSITIVE);
    }
    let denom = draws.sum();
    Ok(draws / denom)
}

/// Sample from a flat `Dirichlet(1, ..., 1)` of dimension `dim`
pub fn rdirichlet_flat<R>(dim: usize, rng: &mut R) -> anyhow::Result<Array1<f64>>
where
    R: Rng + ?Sized,
{
    rdirichlet(&vec![1.0; dim], rng)
}

/// `n` independent draws from `Beta(a, b)`, each strictly inside (0,1)
pub fn rbeta<R>(n: usize, a: f64, b: f64, rng: &mut R) -> anyhow::Result<Array1<f64>>
where
    R: Rng + ?Sized,
{
    let beta = Beta::new(a, b).map_err(|e| anyhow::anyhow!("Beta({}, {}): {}", a, b, e))?;
    let eps = f64::EPSILON;
    Ok((0..n)
        .map(|_| beta.sample(rng).clamp(eps, 1.0 - eps))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_dirichlet_on_simplex() {
        let mut rng = StdRng::seed_from_u64(42);
        for alpha in [vec![0.1; 4], vec![1.0; 7], vec![50.0, 1.0]] {
            let x = rdirichlet(&alpha, &mut rng).unwrap();
            assert_eq!(x.len(), alpha.len());
            assert!(x.iter().all(|&v| v > 0.0 && v.is_finite()));
            assert_abs_diff_eq!(x.sum(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_seed_reproducible() {
        let x = rdirichlet_flat(5, &mut StdRng::seed_from_u64(7)).unwrap();
        let y = rdirichlet_flat(5, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(x, y);
    }

    #[test]
    fn test_beta_inside_unit_interval() {
        let mut rng = StdRng::seed_from_u64(1);
        let x = rbeta(100, 1.0, 1.0, &mut rng).unwrap();
        assert!(x.iter().all(|&v| v > 0.0 && v < 1.0));
        assert!(rbeta(1, 0.0, 1.0, &mut rng).is_err());
    }
}

use crate::dataset::Dataset;
use crate::dna::NUM_BASES;
use crate::error::*;
use ndarray::prelude::*;

/// Priors of the gapped PSSM model
///
/// * `k` - motif width, counting the columns around the optional gap
/// * `phi` - Dirichlet prior of the motif columns
/// * `varphi` - Dirichlet prior of the background column
/// * `alpha` - Beta prior of the gap probability
#[derive(Debug, Clone)]
pub struct Hyperparameters {
    k: usize,
    phi: Array1<f64>,
    varphi: Array1<f64>,
    alpha: Array1<f64>,
}

impl Hyperparameters {
    pub fn new(k: usize, phi: &[f64], varphi: &[f64], alpha: &[f64]) -> Result<Self> {
        if k < 1 {
            return config_err("motif width K must be at least 1");
        }
        check_prior("phi", phi, NUM_BASES)?;
        check_prior("varphi", varphi, NUM_BASES)?;
        check_prior("alpha", alpha, 2)?;
        Ok(Self {
            k,
            phi: Array1::from(phi.to_vec()),
            varphi: Array1::from(varphi.to_vec()),
            alpha: Array1::from(alpha.to_vec()),
        })
    }

    /// Flat priors: every pseudo-count is one
    pub fn flat(k: usize) -> Result<Self> {
        Self::new(k, &[1.0; NUM_BASES], &[1.0; NUM_BASES], &[1.0; 2])
    }

    pub fn width(&self) -> usize {
        self.k
    }

    pub fn phi(&self) -> &Array1<f64> {
        &self.phi
    }

    pub fn varphi(&self) -> &Array1<f64> {
        &self.varphi
    }

    pub fn alpha(&self) -> &Array1<f64> {
        &self.alpha
    }

    /// `(K+1) x 4` prior of omega: row 0 is `varphi`, the rest `phi`
    pub fn omega_prior(&self) -> Array2<f64> {
        let mut prior = Array2::zeros((self.k + 1, NUM_BASES));
        prior.row_mut(0).assign(&self.varphi);
        for mut row in prior.rows_mut().into_iter().skip(1) {
            row.assign(&self.phi);
        }
        prior
    }

    /// Every sequence must be longer than `K` so that there is at
    /// least one candidate start
    pub fn check_dataset(&self, data: &Dataset) -> Result<()> {
        for (n, seq) in data.iter().enumerate() {
            if seq.len() <= self.k {
                return config_err(format!(
                    "sequence {} has length {}, but needs more than K = {}",
                    n,
                    seq.len(),
                    self.k
                ));
            }
        }
        Ok(())
    }
}

fn check_prior(name: &str, values: &[f64], dim: usize) -> Result<()> {
    if values.len() != dim {
        return config_err(format!(
            "{} needs {} values, got {}",
            name,
            dim,
            values.len()
        ));
    }
    if values.iter().any(|&x| !(x.is_finite() && x > 0.0)) {
        return config_err(format!("{} must be positive: {:?}", name, values));
    }
    Ok(())
}

/// How the per-sequence gap probabilities `mu` are initialized
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[clap(rename_all = "lowercase")]
pub enum MuInit {
    /// N independent Beta(1,1) draws
    #[default]
    Beta,
    /// One N-dimensional flat Dirichlet draw used elementwise, so the
    /// values sum to one across sequences (needs N > 1)
    Dirichlet,
}

/// Randomized initialization of the variational parameters
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Random seed. Default: 42
    pub seed: u64,
    /// Initialization of `mu`. Default: Beta
    pub mu_init: MuInit,
}

impl Default for InitOptions {
    fn default() -> Self {
        InitOptions {
            seed: 42,
            mu_init: MuInit::default(),
        }
    }
}

/// Stopping rules of the learner
#[derive(Debug, Clone)]
pub struct LearnerOptions {
    /// Stop after this many updates. Default: no limit
    pub max_updates: Option<usize>,
    /// Converged once two consecutive relative gains fall below this.
    /// Default: 1e-6
    pub convergence_epsilon: f64,
}

impl Default for LearnerOptions {
    fn default() -> Self {
        LearnerOptions {
            max_updates: None,
            convergence_epsilon: 1e-6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_omega_prior() {
        let hyper = Hyperparameters::new(3, &[0.5; 4], &[2.0, 3.0, 3.0, 2.0], &[1.0, 9.0]).unwrap();
        let prior = hyper.omega_prior();
        assert_eq!(prior.dim(), (4, 4));
        assert_eq!(prior.row(0), array![2.0, 3.0, 3.0, 2.0]);
        assert!(prior.slice(s![1.., ..]).iter().all(|&x| x == 0.5));
    }

    #[test]
    fn test_reject_bad_priors() {
        assert!(Hyperparameters::new(0, &[1.0; 4], &[1.0; 4], &[1.0; 2]).is_err());
        assert!(Hyperparameters::new(2, &[1.0; 3], &[1.0; 4], &[1.0; 2]).is_err());
        assert!(Hyperparameters::new(2, &[1.0; 4], &[1.0; 4], &[1.0; 3]).is_err());
        assert!(Hyperparameters::new(2, &[1.0; 4], &[1.0, -1.0, 1.0, 1.0], &[1.0; 2]).is_err());
        assert!(Hyperparameters::new(2, &[f64::NAN; 4], &[1.0; 4], &[1.0; 2]).is_err());
    }

    #[test]
    fn test_width_versus_lengths() {
        let data = Dataset::from_strs(&["acgt", "acg"]).unwrap();
        assert!(Hyperparameters::flat(2).unwrap().check_dataset(&data).is_ok());
        assert!(Hyperparameters::flat(3).unwrap().check_dataset(&data).is_err());
    }
}

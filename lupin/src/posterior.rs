use crate::dataset::Dataset;
use crate::dna::NUM_BASES;
use crate::error::*;
use crate::hyper::*;

use matrix_param::ndarray_dirichlet::DirichletMatrix;
use matrix_param::sample::{rbeta, rdirichlet, rdirichlet_flat};
use matrix_param::traits::{DirichletParam, Inference};
use matrix_util::traits::{ProbabilityOps, RowProbabilityOps};
use ndarray::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Tolerance for `sum == 1` checks on categorical parameters
pub const SUM_TOLERANCE: f64 = 1e-6;

/// Mean-field posterior of the gapped PSSM model
///
/// * `omega` - `(K+1) x 4` Dirichlet pseudo-counts; row 0 is the
///   background, rows `1..=K` the motif columns. It also carries the
///   expected (log-)emission probabilities, recomputed whenever omega
///   changes.
/// * `lambda` - Beta pseudo-counts of the gap probability
/// * `eta` - categorical over the `K-1` gap positions
/// * `mu` - per-sequence probability of carrying a gap
/// * `nu` - per-sequence categorical over the `I(n)-K` starts
#[derive(Debug, Clone)]
pub struct VariationalPosterior {
    pub(crate) omega: DirichletMatrix,
    pub(crate) lambda: DirichletMatrix,
    pub(crate) eta: Array1<f64>,
    pub(crate) mu: Array1<f64>,
    pub(crate) nu: Vec<Array1<f64>>,
}

impl VariationalPosterior {
    /// Randomized initialization
    ///
    /// * omega[0] = varphi; omega[1..=K] ~ Dirichlet(phi)
    /// * lambda = (1, 1)
    /// * eta ~ Dirichlet(1, ..., 1)
    /// * mu according to `init.mu_init`
    /// * nu[n] ~ Dirichlet(1, ..., 1)
    pub fn init_var_params(
        data: &Dataset,
        hyper: &Hyperparameters,
        init: &InitOptions,
    ) -> Result<Self> {
        hyper.check_dataset(data)?;

        let k = hyper.width();
        let nn = data.num_sequences();
        let mut rng = StdRng::seed_from_u64(init.seed);

        let mut omega_init = Array2::zeros((k + 1, NUM_BASES));
        omega_init.row_mut(0).assign(hyper.varphi());
        let phi = hyper.phi().to_vec();
        for r in 1..=k {
            omega_init.row_mut(r).assign(&sample(rdirichlet(&phi, &mut rng))?);
        }

        let eta = sample(rdirichlet_flat(k - 1, &mut rng))?;

        let mu = match init.mu_init {
            MuInit::Beta => sample(rbeta(nn, 1.0, 1.0, &mut rng))?,
            MuInit::Dirichlet => {
                if nn < 2 {
                    return config_err(
                        "Dirichlet initialization of mu needs at least two sequences",
                    );
                }
                sample(rdirichlet_flat(nn, &mut rng))?
            }
        };

        let mut nu = Vec::with_capacity(nn);
        for n in 0..nn {
            nu.push(sample(rdirichlet_flat(data.len_of(n) - k, &mut rng))?);
        }

        Self::from_parts(data, hyper, omega_init, [1.0, 1.0], eta, mu, nu)
    }

    /// Assemble a posterior from explicit values, e.g., to pin a
    /// starting point. Shapes are checked against the data and the
    /// priors, and every invariant must hold.
    pub fn from_parts(
        data: &Dataset,
        hyper: &Hyperparameters,
        omega: Array2<f64>,
        lambda: [f64; 2],
        eta: Array1<f64>,
        mu: Array1<f64>,
        nu: Vec<Array1<f64>>,
    ) -> Result<Self> {
        hyper.check_dataset(data)?;
        let k = hyper.width();

        if omega.dim() != (k + 1, NUM_BASES) {
            return config_err(format!(
                "omega must be {} x {}, got {:?}",
                k + 1,
                NUM_BASES,
                omega.dim()
            ));
        }
        if mu.len() != data.num_sequences() || nu.len() != data.num_sequences() {
            return config_err(format!(
                "mu and nu need one entry per sequence ({}), got {} and {}",
                data.num_sequences(),
                mu.len(),
                nu.len()
            ));
        }

        let mut omega_param = DirichletMatrix::new(hyper.omega_prior())
            .map_err(|e| ModelError::Configuration(e.to_string()))?;
        let alpha = hyper.alpha();
        let mut lambda_param = DirichletMatrix::new(array![[alpha[0], alpha[1]]])
            .map_err(|e| ModelError::Configuration(e.to_string()))?;

        let positive = |x: &f64| x.is_finite() && *x > 0.0;
        if !omega.iter().all(positive) || !lambda.iter().all(positive) {
            return config_err("omega and lambda must be positive");
        }
        omega_param
            .set_stat(omega)
            .map_err(|e| ModelError::Configuration(e.to_string()))?;
        lambda_param
            .set_stat(array![[lambda[0], lambda[1]]])
            .map_err(|e| ModelError::Configuration(e.to_string()))?;

        let ret = Self {
            omega: omega_param,
            lambda: lambda_param,
            eta,
            mu,
            nu,
        };

        ret.check_invariants(data, hyper).map_err(|e| match e {
            ModelError::NumericInstability { .. } => ModelError::Configuration(e.to_string()),
            e => e,
        })?;
        Ok(ret)
    }

    /// Dirichlet pseudo-counts, `(K+1) x 4`
    pub fn omega(&self) -> &Array2<f64> {
        self.omega.stat()
    }

    /// Beta pseudo-counts of the gap probability
    pub fn lambda(&self) -> ArrayView1<'_, f64> {
        self.lambda.stat().row(0)
    }

    pub fn eta(&self) -> &Array1<f64> {
        &self.eta
    }

    pub fn mu(&self) -> &Array1<f64> {
        &self.mu
    }

    pub fn nu(&self, n: usize) -> &Array1<f64> {
        &self.nu[n]
    }

    pub fn num_sequences(&self) -> usize {
        self.mu.len()
    }

    /// `E[ln theta[r,x]] = digamma(omega[r,x]) - digamma(sum_x omega[r,x])`
    pub fn log_p_x_given_r(&self) -> &Array2<f64> {
        self.omega.posterior_log_mean()
    }

    /// `E[theta[r,x]] = omega[r,x] / sum_x omega[r,x]`
    pub fn p_x_given_r(&self) -> &Array2<f64> {
        self.omega.posterior_mean()
    }

    /// Recompute the expected emission caches from the current omega.
    /// Every omega update already does this; calling it again changes
    /// nothing.
    pub fn recompute_cache(&mut self) {
        self.omega.calibrate();
        self.lambda.calibrate();
    }

    /// `(E[ln gamma], E[ln(1 - gamma)])` under Beta(lambda)
    pub fn expected_log_gamma(&self) -> (f64, f64) {
        let log_mean = self.lambda.posterior_log_mean();
        (log_mean[(0, 0)], log_mean[(0, 1)])
    }

    /// Posterior mean of the motif and background columns, each row
    /// summing to one
    pub fn expected_pssm(&self) -> Array2<f64> {
        self.omega.stat().sum_to_one_rows()
    }

    pub(crate) fn check_omega(&self) -> Result<()> {
        let omega = self.omega.stat();
        for (r, row) in omega.rows().into_iter().enumerate() {
            if row.iter().any(|&x| !(x.is_finite() && x > 0.0)) {
                return Err(unstable("omega", Some(r), format!("{}", row)));
            }
        }
        for (r, row) in self.p_x_given_r().rows().into_iter().enumerate() {
            if !row.to_owned().is_distribution(SUM_TOLERANCE) {
                return Err(unstable("p_x_given_r", Some(r), format!("{}", row)));
            }
        }
        if self.log_p_x_given_r().iter().any(|x| !x.is_finite()) {
            return Err(unstable("log_p_x_given_r", None, "not finite"));
        }
        Ok(())
    }

    /// Verify every invariant of the posterior
    pub fn check_invariants(&self, data: &Dataset, hyper: &Hyperparameters) -> Result<()> {
        let k = hyper.width();

        self.check_omega()?;

        let lambda = self.lambda();
        if lambda.iter().any(|&x| !(x.is_finite() && x > 0.0)) {
            return Err(unstable("lambda", None, format!("{}", lambda)));
        }

        if self.eta.len() != k - 1 {
            return Err(unstable(
                "eta",
                None,
                format!("length {} instead of {}", self.eta.len(), k - 1),
            ));
        }
        if k > 1 && !self.eta.is_distribution(SUM_TOLERANCE) {
            return Err(unstable("eta", None, format!("{}", self.eta)));
        }

        for (n, &mu) in self.mu.iter().enumerate() {
            if !(mu.is_finite() && mu > 0.0 && mu < 1.0) {
                return Err(unstable("mu", Some(n), format!("{}", mu)));
            }
        }

        for (n, nu) in self.nu.iter().enumerate() {
            let expected = data.len_of(n) - k;
            if nu.len() != expected {
                return Err(unstable(
                    "nu",
                    Some(n),
                    format!("length {} instead of {}", nu.len(), expected),
                ));
            }
            if !nu.is_distribution(SUM_TOLERANCE) {
                return Err(unstable("nu", Some(n), format!("{}", nu)));
            }
        }

        Ok(())
    }
}

fn sample(draw: anyhow::Result<Array1<f64>>) -> Result<Array1<f64>> {
    draw.map_err(|e| ModelError::Configuration(e.to_string()))
}

use crate::dataset::Dataset;
use crate::error::*;
use crate::hyper::*;
use crate::llik;
use crate::posterior::VariationalPosterior;
use crate::sites::{decode_sites, MostLikely, Site};
use crate::update;
use ndarray::prelude::*;

/// Gapped PSSM model: data, priors, and the mean-field posterior
/// that every [`update`](GappedPssm::update) refines in place
#[derive(Debug, Clone)]
pub struct GappedPssm {
    data: Dataset,
    hyper: Hyperparameters,
    posterior: VariationalPosterior,
}

impl GappedPssm {
    /// Check the configuration and draw a random starting posterior
    pub fn new(data: Dataset, hyper: Hyperparameters, init: &InitOptions) -> Result<Self> {
        let posterior = VariationalPosterior::init_var_params(&data, &hyper, init)?;
        Ok(Self {
            data,
            hyper,
            posterior,
        })
    }

    /// Start from a given posterior instead of a random one
    pub fn with_posterior(
        data: Dataset,
        hyper: Hyperparameters,
        posterior: VariationalPosterior,
    ) -> Result<Self> {
        hyper.check_dataset(&data)?;
        if posterior.num_sequences() != data.num_sequences() {
            return config_err(format!(
                "posterior covers {} sequences, data has {}",
                posterior.num_sequences(),
                data.num_sequences()
            ));
        }
        if posterior.omega().nrows() != hyper.width() + 1 {
            return config_err("posterior was built for another motif width");
        }
        posterior
            .check_invariants(&data, &hyper)
            .map_err(|e| ModelError::Configuration(e.to_string()))?;
        Ok(Self {
            data,
            hyper,
            posterior,
        })
    }

    /// One round of coordinate ascent
    pub fn update(&mut self) -> Result<()> {
        update::update(&self.data, &self.hyper, &mut self.posterior)
    }

    pub fn log_likelihood(&self) -> f64 {
        llik::log_likelihood(&self.data, &self.hyper, &self.posterior)
    }

    /// `(K+1) x 4`, each omega row divided by its sum
    pub fn expected_pssm(&self) -> Array2<f64> {
        self.posterior.expected_pssm()
    }

    pub fn most_likely(&self) -> MostLikely {
        MostLikely::decode(&self.posterior)
    }

    pub fn sites(&self) -> Vec<Site> {
        decode_sites(&self.data, &self.hyper, &self.posterior)
    }

    pub fn posterior(&self) -> &VariationalPosterior {
        &self.posterior
    }

    #[cfg(test)]
    pub(crate) fn posterior_mut(&mut self) -> &mut VariationalPosterior {
        &mut self.posterior
    }

    pub fn dataset(&self) -> &Dataset {
        &self.data
    }

    pub fn hyper(&self) -> &Hyperparameters {
        &self.hyper
    }

    pub fn width(&self) -> usize {
        self.hyper.width()
    }
}

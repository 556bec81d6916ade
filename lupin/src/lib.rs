//! Gapped PSSM motif discovery by mean-field variational Bayes.
//!
//! A motif of width `K` may skip one base in individual sites: the
//! skipped slot is explained by the background column. Given DNA
//! sequences we infer
//!
//! - Dirichlet posteriors of the background and `K` motif columns,
//! - whether each sequence carries a gapped site,
//! - where the gap falls within the motif,
//! - where each site starts.
//!
//! # Usage
//!
//! ```ignore
//! use lupin::*;
//!
//! let data = Dataset::from_strs(&["ttacgtaa", "ggacgttc"])?;
//! let hyper = Hyperparameters::flat(3)?;
//! let model = GappedPssm::new(data, hyper, &InitOptions::default())?;
//!
//! let options = LearnerOptions { max_updates: Some(100), ..Default::default() };
//! let mut learner = Learner::new(model, options);
//! learner.run()?;
//! let pssm = learner.model().expected_pssm();
//! ```

/// Column resolution and enumeration of latent hypotheses
pub mod combinations;

pub mod dataset;

/// DNA base coding
pub mod dna;

pub mod error;

/// Priors and run options
pub mod hyper;

/// Coordinate ascent driver and its stopping rules
pub mod learner;

/// Monitoring log-likelihood
pub mod llik;

pub mod model;

/// Mean-field posterior and its invariants
pub mod posterior;

/// MAP decoding
pub mod sites;

/// Coordinate ascent updates
pub mod update;

pub use combinations::{ColumnMap, Combination, CombinationGenerator, Orientation};
pub use dataset::Dataset;
pub use dna::{Dna, NUM_BASES};
pub use error::{ModelError, Result};
pub use hyper::{Hyperparameters, InitOptions, LearnerOptions, MuInit};
pub use learner::{Learner, LearnerState};
pub use model::GappedPssm;
pub use posterior::VariationalPosterior;
pub use sites::{MostLikely, Site};

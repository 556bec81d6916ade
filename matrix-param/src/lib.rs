/// Dirichlet (and Beta) pseudo-count matrices with digamma calibration
pub mod ndarray_dirichlet;

/// Sampling helpers for initializing variational parameters
pub mod sample;

pub mod traits;

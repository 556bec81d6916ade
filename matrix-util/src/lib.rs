/// gzip-aware line readers and writers
pub mod common_io;

/// normalisation of probability vectors in linear and log space
pub mod ndarray_util;

pub mod traits;

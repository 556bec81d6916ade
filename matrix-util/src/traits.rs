/// Operations on a probability vector, stored either as weights or
/// as unnormalized log-weights
pub trait ProbabilityOps {
    type Vec;
    type Scalar;

    /// Softmax of log-weights. Every entry is floored at
    /// [`PROBABILITY_FLOOR`](crate::ndarray_util::PROBABILITY_FLOOR)
    /// and the result renormalized, so no entry is exactly zero and,
    /// with two or more entries, none is exactly one.
    fn probabilities_from_logs(&self) -> Self::Vec;

    /// Position of the largest value (the first one on ties); `None`
    /// for an empty vector or when everything is NaN
    fn argmax(&self) -> Option<usize>;

    /// All entries finite and strictly positive with their sum within
    /// `tol` of one
    fn is_distribution(&self, tol: Self::Scalar) -> bool;
}

/// Row-wise normalization of a matrix
pub trait RowProbabilityOps {
    type Mat;

    fn sum_to_one_rows(&self) -> Self::Mat;
}

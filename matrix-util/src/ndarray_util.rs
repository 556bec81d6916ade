pub use ndarray::prelude::*;

use crate::traits::*;
use num_traits::Float;

/// Smallest probability a softmax output may take
pub const PROBABILITY_FLOOR: f64 = 1e-15;

impl<T> ProbabilityOps for Array1<T>
where
    T: Float,
{
    type Vec = Self;
    type Scalar = T;

    fn probabilities_from_logs(&self) -> Self::Vec {
        let floor: T = num_traits::cast(PROBABILITY_FLOOR).unwrap_or_else(T::epsilon);
        let max_log = self.iter().fold(T::neg_infinity(), |a, &b| a.max(b));
        let mut probs = self.mapv(|x| (x - max_log).exp());
        let denom = probs.sum();
        probs.mapv_inplace(|x| (x / denom).max(floor));
        let denom = probs.sum();
        probs.mapv_inplace(|x| x / denom);
        probs
    }

    fn argmax(&self) -> Option<usize> {
        let mut ret: Option<(usize, T)> = None;
        for (j, &x) in self.iter().enumerate() {
            if x.is_nan() {
                continue;
            }
            match ret {
                Some((_, best)) if x <= best => {}
                _ => ret = Some((j, x)),
            }
        }
        ret.map(|(j, _)| j)
    }

    fn is_distribution(&self, tol: Self::Scalar) -> bool {
        self.iter().all(|&x| x.is_finite() && x > T::zero())
            && (self.sum() - T::one()).abs() <= tol
    }
}

impl<T> RowProbabilityOps for Array2<T>
where
    T: Float,
{
    type Mat = Self;

    fn sum_to_one_rows(&self) -> Self::Mat {
        let mut ret = self.clone();
        for mut row in ret.rows_mut() {
            let denom = row.sum();
            row.mapv_inplace(|x| x / denom);
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_probabilities_from_logs_large_offsets() {
        let logs = array![-1000.0_f64, -1001.0, -1000.5];
        let probs = logs.probabilities_from_logs();
        assert!(probs.is_distribution(1e-12));
        assert_eq!(probs.argmax(), Some(0));

        let shifted = array![0.0_f64, -1.0, -0.5].probabilities_from_logs();
        assert_abs_diff_eq!(probs, shifted, epsilon = 1e-12);
    }

    #[test]
    fn test_saturated_logs_stay_positive() {
        // differences of thousands of nats underflow a plain softmax
        let probs = array![0.0_f64, -5000.0, -2000.0, -1.0].probabilities_from_logs();
        assert!(probs.is_distribution(1e-12));
        assert!(probs.iter().all(|&p| p > 0.0 && p < 1.0));
        assert_eq!(probs.argmax(), Some(0));

        let two = array![-1e4_f64, 0.0].probabilities_from_logs();
        assert!(two[0] > 0.0);
        assert!(two[1] < 1.0);
        assert_abs_diff_eq!(two.sum(), 1.0, epsilon = 1e-12);

        let single = array![-3.0_f64].probabilities_from_logs();
        assert_abs_diff_eq!(single[0], 1.0);
    }

    #[test]
    fn test_argmax_ties_and_nan() {
        assert_eq!(array![1.0_f64, 3.0, 3.0].argmax(), Some(1));
        assert_eq!(array![f64::NAN, 0.5].argmax(), Some(1));
        assert_eq!(Array1::<f64>::zeros(0).argmax(), None);
    }

    #[test]
    fn test_distribution_check_rejects_zero() {
        assert!(!array![0.0_f64, 1.0].is_distribution(1e-8));
        assert!(!array![0.5_f64, 0.6].is_distribution(1e-8));
        assert!(array![0.25_f64, 0.75].is_distribution(1e-8));
    }
}

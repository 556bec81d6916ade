use crate::combinations::CombinationGenerator;
use crate::dataset::Dataset;
use crate::hyper::Hyperparameters;
use crate::posterior::VariationalPosterior;
use ndarray::prelude::*;

/// Sum over sequences and positions of
///
/// ln sum_{s,h,g} q_s q_h q_g E[theta[r,x]]
///
/// A monitoring statistic built from the expected emission
/// probabilities. It is not the evidence lower bound, so the updates
/// do not guarantee that it increases.
pub fn log_likelihood(data: &Dataset, hyper: &Hyperparameters, post: &VariationalPosterior) -> f64 {
    let k = hyper.width();
    let p = post.p_x_given_r();

    let mut llik = 0.0;
    for n in 0..data.num_sequences() {
        let mut accum = Array1::<f64>::zeros(data.len_of(n));
        for c in CombinationGenerator::new(data, post, k, n).iter(false) {
            accum[c.i] += c.weight() * p[(c.r, c.x)];
        }
        llik += accum.mapv(f64::ln).sum();
    }
    llik
}

//! One round of coordinate ascent over the mean-field posterior.

use crate::combinations::CombinationGenerator;
use crate::dataset::Dataset;
use crate::dna::NUM_BASES;
use crate::error::*;
use crate::hyper::Hyperparameters;
use crate::posterior::VariationalPosterior;

use matrix_param::traits::DirichletParam;
use matrix_util::traits::ProbabilityOps;
use ndarray::prelude::*;

/// `omega -> (mu, nu, eta) -> lambda`, then check every invariant
pub fn update(
    data: &Dataset,
    hyper: &Hyperparameters,
    post: &mut VariationalPosterior,
) -> Result<()> {
    update_omega(data, hyper, post)?;
    update_mu_nu_eta(data, hyper, post)?;
    update_lambda(data, post)?;
    post.check_invariants(data, hyper)
}

/// omega[r,x] = prior[r,x] + sum over sequences and combinations
/// with `(r, x)` of `q_s * q_h * q_g`; the emission caches are
/// recomputed along the way
pub fn update_omega(
    data: &Dataset,
    hyper: &Hyperparameters,
    post: &mut VariationalPosterior,
) -> Result<()> {
    let k = hyper.width();
    let mut counts = Array2::<f64>::zeros((k + 1, NUM_BASES));

    for n in 0..data.num_sequences() {
        for c in CombinationGenerator::new(data, post, k, n).iter(false) {
            counts[(c.r, c.x)] += c.weight();
        }
    }

    post.omega
        .update_stat(&counts)
        .map_err(|e| unstable("omega", None, e.to_string()))?;
    post.check_omega()
}

/// Expected log-likelihood contributions of each latent variable,
/// weighted by the other two factors, normalized in log space
///
/// * `mu[n]` from `log_g`, with the Beta prior expectations
/// * `nu[n]` from `log_s`
/// * `eta` from `log_h`, pooled over sequences (skipped when `K = 1`)
pub fn update_mu_nu_eta(
    data: &Dataset,
    hyper: &Hyperparameters,
    post: &mut VariationalPosterior,
) -> Result<()> {
    let k = hyper.width();
    let nn = data.num_sequences();
    let (e_log_gamma, e_log_one_minus_gamma) = post.expected_log_gamma();
    let log_p = post.log_p_x_given_r();

    let mut mu = Array1::<f64>::zeros(nn);
    let mut nu = Vec::with_capacity(nn);
    let mut log_h = Array1::<f64>::zeros(k - 1);

    for n in 0..nn {
        let gen = CombinationGenerator::new(data, post, k, n);
        let mut log_g = array![e_log_one_minus_gamma, e_log_gamma];
        let mut log_s = Array1::<f64>::zeros(gen.num_starts());

        for c in gen.iter(false) {
            let lp = log_p[(c.r, c.x)];
            log_g[c.g] += c.q_s * c.q_h * lp;
            log_s[c.s] += c.q_g * c.q_h * lp;
            if c.g == 1 && k > 1 {
                log_h[c.h] += c.q_g * c.q_s * lp;
            }
        }

        mu[n] = log_g.probabilities_from_logs()[1];
        nu.push(log_s.probabilities_from_logs());
    }

    post.mu = mu;
    post.nu = nu;
    if k > 1 {
        post.eta = log_h.probabilities_from_logs();
    }
    Ok(())
}

/// lambda = (alpha[0] + sum mu, alpha[1] + N - sum mu)
pub fn update_lambda(data: &Dataset, post: &mut VariationalPosterior) -> Result<()> {
    let sum_mu = post.mu.sum();
    let nn = data.num_sequences() as f64;
    post.lambda
        .update_stat(&array![[sum_mu, nn - sum_mu]])
        .map_err(|e| unstable("lambda", None, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hyper::InitOptions;
    use approx::assert_abs_diff_eq;

    fn setup() -> (Dataset, Hyperparameters, VariationalPosterior) {
        let data = Dataset::from_strs(&["ccgatcgg", "atcgatta", "ttcgaac"]).unwrap();
        let hyper = Hyperparameters::new(3, &[0.5; 4], &[1.0; 4], &[1.0, 2.0]).unwrap();
        let post =
            VariationalPosterior::init_var_params(&data, &hyper, &InitOptions::default()).unwrap();
        (data, hyper, post)
    }

    #[test]
    fn test_omega_counts_every_position() {
        let (data, hyper, mut post) = setup();
        update_omega(&data, &hyper, &mut post).unwrap();

        // the weights of each position sum to one, so the pseudo-counts
        // add up to the prior mass plus the total sequence length
        let prior_mass = hyper.omega_prior().sum();
        let total_len: usize = data.iter().map(|s| s.len()).sum();
        assert_abs_diff_eq!(post.omega().sum(), prior_mass + total_len as f64, epsilon = 1e-9);
        assert_abs_diff_eq!(*post.p_x_given_r(), post.expected_pssm(), epsilon = 1e-12);
    }

    #[test]
    fn test_lambda_tracks_mu() {
        let (data, hyper, mut post) = setup();
        update_omega(&data, &hyper, &mut post).unwrap();
        update_mu_nu_eta(&data, &hyper, &mut post).unwrap();
        update_lambda(&data, &mut post).unwrap();

        let sum_mu = post.mu().sum();
        assert_abs_diff_eq!(post.lambda()[0], 1.0 + sum_mu, epsilon = 1e-12);
        assert_abs_diff_eq!(post.lambda()[1], 2.0 + 3.0 - sum_mu, epsilon = 1e-12);
    }

    #[test]
    fn test_update_keeps_invariants() {
        let (data, hyper, mut post) = setup();
        for _ in 0..20 {
            update(&data, &hyper, &mut post).unwrap();
        }
        assert_eq!(post.eta().len(), 2);
        assert_abs_diff_eq!(post.eta().sum(), 1.0, epsilon = 1e-9);
        for n in 0..data.num_sequences() {
            assert_abs_diff_eq!(post.nu(n).sum(), 1.0, epsilon = 1e-9);
            assert!(post.nu(n).iter().all(|&x| x > 0.0));
            assert!(post.mu()[n] > 0.0 && post.mu()[n] < 1.0);
        }
        for row in post.p_x_given_r().rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_broken_posterior_reports_instability() {
        let (data, hyper, mut post) = setup();
        post.nu[0] = Array1::from_elem(data.len_of(0) - 3, f64::NAN);

        match update(&data, &hyper, &mut post) {
            Err(ModelError::NumericInstability { variable, index, .. }) => {
                assert_eq!(variable, "omega");
                assert!(index.is_some());
            }
            other => panic!("expected numeric instability, got {:?}", other),
        }
    }

    #[test]
    fn test_saturated_eta_stays_positive() {
        // a long run of one repeated site drives the gap position
        // posterior far into saturation
        let seqs: Vec<String> = (0..30)
            .map(|n| {
                if n % 2 == 0 {
                    "ttacgatgcaatcggttacgatgcaatcgg".to_string()
                } else {
                    "ttacgatcgcaatcggacgatgcaatcggt".to_string()
                }
            })
            .collect();
        let data = Dataset::from_strs(&seqs).unwrap();
        let hyper = Hyperparameters::new(12, &[0.1; 4], &[1.0; 4], &[1.0, 1.0]).unwrap();
        let mut post =
            VariationalPosterior::init_var_params(&data, &hyper, &InitOptions::default()).unwrap();

        for _ in 0..30 {
            update(&data, &hyper, &mut post).unwrap();
        }
        assert!(post.eta().iter().all(|&x| x > 0.0));
        assert!(post.mu().iter().all(|&x| x > 0.0 && x < 1.0));
    }
}

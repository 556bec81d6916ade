extern crate special;

use crate::traits::*;
use ndarray::prelude::*;

/// Rows of Dirichlet pseudo-counts
///
/// x ~ Categorical(theta[r,])
/// theta[r,] ~ Dirichlet(prior[r,])
///
/// A two-column matrix is a stack of Beta distributions.
#[derive(Debug, Clone)]
pub struct DirichletMatrix {
    num_rows: usize,
    num_columns: usize,
    //////////////////////
    // hyper parameters //
    //////////////////////
    prior: Array2<f64>,
    ///////////////////////////
    // sufficient statistics //
    ///////////////////////////
    stat: Array2<f64>,
    //////////////////////////
    // estimated parameters //
    //////////////////////////
    estimated_mean: Array2<f64>,
    estimated_log_mean: Array2<f64>,
}

impl DirichletParam for DirichletMatrix {
    type Mat = Array2<f64>;

    /// New Dirichlet parameter matrix starting at the prior
    ///
    /// # Arguments
    /// * `prior` - positive pseudo-counts, one Dirichlet per row
    ///
    fn new(prior: Self::Mat) -> anyhow::Result<Self> {
        if prior.is_empty() {
            anyhow::bail!("empty Dirichlet prior");
        }
        if prior.iter().any(|&a| !(a.is_finite() && a > 0.0)) {
            anyhow::bail!("Dirichlet prior must be positive and finite");
        }

        let dims = prior.dim();
        let mut ret = Self {
            num_rows: dims.0,
            num_columns: dims.1,
            stat: prior.clone(),
            prior,
            estimated_mean: Self::Mat::zeros(dims),
            estimated_log_mean: Self::Mat::zeros(dims),
        };
        ret.calibrate();
        Ok(ret)
    }

    fn update_stat(&mut self, add: &Self::Mat) -> anyhow::Result<()> {
        self.check_dim(add.dim())?;
        self.stat.assign(&self.prior);
        self.stat += add;
        self.calibrate();
        Ok(())
    }

    fn set_stat(&mut self, value: Self::Mat) -> anyhow::Result<()> {
        self.check_dim(value.dim())?;
        self.stat = value;
        self.calibrate();
        Ok(())
    }

    fn stat(&self) -> &Self::Mat {
        &self.stat
    }

    fn calibrate(&mut self) {
        self.map_calibrate_mean();
        self.map_calibrate_log_mean();
    }

    /// E[theta[r,x]] = stat[r,x] / sum_x stat[r,x]
    fn map_calibrate_mean(&mut self) {
        let row_sum = self.stat.sum_axis(Axis(1)).insert_axis(Axis(1));
        self.estimated_mean = &self.stat / &row_sum;
    }

    /// E[ln theta[r,x]] = digamma(stat[r,x]) - digamma(sum_x stat[r,x])
    fn map_calibrate_log_mean(&mut self) {
        use special::Gamma;
        let row_sum = self
            .stat
            .sum_axis(Axis(1))
            .mapv(|a| Gamma::digamma(a))
            .insert_axis(Axis(1));
        self.estimated_log_mean = &self.stat.mapv(|a| Gamma::digamma(a)) - &row_sum;
    }
}

impl Inference for DirichletMatrix {
    type Mat = Array2<f64>;

    fn posterior_mean(&self) -> &Self::Mat {
        &self.estimated_mean
    }

    fn posterior_log_mean(&self) -> &Self::Mat {
        &self.estimated_log_mean
    }
}

impl DirichletMatrix {
    fn check_dim(&self, dim: (usize, usize)) -> anyhow::Result<()> {
        if dim != (self.num_rows, self.num_columns) {
            anyhow::bail!(
                "expected a {} x {} statistic, got {} x {}",
                self.num_rows,
                self.num_columns,
                dim.0,
                dim.1
            );
        }
        Ok(())
    }
}

/// A matrix of conjugate parameters: sufficient statistics plus
/// calibrated posterior summaries
pub trait Inference {
    type Mat;

    /// Posterior mean of each row's probability vector
    fn posterior_mean(&self) -> &Self::Mat;

    /// Posterior expectation of the log probabilities
    fn posterior_log_mean(&self) -> &Self::Mat;
}

/// Each row is a Dirichlet distribution with its own prior
/// pseudo-counts. Every method that changes the statistics calibrates
/// the posterior summaries before it returns.
pub trait DirichletParam {
    type Mat;

    /// Start from the prior: `stat = prior`
    fn new(prior: Self::Mat) -> anyhow::Result<Self>
    where
        Self: Sized;

    /// `stat = prior + add`
    fn update_stat(&mut self, add: &Self::Mat) -> anyhow::Result<()>;

    /// `stat = value`, ignoring the prior
    fn set_stat(&mut self, value: Self::Mat) -> anyhow::Result<()>;

    fn stat(&self) -> &Self::Mat;

    fn calibrate(&mut self);
    fn map_calibrate_mean(&mut self);
    fn map_calibrate_log_mean(&mut self);
}

use thiserror::Error;

/// Errors raised by the inference core
#[derive(Debug, Error)]
pub enum ModelError {
    /// Invalid data or hyperparameters, detected before any update
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A posterior invariant failed after an update; restarting with
    /// another seed or prior is up to the caller
    #[error("numeric instability in {variable}{}: {detail}", fmt_index(.index))]
    NumericInstability {
        variable: &'static str,
        index: Option<usize>,
        detail: String,
    },

    /// The learner ran out of updates before converging
    #[error("no convergence after {updates} updates")]
    ConvergenceFailure { updates: usize },
}

fn fmt_index(index: &Option<usize>) -> String {
    index.map(|i| format!("[{}]", i)).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, ModelError>;

pub(crate) fn config_err<T>(msg: impl Into<String>) -> Result<T> {
    Err(ModelError::Configuration(msg.into()))
}

pub(crate) fn unstable(
    variable: &'static str,
    index: Option<usize>,
    detail: impl Into<String>,
) -> ModelError {
    ModelError::NumericInstability {
        variable,
        index,
        detail: detail.into(),
    }
}

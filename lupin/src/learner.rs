use crate::error::*;
use crate::hyper::LearnerOptions;
use crate::model::GappedPssm;
use log::{debug, info, warn};

/// Where a learner stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnerState {
    /// No update yet
    Initialized,
    Updating,
    /// The last two relative gains were below the tolerance
    Converged,
    /// The update budget ran out first
    MaxIterationsReached,
    /// An update broke a posterior invariant; the model is left as the
    /// failed update made it
    Failed,
}

impl LearnerState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LearnerState::Converged | LearnerState::MaxIterationsReached | LearnerState::Failed
        )
    }
}

/// Drives a model by repeated updates and keeps the log-likelihood
/// trace. Nothing happens unless the caller asks for a step; to stop
/// early, stop asking.
pub struct Learner {
    model: GappedPssm,
    options: LearnerOptions,
    trace: Vec<f64>,
    gains: Vec<f64>,
    state: LearnerState,
}

impl Learner {
    /// The trace starts with the log-likelihood of the model as given
    pub fn new(model: GappedPssm, options: LearnerOptions) -> Self {
        let llik = model.log_likelihood();
        info!(
            "learner: K={}, N={}, initial llik={:.4}",
            model.width(),
            model.dataset().num_sequences(),
            llik
        );
        Learner {
            model,
            options,
            trace: vec![llik],
            gains: vec![],
            state: LearnerState::Initialized,
        }
    }

    /// Update once and record the log-likelihood. A learner in a
    /// terminal state stays there without touching the model.
    pub fn step(&mut self) -> Result<LearnerState> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        if self.budget_exhausted() {
            self.state = LearnerState::MaxIterationsReached;
            return Ok(self.state);
        }

        if let Err(e) = self.model.update() {
            warn!("update {} failed: {}", self.num_updates() + 1, e);
            self.state = LearnerState::Failed;
            return Err(e);
        }

        let llik = self.model.log_likelihood();
        let prev = self.trace.last().copied().unwrap_or(llik);
        let gain = (llik - prev) / llik.abs();
        self.trace.push(llik);
        self.gains.push(gain);

        debug!(
            "update {:4}: llik = {:12.4}, relative gain = {:.2e}",
            self.num_updates(),
            llik,
            gain
        );

        self.state = if self.has_converged() {
            info!(
                "converged after {} updates (llik = {:.4})",
                self.num_updates(),
                llik
            );
            LearnerState::Converged
        } else if self.budget_exhausted() {
            info!(
                "stopped after {} updates without convergence (llik = {:.4})",
                self.num_updates(),
                llik
            );
            LearnerState::MaxIterationsReached
        } else {
            LearnerState::Updating
        };

        Ok(self.state)
    }

    /// Step until a terminal state. Without `max_updates` this only
    /// returns once the gains settle.
    pub fn run(&mut self) -> Result<LearnerState> {
        loop {
            let state = self.step()?;
            if state.is_terminal() {
                return Ok(state);
            }
        }
    }

    fn budget_exhausted(&self) -> bool {
        self.options
            .max_updates
            .is_some_and(|max| self.num_updates() >= max)
    }

    fn has_converged(&self) -> bool {
        let eps = self.options.convergence_epsilon;
        self.gains.len() >= 2
            && self.gains[self.gains.len() - 2..]
                .iter()
                .all(|g| g.abs() < eps)
    }

    /// Surface `MaxIterationsReached` and `Failed` as an error
    pub fn require_converged(&self) -> Result<()> {
        match self.state {
            LearnerState::MaxIterationsReached | LearnerState::Failed => Err(ModelError::ConvergenceFailure {
                updates: self.num_updates(),
            }),
            _ => Ok(()),
        }
    }

    pub fn state(&self) -> LearnerState {
        self.state
    }

    pub fn num_updates(&self) -> usize {
        self.trace.len() - 1
    }

    /// Log-likelihood before any update, then after each one
    pub fn trace(&self) -> &[f64] {
        &self.trace
    }

    /// `(llik[t] - llik[t-1]) / |llik[t]|` for each update
    pub fn relative_gains(&self) -> &[f64] {
        &self.gains
    }

    pub fn model(&self) -> &GappedPssm {
        &self.model
    }

    pub fn into_model(self) -> GappedPssm {
        self.model
    }
}

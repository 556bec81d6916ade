use lupin::{
    Dataset, GappedPssm, Hyperparameters, InitOptions, Learner, LearnerOptions, LearnerState,
    ModelError, MuInit,
};

fn toy_model(seed: u64) -> GappedPssm {
    let data = Dataset::from_strs(&["ttacgtaagc", "ggacgttcat", "cacgatgtta", "aaacctgtt"])
        .expect("valid sequences");
    let hyper = Hyperparameters::new(4, &[0.5; 4], &[1.0; 4], &[1.0, 1.0]).expect("valid priors");
    let init = InitOptions {
        seed,
        mu_init: MuInit::Beta,
    };
    GappedPssm::new(data, hyper, &init).expect("valid model")
}

#[test]
fn budget_exhaustion() {
    let options = LearnerOptions {
        max_updates: Some(3),
        convergence_epsilon: 0.0,
    };
    let mut learner = Learner::new(toy_model(1), options);
    assert_eq!(learner.state(), LearnerState::Initialized);
    assert_eq!(learner.trace().len(), 1);

    assert_eq!(learner.step().unwrap(), LearnerState::Updating);
    assert_eq!(learner.run().unwrap(), LearnerState::MaxIterationsReached);
    assert_eq!(learner.num_updates(), 3);
    assert_eq!(learner.trace().len(), 4);
    assert_eq!(learner.relative_gains().len(), 3);

    match learner.require_converged() {
        Err(ModelError::ConvergenceFailure { updates }) => assert_eq!(updates, 3),
        other => panic!("expected a convergence failure, got {:?}", other),
    }

    // terminal learners stay put
    let pssm = learner.model().expected_pssm();
    assert_eq!(learner.step().unwrap(), LearnerState::MaxIterationsReached);
    assert_eq!(learner.trace().len(), 4);
    assert_eq!(learner.model().expected_pssm(), pssm);
}

#[test]
fn zero_budget() {
    let options = LearnerOptions {
        max_updates: Some(0),
        ..Default::default()
    };
    let mut learner = Learner::new(toy_model(2), options);
    assert_eq!(learner.run().unwrap(), LearnerState::MaxIterationsReached);
    assert_eq!(learner.trace().len(), 1);
}

#[test]
fn convergence_needs_two_small_gains() {
    let options = LearnerOptions {
        max_updates: Some(50),
        convergence_epsilon: f64::INFINITY,
    };
    let mut learner = Learner::new(toy_model(3), options);
    assert_eq!(learner.step().unwrap(), LearnerState::Updating);
    assert_eq!(learner.step().unwrap(), LearnerState::Converged);
    assert!(learner.require_converged().is_ok());
    assert_eq!(learner.num_updates(), 2);
}

#[test]
fn relative_gains_follow_trace() {
    let options = LearnerOptions {
        max_updates: Some(5),
        convergence_epsilon: 0.0,
    };
    let mut learner = Learner::new(toy_model(4), options);
    learner.run().unwrap();

    let trace = learner.trace();
    for (t, gain) in learner.relative_gains().iter().enumerate() {
        let expected = (trace[t + 1] - trace[t]) / trace[t + 1].abs();
        assert!((gain - expected).abs() < 1e-12);
    }
}

#[test]
fn same_seed_same_fit() {
    let run = |seed| {
        let options = LearnerOptions {
            max_updates: Some(5),
            convergence_epsilon: 0.0,
        };
        let mut learner = Learner::new(toy_model(seed), options);
        learner.run().unwrap();
        learner.into_model()
    };

    let a = run(11);
    let b = run(11);
    assert_eq!(a.expected_pssm(), b.expected_pssm());
    assert_eq!(a.posterior().mu(), b.posterior().mu());
    assert_eq!(a.most_likely(), b.most_likely());
}

#[test]
fn independent_models_in_threads() {
    let handles: Vec<_> = (0..4_u64)
        .map(|seed| {
            std::thread::spawn(move || {
                let mut model = toy_model(seed);
                for _ in 0..3 {
                    model.update().unwrap();
                }
                model.log_likelihood()
            })
        })
        .collect();

    for h in handles {
        assert!(h.join().unwrap().is_finite());
    }
}

use clap::Args;
use log::info;
use lupin::*;
use matrix_util::common_io::{mkdir, write_lines};

#[derive(Args, Debug)]
pub struct FitArgs {
    #[arg(
        required = true,
        help = "Sequence files",
        long_help = "Sequence files, one sequence per line (plain or .gz).\n\
		     Empty lines and lines starting with `#` or `>` are skipped.\n\
		     Multiple files are concatenated."
    )]
    seq_files: Vec<Box<str>>,

    #[arg(
        long,
        short,
        required = true,
        help = "Output header",
        long_help = "Output header for results:\n\
		     - {out}.pssm.tsv\n\
		     - {out}.sites.tsv\n\
		     - {out}.eta.tsv\n\
		     - {out}.llik.tsv\n\
		     Use `stdout` to print everything instead."
    )]
    out: Box<str>,

    #[arg(
        long,
        short = 'k',
        default_value_t = 8,
        help = "Motif width K",
        long_help = "Motif width K, the number of PSSM columns.\n\
		     A gapped site spans K+1 bases. Every sequence must be longer than K."
    )]
    width: usize,

    #[arg(
        long,
        value_delimiter(','),
        default_values_t = vec![0.5, 0.5, 0.5, 0.5],
        help = "Dirichlet prior of motif columns (A,C,G,T)"
    )]
    phi: Vec<f64>,

    #[arg(
        long,
        value_delimiter(','),
        default_values_t = vec![1.0, 1.0, 1.0, 1.0],
        help = "Dirichlet prior of the background column (A,C,G,T)"
    )]
    varphi: Vec<f64>,

    #[arg(
        long,
        value_delimiter(','),
        default_values_t = vec![1.0, 1.0],
        help = "Beta prior of the gap probability",
        long_help = "Beta prior of the gap probability.\n\
		     The first value counts gapped sites, the second ungapped ones."
    )]
    alpha: Vec<f64>,

    #[arg(
        long,
        default_value_t = 1000,
        help = "Maximum number of updates"
    )]
    max_updates: usize,

    #[arg(
        long,
        default_value_t = 1e-6,
        help = "Convergence tolerance",
        long_help = "Stop when two consecutive relative changes of the\n\
		     log-likelihood are smaller than this."
    )]
    epsilon: f64,

    #[arg(long, default_value_t = 42, help = "Random seed")]
    seed: u64,

    #[arg(
        long,
        value_enum,
        default_value = "beta",
        help = "Initialization of per-sequence gap probabilities",
        long_help = "Initialization of per-sequence gap probabilities.\n\
		     beta: independent Beta(1,1) draws\n\
		     dirichlet: one flat Dirichlet draw across sequences (sums to one)"
    )]
    mu_init: MuInit,

    #[arg(
        long,
        default_value_t = false,
        help = "Fail unless converged",
        long_help = "Exit with an error if the update budget runs out\n\
		     before the log-likelihood settles."
    )]
    require_convergence: bool,
}

pub fn fit_gapped_pssm(args: &FitArgs) -> anyhow::Result<()> {
    let data = Dataset::from_files(&args.seq_files)?;

    let hyper = Hyperparameters::new(args.width, &args.phi, &args.varphi, &args.alpha)?;
    let init = InitOptions {
        seed: args.seed,
        mu_init: args.mu_init,
    };

    info!(
        "fitting K={} on {} sequences (seed {})",
        args.width,
        data.num_sequences(),
        args.seed
    );

    let model = GappedPssm::new(data, hyper, &init)?;
    let options = LearnerOptions {
        max_updates: Some(args.max_updates),
        convergence_epsilon: args.epsilon,
    };

    let mut learner = Learner::new(model, options);
    let state = learner.run()?;
    info!("{:?} after {} updates", state, learner.num_updates());

    write_reports(&learner, &args.out)?;

    if args.require_convergence {
        learner.require_converged()?;
    }

    info!("done");
    Ok(())
}

fn output_file(out: &str, suffix: &str) -> String {
    if out.eq_ignore_ascii_case("stdout") {
        out.to_string()
    } else {
        format!("{}.{}", out, suffix)
    }
}

fn write_reports(learner: &Learner, out: &str) -> anyhow::Result<()> {
    let model = learner.model();
    let post = model.posterior();

    let pssm_file = output_file(out, "pssm.tsv");
    mkdir(&pssm_file)?;

    let mut pssm_lines: Vec<Box<str>> = vec!["column\tA\tC\tG\tT".into()];
    for (r, row) in model.expected_pssm().rows().into_iter().enumerate() {
        let vals: Vec<String> = row.iter().map(|x| format!("{:.6}", x)).collect();
        pssm_lines.push(format!("{}\t{}", r, vals.join("\t")).into_boxed_str());
    }
    write_lines(&pssm_lines, &pssm_file)?;

    let mut site_lines: Vec<Box<str>> =
        vec!["sequence\tstart\thas_gap\tmu\tgap_position\tsite\tcolumns".into()];
    for site in model.sites() {
        let columns: Vec<String> = site.columns.iter().map(|r| r.to_string()).collect();
        let gap = site
            .gap_position
            .map(|h| h.to_string())
            .unwrap_or_else(|| "NA".to_string());
        site_lines.push(
            format!(
                "{}\t{}\t{}\t{:.6}\t{}\t{}\t{}",
                site.sequence,
                site.start,
                site.has_gap,
                site.mu,
                gap,
                site.render(Orientation::Forward),
                columns.join(",")
            )
            .into_boxed_str(),
        );
    }
    write_lines(&site_lines, &output_file(out, "sites.tsv"))?;

    let mut eta_lines: Vec<Box<str>> = vec!["gap_position\teta".into()];
    for (h, eta) in post.eta().iter().enumerate() {
        eta_lines.push(format!("{}\t{:.6}", h, eta).into_boxed_str());
    }
    write_lines(&eta_lines, &output_file(out, "eta.tsv"))?;

    let mut llik_lines: Vec<Box<str>> = vec!["update\tllik".into()];
    for (t, llik) in learner.trace().iter().enumerate() {
        llik_lines.push(format!("{}\t{:.6}", t, llik).into_boxed_str());
    }
    write_lines(&llik_lines, &output_file(out, "llik.tsv"))?;

    info!("wrote results to {}.*", out);
    Ok(())
}

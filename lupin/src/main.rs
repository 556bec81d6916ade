mod fit;

use clap::{Parser, Subcommand};
use fit::*;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "LUPIN",
    long_about = "Learning Un-aligned PSSMs with INsertions\n\
		  Discover a DNA motif that may skip one base in some of its sites\n\
		  by mean-field variational Bayes."
)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Fit a gapped PSSM to a set of sequences",
        long_about = "Fit a gapped PSSM in three stages: \n\
		      (1) Randomly initialize the variational posterior\n\
		      (2) Update by coordinate ascent until the log-likelihood settles\n\
		      (3) Decode the most likely site of each sequence.\n"
    )]
    Fit(FitArgs),
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.commands {
        Commands::Fit(args) => {
            fit_gapped_pssm(args)?;
        }
    }

    Ok(())
}

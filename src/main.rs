//! orbitcast - ground-track prediction from satellite state samples
//!
//! Reads position/velocity samples as served by the tracker API and writes
//! predicted ground tracks, station passes and footprint radii for a map
//! layer to draw.

use anyhow::Result;
use clap::{Parser, Subcommand};

use orbitcast::report::{
    run_footprint, run_passes, run_predict, FootprintArgs, PassesArgs, PredictArgs,
};

#[derive(Parser, Debug)]
#[command(name = "orbitcast", version, about = "Satellite ground-track and footprint prediction")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict ground tracks for the samples in a JSON document
    Predict(PredictArgs),
    /// Find passes over a ground station for the samples in a JSON document
    Passes(PassesArgs),
    /// Compute the visibility footprint for an altitude
    Footprint(FootprintArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::debug!("Starting orbitcast: {:?}", cli.command);

    match cli.command {
        Command::Predict(args) => run_predict(args),
        Command::Passes(args) => run_passes(args),
        Command::Footprint(args) => run_footprint(args),
    }
}

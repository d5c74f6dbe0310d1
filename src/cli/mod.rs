// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All work is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train` — trains the note model on encoded csv files
//   2. `synth` — loads a checkpoint and writes a new series

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, SynthArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "music-lstm",
    version = "0.1.0",
    about = "Train an LSTM on encoded note series, then synthesize new ones."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case. Routing only.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
            Commands::Synth(args) => run_synth(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on: {:?}", args.inputs);

    let summary = TrainUseCase::new(args.into()).execute()?;

    println!(
        "Training complete: {} batches, final loss {:.6}, {} checkpoints saved.",
        summary.batches,
        summary.last_loss,
        summary.checkpoints.len()
    );
    Ok(())
}

fn run_synth(args: SynthArgs) -> Result<()> {
    use crate::application::synth_use_case::SynthUseCase;

    let output = args.output.clone();
    let rows   = SynthUseCase::new(args.into()).execute()?;

    println!("Wrote {} rows to {}", rows, output.display());
    Ok(())
}

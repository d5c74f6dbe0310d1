// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `synth`
// and all their configurable flags.
//
// clap's derive macros generate --help, error messages for
// bad input and string → number conversion for every flag.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{synth_use_case::SynthConfig, train_use_case::TrainConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the note model on encoded csv files
    Train(TrainArgs),

    /// Generate a new note series from a trained checkpoint
    Synth(SynthArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Encoded csv file or directory of them (repeatable)
    #[arg(long = "input", default_value = "data/encoded")]
    pub inputs: Vec<PathBuf>,

    /// Directory to save model checkpoints
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    /// CSV file receiving one loss row per minibatch
    #[arg(long, default_value = "loss.csv")]
    pub loss_log: PathBuf,

    /// Units in each of the two LSTM layers
    #[arg(long, default_value_t = 256)]
    pub lstm_layer_size: usize,

    /// Windows per minibatch
    #[arg(long, default_value_t = 100)]
    pub mini_batch_size: usize,

    /// Rows per training window
    #[arg(long, default_value_t = 2000)]
    pub example_length: usize,

    /// Steps between truncated-BPTT updates
    #[arg(long, default_value_t = 250)]
    pub tbptt_length: usize,

    /// Full passes over every input file
    #[arg(long, default_value_t = 600)]
    pub epochs: usize,

    #[arg(long, default_value_t = 0.1)]
    pub lr: f64,

    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    /// RMSProp decay rate
    #[arg(long, default_value_t = 0.95)]
    pub rms_decay: f64,

    /// Save a checkpoint every N epochs
    #[arg(long, default_value_t = 50)]
    pub checkpoint_interval: usize,

    /// Seed for window sampling (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            inputs:              a.inputs,
            checkpoint_dir:      a.checkpoint_dir,
            loss_log:            a.loss_log,
            lstm_layer_size:     a.lstm_layer_size,
            mini_batch_size:     a.mini_batch_size,
            example_length:      a.example_length,
            tbptt_length:        a.tbptt_length,
            num_epochs:          a.epochs,
            learning_rate:       a.lr,
            dropout:             a.dropout,
            rms_decay:           a.rms_decay,
            checkpoint_interval: a.checkpoint_interval,
            seed:                a.seed,
        }
    }
}

/// All arguments for the `synth` command
#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Encoded csv file (or directory) supplying the seed rows
    #[arg(long = "input", default_value = "data/encoded")]
    pub inputs: Vec<PathBuf>,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: PathBuf,

    #[arg(long, default_value = "synth.csv")]
    pub output: PathBuf,

    /// Rows copied from the source before the model takes over
    #[arg(long, default_value_t = 500)]
    pub seed_length: usize,

    /// Timestamp of the first output row
    #[arg(long, default_value_t = 0.02)]
    pub start_time: f64,

    /// Timestamp increment between output rows
    #[arg(long, default_value_t = 0.01)]
    pub time_gap: f64,
}

impl From<SynthArgs> for SynthConfig {
    fn from(a: SynthArgs) -> Self {
        SynthConfig {
            inputs:         a.inputs,
            checkpoint_dir: a.checkpoint_dir,
            output:         a.output,
            seed_length:    a.seed_length,
            start_time:     a.start_time,
            time_gap:       a.time_gap,
        }
    }
}

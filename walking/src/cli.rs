use std::path::PathBuf;

use clap::Parser;

/// Run the Nao walking environment and plot its telemetry.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "walking")]
#[command(about = "Run the Nao walking environment and plot its telemetry")]
pub struct Cli {
    /// Throw tomatoes at the Nao.
    #[arg(long)]
    pub throw_tomatoes: bool,

    /// Load a policy from a file.
    #[arg(long, value_name = "PATH")]
    pub load_policy: Option<PathBuf>,

    /// Log telemetry instead of opening a window.
    #[arg(long)]
    pub headless: bool,

    /// Stop after this many steps (headless only).
    #[arg(long, value_name = "N")]
    pub max_steps: Option<u64>,

    /// Seed for terrain and tomatoes, random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,
}

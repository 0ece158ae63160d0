//! # Nao Walking
//!
//! Entry point of the `walking` binary. Run with `--load-policy <file>` to
//! let a trained policy control the robot, and `--throw-tomatoes` to disturb
//! it. Builds without the `render` feature, or `--headless`, only log.

use anyhow::Result;
use clap::Parser;
use walking::{app, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    app::run(&cli)
}

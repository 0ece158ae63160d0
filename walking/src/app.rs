//! # Application Setup
//!
//! Builds the collaborators from the command line and hands them to a
//! [`Driver`]. With the `render` feature a window shows the robot and the
//! plots; without it, or with `--headless`, figures are summarised in the log.

use anyhow::{Context, Result};
use nao::{NaoWalking, NaoWalkingConfig, WalkingEnv};
use policy::{MlpPolicy, Policy};
use viewer::{HeadlessConfig, HeadlessViewer, Viewer};

use crate::cli::Cli;
use crate::driver::{Driver, RunSummary};

/// Where the figures go.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Open a window with the scene and the figures
    Windowed,
    /// Log figure summaries only
    Headless,
}

impl ExecutionMode {
    /// Windowed when compiled with `render` and not asked to run headless.
    #[must_use]
    pub fn select(headless: bool) -> Self {
        if cfg!(feature = "render") && !headless {
            ExecutionMode::Windowed
        } else {
            ExecutionMode::Headless
        }
    }

    #[must_use]
    pub fn should_render(self) -> bool {
        matches!(self, ExecutionMode::Windowed)
    }
}

/// Entry point of the binary: sets up logging and runs until the viewer
/// closes.
///
/// # Errors
///
/// Returns the first error of the environment, policy or viewer.
pub fn run(cli: &Cli) -> Result<()> {
    tracing_subscriber::fmt::init();
    let mode = ExecutionMode::select(cli.headless);
    simulate(cli, mode).map(|_| ())
}

/// Builds the environment, policy and viewer for `mode` and drives them.
///
/// # Errors
///
/// See [`run`].
pub fn simulate(cli: &Cli, mode: ExecutionMode) -> Result<RunSummary> {
    let seed = cli.seed.unwrap_or_else(|| fastrand::u64(..));
    tracing::info!(seed, throw_tomatoes = cli.throw_tomatoes, mode = ?mode, "starting Nao walking");

    let env = NaoWalking::new(NaoWalkingConfig {
        throw_tomatoes: cli.throw_tomatoes,
        seed,
        ..Default::default()
    })
    .context("failed to create the walking environment")?;
    let policy = match &cli.load_policy {
        Some(path) => {
            let policy = MlpPolicy::load(path)
                .with_context(|| format!("failed to load policy from {}", path.display()))?;
            Some(Box::new(policy) as Box<dyn Policy>)
        }
        None => None,
    };

    #[cfg(feature = "render")]
    if mode.should_render() {
        if cli.max_steps.is_some() {
            tracing::warn!("--max-steps only applies to headless runs");
        }
        let viewer = viewer::WindowViewer::new(viewer::WindowConfig::default())
            .context("failed to open the viewer window")?;
        return drive(env, policy, viewer);
    }

    let viewer = HeadlessViewer::new(HeadlessConfig {
        max_frames: cli.max_steps,
        ..Default::default()
    });
    drive(env, policy, viewer)
}

fn drive<E: WalkingEnv, V: Viewer>(env: E, policy: Option<Box<dyn Policy>>, viewer: V) -> Result<RunSummary> {
    Driver::new(env, policy, viewer)?.run()
}

#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::cast_precision_loss)]
//! # Nao Walking Demo
//!
//! Steps a [`nao::NaoWalking`] environment in real time, optionally drives it
//! with a pretrained [`policy::Policy`], and plots rewards, foot pressure and
//! gyroscope readings in a [`viewer::Viewer`].
//!
//! ## Crates
//!
//! -   **[`nao`]:** the environment, its terrain and the tomato thrower.
//! -   **[`policy`]:** policy files and the MLP actor that reads them.
//! -   **[`viewer`]:** figures, lines and the headless and windowed viewers.
//!
//! ## Loop
//!
//! [`Driver::new`] takes one warm-up step with a zero action, resets the
//! environment, lays out stepped terrain and registers four figures. Each
//! [`Driver::tick`] then predicts an action (or keeps the zero action),
//! steps the environment, pushes one value to every line and renders a
//! frame. [`Driver::run`] repeats ticks until the viewer closes, sleeping so
//! that one tick takes about [`nao::Env::dt`] seconds of wall time.
//!
//! Episode ends are reported but never reset the environment; the robot is
//! left wherever it fell.

pub mod app;
pub mod cli;
pub mod driver;
pub mod scene;

pub use app::ExecutionMode;
pub use cli::Cli;
pub use driver::{pacing_delay, Driver, RunSummary, TickReport};

pub use nao;
pub use policy;
pub use viewer;

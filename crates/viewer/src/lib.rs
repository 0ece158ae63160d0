#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]
//! Live plots and a side view of the robot.
//!
//! A [`Viewer`] owns a set of named [`Figure`]s. Each figure holds line
//! series that the simulation loop appends to once per step, and
//! [`Viewer::render`] draws one frame. [`HeadlessViewer`] only logs, while
//! [`WindowViewer`] (feature `render`) opens a `winit` window and draws with
//! `wgpu`.

pub mod color;
pub mod error;
pub mod figure;
pub mod headless;
pub mod plot;
pub mod scene;
#[cfg(feature = "render")]
pub mod window;

pub use color::Color;
pub use error::ViewerError;
pub use figure::{Figure, Figures, Line, DEFAULT_HISTORY};
pub use headless::{HeadlessConfig, HeadlessViewer};
pub use scene::{Scene, SceneMarker, SceneSegment};
#[cfg(feature = "render")]
pub use window::{WindowConfig, WindowViewer};

/// A render loop with named plot panels.
pub trait Viewer {
    /// False once the user closed the viewer or it reached its frame limit.
    fn is_alive(&self) -> bool;

    /// Returns the figure called `name`, creating an empty one on first use.
    fn figure(&mut self, name: &str) -> &mut Figure;

    /// All figures in creation order.
    fn figures(&self) -> &[Figure];

    /// Replaces the geometry drawn next to the plots.
    fn update_scene(&mut self, _scene: &Scene) {}

    /// Draws a single frame.
    ///
    /// # Errors
    ///
    /// Fails when the underlying window or GPU surface can no longer be used.
    fn render(&mut self) -> Result<(), ViewerError>;
}

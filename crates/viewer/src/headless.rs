use crate::error::ViewerError;
use crate::figure::{Figure, Figures, DEFAULT_HISTORY};
use crate::scene::Scene;
use crate::Viewer;

/// Configuration for a [`HeadlessViewer`]
#[derive(Clone, Debug)]
pub struct HeadlessConfig {
    /// Stop being alive after this many frames
    pub max_frames: Option<u64>,
    /// Log figure summaries every this many frames, 0 disables
    pub log_interval: u64,
    /// Samples kept per line
    pub history: usize,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            max_frames: None,
            log_interval: 500,
            history: DEFAULT_HISTORY,
        }
    }
}

/// Viewer without a window, for servers, CI and tests.
pub struct HeadlessViewer {
    config: HeadlessConfig,
    figures: Figures,
    scene: Scene,
    frames: u64,
}

impl Default for HeadlessViewer {
    fn default() -> Self {
        Self::new(HeadlessConfig::default())
    }
}

impl HeadlessViewer {
    #[must_use]
    pub fn new(config: HeadlessConfig) -> Self {
        let figures = Figures::new(config.history);
        Self {
            config,
            figures,
            scene: Scene::default(),
            frames: 0,
        }
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The scene passed to the last [`Viewer::update_scene`] call.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    fn log_figures(&self) {
        for figure in self.figures.as_slice() {
            let summary = figure
                .lines()
                .iter()
                .map(|line| match line.last() {
                    Some(value) => format!("{}={value:.3}", line.name()),
                    None => format!("{}=-", line.name()),
                })
                .collect::<Vec<_>>()
                .join(", ");
            tracing::info!(frame = self.frames, figure = figure.display_title(), "{summary}");
        }
    }
}

impl Viewer for HeadlessViewer {
    fn is_alive(&self) -> bool {
        self.config.max_frames.map_or(true, |max| self.frames < max)
    }

    fn figure(&mut self, name: &str) -> &mut Figure {
        self.figures.get_or_create(name)
    }

    fn figures(&self) -> &[Figure] {
        self.figures.as_slice()
    }

    fn update_scene(&mut self, scene: &Scene) {
        self.scene.clone_from(scene);
    }

    fn render(&mut self) -> Result<(), ViewerError> {
        self.frames += 1;
        if self.config.log_interval > 0 && self.frames % self.config.log_interval == 0 {
            self.log_figures();
        }
        Ok(())
    }
}

use std::collections::VecDeque;

use crate::color::Color;
use crate::error::ViewerError;

/// Samples kept per line unless a figure is created with another capacity.
pub const DEFAULT_HISTORY: usize = 1000;

/// One named series in a [`Figure`].
#[derive(Clone, Debug)]
pub struct Line {
    name: String,
    color: Color,
    samples: VecDeque<f32>,
    pushed: u64,
}

impl Line {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Retained samples, oldest first.
    pub fn samples(&self) -> impl ExactSizeIterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<f32> {
        self.samples.back().copied()
    }

    /// Number of values pushed since the line was added, including the ones
    /// that already fell out of the history.
    #[must_use]
    pub fn pushed(&self) -> u64 {
        self.pushed
    }
}

/// A plot panel holding named lines.
#[derive(Clone, Debug)]
pub struct Figure {
    name: String,
    title: Option<String>,
    x_label: Option<String>,
    lines: Vec<Line>,
    history: usize,
}

impl Figure {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_history(name, DEFAULT_HISTORY)
    }

    #[must_use]
    pub fn with_history(name: impl Into<String>, history: usize) -> Self {
        Self {
            name: name.into(),
            title: None,
            x_label: None,
            lines: Vec::new(),
            history: history.max(1),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn set_x_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.x_label = Some(label.into());
        self
    }

    /// Adds an empty line. Adding a name twice keeps the existing line.
    pub fn add_line(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if self.line(&name).is_none() {
            let color = Color::palette(self.lines.len());
            self.lines.push(Line {
                name,
                color,
                samples: VecDeque::with_capacity(self.history),
                pushed: 0,
            });
        }
        self
    }

    /// # Errors
    ///
    /// Returns [`ViewerError::UnknownLine`] when no line is called `name`.
    pub fn line_color(&mut self, name: &str, color: Color) -> Result<&mut Self, ViewerError> {
        self.line_mut(name)?.color = color;
        Ok(self)
    }

    /// Appends `value` to the line called `name`, dropping its oldest sample
    /// once the history is full.
    ///
    /// # Errors
    ///
    /// Returns [`ViewerError::UnknownLine`] when no line is called `name`.
    pub fn push_data_to_line(&mut self, name: &str, value: f32) -> Result<(), ViewerError> {
        let history = self.history;
        let line = self.line_mut(name)?;
        if line.samples.len() == history {
            line.samples.pop_front();
        }
        line.samples.push_back(value);
        line.pushed += 1;
        Ok(())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The title, or the figure name when no title was set.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    #[must_use]
    pub fn x_label(&self) -> Option<&str> {
        self.x_label.as_deref()
    }

    #[must_use]
    pub fn history(&self) -> usize {
        self.history
    }

    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, name: &str) -> Option<&Line> {
        self.lines.iter().find(|line| line.name == name)
    }

    /// Smallest and largest finite sample over all lines.
    #[must_use]
    pub fn y_range(&self) -> Option<(f32, f32)> {
        self.lines
            .iter()
            .flat_map(Line::samples)
            .filter(|value| value.is_finite())
            .fold(None, |range, value| match range {
                None => Some((value, value)),
                Some((min, max)) => Some((f32::min(min, value), f32::max(max, value))),
            })
    }

    fn line_mut(&mut self, name: &str) -> Result<&mut Line, ViewerError> {
        match self.lines.iter_mut().find(|line| line.name == name) {
            Some(line) => Ok(line),
            None => Err(ViewerError::UnknownLine {
                figure: self.name.clone(),
                line: name.to_owned(),
            }),
        }
    }
}

/// Figures of one viewer, in creation order.
#[derive(Clone, Debug)]
pub struct Figures {
    figures: Vec<Figure>,
    history: usize,
}

impl Default for Figures {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY)
    }
}

impl Figures {
    #[must_use]
    pub fn new(history: usize) -> Self {
        Self {
            figures: Vec::new(),
            history,
        }
    }

    pub fn get_or_create(&mut self, name: &str) -> &mut Figure {
        let index = match self.figures.iter().position(|figure| figure.name == name) {
            Some(index) => index,
            None => {
                tracing::debug!(figure = name, "created figure");
                self.figures.push(Figure::with_history(name, self.history));
                self.figures.len() - 1
            }
        };
        &mut self.figures[index]
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Figure] {
        &self.figures
    }
}

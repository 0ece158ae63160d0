use crate::color::Color;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SceneSegment {
    pub from: [f32; 2],
    pub to: [f32; 2],
    pub color: Color,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SceneMarker {
    pub center: [f32; 2],
    pub radius: f32,
    pub color: Color,
}

/// Flat geometry drawn beside the plots, in metres.
///
/// `focus` is kept in the middle of the scene panel.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub segments: Vec<SceneSegment>,
    pub markers: Vec<SceneMarker>,
    pub focus: [f32; 2],
}

impl Scene {
    #[must_use]
    pub fn new(focus: [f32; 2]) -> Self {
        Self {
            focus,
            ..Self::default()
        }
    }

    pub fn segment(&mut self, from: [f32; 2], to: [f32; 2], color: Color) {
        self.segments.push(SceneSegment { from, to, color });
    }

    pub fn marker(&mut self, center: [f32; 2], radius: f32, color: Color) {
        self.markers.push(SceneMarker { center, radius, color });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.markers.is_empty()
    }
}

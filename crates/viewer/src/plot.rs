//! Turns a [`Scene`] and a set of [`Figure`]s into a line list in normalized
//! device coordinates.
//!
//! The left half of the frame shows the scene, the right half stacks one
//! panel per figure from top to bottom. Every pair of consecutive vertices
//! is one line segment.

use glam::Vec2;

use crate::color::Color;
use crate::figure::Figure;
use crate::scene::Scene;

const MARGIN: f32 = 0.04;
const MARKER_SIDES: usize = 8;
/// Half the width of world space visible in the scene panel, in metres.
pub const SCENE_HALF_EXTENT: f32 = 0.6;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 3],
}

/// Axis aligned rectangle in normalized device coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    #[must_use]
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min - Vec2::splat(1e-5)).all() && point.cmple(self.max + Vec2::splat(1e-5)).all()
    }

    fn shrink(&self, amount: f32) -> Self {
        Self::new(self.min + Vec2::splat(amount), self.max - Vec2::splat(amount))
    }
}

/// Scene panel and one panel per figure.
#[must_use]
pub fn layout(figure_count: usize) -> (Rect, Vec<Rect>) {
    if figure_count == 0 {
        return (Rect::new(Vec2::splat(-1.0), Vec2::splat(1.0)).shrink(MARGIN), Vec::new());
    }
    let scene = Rect::new(Vec2::new(-1.0, -1.0), Vec2::new(0.0, 1.0)).shrink(MARGIN);
    let height = 2.0 / figure_count as f32;
    let panels = (0..figure_count)
        .map(|i| {
            let top = 1.0 - i as f32 * height;
            Rect::new(Vec2::new(0.0, top - height), Vec2::new(1.0, top)).shrink(MARGIN)
        })
        .collect();
    (scene, panels)
}

/// All vertices of one frame.
#[must_use]
pub fn build(scene: &Scene, figures: &[Figure]) -> Vec<Vertex> {
    let (scene_rect, panels) = layout(figures.len());
    let mut vertices = Vec::new();
    scene_vertices(scene, scene_rect, &mut vertices);
    for (figure, rect) in figures.iter().zip(panels) {
        figure_vertices(figure, rect, &mut vertices);
    }
    vertices
}

pub fn scene_vertices(scene: &Scene, rect: Rect, out: &mut Vec<Vertex>) {
    let scale = rect.size().min_element() / (2.0 * SCENE_HALF_EXTENT);
    let focus = Vec2::from(scene.focus);
    let center = rect.center();
    let to_screen = |p: [f32; 2]| center + (Vec2::from(p) - focus) * scale;

    push_frame(rect, Color::GREY, out);
    for segment in &scene.segments {
        push_clipped(to_screen(segment.from), to_screen(segment.to), rect, segment.color, out);
    }
    for marker in &scene.markers {
        let center = to_screen(marker.center);
        let radius = marker.radius * scale;
        let corners: Vec<Vec2> = (0..=MARKER_SIDES)
            .map(|i| {
                let angle = i as f32 / MARKER_SIDES as f32 * std::f32::consts::TAU;
                center + Vec2::new(angle.cos(), angle.sin()) * radius
            })
            .collect();
        for pair in corners.windows(2) {
            push_clipped(pair[0], pair[1], rect, marker.color, out);
        }
    }
}

pub fn figure_vertices(figure: &Figure, rect: Rect, out: &mut Vec<Vertex>) {
    push_frame(rect, Color::GREY, out);
    let Some((mut min, mut max)) = figure.y_range() else {
        return;
    };
    if max - min < 1e-6 {
        min -= 1.0;
        max += 1.0;
    }
    let padding = (max - min) * 0.05;
    min -= padding;
    max += padding;

    let size = rect.size();
    let y_of = |value: f32| rect.min.y + (value - min) / (max - min) * size.y;
    if min < 0.0 && max > 0.0 {
        let zero = y_of(0.0);
        push_line(Vec2::new(rect.min.x, zero), Vec2::new(rect.max.x, zero), Color::GREY, out);
    }

    // Newest sample sits on the right edge.
    let step = size.x / figure.history().saturating_sub(1).max(1) as f32;
    for line in figure.lines() {
        let count = line.samples().len();
        let points: Vec<Vec2> = line
            .samples()
            .enumerate()
            .filter(|(_, value)| value.is_finite())
            .map(|(i, value)| Vec2::new(rect.max.x - (count - 1 - i) as f32 * step, y_of(value)))
            .collect();
        for pair in points.windows(2) {
            push_line(pair[0], pair[1], line.color(), out);
        }
    }
}

fn push_frame(rect: Rect, color: Color, out: &mut Vec<Vertex>) {
    let corners = [
        rect.min,
        Vec2::new(rect.max.x, rect.min.y),
        rect.max,
        Vec2::new(rect.min.x, rect.max.y),
    ];
    for (i, corner) in corners.iter().enumerate() {
        push_line(*corner, corners[(i + 1) % corners.len()], color, out);
    }
}

fn push_line(from: Vec2, to: Vec2, color: Color, out: &mut Vec<Vertex>) {
    let color = color.to_array();
    out.push(Vertex {
        position: from.to_array(),
        color,
    });
    out.push(Vertex {
        position: to.to_array(),
        color,
    });
}

/// Liang-Barsky clipping against `rect`; segments fully outside are dropped.
fn push_clipped(from: Vec2, to: Vec2, rect: Rect, color: Color, out: &mut Vec<Vertex>) {
    let delta = to - from;
    let (mut t0, mut t1) = (0.0_f32, 1.0_f32);
    let checks = [
        (-delta.x, from.x - rect.min.x),
        (delta.x, rect.max.x - from.x),
        (-delta.y, from.y - rect.min.y),
        (delta.y, rect.max.y - from.y),
    ];
    for (p, q) in checks {
        if p.abs() < f32::EPSILON {
            if q < 0.0 {
                return;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return;
        }
    }
    push_line(from + delta * t0, from + delta * t1, color, out);
}

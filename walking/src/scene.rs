//! Side view of the robot for the viewer's scene panel.

use nao::{Segment, SegmentKind, Skeleton, Vec3};
use viewer::{Color, Scene};

const TORSO: Color = Color::rgb(0.9, 0.9, 0.9);
const LEFT_LEG: Color = Color::rgb(0.3, 0.6, 1.0);
const RIGHT_LEG: Color = Color::rgb(1.0, 0.55, 0.2);
const TERRAIN: Color = Color::rgb(0.35, 0.6, 0.3);
const TOMATO: Color = Color::rgb(0.9, 0.1, 0.1);

fn project(point: Vec3) -> [f32; 2] {
    [point.x, point.z]
}

#[must_use]
pub fn color_of(kind: SegmentKind) -> Color {
    match kind {
        SegmentKind::Torso => TORSO,
        SegmentKind::LeftLeg => LEFT_LEG,
        SegmentKind::RightLeg => RIGHT_LEG,
        SegmentKind::Terrain => TERRAIN,
    }
}

/// Projects the skeleton onto the sagittal (x, z) plane, centred on its
/// focus.
#[must_use]
pub fn sagittal_view(skeleton: &Skeleton) -> Scene {
    let mut scene = Scene::new(project(skeleton.focus));
    // Terrain first so the robot is drawn on top of it.
    let (terrain, body): (Vec<&Segment>, Vec<&Segment>) = skeleton
        .segments
        .iter()
        .partition(|segment| segment.kind == SegmentKind::Terrain);
    for segment in terrain.into_iter().chain(body) {
        scene.segment(project(segment.from), project(segment.to), color_of(segment.kind));
    }
    for marker in &skeleton.markers {
        scene.marker(project(marker.position), marker.radius, TOMATO);
    }
    scene
}

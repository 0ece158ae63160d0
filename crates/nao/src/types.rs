use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[must_use]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Horizontal distance, ignoring `z`.
    #[must_use]
    pub fn planar_distance(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[must_use]
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl From<glam::Vec3> for Vec3 {
    fn from(v: glam::Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for glam::Vec3 {
    fn from(v: Vec3) -> Self {
        glam::Vec3::new(v.x, v.y, v.z)
    }
}

/// Readings of the four force sensitive resistors under one foot, in
/// kilograms of load.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Fsr {
    pub front_left: f32,
    pub front_right: f32,
    pub rear_left: f32,
    pub rear_right: f32,
}

impl Fsr {
    #[must_use]
    pub fn sum(&self) -> f32 {
        self.front_left + self.front_right + self.rear_left + self.rear_right
    }

    #[must_use]
    pub fn to_array(self) -> [f32; 4] {
        [self.front_left, self.front_right, self.rear_left, self.rear_right]
    }
}

/// Named telemetry values reported by a single environment step.
///
/// Keys are static and their order is stable across steps, so consumers can
/// register one plot line per key up front and check later steps against
/// [`Infos::keys`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Infos {
    entries: Vec<(&'static str, f32)>,
}

impl Infos {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value. A key that is already present is overwritten in
    /// place so the key order never changes.
    pub fn insert(&mut self, key: &'static str, value: f32) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<f32> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        self.entries.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when `other` carries exactly the same keys in the same order.
    #[must_use]
    pub fn same_keys(&self, other: &Self) -> bool {
        self.keys().eq(other.keys())
    }
}

impl FromIterator<(&'static str, f32)> for Infos {
    fn from_iter<I: IntoIterator<Item = (&'static str, f32)>>(iter: I) -> Self {
        let mut infos = Self::new();
        for (key, value) in iter {
            infos.insert(key, value);
        }
        infos
    }
}

/// Result of advancing an environment by one action.
#[derive(Clone, Debug)]
pub struct Transition {
    pub observation: Vec<f32>,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
    pub infos: Infos,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    Torso,
    LeftLeg,
    RightLeg,
    Terrain,
}

/// A straight world-space line used to draw the robot or its surroundings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    pub from: Vec3,
    pub to: Vec3,
    pub kind: SegmentKind,
}

/// A projectile in flight, drawn as a dot.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Marker {
    pub position: Vec3,
    pub radius: f32,
}

/// World-space drawing primitives describing the current simulation state.
#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    pub segments: Vec<Segment>,
    pub markers: Vec<Marker>,
    /// Point a camera should keep centred, usually the torso.
    pub focus: Vec3,
}

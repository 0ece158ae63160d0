//! Random projectiles thrown at the robot to perturb its balance.

use crate::terrain::Terrain;
use crate::types::Vec3;

const GRAVITY: f32 = 9.81;
const THROW_DISTANCE: f32 = 1.5;
const LAUNCH_HEIGHT: f32 = 0.2;
const FLIGHT_TIME: f32 = 0.4;
const MIN_INTERVAL: f32 = 1.0;
const MAX_INTERVAL: f32 = 3.0;
const MAX_LIFETIME: f32 = 2.0;
pub const TOMATO_MASS: f32 = 0.3;
pub const TOMATO_RADIUS: f32 = 0.035;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tomato {
    pub position: Vec3,
    pub velocity: Vec3,
    age: f32,
}

/// A tomato that reached its target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hit {
    /// Linear impulse transferred to the torso.
    pub impulse: Vec3,
    pub position: Vec3,
}

/// Launches tomatoes at the torso from random directions and tracks them
/// until they hit or land.
pub struct TomatoThrower {
    rng: fastrand::Rng,
    until_next_throw: f32,
    in_flight: Vec<Tomato>,
    thrown: u64,
}

impl TomatoThrower {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let rng = fastrand::Rng::with_seed(seed);
        let until_next_throw = random_interval(&rng);
        Self {
            rng,
            until_next_throw,
            in_flight: Vec::new(),
            thrown: 0,
        }
    }

    /// Drops every tomato in flight and restarts the throw timer.
    pub fn reset(&mut self) {
        self.in_flight.clear();
        self.until_next_throw = random_interval(&self.rng);
    }

    /// Advances all tomatoes by `dt`, launching a new one when the timer runs
    /// out. Tomatoes within `hit_radius` of `target` are consumed and
    /// reported as hits.
    pub fn update(&mut self, dt: f32, target: Vec3, hit_radius: f32, terrain: &Terrain) -> Vec<Hit> {
        self.until_next_throw -= dt;
        if self.until_next_throw <= 0.0 {
            self.launch(target);
            self.until_next_throw = random_interval(&self.rng);
        }

        let mut hits = Vec::new();
        self.in_flight.retain_mut(|tomato| {
            tomato.velocity.z -= GRAVITY * dt;
            tomato.position += tomato.velocity * dt;
            tomato.age += dt;

            if (tomato.position - target).length() < hit_radius + TOMATO_RADIUS {
                hits.push(Hit {
                    impulse: tomato.velocity * TOMATO_MASS,
                    position: tomato.position,
                });
                return false;
            }
            let ground = terrain.height_at(tomato.position.x, tomato.position.y);
            tomato.position.z > ground && tomato.age < MAX_LIFETIME
        });
        if !hits.is_empty() {
            tracing::debug!(count = hits.len(), "tomato hit");
        }
        hits
    }

    fn launch(&mut self, target: Vec3) {
        let angle = self.rng.f32() * std::f32::consts::TAU;
        let position = target
            + Vec3::new(angle.cos() * THROW_DISTANCE, angle.sin() * THROW_DISTANCE, LAUNCH_HEIGHT);
        // Ballistic arc reaching the target after FLIGHT_TIME.
        let velocity =
            (target - position) * (1.0 / FLIGHT_TIME) + Vec3::new(0.0, 0.0, 0.5 * GRAVITY * FLIGHT_TIME);
        self.in_flight.push(Tomato {
            position,
            velocity,
            age: 0.0,
        });
        self.thrown += 1;
    }

    #[must_use]
    pub fn in_flight(&self) -> &[Tomato] {
        &self.in_flight
    }

    /// Total number of tomatoes launched since construction.
    #[must_use]
    pub fn thrown(&self) -> u64 {
        self.thrown
    }
}

fn random_interval(rng: &fastrand::Rng) -> f32 {
    MIN_INTERVAL + rng.f32() * (MAX_INTERVAL - MIN_INTERVAL)
}

//! The real-time simulation loop.

use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use nao::WalkingEnv;
use policy::Policy;
use viewer::{Color, Viewer, ViewerError};

use crate::scene;

pub const TERRAIN_MAX_HEIGHT: f32 = 0.1;
pub const TERRAIN_STEP_HEIGHT: f32 = 0.01;

pub const REWARDS_FIGURE: &str = "rewards";
pub const TOTAL_REWARD_FIGURE: &str = "total_reward";
pub const FSR_FIGURE: &str = "fsr";
pub const GYRO_FIGURE: &str = "gyro";

pub const TOTAL_REWARD_LINE: &str = "Total Reward";
pub const LEFT_FSR_LINE: &str = "Left FSR";
pub const RIGHT_FSR_LINE: &str = "Right FSR";
pub const GYRO_LINES: [&str; 3] = ["X Gyro", "Y Gyro", "Z Gyro"];

const PROGRESS_INTERVAL: u64 = 500;

/// What happened during one [`Driver::tick`].
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub reward: f32,
    pub total_reward: f32,
    pub terminated: bool,
    pub truncated: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub total_reward: f32,
    pub elapsed: Duration,
}

/// Time left to sleep so a tick that took `elapsed` lasts `dt`.
#[must_use]
pub fn pacing_delay(dt: Duration, elapsed: Duration) -> Duration {
    dt.saturating_sub(elapsed)
}

/// Wires an environment, an optional policy and a viewer together.
pub struct Driver<E, V> {
    env: E,
    policy: Option<Box<dyn Policy>>,
    viewer: V,
    action: Vec<f32>,
    observation: Vec<f32>,
    reward_keys: Vec<&'static str>,
    total_reward: f32,
    ticks: u64,
    episode_end_reported: bool,
}

impl<E: WalkingEnv, V: Viewer> Driver<E, V> {
    /// Prepares the environment and the figures.
    ///
    /// One step with a zero action discovers the telemetry keys before the
    /// environment is reset; then the terrain is generated and the figures
    /// are registered.
    ///
    /// # Errors
    ///
    /// Fails when the warm-up step or terrain setup fails, or when the policy
    /// does not fit the environment's observation and action sizes.
    pub fn new(mut env: E, policy: Option<Box<dyn Policy>>, mut viewer: V) -> Result<Self> {
        let action = vec![0.0; env.action_size()];
        let warm_up = env
            .step(&action)
            .context("environment rejected a zero action of its own action size")?;
        let reward_keys: Vec<&'static str> = warm_up.infos.keys().collect();
        let observation = env.reset();

        if let Some(policy) = &policy {
            if policy.observation_size() != env.obs_size() {
                bail!(
                    "policy expects {} observations but the environment provides {}",
                    policy.observation_size(),
                    env.obs_size()
                );
            }
            if policy.action_size() != env.action_size() {
                bail!(
                    "policy produces {} actions but the environment expects {}",
                    policy.action_size(),
                    env.action_size()
                );
            }
        }

        env.initialize_terrain(TERRAIN_MAX_HEIGHT, TERRAIN_STEP_HEIGHT)
            .context("failed to initialize terrain")?;
        register_figures(&mut viewer, &reward_keys).context("failed to set up figures")?;

        tracing::info!(
            action_size = action.len(),
            observation_size = observation.len(),
            reward_terms = reward_keys.len(),
            policy = policy.is_some(),
            "driver ready"
        );
        Ok(Self {
            env,
            policy,
            viewer,
            action,
            observation,
            reward_keys,
            total_reward: 0.0,
            ticks: 0,
            episode_end_reported: false,
        })
    }

    /// Runs one loop iteration without sleeping.
    ///
    /// # Errors
    ///
    /// Propagates policy, environment and viewer errors, and fails when the
    /// step reports different telemetry keys than the warm-up step.
    pub fn tick(&mut self) -> Result<TickReport> {
        if let Some(policy) = self.policy.as_mut() {
            let (action, _state) = policy
                .predict(&self.observation, true)
                .context("policy prediction failed")?;
            if action.len() != self.action.len() {
                bail!(
                    "policy returned {} actions, expected {}",
                    action.len(),
                    self.action.len()
                );
            }
            self.action = action;
        }

        let transition = self
            .env
            .step(&self.action)
            .with_context(|| format!("environment step {} failed", self.ticks + 1))?;
        if !transition.infos.keys().eq(self.reward_keys.iter().copied()) {
            bail!(
                "telemetry keys changed at step {}: expected {:?}, got {:?}",
                self.ticks + 1,
                self.reward_keys,
                transition.infos.keys().collect::<Vec<_>>()
            );
        }

        self.total_reward += transition.reward;
        self.push_telemetry(&transition.infos)?;
        self.observation = transition.observation;

        self.viewer
            .update_scene(&scene::sagittal_view(&self.env.skeleton()));
        self.viewer.render().context("viewer failed to render")?;
        self.ticks += 1;

        if (transition.terminated || transition.truncated) && !self.episode_end_reported {
            tracing::warn!(
                tick = self.ticks,
                terminated = transition.terminated,
                truncated = transition.truncated,
                "episode ended; the loop keeps stepping without a reset"
            );
            self.episode_end_reported = true;
        }
        if self.ticks % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                tick = self.ticks,
                total_reward = self.total_reward,
                "simulation progress"
            );
        }

        Ok(TickReport {
            tick: self.ticks,
            reward: transition.reward,
            total_reward: self.total_reward,
            terminated: transition.terminated,
            truncated: transition.truncated,
        })
    }

    /// Ticks until the viewer closes, pacing each tick to the environment's
    /// timestep.
    ///
    /// # Errors
    ///
    /// Fails when the environment's timestep is negative or not finite, and
    /// stops at the first failing [`Driver::tick`].
    pub fn run(&mut self) -> Result<RunSummary> {
        let dt = Duration::try_from_secs_f32(self.env.dt())
            .with_context(|| format!("invalid environment timestep {}", self.env.dt()))?;
        let started = Instant::now();
        tracing::info!(dt = ?dt, "starting simulation loop");

        while self.viewer.is_alive() {
            let frame_start = Instant::now();
            self.tick()?;
            let delay = pacing_delay(dt, frame_start.elapsed());
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }

        let summary = RunSummary {
            ticks: self.ticks,
            total_reward: self.total_reward,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            ticks = summary.ticks,
            total_reward = summary.total_reward,
            elapsed = ?summary.elapsed,
            "viewer closed"
        );
        Ok(summary)
    }

    fn push_telemetry(&mut self, infos: &nao::Infos) -> Result<(), ViewerError> {
        let left_fsr = self.env.left_fsr().sum();
        let right_fsr = self.env.right_fsr().sum();
        let gyro = self.env.gyroscope().to_array();

        let fsr = self.viewer.figure(FSR_FIGURE);
        fsr.push_data_to_line(LEFT_FSR_LINE, left_fsr)?;
        fsr.push_data_to_line(RIGHT_FSR_LINE, right_fsr)?;

        let gyro_figure = self.viewer.figure(GYRO_FIGURE);
        for (line, value) in GYRO_LINES.iter().zip(gyro) {
            gyro_figure.push_data_to_line(line, value)?;
        }

        let rewards = self.viewer.figure(REWARDS_FIGURE);
        for (key, value) in infos.iter() {
            rewards.push_data_to_line(key, value)?;
        }

        self.viewer
            .figure(TOTAL_REWARD_FIGURE)
            .push_data_to_line(TOTAL_REWARD_LINE, self.total_reward)
    }

    #[must_use]
    pub fn total_reward(&self) -> f32 {
        self.total_reward
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The action sent with the latest step.
    #[must_use]
    pub fn action(&self) -> &[f32] {
        &self.action
    }

    /// The observation the next policy prediction will use.
    #[must_use]
    pub fn observation(&self) -> &[f32] {
        &self.observation
    }

    #[must_use]
    pub fn env(&self) -> &E {
        &self.env
    }

    #[must_use]
    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    #[must_use]
    pub fn into_parts(self) -> (E, V) {
        (self.env, self.viewer)
    }
}

fn register_figures<V: Viewer>(viewer: &mut V, reward_keys: &[&'static str]) -> Result<(), ViewerError> {
    let rewards = viewer.figure(REWARDS_FIGURE);
    rewards.set_title("Rewards").set_x_label("Step");
    for key in reward_keys {
        rewards.add_line(*key);
    }

    viewer
        .figure(TOTAL_REWARD_FIGURE)
        .add_line(TOTAL_REWARD_LINE)
        .line_color(TOTAL_REWARD_LINE, Color::rgb(0.0, 0.0, 1.0))?
        .set_x_label("Step");

    viewer
        .figure(FSR_FIGURE)
        .set_title("FSR")
        .set_x_label("Step")
        .add_line(LEFT_FSR_LINE)
        .add_line(RIGHT_FSR_LINE);

    let gyro = viewer.figure(GYRO_FIGURE);
    gyro.set_title("Gyroscope").set_x_label("Step");
    for line in GYRO_LINES {
        gyro.add_line(line);
    }
    Ok(())
}

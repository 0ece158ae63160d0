use std::collections::VecDeque;
use std::time::Duration;

use nao::{Env, EnvError, Fsr, Infos, Segment, SegmentKind, Skeleton, Transition, Vec3, WalkingEnv};
use policy::{Policy, PolicyError};
use viewer::{HeadlessConfig, HeadlessViewer, Viewer};
use walking::driver::{FSR_FIGURE, REWARDS_FIGURE, TOTAL_REWARD_FIGURE, TOTAL_REWARD_LINE};
use walking::{pacing_delay, Driver};

const OBS_SIZE: usize = 3;
const ACTION_SIZE: usize = 2;

/// Scripted environment that records everything the driver does to it.
#[derive(Default)]
struct StubEnv {
    rewards: VecDeque<f32>,
    calls: Vec<String>,
    actions: Vec<Vec<f32>>,
    steps_since_reset: usize,
    terminate_at: Option<usize>,
    rename_key_at: Option<usize>,
    dt: Option<f32>,
}

impl StubEnv {
    fn with_rewards(rewards: &[f32]) -> Self {
        Self {
            rewards: rewards.iter().copied().collect(),
            ..Self::default()
        }
    }

    fn observation(&self) -> Vec<f32> {
        vec![self.steps_since_reset as f32; OBS_SIZE]
    }
}

impl Env for StubEnv {
    fn step(&mut self, action: &[f32]) -> Result<Transition, EnvError> {
        if action.len() != ACTION_SIZE {
            return Err(EnvError::ActionShape {
                expected: ACTION_SIZE,
                actual: action.len(),
            });
        }
        self.calls.push("step".into());
        self.actions.push(action.to_vec());
        self.steps_since_reset += 1;

        let reward = if self.calls.contains(&"reset".to_string()) {
            self.rewards.pop_front().unwrap_or(0.0)
        } else {
            0.0
        };
        let mut infos = Infos::new();
        infos.insert("alive", reward);
        if self.rename_key_at == Some(self.steps_since_reset) {
            infos.insert("surprise", 0.0);
        } else {
            infos.insert("effort", -0.5 * reward);
        }
        Ok(Transition {
            observation: self.observation(),
            reward,
            terminated: self.terminate_at.is_some_and(|at| self.steps_since_reset >= at),
            truncated: false,
            infos,
        })
    }

    fn reset(&mut self) -> Vec<f32> {
        self.calls.push("reset".into());
        self.steps_since_reset = 0;
        vec![0.5; OBS_SIZE]
    }

    fn dt(&self) -> f32 {
        self.dt.unwrap_or(0.001)
    }

    fn obs_size(&self) -> usize {
        OBS_SIZE
    }

    fn action_size(&self) -> usize {
        ACTION_SIZE
    }
}

impl WalkingEnv for StubEnv {
    fn left_fsr(&self) -> Fsr {
        Fsr {
            front_left: 1.0,
            front_right: 1.0,
            rear_left: 0.5,
            rear_right: 0.5,
        }
    }

    fn right_fsr(&self) -> Fsr {
        Fsr::default()
    }

    fn gyroscope(&self) -> Vec3 {
        Vec3::new(0.1, -0.2, 0.3)
    }

    fn initialize_terrain(&mut self, max_height: f32, step_height: f32) -> Result<(), EnvError> {
        self.calls.push(format!("terrain {max_height} {step_height}"));
        Ok(())
    }

    fn skeleton(&self) -> Skeleton {
        Skeleton {
            segments: vec![Segment {
                from: Vec3::new(0.0, 0.0, 0.1),
                to: Vec3::new(0.0, 0.0, 0.3),
                kind: SegmentKind::Torso,
            }],
            markers: Vec::new(),
            focus: Vec3::new(0.0, 0.0, 0.2),
        }
    }
}

/// Returns `observation[0] + 1` for every action element.
struct OffsetPolicy {
    observation_size: usize,
    action_size: usize,
}

impl Policy for OffsetPolicy {
    fn predict(
        &mut self,
        observation: &[f32],
        deterministic: bool,
    ) -> Result<(Vec<f32>, Option<Vec<f32>>), PolicyError> {
        assert!(deterministic);
        Ok((vec![observation[0] + 1.0; self.action_size], None))
    }

    fn observation_size(&self) -> usize {
        self.observation_size
    }

    fn action_size(&self) -> usize {
        self.action_size
    }
}

fn headless() -> HeadlessViewer {
    HeadlessViewer::new(HeadlessConfig {
        log_interval: 0,
        ..Default::default()
    })
}

#[test]
fn setup_order_warm_up_reset_terrain() {
    let driver = Driver::new(StubEnv::default(), None, headless()).unwrap();
    assert_eq!(driver.env().calls, ["step", "reset", "terrain 0.1 0.01"]);
    assert_eq!(driver.env().actions, vec![vec![0.0; ACTION_SIZE]]);
    assert_eq!(driver.observation(), [0.5; OBS_SIZE]);
    assert_eq!(driver.ticks(), 0);
    assert_eq!(driver.total_reward(), 0.0);
}

#[test]
fn figures_are_registered() {
    let driver = Driver::new(StubEnv::default(), None, headless()).unwrap();
    let figures = driver.viewer().figures();
    let names: Vec<_> = figures.iter().map(|f| f.name()).collect();
    assert_eq!(names, ["rewards", "total_reward", "fsr", "gyro"]);

    let lines = |index: usize| -> Vec<String> {
        figures[index].lines().iter().map(|l| l.name().to_owned()).collect()
    };
    assert_eq!(lines(0), ["alive", "effort"]);
    assert_eq!(lines(1), ["Total Reward"]);
    assert_eq!(lines(2), ["Left FSR", "Right FSR"]);
    assert_eq!(lines(3), ["X Gyro", "Y Gyro", "Z Gyro"]);

    assert_eq!(figures[0].title(), Some("Rewards"));
    assert_eq!(figures[2].title(), Some("FSR"));
    assert_eq!(figures[3].title(), Some("Gyroscope"));
    assert!(figures.iter().all(|f| f.x_label() == Some("Step")));
    let total = figures[1].line(TOTAL_REWARD_LINE).unwrap();
    assert_eq!(total.color(), viewer::Color::BLUE);
}

#[test]
fn three_ticks_without_policy() {
    let mut driver = Driver::new(StubEnv::with_rewards(&[1.0, 2.0, 3.0]), None, headless()).unwrap();
    for _ in 0..3 {
        driver.tick().unwrap();
    }
    assert_eq!(driver.total_reward(), 6.0);
    assert_eq!(driver.viewer().frames(), 3);
    // the warm-up step plus three ticks, all with the zero action
    let actions = &driver.env().actions;
    assert_eq!(actions.len(), 4);
    assert!(actions.iter().all(|a| a == &vec![0.0; ACTION_SIZE]));

    let total = driver.viewer().figures()[1].line(TOTAL_REWARD_LINE).unwrap();
    assert_eq!(total.samples().collect::<Vec<_>>(), vec![1.0, 3.0, 6.0]);
}

#[test]
fn total_reward_is_the_sum_of_rewards() {
    let rewards = [0.25, -1.0, 4.5, 0.125, 2.0];
    let mut driver = Driver::new(StubEnv::with_rewards(&rewards), None, headless()).unwrap();
    let mut last = None;
    for _ in 0..rewards.len() {
        last = Some(driver.tick().unwrap());
    }
    let expected: f32 = rewards.iter().sum();
    assert_eq!(driver.total_reward(), expected);
    let last = last.unwrap();
    assert_eq!(last.tick, 5);
    assert_eq!(last.reward, 2.0);
    assert_eq!(last.total_reward, expected);
}

#[test]
fn every_line_gets_one_value_per_tick() {
    let mut driver = Driver::new(StubEnv::with_rewards(&[1.0; 7]), None, headless()).unwrap();
    for tick in 1..=7 {
        driver.tick().unwrap();
        for figure in driver.viewer().figures() {
            for line in figure.lines() {
                assert_eq!(line.pushed(), tick, "{} / {}", figure.name(), line.name());
            }
        }
    }
    let figures = driver.viewer().figures();
    let fsr = figures.iter().find(|f| f.name() == FSR_FIGURE).unwrap();
    assert_eq!(fsr.line("Left FSR").unwrap().last(), Some(3.0));
    assert_eq!(fsr.line("Right FSR").unwrap().last(), Some(0.0));
    let rewards = figures.iter().find(|f| f.name() == REWARDS_FIGURE).unwrap();
    assert_eq!(rewards.line("effort").unwrap().last(), Some(-0.5));
    let gyro = figures.iter().find(|f| f.name() == "gyro").unwrap();
    assert_eq!(gyro.line("Z Gyro").unwrap().last(), Some(0.3));
    let total = figures.iter().find(|f| f.name() == TOTAL_REWARD_FIGURE).unwrap();
    assert_eq!(total.line(TOTAL_REWARD_LINE).unwrap().last(), Some(7.0));
}

#[test]
fn policy_acts_on_the_prior_observation() {
    let policy = OffsetPolicy {
        observation_size: OBS_SIZE,
        action_size: ACTION_SIZE,
    };
    let mut driver = Driver::new(StubEnv::default(), Some(Box::new(policy)), headless()).unwrap();
    for _ in 0..3 {
        driver.tick().unwrap();
    }
    // reset observation is 0.5, then the step count since reset
    let actions = &driver.env().actions[1..];
    assert_eq!(actions, [vec![1.5; ACTION_SIZE], vec![2.0; ACTION_SIZE], vec![3.0; ACTION_SIZE]]);
    assert_eq!(driver.action(), [3.0; ACTION_SIZE]);
}

#[test]
fn mismatched_policy_is_rejected() {
    let policy = OffsetPolicy {
        observation_size: OBS_SIZE + 1,
        action_size: ACTION_SIZE,
    };
    let err = Driver::new(StubEnv::default(), Some(Box::new(policy)), headless()).err().unwrap();
    assert!(err.to_string().contains("observations"), "{err}");

    let policy = OffsetPolicy {
        observation_size: OBS_SIZE,
        action_size: ACTION_SIZE + 1,
    };
    let err = Driver::new(StubEnv::default(), Some(Box::new(policy)), headless()).err().unwrap();
    assert!(err.to_string().contains("actions"), "{err}");
}

#[test]
fn changed_telemetry_keys_are_an_error() {
    let env = StubEnv {
        rename_key_at: Some(2),
        ..StubEnv::default()
    };
    let mut driver = Driver::new(env, None, headless()).unwrap();
    driver.tick().unwrap();
    let err = driver.tick().unwrap_err();
    assert!(err.to_string().contains("telemetry keys changed"), "{err}");
}

#[test]
fn episode_end_does_not_reset() {
    let env = StubEnv {
        terminate_at: Some(2),
        ..StubEnv::default()
    };
    let mut driver = Driver::new(env, None, headless()).unwrap();
    let reports: Vec<_> = (0..5).map(|_| driver.tick().unwrap()).collect();
    assert!(!reports[0].terminated);
    assert!(reports[1..].iter().all(|r| r.terminated));
    assert_eq!(driver.env().calls.iter().filter(|c| *c == "reset").count(), 1);
    assert_eq!(driver.ticks(), 5);
}

#[test]
fn scene_follows_the_skeleton() {
    let mut driver = Driver::new(StubEnv::default(), None, headless()).unwrap();
    driver.tick().unwrap();
    let scene = driver.viewer().scene();
    assert_eq!(scene.segments.len(), 1);
    assert_eq!(scene.segments[0].from, [0.0, 0.1]);
    assert_eq!(scene.focus, [0.0, 0.2]);
}

#[test]
fn run_stops_when_the_viewer_closes() {
    let viewer = HeadlessViewer::new(HeadlessConfig {
        max_frames: Some(4),
        log_interval: 0,
        ..Default::default()
    });
    let mut driver = Driver::new(StubEnv::with_rewards(&[1.0; 10]), None, viewer).unwrap();
    let summary = driver.run().unwrap();
    assert_eq!(summary.ticks, 4);
    assert_eq!(summary.total_reward, 4.0);
    assert!(!driver.viewer().is_alive());
    assert!(summary.elapsed >= Duration::from_millis(3));
}

#[test]
fn run_rejects_an_unusable_timestep() {
    for dt in [-0.01, f32::NAN] {
        let env = StubEnv {
            dt: Some(dt),
            ..StubEnv::with_rewards(&[1.0; 4])
        };
        let mut driver = Driver::new(env, None, headless()).unwrap();
        let err = driver.run().unwrap_err();
        assert!(format!("{err:#}").contains("invalid environment timestep"));
        assert_eq!(driver.ticks(), 0);
    }
}

#[test]
fn pacing_delay_never_goes_negative() {
    let dt = Duration::from_millis(12);
    assert_eq!(pacing_delay(dt, Duration::from_millis(5)), Duration::from_millis(7));
    assert_eq!(pacing_delay(dt, dt), Duration::ZERO);
    assert_eq!(pacing_delay(dt, Duration::from_millis(40)), Duration::ZERO);
    assert_eq!(pacing_delay(dt, Duration::ZERO), dt);
}

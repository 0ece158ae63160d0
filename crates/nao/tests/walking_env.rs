use nao::{Env, EnvError, NaoWalking, NaoWalkingConfig, RewardTerm, SegmentKind, WalkingEnv};

const BODY_MASS: f32 = 5.305;

fn standing_env() -> NaoWalking {
    NaoWalking::new(NaoWalkingConfig::default()).unwrap()
}

#[test]
fn spaces_and_timestep() {
    let mut env = standing_env();
    assert_eq!(env.action_size(), 12);
    assert_eq!(env.obs_size(), 38);
    assert!((env.dt() - 0.012).abs() < 1e-6);

    let obs = env.reset();
    assert_eq!(obs.len(), env.obs_size());
    let transition = env.step(&vec![0.0; env.action_size()]).unwrap();
    assert_eq!(transition.observation.len(), env.obs_size());
}

#[test]
fn rejects_wrong_action_length() {
    let mut env = standing_env();
    let err = env.step(&[0.0; 11]).unwrap_err();
    assert_eq!(err, EnvError::ActionShape { expected: 12, actual: 11 });
    assert_eq!(env.episode_steps(), 0);
}

#[test]
fn rejects_non_finite_actions() {
    let mut env = standing_env();
    let mut action = vec![0.0; 12];
    action[3] = f32::NAN;
    assert_eq!(env.step(&action).unwrap_err(), EnvError::NonFiniteAction { index: 3 });
    action[3] = 0.0;
    action[7] = f32::INFINITY;
    assert_eq!(env.step(&action).unwrap_err(), EnvError::NonFiniteAction { index: 7 });
}

/// Holding the zero action for a second keeps the robot on its feet.
#[test]
fn zero_action_keeps_standing() {
    let mut env = standing_env();
    env.reset();
    let action = vec![0.0; env.action_size()];
    let steps = (1.0 / env.dt()).ceil() as usize;
    for _ in 0..steps {
        let transition = env.step(&action).unwrap();
        assert!(!transition.terminated);
        assert!(transition.reward.is_finite());
    }
    let orientation = env.torso_orientation();
    assert!(orientation.x.abs() < 0.05, "roll = {}", orientation.x);
    assert!(orientation.y.abs() < 0.05, "pitch = {}", orientation.y);
    assert!((env.torso_height() - 0.311).abs() < 0.01, "height = {}", env.torso_height());
    assert!(!env.has_fallen());
}

#[test]
fn standing_load_matches_body_mass() {
    let mut env = standing_env();
    env.reset();
    env.step(&[0.0; 12]).unwrap();
    let left = env.left_fsr().sum();
    let right = env.right_fsr().sum();
    assert!((left + right - BODY_MASS).abs() < 1e-3, "total = {}", left + right);
    assert!((left - right).abs() < 0.05, "left = {left}, right = {right}");
}

#[test]
fn observation_reports_gravity_down_when_upright() {
    let mut env = standing_env();
    let obs = env.reset();
    let gyro = &obs[24..27];
    let gravity = &obs[27..30];
    assert!(gyro.iter().all(|v| v.abs() < 1e-6));
    assert!(gravity[0].abs() < 1e-5 && gravity[1].abs() < 1e-5);
    assert!((gravity[2] + 1.0).abs() < 1e-5);
    let gyroscope = env.gyroscope();
    assert!(gyroscope.length() < 1e-6);
}

#[test]
fn infos_keys_are_stable() {
    let mut env = standing_env();
    let first = env.step(&[0.0; 12]).unwrap();
    let keys: Vec<_> = first.infos.keys().collect();
    let expected: Vec<_> = RewardTerm::ALL.iter().map(|t| t.name()).collect();
    assert_eq!(keys, expected);

    let mut action = vec![0.0; 12];
    for step in 0..20 {
        action[2] = if step % 2 == 0 { 0.3 } else { -0.3 };
        let transition = env.step(&action).unwrap();
        assert!(transition.infos.same_keys(&first.infos));
        let sum: f32 = transition.infos.iter().map(|(_, v)| v).sum();
        assert!((sum - transition.reward).abs() < 1e-4);
    }
}

#[test]
fn truncates_at_episode_limit() {
    let mut env = NaoWalking::new(NaoWalkingConfig {
        max_episode_steps: 5,
        ..Default::default()
    })
    .unwrap();
    for step in 1..=5 {
        let transition = env.step(&[0.0; 12]).unwrap();
        assert_eq!(transition.truncated, step == 5);
    }
    env.reset();
    assert_eq!(env.episode_steps(), 0);
}

#[test]
fn out_of_range_actions_are_clamped_to_joint_limits() {
    let mut env = standing_env();
    for _ in 0..50 {
        let transition = env.step(&[5.0; 12]).unwrap();
        assert!(transition.observation.iter().all(|v| v.is_finite()));
    }
    let joints = env.joints().to_array();
    let lower = nao::BodyJoints::LOWER_LIMITS.to_array();
    let upper = nao::BodyJoints::UPPER_LIMITS.to_array();
    for i in 0..joints.len() {
        assert!(joints[i] >= lower[i] - 1e-6 && joints[i] <= upper[i] + 1e-6);
    }
}

#[test]
fn tomatoes_only_when_enabled() {
    let mut calm = standing_env();
    assert!(calm.tomatoes().is_none());

    let mut stormy = NaoWalking::new(NaoWalkingConfig {
        throw_tomatoes: true,
        seed: 7,
        ..Default::default()
    })
    .unwrap();
    let thrower = stormy.tomatoes().map(nao::TomatoThrower::thrown);
    assert_eq!(thrower, Some(0));

    // The first throw happens within three seconds.
    let steps = (3.5 / stormy.dt()) as usize;
    for _ in 0..steps {
        calm.step(&[0.0; 12]).unwrap();
        stormy.step(&[0.0; 12]).unwrap();
    }
    let thrown = stormy.tomatoes().map_or(0, nao::TomatoThrower::thrown);
    assert!(thrown >= 1, "thrown = {thrown}");
    assert!(calm.skeleton().markers.is_empty());
}

#[test]
fn tomato_hits_push_the_torso_and_cost_reward() {
    let mut env = NaoWalking::new(NaoWalkingConfig {
        throw_tomatoes: true,
        seed: 7,
        ..Default::default()
    })
    .unwrap();
    let name = RewardTerm::TomatoHits.name();

    let mut before = env.gyroscope();
    let mut hit = None;
    for _ in 0..(10.0 / env.dt()) as usize {
        let transition = env.step(&[0.0; 12]).unwrap();
        let penalty = transition.infos.get(name).unwrap();
        if penalty < 0.0 {
            hit = Some(penalty);
            break;
        }
        assert_eq!(penalty, 0.0);
        before = env.gyroscope();
    }

    let penalty = hit.expect("no tomato hit the robot within 10 s");
    assert!(penalty <= -1.0);
    let after = env.gyroscope();
    assert!((after - before).length() > 1e-3, "gyro {before:?} -> {after:?}");
}

#[test]
fn skeleton_follows_the_torso() {
    let env = standing_env();
    let skeleton = env.skeleton();
    assert_eq!(skeleton.focus, env.torso_position());
    let count = |kind| skeleton.segments.iter().filter(|s| s.kind == kind).count();
    assert_eq!(count(SegmentKind::Torso), 1);
    assert_eq!(count(SegmentKind::LeftLeg), 4);
    assert_eq!(count(SegmentKind::RightLeg), 4);
    assert!(count(SegmentKind::Terrain) > 0);
}

use super::{
    ActionMap, NavEnv, ObstacleGrid, RewardPolicy, SimLinks, TerminationLatch, TerminationReason,
    sensing_for,
};
use crate::config::{Backend, EnvConfig};
use crate::error::EnvError;
use crate::flight_control::{ActuatorCommand, FlightCommand, Pose};
use crate::sim_link::{
    AutopilotLink, ReferenceFrame,
    mock::{MockCall, MockSim},
};
use rand::{SeedableRng, rngs::StdRng};
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

#[test]
fn test_discretized_reward_constants() {
    let policy = RewardPolicy::discretized();
    assert!((policy.reward(true, 10.0, false) - 5.0).abs() < f64::EPSILON);
    assert!((policy.reward(false, 10.0, false) - 1.0).abs() < f64::EPSILON);
    assert!((policy.reward(true, 0.5, true) + 200.0).abs() < f64::EPSILON);
    assert!((policy.reward(false, 0.5, true) + 200.0).abs() < f64::EPSILON);
}

#[test]
fn test_shaped_reward_breakpoints() {
    let policy = RewardPolicy::shaped();
    assert!((policy.reward(true, 5.0, false) - 0.5).abs() < 1e-12);
    assert!((policy.reward(false, 5.0, false) - 0.25).abs() < 1e-12);
    assert!(policy.reward(true, 2.0, false).abs() < 1e-12);
    assert!((policy.reward(false, 1.5, false) + 2.5).abs() < 1e-12);
    assert!((policy.reward(false, 1.0, false) + 5.0).abs() < 1e-12);
    assert!((policy.reward(true, 7.0, true) + 10.0).abs() < 1e-12);
}

#[test]
fn test_shaped_reward_monotonic() {
    let policy = RewardPolicy::shaped();
    let samples = (0..=100).map(|i| 1.0 + f64::from(i) / 100.0).collect::<Vec<_>>();
    for pair in samples.windows(2) {
        assert!(policy.reward(false, pair[0], false) <= policy.reward(false, pair[1], false));
    }
    for range in [2.01, 3.0, 10.0, f64::INFINITY] {
        assert!((policy.reward(false, range, false) - 0.25).abs() < 1e-12);
    }
}

#[test]
fn test_heading_bank() {
    let map = ActionMap::HeadingBank;
    assert_eq!(map.num_actions(), 8);
    let rc = |a| match map.command(a) {
        Ok(ActuatorCommand::RcOverride(cmd)) => cmd,
        other => panic!("unexpected command {other:?}"),
    };
    let yaws = (0..8).map(|a| rc(a).yaw()).collect::<Vec<_>>();
    assert_eq!(yaws, vec![1500, 1650, 1800, 1950, 1350, 1200, 1050, 1500]);
    assert_eq!(rc(0).pitch(), 1450);
    assert_eq!(rc(7).pitch(), 1550);
    for a in 0..8 {
        let cmd = rc(a);
        assert_eq!(cmd.channels()[0], 0);
        assert_eq!(cmd.throttle(), 1500);
        assert!(cmd.channels()[4..].iter().all(|c| *c == 0));
    }
    assert!(matches!(map.command(8), Err(EnvError::InvalidAction(8))));
    assert_eq!(
        map.release(),
        Some(ActuatorCommand::RcOverride(FlightCommand::new().with_pitch(1500).with_throttle(1500)))
    );
}

#[test]
fn test_turn_rate_map() {
    let map = ActionMap::turn_rate();
    assert_eq!(map.num_actions(), 9);
    assert_eq!(map.forward_action(), 4);
    let yaw_rate = |a| match map.command(a) {
        Ok(ActuatorCommand::Velocity(cmd)) => {
            assert!((cmd.linear.x - 2.5).abs() < 1e-12);
            cmd.angular.z
        }
        other => panic!("unexpected command {other:?}"),
    };
    assert!(yaw_rate(4).abs() < 1e-12);
    assert!((yaw_rate(0) + 40f64.to_radians()).abs() < 1e-12);
    assert!((yaw_rate(8) - 40f64.to_radians()).abs() < 1e-12);
    assert!(matches!(map.command(9), Err(EnvError::InvalidAction(9))));
    assert_eq!(map.release(), None);
}

#[test]
fn test_obstacle_jitter_stays_near_slot() {
    let grid = ObstacleGrid::default();
    let slots = grid.slots();
    assert_eq!(slots.len(), 150);
    assert_eq!(slots[0], (5.0, -27.0));
    assert_eq!(slots[149], (89.0, 27.0));
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..20 {
        let layout = grid.generate(&mut rng);
        for (i, ((name, pose), (x, y))) in layout.iter().zip(&slots).enumerate() {
            assert_eq!(*name, format!("unit_cylinder_{i}"));
            assert!((pose.position.x - x).abs() <= 1.0);
            assert!((pose.position.y - y).abs() <= 3.0);
            assert!((pose.position.z - 5.0).abs() < f64::EPSILON);
        }
    }
}

#[test]
fn test_obstacle_layouts_vary() {
    let grid = ObstacleGrid::default();
    let first = grid.randomized();
    let second = grid.randomized();
    let same = first.iter().zip(&second).filter(|(a, b)| a.1 == b.1).count();
    assert!(same < first.len());
    assert_eq!(
        grid.generate(&mut StdRng::seed_from_u64(11)),
        grid.generate(&mut StdRng::seed_from_u64(11))
    );
}

#[test]
fn test_latch_first_reason_wins() {
    let latch = TerminationLatch::new();
    assert!(latch.latch(TerminationReason::BoundaryViolation { x: 91.0, y: 0.0 }));
    assert!(!latch.latch(TerminationReason::RangeCrash { min_range: 0.2 }));
    assert_eq!(latch.reason(), Some(TerminationReason::BoundaryViolation { x: 91.0, y: 0.0 }));
    latch.clear();
    assert!(!latch.is_done());
}

#[tokio::test(start_paused = true)]
async fn test_rc_episode_end_to_end() {
    let (sim, mut env, c_tok) = rig(Backend::RcOverride, |_| ());
    let report = env.initialize().await.unwrap().unwrap();
    assert_eq!(report.attempts, 1);
    assert_eq!(sim.param_value("RTL_ALT"), Some(2));

    env.reset().await.unwrap();
    let calls = sim.calls();
    assert!(calls.contains(&MockCall::ResetWorld));
    assert!(calls.contains(&MockCall::SetEntityPose(
        "erlecopter".to_string(),
        Pose::at(0.0, 0.0, 0.0),
        ReferenceFrame::World
    )));
    assert_eq!(sim.count(|c| matches!(c, MockCall::Takeoff(_))), 2);

    sim.clear_calls();
    let res = env.step(0).await.unwrap();
    assert!(!res.done);
    assert!((res.reward - 5.0).abs() < f64::EPSILON);
    assert_eq!(res.info.discretized, Some(vec![6; 10]));
    let heading = ActionMap::HeadingBank.command(0).unwrap();
    assert_eq!(sim.calls(), vec![
        MockCall::Publish(heading),
        MockCall::Publish(ActionMap::HeadingBank.release().unwrap())
    ]);

    let res = env.step(3).await.unwrap();
    assert!((res.reward - 1.0).abs() < f64::EPSILON);

    sim.set_scan(vec![5.0, 0.5, f64::INFINITY]);
    let res = env.step(2).await.unwrap();
    assert!(res.done);
    assert!((res.reward + 200.0).abs() < f64::EPSILON);
    assert_eq!(res.info.termination, Some(TerminationReason::RangeCrash { min_range: 0.5 }));
    c_tok.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_rc_far_readings_never_end_episode() {
    let (sim, mut env, c_tok) = rig(Backend::RcOverride, |_| ());
    env.reset().await.unwrap();
    for scan in [vec![f64::NAN; 10], vec![0.0, 2.5, 3.0], vec![f64::INFINITY, 2.6]] {
        sim.set_scan(scan);
        let res = env.step(0).await.unwrap();
        assert!(!res.done);
    }
    c_tok.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_rc_drift_behind_origin_keeps_flying() {
    let (sim, mut env, c_tok) = rig(Backend::RcOverride, |_| ());
    env.initialize().await.unwrap();
    env.reset().await.unwrap();
    sim.place_vehicle(Pose::at(-0.05, 0.0, 2.0));
    sim.set_scan(vec![f64::INFINITY; 10]);
    let res = env.step(0).await.unwrap();
    assert!(!res.done);
    assert!((res.reward - 5.0).abs() < f64::EPSILON);
    assert_eq!(res.info.termination, None);
    assert_eq!(res.info.goal_distance, None);
    c_tok.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_velocity_episode_end_to_end() {
    let (sim, mut env, c_tok) = rig(Backend::Velocity, |_| ());
    assert!(env.initialize().await.unwrap().is_none());
    env.reset().await.unwrap();
    assert_eq!(sim.vehicle_pose(), Pose::at(0.0, 0.0, 2.0));
    assert_eq!(sim.obstacle("unit_cylinder_0"), Some(Pose::at(5.0, -27.0, 5.0)));
    assert_eq!(sim.count(|c| matches!(c, MockCall::SetEntityPose(_, _, ReferenceFrame::Inherit))), 150);
    assert_eq!(sim.count(|c| matches!(c, MockCall::ResetWorld | MockCall::Takeoff(_))), 0);

    let res = env.step(4).await.unwrap();
    assert!(!res.done);
    assert!((res.reward - 0.5).abs() < 1e-12);
    assert!((res.info.goal_distance.unwrap() - 90.0).abs() < 1e-9);
    assert!(res.info.goal_progress.unwrap().abs() < 1e-9);
    assert_eq!(res.info.discretized, None);

    sim.set_scan(vec![1.5, 3.0]);
    let res = env.step(2).await.unwrap();
    assert!(!res.done);
    assert!((res.reward + 2.5).abs() < 1e-12);

    sim.set_scan(vec![0.5, 3.0]);
    let res = env.step(4).await.unwrap();
    assert!(res.done);
    assert!((res.reward + 10.0).abs() < 1e-12);
    assert_eq!(res.info.termination, Some(TerminationReason::RangeCrash { min_range: 0.5 }));
    c_tok.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_boundary_violation_until_reset() {
    let (sim, mut env, c_tok) = rig(Backend::Velocity, |_| ());
    env.reset().await.unwrap();
    sim.place_vehicle(Pose::at(95.0, 0.0, 2.0));
    let res = env.step(4).await.unwrap();
    assert!(res.done);
    assert!((res.reward + 10.0).abs() < 1e-12);
    assert_eq!(res.info.termination, Some(TerminationReason::BoundaryViolation { x: 95.0, y: 0.0 }));
    assert!(env.episode_state().done);

    env.reset().await.unwrap();
    assert!(!env.episode_state().done);
    let res = env.step(4).await.unwrap();
    assert!(!res.done);
    assert_eq!(env.episode(), 2);
    c_tok.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_invalid_action_publishes_nothing() {
    let (sim, mut env, c_tok) = rig(Backend::Velocity, |_| ());
    env.reset().await.unwrap();
    sim.clear_calls();
    assert!(matches!(env.step(9).await, Err(EnvError::InvalidAction(9))));
    assert!(sim.calls().is_empty());
    c_tok.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_bounded_relocation_diverges() {
    let (sim, mut env, c_tok) = rig(Backend::Velocity, |c| c.max_relocation_attempts = Some(3));
    sim.ignore_relocation(true);
    sim.place_vehicle(Pose::at(10.0, 0.0, 2.0));
    assert!(matches!(env.reset().await, Err(EnvError::ResetDiverged(3))));
    assert_eq!(sim.count(|c| matches!(c, MockCall::SetEntityPose(name, _, _) if name == "dji")), 3);
    c_tok.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_reset_aborts_on_cancel() {
    let (sim, mut env, c_tok) = rig(Backend::Velocity, |_| ());
    sim.ignore_relocation(true);
    sim.place_vehicle(Pose::at(10.0, 0.0, 2.0));
    let cancel = async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        c_tok.cancel();
    };
    let (res, ()) = tokio::join!(env.reset(), cancel);
    assert!(matches!(res, Err(EnvError::Cancelled)));
}

#[tokio::test(start_paused = true)]
async fn test_seeded_action_sampling() {
    let (_sim, mut env, c_tok) = rig(Backend::Velocity, |_| ());
    assert_eq!(env.seed(Some(7)), vec![7]);
    let first = (0..32).map(|_| env.sample_action()).collect::<Vec<_>>();
    env.seed(Some(7));
    let second = (0..32).map(|_| env.sample_action()).collect::<Vec<_>>();
    assert_eq!(first, second);
    assert!(first.iter().all(|a| *a < env.action_space()));
    assert_eq!(env.seed(None).len(), 1);
    c_tok.cancel();
}

#[test]
fn test_autopilot_backend_needs_autopilot() {
    let config = EnvConfig::for_backend(Backend::RcOverride);
    let latch = Arc::new(TerminationLatch::new());
    let (hub, sync) = sensing_for(&config, &latch);
    let sim = Arc::new(MockSim::new("erlecopter"));
    let links = SimLinks { autopilot: None, world: sim.clone(), actuator: sim };
    let res = NavEnv::new(links, hub, sync, latch, config, CancellationToken::new());
    assert!(matches!(res, Err(EnvError::MissingAutopilot)));
}

fn rig(
    backend: Backend,
    tweak: impl FnOnce(&mut EnvConfig),
) -> (Arc<MockSim>, NavEnv, CancellationToken) {
    let mut config = EnvConfig::for_backend(backend);
    config.randomize_obstacles = false;
    tweak(&mut config);
    let latch = Arc::new(TerminationLatch::new());
    let (hub, sync) = sensing_for(&config, &latch);
    let sim = Arc::new(MockSim::new(&config.vehicle_name));
    let c_tok = CancellationToken::new();
    sim.spawn_feed(Arc::clone(&hub), Arc::clone(&sync), Duration::from_millis(50), c_tok.clone());
    let links = SimLinks {
        autopilot: Some(sim.clone() as Arc<dyn AutopilotLink>),
        world: sim.clone(),
        actuator: sim.clone(),
    };
    let env = NavEnv::new(links, hub, sync, latch, config, c_tok.clone()).unwrap();
    (sim, env, c_tok)
}

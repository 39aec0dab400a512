//! # Orchestrator 测试
//!
//! 使用记录调用顺序的桩协作者验证阶段顺序、单飞锁与失败恢复。

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

use super::*;
use crate::collaborators::*;
use crate::config::TransitionConfig;
use crate::effect::TransitionEffect;
use crate::error::{ErrorKind, TransitionError};
use crate::event::TransitionEvent;
use crate::geometry::Vec2;
use crate::request::{AudioCue, AudioCues, CueSlot, TransitionRequest, WorldId};
use crate::state::{TransitionOutcome, TransitionPhase, TransitionReport};

const DT: f32 = 0.1;

// -------------------------------------------------------------------------
// 桩协作者
// -------------------------------------------------------------------------

/// 共享调用日志
#[derive(Clone, Default)]
struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    fn push(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    fn text(&self) -> String {
        self.entries().join("\n")
    }

    fn len(&self) -> usize {
        self.0.borrow().len()
    }

    fn count(&self, prefix: &str) -> usize {
        self.0.borrow().iter().filter(|e| e.starts_with(prefix)).count()
    }

    fn index_of(&self, prefix: &str) -> Option<usize> {
        self.0.borrow().iter().position(|e| e.starts_with(prefix))
    }
}

struct StubEffects {
    log: CallLog,
    label: &'static str,
    remaining: f32,
    playing: bool,
}

impl TransitionEffectPlayer for StubEffects {
    fn cover_screen(&mut self, effect: &TransitionEffect) {
        self.log.push(format!("CoverScreen({})", effect.duration));
        self.label = "CoverScreen";
        self.remaining = effect.duration;
        self.playing = true;
    }

    fn uncover_screen(&mut self, effect: &TransitionEffect) {
        self.log.push(format!("UncoverScreen({})", effect.duration));
        self.label = "UncoverScreen";
        self.remaining = effect.duration;
        self.playing = true;
    }

    fn update(&mut self, dt: f32) {
        if !self.playing {
            return;
        }
        self.remaining -= dt;
        if self.remaining <= 1e-4 {
            self.playing = false;
            self.log.push(format!("{} done", self.label));
        }
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// 加载桩的脚本
#[derive(Clone, Copy)]
enum LoadScript {
    SucceedAfter(u32),
    FailAfter(u32),
    NoHandle,
    LoseActor,
    LoseCamera,
}

struct LoaderState {
    registered: HashSet<WorldId>,
    script: LoadScript,
    persistent: HashSet<PersistentObject>,
    actor_alive: bool,
    camera_alive: bool,
}

struct StubLoader {
    log: CallLog,
    state: Rc<RefCell<LoaderState>>,
}

struct StubHandle {
    log: CallLog,
    state: Rc<RefCell<LoaderState>>,
    polls: u32,
    target: u32,
    fails: bool,
    done: bool,
}

impl LoadHandle for StubHandle {
    fn update(&mut self, _dt: f32) {
        if self.done {
            return;
        }
        self.polls += 1;
        self.log.push(format!("Poll({})", self.polls));
        if self.polls >= self.target {
            self.done = true;
            let mut state = self.state.borrow_mut();
            // 替换加载：未标记保留的角色随旧世界一起销毁
            if !state.persistent.contains(&PersistentObject::Actor)
                || matches!(state.script, LoadScript::LoseActor)
            {
                state.actor_alive = false;
            }
            if matches!(state.script, LoadScript::LoseCamera) {
                state.camera_alive = false;
            }
        }
    }

    fn is_done(&self) -> bool {
        self.done && !self.fails
    }

    fn progress(&self) -> f32 {
        self.polls as f32 / self.target as f32
    }

    fn failed(&self) -> bool {
        self.done && self.fails
    }
}

impl WorldLoader for StubLoader {
    fn is_registered(&self, world_id: &WorldId) -> bool {
        self.state.borrow().registered.contains(world_id)
    }

    fn load_replacing(&mut self, world_id: &WorldId) -> Option<Box<dyn LoadHandle>> {
        self.log.push(format!("LoadReplacing({world_id})"));
        let script = self.state.borrow().script;
        let (target, fails) = match script {
            LoadScript::SucceedAfter(n) => (n, false),
            LoadScript::FailAfter(n) => (n, true),
            LoadScript::LoseActor | LoadScript::LoseCamera => (2, false),
            LoadScript::NoHandle => return None,
        };
        Some(Box::new(StubHandle {
            log: self.log.clone(),
            state: Rc::clone(&self.state),
            polls: 0,
            target,
            fails,
            done: false,
        }))
    }

    fn mark_persistent(&mut self, object: PersistentObject) {
        self.log.push(format!("MarkPersistent({object:?})"));
        self.state.borrow_mut().persistent.insert(object);
    }

    fn clear_persistent(&mut self, object: PersistentObject) {
        self.log.push(format!("ClearPersistent({object:?})"));
        self.state.borrow_mut().persistent.remove(&object);
    }

    fn adopt(&mut self, object: PersistentObject, world_id: &WorldId) {
        self.log.push(format!("Adopt({object:?}, {world_id})"));
    }

    fn is_alive(&self, object: PersistentObject) -> bool {
        match object {
            PersistentObject::Actor => self.state.borrow().actor_alive,
            PersistentObject::Camera => self.state.borrow().camera_alive,
        }
    }
}

#[derive(Default)]
struct ActorState {
    position: Vec2,
    velocity: Vec2,
    enabled: bool,
}

struct StubActor {
    log: CallLog,
    state: Rc<RefCell<ActorState>>,
}

impl ActorMobility for StubActor {
    fn disable(&mut self) {
        self.log.push("Disable");
        self.state.borrow_mut().enabled = false;
    }

    fn enable(&mut self) {
        self.log.push("Enable");
        self.state.borrow_mut().enabled = true;
    }

    fn zero_velocity(&mut self) {
        self.log.push("ZeroVelocity");
        self.state.borrow_mut().velocity = Vec2::zero();
    }

    fn position(&self) -> Vec2 {
        self.state.borrow().position
    }

    fn set_position(&mut self, position: Vec2) {
        self.log.push(format!("SetPosition{position}"));
        self.state.borrow_mut().position = position;
    }
}

struct StubCamera {
    log: CallLog,
    position: Rc<Cell<Vec2>>,
}

impl CameraRig for StubCamera {
    fn position(&self) -> Vec2 {
        self.position.get()
    }

    fn set_position(&mut self, position: Vec2) {
        self.log.push(format!("Camera.SetPosition{position}"));
        self.position.set(position);
    }
}

struct StubAudio {
    log: CallLog,
}

impl AudioCuePlayer for StubAudio {
    fn play(&mut self, cue: &AudioCue) {
        self.log.push(format!("Play({cue})"));
    }
}

// -------------------------------------------------------------------------
// 测试夹具
// -------------------------------------------------------------------------

struct Harness {
    orchestrator: TransitionOrchestrator,
    log: CallLog,
    actor: Rc<RefCell<ActorState>>,
    camera: Option<Rc<Cell<Vec2>>>,
    loader: Rc<RefCell<LoaderState>>,
}

impl Harness {
    fn new(script: LoadScript, with_camera: bool) -> Self {
        let log = CallLog::default();
        let actor = Rc::new(RefCell::new(ActorState {
            position: Vec2::new(1.0, 1.0),
            velocity: Vec2::new(3.0, 0.0),
            enabled: true,
        }));
        let camera = with_camera.then(|| Rc::new(Cell::new(Vec2::new(4.0, -1.0))));
        let loader = Rc::new(RefCell::new(LoaderState {
            registered: ["Cave1", "Town"].into_iter().map(WorldId::new).collect(),
            script,
            persistent: HashSet::new(),
            actor_alive: true,
            camera_alive: true,
        }));

        let collaborators = Collaborators {
            effects: Box::new(StubEffects {
                log: log.clone(),
                label: "",
                remaining: 0.0,
                playing: false,
            }),
            loader: Box::new(StubLoader {
                log: log.clone(),
                state: Rc::clone(&loader),
            }),
            actor: Box::new(StubActor {
                log: log.clone(),
                state: Rc::clone(&actor),
            }),
            camera: camera.as_ref().map(|position| {
                Box::new(StubCamera {
                    log: log.clone(),
                    position: Rc::clone(position),
                }) as Box<dyn CameraRig>
            }),
            audio: Box::new(StubAudio { log: log.clone() }),
        };

        Self {
            orchestrator: TransitionOrchestrator::new(collaborators, TransitionConfig::default()),
            log,
            actor,
            camera,
            loader,
        }
    }

    /// 推进直到产出报告
    fn run_to_end(&mut self) -> TransitionReport {
        for _ in 0..1000 {
            if let Some(report) = self.orchestrator.tick(DT) {
                return report;
            }
        }
        panic!("过渡没有结束");
    }

    fn camera_position(&self) -> Vec2 {
        self.camera.as_ref().map(|c| c.get()).unwrap_or_default()
    }
}

fn fade_in_world(x: f32, y: f32) -> TransitionRequest {
    TransitionRequest::in_world(Vec2::new(x, y))
        .with_effect(TransitionEffect::fade(0.4))
        .with_post_cover_delay(0.2)
}

fn fade_cross_world(world: &str, x: f32, y: f32) -> TransitionRequest {
    TransitionRequest::cross_world(world, Vec2::new(x, y)).with_effect(TransitionEffect::fade(0.4))
}

// -------------------------------------------------------------------------
// 场景
// -------------------------------------------------------------------------

#[test]
fn test_in_world_scenario_call_order() {
    let mut h = Harness::new(LoadScript::SucceedAfter(1), false);
    let ticket = h.orchestrator.submit(fade_in_world(10.0, 5.0)).unwrap();

    assert!(h.orchestrator.is_transitioning());
    assert_eq!(h.orchestrator.phase(), TransitionPhase::CoveringScreen);

    let report = h.run_to_end();
    assert_eq!(report.outcome, TransitionOutcome::Completed);
    assert_eq!(report.id, ticket.id());
    assert_eq!(ticket.outcome(), Some(TransitionOutcome::Completed));

    insta::assert_snapshot!(h.log.text(), @r"
    Disable
    ZeroVelocity
    CoverScreen(0.4)
    CoverScreen done
    SetPosition(10, 5)
    UncoverScreen(0.4)
    UncoverScreen done
    Enable
    ");

    let state = h.actor.borrow();
    assert_eq!(state.position, Vec2::new(10.0, 5.0));
    assert_eq!(state.velocity, Vec2::zero());
    assert!(state.enabled);
}

#[test]
fn test_in_world_holds_for_post_cover_delay() {
    let mut h = Harness::new(LoadScript::SucceedAfter(1), false);
    h.orchestrator.submit(fade_in_world(10.0, 5.0)).unwrap();

    // 遮盖 0.4 秒
    let mut ticks = 0;
    while h.log.index_of("SetPosition").is_none() {
        h.orchestrator.tick(DT);
        ticks += 1;
    }
    assert_eq!(ticks, 4);
    assert_eq!(h.orchestrator.phase(), TransitionPhase::Holding);

    // 停顿 0.2 秒后才开始揭开
    h.orchestrator.tick(DT);
    assert_eq!(h.log.count("UncoverScreen"), 0);
    h.orchestrator.tick(DT);
    assert_eq!(h.log.count("UncoverScreen("), 1);
    assert_eq!(h.orchestrator.phase(), TransitionPhase::UncoveringScreen);
}

#[test]
fn test_cross_world_scenario() {
    let mut h = Harness::new(LoadScript::SucceedAfter(3), true);
    let offset = h.camera_position() - h.actor.borrow().position;

    h.orchestrator
        .submit(fade_cross_world("Cave1", 0.0, 0.0))
        .unwrap();
    let report = h.run_to_end();

    assert_eq!(report.outcome, TransitionOutcome::Completed);
    assert!(h.camera_position().approx_eq(Vec2::zero() + offset, 1e-5));
    assert!(h.loader.borrow().persistent.is_empty());
    assert!(h.loader.borrow().actor_alive);

    insta::assert_snapshot!(h.log.text(), @r"
    Disable
    ZeroVelocity
    CoverScreen(0.4)
    CoverScreen done
    MarkPersistent(Actor)
    MarkPersistent(Camera)
    LoadReplacing(Cave1)
    Poll(1)
    Poll(2)
    Poll(3)
    ClearPersistent(Actor)
    ClearPersistent(Camera)
    Adopt(Actor, Cave1)
    Adopt(Camera, Cave1)
    SetPosition(0, 0)
    Camera.SetPosition(3, -2)
    UncoverScreen(0.4)
    UncoverScreen done
    Enable
    ");
}

#[test]
fn test_rejected_concurrent_request() {
    let mut h = Harness::new(LoadScript::SucceedAfter(20), true);
    let a = h
        .orchestrator
        .submit(fade_cross_world("Cave1", 0.0, 0.0))
        .unwrap();

    // 推进到加载中
    for _ in 0..6 {
        assert!(h.orchestrator.tick(DT).is_none());
    }
    assert_eq!(h.orchestrator.phase(), TransitionPhase::Relocating);

    let calls_before = h.log.len();
    let b = h.orchestrator.submit(fade_in_world(10.0, 5.0));
    assert_eq!(b.as_ref().unwrap_err(), &TransitionError::AlreadyInProgress);
    assert_eq!(
        TransitionOutcome::from(b.unwrap_err()),
        TransitionOutcome::failed(ErrorKind::AlreadyInProgress)
    );
    assert_eq!(h.log.len(), calls_before);

    let report = h.run_to_end();
    assert_eq!(report.id, a.id());
    assert_eq!(report.outcome, TransitionOutcome::Completed);
    assert_eq!(h.actor.borrow().position, Vec2::zero());
}

// -------------------------------------------------------------------------
// 性质
// -------------------------------------------------------------------------

#[test]
fn test_single_flight_many_submissions() {
    let mut h = Harness::new(LoadScript::SucceedAfter(3), true);
    h.orchestrator.submit(fade_in_world(2.0, 2.0)).unwrap();
    assert_eq!(h.log.count("Disable"), 1);

    for step in 0..12 {
        let calls_before = h.log.len();
        let result = if step % 2 == 0 {
            h.orchestrator.submit(fade_in_world(step as f32, 0.0))
        } else {
            h.orchestrator.submit(fade_cross_world("Town", 0.0, 0.0))
        };
        assert_eq!(result.unwrap_err().kind(), ErrorKind::AlreadyInProgress);
        assert_eq!(h.log.len(), calls_before, "被拒绝的提交不应调用协作者");
        if h.orchestrator.tick(DT).is_some() {
            break;
        }
    }

    assert_eq!(h.log.count("Disable"), 1);
    assert_eq!(h.log.count("CoverScreen("), 1);
}

#[test]
fn test_phase_order_cover_before_move_before_uncover() {
    for request in [fade_in_world(-3.0, 7.5), fade_cross_world("Town", 9.0, 9.0)] {
        let mut h = Harness::new(LoadScript::SucceedAfter(2), true);
        h.orchestrator.submit(request).unwrap();
        h.run_to_end();

        let cover_done = h.log.index_of("CoverScreen done").unwrap();
        let moved = h.log.index_of("SetPosition").unwrap();
        let uncover = h.log.index_of("UncoverScreen(").unwrap();
        let enable = h.log.index_of("Enable").unwrap();
        assert!(cover_done < moved);
        assert!(moved < uncover);
        assert!(uncover < enable);
    }
}

#[test]
fn test_lock_released_for_every_outcome() {
    let cases = [
        (LoadScript::SucceedAfter(2), TransitionOutcome::Completed),
        (
            LoadScript::FailAfter(2),
            TransitionOutcome::failed(ErrorKind::LoadFailed),
        ),
        (
            LoadScript::NoHandle,
            TransitionOutcome::failed(ErrorKind::LoadFailed),
        ),
        (
            LoadScript::LoseActor,
            TransitionOutcome::failed(ErrorKind::ActorLost),
        ),
        (LoadScript::LoseCamera, TransitionOutcome::Completed),
    ];

    for (script, expected) in cases {
        let mut h = Harness::new(script, true);
        let probe = h.orchestrator.probe();
        let ticket = h
            .orchestrator
            .submit(fade_cross_world("Cave1", 5.0, 5.0))
            .unwrap();
        let report = h.run_to_end();

        assert_eq!(report.outcome, expected);
        assert_eq!(ticket.outcome(), Some(expected));
        assert!(!h.orchestrator.is_transitioning());
        assert!(!probe.is_transitioning());
        assert_eq!(h.orchestrator.phase(), TransitionPhase::Idle);
        assert!(h.loader.borrow().persistent.is_empty());

        // 锁释放后可以立即提交新的过渡
        assert!(h.orchestrator.submit(fade_in_world(0.0, 0.0)).is_ok());
    }
}

#[test]
fn test_camera_offset_preserved_on_both_paths() {
    let targets = [
        Vec2::new(10.0, 5.0),
        Vec2::new(-250.5, 13.25),
        Vec2::new(0.0, 0.0),
    ];
    let offsets = [Vec2::new(0.0, 0.0), Vec2::new(3.0, -2.0), Vec2::new(-0.5, 8.0)];

    for target in targets {
        for offset in offsets {
            for cross_world in [false, true] {
                let mut h = Harness::new(LoadScript::SucceedAfter(1), true);
                let start = h.actor.borrow().position;
                if let Some(camera) = &h.camera {
                    camera.set(start + offset);
                }

                let request = if cross_world {
                    TransitionRequest::cross_world("Town", target)
                } else {
                    TransitionRequest::in_world(target)
                }
                .with_effect(TransitionEffect::fade(0.2));
                h.orchestrator.submit(request).unwrap();
                h.run_to_end();

                assert!(
                    h.camera_position().approx_eq(target + offset, 1e-4),
                    "target={target} offset={offset} cross_world={cross_world}"
                );
            }
        }
    }
}

// -------------------------------------------------------------------------
// 失败恢复
// -------------------------------------------------------------------------

#[test]
fn test_load_failure_recovery() {
    let mut h = Harness::new(LoadScript::FailAfter(2), true);
    let cues = AudioCues {
        on_start: Some(AudioCue::new("start")),
        on_midpoint: Some(AudioCue::new("mid")),
        on_arrival: Some(AudioCue::new("arrive")),
    };
    h.orchestrator
        .submit(fade_cross_world("Cave1", 50.0, 50.0).with_audio_cues(cues))
        .unwrap();
    let report = h.run_to_end();

    assert_eq!(report.outcome, TransitionOutcome::failed(ErrorKind::LoadFailed));
    assert!(matches!(
        report.error,
        Some(TransitionError::LoadFailed { .. })
    ));
    assert_eq!(h.log.count("UncoverScreen("), 1);
    assert_eq!(h.log.count("SetPosition"), 0);
    assert_eq!(h.log.count("Play(mid)"), 0);
    assert_eq!(h.log.count("Play(arrive)"), 0);

    let state = h.actor.borrow();
    assert!(state.enabled);
    assert_eq!(state.position, Vec2::new(1.0, 1.0));
}

#[test]
fn test_no_handle_is_load_failure() {
    let mut h = Harness::new(LoadScript::NoHandle, false);
    h.orchestrator
        .submit(fade_cross_world("Cave1", 0.0, 0.0))
        .unwrap();
    let report = h.run_to_end();

    assert_eq!(report.outcome, TransitionOutcome::failed(ErrorKind::LoadFailed));
    insta::assert_snapshot!(h.log.text(), @r"
    Disable
    ZeroVelocity
    CoverScreen(0.4)
    CoverScreen done
    MarkPersistent(Actor)
    LoadReplacing(Cave1)
    ClearPersistent(Actor)
    UncoverScreen(0.4)
    UncoverScreen done
    Enable
    ");
}

#[test]
fn test_actor_lost_still_uncovers() {
    let mut h = Harness::new(LoadScript::LoseActor, true);
    h.orchestrator
        .submit(fade_cross_world("Cave1", 0.0, 0.0))
        .unwrap();
    let report = h.run_to_end();

    assert_eq!(report.outcome, TransitionOutcome::failed(ErrorKind::ActorLost));
    assert_eq!(h.log.count("UncoverScreen("), 1);
    assert_eq!(h.log.count("Adopt"), 0);
    assert_eq!(h.log.count("SetPosition"), 0);
    assert_eq!(h.log.count("Enable"), 1);
    assert!(h.loader.borrow().persistent.is_empty());
}

#[test]
fn test_camera_lost_is_neither_adopted_nor_moved() {
    let mut h = Harness::new(LoadScript::LoseCamera, true);
    let camera_before = h.camera_position();
    h.orchestrator
        .submit(fade_cross_world("Cave1", 9.0, 9.0))
        .unwrap();
    let report = h.run_to_end();

    assert_eq!(report.outcome, TransitionOutcome::Completed);
    assert_eq!(h.log.count("Adopt(Actor, Cave1)"), 1);
    assert_eq!(h.log.count("Adopt(Camera"), 0);
    assert_eq!(h.log.count("Camera.SetPosition"), 0);
    assert_eq!(h.camera_position(), camera_before);
    assert_eq!(h.actor.borrow().position, Vec2::new(9.0, 9.0));
    assert_eq!(h.log.count("ClearPersistent(Camera)"), 1);
    assert!(h.loader.borrow().persistent.is_empty());
}

#[test]
fn test_invalid_requests_have_no_side_effects() {
    let mut h = Harness::new(LoadScript::SucceedAfter(1), true);

    let missing_effect = TransitionRequest::in_world(Vec2::new(1.0, 2.0));
    let unknown_world = fade_cross_world("Atlantis", 0.0, 0.0);
    let bad_position = fade_in_world(f32::NAN, 0.0);

    for request in [missing_effect, unknown_world, bad_position] {
        let err = h.orchestrator.submit(request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(
            TransitionOutcome::from(&err),
            TransitionOutcome::failed(ErrorKind::InvalidRequest)
        );
        assert!(!h.orchestrator.is_transitioning());
    }
    assert_eq!(h.log.len(), 0);
    assert!(h.orchestrator.drain_events().is_empty());
    assert!(h.orchestrator.tick(DT).is_none());
}

// -------------------------------------------------------------------------
// 音效、事件与同步完成
// -------------------------------------------------------------------------

#[test]
fn test_audio_cue_slots() {
    let mut h = Harness::new(LoadScript::SucceedAfter(1), false);
    let cues = AudioCues {
        on_start: Some(AudioCue::new("whoosh")),
        on_midpoint: None,
        on_arrival: Some(AudioCue::new("chime")),
    };
    h.orchestrator
        .submit(fade_in_world(3.0, 3.0).with_audio_cues(cues))
        .unwrap();
    h.run_to_end();

    let start = h.log.index_of("Play(whoosh)").unwrap();
    let cover = h.log.index_of("CoverScreen(").unwrap();
    let uncover_done = h.log.index_of("UncoverScreen done").unwrap();
    let arrival = h.log.index_of("Play(chime)").unwrap();
    let enable = h.log.index_of("Enable").unwrap();
    assert!(start < cover);
    assert!(uncover_done < arrival);
    assert!(arrival < enable);
    assert_eq!(h.log.count("Play("), 2);
}

#[test]
fn test_events_describe_run() {
    let mut h = Harness::new(LoadScript::SucceedAfter(3), false);
    let ticket = h
        .orchestrator
        .submit(fade_cross_world("Cave1", 0.0, 0.0).with_debug(true))
        .unwrap();
    h.run_to_end();

    let events = h.orchestrator.drain_events();
    assert!(events.iter().all(|e| e.transition_id() == ticket.id()));
    assert_eq!(
        events.first(),
        Some(&TransitionEvent::Started {
            id: ticket.id(),
            cross_world: true
        })
    );
    assert_eq!(
        events.last(),
        Some(&TransitionEvent::Finished {
            id: ticket.id(),
            outcome: TransitionOutcome::Completed
        })
    );

    let phases: Vec<TransitionPhase> = events
        .iter()
        .filter_map(|e| match e {
            TransitionEvent::PhaseEntered { phase, .. } => Some(*phase),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            TransitionPhase::FreezingActor,
            TransitionPhase::CoveringScreen,
            TransitionPhase::Relocating,
            TransitionPhase::Holding,
            TransitionPhase::UncoveringScreen,
            TransitionPhase::Restoring,
        ]
    );

    let progress: Vec<f32> = events
        .iter()
        .filter_map(|e| match e {
            TransitionEvent::LoadProgress { progress, .. } => Some(*progress),
            _ => None,
        })
        .collect();
    assert_eq!(progress.len(), 2);
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_instant_transition_completes_inside_submit() {
    let mut h = Harness::new(LoadScript::SucceedAfter(1), false);
    let request = TransitionRequest::in_world(Vec2::new(8.0, 8.0))
        .with_effect(TransitionEffect::fade(0.0))
        .with_audio_cues(AudioCues {
            on_midpoint: Some(AudioCue::new("mid")),
            ..AudioCues::default()
        });
    let ticket = h.orchestrator.submit(request).unwrap();

    assert!(!h.orchestrator.is_transitioning());
    assert_eq!(ticket.outcome(), Some(TransitionOutcome::Completed));
    assert!(
        h.orchestrator
            .drain_events()
            .iter()
            .any(|e| matches!(e, TransitionEvent::CuePlayed { slot: CueSlot::OnMidpoint, .. }))
    );

    // 同步完成的报告在下一次 tick 交付
    let report = h.orchestrator.tick(0.0).unwrap();
    assert_eq!(report.id, ticket.id());
    assert!(h.orchestrator.tick(0.0).is_none());
}

#[test]
fn test_ticket_pending_until_finished() {
    let mut h = Harness::new(LoadScript::SucceedAfter(1), false);
    let ticket = h.orchestrator.submit(fade_in_world(1.0, 2.0)).unwrap();
    h.orchestrator.tick(DT);
    assert!(!ticket.is_finished());
    assert_eq!(h.orchestrator.active_id(), Some(ticket.id()));

    h.run_to_end();
    assert!(ticket.is_finished());
    assert_eq!(h.orchestrator.active_id(), None);

    // 序号递增
    let next = h.orchestrator.submit(fade_in_world(0.0, 0.0)).unwrap();
    assert!(next.id() > ticket.id());
}

#[test]
fn test_validating_is_never_observed() {
    let mut h = Harness::new(LoadScript::SucceedAfter(2), true);
    h.orchestrator
        .submit(fade_cross_world("Cave1", 0.0, 0.0))
        .unwrap();

    while h.orchestrator.is_transitioning() {
        let phase = h.orchestrator.phase();
        assert_ne!(phase, TransitionPhase::Validating);
        assert!(phase.holds_lock(), "{phase}");
        h.orchestrator.tick(DT);
    }
    assert_eq!(h.orchestrator.phase(), TransitionPhase::Idle);

    let events = h.orchestrator.drain_events();
    assert!(events.iter().all(|e| match e {
        TransitionEvent::PhaseEntered { phase, .. } => phase.holds_lock(),
        _ => true,
    }));
}

#[test]
fn test_undrained_events_stay_bounded() {
    let mut h = Harness::new(LoadScript::SucceedAfter(3), true);
    let mut last = None;

    for i in 0..200 {
        let world = if i % 2 == 0 { "Cave1" } else { "Town" };
        let ticket = h
            .orchestrator
            .submit(fade_cross_world(world, 0.0, 0.0))
            .unwrap();
        let report = h.run_to_end();
        assert!(report.outcome.is_completed());
        assert!(h.orchestrator.pending_events() <= MAX_PENDING_EVENTS);
        last = Some(ticket.id());
    }

    // 保留的是最新的事件
    let events = h.orchestrator.drain_events();
    assert_eq!(events.len(), MAX_PENDING_EVENTS);
    assert_eq!(
        events.last(),
        Some(&TransitionEvent::Finished {
            id: last.unwrap(),
            outcome: TransitionOutcome::Completed
        })
    );
    assert_eq!(h.orchestrator.pending_events(), 0);
}

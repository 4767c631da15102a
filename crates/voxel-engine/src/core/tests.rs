use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use anyhow::{Result, bail};

use crate::device::ContextConfig;
use crate::input::{InputEvent, Key, KeyState, Modifiers};
use crate::paint::Color;
use crate::time::FrameTime;

use super::*;

type Journal = Rc<RefCell<Vec<String>>>;

fn note(journal: &Journal, entry: impl Into<String>) {
    journal.borrow_mut().push(entry.into());
}

fn count(journal: &Journal, entry: &str) -> usize {
    journal.borrow().iter().filter(|e| *e == entry).count()
}

fn has(journal: &Journal, entry: &str) -> bool {
    count(journal, entry) > 0
}

fn close() -> InputEvent {
    InputEvent::CloseRequested
}

fn escape() -> InputEvent {
    InputEvent::Key {
        key: Key::Escape,
        state: KeyState::Pressed,
        modifiers: Modifiers::default(),
        code: 0,
        repeat: false,
    }
}

fn benign() -> InputEvent {
    InputEvent::MouseMotion { dx: 1.0, dy: -1.0 }
}

// ---------------------------------------------------------------------------
// Scripted platform

#[derive(Default)]
struct MockPlatform {
    journal: Journal,
    batches: VecDeque<Vec<InputEvent>>,
    fail_window: bool,
    fail_poll: bool,
    skip_frames: bool,
    polls: usize,
    frames: u32,
}

impl MockPlatform {
    fn with_batches(batches: Vec<Vec<InputEvent>>) -> Self {
        Self {
            batches: batches.into(),
            ..Self::default()
        }
    }
}

impl GraphicsBackend for MockPlatform {
    type Graphics = ();
    type Frame = u32;

    fn set_attributes(&mut self, _config: &ContextConfig) -> Result<()> {
        note(&self.journal, "set_attributes");
        Ok(())
    }

    fn create_window(&mut self, _title: &str) -> Result<()> {
        note(&self.journal, "create_window");
        if self.fail_window {
            bail!("no display");
        }
        Ok(())
    }

    fn enable_default_state(&mut self) -> Result<()> {
        note(&self.journal, "enable_default_state");
        Ok(())
    }

    fn graphics(&self) -> Result<&()> {
        Ok(&())
    }

    fn set_title(&mut self, title: &str) {
        note(&self.journal, format!("title:{title}"));
    }

    fn begin_frame(&mut self, _clear: Color) -> Result<Option<u32>> {
        note(&self.journal, "begin_frame");
        if self.skip_frames {
            return Ok(None);
        }
        self.frames += 1;
        Ok(Some(self.frames))
    }

    fn present(&mut self, _frame: u32) -> Result<()> {
        note(&self.journal, "present");
        Ok(())
    }
}

impl InputGateway for MockPlatform {
    fn capture(&mut self) -> Result<()> {
        note(&self.journal, "capture");
        Ok(())
    }

    fn poll(&mut self) -> Result<Vec<InputEvent>> {
        note(&self.journal, "poll");
        self.polls += 1;
        assert!(self.polls < 1000, "frame loop never stopped");
        if self.fail_poll {
            bail!("event loop exited");
        }
        Ok(self.batches.pop_front().unwrap_or_default())
    }
}

impl Platform for MockPlatform {
    fn init(&mut self) -> Result<()> {
        note(&self.journal, "init");
        Ok(())
    }

    fn shutdown(&mut self) {
        note(&self.journal, "shutdown");
    }
}

// ---------------------------------------------------------------------------
// Instrumented collaborators

#[derive(Clone, Default)]
struct Plan {
    fail_step: Option<InitStep>,
    /// 1-based player update call that fails.
    fail_update_on: Option<usize>,
    /// 1-based scene render call that fails.
    fail_render_on: Option<usize>,
    failing_event: Option<InputEvent>,
    panic_on_update: bool,
}

struct MockFactory {
    journal: Journal,
    plan: Plan,
}

impl MockFactory {
    fn step(&self, step: InitStep, entry: &str) -> Result<()> {
        note(&self.journal, entry);
        if self.plan.fail_step == Some(step) {
            bail!("{entry} unavailable");
        }
        Ok(())
    }
}

struct MockPlayer {
    journal: Journal,
    plan: Plan,
    updates: usize,
}

struct MockShader {
    journal: Journal,
}

struct MockScene {
    journal: Journal,
    plan: Plan,
    renders: Cell<usize>,
}

impl Player for MockPlayer {
    fn handle_event(&mut self, event: &InputEvent) -> Result<()> {
        note(&self.journal, "handle_event");
        if self.plan.failing_event.as_ref() == Some(event) {
            bail!("cannot handle {event:?}");
        }
        Ok(())
    }

    fn update(&mut self, _time: &FrameTime) -> Result<()> {
        note(&self.journal, "player.update");
        self.updates += 1;
        if self.plan.panic_on_update {
            panic!("player exploded");
        }
        if self.plan.fail_update_on == Some(self.updates) {
            bail!("physics diverged");
        }
        Ok(())
    }

    fn camera(&self) -> Camera {
        Camera::default()
    }
}

impl ShaderProgram<()> for MockShader {
    fn update(&mut self, _gfx: &(), _camera: &Camera, _time: &FrameTime) -> Result<()> {
        note(&self.journal, "shader.update");
        Ok(())
    }
}

impl Scene<(), u32> for MockScene {
    fn update(&mut self, _gfx: &(), _time: &FrameTime) -> Result<()> {
        note(&self.journal, "scene.update");
        Ok(())
    }

    fn render(&self, _gfx: &(), _frame: &mut u32) -> Result<()> {
        note(&self.journal, "scene.render");
        self.renders.set(self.renders.get() + 1);
        if self.plan.fail_render_on == Some(self.renders.get()) {
            bail!("draw call rejected");
        }
        Ok(())
    }
}

impl SubsystemFactory<(), u32> for MockFactory {
    type Textures = ();
    type Player = MockPlayer;
    type ShaderProgram = MockShader;
    type Scene = MockScene;

    fn textures(&mut self, _gfx: &()) -> Result<()> {
        self.step(InitStep::Textures, "textures")
    }

    fn player(&mut self, _gfx: &()) -> Result<MockPlayer> {
        self.step(InitStep::Player, "player")?;
        Ok(MockPlayer {
            journal: self.journal.clone(),
            plan: self.plan.clone(),
            updates: 0,
        })
    }

    fn shader_program(
        &mut self,
        _gfx: &(),
        _textures: &(),
        _camera: &Camera,
    ) -> Result<MockShader> {
        self.step(InitStep::ShaderProgram, "shader_program")?;
        Ok(MockShader {
            journal: self.journal.clone(),
        })
    }

    fn scene(&mut self, _gfx: &(), _shader_program: &MockShader) -> Result<MockScene> {
        self.step(InitStep::Scene, "scene")?;
        Ok(MockScene {
            journal: self.journal.clone(),
            plan: self.plan.clone(),
            renders: Cell::new(0),
        })
    }
}

type Driver = EngineDriver<MockPlatform, MockFactory>;

fn start(platform: MockPlatform, plan: Plan) -> (Result<Driver>, Journal) {
    start_with(EngineConfig::default(), platform, plan)
}

fn start_with(
    config: EngineConfig,
    platform: MockPlatform,
    plan: Plan,
) -> (Result<Driver>, Journal) {
    let journal = platform.journal.clone();
    let factory = MockFactory {
        journal: journal.clone(),
        plan,
    };
    (EngineDriver::initialize(config, platform, factory), journal)
}

// ---------------------------------------------------------------------------
// Initialization

#[test]
fn initialization_runs_in_order() {
    let (driver, journal) = start(MockPlatform::default(), Plan::default());
    let driver = driver.unwrap();

    assert!(driver.is_running());
    assert_eq!(
        *journal.borrow(),
        [
            "init",
            "set_attributes",
            "create_window",
            "enable_default_state",
            "capture",
            "textures",
            "player",
            "shader_program",
            "scene",
        ]
    );
}

#[test]
fn subsystem_failure_is_contained_and_goes_straight_to_cleanup() {
    let plan = Plan {
        fail_step: Some(InitStep::Player),
        ..Plan::default()
    };
    let (driver, journal) = start(MockPlatform::default(), plan);
    let driver = driver.unwrap();

    assert!(!driver.is_running());
    assert_eq!(driver.outcome(), RunOutcome::Faulted(Phase::Init(InitStep::Player)));
    assert!(!has(&journal, "shader_program"));
    assert!(!has(&journal, "scene"));

    let outcome = driver.run().unwrap();
    assert_eq!(outcome, RunOutcome::Faulted(Phase::Init(InitStep::Player)));
    assert_eq!(outcome.exit_code(), 1);
    assert!(!has(&journal, "poll"));
    assert_eq!(count(&journal, "shutdown"), 1);
}

#[test]
fn window_failure_propagates_after_shutdown() {
    let platform = MockPlatform {
        fail_window: true,
        ..MockPlatform::default()
    };
    let (driver, journal) = start(platform, Plan::default());

    let err = driver.err().unwrap();
    assert!(format!("{err:#}").contains("failed to create window"));
    assert!(!has(&journal, "capture"));
    assert!(!has(&journal, "textures"));
    assert_eq!(count(&journal, "shutdown"), 1);
}

#[test]
fn dropping_an_unrun_driver_cleans_up_once() {
    let (driver, journal) = start(MockPlatform::default(), Plan::default());
    drop(driver);
    assert_eq!(count(&journal, "shutdown"), 1);
}

// ---------------------------------------------------------------------------
// Event processing

#[test]
fn benign_batch_keeps_running() {
    let platform = MockPlatform::with_batches(vec![vec![benign(), benign()]]);
    let (driver, journal) = start(platform, Plan::default());
    let mut driver = driver.unwrap();

    driver.process_events().unwrap();

    assert!(driver.is_running());
    assert_eq!(count(&journal, "handle_event"), 2);
}

#[test]
fn termination_mid_batch_still_drains_the_batch() {
    let platform = MockPlatform::with_batches(vec![vec![benign(), close(), benign()]]);
    let (driver, journal) = start(platform, Plan::default());
    let mut driver = driver.unwrap();

    driver.process_events().unwrap();

    assert!(!driver.is_running());
    assert_eq!(count(&journal, "handle_event"), 3);
}

#[test]
fn escape_press_terminates() {
    let platform = MockPlatform::with_batches(vec![vec![escape()]]);
    let (driver, _journal) = start(platform, Plan::default());
    let mut driver = driver.unwrap();

    driver.process_events().unwrap();
    assert!(!driver.is_running());
}

#[test]
fn empty_poll_is_not_a_termination() {
    let (driver, _journal) = start(MockPlatform::default(), Plan::default());
    let mut driver = driver.unwrap();

    driver.process_events().unwrap();
    assert!(driver.is_running());
}

// ---------------------------------------------------------------------------
// Frame loop

#[test]
fn quit_then_benign_events_finishes_the_iteration() {
    let platform = MockPlatform::with_batches(vec![vec![close(), benign(), benign()]]);
    let (driver, journal) = start(platform, Plan::default());

    let outcome = driver.unwrap().run().unwrap();

    assert_eq!(outcome, RunOutcome::Stopped);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(count(&journal, "poll"), 1);
    assert_eq!(count(&journal, "handle_event"), 3);
    assert_eq!(count(&journal, "player.update"), 1);
    assert_eq!(count(&journal, "scene.render"), 1);
    assert_eq!(count(&journal, "present"), 1);
    assert_eq!(count(&journal, "shutdown"), 1);
}

#[test]
fn update_phases_run_in_order() {
    let platform = MockPlatform::with_batches(vec![vec![close()]]);
    let (driver, journal) = start(platform, Plan::default());
    driver.unwrap().run().unwrap();

    let journal = journal.borrow();
    let at = |entry: &str| journal.iter().position(|e| e == entry).unwrap();
    assert!(at("poll") < at("player.update"));
    assert!(at("player.update") < at("shader.update"));
    assert!(at("shader.update") < at("scene.update"));
    assert!(at("scene.update") < at("begin_frame"));
    assert!(at("begin_frame") < at("scene.render"));
    assert!(at("scene.render") < at("present"));
    assert!(at("present") < at("shutdown"));
}

#[test]
fn update_fault_on_second_call_stops_after_two_iterations() {
    let plan = Plan {
        fail_update_on: Some(2),
        ..Plan::default()
    };
    let (driver, journal) = start(MockPlatform::default(), plan);
    let driver = driver.unwrap();

    let outcome = driver.run().unwrap();

    assert_eq!(outcome, RunOutcome::Faulted(Phase::Update));
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(count(&journal, "poll"), 2);
    assert_eq!(count(&journal, "player.update"), 2);
    // The failing update aborts the rest of its phase.
    assert_eq!(count(&journal, "shader.update"), 1);
    assert_eq!(count(&journal, "scene.update"), 1);
    // Render still runs in the iteration that faulted.
    assert_eq!(count(&journal, "scene.render"), 2);
    assert_eq!(count(&journal, "shutdown"), 1);
}

#[test]
fn failed_update_skips_the_title_refresh() {
    let plan = Plan {
        fail_update_on: Some(1),
        ..Plan::default()
    };
    let (driver, journal) = start(MockPlatform::default(), plan);
    driver.unwrap().run().unwrap();

    assert!(!journal.borrow().iter().any(|e| e.starts_with("title:")));
}

#[test]
fn render_fault_stops_without_presenting() {
    let plan = Plan {
        fail_render_on: Some(1),
        ..Plan::default()
    };
    let (driver, journal) = start(MockPlatform::default(), plan);

    let outcome = driver.unwrap().run().unwrap();

    assert_eq!(outcome, RunOutcome::Faulted(Phase::Render));
    assert_eq!(count(&journal, "poll"), 1);
    assert_eq!(count(&journal, "present"), 0);
    assert_eq!(count(&journal, "shutdown"), 1);
}

#[test]
fn event_fault_is_isolated_to_the_event() {
    let plan = Plan {
        failing_event: Some(benign()),
        ..Plan::default()
    };
    let platform = MockPlatform::with_batches(vec![vec![benign()], vec![close()]]);
    let (driver, journal) = start(platform, plan);
    let mut driver = driver.unwrap();

    driver.process_events().unwrap();
    assert!(driver.is_running());
    assert_eq!(driver.run_state().faults().len(), 1);
    assert_eq!(driver.run_state().faults()[0].phase, Phase::Event);

    let outcome = driver.run().unwrap();
    assert_eq!(outcome, RunOutcome::Stopped);
    assert_eq!(count(&journal, "player.update"), 1);
    assert_eq!(count(&journal, "scene.render"), 1);
}

#[test]
fn skipped_frame_is_not_a_fault() {
    let platform = MockPlatform {
        skip_frames: true,
        ..MockPlatform::with_batches(vec![vec![close()]])
    };
    let (driver, journal) = start(platform, Plan::default());

    let outcome = driver.unwrap().run().unwrap();

    assert_eq!(outcome, RunOutcome::Stopped);
    assert_eq!(count(&journal, "begin_frame"), 1);
    assert!(!has(&journal, "scene.render"));
    assert!(!has(&journal, "present"));
}

#[test]
fn poll_error_escapes_run_after_cleanup() {
    let platform = MockPlatform {
        fail_poll: true,
        ..MockPlatform::default()
    };
    let (driver, journal) = start(platform, Plan::default());

    let err = driver.unwrap().run().unwrap_err();
    assert!(format!("{err:#}").contains("event loop exited"));
    assert!(!has(&journal, "player.update"));
    assert_eq!(count(&journal, "shutdown"), 1);
}

#[test]
fn panic_in_a_collaborator_still_cleans_up_once() {
    let plan = Plan {
        panic_on_update: true,
        ..Plan::default()
    };
    let (driver, journal) = start(MockPlatform::default(), plan);
    let driver = driver.unwrap();

    let result = catch_unwind(AssertUnwindSafe(move || driver.run()));

    assert!(result.is_err());
    assert_eq!(count(&journal, "shutdown"), 1);
}

#[test]
fn title_shows_prefix_and_frame_rate() {
    let config = EngineConfig {
        title: "voxel | ".into(),
        ..EngineConfig::default()
    };
    let platform = MockPlatform::with_batches(vec![vec![close()]]);
    let (driver, journal) = start_with(config, platform, Plan::default());
    driver.unwrap().run().unwrap();

    let journal = journal.borrow();
    let title = journal.iter().find(|e| e.starts_with("title:")).unwrap();
    assert!(title.starts_with("title:voxel | FPS: "), "{title}");
}

#[test]
fn clock_ticks_once_per_successful_update() {
    let plan = Plan {
        fail_update_on: Some(3),
        ..Plan::default()
    };
    let (driver, _journal) = start(MockPlatform::default(), plan);
    let mut driver = driver.unwrap();

    driver.update().unwrap();
    driver.update().unwrap();
    let fault = driver.update().unwrap_err();

    assert_eq!(fault.phase, Phase::Update);
    assert_eq!(driver.clock().snapshot().frame_index, 2);
}

#[test]
fn fps_title_rounds() {
    assert_eq!(driver::fps_title("", 59.6), "FPS: 60");
    assert_eq!(driver::fps_title("demo ", 0.0), "demo FPS: 0");
}

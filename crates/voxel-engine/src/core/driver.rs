use std::time::Instant;

use anyhow::{Context, Result};

use crate::time::FrameClock;

use super::config::EngineConfig;
use super::fault::{Fault, InPhase, Phase};
use super::platform::Platform;
use super::run_state::RunState;
use super::subsystem::{Player, Scene, ShaderProgram, SubsystemFactory, SubsystemSet};

/// How a completed run ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RunOutcome {
    /// Stopped by the user (close request or escape).
    Stopped,
    /// Stopped by a fatal fault raised in the given phase.
    Faulted(Phase),
}

impl RunOutcome {
    pub fn exit_code(self) -> u8 {
        match self {
            RunOutcome::Stopped => 0,
            RunOutcome::Faulted(_) => 1,
        }
    }
}

/// Top-level driver: owns the platform, the frame clock, the run state and
/// the subsystem set, and runs the events → update → render cycle.
///
/// Phases report faults as values; the driver decides what they stop.
/// Cleanup runs exactly once, on every exit path (including unwinding).
pub struct EngineDriver<P, S>
where
    P: Platform,
    S: SubsystemFactory<P::Graphics, P::Frame>,
{
    config: EngineConfig,
    platform: P,
    clock: FrameClock,
    state: RunState,
    subsystems: Option<SubsystemSet<S::Textures, S::Player, S::ShaderProgram, S::Scene>>,
    cleaned_up: bool,
}

impl<P, S> EngineDriver<P, S>
where
    P: Platform,
    S: SubsystemFactory<P::Graphics, P::Frame>,
{
    /// Brings up the platform and constructs the subsystem set.
    ///
    /// Platform, window and context failures are returned as errors (the
    /// platform is shut down first). A subsystem construction failure is
    /// contained instead: it is logged, the run state is stopped, and the
    /// returned driver goes straight to cleanup when run.
    pub fn initialize(config: EngineConfig, mut platform: P, mut factory: S) -> Result<Self> {
        log::info!("initializing engine");

        let clock = match bring_up(&config, &mut platform) {
            Ok(clock) => clock,
            Err(err) => {
                platform.shutdown();
                return Err(err);
            }
        };

        let mut driver = Self {
            config,
            platform,
            clock,
            state: RunState::default(),
            subsystems: None,
            cleaned_up: false,
        };
        driver.state.start();

        let gfx = driver.platform.graphics()?;
        match SubsystemSet::build::<P::Graphics, P::Frame, S>(&mut factory, gfx) {
            Ok(set) => driver.subsystems = Some(set),
            Err(fault) => driver.contain(fault),
        }

        Ok(driver)
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn run_state(&self) -> &RunState {
        &self.state
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Outcome so far, judged from the recorded faults.
    pub fn outcome(&self) -> RunOutcome {
        self.state
            .fatal_phase()
            .map_or(RunOutcome::Stopped, RunOutcome::Faulted)
    }

    /// Runs frames until the run state stops, then cleans up.
    ///
    /// Errors escaping the loop (the platform event pump failing) are logged
    /// and returned after cleanup.
    pub fn run(mut self) -> Result<RunOutcome> {
        log::info!("starting frame loop");

        let result = self.run_loop();
        if let Err(err) = &result {
            log::error!("error during frame loop: {err:#}");
            log::debug!("{err:?}");
        }

        self.cleanup();
        result
    }

    fn run_loop(&mut self) -> Result<RunOutcome> {
        while self.state.is_running() {
            self.process_events()?;

            // A fatal fault stops the run state but the iteration's remaining
            // phases still execute.
            if let Err(fault) = self.update() {
                self.contain(fault);
            }
            if let Err(fault) = self.render() {
                self.contain(fault);
            }
        }

        Ok(self.outcome())
    }

    /// Drains the events queued at call time.
    ///
    /// Termination signals stop the run state without cutting the drain
    /// short. Every event is dispatched to the player; a handler failure is
    /// logged and isolated to that event.
    pub fn process_events(&mut self) -> Result<()> {
        let events = self
            .platform
            .poll()
            .context("failed to poll platform events")?;

        for event in &events {
            if event.is_termination() {
                log::info!("termination requested ({event:?})");
                self.state.stop();
            }

            let Some(subsystems) = self.subsystems.as_mut() else {
                continue;
            };
            if let Err(error) = subsystems.player.handle_event(event) {
                self.contain(Fault::new(Phase::Event, error));
            }
        }

        Ok(())
    }

    /// Player → shader program → scene updates, then the clock tick and the
    /// frame-rate title. A failure aborts the rest of the phase.
    pub fn update(&mut self) -> Result<(), Fault> {
        let time = self.clock.snapshot();
        let gfx = self.platform.graphics().in_phase(Phase::Update)?;
        let subsystems = self
            .subsystems
            .as_mut()
            .context("subsystems are not initialized")
            .in_phase(Phase::Update)?;

        subsystems
            .player
            .update(&time)
            .context("player update failed")
            .in_phase(Phase::Update)?;

        let camera = subsystems.player.camera();
        subsystems
            .shader_program
            .update(gfx, &camera, &time)
            .context("shader program update failed")
            .in_phase(Phase::Update)?;

        subsystems
            .scene
            .update(gfx, &time)
            .context("scene update failed")
            .in_phase(Phase::Update)?;

        self.clock.tick();
        let title = fps_title(&self.config.title, self.clock.fps());
        self.platform.set_title(&title);

        Ok(())
    }

    /// Clear → scene render → present. A skipped frame is not a fault.
    pub fn render(&mut self) -> Result<(), Fault> {
        let Some(mut frame) = self
            .platform
            .begin_frame(self.config.background)
            .context("failed to begin frame")
            .in_phase(Phase::Render)?
        else {
            log::trace!("frame skipped");
            return Ok(());
        };

        let gfx = self.platform.graphics().in_phase(Phase::Render)?;
        let subsystems = self
            .subsystems
            .as_ref()
            .context("subsystems are not initialized")
            .in_phase(Phase::Render)?;

        subsystems
            .scene
            .render(gfx, &mut frame)
            .context("scene render failed")
            .in_phase(Phase::Render)?;

        self.platform
            .present(frame)
            .context("failed to present frame")
            .in_phase(Phase::Render)
    }

    fn contain(&mut self, fault: Fault) {
        fault.report();
        self.state.record(&fault);
        if fault.phase.is_fatal() {
            self.state.stop();
        }
    }

    fn cleanup(&mut self) {
        if self.cleaned_up {
            return;
        }
        self.cleaned_up = true;

        log::info!("cleaning up");
        self.state.stop();
        // Collaborators hold GPU resources; release them before the device.
        self.subsystems = None;
        self.platform.shutdown();
    }
}

impl<P, S> Drop for EngineDriver<P, S>
where
    P: Platform,
    S: SubsystemFactory<P::Graphics, P::Frame>,
{
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Platform init → context attributes → window → render state → clock →
/// input capture.
fn bring_up<P: Platform>(config: &EngineConfig, platform: &mut P) -> Result<FrameClock> {
    let started = Instant::now();

    platform.init().context("failed to initialize platform")?;

    log::info!("setting context attributes");
    platform
        .set_attributes(&config.context)
        .context("failed to apply context attributes")?;

    log::info!("creating window");
    platform
        .create_window(&fps_title(&config.title, 0.0))
        .context("failed to create window")?;
    platform
        .enable_default_state()
        .context("failed to enable render state")?;

    let clock = FrameClock::since(started).with_max_fps(config.max_fps);

    log::info!("capturing input");
    platform.capture().context("failed to capture input")?;

    Ok(clock)
}

pub(crate) fn fps_title(prefix: &str, fps: f32) -> String {
    format!("{prefix}FPS: {}", fps.round() as u32)
}

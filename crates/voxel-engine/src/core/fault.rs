use std::fmt;

/// Subsystem construction step, in construction order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InitStep {
    Textures,
    Player,
    ShaderProgram,
    Scene,
}

impl fmt::Display for InitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InitStep::Textures => "textures",
            InitStep::Player => "player",
            InitStep::ShaderProgram => "shader program",
            InitStep::Scene => "scene",
        })
    }
}

/// Where a fault was raised.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    Init(InitStep),
    Event,
    Update,
    Render,
}

impl Phase {
    /// Event faults are isolated to the event; everything else stops the run.
    pub fn is_fatal(self) -> bool {
        !matches!(self, Phase::Event)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Init(step) => write!(f, "initialization ({step})"),
            Phase::Event => f.write_str("event handling"),
            Phase::Update => f.write_str("update"),
            Phase::Render => f.write_str("render"),
        }
    }
}

/// A failure contained by the driver, tagged with the phase it came from.
#[derive(Debug, thiserror::Error)]
#[error("error during {phase}: {error:#}")]
pub struct Fault {
    pub phase: Phase,
    pub error: anyhow::Error,
}

impl Fault {
    pub fn new(phase: Phase, error: anyhow::Error) -> Self {
        Self { phase, error }
    }

    /// Logs the fault: a one-line chain at `error`, the full report at `debug`.
    pub(crate) fn report(&self) {
        log::error!("{self}");
        log::debug!("{:?}", self.error);
    }
}

/// Tags an `anyhow::Result` with the phase it belongs to.
pub(crate) trait InPhase<T> {
    fn in_phase(self, phase: Phase) -> Result<T, Fault>;
}

impl<T> InPhase<T> for anyhow::Result<T> {
    fn in_phase(self, phase: Phase) -> Result<T, Fault> {
        self.map_err(|error| Fault::new(phase, error))
    }
}

/// Recorded form of a contained fault.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FaultRecord {
    pub phase: Phase,
    pub message: String,
}

impl From<&Fault> for FaultRecord {
    fn from(fault: &Fault) -> Self {
        Self {
            phase: fault.phase,
            message: format!("{:#}", fault.error),
        }
    }
}

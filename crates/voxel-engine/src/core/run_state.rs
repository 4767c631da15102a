use super::fault::{Fault, FaultRecord, Phase};

/// Driver lifecycle.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum Lifecycle {
    #[default]
    Idle,
    Running,
    Stopped,
}

/// Run flag plus the log of contained faults.
///
/// Invariant: once stopped, the state never returns to running.
#[derive(Debug, Default)]
pub struct RunState {
    lifecycle: Lifecycle,
    faults: Vec<FaultRecord>,
}

impl RunState {
    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// `Idle → Running`. No effect after a stop.
    pub(crate) fn start(&mut self) {
        if self.lifecycle == Lifecycle::Idle {
            self.lifecycle = Lifecycle::Running;
        }
    }

    pub fn stop(&mut self) {
        self.lifecycle = Lifecycle::Stopped;
    }

    pub(crate) fn record(&mut self, fault: &Fault) {
        self.faults.push(FaultRecord::from(fault));
    }

    /// Every contained fault, fatal or not, in the order they happened.
    pub fn faults(&self) -> &[FaultRecord] {
        &self.faults
    }

    /// Phase of the first fault that stopped the run, if any.
    pub fn fatal_phase(&self) -> Option<Phase> {
        self.faults
            .iter()
            .map(|f| f.phase)
            .find(|phase| phase.is_fatal())
    }
}

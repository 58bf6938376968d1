//! State machine for tracking one pipeline run
//!
//! Pipeline state lives in memory only; a run that dies is simply re-invoked
//! and mints fresh upload sessions, so nothing is persisted.

use chrono::{DateTime, Utc};

/// Pipeline state for a single distribution run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    SymbolUploading,
    ReleaseSessionCreating,
    BinaryUploading,
    Committing,
    GroupPublishing,
    Done,
    /// Binary upload was rejected and the session was aborted
    Aborted,
    /// A step signaled a fatal error
    Failed,
}

impl PipelineState {
    /// Terminal states absorb; no further transitions are recorded
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted | Self::Failed)
    }
}

/// One recorded state transition
#[derive(Debug, Clone, PartialEq)]
pub struct StateTransition {
    pub from: PipelineState,
    pub to: PipelineState,
    pub timestamp: DateTime<Utc>,
}

/// In-memory state machine for one pipeline run
#[derive(Debug)]
pub struct PipelineStateMachine {
    current_state: PipelineState,
    transitions: Vec<StateTransition>,
}

impl Default for PipelineStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStateMachine {
    /// Create a state machine positioned at [`PipelineState::Start`]
    pub fn new() -> Self {
        Self {
            current_state: PipelineState::Start,
            transitions: Vec::new(),
        }
    }

    /// Record a transition to a new state
    pub fn transition(&mut self, to: PipelineState) {
        debug_assert!(
            !self.current_state.is_terminal(),
            "transition out of terminal state {:?}",
            self.current_state
        );

        self.transitions.push(StateTransition {
            from: self.current_state,
            to,
            timestamp: Utc::now(),
        });
        self.current_state = to;
    }

    /// Get current state
    pub fn state(&self) -> PipelineState {
        self.current_state
    }

    /// Recorded transitions in order
    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    /// Milliseconds between the first and last recorded transition
    pub fn elapsed_ms(&self) -> i64 {
        match (self.transitions.first(), self.transitions.last()) {
            (Some(first), Some(last)) => {
                (last.timestamp - first.timestamp).num_milliseconds()
            }
            _ => 0,
        }
    }

    /// Transition history as a human-readable string
    pub fn history(&self) -> String {
        self.transitions
            .iter()
            .map(|t| format!("{}: {:?} -> {:?}", t.timestamp.to_rfc3339(), t.from, t.to))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_machine() {
        let machine = PipelineStateMachine::new();

        assert_eq!(machine.state(), PipelineState::Start);
        assert!(machine.transitions().is_empty());
        assert_eq!(machine.elapsed_ms(), 0);
    }

    #[test]
    fn test_successful_run_path() {
        let mut machine = PipelineStateMachine::new();

        machine.transition(PipelineState::ReleaseSessionCreating);
        machine.transition(PipelineState::BinaryUploading);
        machine.transition(PipelineState::Committing);
        machine.transition(PipelineState::GroupPublishing);
        machine.transition(PipelineState::Done);

        assert_eq!(machine.state(), PipelineState::Done);
        assert!(machine.state().is_terminal());
        assert_eq!(machine.transitions().len(), 5);
    }

    #[test]
    fn test_aborted_run_path() {
        let mut machine = PipelineStateMachine::new();

        machine.transition(PipelineState::ReleaseSessionCreating);
        machine.transition(PipelineState::BinaryUploading);
        machine.transition(PipelineState::Committing);
        machine.transition(PipelineState::Aborted);

        assert_eq!(machine.state(), PipelineState::Aborted);
        assert!(machine.state().is_terminal());
    }

    #[test]
    fn test_terminal_states() {
        assert!(PipelineState::Done.is_terminal());
        assert!(PipelineState::Aborted.is_terminal());
        assert!(PipelineState::Failed.is_terminal());
        assert!(!PipelineState::Start.is_terminal());
        assert!(!PipelineState::Committing.is_terminal());
    }

    #[test]
    fn test_history_is_ordered() {
        let mut machine = PipelineStateMachine::new();

        machine.transition(PipelineState::SymbolUploading);
        machine.transition(PipelineState::ReleaseSessionCreating);

        let history = machine.history();
        assert!(history.contains("Start -> SymbolUploading"));
        assert!(history.contains("SymbolUploading -> ReleaseSessionCreating"));
    }
}

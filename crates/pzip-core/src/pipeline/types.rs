use serde::{Deserialize, Serialize};

use crate::format::RunFormat;

/// Knobs for a compression run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineOptions {
    /// Wire format of every emitted run.
    pub format: RunFormat,
    /// Worker threads are named `{prefix}-{file index}`.
    pub thread_name_prefix: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            format: RunFormat::Binary,
            thread_name_prefix: "pzip-worker".to_string(),
        }
    }
}

impl PipelineOptions {
    pub fn with_format(format: RunFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }
}

/// Lifecycle of one coordinator run.
///
/// `Init → Launching → Running → Joining → Done | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorState {
    Init,
    Launching,
    Running,
    Joining,
    Done,
    Failed,
}

impl CoordinatorState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Init, Self::Launching)
                | (Self::Init, Self::Failed)
                | (Self::Launching, Self::Running)
                | (Self::Running, Self::Joining)
                | (Self::Joining, Self::Done)
                | (Self::Joining, Self::Failed)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Launching => "launching",
            Self::Running => "running",
            Self::Joining => "joining",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions_are_legal() {
        let path = [
            CoordinatorState::Init,
            CoordinatorState::Launching,
            CoordinatorState::Running,
            CoordinatorState::Joining,
            CoordinatorState::Done,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_advance_to(pair[1]), "{pair:?}");
        }
        assert!(CoordinatorState::Joining.can_advance_to(CoordinatorState::Failed));
    }

    #[test]
    fn terminal_states_do_not_advance() {
        for state in [CoordinatorState::Done, CoordinatorState::Failed] {
            assert!(state.is_terminal());
            assert!(!state.can_advance_to(CoordinatorState::Init));
            assert!(!state.can_advance_to(CoordinatorState::Launching));
        }
        assert!(!CoordinatorState::Running.can_advance_to(CoordinatorState::Done));
        assert!(!CoordinatorState::Running.is_terminal());
    }

    #[test]
    fn default_options_use_binary_format() {
        let options = PipelineOptions::default();
        assert_eq!(options.format, RunFormat::Binary);
        assert_eq!(options.thread_name_prefix, "pzip-worker");
        assert_eq!(
            PipelineOptions::with_format(RunFormat::Text).format,
            RunFormat::Text
        );
    }
}

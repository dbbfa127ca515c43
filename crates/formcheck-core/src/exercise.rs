//! Exercise phases, feedback records and the persistent engine state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Stage of a repetitive exercise movement cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExercisePhase {
    #[default]
    Preparation,
    Starting,
    Lowering,
    Bottom,
    Raising,
    Top,
    Finished,
}

impl ExercisePhase {
    pub fn name(&self) -> &'static str {
        match self {
            ExercisePhase::Preparation => "preparation",
            ExercisePhase::Starting => "starting",
            ExercisePhase::Lowering => "lowering",
            ExercisePhase::Bottom => "bottom",
            ExercisePhase::Raising => "raising",
            ExercisePhase::Top => "top",
            ExercisePhase::Finished => "finished",
        }
    }
}

impl fmt::Display for ExercisePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Correct,
    Warning,
    Error,
}

/// The check that produced a feedback item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCheck {
    TorsoAngle,
    KneeAngle,
    StanceWidth,
    BackAlignment,
    ElbowTuck,
    WristAlignment,
    RangeOfMotion,
    Phase,
}

/// A single user-facing feedback message. Higher `priority` is more urgent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub kind: FeedbackKind,
    pub check: FeedbackCheck,
    pub message: String,
    pub priority: u8,
    pub timestamp: Timestamp,
}

impl FeedbackItem {
    pub fn new(
        kind: FeedbackKind,
        check: FeedbackCheck,
        message: impl Into<String>,
        priority: u8,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            kind,
            check,
            message: message.into(),
            priority,
            timestamp,
        }
    }

    pub fn correct(check: FeedbackCheck, message: impl Into<String>, priority: u8, at: Timestamp) -> Self {
        Self::new(FeedbackKind::Correct, check, message, priority, at)
    }

    pub fn warning(check: FeedbackCheck, message: impl Into<String>, priority: u8, at: Timestamp) -> Self {
        Self::new(FeedbackKind::Warning, check, message, priority, at)
    }

    pub fn error(check: FeedbackCheck, message: impl Into<String>, priority: u8, at: Timestamp) -> Self {
        Self::new(FeedbackKind::Error, check, message, priority, at)
    }

    pub fn is_correction(&self) -> bool {
        self.kind != FeedbackKind::Correct
    }
}

/// Mutable state owned by the phase state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub current_phase: ExercisePhase,
    pub last_phase: ExercisePhase,
    /// Time of the last committed transition (or of construction/reset)
    pub phase_start_time: Timestamp,
    pub rep_count: u32,
    pub frame_counter: u64,
    pub is_active: bool,
}

impl EngineState {
    pub fn new(now: Timestamp) -> Self {
        Self {
            current_phase: ExercisePhase::Preparation,
            last_phase: ExercisePhase::Preparation,
            phase_start_time: now,
            rep_count: 0,
            frame_counter: 0,
            is_active: false,
        }
    }
}

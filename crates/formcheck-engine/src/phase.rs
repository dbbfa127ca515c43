//! Exercise phase classification with debounced transitions and rep counting.
//!
//! ## Classification
//!
//! The phase is read from wrist height relative to the shoulders:
//!
//! - wrists well above the shoulders → `Top`
//! - wrists far below the shoulders → `Bottom`
//! - anywhere in between, the phase continues from the current one
//!   (`Bottom`/`Lowering` → `Raising`, everything else → `Lowering`)
//!
//! A candidate phase is only committed once the current phase has been held
//! for longer than the minimum dwell time. A rep is counted on every
//! committed `Raising → Top` transition.

use formcheck_core::{
    torso_angle, EngineState, ExercisePhase, FeedbackCheck, FeedbackItem, Landmark,
    LandmarkFrame, Point2D, Timestamp,
};
use serde::{Deserialize, Serialize};

use crate::posture::{TORSO_MAX, TORSO_MIN};

/// Wrist height (wrist.y - shoulder.y) below which the arms are at the top
pub const TOP_WRIST_HEIGHT: f64 = -0.1;
/// Wrist height above which the arms are at the bottom
pub const BOTTOM_WRIST_HEIGHT: f64 = 0.8;

/// Landmarks that must all be present to classify a frame
pub const PHASE_LANDMARKS: [Landmark; 8] = [
    Landmark::LeftShoulder,
    Landmark::RightShoulder,
    Landmark::LeftHip,
    Landmark::RightHip,
    Landmark::LeftWrist,
    Landmark::RightWrist,
    Landmark::LeftAnkle,
    Landmark::RightAnkle,
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GuardFailure {
    MissingLandmarks,
    /// Torso lean outside the working range, in degrees
    TorsoOutOfRange(f64),
}

/// A committed phase change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub from: ExercisePhase,
    pub to: ExercisePhase,
    pub at: Timestamp,
    pub rep_completed: bool,
    pub feedback: Option<FeedbackItem>,
}

/// Outcome of feeding one frame to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseStep {
    /// The session was explicitly finished; frames are ignored until reset
    Suspended,
    GuardFailed(GuardFailure),
    /// Candidate matches the current phase
    Steady(ExercisePhase),
    /// Candidate differs but the dwell time has not yet elapsed
    Debounced {
        candidate: ExercisePhase,
        elapsed_nanos: i64,
    },
    Committed(PhaseTransition),
}

impl PhaseStep {
    pub fn transition(&self) -> Option<&PhaseTransition> {
        match self {
            PhaseStep::Committed(t) => Some(t),
            _ => None,
        }
    }
}

/// Debounced phase tracker. Owns the engine's persistent state.
#[derive(Debug, Clone)]
pub struct PhaseStateMachine {
    state: EngineState,
    min_dwell_nanos: i64,
}

impl PhaseStateMachine {
    pub fn new(min_dwell_nanos: i64, now: Timestamp) -> Self {
        Self {
            state: EngineState::new(now),
            min_dwell_nanos,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn phase(&self) -> ExercisePhase {
        self.state.current_phase
    }

    pub fn rep_count(&self) -> u32 {
        self.state.rep_count
    }

    /// Feed one frame observed at `now`
    pub fn step(&mut self, frame: &LandmarkFrame, now: Timestamp) -> PhaseStep {
        self.state.frame_counter += 1;

        if self.state.current_phase == ExercisePhase::Finished {
            return PhaseStep::Suspended;
        }

        let wrist_height = match classification_input(frame) {
            Ok(height) => height,
            Err(failure) => {
                tracing::debug!(?failure, phase = %self.state.current_phase, "phase guard failed");
                return PhaseStep::GuardFailed(failure);
            }
        };

        let candidate = self.candidate_phase(wrist_height);
        if candidate == self.state.current_phase {
            return PhaseStep::Steady(candidate);
        }

        let elapsed_nanos = now.nanos_since(self.state.phase_start_time);
        if elapsed_nanos <= self.min_dwell_nanos {
            tracing::trace!(%candidate, elapsed_nanos, "transition debounced");
            return PhaseStep::Debounced {
                candidate,
                elapsed_nanos,
            };
        }

        PhaseStep::Committed(self.commit(candidate, now))
    }

    /// Explicitly end the session. No debounce applies.
    pub fn finish(&mut self, now: Timestamp) -> Option<PhaseTransition> {
        if self.state.current_phase == ExercisePhase::Finished {
            return None;
        }
        Some(self.commit(ExercisePhase::Finished, now))
    }

    /// Restore construction-time state
    pub fn reset(&mut self, now: Timestamp) {
        self.state = EngineState::new(now);
    }

    fn candidate_phase(&self, wrist_height: f64) -> ExercisePhase {
        use ExercisePhase::*;

        if wrist_height < TOP_WRIST_HEIGHT {
            Top
        } else if wrist_height > BOTTOM_WRIST_HEIGHT {
            Bottom
        } else {
            match self.state.current_phase {
                Bottom | Lowering => Raising,
                _ => Lowering,
            }
        }
    }

    fn commit(&mut self, to: ExercisePhase, now: Timestamp) -> PhaseTransition {
        use ExercisePhase::*;

        let from = self.state.current_phase;
        self.state.last_phase = from;
        self.state.current_phase = to;
        self.state.phase_start_time = now;

        tracing::debug!(%from, %to, "phase transition committed");

        let mut rep_completed = false;
        let feedback = match (from, to) {
            (Raising, Top) => {
                self.state.rep_count += 1;
                self.state.is_active = true;
                rep_completed = true;
                tracing::info!(reps = self.state.rep_count, "rep counted");
                Some(FeedbackItem::correct(FeedbackCheck::Phase, "Rep completed!", 1, now))
            }
            (Lowering, Bottom) => Some(FeedbackItem::correct(
                FeedbackCheck::Phase,
                "Fully lowered, now raise",
                2,
                now,
            )),
            (_, Top) => Some(FeedbackItem::correct(FeedbackCheck::Phase, "Raised, now lower", 2, now)),
            _ => None,
        };

        PhaseTransition {
            from,
            to,
            at: now,
            rep_completed,
            feedback,
        }
    }
}

/// Mean `wrist.y - shoulder.y` over both sides, provided the frame passes the
/// classification guard.
fn classification_input(frame: &LandmarkFrame) -> Result<f64, GuardFailure> {
    let [ls, rs, lh, rh, lw, rw, _, _] = frame
        .require(PHASE_LANDMARKS)
        .ok_or(GuardFailure::MissingLandmarks)?;

    let torso = torso_angle(&ls, &rs, &lh, &rh);
    if !torso_in_working_range(torso) {
        return Err(GuardFailure::TorsoOutOfRange(torso));
    }

    Ok(wrist_height(&ls, &lw, &rs, &rw))
}

/// Whether a torso lean (degrees) allows phase classification. Both limits are inclusive.
pub fn torso_in_working_range(angle: f64) -> bool {
    (TORSO_MIN..=TORSO_MAX).contains(&angle)
}

fn wrist_height(ls: &Point2D, lw: &Point2D, rs: &Point2D, rw: &Point2D) -> f64 {
    ((lw.y - ls.y) + (rw.y - rs.y)) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcheck_core::FeedbackKind;

    const DWELL: i64 = 300_000_000;

    fn at(secs: f64) -> Timestamp {
        Timestamp::from_secs_f64(secs)
    }

    /// Hinged torso (45 degrees) with wrists placed `height` below the shoulders
    fn frame(height: f64) -> LandmarkFrame {
        LandmarkFrame::new()
            .with(Landmark::LeftShoulder, 0.2, 0.1)
            .with(Landmark::RightShoulder, 0.4, 0.1)
            .with(Landmark::LeftHip, 0.5, 0.4)
            .with(Landmark::RightHip, 0.7, 0.4)
            .with(Landmark::LeftWrist, 0.2, 0.1 + height)
            .with(Landmark::RightWrist, 0.4, 0.1 + height)
            .with(Landmark::LeftAnkle, 0.45, 0.95)
            .with(Landmark::RightAnkle, 0.75, 0.95)
    }

    fn machine() -> PhaseStateMachine {
        PhaseStateMachine::new(DWELL, at(0.0))
    }

    #[test]
    fn test_full_cycle_counts_one_rep() {
        let mut m = machine();

        assert!(m.step(&frame(0.5), at(0.5)).transition().is_some());
        assert_eq!(m.phase(), ExercisePhase::Lowering);

        let t = m.step(&frame(0.9), at(1.0)).transition().cloned().unwrap();
        assert_eq!(m.phase(), ExercisePhase::Bottom);
        assert_eq!(t.feedback.unwrap().message, "Fully lowered, now raise");

        m.step(&frame(0.5), at(1.5));
        assert_eq!(m.phase(), ExercisePhase::Raising);

        let t = m.step(&frame(-0.2), at(2.0)).transition().cloned().unwrap();
        assert_eq!(m.phase(), ExercisePhase::Top);
        assert!(t.rep_completed);
        let item = t.feedback.unwrap();
        assert_eq!(item.kind, FeedbackKind::Correct);
        assert_eq!(item.priority, 1);
        assert_eq!(m.rep_count(), 1);
        assert!(m.state().is_active);
        assert_eq!(m.state().last_phase, ExercisePhase::Raising);

        // Top continues into lowering
        m.step(&frame(0.5), at(2.5));
        assert_eq!(m.phase(), ExercisePhase::Lowering);
        assert_eq!(m.rep_count(), 1);
    }

    #[test]
    fn test_top_without_raising_is_not_a_rep() {
        let mut m = machine();
        let t = m.step(&frame(-0.2), at(0.5)).transition().cloned().unwrap();
        assert_eq!(t.from, ExercisePhase::Preparation);
        assert_eq!(t.to, ExercisePhase::Top);
        assert!(!t.rep_completed);
        assert_eq!(t.feedback.unwrap().message, "Raised, now lower");
        assert_eq!(m.rep_count(), 0);
    }

    #[test]
    fn test_debounce_holds_until_dwell_exceeded() {
        let mut m = machine();

        for i in 1..=3 {
            let step = m.step(&frame(-0.2), at(i as f64 * 0.1));
            assert!(matches!(step, PhaseStep::Debounced { .. }), "frame {i}: {step:?}");
        }
        assert_eq!(m.phase(), ExercisePhase::Preparation);

        assert!(m.step(&frame(-0.2), at(0.4)).transition().is_some());
        assert_eq!(m.phase(), ExercisePhase::Top);

        assert_eq!(m.step(&frame(-0.2), at(0.5)), PhaseStep::Steady(ExercisePhase::Top));
    }

    #[test]
    fn test_exact_dwell_does_not_commit() {
        let mut m = PhaseStateMachine::new(DWELL, Timestamp::from_nanos(0));
        let step = m.step(&frame(-0.2), Timestamp::from_nanos(DWELL));
        assert!(matches!(step, PhaseStep::Debounced { .. }));
        let step = m.step(&frame(-0.2), Timestamp::from_nanos(DWELL + 1));
        assert!(step.transition().is_some());
    }

    #[test]
    fn test_guard_failures_freeze_state() {
        let mut m = machine();

        let missing = frame(-0.2).without(Landmark::LeftAnkle);
        assert_eq!(
            m.step(&missing, at(1.0)),
            PhaseStep::GuardFailed(GuardFailure::MissingLandmarks)
        );

        let upright = frame(-0.2)
            .with(Landmark::LeftHip, 0.2, 0.4)
            .with(Landmark::RightHip, 0.4, 0.4);
        assert!(matches!(
            m.step(&upright, at(1.0)),
            PhaseStep::GuardFailed(GuardFailure::TorsoOutOfRange(_))
        ));

        assert_eq!(m.phase(), ExercisePhase::Preparation);
        assert_eq!(m.state().frame_counter, 2);
    }

    #[test]
    fn test_torso_range_limits_pass_guard() {
        assert!(torso_in_working_range(TORSO_MIN));
        assert!(torso_in_working_range(TORSO_MAX));
        assert!(!torso_in_working_range(29.999));
        assert!(!torso_in_working_range(80.001));
    }

    #[test]
    fn test_finish_and_reset() {
        let mut m = machine();
        m.step(&frame(0.5), at(0.5));

        let t = m.finish(at(0.6)).unwrap();
        assert_eq!(t.from, ExercisePhase::Lowering);
        assert_eq!(m.phase(), ExercisePhase::Finished);
        assert!(m.finish(at(0.7)).is_none());
        assert_eq!(m.step(&frame(-0.2), at(2.0)), PhaseStep::Suspended);

        m.reset(at(3.0));
        assert_eq!(*m.state(), EngineState::new(at(3.0)));
    }
}

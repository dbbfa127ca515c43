//! Dynamic limb checks: elbow tuck, wrist alignment and range of motion.

use formcheck_core::{
    angle_at, distance, mean, ExercisePhase, FeedbackCheck, FeedbackItem, Landmark,
    LandmarkFrame, Point2D, Timestamp,
};

use Landmark::*;

pub const ELBOW_FLARED: f64 = 0.25;
pub const ELBOW_TUCKED: f64 = 0.15;

/// Offset of the synthetic point placed below each wrist
pub const WRIST_PLUMB_OFFSET: f64 = 0.1;
pub const MAX_WRIST_DEVIATION: f64 = 45.0;

pub const RAISING_MAX_ELBOW: f64 = 160.0;
pub const TOP_ELBOW_RANGE: (f64, f64) = (70.0, 140.0);
pub const BOTTOM_MAX_ELBOW: f64 = 100.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct MovementAnalyzer;

impl MovementAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(
        &self,
        frame: &LandmarkFrame,
        phase: ExercisePhase,
        at: Timestamp,
    ) -> Vec<FeedbackItem> {
        [
            self.check_elbow_tuck(frame, at),
            self.check_wrist_alignment(frame, at),
            self.check_range_of_motion(frame, phase, at),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn check_elbow_tuck(&self, frame: &LandmarkFrame, at: Timestamp) -> Option<FeedbackItem> {
        let [le, ls, re, rs] = frame.require([LeftElbow, LeftShoulder, RightElbow, RightShoulder])?;
        let spread = mean(&[distance(&le, &ls), distance(&re, &rs)])?;

        if spread > ELBOW_FLARED {
            Some(FeedbackItem::warning(FeedbackCheck::ElbowTuck, "Bring your elbows closer", 4, at))
        } else if spread < ELBOW_TUCKED {
            Some(FeedbackItem::correct(FeedbackCheck::ElbowTuck, "Good elbow control", 1, at))
        } else {
            None
        }
    }

    pub fn check_wrist_alignment(&self, frame: &LandmarkFrame, at: Timestamp) -> Option<FeedbackItem> {
        let [le, lw, re, rw] = frame.require([LeftElbow, LeftWrist, RightElbow, RightWrist])?;
        let left = wrist_deviation(&le, &lw)?;
        let right = wrist_deviation(&re, &rw)?;

        if left.max(right) > MAX_WRIST_DEVIATION {
            Some(FeedbackItem::warning(FeedbackCheck::WristAlignment, "Keep your wrists neutral", 2, at))
        } else {
            None
        }
    }

    /// Elbow angle interpreted against the phase the lift is in
    pub fn check_range_of_motion(
        &self,
        frame: &LandmarkFrame,
        phase: ExercisePhase,
        at: Timestamp,
    ) -> Option<FeedbackItem> {
        let [ls, le, lw, rs, re, rw] =
            frame.require([LeftShoulder, LeftElbow, LeftWrist, RightShoulder, RightElbow, RightWrist])?;
        let elbow = mean(&[angle_at(&ls, &le, &lw)?, angle_at(&rs, &re, &rw)?])?;

        match phase {
            ExercisePhase::Raising if elbow > RAISING_MAX_ELBOW => Some(FeedbackItem::warning(
                FeedbackCheck::RangeOfMotion,
                "Keep elbows close while raising",
                5,
                at,
            )),
            ExercisePhase::Top if (TOP_ELBOW_RANGE.0..=TOP_ELBOW_RANGE.1).contains(&elbow) => {
                Some(FeedbackItem::correct(FeedbackCheck::RangeOfMotion, "Good range at the top", 2, at))
            }
            ExercisePhase::Bottom if elbow < BOTTOM_MAX_ELBOW => Some(FeedbackItem::correct(
                FeedbackCheck::RangeOfMotion,
                "Good depth at the bottom",
                2,
                at,
            )),
            _ => None,
        }
    }
}

/// How far the forearm bends away from a plumb line through the wrist
fn wrist_deviation(elbow: &Point2D, wrist: &Point2D) -> Option<f64> {
    let plumb = wrist.offset(0.0, WRIST_PLUMB_OFFSET);
    angle_at(elbow, wrist, &plumb).map(|angle| 180.0 - angle)
}

//! Static body alignment checks.
//!
//! Each check needs a specific subset of landmarks and silently emits
//! nothing when any of them is missing. Values between the listed bands
//! are neutral and produce no feedback.

use formcheck_core::{
    angle_at, distance, mean, slope, torso_angle, FeedbackCheck, FeedbackItem, Landmark,
    LandmarkFrame, Timestamp,
};

use Landmark::*;

/// Torso lean below this is too upright (degrees from vertical)
pub const TORSO_MIN: f64 = 30.0;
/// Torso lean above this is overbent
pub const TORSO_MAX: f64 = 80.0;
/// Ideal torso lean band
pub const TORSO_IDEAL: (f64, f64) = (35.0, 70.0);

pub const KNEE_LOCKED: f64 = 175.0;
pub const KNEE_IDEAL_MIN: f64 = 140.0;
pub const KNEE_TOO_DEEP: f64 = 120.0;

pub const STANCE_MIN_RATIO: f64 = 0.5;
pub const STANCE_MAX_RATIO: f64 = 2.0;

pub const MAX_SLOPE_DIFFERENCE: f64 = 0.6;

/// Per-frame posture checks: torso lean, knee flexion, stance width and
/// shoulder/hip balance.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostureAnalyzer;

impl PostureAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Run every posture check against one frame
    pub fn analyze(&self, frame: &LandmarkFrame, at: Timestamp) -> Vec<FeedbackItem> {
        [
            self.check_torso(frame, at),
            self.check_knees(frame, at),
            self.check_stance(frame, at),
            self.check_back_alignment(frame, at),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    pub fn check_torso(&self, frame: &LandmarkFrame, at: Timestamp) -> Option<FeedbackItem> {
        let [ls, rs, lh, rh] = frame.require([LeftShoulder, RightShoulder, LeftHip, RightHip])?;
        torso_feedback(torso_angle(&ls, &rs, &lh, &rh), at)
    }

    pub fn check_knees(&self, frame: &LandmarkFrame, at: Timestamp) -> Option<FeedbackItem> {
        let [lh, lk, la, rh, rk, ra] =
            frame.require([LeftHip, LeftKnee, LeftAnkle, RightHip, RightKnee, RightAnkle])?;
        let left = angle_at(&lh, &lk, &la)?;
        let right = angle_at(&rh, &rk, &ra)?;
        let knee = mean(&[left, right])?;

        if knee > KNEE_LOCKED {
            Some(FeedbackItem::warning(FeedbackCheck::KneeAngle, "Bend your knees slightly", 3, at))
        } else if knee >= KNEE_IDEAL_MIN {
            Some(FeedbackItem::correct(FeedbackCheck::KneeAngle, "Good knee bend", 1, at))
        } else if knee < KNEE_TOO_DEEP {
            Some(FeedbackItem::warning(FeedbackCheck::KneeAngle, "Don't squat too much", 5, at))
        } else {
            None
        }
    }

    pub fn check_stance(&self, frame: &LandmarkFrame, at: Timestamp) -> Option<FeedbackItem> {
        let [la, ra, ls, rs] = frame.require([LeftAnkle, RightAnkle, LeftShoulder, RightShoulder])?;
        let shoulder_width = distance(&ls, &rs);
        if shoulder_width <= f64::EPSILON {
            return None;
        }
        let ratio = distance(&la, &ra) / shoulder_width;

        Some(if ratio < STANCE_MIN_RATIO {
            FeedbackItem::warning(FeedbackCheck::StanceWidth, "Widen your stance", 3, at)
        } else if ratio > STANCE_MAX_RATIO {
            FeedbackItem::warning(FeedbackCheck::StanceWidth, "Narrow your stance", 3, at)
        } else {
            FeedbackItem::correct(FeedbackCheck::StanceWidth, "Good stance", 1, at)
        })
    }

    pub fn check_back_alignment(&self, frame: &LandmarkFrame, at: Timestamp) -> Option<FeedbackItem> {
        let [ls, rs, lh, rh] = frame.require([LeftShoulder, RightShoulder, LeftHip, RightHip])?;
        let difference = (slope(&ls, &rs)? - slope(&lh, &rh)?).abs();

        Some(if difference > MAX_SLOPE_DIFFERENCE {
            FeedbackItem::warning(FeedbackCheck::BackAlignment, "Maintain balanced posture", 4, at)
        } else {
            FeedbackItem::correct(FeedbackCheck::BackAlignment, "Balanced posture", 1, at)
        })
    }
}

/// Feedback for a torso lean in degrees. `[30, 35)` and `(70, 80]` are neutral.
pub fn torso_feedback(angle: f64, at: Timestamp) -> Option<FeedbackItem> {
    if angle < TORSO_MIN {
        Some(FeedbackItem::error(FeedbackCheck::TorsoAngle, "Bend forward more", 6, at))
    } else if angle > TORSO_MAX {
        Some(FeedbackItem::warning(FeedbackCheck::TorsoAngle, "Don't overbend", 7, at))
    } else if (TORSO_IDEAL.0..=TORSO_IDEAL.1).contains(&angle) {
        Some(FeedbackItem::correct(FeedbackCheck::TorsoAngle, "Perfect position", 1, at))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcheck_core::FeedbackKind;

    const T: Timestamp = Timestamp(0);

    /// Torso leaning 45 degrees, soft knees, shoulder-and-a-half stance
    fn hinge_frame() -> LandmarkFrame {
        LandmarkFrame::new()
            .with(LeftShoulder, 0.2, 0.3)
            .with(RightShoulder, 0.4, 0.3)
            .with(LeftHip, 0.5, 0.6)
            .with(RightHip, 0.7, 0.6)
            .with(LeftKnee, 0.5, 0.75)
            .with(RightKnee, 0.7, 0.75)
            .with(LeftAnkle, 0.45, 0.9)
            .with(RightAnkle, 0.75, 0.9)
    }

    #[test]
    fn test_torso_ideal_lean() {
        let item = PostureAnalyzer.check_torso(&hinge_frame(), T).unwrap();
        assert_eq!(item.kind, FeedbackKind::Correct);
        assert_eq!(item.priority, 1);
        assert_eq!(item.message, "Perfect position");
    }

    #[test]
    fn test_torso_too_upright() {
        let frame = LandmarkFrame::new()
            .with(LeftShoulder, 0.4, 0.3)
            .with(RightShoulder, 0.6, 0.3)
            .with(LeftHip, 0.45, 0.6)
            .with(RightHip, 0.55, 0.6);
        let item = PostureAnalyzer.check_torso(&frame, T).unwrap();
        assert_eq!(item.kind, FeedbackKind::Error);
        assert_eq!(item.priority, 6);
        assert_eq!(item.message, "Bend forward more");
    }

    #[test]
    fn test_torso_overbent() {
        // Nearly horizontal torso
        let frame = LandmarkFrame::new()
            .with(LeftShoulder, 0.1, 0.50)
            .with(RightShoulder, 0.1, 0.52)
            .with(LeftHip, 0.6, 0.55)
            .with(RightHip, 0.6, 0.57);
        let item = PostureAnalyzer.check_torso(&frame, T).unwrap();
        assert_eq!(item.kind, FeedbackKind::Warning);
        assert_eq!(item.priority, 7);
    }

    #[test]
    fn test_torso_neutral_band() {
        // atan(0.3 / 0.45) is about 33.7 degrees
        let frame = LandmarkFrame::new()
            .with(LeftShoulder, 0.2, 0.15)
            .with(RightShoulder, 0.4, 0.15)
            .with(LeftHip, 0.5, 0.6)
            .with(RightHip, 0.7, 0.6);
        assert!(PostureAnalyzer.check_torso(&frame, T).is_none());
    }

    #[test]
    fn test_torso_upper_neutral_band() {
        // atan(0.5 / 0.1) is about 78.7 degrees
        let frame = LandmarkFrame::new()
            .with(LeftShoulder, 0.1, 0.5)
            .with(RightShoulder, 0.2, 0.5)
            .with(LeftHip, 0.6, 0.6)
            .with(RightHip, 0.7, 0.6);
        assert!(PostureAnalyzer.check_torso(&frame, T).is_none());
    }

    #[test]
    fn test_torso_range_limits_are_neutral() {
        assert!(torso_feedback(TORSO_MIN, T).is_none());
        assert!(torso_feedback(TORSO_MAX, T).is_none());
        assert_eq!(torso_feedback(TORSO_IDEAL.0, T).unwrap().priority, 1);
        assert_eq!(torso_feedback(TORSO_IDEAL.1, T).unwrap().priority, 1);
        assert_eq!(torso_feedback(29.999, T).unwrap().message, "Bend forward more");
        assert_eq!(torso_feedback(80.001, T).unwrap().message, "Don't overbend");
    }

    #[test]
    fn test_knees() {
        let item = PostureAnalyzer.check_knees(&hinge_frame(), T).unwrap();
        assert_eq!(item.kind, FeedbackKind::Correct);

        let locked = hinge_frame()
            .with(LeftAnkle, 0.5, 0.9)
            .with(RightAnkle, 0.7, 0.9);
        let item = PostureAnalyzer.check_knees(&locked, T).unwrap();
        assert_eq!(item.message, "Bend your knees slightly");
        assert_eq!(item.priority, 3);

        // Ankles folded back up toward the hips
        let deep = hinge_frame()
            .with(LeftAnkle, 0.6, 0.65)
            .with(RightAnkle, 0.8, 0.65);
        let item = PostureAnalyzer.check_knees(&deep, T).unwrap();
        assert_eq!(item.message, "Don't squat too much");
        assert_eq!(item.priority, 5);
    }

    #[test]
    fn test_knee_neutral_band() {
        // Shins swung forward to about 130 degrees at each knee
        let bent = hinge_frame()
            .with(LeftAnkle, 0.6149, 0.8464)
            .with(RightAnkle, 0.8149, 0.8464);
        assert!(PostureAnalyzer.check_knees(&bent, T).is_none());
    }

    #[test]
    fn test_stance() {
        let item = PostureAnalyzer.check_stance(&hinge_frame(), T).unwrap();
        assert_eq!(item.message, "Good stance");

        let narrow = hinge_frame()
            .with(LeftAnkle, 0.58, 0.9)
            .with(RightAnkle, 0.62, 0.9);
        assert_eq!(
            PostureAnalyzer.check_stance(&narrow, T).unwrap().message,
            "Widen your stance"
        );

        let wide = hinge_frame()
            .with(LeftAnkle, 0.2, 0.9)
            .with(RightAnkle, 0.9, 0.9);
        assert_eq!(
            PostureAnalyzer.check_stance(&wide, T).unwrap().message,
            "Narrow your stance"
        );
    }

    #[test]
    fn test_back_alignment() {
        let item = PostureAnalyzer.check_back_alignment(&hinge_frame(), T).unwrap();
        assert_eq!(item.kind, FeedbackKind::Correct);

        // Shoulders tilted with slope 1.0 while hips stay level
        let tilted = hinge_frame().with(RightShoulder, 0.4, 0.5);
        let item = PostureAnalyzer.check_back_alignment(&tilted, T).unwrap();
        assert_eq!(item.message, "Maintain balanced posture");
        assert_eq!(item.priority, 4);
    }

    #[test]
    fn test_coincident_shoulders_skip_stance_and_back() {
        let frame = hinge_frame()
            .with(LeftShoulder, 0.3, 0.3)
            .with(RightShoulder, 0.3, 0.3);
        assert!(PostureAnalyzer.check_stance(&frame, T).is_none());
        assert!(PostureAnalyzer.check_back_alignment(&frame, T).is_none());
    }

    #[test]
    fn test_vertical_shoulder_pair_skips_back_alignment() {
        let frame = hinge_frame()
            .with(LeftShoulder, 0.3, 0.2)
            .with(RightShoulder, 0.3, 0.4);
        assert!(PostureAnalyzer.check_back_alignment(&frame, T).is_none());
        // Stance still has a usable shoulder width
        assert!(PostureAnalyzer.check_stance(&frame, T).is_some());
    }

    #[test]
    fn test_missing_landmarks_emit_nothing() {
        let frame = hinge_frame().without(RightHip);
        let items = PostureAnalyzer.analyze(&frame, T);
        // Only the stance check survives without hips
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].check, FeedbackCheck::StanceWidth);

        assert!(PostureAnalyzer.analyze(&LandmarkFrame::new(), T).is_empty());
    }
}

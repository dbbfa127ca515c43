//! Fundamental types for the FormCheck engine.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Timestamp wrapper with nanosecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_nanos_opt().unwrap_or(0))
    }

    pub fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs * 1_000_000_000.0).round() as i64)
    }

    pub fn as_nanos(&self) -> i64 {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }

    /// Nanoseconds elapsed since `earlier` (negative if `earlier` is later)
    pub fn nanos_since(&self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// The 13 body points tracked per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Landmark {
    Nose = 0,
    LeftShoulder = 1,
    RightShoulder = 2,
    LeftElbow = 3,
    RightElbow = 4,
    LeftWrist = 5,
    RightWrist = 6,
    LeftHip = 7,
    RightHip = 8,
    LeftKnee = 9,
    RightKnee = 10,
    LeftAnkle = 11,
    RightAnkle = 12,
}

impl Landmark {
    pub const COUNT: usize = 13;

    pub const ALL: [Landmark; Landmark::COUNT] = [
        Landmark::Nose,
        Landmark::LeftShoulder,
        Landmark::RightShoulder,
        Landmark::LeftElbow,
        Landmark::RightElbow,
        Landmark::LeftWrist,
        Landmark::RightWrist,
        Landmark::LeftHip,
        Landmark::RightHip,
        Landmark::LeftKnee,
        Landmark::RightKnee,
        Landmark::LeftAnkle,
        Landmark::RightAnkle,
    ];

    pub fn from_index(idx: usize) -> Result<Self> {
        Self::ALL.get(idx).copied().ok_or(Error::LandmarkIndex {
            index: idx,
            count: Self::COUNT,
        })
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Landmark::Nose => "nose",
            Landmark::LeftShoulder => "left_shoulder",
            Landmark::RightShoulder => "right_shoulder",
            Landmark::LeftElbow => "left_elbow",
            Landmark::RightElbow => "right_elbow",
            Landmark::LeftWrist => "left_wrist",
            Landmark::RightWrist => "right_wrist",
            Landmark::LeftHip => "left_hip",
            Landmark::RightHip => "right_hip",
            Landmark::LeftKnee => "left_knee",
            Landmark::RightKnee => "right_knee",
            Landmark::LeftAnkle => "left_ankle",
            Landmark::RightAnkle => "right_ankle",
        }
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Landmark {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|lm| lm.name() == s)
            .ok_or_else(|| Error::UnknownLandmark(s.to_string()))
    }
}

/// 2D position in normalized image coordinates (origin top-left, y down)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Vector pointing from `origin` to this point
    pub fn vector_from(&self, origin: &Self) -> Vector2<f64> {
        self.to_nalgebra() - origin.to_nalgebra()
    }
}

/// One frame of landmark estimates. A slot is `None` when the pose
/// estimator could not place that point with enough confidence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Landmark, Option<Point2D>>",
    into = "BTreeMap<Landmark, Option<Point2D>>"
)]
pub struct LandmarkFrame {
    points: [Option<Point2D>; Landmark::COUNT],
}

impl LandmarkFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, landmark: Landmark) -> Option<Point2D> {
        self.points[landmark.index()]
    }

    pub fn set(&mut self, landmark: Landmark, point: Option<Point2D>) {
        self.points[landmark.index()] = point;
    }

    /// Builder-style setter
    pub fn with(mut self, landmark: Landmark, x: f64, y: f64) -> Self {
        self.set(landmark, Some(Point2D::new(x, y)));
        self
    }

    pub fn without(mut self, landmark: Landmark) -> Self {
        self.set(landmark, None);
        self
    }

    /// Look up a fixed set of landmarks; `None` unless every one is present.
    pub fn require<const N: usize>(&self, landmarks: [Landmark; N]) -> Option<[Point2D; N]> {
        let mut out = [Point2D::default(); N];
        for (slot, landmark) in out.iter_mut().zip(landmarks) {
            *slot = self.get(landmark)?;
        }
        Some(out)
    }

    pub fn present_count(&self) -> usize {
        self.points.iter().flatten().count()
    }

    pub fn is_complete(&self) -> bool {
        self.present_count() == Landmark::COUNT
    }

    pub fn iter(&self) -> impl Iterator<Item = (Landmark, Option<Point2D>)> + '_ {
        Landmark::ALL.iter().map(move |&lm| (lm, self.get(lm)))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<BTreeMap<Landmark, Option<Point2D>>> for LandmarkFrame {
    fn from(map: BTreeMap<Landmark, Option<Point2D>>) -> Self {
        let mut frame = Self::default();
        for (landmark, point) in map {
            frame.set(landmark, point);
        }
        frame
    }
}

impl From<LandmarkFrame> for BTreeMap<Landmark, Option<Point2D>> {
    fn from(frame: LandmarkFrame) -> Self {
        frame.iter().collect()
    }
}

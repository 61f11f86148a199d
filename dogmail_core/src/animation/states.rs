use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::time::Duration;

use crate::constants::{
    ANTICIPATION_MS, EXCITED_SCALE, FEAST_TREAT_DELIVERY_MS, FEAST_WAG_MS, REST_SCALE, SETTLE_MS,
    SITTING_EXCITED_OFFSET_Y, SNACK_TREAT_DELIVERY_MS, SNACK_WAG_MS, STANDING_OFFSET_Y,
    WAG_AMPLITUDE_DEG, WAG_PERIOD_MS,
};

/// Phases of the treat sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnimationState {
    #[default]
    Idle,
    Anticipation,
    TreatDelivery,
    Wag,
    Settle,
}

impl AnimationState {
    /// Phases in the order a sequence visits them after leaving `Idle`.
    pub const SEQUENCE: [AnimationState; 4] = [
        AnimationState::Anticipation,
        AnimationState::TreatDelivery,
        AnimationState::Wag,
        AnimationState::Settle,
    ];

    /// The phase entered when this one times out (`Idle` waits for `play()`).
    pub fn next(self) -> AnimationState {
        match self {
            AnimationState::Idle => AnimationState::Anticipation,
            AnimationState::Anticipation => AnimationState::TreatDelivery,
            AnimationState::TreatDelivery => AnimationState::Wag,
            AnimationState::Wag => AnimationState::Settle,
            AnimationState::Settle => AnimationState::Idle,
        }
    }

    pub fn pose(self) -> Pose {
        match self {
            AnimationState::Idle => Pose::Sitting,
            AnimationState::Anticipation | AnimationState::Settle => Pose::Standing,
            AnimationState::TreatDelivery => Pose::SittingTongueOut,
            AnimationState::Wag => Pose::StandingTongueOut,
        }
    }

    pub fn scale_target(self) -> f32 {
        match self {
            AnimationState::Anticipation | AnimationState::TreatDelivery | AnimationState::Wag => {
                EXCITED_SCALE
            }
            AnimationState::Idle | AnimationState::Settle => REST_SCALE,
        }
    }

    pub fn offset_target(self) -> f32 {
        match self {
            AnimationState::Anticipation | AnimationState::Wag => STANDING_OFFSET_Y,
            AnimationState::TreatDelivery => SITTING_EXCITED_OFFSET_Y,
            AnimationState::Idle | AnimationState::Settle => 0.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnimationState::Idle => "idle",
            AnimationState::Anticipation => "anticipation",
            AnimationState::TreatDelivery => "treat delivery",
            AnimationState::Wag => "wag",
            AnimationState::Settle => "settle",
        }
    }
}

/// Discrete image selection consumed by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pose {
    Sitting,
    /// Cosmetic alternate idle pose
    SittingHeadTilt,
    Standing,
    SittingTongueOut,
    StandingTongueOut,
}

impl Pose {
    pub fn asset(self) -> &'static str {
        match self {
            Pose::Sitting => "/Sitting.svg",
            Pose::SittingHeadTilt => "/Sitting_head_tilt.svg",
            Pose::Standing => "/Standing.svg",
            Pose::SittingTongueOut => "/Sitting_with_tongue_out.svg",
            Pose::StandingTongueOut => "/Standing_with_tongue_out.svg",
        }
    }
}

/// Which schedule a sequence follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceVariant {
    /// Short treat, quick wag
    #[default]
    Snack,
    /// Long treat, longer wag
    Feast,
}

impl std::str::FromStr for SequenceVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "snack" => Ok(SequenceVariant::Snack),
            "feast" => Ok(SequenceVariant::Feast),
            other => Err(format!("unknown sequence variant '{other}' (expected snack or feast)")),
        }
    }
}

/// Fixed per-phase durations of one sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTimings {
    pub anticipation: Duration,
    pub treat_delivery: Duration,
    pub wag: Duration,
    pub settle: Duration,
}

impl PhaseTimings {
    pub fn for_variant(variant: SequenceVariant) -> Self {
        let (treat_delivery, wag) = match variant {
            SequenceVariant::Snack => (SNACK_TREAT_DELIVERY_MS, SNACK_WAG_MS),
            SequenceVariant::Feast => (FEAST_TREAT_DELIVERY_MS, FEAST_WAG_MS),
        };
        Self {
            anticipation: Duration::from_millis(ANTICIPATION_MS),
            treat_delivery: Duration::from_millis(treat_delivery),
            wag: Duration::from_millis(wag),
            settle: Duration::from_millis(SETTLE_MS),
        }
    }

    /// How long `state` lasts once entered. `Idle` has no timeout.
    pub fn duration(&self, state: AnimationState) -> Option<Duration> {
        match state {
            AnimationState::Idle => None,
            AnimationState::Anticipation => Some(self.anticipation),
            AnimationState::TreatDelivery => Some(self.treat_delivery),
            AnimationState::Wag => Some(self.wag),
            AnimationState::Settle => Some(self.settle),
        }
    }

    pub fn total(&self) -> Duration {
        self.anticipation + self.treat_delivery + self.wag + self.settle
    }
}

impl Default for PhaseTimings {
    fn default() -> Self {
        Self::for_variant(SequenceVariant::default())
    }
}

/// Rotation of the wag keyframe `elapsed` into the phase: -5° at the start
/// and end of each period, +5° half way, eased sinusoidally.
pub fn wag_angle(elapsed: Duration) -> f32 {
    let period = WAG_PERIOD_MS as f32;
    let t = (elapsed.as_millis() as f32 % period) / period;
    -WAG_AMPLITUDE_DEG * (2.0 * PI * t).cos()
}

/// Everything the renderer needs to draw one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub state: AnimationState,
    pub pose: Pose,
    pub scale: f32,
    pub rotation_deg: f32,
    pub offset_y: f32,
}

mod sequencer;
mod spring;
mod states;

pub use sequencer::{AnimationSequencer, SequencerConfig, SequencerEvent};
pub use spring::Spring;
pub use states::{wag_angle, AnimationState, Frame, PhaseTimings, Pose, SequenceVariant};

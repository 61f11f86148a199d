//! DogMail core: the email rule, the submission lifecycle and the treat
//! animation that rewards it.

pub mod animation;
pub mod api;
pub mod constants;
pub mod controller;
pub mod utils;
pub mod validation;

pub use animation::{
    AnimationSequencer, AnimationState, Frame, PhaseTimings, Pose, SequenceVariant,
    SequencerConfig, SequencerEvent,
};
pub use api::{EmailSubmitter, HttpSubmitter};
pub use controller::{
    ControllerOptions, FormEvent, FormSnapshot, SubmissionController, SubmitOutcome,
};
pub use utils::config::Config;
pub use utils::error::{DogmailError, DogmailResult, TransportError, ValidationError};
pub use validation::{is_valid_email, validate_email};

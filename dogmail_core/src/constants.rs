// Spring physics defaults (per second)
pub const SPRING_STIFFNESS: f32 = 50.0;
pub const SPRING_DAMPING: f32 = 20.0;
pub const SPRING_MASS: f32 = 1.0;
pub const SPRING_THRESHOLD: f32 = 0.0005;
pub const SPRING_STEP_SECS: f32 = 1.0 / 240.0;

// Phase durations (ms)
pub const ANTICIPATION_MS: u64 = 200;
pub const SNACK_TREAT_DELIVERY_MS: u64 = 800;
pub const SNACK_WAG_MS: u64 = 1200;
pub const FEAST_TREAT_DELIVERY_MS: u64 = 2000;
pub const FEAST_WAG_MS: u64 = 1500;
pub const SETTLE_MS: u64 = 400;

// Transform targets
pub const REST_SCALE: f32 = 1.0;
pub const EXCITED_SCALE: f32 = 1.1;
pub const STANDING_OFFSET_Y: f32 = -12.0;
pub const SITTING_EXCITED_OFFSET_Y: f32 = -4.0;

// Wag keyframe
pub const WAG_AMPLITUDE_DEG: f32 = 5.0;
pub const WAG_PERIOD_MS: u64 = 300;

// Idle micro-animation
pub const IDLE_POSE_MIN_MS: u64 = 3000;
pub const IDLE_POSE_MAX_MS: u64 = 5000;
pub const BREATH_INTERVAL_MS: u64 = 2000;
pub const BREATH_AMPLITUDE: f32 = 0.02;

// Sequencer event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 128;

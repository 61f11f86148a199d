//! Timed treat sequence and idle micro-animation.
//!
//! The sequencer is a small finite-state machine advanced by tokio timers:
//! one timer per phase, each started when its phase is entered, so a late
//! timer only delays the following phases. All timers hang off a single
//! teardown token; once [`AnimationSequencer::teardown`] returns nothing
//! else happens, not even the completion callback.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::spring::Spring;
use super::states::{wag_angle, AnimationState, Frame, PhaseTimings, Pose, SequenceVariant};
use crate::constants::{
    BREATH_AMPLITUDE, BREATH_INTERVAL_MS, EVENT_CHANNEL_CAPACITY, IDLE_POSE_MAX_MS,
    IDLE_POSE_MIN_MS, REST_SCALE,
};
use crate::utils::config::AnimationSettings;

/// Events emitted by the sequencer for renderers and the form controller.
#[derive(Debug, Clone, PartialEq)]
pub enum SequencerEvent {
    PhaseEntered(AnimationState),
    IdlePoseChanged(Pose),
    Breath { scale_target: f32 },
    /// The sequence returned to `Idle`; sent right before `on_complete` runs
    Completed,
    TornDown,
}

#[derive(Debug, Clone)]
pub struct SequencerConfig {
    pub timings: PhaseTimings,
    /// Run the idle pose toggle / breathing loop while `Idle`
    pub idle_enabled: bool,
    pub idle_seed: Option<u64>,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            timings: PhaseTimings::default(),
            idle_enabled: true,
            idle_seed: None,
        }
    }
}

impl SequencerConfig {
    pub fn for_variant(variant: SequenceVariant) -> Self {
        Self {
            timings: PhaseTimings::for_variant(variant),
            ..Default::default()
        }
    }

    pub fn from_settings(settings: &AnimationSettings) -> Self {
        Self {
            timings: PhaseTimings::for_variant(settings.variant),
            idle_enabled: true,
            idle_seed: settings.idle_seed,
        }
    }
}

struct SequencerInner {
    state: AnimationState,
    phase_started_at: Instant,
    idle_alt_pose: bool,
    scale: Spring,
    rotation: Spring,
    offset: Spring,
    last_sample: Instant,
    torn_down: bool,
    idle_token: Option<CancellationToken>,
    rng: fastrand::Rng,
}

impl SequencerInner {
    fn advance(&mut self, now: Instant) {
        if self.torn_down {
            return;
        }
        let dt = now.saturating_duration_since(self.last_sample).as_secs_f32();
        self.scale.update(dt);
        self.rotation.update(dt);
        self.offset.update(dt);
        self.last_sample = now;
    }

    fn pose(&self) -> Pose {
        if self.state == AnimationState::Idle && self.idle_alt_pose {
            Pose::SittingHeadTilt
        } else {
            self.state.pose()
        }
    }

    fn next_idle_pose_delay(&mut self) -> Duration {
        Duration::from_millis(self.rng.u64(IDLE_POSE_MIN_MS..=IDLE_POSE_MAX_MS))
    }

    fn next_breath_target(&mut self) -> f32 {
        REST_SCALE + (self.rng.f32() * 2.0 - 1.0) * BREATH_AMPLITUDE
    }
}

struct Shared {
    inner: Mutex<SequencerInner>,
    /// Held while `on_complete` runs and while tearing down
    completion_gate: Mutex<()>,
    events: broadcast::Sender<SequencerEvent>,
    teardown: CancellationToken,
    config: SequencerConfig,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SequencerInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn gate(&self) -> MutexGuard<'_, ()> {
        self.completion_gate
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: SequencerEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn enter(&self, inner: &mut SequencerInner, state: AnimationState) {
        let now = Instant::now();
        inner.advance(now);

        if inner.state == AnimationState::Wag {
            // hand the keyframe angle over so the dog eases back upright
            let angle = wag_angle(now.saturating_duration_since(inner.phase_started_at));
            inner.rotation.snap_to(angle);
        }

        inner.state = state;
        inner.phase_started_at = now;
        inner.idle_alt_pose = false;
        inner.scale.set_target(state.scale_target());
        inner.offset.set_target(state.offset_target());
        inner.rotation.set_target(0.0);

        debug!(phase = state.label(), "animation phase entered");
        self.emit(SequencerEvent::PhaseEntered(state));
    }
}

/// Handle to the treat animation. Cheap to clone; all clones drive the same
/// state machine.
#[derive(Clone)]
pub struct AnimationSequencer {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for AnimationSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.lock();
        f.debug_struct("AnimationSequencer")
            .field("state", &inner.state)
            .field("torn_down", &inner.torn_down)
            .finish()
    }
}

impl AnimationSequencer {
    /// Creates the sequencer in `Idle` and starts the idle loop.
    ///
    /// Must be called from within a tokio runtime when the idle loop is enabled.
    pub fn mount(config: SequencerConfig) -> Self {
        let now = Instant::now();
        let rng = match config.idle_seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let inner = SequencerInner {
            state: AnimationState::Idle,
            phase_started_at: now,
            idle_alt_pose: false,
            scale: Spring::at_rest(REST_SCALE),
            rotation: Spring::at_rest(0.0),
            offset: Spring::at_rest(0.0),
            last_sample: now,
            torn_down: false,
            idle_token: None,
            rng,
        };

        let sequencer = Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                completion_gate: Mutex::new(()),
                events,
                teardown: CancellationToken::new(),
                config,
            }),
        };

        {
            let mut inner = sequencer.shared.lock();
            sequencer.start_idle_loop(&mut inner);
        }

        sequencer
    }

    /// Starts the treat sequence. Returns `false` and does nothing when a
    /// sequence is already playing or the sequencer was torn down.
    ///
    /// `on_complete` runs exactly once, after the sequence is back in `Idle`,
    /// unless the sequencer is torn down first. It must not call
    /// [`teardown`](Self::teardown).
    pub fn play<F>(&self, on_complete: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let mut inner = self.shared.lock();
        if inner.torn_down {
            debug!("play() after teardown ignored");
            return false;
        }
        if inner.state != AnimationState::Idle {
            debug!(phase = inner.state.label(), "play() while a sequence is running ignored");
            return false;
        }

        if let Some(idle) = inner.idle_token.take() {
            idle.cancel();
        }

        self.shared.enter(&mut inner, AnimationState::Anticipation);

        let token = self.shared.teardown.child_token();
        tokio::spawn(run_sequence(self.clone(), token, Box::new(on_complete)));
        true
    }

    pub fn state(&self) -> AnimationState {
        self.shared.lock().state
    }

    /// True from `play()` until the sequence is back in `Idle`.
    pub fn is_active(&self) -> bool {
        self.state() != AnimationState::Idle
    }

    pub fn is_torn_down(&self) -> bool {
        self.shared.lock().torn_down
    }

    pub fn timings(&self) -> PhaseTimings {
        self.shared.config.timings
    }

    /// Samples pose and transforms at the current instant.
    pub fn frame(&self) -> Frame {
        let mut inner = self.shared.lock();
        let now = Instant::now();
        inner.advance(now);

        let rotation_deg = if inner.state == AnimationState::Wag {
            wag_angle(now.saturating_duration_since(inner.phase_started_at))
        } else {
            inner.rotation.position
        };

        Frame {
            state: inner.state,
            pose: inner.pose(),
            scale: inner.scale.position,
            rotation_deg,
            offset_y: inner.offset.position,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SequencerEvent> {
        self.shared.events.subscribe()
    }

    /// Cancels every pending timer. Idempotent.
    pub fn teardown(&self) {
        let _gate = self.shared.gate();
        let mut inner = self.shared.lock();
        if inner.torn_down {
            return;
        }

        self.shared.teardown.cancel();
        inner.idle_token = None;
        inner.torn_down = true;

        debug!(phase = inner.state.label(), "animation sequencer torn down");
        self.shared.emit(SequencerEvent::TornDown);
    }

    fn start_idle_loop(&self, inner: &mut SequencerInner) {
        if !self.shared.config.idle_enabled || inner.torn_down {
            return;
        }

        let token = self.shared.teardown.child_token();
        inner.idle_token = Some(token.clone());
        let first_toggle = inner.next_idle_pose_delay();

        tokio::spawn(run_idle_loop(self.shared.clone(), token, first_toggle));
    }
}

async fn run_sequence(
    sequencer: AnimationSequencer,
    token: CancellationToken,
    on_complete: Box<dyn FnOnce() + Send>,
) {
    let timings = sequencer.shared.config.timings;
    let mut current = AnimationState::Anticipation;

    while let Some(duration) = timings.duration(current) {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = sleep(duration) => {}
        }

        let next = current.next();
        {
            let mut inner = sequencer.shared.lock();
            if token.is_cancelled() {
                return;
            }
            sequencer.shared.enter(&mut inner, next);

            if next == AnimationState::Idle {
                sequencer.shared.emit(SequencerEvent::Completed);
                sequencer.start_idle_loop(&mut inner);
            }
        }
        current = next;
    }

    let _gate = sequencer.shared.gate();
    if token.is_cancelled() {
        return;
    }
    on_complete();
}

async fn run_idle_loop(shared: Arc<Shared>, token: CancellationToken, first_toggle: Duration) {
    let start = Instant::now();
    let mut next_toggle = start + first_toggle;
    let mut next_breath = start + Duration::from_millis(BREATH_INTERVAL_MS);

    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = sleep_until(next_toggle) => {
                let mut inner = shared.lock();
                if token.is_cancelled() || inner.state != AnimationState::Idle {
                    return;
                }
                inner.idle_alt_pose = !inner.idle_alt_pose;
                next_toggle = Instant::now() + inner.next_idle_pose_delay();
                let pose = inner.pose();
                shared.emit(SequencerEvent::IdlePoseChanged(pose));
            }
            _ = sleep_until(next_breath) => {
                let mut inner = shared.lock();
                if token.is_cancelled() || inner.state != AnimationState::Idle {
                    return;
                }
                let now = Instant::now();
                inner.advance(now);
                let scale_target = inner.next_breath_target();
                inner.scale.set_target(scale_target);
                next_breath = now + Duration::from_millis(BREATH_INTERVAL_MS);
                shared.emit(SequencerEvent::Breath { scale_target });
            }
        }
    }
}

//! Submission lifecycle of the treat form.
//!
//! Owns the email field, the pending flag and the single visible message,
//! issues the one network call per valid submit, and starts the treat
//! sequence when the store acknowledged the write. The submit control is
//! disabled while a request is pending or a sequence is playing.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::animation::AnimationSequencer;
use crate::api::EmailSubmitter;
use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::utils::config::{ClientSettings, DEFAULT_REQUEST_TIMEOUT_MS};
use crate::utils::error::{TransportError, ValidationError};
use crate::validation::validate_email;

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const SUBMIT_FAILED_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailField {
    pub value: String,
    /// Result of the last validation; recomputed on submit only
    pub is_valid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionState {
    pub pending: bool,
    pub error: Option<String>,
}

/// Read-only view of the form for the render layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSnapshot {
    pub email: EmailField,
    pub submission: SubmissionState,
    pub success_count: u64,
    pub animating: bool,
    pub form_disabled: bool,
}

/// What a call to [`SubmissionController::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A request was pending or a sequence was playing
    Ignored,
    Invalid(ValidationError),
    Failed(TransportError),
    Accepted { success_count: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Pending,
    Rejected(String),
    Failed(String),
    Accepted { success_count: u64 },
    /// The treat sequence finished and the form accepts input again
    Ready,
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Upper bound on the submission request; elapsing counts as a failure
    pub request_timeout: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl ControllerOptions {
    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self {
            request_timeout: settings.request_timeout(),
        }
    }
}

#[derive(Debug, Default)]
struct FormState {
    email: EmailField,
    submission: SubmissionState,
    success_count: u64,
    torn_down: bool,
}

/// Page-level owner of the form and the treat sequence.
#[derive(Clone)]
pub struct SubmissionController {
    state: Arc<Mutex<FormState>>,
    submitter: Arc<dyn EmailSubmitter>,
    sequencer: AnimationSequencer,
    events: broadcast::Sender<FormEvent>,
    options: ControllerOptions,
}

impl SubmissionController {
    pub fn new(
        submitter: Arc<dyn EmailSubmitter>,
        sequencer: AnimationSequencer,
        options: ControllerOptions,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(FormState::default())),
            submitter,
            sequencer,
            events,
            options,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: FormEvent) {
        let _ = self.events.send(event);
    }

    fn disabled(&self, state: &FormState) -> bool {
        state.torn_down || state.submission.pending || self.sequencer.is_active()
    }

    /// Stores `raw` verbatim. Ignored while the form is disabled.
    pub fn update_email(&self, raw: impl Into<String>) -> bool {
        let mut state = self.lock();
        if self.disabled(&state) {
            return false;
        }
        state.email.value = raw.into();
        true
    }

    /// Validates and submits the current email. See [`SubmitOutcome`].
    pub async fn submit(&self) -> SubmitOutcome {
        let email = {
            let mut state = self.lock();
            if self.disabled(&state) {
                debug!(
                    pending = state.submission.pending,
                    animating = self.sequencer.is_active(),
                    "submit ignored"
                );
                return SubmitOutcome::Ignored;
            }

            state.submission.error = None;
            if let Err(err) = validate_email(&state.email.value) {
                state.email.is_valid = false;
                state.submission.error = Some(INVALID_EMAIL_MESSAGE.to_string());
                debug!(error = %err, "email rejected by validation");
                self.emit(FormEvent::Rejected(INVALID_EMAIL_MESSAGE.to_string()));
                return SubmitOutcome::Invalid(err);
            }

            state.email.is_valid = true;
            state.submission.pending = true;
            self.emit(FormEvent::Pending);
            state.email.value.clone()
        };

        let timeout = self.options.request_timeout;
        let result = match tokio::time::timeout(timeout, self.submitter.submit_email(&email)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
        };

        let mut state = self.lock();
        state.submission.pending = false;

        match result {
            Ok(()) => {
                state.email.value.clear();
                state.email.is_valid = false;
                state.success_count += 1;
                let success_count = state.success_count;
                info!(success_count, "treat earned");
                self.emit(FormEvent::Accepted { success_count });

                if !state.torn_down {
                    let events = self.events.clone();
                    self.sequencer.play(move || {
                        let _ = events.send(FormEvent::Ready);
                    });
                }
                SubmitOutcome::Accepted { success_count }
            }
            Err(err) => {
                warn!(error = %err, "email submission failed");
                state.submission.error = Some(SUBMIT_FAILED_MESSAGE.to_string());
                self.emit(FormEvent::Failed(SUBMIT_FAILED_MESSAGE.to_string()));
                SubmitOutcome::Failed(err)
            }
        }
    }

    pub fn email(&self) -> String {
        self.lock().email.value.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().submission.error.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().submission.pending
    }

    pub fn is_form_disabled(&self) -> bool {
        let state = self.lock();
        self.disabled(&state)
    }

    /// Session-local display counter; not the store's count.
    pub fn success_count(&self) -> u64 {
        self.lock().success_count
    }

    pub fn treats_label(&self) -> String {
        match self.success_count() {
            0 => "Be the first to give a treat".to_string(),
            n => format!("{n} treats given today!"),
        }
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let state = self.lock();
        FormSnapshot {
            email: state.email.clone(),
            submission: state.submission.clone(),
            success_count: state.success_count,
            animating: self.sequencer.is_active(),
            form_disabled: self.disabled(&state),
        }
    }

    pub fn sequencer(&self) -> &AnimationSequencer {
        &self.sequencer
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FormEvent> {
        self.events.subscribe()
    }

    /// Tears down the view: cancels the sequence and ignores late responses.
    pub fn teardown(&self) {
        self.lock().torn_down = true;
        self.sequencer.teardown();
    }
}

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use dogmail_core::animation::{AnimationSequencer, SequenceVariant, SequencerConfig};
use dogmail_core::api::http_client::ClientConfig;
use dogmail_core::api::HttpSubmitter;
use dogmail_core::controller::{ControllerOptions, FormEvent, SubmissionController, SubmitOutcome};
use dogmail_core::utils::config::{Config, StorageBackend};
use dogmail_core::utils::error::{DogmailError, ResultExt};
use dogmail_server::store::open_store;
use dogmail_server::{start_server, ServerConfig};
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info};

use crate::render::FrameRenderer;

/// Roughly 30 redraws per second
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

#[derive(Debug, Clone, Default)]
pub struct ServeArgs {
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub memory: bool,
}

pub async fn run_serve(mut config: Config, args: ServeArgs) -> Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.server.data_dir = data_dir.to_string_lossy().into_owned();
    }
    if args.memory {
        config.server.storage = StorageBackend::Memory;
    }

    let store = open_store(&config.server).with_file_context(&config.server.data_dir)?;
    start_server(ServerConfig::from_settings(&config.server), store).await
}

pub async fn run_treat(
    mut config: Config,
    email: String,
    api_url: Option<String>,
    variant: Option<SequenceVariant>,
) -> Result<()> {
    if let Some(api_url) = api_url {
        config.client.api_url = api_url;
    }
    if let Some(variant) = variant {
        config.animation.variant = variant;
    }

    if !config.client.api_url.starts_with("http://") && !config.client.api_url.starts_with("https://") {
        return Err(DogmailError::Config(format!(
            "api_url must be an http(s) URL, got '{}'",
            config.client.api_url
        ))
        .into());
    }

    let timeout = config.client.request_timeout();
    let submitter = HttpSubmitter::new(&config.client.api_url, ClientConfig::with_timeout(timeout))
        .with_config_context("client.api_url")?;
    info!(endpoint = submitter.endpoint(), "submitting");

    let sequencer = AnimationSequencer::mount(SequencerConfig {
        idle_enabled: false,
        ..SequencerConfig::from_settings(&config.animation)
    });
    let controller = SubmissionController::new(
        Arc::new(submitter),
        sequencer.clone(),
        ControllerOptions::from_settings(&config.client),
    );
    let renderer = FrameRenderer::new();

    let mut form_events = controller.subscribe();
    controller.update_email(email);

    match submit_with_spinner(&controller, &renderer, &mut form_events).await? {
        SubmitOutcome::Accepted { success_count } => {
            debug!(success_count, "submission accepted");
            let ready = wait_for_ready(&mut form_events);
            let finished = animate_until(&sequencer, &renderer, ready, ctrl_c()).await?;
            if !finished {
                controller.teardown();
                bail!("Interrupted");
            }
            renderer.finish(&format!("Treat delivered! {}", controller.treats_label()))?;
            Ok(())
        }
        SubmitOutcome::Invalid(err) => {
            renderer.error(&controller.error().unwrap_or_default())?;
            Err(DogmailError::from(err).into())
        }
        SubmitOutcome::Failed(err) => {
            renderer.error(&controller.error().unwrap_or_default())?;
            Err(DogmailError::from(err).into())
        }
        SubmitOutcome::Ignored => bail!("Submission ignored while another one is in flight"),
    }
}

/// Plays the sequence locally without any network call.
pub async fn run_animate(config: Config, variant: Option<SequenceVariant>) -> Result<()> {
    let variant = variant.unwrap_or(config.animation.variant);
    let sequencer = AnimationSequencer::mount(SequencerConfig {
        idle_enabled: false,
        ..SequencerConfig::for_variant(variant)
    });
    let renderer = FrameRenderer::new();

    let (done_tx, done_rx) = oneshot::channel();
    sequencer.play(move || {
        let _ = done_tx.send(());
    });

    let done = async {
        let _ = done_rx.await;
    };
    let finished = animate_until(&sequencer, &renderer, done, ctrl_c()).await?;

    sequencer.teardown();
    if !finished {
        bail!("Interrupted");
    }
    renderer.finish(&format!("Sequence complete ({} ms)", sequencer.timings().total().as_millis()))?;
    Ok(())
}

/// Runs `submit()` and spins a pending line from the `Pending` event until
/// the outcome arrives.
async fn submit_with_spinner(
    controller: &SubmissionController,
    renderer: &FrameRenderer,
    events: &mut broadcast::Receiver<FormEvent>,
) -> Result<SubmitOutcome> {
    let submit = controller.submit();
    tokio::pin!(submit);

    let mut ticker = tokio::time::interval(SPINNER_INTERVAL);
    let mut pending = false;
    let mut tick = 0usize;

    loop {
        tokio::select! {
            outcome = &mut submit => return Ok(outcome),
            event = events.recv(), if !pending => {
                if let Ok(FormEvent::Pending) = event {
                    pending = true;
                    ticker.reset();
                    renderer.draw_pending(tick)?;
                }
            }
            _ = ticker.tick(), if pending => {
                tick += 1;
                renderer.draw_pending(tick)?;
            }
        }
    }
}

async fn wait_for_ready(events: &mut broadcast::Receiver<FormEvent>) {
    loop {
        match events.recv().await {
            Ok(FormEvent::Ready) | Err(broadcast::error::RecvError::Closed) => return,
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
        }
    }
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await
    }
}

/// Redraws frames until `done` resolves. Returns `false` when `interrupt`
/// fires first, after tearing the sequencer down.
async fn animate_until<D, I>(
    sequencer: &AnimationSequencer,
    renderer: &FrameRenderer,
    done: D,
    interrupt: I,
) -> Result<bool>
where
    D: Future<Output = ()>,
    I: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(FRAME_INTERVAL);
    tokio::pin!(done);
    tokio::pin!(interrupt);

    loop {
        tokio::select! {
            _ = &mut done => return Ok(true),
            _ = &mut interrupt => {
                sequencer.teardown();
                return Ok(false);
            }
            _ = ticker.tick() => renderer.draw(&sequencer.frame())?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use dogmail_core::animation::AnimationState;
    use dogmail_core::api::EmailSubmitter;
    use dogmail_core::TransportError;
    use pretty_assertions::assert_eq;

    struct SlowSubmitter;

    #[async_trait]
    impl EmailSubmitter for SlowSubmitter {
        async fn submit_email(&self, _email: &str) -> Result<(), TransportError> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(())
        }
    }

    fn quiet_sequencer() -> AnimationSequencer {
        AnimationSequencer::mount(SequencerConfig {
            idle_enabled: false,
            ..SequencerConfig::for_variant(SequenceVariant::Snack)
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_spinner_consumes_pending_until_outcome() {
        let controller = SubmissionController::new(
            Arc::new(SlowSubmitter),
            quiet_sequencer(),
            ControllerOptions::default(),
        );
        let mut events = controller.subscribe();
        controller.update_email("user@example.com");

        let outcome = submit_with_spinner(&controller, &FrameRenderer::new(), &mut events)
            .await
            .unwrap();

        assert_eq!(outcome, SubmitOutcome::Accepted { success_count: 1 });
        assert_eq!(events.try_recv().unwrap(), FormEvent::Accepted { success_count: 1 });
        controller.teardown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_tears_down_mid_sequence() {
        let sequencer = quiet_sequencer();
        assert!(sequencer.play(|| {}));

        let finished = animate_until(
            &sequencer,
            &FrameRenderer::new(),
            std::future::pending::<()>(),
            tokio::time::sleep(Duration::from_millis(500)),
        )
        .await
        .unwrap();

        assert!(!finished);
        assert!(sequencer.is_torn_down());
        assert_eq!(sequencer.state(), AnimationState::TreatDelivery);
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_wins_over_pending_interrupt() {
        let sequencer = quiet_sequencer();
        let (done_tx, done_rx) = oneshot::channel();
        assert!(sequencer.play(move || {
            let _ = done_tx.send(());
        }));

        let done = async {
            let _ = done_rx.await;
        };
        let finished = animate_until(&sequencer, &FrameRenderer::new(), done, std::future::pending::<()>())
            .await
            .unwrap();

        assert!(finished);
        assert!(!sequencer.is_torn_down());
        assert_eq!(sequencer.state(), AnimationState::Idle);
    }
}

//! Form controller against a real server on a loopback port

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dogmail_core::animation::{AnimationSequencer, AnimationState, SequenceVariant, SequencerConfig};
use dogmail_core::api::http_client::ClientConfig;
use dogmail_core::api::HttpSubmitter;
use dogmail_core::controller::{
    ControllerOptions, FormEvent, SubmissionController, SubmitOutcome, INVALID_EMAIL_MESSAGE,
    SUBMIT_FAILED_MESSAGE,
};
use dogmail_core::TransportError;
use dogmail_server::store::{Fields, EMAILS_COLLECTION};
use dogmail_server::{serve, DocumentStore, MemoryStore, PersistenceError, StoredDocument};
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct BrokenStore;

#[async_trait]
impl DocumentStore for BrokenStore {
    async fn append(&self, _collection: &str, _fields: Fields) -> Result<StoredDocument, PersistenceError> {
        Err(PersistenceError::Unavailable("offline".to_string()))
    }
}

struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl TestServer {
    async fn start(store: Arc<dyn DocumentStore>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(serve(listener, store, async {
            let _ = rx.await;
        }));

        Self {
            addr,
            shutdown: Some(tx),
            handle,
        }
    }

    fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

fn controller_for(server: &TestServer) -> SubmissionController {
    let timeout = Duration::from_secs(5);
    let submitter = HttpSubmitter::new(&server.url(), ClientConfig::with_timeout(timeout)).unwrap();
    let sequencer = AnimationSequencer::mount(SequencerConfig {
        idle_enabled: false,
        ..SequencerConfig::for_variant(SequenceVariant::Snack)
    });
    SubmissionController::new(
        Arc::new(submitter),
        sequencer,
        ControllerOptions {
            request_timeout: timeout,
        },
    )
}

#[tokio::test]
async fn test_valid_submission_is_stored_and_rewarded() {
    let store = Arc::new(MemoryStore::new());
    let server = TestServer::start(store.clone()).await;
    let controller = controller_for(&server);
    let mut events = controller.subscribe();

    controller.update_email("user@example.com");
    assert_eq!(controller.submit().await, SubmitOutcome::Accepted { success_count: 1 });
    assert_eq!(controller.email(), "");
    assert_eq!(controller.sequencer().state(), AnimationState::Anticipation);

    let documents = store.documents(EMAILS_COLLECTION);
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].fields["email"], "user@example.com");

    let ready = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if let Ok(FormEvent::Ready) = events.recv().await {
                break;
            }
        }
    })
    .await;
    assert!(ready.is_ok(), "sequence never completed");
    assert!(!controller.is_form_disabled());
    assert_eq!(controller.treats_label(), "1 treats given today!");

    controller.teardown();
    server.stop().await;
}

#[tokio::test]
async fn test_invalid_submission_never_reaches_the_store() {
    let store = Arc::new(MemoryStore::new());
    let server = TestServer::start(store.clone()).await;
    let controller = controller_for(&server);

    controller.update_email("user@example");
    assert!(matches!(controller.submit().await, SubmitOutcome::Invalid(_)));
    assert_eq!(controller.error().as_deref(), Some(INVALID_EMAIL_MESSAGE));
    assert!(store.documents(EMAILS_COLLECTION).is_empty());

    controller.teardown();
    server.stop().await;
}

#[tokio::test]
async fn test_store_failure_surfaces_generic_message() {
    let server = TestServer::start(Arc::new(BrokenStore)).await;
    let controller = controller_for(&server);

    controller.update_email("user@example.com");
    let outcome = controller.submit().await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed(TransportError::Status {
            status_code: 500,
            message: "Failed to save email".to_string(),
        })
    );
    assert_eq!(controller.error().as_deref(), Some(SUBMIT_FAILED_MESSAGE));
    assert_eq!(controller.email(), "user@example.com");
    assert_eq!(controller.sequencer().state(), AnimationState::Idle);
    assert_eq!(controller.success_count(), 0);

    controller.teardown();
    server.stop().await;
}

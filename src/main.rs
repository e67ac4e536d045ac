//! Application entry point — Voice-to-Story console demo.
//!
//! The orchestration core consumes platform speech and presentation through
//! trait seams; this binary plugs a terminal frontend into those seams so
//! the whole loop can be exercised without a browser or audio stack:
//!
//! * utterances are printed (and paced by word count, like real speech);
//! * a line typed while recording plays the role of the recognized topic;
//! * commands map to [`UserAction`]s (`sim`, Enter, `criar`, `de novo`,
//!   `ler`, `nova`, `sair`).
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Build the console speech backends and the provider chain.
//! 4. Spawn the [`SessionOrchestrator`] task.
//! 5. Route stdin lines to transcripts or user actions until `sair`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use voice_to_story::{
    config::AppConfig,
    generation::ProviderChain,
    permission::PermissionStore,
    session::{
        PresentationFault, Presenter, RenderPayload, SessionOrchestrator, SessionState, UserAction,
    },
    speech::{
        CaptureError, CaptureSession, OutputChannel, Recognizer, RecognizerEvent, SpeakError,
        Synthesizer,
    },
};

// ---------------------------------------------------------------------------
// ConsoleSynthesizer
// ---------------------------------------------------------------------------

/// Prints utterances and paces them roughly like spoken Portuguese
/// (~3 words per second, scaled by the configured rate, capped so long
/// stories stay bearable in a terminal).
struct ConsoleSynthesizer {
    rate: f32,
}

#[async_trait]
impl Synthesizer for ConsoleSynthesizer {
    fn is_supported(&self) -> bool {
        true
    }

    async fn speak(&self, text: &str) -> Result<(), SpeakError> {
        println!("🔊 {text}");
        let words = text.split_whitespace().count() as f32;
        let secs = (words / (3.0 * self.rate)).min(4.0);
        tokio::time::sleep(Duration::from_secs_f32(secs)).await;
        Ok(())
    }

    fn cancel(&self) {
        // A printed line cannot be taken back.
    }
}

// ---------------------------------------------------------------------------
// ConsoleRecognizer
// ---------------------------------------------------------------------------

/// Recognizer fed by stdin: while an attempt is active, typed lines are
/// delivered as final transcript fragments through the stored sender.
struct ConsoleRecognizer {
    slot: Arc<Mutex<Option<mpsc::Sender<RecognizerEvent>>>>,
}

impl Recognizer for ConsoleRecognizer {
    fn is_supported(&self) -> bool {
        true
    }

    fn start(&self, events: mpsc::Sender<RecognizerEvent>) -> Result<(), CaptureError> {
        let mut slot = self.slot.lock().unwrap();
        if slot.is_some() {
            return Err(CaptureError::Start("recognition already active".into()));
        }
        let _ = events.try_send(RecognizerEvent::Started);
        *slot = Some(events);
        Ok(())
    }

    fn stop(&self) {
        self.slot.lock().unwrap().take();
    }
}

// ---------------------------------------------------------------------------
// ConsolePresenter
// ---------------------------------------------------------------------------

struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn render(
        &self,
        state: SessionState,
        payload: &RenderPayload,
    ) -> Result<(), PresentationFault> {
        match (state, payload) {
            (SessionState::AwaitingPermission, _) => {
                println!("🎤 Podemos usar o seu microfone? Digite 'sim' para permitir.");
            }
            (SessionState::AwaitingInteraction, _) => {
                println!("✨ Aperte Enter para começar uma história!");
            }
            (SessionState::Recording, RenderPayload::Transcript { final_text, .. }) => {
                if final_text.is_empty() {
                    println!("🎙️  Fale agora! (digite o tema e aperte Enter)");
                } else {
                    println!("📝 \"{final_text}\"");
                }
            }
            (SessionState::AwaitingUserAction, RenderPayload::Topic { text }) => {
                println!("👉 Tema: \"{text}\" — 'criar' para gerar, 'de novo' para falar outra vez.");
            }
            (SessionState::AwaitingUserAction, _) => {
                println!("👉 'de novo' para tentar falar outra vez, ou 'criar' para uma história surpresa.");
            }
            (SessionState::Generating, RenderPayload::Loading { messages }) => {
                if let Some(first) = messages.first() {
                    println!("⏳ {first}");
                }
            }
            (SessionState::Presenting, RenderPayload::Story { story }) => {
                println!();
                println!("═══ {} ═══", story.title);
                for paragraph in &story.body {
                    println!();
                    println!("{paragraph}");
                }
                println!();
                println!(
                    "({}) — 'ler' para ouvir, 'nova' para outra história.",
                    story.provenance.label()
                );
            }
            _ => {}
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Voice-to-Story starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Components
    let output = OutputChannel::new(Arc::new(ConsoleSynthesizer {
        rate: config.speech.rate,
    }));

    let transcript_slot: Arc<Mutex<Option<mpsc::Sender<RecognizerEvent>>>> =
        Arc::new(Mutex::new(None));
    let capture = CaptureSession::new(
        Arc::new(ConsoleRecognizer {
            slot: Arc::clone(&transcript_slot),
        }),
        config.capture.clone(),
    );

    let chain = ProviderChain::from_config(&config.generation);
    let permissions = PermissionStore::new();
    let presenter: Arc<dyn Presenter> = Arc::new(ConsolePresenter);

    // 4. Orchestrator task
    let (actions_tx, actions_rx) = mpsc::channel::<UserAction>(16);
    let orchestrator = SessionOrchestrator::new(
        output,
        capture,
        chain,
        presenter,
        permissions,
        &config,
    );
    let run = tokio::spawn(orchestrator.run(actions_rx));

    // 5. stdin routing
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim().to_string();

        // While a capture attempt is active, typed text IS the speech.
        let active = transcript_slot.lock().unwrap().clone();
        if let Some(tx) = active {
            if !line.is_empty() {
                let _ = tx
                    .send(RecognizerEvent::Transcript {
                        final_text: line,
                        interim_text: String::new(),
                    })
                    .await;
            }
            continue;
        }

        let action = match line.as_str() {
            "" => UserAction::Gesture,
            "sim" => UserAction::GrantPermission,
            "criar" => UserAction::Generate,
            "de novo" => UserAction::RetryCapture,
            "ler" => UserAction::ReadStory,
            "nova" => UserAction::NewStory,
            "sair" => break,
            other => {
                println!("(comando desconhecido: {other:?})");
                continue;
            }
        };

        if actions_tx.send(action).await.is_err() {
            break;
        }
    }

    drop(actions_tx);
    run.await?;
    log::info!("Voice-to-Story shut down");
    Ok(())
}

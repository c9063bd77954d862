use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{error, info, instrument, warn};

use crate::actors::messages::AnalysisMessage;
use crate::actors::traits::AnalysisActor;
use crate::brain::analyzer::ensure_input;
use crate::brain::{AnalysisReport, BatchAnalyzer, Tally};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::models::AnalysisRequest;

/// A handle to the analysis actor.
///
/// Each request is split into up to `workers` chunks that are tallied on the
/// blocking thread pool, then merged and finalized once.
#[derive(Clone)]
pub struct AnalysisActorHandle {
    sender: mpsc::Sender<AnalysisMessage>,
    timeout: Duration,
}

impl AnalysisActorHandle {
    /// Spawns the actor and returns a handle to it. Must be called inside a tokio runtime.
    pub fn new(analyzer: Arc<BatchAnalyzer>, workers: usize, timeout: Duration) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        let runner = AnalysisRunner {
            receiver,
            analyzer,
            workers: workers.max(1),
        };
        tokio::spawn(async move { runner.run().await });
        Self { sender, timeout }
    }

    /// Spawns an actor with the built-in tagger and scorer, sized from `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(Arc::new(BatchAnalyzer::new()), config.workers, config.timeout())
    }

    /// Asks the actor to stop. Later requests fail with `AppError::Actor`.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.sender
            .send(AnalysisMessage::Shutdown)
            .await
            .map_err(|e| AppError::Actor(e.to_string()))
    }
}

#[async_trait]
impl AnalysisActor for AnalysisActorHandle {
    #[instrument(skip(self, request), fields(mode = request.kind.mode_label(), questions = request.questions.len()))]
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisReport, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = AnalysisMessage::Analyze {
            request,
            responder: send,
        };
        self.sender
            .send(msg)
            .await
            .map_err(|e| AppError::Actor(e.to_string()))?;
        timeout(self.timeout, recv)
            .await?
            .map_err(|e| AppError::Actor(e.to_string()))?
    }
}

// --- Actor Runner ---
struct AnalysisRunner {
    receiver: mpsc::Receiver<AnalysisMessage>,
    analyzer: Arc<BatchAnalyzer>,
    workers: usize,
}

impl AnalysisRunner {
    async fn run(mut self) {
        info!(workers = self.workers, "Analysis actor started");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                AnalysisMessage::Analyze { request, responder } => {
                    let analyzer = self.analyzer.clone();
                    let workers = self.workers;
                    tokio::spawn(async move {
                        let result = process_request(analyzer, workers, request).await;
                        match &result {
                            Err(e) if e.is_input_empty() => warn!("{}", e),
                            Err(e) => error!("Error processing analysis request: {:?}", e),
                            Ok(_) => {}
                        }
                        let _ = responder.send(result);
                    });
                }
                AnalysisMessage::Shutdown => break,
            }
        }
        info!("Analysis actor stopped");
    }
}

/// Fans a request out over the blocking pool and merges the partial tallies.
#[instrument(skip(analyzer, request), fields(mode = request.kind.mode_label()))]
async fn process_request(
    analyzer: Arc<BatchAnalyzer>,
    workers: usize,
    request: AnalysisRequest,
) -> Result<AnalysisReport, AppError> {
    let started = Instant::now();
    ensure_input(&request)?;

    let kind = request.kind;
    let record_count = request.resolved_record_count();
    let config = Arc::new(request.resolved_verb_config());
    let chunk_size = request.questions.len().div_ceil(workers).max(1);

    let tasks = request.questions.chunks(chunk_size).map(|chunk| {
        let chunk = chunk.to_vec();
        let analyzer = analyzer.clone();
        let config = config.clone();
        tokio::task::spawn_blocking(move || analyzer.tally(kind, &chunk, &config))
    });

    let mut tally = Tally::default();
    for partial in join_all(tasks).await {
        tally.merge(partial?);
    }

    let report = analyzer.finalize(kind, record_count, tally, started);
    info!("Analysis complete: {}", report.summary());
    Ok(report)
}

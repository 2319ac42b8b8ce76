//! Orchestrator module for the document ingester pipeline.
//!
//! Coordinates the consumer and the message handler.

use tokio::io::AsyncRead;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, instrument, warn};

use crate::consumer::{LineConsumer, StreamMessage};
use crate::handler::MessageHandler;

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Size of the message channel buffer.
    pub channel_buffer_size: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: 16,
        }
    }
}

/// Totals over one orchestrator run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub batches: usize,
    pub messages: usize,
    pub failed: usize,
}

/// Orchestrator that feeds consumer batches through the handler.
///
/// Shutdown is cooperative: a batch already being handled runs to completion
/// before the orchestrator stops.
pub struct Orchestrator<R> {
    consumer: LineConsumer<R>,
    handler: MessageHandler,
    config: OrchestratorConfig,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_rx: broadcast::Receiver<()>,
}

impl<R> Orchestrator<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    /// Create a new orchestrator with the given components.
    pub fn new(consumer: LineConsumer<R>, handler: MessageHandler) -> Self {
        Self::with_config(consumer, handler, OrchestratorConfig::default())
    }

    /// Create a new orchestrator with custom configuration.
    pub fn with_config(
        consumer: LineConsumer<R>,
        handler: MessageHandler,
        config: OrchestratorConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        Self {
            consumer,
            handler,
            config,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// A sender that stops the run when signalled.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Run until the input ends, a shutdown is signalled, or ctrl-c.
    #[instrument(skip(self))]
    pub async fn run(self) -> RunStats {
        info!("Starting document ingester orchestrator");

        let Self {
            consumer,
            handler,
            config,
            shutdown_tx,
            shutdown_rx,
        } = self;

        let (tx, mut rx) = mpsc::channel::<StreamMessage>(config.channel_buffer_size);

        let consumer_handle = tokio::spawn(async move {
            if let Err(e) = consumer.run(tx, shutdown_rx).await {
                error!(error = %e, "Consumer error");
            }
        });

        let mut stats = RunStats::default();
        loop {
            tokio::select! {
                msg = rx.recv() => {
                    match msg {
                        Some(StreamMessage::Events(bodies)) => {
                            let report = handler.handle_batch(bodies).await;
                            stats.batches += 1;
                            stats.messages += report.total();
                            stats.failed += report.failed();
                            if report.failed() > 0 {
                                warn!(
                                    failed_indices = ?report.failed_indices(),
                                    "Batch completed with failures"
                                );
                            }
                        }
                        Some(StreamMessage::Error(e)) => {
                            // An unreadable line is a message that failed.
                            stats.messages += 1;
                            stats.failed += 1;
                            error!(error = %e, "Received error from consumer");
                        }
                        Some(StreamMessage::End) | None => {
                            info!("Consumer stream ended");
                            break;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    let _ = shutdown_tx.send(());
                    break;
                }
            }
        }

        drop(rx);
        let _ = consumer_handle.await;

        info!(
            batches = stats.batches,
            messages = stats.messages,
            failed = stats.failed,
            "Orchestrator shutdown complete"
        );
        stats
    }
}

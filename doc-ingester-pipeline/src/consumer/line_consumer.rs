//! Line-oriented consumer implementation.
//!
//! Each non-blank input line is one raw event message body. Lines are
//! grouped into batches of at most `batch_size`, and a partial batch is
//! flushed once no new line arrived within `linger`.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, instrument};

use crate::consumer::messages::StreamMessage;
use crate::errors::ConsumerError;

/// Configuration for the line consumer.
#[derive(Debug, Clone)]
pub struct LineConsumerConfig {
    /// Maximum number of messages per batch.
    pub batch_size: usize,
    /// How long a partial batch waits for more lines.
    pub linger: Duration,
}

impl Default for LineConsumerConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            linger: Duration::from_millis(200),
        }
    }
}

/// Consumer reading event messages from any async reader.
pub struct LineConsumer<R> {
    reader: R,
    config: LineConsumerConfig,
}

impl<R> LineConsumer<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, LineConsumerConfig::default())
    }

    pub fn with_config(reader: R, config: LineConsumerConfig) -> Self {
        Self { reader, config }
    }

    /// Read lines until the input ends or a shutdown signal arrives, and
    /// send them through the channel.
    ///
    /// `StreamMessage::End` is always the last message sent.
    ///
    /// # Arguments
    ///
    /// * `sender` - Channel to send batches to
    /// * `shutdown` - Shutdown signal receiver
    #[instrument(skip_all, fields(batch_size = self.config.batch_size))]
    pub async fn run(
        self,
        sender: mpsc::Sender<StreamMessage>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ConsumerError> {
        let batch_size = self.config.batch_size.max(1);
        let batches = LinesStream::new(BufReader::new(self.reader).lines())
            .chunks_timeout(batch_size, self.config.linger);
        tokio::pin!(batches);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Consumer received shutdown signal");
                    let _ = sender.send(StreamMessage::End).await;
                    break;
                }
                batch = batches.next() => {
                    match batch {
                        Some(lines) => {
                            let mut bodies = Vec::with_capacity(lines.len());
                            for line in lines {
                                match line {
                                    Ok(line) if line.trim().is_empty() => {}
                                    Ok(line) => bodies.push(line),
                                    Err(e) => {
                                        error!(error = %e, "Failed to read input line");
                                        let _ = sender
                                            .send(StreamMessage::Error(e.to_string()))
                                            .await;
                                    }
                                }
                            }

                            if bodies.is_empty() {
                                continue;
                            }
                            debug!(count = bodies.len(), "Forwarding batch");
                            sender
                                .send(StreamMessage::Events(bodies))
                                .await
                                .map_err(|e| ConsumerError::ChannelClosed(e.to_string()))?;
                        }
                        None => {
                            info!("Input stream ended");
                            let _ = sender.send(StreamMessage::End).await;
                            break;
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(mut rx: mpsc::Receiver<StreamMessage>) -> Vec<StreamMessage> {
        let mut messages = Vec::new();
        while let Some(message) = rx.recv().await {
            messages.push(message);
        }
        messages
    }

    #[tokio::test]
    async fn test_batches_lines_and_skips_blank_ones() {
        let input: &'static [u8] = b"a\n\nb\nc\nd\ne\n";
        let consumer = LineConsumer::with_config(
            input,
            LineConsumerConfig {
                batch_size: 2,
                linger: Duration::from_secs(5),
            },
        );
        let (tx, rx) = mpsc::channel(16);
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

        consumer.run(tx, shutdown_rx).await.unwrap();

        assert_eq!(
            collect(rx).await,
            vec![
                StreamMessage::Events(vec!["a".to_string()]),
                StreamMessage::Events(vec!["b".to_string(), "c".to_string()]),
                StreamMessage::Events(vec!["d".to_string(), "e".to_string()]),
                StreamMessage::End,
            ]
        );
    }

    #[tokio::test]
    async fn test_last_line_without_newline_is_kept() {
        let input: &'static [u8] = b"first\nsecond";
        let consumer = LineConsumer::new(input);
        let (tx, rx) = mpsc::channel(16);
        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);

        consumer.run(tx, shutdown_rx).await.unwrap();

        assert_eq!(
            collect(rx).await,
            vec![
                StreamMessage::Events(vec!["first".to_string(), "second".to_string()]),
                StreamMessage::End,
            ]
        );
    }

    #[tokio::test]
    async fn test_shutdown_ends_open_input() {
        let (_writer, reader) = tokio::io::duplex(64);
        let consumer = LineConsumer::new(reader);
        let (tx, rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        shutdown_tx.send(()).unwrap();

        consumer.run(tx, shutdown_rx).await.unwrap();

        assert_eq!(collect(rx).await, vec![StreamMessage::End]);
    }
}

//! Progress sinks - append-only streams of human-readable step narration

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::warn;

/// An append-only text stream that steps narrate their progress to.
///
/// The engine imposes no structure on the content beyond "append, never
/// seek". Sink failures are swallowed by implementations so a broken pipe
/// cannot fail a provisioning run.
#[async_trait]
pub trait ProgressSink: Send {
    async fn append(&mut self, line: &str);
}

/// Sink backed by any async writer (stdout, a log file, a socket).
pub struct WriterSink<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> ProgressSink for WriterSink<W> {
    async fn append(&mut self, line: &str) {
        let result = async {
            self.writer.write_all(line.as_bytes()).await?;
            self.writer.write_all(b"\n").await?;
            self.writer.flush().await
        }
        .await;

        if let Err(err) = result {
            warn!("progress sink write failed: {}", err);
        }
    }
}

/// In-memory sink, for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

#[async_trait]
impl ProgressSink for MemorySink {
    async fn append(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

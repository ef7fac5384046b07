//! External command producer
//!
//! Runs the configured command once per resource with the content on stdin
//! and `EMBEDCACHE_IDENTIFIER` set, and expects a JSON array of numbers on
//! stdout.

use crate::compute::Producer;
use crate::error::{BoxError, EmbedCacheError, EmbedCacheResult};
use crate::identifier::Identifier;
use crate::producer::Embedding;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Environment variable carrying the identifier to the producer command
pub const IDENTIFIER_ENV: &str = "EMBEDCACHE_IDENTIFIER";

/// Producer backed by an external command
#[derive(Debug, Clone)]
pub struct CommandProducer {
    program: String,
    args: Vec<String>,
}

impl CommandProducer {
    /// Build from a command line such as `["embed", "--model", "small"]`
    pub fn from_command(command: &[String]) -> EmbedCacheResult<Self> {
        let (program, args) = command
            .split_first()
            .ok_or(EmbedCacheError::ProducerNotConfigured)?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    async fn run(&self, content: String, id: &Identifier) -> EmbedCacheResult<Embedding> {
        debug!("Executing: {} {:?} for {}", self.program, self.args, id);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env(IDENTIFIER_ENV, id.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EmbedCacheError::ProducerCommand {
                identifier: id.to_string(),
                reason: format!("failed to start {}: {}", self.program, e),
            })?;

        // Feed stdin concurrently so a chatty child cannot block on a full
        // stdout pipe while we are still writing.
        let writer = child.stdin.take().map(|mut stdin| {
            tokio::spawn(async move {
                let result = stdin.write_all(content.as_bytes()).await;
                drop(stdin);
                result
            })
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| EmbedCacheError::ProducerCommand {
                identifier: id.to_string(),
                reason: e.to_string(),
            })?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!("Producer for {} closed stdin early: {}", id, e),
                Err(e) => warn!("Producer stdin writer for {} failed: {}", id, e),
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EmbedCacheError::ProducerCommand {
                identifier: id.to_string(),
                reason: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        serde_json::from_slice::<Embedding>(&output.stdout).map_err(|e| {
            EmbedCacheError::ProducerOutput {
                identifier: id.to_string(),
                reason: e.to_string(),
            }
        })
    }
}

#[async_trait]
impl Producer<Embedding> for CommandProducer {
    async fn produce(&self, content: String, id: &Identifier) -> Result<Embedding, BoxError> {
        self.run(content, id).await.map_err(Into::into)
    }
}

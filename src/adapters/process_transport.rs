//! Generator collaborator as a child process.
//!
//! One process per exchange: the request is written to stdin, stdin is closed,
//! stdout and stderr are drained concurrently, and the exchange ends when the
//! process has exited and both streams are at EOF.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::debug;

use crate::config::GeneratorSettings;
use crate::domain::{GeneratorOutput, GeneratorTransport, TransportError};

#[derive(Debug, Clone)]
pub struct ProcessTransport {
    command: String,
    args: Vec<String>,
}

impl ProcessTransport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
        }
    }

    pub fn from_settings(settings: &GeneratorSettings) -> Self {
        Self::new(settings.command.clone()).args(settings.args.clone())
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

#[async_trait]
impl GeneratorTransport for ProcessTransport {
    async fn exchange(&self, payload: Vec<u8>) -> Result<GeneratorOutput, TransportError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TransportError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        debug!(command = %self.command, pid = ?child.id(), "spawned generator");

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_task = tokio::spawn(read_all(stdout));
        let stderr_task = tokio::spawn(read_all(stderr));

        if let Some(mut stdin) = child.stdin.take() {
            // A collaborator may exit without reading its input; its output
            // still decides the result, so a broken pipe is not fatal.
            match stdin.write_all(&payload).await {
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    debug!("generator closed stdin before reading the request");
                }
                other => other?,
            }
            drop(stdin);
        }

        let status = child.wait().await?;

        let stdout = stdout_task
            .await
            .map_err(|e| TransportError::Task(format!("stdout task failed: {}", e)))??;
        let stderr = stderr_task
            .await
            .map_err(|e| TransportError::Task(format!("stderr task failed: {}", e)))??;

        Ok(GeneratorOutput {
            stdout,
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_code: status.code(),
        })
    }
}

async fn read_all<T>(source: Option<T>) -> Result<Vec<u8>, std::io::Error>
where
    T: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut stream) = source {
        stream.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

use std::process::{ExitStatus, Stdio};

use futures::StreamExt;
use futures::future::BoxFuture;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

use crate::config::ScannerConfig;
use crate::error::{Result, ScanError};

/// How a scanner process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanExit {
    Success,
    Failed(i32),
    /// Killed by a signal, no exit code.
    Terminated,
}

impl ScanExit {
    pub fn into_error(self) -> Option<ScanError> {
        match self {
            ScanExit::Success => None,
            ScanExit::Failed(code) => Some(ScanError::ExitStatus(code)),
            ScanExit::Terminated => Some(ScanError::Terminated),
        }
    }
}

impl From<ExitStatus> for ScanExit {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(0) => ScanExit::Success,
            Some(code) => ScanExit::Failed(code),
            None => ScanExit::Terminated,
        }
    }
}

/// Something that can start a username scan.
pub trait Scanner: Send + Sync {
    fn spawn(&self, username: &str) -> Result<Box<dyn ScanRun>>;
}

/// A running scan. Owned by exactly one reader.
///
/// Dropping a run that has not been waited on must stop the underlying work.
pub trait ScanRun: Send {
    /// Next line of output, `None` at end of output.
    fn next_line(&mut self) -> BoxFuture<'_, Result<Option<String>>>;

    fn wait(&mut self) -> BoxFuture<'_, Result<ScanExit>>;

    /// Kills the scan and reaps it.
    fn kill(&mut self) -> BoxFuture<'_, Result<()>>;
}

/// Runs the scanner as a child process, one process per scan.
pub struct CommandScanner {
    config: ScannerConfig,
}

impl CommandScanner {
    pub fn new(config: ScannerConfig) -> CommandScanner {
        CommandScanner { config }
    }

    /// Full argument list for one scan. The username goes after `--` so it is
    /// never taken for a flag.
    pub fn command_args(&self, username: &str) -> Vec<String> {
        let mut args = self.config.args.clone();
        args.extend([
            "--timeout".to_string(),
            self.config.timeout_secs.to_string(),
            "--print-found".to_string(),
            "--no-color".to_string(),
            "--".to_string(),
            username.to_string(),
        ]);
        args
    }
}

impl Scanner for CommandScanner {
    fn spawn(&self, username: &str) -> Result<Box<dyn ScanRun>> {
        let mut command = Command::new(&self.config.program);
        command
            .args(self.command_args(username))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.workdir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| ScanError::Spawn {
            program: self.config.program.clone(),
            source,
        })?;
        let stdout = child.stdout.take().ok_or(ScanError::MissingStdout)?;
        if let Some(stderr) = child.stderr.take() {
            drain_stderr(stderr, username.to_string(), self.config.max_line_bytes);
        }

        log::debug!(
            "spawned scanner {} (pid {:?}) for {username}",
            self.config.program,
            child.id()
        );

        Ok(Box::new(ChildRun {
            child,
            lines: FramedRead::new(
                stdout,
                LinesCodec::new_with_max_length(self.config.max_line_bytes),
            ),
            max_line_bytes: self.config.max_line_bytes,
            reaped: false,
        }))
    }
}

/// stderr is diagnostics only: log it and never forward it to the client.
///
/// The pipe stays open until EOF whatever the scanner writes, so a stray byte
/// or an endless line here cannot break the scan. Over-long lines are logged
/// in `max_line_bytes` pieces.
fn drain_stderr(stderr: ChildStderr, username: String, max_line_bytes: usize) {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stderr);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match (&mut reader)
                .take(max_line_bytes as u64)
                .read_until(b'\n', &mut buf)
                .await
            {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end_matches(['\n', '\r']);
                    if !line.is_empty() {
                        log::warn!("scanner stderr ({username}): {line}");
                    }
                }
                Err(e) => {
                    log::warn!("stopped reading scanner stderr ({username}): {e}");
                    break;
                }
            }
        }
    });
}

struct ChildRun {
    child: Child,
    lines: FramedRead<ChildStdout, LinesCodec>,
    max_line_bytes: usize,
    reaped: bool,
}

impl ScanRun for ChildRun {
    fn next_line(&mut self) -> BoxFuture<'_, Result<Option<String>>> {
        Box::pin(async move {
            match self.lines.next().await {
                None => Ok(None),
                Some(Ok(line)) => Ok(Some(line)),
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    Err(ScanError::LineTooLong(self.max_line_bytes))
                }
                Some(Err(LinesCodecError::Io(e))) => Err(ScanError::Read(e)),
            }
        })
    }

    fn wait(&mut self) -> BoxFuture<'_, Result<ScanExit>> {
        Box::pin(async move {
            let status = self.child.wait().await.map_err(ScanError::Wait)?;
            self.reaped = true;
            Ok(status.into())
        })
    }

    fn kill(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.child.kill().await.map_err(ScanError::Kill)?;
            self.reaped = true;
            Ok(())
        })
    }
}

impl Drop for ChildRun {
    fn drop(&mut self) {
        // kill_on_drop sends the signal; the runtime reaps the orphan.
        if !self.reaped {
            log::info!(
                "scan abandoned, killing scanner (pid {:?})",
                self.child.id()
            );
        }
    }
}

use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{DispatchError, Result};

/// Max time to wait for pipe readers once the child is gone. Grandchildren that
/// inherited the pipes can otherwise keep them open indefinitely.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(250);

/// Captured result of one child process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// `None` when killed or terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// The wall limit elapsed and the child was killed.
    pub timed_out: bool,
    pub elapsed: Duration,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Best human-readable description of a failed run.
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        match self.exit_code {
            Some(code) => format!("Process exited with code {code}"),
            None => "Process terminated by signal".to_string(),
        }
    }
}

/// Spawn `argv` inside `cwd`, feed it `stdin`, and wait at most `limit`.
///
/// The child is killed when the limit elapses (and on drop). Each output stream is
/// drained fully but only the first `max_output` bytes are kept.
pub async fn run_process(
    argv: &[String],
    cwd: &Path,
    stdin: &[u8],
    limit: Duration,
    max_output: usize,
) -> Result<ProcessOutput> {
    let (program, args) = argv.split_first().ok_or(DispatchError::EmptyCommand)?;

    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| DispatchError::Spawn {
            program: program.clone(),
            source,
        })?;
    let started = Instant::now();

    let input = stdin.to_vec();
    let stdin_pipe = child.stdin.take();
    let writer = tokio::spawn(async move {
        if let Some(mut pipe) = stdin_pipe {
            // The program may exit without reading everything; a broken pipe is fine.
            let _ = pipe.write_all(&input).await;
            let _ = pipe.shutdown().await;
        }
    });
    let mut stdout_reader = tokio::spawn(read_capped(child.stdout.take(), max_output));
    let mut stderr_reader = tokio::spawn(read_capped(child.stderr.take(), max_output));

    let (exit_code, timed_out) = match tokio::time::timeout(limit, child.wait()).await {
        Ok(status) => (status?.code(), false),
        Err(_) => {
            debug!(program = %program, limit_ms = limit.as_millis() as u64, "Killing process after wall limit");
            if let Err(e) = child.kill().await {
                warn!(program = %program, error = %e, "Failed to kill timed out process");
            }
            (None, true)
        }
    };
    let elapsed = started.elapsed();

    writer.abort();
    let stdout = drain(&mut stdout_reader).await;
    let stderr = drain(&mut stderr_reader).await;

    Ok(ProcessOutput {
        exit_code,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        timed_out,
        elapsed,
    })
}

async fn drain(reader: &mut JoinHandle<Vec<u8>>) -> Vec<u8> {
    match tokio::time::timeout(DRAIN_TIMEOUT, &mut *reader).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(_)) => Vec::new(),
        Err(_) => {
            reader.abort();
            Vec::new()
        }
    }
}

async fn read_capped<R>(reader: Option<R>, cap: usize) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Vec::new();
    };
    let mut kept = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let room = cap.saturating_sub(kept.len());
                kept.extend_from_slice(&buf[..n.min(room)]);
            }
        }
    }
    kept
}

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use common::ExecutionOutcome;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

use crate::config::WorkerConfig;
use crate::error::{DispatchError, Result};
use crate::language::{Language, runner_for};
use crate::process::run_process;

/// "Run this code, with this input, under this time limit, in this language."
///
/// Program-level failures come back as an `Ok` outcome with status `error` or
/// `timeout`. `Err` is reserved for infrastructure faults.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn execute(
        &self,
        code: &str,
        language: &str,
        stdin: &str,
        time_limit_ms: u64,
    ) -> Result<ExecutionOutcome>;
}

/// Dispatcher that compiles and runs code as local child processes.
pub struct ProcessDispatcher {
    config: WorkerConfig,
    permits: Arc<Semaphore>,
}

impl ProcessDispatcher {
    pub fn new(config: WorkerConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_executions.max(1)));
        Self { config, permits }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }
}

#[async_trait]
impl Dispatcher for ProcessDispatcher {
    #[instrument(skip(self, code, stdin))]
    async fn execute(
        &self,
        code: &str,
        language: &str,
        stdin: &str,
        time_limit_ms: u64,
    ) -> Result<ExecutionOutcome> {
        let language: Language = match language.parse() {
            Ok(language) => language,
            Err(e) => return Ok(ExecutionOutcome::error(e.to_string(), 0)),
        };
        let runner = runner_for(language, &self.config.toolchain);

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| DispatchError::Shutdown)?;

        let workspace = tempfile::Builder::new()
            .prefix("judge-")
            .tempdir_in(self.config.work_dir())?;
        let dir = workspace.path();
        tokio::fs::write(dir.join(runner.source_file()), runner.prepare_source(code)).await?;

        if let Some(compile) = runner.compile_command(dir) {
            let compiled = run_process(
                &compile,
                dir,
                b"",
                Duration::from_millis(self.config.compile_timeout_ms),
                self.config.max_output_bytes,
            )
            .await?;

            if compiled.timed_out {
                warn!(compile_timeout_ms = self.config.compile_timeout_ms, "Compilation timed out");
                return Ok(ExecutionOutcome::error("Compilation timed out", 0));
            }
            if !compiled.success() {
                debug!(exit_code = ?compiled.exit_code, "Compilation failed");
                let message = format!("Compilation failed:\n{}", compiled.failure_message());
                return Ok(ExecutionOutcome::error(message, 0));
            }
        }

        // Only the run phase counts against the time limit.
        let started = Instant::now();
        let run = run_process(
            &runner.run_command(dir),
            dir,
            stdin.as_bytes(),
            Duration::from_millis(time_limit_ms.saturating_add(self.config.grace_ms)),
            self.config.max_output_bytes,
        )
        .await?;
        let execution_time_ms = elapsed_ms(started);

        let outcome = if run.timed_out || execution_time_ms > time_limit_ms {
            ExecutionOutcome::timeout(time_limit_ms, execution_time_ms).with_output(run.stdout)
        } else if !run.success() {
            ExecutionOutcome::error(run.failure_message(), execution_time_ms)
                .with_output(run.stdout)
        } else {
            ExecutionOutcome::success(run.stdout, execution_time_ms)
        };

        debug!(status = %outcome.status, execution_time_ms, "Execution finished");
        if let Err(e) = workspace.close() {
            warn!(error = %e, "Failed to remove execution workspace");
        }
        Ok(outcome)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

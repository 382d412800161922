use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, ChildStdin, ChildStdout, Command as ProcessCommand};

use hl_core::{CheckRequest, Error, Result, RunOutcome};
use hl_protocol::{Command, LogLevel, MasterConnection, SlaveFrame};

/// How long `finalize` waits for the runner to acknowledge and exit before
/// force-killing it. The kill is the only forced-termination path.
pub const FINALIZE_TIMEOUT: Duration = Duration::from_secs(30);

/// Master-process side of the runner: spawns the child, drives it over the
/// wire protocol, and interprets its outcome.
pub struct ProxyRunner {
    child: Child,
    connection: MasterConnection<ChildStdout, ChildStdin>,
    finalize_timeout: Duration,
}

impl ProxyRunner {
    /// Spawn the runner binary with piped stdio. Stderr stays inherited so
    /// the child's own diagnostics reach the console directly.
    pub fn spawn(runner_bin: &Path) -> Result<ProxyRunner> {
        let mut command = ProcessCommand::new(runner_bin);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        Self::from_command(command)
    }

    /// Spawn from an arbitrary command speaking the slave protocol.
    pub fn from_command(mut command: ProcessCommand) -> Result<ProxyRunner> {
        command.stdin(Stdio::piped()).stdout(Stdio::piped()).kill_on_drop(true);
        let mut child = command.spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Internal("runner stdout not piped".into()))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Internal("runner stdin not piped".into()))?;
        tracing::info!("runner process started");
        Ok(ProxyRunner {
            child,
            connection: MasterConnection::new(stdout, stdin),
            finalize_timeout: FINALIZE_TIMEOUT,
        })
    }

    /// Override the finalize deadline (tests use a short one).
    pub fn with_finalize_timeout(mut self, timeout: Duration) -> Self {
        self.finalize_timeout = timeout;
        self
    }

    /// Execute one analysis run: send RUN plus the serialized request, pump
    /// log frames to the logger, and return the outcome carried by the first
    /// VALUE frame.
    pub async fn run(&mut self, request: &CheckRequest) -> Result<RunOutcome> {
        self.connection.write_command(Command::Run).await?;
        self.connection.write_value(&request.to_json()?).await?;
        loop {
            match self.connection.read().await? {
                SlaveFrame::Log(level, message) => emit(level, &message),
                SlaveFrame::Plain(line) => tracing::info!("{line}"),
                SlaveFrame::Value(payload) => return RunOutcome::from_json(&payload),
            }
        }
    }

    /// Ask the runner to shut down and wait for both its acknowledgement and
    /// its exit. If either is missing at the deadline the child is killed, so
    /// the orchestrator never hangs on a wedged runner.
    pub async fn finalize(mut self) -> Result<()> {
        // The child may already be gone after a crash; the wait below still
        // applies either way.
        let _ = self.connection.write_command(Command::Finalize).await;

        let connection = &mut self.connection;
        let child = &mut self.child;
        let wait = async {
            loop {
                match connection.read().await {
                    Ok(SlaveFrame::Value(_)) => break,
                    Ok(SlaveFrame::Log(level, message)) => emit(level, &message),
                    Ok(SlaveFrame::Plain(line)) => tracing::info!("{line}"),
                    Err(_) => break,
                }
            }
            let _ = child.wait().await;
        };

        match tokio::time::timeout(self.finalize_timeout, wait).await {
            Ok(()) => Ok(()),
            Err(_) => {
                tracing::error!(
                    "runner did not finalize within {:?}, killing it",
                    self.finalize_timeout
                );
                let _ = self.child.start_kill();
                let _ = self.child.wait().await;
                Err(Error::FinalizeTimeout(self.finalize_timeout.as_secs()))
            }
        }
    }
}

/// Locate the runner binary: explicit path, else a sibling of the current
/// executable, else whatever `PATH` resolves.
pub fn locate_runner(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("hl-runner");
            if sibling.is_file() {
                return sibling;
            }
        }
    }
    PathBuf::from("hl-runner")
}

fn emit(level: LogLevel, message: &str) {
    match level {
        LogLevel::Error => tracing::error!("{message}"),
        LogLevel::Warning => tracing::warn!("{message}"),
        LogLevel::Info => tracing::info!("{message}"),
    }
}

use std::panic::{self, AssertUnwindSafe};

use tracing_subscriber::EnvFilter;

use hl_core::RunOutcome;
use hl_protocol::stdio_slave;
use hl_runner::{ProxyLogger, SlaveLoop};

fn main() {
    // Stdout belongs to the wire protocol; all diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let test_mode = std::env::var("HEADLAMP_TEST_MODE")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let (reader, sender) = stdio_slave();
    let crash_logger = ProxyLogger::new(sender.clone());
    let crash_sender = sender.clone();
    let mut slave = SlaveLoop::new(reader, sender, test_mode);

    match panic::catch_unwind(AssertUnwindSafe(|| slave.serve())) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            eprintln!("runner failed: {e}");
            std::process::exit(1);
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            crash_logger.error(&format!("Runner panicked: {message}"));
            let _ = crash_sender.send_value(&RunOutcome::Crash.to_json());
            std::process::exit(2);
        }
    }
}

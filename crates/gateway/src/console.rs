//! Debug console on stdin.
//!
//! One command is understood: `show -all` prints every live engine entry
//! as `key=<key>, value=<value>`.  Anything else is ignored.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use cc_store::CredentialStore;

pub const SHOW_ALL: &str = "show -all";

/// Read stdin line by line until EOF, running each line as a command.
pub fn spawn(store: Arc<CredentialStore>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let mut out = std::io::stdout().lock();
                    if let Err(e) = run_command(&line, &store, &mut out) {
                        tracing::warn!(error = %e, "console output failed");
                    }
                }
                Ok(None) => {
                    tracing::debug!("stdin closed, debug console stopped");
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "error reading console input");
                    break;
                }
            }
        }
    })
}

/// Execute one console line.  Returns whether the line was a known command.
pub fn run_command(
    line: &str,
    store: &CredentialStore,
    out: &mut impl Write,
) -> std::io::Result<bool> {
    if line.trim() != SHOW_ALL {
        tracing::debug!(command = %line, "unknown console command");
        return Ok(false);
    }

    match store.dump() {
        Ok(entries) => {
            for (key, value) in entries {
                writeln!(out, "key={key}, value={value}")?;
            }
        }
        Err(e) => writeln!(out, "error while iterating: {e}")?,
    }
    out.flush()?;
    Ok(true)
}

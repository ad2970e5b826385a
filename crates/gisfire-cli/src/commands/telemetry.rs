use std::path::Path;
use std::time::Instant;

use gisfire_cli::manifest::{RunManifest, RunStatus};
use tracing::{info, warn};

/// Record a manifest for a finished run of `command` that wrote `out`.
/// A manifest that cannot be written only produces a warning.
pub fn record_run_timed(
    out: &Path,
    command: &str,
    params: &[(&str, &str)],
    start: Instant,
    result: &anyhow::Result<()>,
) {
    let mut manifest = RunManifest::new(command, out, params);
    manifest.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    manifest.status = if result.is_ok() {
        RunStatus::Success
    } else {
        RunStatus::Failure
    };
    match manifest.write() {
        Ok(path) => info!("Recorded run manifest {}", path.display()),
        Err(err) => warn!("Failed to record run manifest: {err}"),
    }
}

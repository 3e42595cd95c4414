//! RAII guard for build container cleanup.

use std::path::PathBuf;
use std::time::Duration;
use wait_timeout::ChildExt;

/// Upper bound for `rm -f`; a live daemon answers almost instantly
const CLEANUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Force-removes a named container when dropped.
///
/// Containers are started with `--rm`, so on a normal exit this is a no-op
/// against an already removed container. It matters when the run is
/// abandoned (timeout, panic, interrupted await).
pub(super) struct ContainerGuard {
    pub(super) binary: PathBuf,
    pub(super) name: String,
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        let mut child = match std::process::Command::new(&self.binary)
            .args(["rm", "-f", &self.name])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
        {
            Ok(child) => child,
            Err(_) => return,
        };

        match child.wait_timeout(CLEANUP_TIMEOUT) {
            Ok(Some(_)) => {}
            Ok(None) => {
                // Engine unresponsive, reap the hanging rm
                let _ = child.kill();
                let _ = child.wait();

                log::warn!(
                    "timed out removing container '{}' after {} seconds",
                    self.name,
                    CLEANUP_TIMEOUT.as_secs()
                );
            }
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }
}

//! Docker/Podman CLI runtime.
//!
//! Every command runs in a fresh, uniquely named container removed on exit.

use super::guard::ContainerGuard;
use super::{ContainerRuntime, EngineKind, RunSpec};
use crate::cli::OutputManager;
use crate::context::CACHE_DIR_CONTAINER;
use crate::error::EngineError;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::timeout;
use uuid::Uuid;

/// Timeout for a single command inside a build container (30 minutes)
/// Packaging compiles the whole application with cgo, which can be slow
pub const RUN_TIMEOUT: Duration = Duration::from_secs(1800);

/// Timeout for pulling a build image (30 minutes)
pub const PULL_TIMEOUT: Duration = Duration::from_secs(1800);

/// Timeout for checking whether an image exists locally
const INSPECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Docker or Podman, driven through its command line.
#[derive(Debug, Clone)]
pub struct LocalRuntime {
    kind: EngineKind,
    binary: PathBuf,
    output: OutputManager,
    run_timeout: Duration,
}

impl LocalRuntime {
    /// Locates the engine CLI on `PATH`.
    ///
    /// [`EngineKind::Auto`] prefers docker over podman.
    pub fn detect(kind: EngineKind, echo: bool) -> Result<Self, EngineError> {
        let candidates: &[EngineKind] = match kind {
            EngineKind::Auto => &[EngineKind::Docker, EngineKind::Podman],
            EngineKind::Docker => &[EngineKind::Docker],
            EngineKind::Podman => &[EngineKind::Podman],
        };

        for candidate in candidates {
            match which::which(candidate.as_str()) {
                Ok(binary) => {
                    log::debug!("using {} at {}", candidate, binary.display());
                    return Ok(Self::new(*candidate, binary, echo));
                }
                Err(e) => log::debug!("{candidate} not found: {e}"),
            }
        }

        Err(EngineError::Unavailable {
            engine: match kind {
                EngineKind::Auto => "docker or podman".to_string(),
                other => other.to_string(),
            },
            reason: "not found in PATH".to_string(),
        })
    }

    /// Creates a runtime for a known engine binary.
    pub fn new(kind: EngineKind, binary: PathBuf, echo: bool) -> Self {
        Self {
            kind,
            binary,
            output: OutputManager::new(echo),
            run_timeout: RUN_TIMEOUT,
        }
    }

    /// Overrides [`RUN_TIMEOUT`] for commands run in containers.
    pub fn with_run_timeout(mut self, limit: Duration) -> Self {
        self.run_timeout = limit;
        self
    }

    /// User mapping so files written to the mounts belong to the host user.
    ///
    /// Docker runs as the host UID/GID; rootless Podman keeps the host user id
    /// instead. Windows hosts use the image's default user.
    fn user_args(&self) -> Vec<String> {
        match self.kind {
            EngineKind::Podman => vec!["--userns".to_string(), "keep-id".to_string()],
            _ => host_user_args(),
        }
    }

    /// Arguments for `<engine> run`.
    pub(crate) fn run_args(&self, container_name: &str, spec: &RunSpec<'_>) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--rm".to_string(),
            "--name".to_string(),
            container_name.to_string(),
            "-w".to_string(),
            spec.work_dir.clone(),
            "-v".to_string(),
            mount(spec.volume.work_dir_host(), &spec.volume.work_dir_container()),
            "-v".to_string(),
            mount(spec.volume.cache_dir_host(), &spec.volume.cache_dir_container()),
        ];

        args.extend(self.user_args());

        args.push("-e".to_string());
        args.push(format!("GOCACHE={CACHE_DIR_CONTAINER}/go-build"));
        for (key, value) in spec.env {
            args.push("-e".to_string());
            args.push(format!("{key}={value}"));
        }

        args.push(spec.image.to_string());
        args.extend(spec.argv.iter().cloned());
        args
    }

    async fn status_of(&self, args: &[String], limit: Duration) -> Result<bool, EngineError> {
        let command = command_line(&self.binary, args);
        let status = timeout(
            limit,
            Command::new(&self.binary)
                .args(args)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status(),
        )
        .await
        .map_err(|_| EngineError::Timeout {
            command: command.clone(),
            seconds: limit.as_secs(),
        })?
        .map_err(|source| EngineError::Spawn { command, source })?;

        Ok(status.success())
    }
}

impl ContainerRuntime for LocalRuntime {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    async fn image_exists(&self, image: &str) -> Result<bool, EngineError> {
        let args = vec!["image".to_string(), "inspect".to_string(), image.to_string()];
        self.status_of(&args, INSPECT_TIMEOUT).await
    }

    async fn pull(&self, image: &str) -> Result<(), EngineError> {
        let args = vec!["pull".to_string(), image.to_string()];
        let command = command_line(&self.binary, &args);
        self.output.verbose(&format!("Pulling {image}...")).ok();

        let output = timeout(PULL_TIMEOUT, Command::new(&self.binary).args(&args).output())
            .await
            .map_err(|_| EngineError::Timeout {
                command: command.clone(),
                seconds: PULL_TIMEOUT.as_secs(),
            })?
            .map_err(|source| EngineError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(EngineError::CommandFailed {
                command,
                exit_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }

    async fn run(&self, spec: &RunSpec<'_>) -> Result<String, EngineError> {
        let container_name = format!("kodegen-cross-{}", Uuid::new_v4());

        // Removes the container if we bail out before it exits on its own
        let _guard = ContainerGuard {
            binary: self.binary.clone(),
            name: container_name.clone(),
        };

        let args = self.run_args(&container_name, spec);
        // Report the command as it would run inside the container
        let command = spec.argv.join(" ");
        log::debug!("{}", command_line(&self.binary, &args));

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                command: command.clone(),
                source,
            })?;

        // Capture stderr in the background for error reporting
        let stderr_handle = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                let mut captured = Vec::new();
                while let Ok(Some(line)) = lines.next_line().await {
                    captured.push(line);
                }
                captured
            })
        });

        let stdout = child.stdout.take();
        let output = &self.output;
        let running = &mut child;
        // The bound covers draining stdout too: a hung container keeps it open
        let finished = timeout(self.run_timeout, async move {
            let mut stdout_lines = Vec::new();
            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    output.verbose(&line).ok();
                    stdout_lines.push(line);
                }
            }
            running.wait().await.map(|status| (status, stdout_lines))
        })
        .await;

        let (status, stdout_lines) = match finished {
            Ok(Ok(finished)) => finished,
            Ok(Err(source)) => return Err(EngineError::Spawn { command, source }),
            Err(_elapsed) => {
                if let Err(e) = child.kill().await {
                    log::warn!("failed to kill {} run process: {}", self.kind, e);
                }
                let _ = timeout(Duration::from_secs(10), child.wait()).await;
                return Err(EngineError::Timeout {
                    command,
                    seconds: self.run_timeout.as_secs(),
                });
            }
        };

        let stderr_lines = match stderr_handle {
            Some(handle) => handle.await.unwrap_or_default(),
            None => Vec::new(),
        };

        if !status.success() {
            return Err(EngineError::CommandFailed {
                command,
                exit_code: status.code().unwrap_or(-1),
                stderr: stderr_lines.join("\n"),
            });
        }

        Ok(stdout_lines.join("\n"))
    }
}

#[cfg(unix)]
fn host_user_args() -> Vec<String> {
    let uid = users::get_current_uid();
    let gid = users::get_current_gid();
    vec!["--user".to_string(), format!("{}:{}", uid, gid)]
}

#[cfg(not(unix))]
fn host_user_args() -> Vec<String> {
    Vec::new()
}

fn mount(host: &Path, container: &str) -> String {
    format!("{}:{}", host.display(), container)
}

fn command_line(binary: &Path, args: &[String]) -> String {
    std::iter::once(binary.display().to_string())
        .chain(args.iter().map(|arg| {
            if arg.chars().any(char::is_whitespace) {
                format!("{arg:?}")
            } else {
                arg.clone()
            }
        }))
        .collect::<Vec<_>>()
        .join(" ")
}

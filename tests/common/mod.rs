//! Shared test helpers.

#![allow(dead_code)]

use kodegen_bundler_cross::cli::PlatformCommand;
use kodegen_bundler_cross::context::WORK_DIR_CONTAINER;
use kodegen_bundler_cross::{
    ContainerEngine, ContainerRuntime, EngineError, LinuxCommand, RunSpec, Volume,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// One command sent to the runtime
#[derive(Debug, Clone)]
pub struct RecordedRun {
    pub image: String,
    pub work_dir: String,
    pub env: BTreeMap<String, String>,
    pub argv: Vec<String>,
}

impl RecordedRun {
    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }
}

/// How the recording runtime answers
#[derive(Debug, Clone)]
pub struct Behaviour {
    /// `image inspect` finds the image
    pub image_present: bool,
    /// Commands starting with this fail with exit code 1
    pub fail_prefix: Option<String>,
    /// A successful `fyne` writes `<name>.tar.xz` into its work dir
    pub writes_archive: bool,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            image_present: true,
            fail_prefix: None,
            writes_archive: true,
        }
    }
}

/// Runtime that records every call instead of starting containers.
///
/// `fyne` and `mv` act on the host side of the work dir mount so the files
/// a real build leaves behind exist.
#[derive(Debug, Default)]
pub struct RecordingRuntime {
    runs: Mutex<Vec<RecordedRun>>,
    pulls: Mutex<Vec<String>>,
    behaviour: Behaviour,
}

impl RecordingRuntime {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            ..Self::default()
        }
    }

    pub fn runs(&self) -> Vec<RecordedRun> {
        self.runs.lock().map(|runs| runs.clone()).unwrap_or_default()
    }

    pub fn pulls(&self) -> Vec<String> {
        self.pulls.lock().map(|pulls| pulls.clone()).unwrap_or_default()
    }
}

impl ContainerRuntime for RecordingRuntime {
    fn name(&self) -> &str {
        "recording"
    }

    async fn image_exists(&self, _image: &str) -> Result<bool, EngineError> {
        Ok(self.behaviour.image_present)
    }

    async fn pull(&self, image: &str) -> Result<(), EngineError> {
        if let Ok(mut pulls) = self.pulls.lock() {
            pulls.push(image.to_string());
        }
        Ok(())
    }

    async fn run(&self, spec: &RunSpec<'_>) -> Result<String, EngineError> {
        let run = RecordedRun {
            image: spec.image.to_string(),
            work_dir: spec.work_dir.clone(),
            env: spec.env.clone(),
            argv: spec.argv.to_vec(),
        };
        let command = run.command_line();
        if let Ok(mut runs) = self.runs.lock() {
            runs.push(run);
        }

        let failed = |stderr: &str| EngineError::CommandFailed {
            command: command.clone(),
            exit_code: 1,
            stderr: stderr.to_string(),
        };

        if let Some(prefix) = &self.behaviour.fail_prefix
            && command.starts_with(prefix.as_str())
        {
            return Err(failed("simulated failure"));
        }

        match spec.argv.first().map(String::as_str) {
            Some("fyne") if self.behaviour.writes_archive => {
                let name = flag_value(spec.argv, "-name").unwrap_or("app");
                let dir = host_path(spec.volume, &spec.work_dir);
                let archive = dir.join(format!("{name}.tar.xz"));
                std::fs::create_dir_all(&dir)
                    .and_then(|()| std::fs::write(&archive, b"archive"))
                    .map_err(|e| failed(&e.to_string()))?;
            }
            Some("mv") => {
                let (Some(from), Some(to)) = (spec.argv.get(1), spec.argv.get(2)) else {
                    return Err(failed("mv: missing operand"));
                };
                std::fs::rename(host_path(spec.volume, from), host_path(spec.volume, to))
                    .map_err(|e| failed(&format!("mv: cannot stat '{from}': {e}")))?;
            }
            _ => {}
        }
        Ok(String::new())
    }
}

fn flag_value<'a>(argv: &'a [String], flag: &str) -> Option<&'a str> {
    argv.windows(2)
        .find(|pair| pair[0] == flag)
        .map(|pair| pair[1].as_str())
}

/// Host location of a path below the container work dir
fn host_path(volume: &Volume, container_path: &str) -> PathBuf {
    let relative = container_path
        .strip_prefix(WORK_DIR_CONTAINER)
        .unwrap_or(container_path)
        .trim_start_matches('/');
    volume.work_dir_host().join(relative)
}

/// Application directory and cache directory for one test
pub struct Workspace {
    pub app: TempDir,
    pub cache: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        match (tempfile::tempdir(), tempfile::tempdir()) {
            (Ok(app), Ok(cache)) => Self { app, cache },
            _ => panic!("failed to create temp directories"),
        }
    }

    pub fn app_dir(&self) -> &Path {
        self.app.path()
    }

    /// Command line with the workspace directories followed by `extra`
    pub fn args(&self, extra: &[&str]) -> Vec<String> {
        let mut args = vec![
            "--dir".to_string(),
            self.app.path().display().to_string(),
            "--cache".to_string(),
            self.cache.path().display().to_string(),
        ];
        args.extend(extra.iter().map(|arg| arg.to_string()));
        args
    }
}

/// Linux command backed by a [`RecordingRuntime`]
pub fn recording_command(behaviour: Behaviour) -> LinuxCommand<RecordingRuntime> {
    LinuxCommand::with_engine(move |_ctx| {
        Ok(ContainerEngine::new(RecordingRuntime::new(behaviour.clone())))
    })
}

/// Parses `extra` against a fresh workspace and returns the command
pub fn parsed_with(
    workspace: &Workspace,
    extra: &[&str],
    behaviour: Behaviour,
) -> LinuxCommand<RecordingRuntime> {
    let mut command = recording_command(behaviour);
    if let Err(e) = command.parse(&workspace.args(extra)) {
        panic!("parse failed: {e}");
    }
    command
}

/// Parses `extra` with commands starting with `fail_prefix` failing
pub fn parsed(
    workspace: &Workspace,
    extra: &[&str],
    fail_prefix: Option<&str>,
) -> LinuxCommand<RecordingRuntime> {
    parsed_with(
        workspace,
        extra,
        Behaviour {
            fail_prefix: fail_prefix.map(str::to_string),
            ..Behaviour::default()
        },
    )
}

/// Runs recorded by the runtime shared by the command's images
pub fn recorded_runs(command: &LinuxCommand<RecordingRuntime>) -> Vec<RecordedRun> {
    command
        .images()
        .first()
        .map(|image| image.runtime().runs())
        .unwrap_or_default()
}

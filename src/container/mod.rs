//! Container build environments.
//!
//! A [`ContainerImage`] describes one isolated build environment bound to a
//! single (OS, architecture) pair. It owns a private environment map and runs
//! commands through a [`ContainerRuntime`], the engine collaborator that
//! actually talks to Docker or Podman.
//!
//! # Module Structure
//!
//! - `engine` - Docker/Podman CLI runtime
//! - `guard` - RAII guard for container cleanup

mod engine;
mod guard;

pub use engine::{LocalRuntime, PULL_TIMEOUT, RUN_TIMEOUT};

use crate::context::{Context, Volume};
use crate::error::EngineError;
use crate::target::{Architecture, TargetOs};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Container engine selection.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum EngineKind {
    /// First of docker, podman found on PATH
    #[default]
    Auto,
    /// Docker CLI
    Docker,
    /// Podman CLI
    Podman,
}

impl EngineKind {
    /// Executable name of the engine CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Auto => "auto",
            EngineKind::Docker => "docker",
            EngineKind::Podman => "podman",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-command options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Working directory inside the container; the volume work dir if unset
    pub work_dir: Option<String>,
}

impl RunOptions {
    /// Options running in `work_dir`
    pub fn in_dir(work_dir: impl Into<String>) -> Self {
        Self {
            work_dir: Some(work_dir.into()),
        }
    }
}

/// Everything the runtime needs for one container command.
#[derive(Debug, Clone)]
pub struct RunSpec<'a> {
    /// Image reference
    pub image: &'a str,
    /// Mounted directories
    pub volume: &'a Volume,
    /// Working directory inside the container
    pub work_dir: String,
    /// Process environment
    pub env: &'a BTreeMap<String, String>,
    /// Command and arguments
    pub argv: &'a [String],
}

/// The container engine collaborator.
///
/// Each call is a single attempt; implementations do not retry.
#[allow(async_fn_in_trait)]
pub trait ContainerRuntime {
    /// Engine name for messages
    fn name(&self) -> &str;

    /// Whether `image` is available locally
    async fn image_exists(&self, image: &str) -> Result<bool, EngineError>;

    /// Pulls `image`
    async fn pull(&self, image: &str) -> Result<(), EngineError>;

    /// Runs a command in a fresh container and returns its standard output
    async fn run(&self, spec: &RunSpec<'_>) -> Result<String, EngineError>;
}

/// Factory for [`ContainerImage`] descriptors sharing one runtime.
#[derive(Debug)]
pub struct ContainerEngine<R> {
    runtime: Arc<R>,
}

impl ContainerEngine<LocalRuntime> {
    /// Creates an engine for the CLI selected in the context.
    pub fn local(ctx: &Context) -> Result<Self, EngineError> {
        Ok(Self::new(LocalRuntime::detect(ctx.engine, ctx.debug)?))
    }
}

impl<R> ContainerEngine<R> {
    /// Wraps a runtime
    pub fn new(runtime: R) -> Self {
        Self {
            runtime: Arc::new(runtime),
        }
    }

    /// Creates the descriptor for one target.
    ///
    /// The descriptor starts with an empty environment and performs no I/O
    /// until [`ContainerImage::prepare`] or [`ContainerImage::run`] is called.
    pub fn create_image(
        &self,
        arch: Architecture,
        os: TargetOs,
        image: &str,
    ) -> Result<ContainerImage<R>, EngineError> {
        let image = image.trim();
        if image.is_empty() || image.chars().any(char::is_whitespace) {
            return Err(EngineError::InvalidImage {
                reference: image.to_string(),
            });
        }

        Ok(ContainerImage {
            id: format!("{os}-{arch}"),
            arch,
            os,
            image: image.to_string(),
            env: BTreeMap::new(),
            runtime: Arc::clone(&self.runtime),
        })
    }
}

/// One isolated build environment for a single (OS, architecture).
#[derive(Debug)]
pub struct ContainerImage<R> {
    id: String,
    arch: Architecture,
    os: TargetOs,
    image: String,
    env: BTreeMap<String, String>,
    runtime: Arc<R>,
}

impl<R> ContainerImage<R> {
    /// Identifier namespacing this target's staging and output directories
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Target architecture
    pub fn architecture(&self) -> Architecture {
        self.arch
    }

    /// Target operating system
    pub fn os(&self) -> TargetOs {
        self.os
    }

    /// Image reference
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Sets an environment variable, replacing any previous value
    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env.insert(key.into(), value.into());
    }

    /// Environment passed to every command
    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    /// The runtime commands are sent to
    pub fn runtime(&self) -> &Arc<R> {
        &self.runtime
    }
}

impl<R: ContainerRuntime> ContainerImage<R> {
    /// Makes the image available, pulling it when asked or when missing.
    pub async fn prepare(&self, pull: bool) -> Result<(), EngineError> {
        if pull || !self.runtime.image_exists(&self.image).await? {
            log::debug!("pulling image {} with {}", self.image, self.runtime.name());
            self.runtime.pull(&self.image).await?;
        }
        Ok(())
    }

    /// Runs `argv` inside this environment.
    pub async fn run(
        &self,
        volume: &Volume,
        options: &RunOptions,
        argv: &[String],
    ) -> Result<String, EngineError> {
        let spec = RunSpec {
            image: &self.image,
            volume,
            work_dir: options
                .work_dir
                .clone()
                .unwrap_or_else(|| volume.work_dir_container()),
            env: &self.env,
            argv,
        };
        self.runtime.run(&spec).await
    }
}

//! Error types for cross-build operations.
//!
//! Each layer of the build (target resolution, context creation, container
//! engine, per-target build pipeline, CLI) has its own error enum. They are
//! aggregated into [`CrossError`], which also carries recovery suggestions.

use crate::target::{Architecture, TargetOs};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cross-build operations
pub type Result<T> = std::result::Result<T, CrossError>;

/// Main error type for all cross-build operations
#[derive(Error, Debug)]
pub enum CrossError {
    /// Target resolution errors
    #[error("{0}")]
    Target(#[from] TargetError),

    /// Build context errors
    #[error("could not create the build context: {0}")]
    Context(#[from] ContextError),

    /// Container engine errors
    #[error("container engine error: {0}")]
    Engine(#[from] EngineError),

    /// Per-target pipeline errors
    #[error("{0}")]
    Build(#[from] BuildError),

    /// CLI argument errors
    #[error("{0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Template rendering errors
    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),
}

/// Target architecture resolution errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TargetError {
    /// Requested architecture is not supported for the target OS
    #[error(
        "unsupported architecture '{requested}' for {os}. Supported arch: {}",
        format_supported(.supported)
    )]
    UnsupportedArchitecture {
        /// The offending token, as typed by the user
        requested: String,
        /// Target operating system
        os: TargetOs,
        /// Architectures the OS supports
        supported: Vec<Architecture>,
    },
}

fn format_supported(supported: &[Architecture]) -> String {
    supported
        .iter()
        .map(|arch| arch.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build context resolution errors
#[derive(Error, Debug)]
pub enum ContextError {
    /// Working directory does not exist or is not a directory
    #[error("working directory not found: {path}")]
    WorkDirNotFound {
        /// Path that was resolved from --dir
        path: PathBuf,
    },

    /// A path could not be made absolute
    #[error("cannot resolve path {path}: {source}")]
    InvalidPath {
        /// Path as given
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Cache directory could not be created
    #[error("cannot create cache directory {path}: {source}")]
    CacheDir {
        /// Cache directory path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// No user cache directory and no --cache given
    #[error("cannot determine a cache directory, use --cache to set one")]
    NoCacheDir,

    /// Application name could not be derived
    #[error("cannot derive an application name from {path}, use --name to set one")]
    MissingName {
        /// Package path the name was derived from
        path: PathBuf,
    },

    /// App version is not a semantic version
    #[error("invalid app version '{version}': {source}")]
    InvalidVersion {
        /// Version string
        version: String,
        /// Parsing error
        #[source]
        source: semver::Error,
    },

    /// App build number must be positive
    #[error("invalid app build number {0}: must be greater than zero")]
    InvalidBuild(u32),

    /// Malformed --env entry
    #[error("invalid environment entry '{entry}': expected KEY=VALUE with a valid variable name")]
    InvalidEnv {
        /// The raw entry
        entry: String,
    },
}

/// Container engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// No usable container engine
    #[error("{engine} is not available: {reason}")]
    Unavailable {
        /// Engine name
        engine: String,
        /// Reason for the error
        reason: String,
    },

    /// Image reference is empty or malformed
    #[error("invalid container image reference '{reference}'")]
    InvalidImage {
        /// Image reference
        reference: String,
    },

    /// The engine process could not be started
    #[error("failed to run command {command}: {source}")]
    Spawn {
        /// Command line
        command: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The command exited with a non-zero status
    #[error("command {command} exited with code {exit_code}{}", format_stderr(.stderr))]
    CommandFailed {
        /// Command line
        command: String,
        /// Exit code (-1 when killed by a signal)
        exit_code: i32,
        /// Captured standard error
        stderr: String,
    },

    /// The command did not finish in time
    #[error("command {command} timed out after {seconds} seconds")]
    Timeout {
        /// Command line
        command: String,
        /// Timeout in seconds
        seconds: u64,
    },
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{trimmed}")
    }
}

/// Per-target build pipeline errors.
///
/// Every variant names the target (descriptor id) it happened on.
#[derive(Error, Debug)]
pub enum BuildError {
    /// The build image could not be made available
    #[error("[{target}] could not prepare the build image: {source}")]
    Image {
        /// Descriptor id
        target: String,
        /// Engine error
        #[source]
        source: EngineError,
    },

    /// Icon preparation failed
    #[error("[{target}] could not prepare the icon: {reason}")]
    Icon {
        /// Descriptor id
        target: String,
        /// Reason for the error
        reason: String,
    },

    /// Staging or output directory could not be reset
    #[error("[{target}] could not prepare {path}: {source}")]
    Workspace {
        /// Descriptor id
        target: String,
        /// Directory path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// `go mod init` failed
    #[error("[{target}] could not initialize the go module: {source}")]
    ModuleInit {
        /// Descriptor id
        target: String,
        /// Engine error
        #[source]
        source: EngineError,
    },

    /// The packaging tool failed or produced no archive
    #[error("[{target}] could not package the Fyne app: {source}")]
    Packaging {
        /// Descriptor id
        target: String,
        /// What went wrong
        #[source]
        source: PackagingError,
    },

    /// Moving the archive into the staging directory failed
    #[error("[{target}] could not move the package into the staging directory: {source}")]
    Relocate {
        /// Descriptor id
        target: String,
        /// Engine error
        #[source]
        source: EngineError,
    },

    /// Extracting the executable from the archive failed
    #[error("[{target}] could not extract the executable: {source}")]
    Extract {
        /// Descriptor id
        target: String,
        /// Engine error
        #[source]
        source: EngineError,
    },
}

/// Cause of a packaging failure
#[derive(Error, Debug)]
pub enum PackagingError {
    /// `fyne` exited non-zero or could not run
    #[error(transparent)]
    Tool(#[from] EngineError),

    /// `fyne` succeeded but the archive is not where it should be
    #[error("no archive produced at {}", .path.display())]
    NoArchive {
        /// Expected archive location on the host
        path: PathBuf,
    },
}

impl BuildError {
    /// Descriptor id of the target this error happened on
    pub fn target(&self) -> &str {
        match self {
            BuildError::Image { target, .. }
            | BuildError::Icon { target, .. }
            | BuildError::Workspace { target, .. }
            | BuildError::ModuleInit { target, .. }
            | BuildError::Packaging { target, .. }
            | BuildError::Relocate { target, .. }
            | BuildError::Extract { target, .. } => target,
        }
    }
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// The user asked for the command usage
    #[error("usage requested")]
    UsageRequested,

    /// `run` was called before a successful `parse`
    #[error("command '{command}' must be parsed before it can run")]
    NotParsed {
        /// Command name
        command: String,
    },
}

impl CrossError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            CrossError::Target(TargetError::UnsupportedArchitecture { supported, .. }) => vec![
                format!("Pass one or more of: {}", format_supported(supported)),
                "Separate multiple architectures with commas, e.g. --arch amd64,arm64".to_string(),
            ],
            CrossError::Context(ContextError::WorkDirNotFound { .. }) => vec![
                "Run from the application directory or point --dir at it".to_string(),
            ],
            CrossError::Context(ContextError::InvalidVersion { .. }) => vec![
                "Use a semantic version such as --app-version 1.2.3".to_string(),
            ],
            CrossError::Engine(EngineError::Unavailable { .. }) => vec![
                "Install Docker (https://docs.docker.com/get-docker/) or Podman".to_string(),
                "Ensure the engine daemon is running: docker info".to_string(),
                "Select an engine explicitly with --engine docker|podman".to_string(),
            ],
            CrossError::Build(BuildError::Packaging { .. }) => vec![
                "Re-run with --debug to see the full packaging output".to_string(),
                "Check that the package path points at a main package".to_string(),
            ],
            CrossError::Build(BuildError::Icon { .. }) => vec![
                "Provide a PNG icon with --icon".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

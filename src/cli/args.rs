//! Command line argument parsing.
//!
//! The top level only selects the platform command; its arguments are handed
//! verbatim to the command's own parser so each command can render its usage.

use crate::container::EngineKind;
use crate::pipeline::icon::DEFAULT_ICON;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cross-compile and package Fyne applications
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_cross",
    version,
    about = "Cross-compile and package Fyne applications in containers",
    long_about = "Build and package a Fyne application for other operating systems and \
architectures. Every target architecture is built in its own container.

Usage:
  kodegen_bundler_cross linux
  kodegen_bundler_cross linux --arch amd64,arm64 --release
  kodegen_bundler_cross linux --help"
)]
pub struct Args {
    /// Platform command
    #[command(subcommand)]
    pub command: Command,
}

/// Platform commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build and package a fyne application for the linux OS
    #[command(disable_help_flag = true)]
    Linux {
        /// Options and package, see `linux --help`
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
        args: Vec<String>,
    },
}

impl Command {
    /// Command name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Command::Linux { .. } => "linux",
        }
    }

    /// Raw arguments for the command's own parser
    pub fn args(&self) -> &[String] {
        match self {
            Command::Linux { args } => args,
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether the command asked for debug output
    pub fn debug_requested(&self) -> bool {
        self.command.args().iter().any(|arg| arg == "--debug")
    }
}

/// Flags shared by every platform command.
#[derive(clap::Args, Debug, Clone)]
pub struct CommonFlags {
    /// Name of the application [default: package directory name]
    #[arg(long)]
    pub name: Option<String>,

    /// Package for distribution instead of development
    #[arg(long)]
    pub release: bool,

    /// Application ID used for distribution
    #[arg(long = "app-id", value_name = "ID")]
    pub app_id: Option<String>,

    /// Version number in the form x.y.z
    #[arg(long = "app-version", value_name = "VERSION", default_value = "1.0.0")]
    pub app_version: String,

    /// Build number, must be greater than zero
    #[arg(long = "app-build", value_name = "N", default_value_t = 1)]
    pub app_build: u32,

    /// Application icon, relative to the working directory
    #[arg(long, value_name = "PATH", default_value = DEFAULT_ICON)]
    pub icon: PathBuf,

    /// Working directory of the application
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Host directory mounted as the Go cache [default: user cache directory]
    #[arg(long, value_name = "DIR")]
    pub cache: Option<PathBuf>,

    /// Container engine
    #[arg(long, value_enum, default_value_t = EngineKind::Auto, env = "KODEGEN_CROSS_ENGINE")]
    pub engine: EngineKind,

    /// Container image overriding the default for every target
    #[arg(long, value_name = "IMAGE", env = "KODEGEN_CROSS_IMAGE")]
    pub image: Option<String>,

    /// Always pull the container image
    #[arg(long)]
    pub pull: bool,

    /// Extra environment variable for the build, repeatable
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Go build tags, comma separated
    #[arg(long, value_name = "TAGS", value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Show container output and debug logs
    #[arg(long)]
    pub debug: bool,
}

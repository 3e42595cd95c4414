//! # Kodegen Bundler Cross
//!
//! Cross-compiles and packages Fyne applications inside containers.
//!
//! Every requested (OS, architecture) pair gets its own container image with a
//! private toolchain environment. The application is packaged with the `fyne`
//! tool inside the container, and the results land under `cross-build/` in the
//! working directory, namespaced per target.
//!
//! ## Usage
//!
//! ```bash
//! kodegen_bundler_cross linux                          # host architecture
//! kodegen_bundler_cross linux --arch amd64,arm64       # several targets
//! kodegen_bundler_cross linux --release ./cmd/viewer   # distribution build
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod cli;
pub mod container;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod target;

pub use cli::commands::{LINUX_ARCH_SUPPORTED, LinuxCommand, LinuxFlags, PlatformCommand};
pub use cli::Args;
pub use container::{ContainerEngine, ContainerImage, ContainerRuntime, LocalRuntime, RunOptions, RunSpec};
pub use context::{Context, Volume};
pub use error::{
    BuildError, CliError, ContextError, CrossError, EngineError, PackagingError, Result, TargetError,
};
pub use pipeline::{BuildOutcome, PlatformBuilder, run_pipeline};
pub use target::{Architecture, TargetOs};

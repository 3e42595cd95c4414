//! Linux platform command.
//!
//! Packages a Fyne application into `<name>.tar.xz` for each requested
//! architecture and extracts the executable into
//! `cross-build/bin/linux-<arch>/`.

use super::PlatformCommand;
use crate::cli::{CommonFlags, OutputManager};
use crate::container::{
    ContainerEngine, ContainerImage, ContainerRuntime, LocalRuntime, RunOptions,
};
use crate::context::{Context, join_path_container};
use crate::error::{BuildError, CliError, EngineError, PackagingError, Result, TargetError};
use crate::pipeline::fyne::{fyne_package, fyne_release};
use crate::pipeline::icon::prepare_icon;
use crate::pipeline::{BuildOutcome, PlatformBuilder, run_pipeline};
use crate::target::{self, Architecture, TargetOs};
use clap::{CommandFactory, Parser};

/// Architectures the linux command can build
pub const LINUX_ARCH_SUPPORTED: [Architecture; 4] = [
    Architecture::Amd64,
    Architecture::I386,
    Architecture::Arm,
    Architecture::Arm64,
];

/// Components of `usr/local/bin/<exe>` inside the archive
const ARCHIVE_STRIP_COMPONENTS: u8 = 3;

/// Archive member holding the executable
const ARCHIVE_BIN_DIR: &str = "usr/local/bin";

/// Command line flags of the linux command
#[derive(Parser, Debug)]
#[command(name = "linux", help_template = "{options}")]
pub struct LinuxFlags {
    /// Flags shared with every platform command
    #[command(flatten)]
    pub common: CommonFlags,

    /// List of target architecture to build separated by comma. Supported arch: amd64, 386, arm, arm64 [default: host architecture]
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Go package to build, relative to the working directory
    #[arg(value_name = "PACKAGE")]
    pub package: Option<String>,
}

type EngineFactory<R> = Box<dyn Fn(&Context) -> std::result::Result<ContainerEngine<R>, EngineError>>;

/// Builds and packages a Fyne application for the linux OS
pub struct LinuxCommand<R = LocalRuntime> {
    context: Option<Context>,
    images: Vec<ContainerImage<R>>,
    engine_factory: EngineFactory<R>,
    output: OutputManager,
}

impl LinuxCommand<LocalRuntime> {
    /// Creates the command using the Docker/Podman CLI
    pub fn new() -> Self {
        Self::with_engine(ContainerEngine::local)
    }
}

impl Default for LinuxCommand<LocalRuntime> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ContainerRuntime> LinuxCommand<R> {
    /// Creates the command with a custom engine factory.
    ///
    /// The factory is called once during `parse`, after the context is
    /// resolved.
    pub fn with_engine<F>(factory: F) -> Self
    where
        F: Fn(&Context) -> std::result::Result<ContainerEngine<R>, EngineError> + 'static,
    {
        Self {
            context: None,
            images: Vec::new(),
            engine_factory: Box::new(factory),
            output: OutputManager::new(false),
        }
    }

    /// The resolved context, once parsed
    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// One image per requested architecture, in request order
    pub fn images(&self) -> &[ContainerImage<R>] {
        &self.images
    }

    fn parsed_context(&self) -> Result<&Context> {
        self.context.as_ref().ok_or_else(|| {
            CliError::NotParsed {
                command: self.name().to_string(),
            }
            .into()
        })
    }

    /// Resolves the targets, the context and the engine, then builds one
    /// image per architecture.
    fn setup_container_images(&mut self, flags: LinuxFlags) -> Result<()> {
        let targets = target::resolve_architectures(
            flags.arch.as_deref().unwrap_or_default(),
            TargetOs::Linux,
            &LINUX_ARCH_SUPPORTED,
        )?;

        let ctx = Context::from_flags(&flags.common, flags.package.as_deref())?;
        let engine = (self.engine_factory)(&ctx)?;

        let mut images = Vec::with_capacity(targets.len());
        for arch in targets {
            let toolchain = target::lookup(TargetOs::Linux, arch).ok_or_else(|| {
                TargetError::UnsupportedArchitecture {
                    requested: arch.to_string(),
                    os: TargetOs::Linux,
                    supported: LINUX_ARCH_SUPPORTED.to_vec(),
                }
            })?;

            let reference = ctx.image.as_deref().unwrap_or(toolchain.image);
            let mut image = engine.create_image(arch, TargetOs::Linux, reference)?;

            for (key, value) in toolchain.environment()? {
                image.set_env(key, value);
            }
            for (key, value) in &ctx.env {
                image.set_env(key.clone(), value.clone());
            }
            // Last, so no template or user entry can change the target OS
            image.set_env("GOOS", TargetOs::Linux.as_str());

            images.push(image);
        }

        self.output = OutputManager::new(ctx.debug);
        self.context = Some(ctx);
        self.images = images;
        Ok(())
    }
}

/// Archive produced by `fyne package -os linux`
pub fn archive_name(name: &str) -> String {
    format!("{name}.tar.xz")
}

impl<R: ContainerRuntime> PlatformCommand for LinuxCommand<R> {
    fn name(&self) -> &'static str {
        "linux"
    }

    fn description(&self) -> &'static str {
        "Build and package a fyne application for the linux OS"
    }

    fn parse(&mut self, args: &[String]) -> Result<()> {
        let argv = std::iter::once(self.name().to_string()).chain(args.iter().cloned());
        let flags = LinuxFlags::try_parse_from(argv).map_err(|e| match e.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                CliError::UsageRequested
            }
            _ => CliError::InvalidArguments {
                reason: e.to_string().trim().to_string(),
            },
        })?;

        self.setup_container_images(flags)
    }

    async fn run(&self) -> Result<Vec<BuildOutcome>> {
        let ctx = self.parsed_context()?;
        run_pipeline(ctx, &self.images, self, &self.output).await
    }

    fn options_help(&self) -> String {
        LinuxFlags::command().render_help().to_string()
    }
}

impl<R: ContainerRuntime> PlatformBuilder<R> for LinuxCommand<R> {
    async fn build(&self, image: &ContainerImage<R>) -> Result<String> {
        let ctx = self.parsed_context()?;
        let id = image.id();

        prepare_icon(ctx, image)?;

        self.output.stage(id, "Packaging app...").ok();
        let package_name = archive_name(&ctx.name);

        let packaged = if ctx.release {
            fyne_release(ctx, image).await
        } else {
            fyne_package(ctx, image).await
        };
        packaged.map_err(|e| BuildError::Packaging {
            target: id.to_string(),
            source: e.into(),
        })?;

        // A zero exit status alone does not mean the archive was written
        let packaged_archive = ctx.package_dir_host().join(&package_name);
        if !packaged_archive.is_file() {
            return Err(BuildError::Packaging {
                target: id.to_string(),
                source: PackagingError::NoArchive {
                    path: packaged_archive,
                },
            }
            .into());
        }

        let staged_archive = join_path_container(&[&ctx.staging_dir_container(id), &package_name]);

        // fyne writes the archive next to the package it builds
        image
            .run(
                &ctx.volume,
                &RunOptions::default(),
                &[
                    "mv".to_string(),
                    join_path_container(&[&ctx.package_dir_container(), &package_name]),
                    staged_archive.clone(),
                ],
            )
            .await
            .map_err(|source| BuildError::Relocate {
                target: id.to_string(),
                source,
            })?;

        image
            .run(
                &ctx.volume,
                &RunOptions::in_dir(ctx.bin_dir_container(id)),
                &[
                    "tar".to_string(),
                    "-xf".to_string(),
                    staged_archive,
                    format!("--strip-components={ARCHIVE_STRIP_COMPONENTS}"),
                    ARCHIVE_BIN_DIR.to_string(),
                ],
            )
            .await
            .map_err(|source| BuildError::Extract {
                target: id.to_string(),
                source,
            })?;

        Ok(package_name)
    }
}

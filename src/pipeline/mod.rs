//! Build pipeline runner.
//!
//! Drives one platform-specific build step over every container image of an
//! invocation. Targets run sequentially in request order and the first failure
//! aborts the invocation. Each target writes only below directories namespaced
//! by its descriptor id, so the order does not change the result.

pub mod fyne;
pub mod icon;

use crate::cli::OutputManager;
use crate::container::{ContainerImage, ContainerRuntime};
use crate::context::Context;
use crate::error::{BuildError, Result};
use crate::target::Architecture;
use std::path::PathBuf;

/// The platform-specific build step.
///
/// Implementations prepare resources, package the application inside the
/// container, and move the result to host-visible directories.
#[allow(async_fn_in_trait)]
pub trait PlatformBuilder<R> {
    /// Builds one target and returns the archive file name.
    async fn build(&self, image: &ContainerImage<R>) -> Result<String>;
}

/// Result of one successful target build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Descriptor id
    pub target: String,
    /// Target architecture
    pub architecture: Architecture,
    /// Archive file name
    pub package: String,
    /// Archive location on the host
    pub archive: PathBuf,
    /// Directory holding the extracted executable on the host
    pub bin_dir: PathBuf,
}

/// Runs `builder` once per image.
///
/// For each image: make the image available, reset its staging and output
/// directories, initialise the Go module if needed, then build.
pub async fn run_pipeline<R, B>(
    ctx: &Context,
    images: &[ContainerImage<R>],
    builder: &B,
    output: &OutputManager,
) -> Result<Vec<BuildOutcome>>
where
    R: ContainerRuntime,
    B: PlatformBuilder<R>,
{
    let mut outcomes = Vec::with_capacity(images.len());

    for image in images {
        output.target_started(image.os(), image.architecture()).ok();
        log::debug!(
            "target {} image={} env={:?}",
            image.id(),
            image.image(),
            image.env()
        );

        image
            .prepare(ctx.pull)
            .await
            .map_err(|source| BuildError::Image {
                target: image.id().to_string(),
                source,
            })?;

        clean_target_dirs(ctx, image)?;

        fyne::go_mod_init(ctx, image).await?;

        let package = builder.build(image).await?;
        output.packaged(image.id(), &package).ok();

        outcomes.push(BuildOutcome {
            target: image.id().to_string(),
            architecture: image.architecture(),
            archive: ctx.staging_dir_host(image.id()).join(&package),
            bin_dir: ctx.bin_dir_host(image.id()),
            package,
        });
    }

    Ok(outcomes)
}

/// Removes and recreates the staging and output directories of one target.
pub fn clean_target_dirs<R>(ctx: &Context, image: &ContainerImage<R>) -> Result<()> {
    for dir in [
        ctx.staging_dir_host(image.id()),
        ctx.bin_dir_host(image.id()),
    ] {
        let reset = || -> std::io::Result<()> {
            if dir.exists() {
                std::fs::remove_dir_all(&dir)?;
            }
            std::fs::create_dir_all(&dir)
        };
        reset().map_err(|source| BuildError::Workspace {
            target: image.id().to_string(),
            path: dir.clone(),
            source,
        })?;
    }
    Ok(())
}

//! Invocations of the `fyne` packaging tool and the Go toolchain.

use super::icon::STAGED_ICON;
use crate::container::{ContainerImage, ContainerRuntime, RunOptions};
use crate::context::{Context, join_path_container};
use crate::error::{BuildError, EngineError};

/// Arguments for `fyne <subcommand>`.
///
/// The icon is read from the target's staging directory.
pub fn fyne_args<R>(ctx: &Context, image: &ContainerImage<R>, subcommand: &str) -> Vec<String> {
    let icon = join_path_container(&[&ctx.staging_dir_container(image.id()), STAGED_ICON]);

    let mut args = vec![
        "fyne".to_string(),
        subcommand.to_string(),
        "-os".to_string(),
        image.os().to_string(),
        "-name".to_string(),
        ctx.name.clone(),
        "-icon".to_string(),
        icon,
        "-appBuild".to_string(),
        ctx.app_build.to_string(),
        "-appVersion".to_string(),
        ctx.app_version.to_string(),
    ];

    if let Some(app_id) = &ctx.app_id {
        args.push("-appID".to_string());
        args.push(app_id.clone());
    }

    if !ctx.tags.is_empty() {
        args.push("-tags".to_string());
        args.push(ctx.tags.join(","));
    }

    args
}

/// Packages the application for development (`fyne package`).
pub async fn fyne_package<R: ContainerRuntime>(
    ctx: &Context,
    image: &ContainerImage<R>,
) -> Result<String, EngineError> {
    let options = RunOptions::in_dir(ctx.package_dir_container());
    image
        .run(&ctx.volume, &options, &fyne_args(ctx, image, "package"))
        .await
}

/// Packages the application for distribution (`fyne release`).
pub async fn fyne_release<R: ContainerRuntime>(
    ctx: &Context,
    image: &ContainerImage<R>,
) -> Result<String, EngineError> {
    let options = RunOptions::in_dir(ctx.package_dir_container());
    image
        .run(&ctx.volume, &options, &fyne_args(ctx, image, "release"))
        .await
}

/// Runs `go mod init <name>` when the working directory has no `go.mod`.
pub async fn go_mod_init<R: ContainerRuntime>(
    ctx: &Context,
    image: &ContainerImage<R>,
) -> Result<(), BuildError> {
    if ctx.volume.work_dir_host().join("go.mod").exists() {
        return Ok(());
    }

    log::debug!("no go.mod found, initializing module {}", ctx.name);
    let argv = vec![
        "go".to_string(),
        "mod".to_string(),
        "init".to_string(),
        ctx.name.clone(),
    ];
    image
        .run(&ctx.volume, &RunOptions::default(), &argv)
        .await
        .map(|_| ())
        .map_err(|source| BuildError::ModuleInit {
            target: image.id().to_string(),
            source,
        })
}

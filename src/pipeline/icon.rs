//! Icon preparation.
//!
//! The packaging tool reads the icon from the target's staging directory, so
//! every target gets its own copy.

use crate::container::ContainerImage;
use crate::context::Context;
use crate::error::BuildError;
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// Default icon path, relative to the working directory
pub const DEFAULT_ICON: &str = "Icon.png";

/// File name of the icon inside the staging directory
pub const STAGED_ICON: &str = "Icon.png";

const PLACEHOLDER_SIZE: u32 = 512;
const PLACEHOLDER_COLOR: Rgba<u8> = Rgba([0x2b, 0x6c, 0xb0, 0xff]);

/// Copies the icon into the target's staging directory.
///
/// A missing default `Icon.png` is replaced by a generated placeholder; a
/// missing icon the user asked for is an error. The icon must decode as an
/// image.
///
/// # Returns
///
/// Host path of the staged icon.
pub fn prepare_icon<R>(ctx: &Context, image: &ContainerImage<R>) -> Result<PathBuf, BuildError> {
    let icon_error = |reason: String| BuildError::Icon {
        target: image.id().to_string(),
        reason,
    };

    let staging_dir = ctx.staging_dir_host(image.id());
    std::fs::create_dir_all(&staging_dir).map_err(|source| BuildError::Workspace {
        target: image.id().to_string(),
        path: staging_dir.clone(),
        source,
    })?;
    let staged = staging_dir.join(STAGED_ICON);

    let source = ctx.icon_host();
    if !source.is_file() {
        if ctx.icon != Path::new(DEFAULT_ICON) {
            return Err(icon_error(format!("icon not found at {}", source.display())));
        }

        log::warn!(
            "{} not found, using a placeholder icon for {}",
            source.display(),
            image.id()
        );
        write_placeholder(&staged).map_err(icon_error)?;
        return Ok(staged);
    }

    let (width, height) = image::image_dimensions(&source)
        .map_err(|e| icon_error(format!("cannot read {}: {}", source.display(), e)))?;
    if width != height {
        log::warn!(
            "icon {} is not square ({}x{}), it may render distorted",
            source.display(),
            width,
            height
        );
    }

    std::fs::copy(&source, &staged).map_err(|e| {
        icon_error(format!(
            "cannot copy {} to {}: {}",
            source.display(),
            staged.display(),
            e
        ))
    })?;

    Ok(staged)
}

fn write_placeholder(path: &Path) -> Result<(), String> {
    RgbaImage::from_pixel(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, PLACEHOLDER_COLOR)
        .save(path)
        .map_err(|e| format!("cannot write placeholder icon {}: {}", path.display(), e))
}

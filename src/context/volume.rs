//! Host to container directory mapping.

use std::path::{Path, PathBuf};

/// Mount point of the working directory inside the container
pub const WORK_DIR_CONTAINER: &str = "/app";

/// Mount point of the Go cache inside the container
pub const CACHE_DIR_CONTAINER: &str = "/go";

/// Directory under the working directory holding all build output
pub const OUTPUT_DIR_NAME: &str = "cross-build";

const TMP_DIR_NAME: &str = "tmp";
const BIN_DIR_NAME: &str = "bin";

/// Joins path segments with `/`, whatever the host separator is.
///
/// Empty segments are skipped and duplicate separators collapsed, so
/// `join_path_container(&["/app", "", "pkg/"])` is `/app/pkg`.
pub fn join_path_container(parts: &[&str]) -> String {
    let mut joined = String::new();
    for (index, part) in parts.iter().enumerate() {
        let trimmed = if index == 0 {
            part.trim_end_matches('/')
        } else {
            part.trim_matches('/')
        };
        if trimmed.is_empty() {
            if index == 0 && part.starts_with('/') {
                joined.push('/');
            }
            continue;
        }
        if !joined.is_empty() && !joined.ends_with('/') {
            joined.push('/');
        }
        joined.push_str(trimmed);
    }
    joined
}

/// Directories shared between the host and every build container.
///
/// Only the working directory and the cache are mounted; the staging and
/// binary output directories live below the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Volume {
    work_dir_host: PathBuf,
    cache_dir_host: PathBuf,
}

impl Volume {
    /// Creates a volume from absolute host paths.
    pub fn new(work_dir_host: PathBuf, cache_dir_host: PathBuf) -> Self {
        Self {
            work_dir_host,
            cache_dir_host,
        }
    }

    /// Working directory on the host
    pub fn work_dir_host(&self) -> &Path {
        &self.work_dir_host
    }

    /// Working directory in the container
    pub fn work_dir_container(&self) -> String {
        WORK_DIR_CONTAINER.to_string()
    }

    /// Go cache directory on the host
    pub fn cache_dir_host(&self) -> &Path {
        &self.cache_dir_host
    }

    /// Go cache directory in the container
    pub fn cache_dir_container(&self) -> String {
        CACHE_DIR_CONTAINER.to_string()
    }

    /// Staging directory on the host
    pub fn tmp_dir_host(&self) -> PathBuf {
        self.work_dir_host.join(OUTPUT_DIR_NAME).join(TMP_DIR_NAME)
    }

    /// Staging directory in the container
    pub fn tmp_dir_container(&self) -> String {
        join_path_container(&[WORK_DIR_CONTAINER, OUTPUT_DIR_NAME, TMP_DIR_NAME])
    }

    /// Binary output directory on the host
    pub fn bin_dir_host(&self) -> PathBuf {
        self.work_dir_host.join(OUTPUT_DIR_NAME).join(BIN_DIR_NAME)
    }

    /// Binary output directory in the container
    pub fn bin_dir_container(&self) -> String {
        join_path_container(&[WORK_DIR_CONTAINER, OUTPUT_DIR_NAME, BIN_DIR_NAME])
    }
}

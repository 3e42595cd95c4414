//! Build context resolved once per invocation.
//!
//! The [`Context`] is created from the parsed command line flags and passed
//! explicitly to every component that needs it. Nothing here is global.

mod volume;

pub use volume::{
    CACHE_DIR_CONTAINER, OUTPUT_DIR_NAME, Volume, WORK_DIR_CONTAINER, join_path_container,
};

use crate::cli::CommonFlags;
use crate::container::EngineKind;
use crate::error::ContextError;
use path_absolutize::Absolutize;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Directory name used under the user cache directory
const CACHE_DIR_NAME: &str = "kodegen-cross";

/// Package path meaning "the working directory itself"
pub const ROOT_PACKAGE: &str = ".";

static ENV_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("environment name regex is valid")
});

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    /// Application name, also the archive base name
    pub name: String,
    /// Package for distribution instead of development
    pub release: bool,
    /// Application identifier (reverse DNS)
    pub app_id: Option<String>,
    /// Application version
    pub app_version: semver::Version,
    /// Application build number
    pub app_build: u32,
    /// Icon path relative to the working directory
    pub icon: PathBuf,
    /// Go package to build, relative to the working directory
    pub package: String,
    /// Go build tags
    pub tags: Vec<String>,
    /// Extra environment for every build container
    pub env: BTreeMap<String, String>,
    /// Echo container output
    pub debug: bool,
    /// Always pull the build image
    pub pull: bool,
    /// Image overriding the catalog default
    pub image: Option<String>,
    /// Container engine selection
    pub engine: EngineKind,
    /// Host/container directory mapping
    pub volume: Volume,
}

impl Context {
    /// Resolves the context from command line flags.
    ///
    /// Creates the cache directory if it does not exist yet; no other
    /// filesystem changes are made.
    pub fn from_flags(flags: &CommonFlags, package: Option<&str>) -> Result<Self, ContextError> {
        let work_dir = absolute(&flags.dir)?;
        if !work_dir.is_dir() {
            return Err(ContextError::WorkDirNotFound { path: work_dir });
        }

        let cache_dir = match &flags.cache {
            Some(cache) => absolute(cache)?,
            None => dirs::cache_dir()
                .ok_or(ContextError::NoCacheDir)?
                .join(CACHE_DIR_NAME),
        };
        std::fs::create_dir_all(&cache_dir).map_err(|source| ContextError::CacheDir {
            path: cache_dir.clone(),
            source,
        })?;

        let package = package
            .map(|p| p.trim_end_matches(['/', '\\']))
            .filter(|p| !p.is_empty())
            .unwrap_or(ROOT_PACKAGE)
            .to_string();

        let name = match &flags.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => default_name(&work_dir, &package)?,
        };

        let app_version =
            semver::Version::parse(&flags.app_version).map_err(|source| {
                ContextError::InvalidVersion {
                    version: flags.app_version.clone(),
                    source,
                }
            })?;

        if flags.app_build == 0 {
            return Err(ContextError::InvalidBuild(flags.app_build));
        }

        let env = parse_env(&flags.env)?;

        let tags = flags
            .tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            name,
            release: flags.release,
            app_id: flags.app_id.clone().filter(|id| !id.is_empty()),
            app_version,
            app_build: flags.app_build,
            icon: flags.icon.clone(),
            package,
            tags,
            env,
            debug: flags.debug,
            pull: flags.pull,
            image: flags.image.clone().filter(|image| !image.is_empty()),
            engine: flags.engine,
            volume: Volume::new(work_dir, cache_dir),
        })
    }

    /// Directory of the Go package inside the container
    pub fn package_dir_container(&self) -> String {
        if self.package == ROOT_PACKAGE {
            self.volume.work_dir_container()
        } else {
            join_path_container(&[&self.volume.work_dir_container(), &self.package])
        }
    }

    /// Directory of the Go package on the host
    pub fn package_dir_host(&self) -> PathBuf {
        if self.package == ROOT_PACKAGE {
            self.volume.work_dir_host().to_path_buf()
        } else {
            self.volume.work_dir_host().join(&self.package)
        }
    }

    /// Staging directory of one target on the host
    pub fn staging_dir_host(&self, id: &str) -> PathBuf {
        self.volume.tmp_dir_host().join(id)
    }

    /// Staging directory of one target in the container
    pub fn staging_dir_container(&self, id: &str) -> String {
        join_path_container(&[&self.volume.tmp_dir_container(), id])
    }

    /// Binary output directory of one target on the host
    pub fn bin_dir_host(&self, id: &str) -> PathBuf {
        self.volume.bin_dir_host().join(id)
    }

    /// Binary output directory of one target in the container
    pub fn bin_dir_container(&self, id: &str) -> String {
        join_path_container(&[&self.volume.bin_dir_container(), id])
    }

    /// Icon path on the host
    pub fn icon_host(&self) -> PathBuf {
        self.volume.work_dir_host().join(&self.icon)
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ContextError> {
    path.absolutize()
        .map(|p| p.into_owned())
        .map_err(|source| ContextError::InvalidPath {
            path: path.to_path_buf(),
            source,
        })
}

fn default_name(work_dir: &Path, package: &str) -> Result<String, ContextError> {
    let package_dir = absolute(&work_dir.join(package))?;
    package_dir
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or(ContextError::MissingName { path: package_dir })
}

fn parse_env(entries: &[String]) -> Result<BTreeMap<String, String>, ContextError> {
    let mut env = BTreeMap::new();
    for entry in entries {
        match entry.split_once('=') {
            Some((key, value)) if ENV_NAME_RE.is_match(key) => {
                env.insert(key.to_string(), value.to_string());
            }
            _ => {
                return Err(ContextError::InvalidEnv {
                    entry: entry.clone(),
                });
            }
        }
    }
    Ok(env)
}

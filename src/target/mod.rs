//! Target operating systems and CPU architectures.
//!
//! Architecture names follow the Go toolchain (`amd64`, `386`, `arm`, `arm64`)
//! because they end up in `GOARCH` inside the build container.

pub mod catalog;

pub use catalog::{Toolchain, lookup};

use crate::error::TargetError;
use std::fmt;
use std::str::FromStr;

/// Target operating system.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum TargetOs {
    /// Linux (glibc)
    Linux,
}

impl TargetOs {
    /// Name used for `GOOS`, `fyne -os` and descriptor ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetOs::Linux => "linux",
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture a build targets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Architecture {
    /// x86_64
    Amd64,
    /// 32-bit x86
    I386,
    /// 32-bit ARM (hard-float)
    Arm,
    /// AArch64
    Arm64,
}

impl Architecture {
    /// Go-style architecture name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Amd64 => "amd64",
            Architecture::I386 => "386",
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
        }
    }

    /// Detects the architecture of the running host.
    ///
    /// Uses runtime detection via `std::env::consts::ARCH`, so the default is
    /// the same whatever OS is being targeted.
    pub fn host() -> Result<Self, TargetError> {
        Self::from_rust_arch(std::env::consts::ARCH).ok_or_else(|| {
            TargetError::UnsupportedArchitecture {
                requested: std::env::consts::ARCH.to_string(),
                os: TargetOs::Linux,
                supported: catalog::supported(TargetOs::Linux),
            }
        })
    }

    /// Maps a Rust `target_arch` name to an [`Architecture`].
    pub fn from_rust_arch(arch: &str) -> Option<Self> {
        match arch {
            "x86_64" => Some(Architecture::Amd64),
            "x86" => Some(Architecture::I386),
            "arm" => Some(Architecture::Arm),
            "aarch64" => Some(Architecture::Arm64),
            _ => None,
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amd64" => Ok(Architecture::Amd64),
            "386" => Ok(Architecture::I386),
            "arm" => Ok(Architecture::Arm),
            "arm64" => Ok(Architecture::Arm64),
            other => Err(format!("unknown architecture '{other}'")),
        }
    }
}

/// Resolves a comma separated architecture list against the set supported
/// for `os`.
///
/// Tokens are trimmed and empty tokens are ignored. The result keeps the
/// request order with duplicates removed. An empty request resolves to the
/// host architecture, which must itself be supported.
///
/// # Errors
///
/// [`TargetError::UnsupportedArchitecture`] naming the first token that is not
/// in `supported`.
pub fn resolve_architectures(
    request: &str,
    os: TargetOs,
    supported: &[Architecture],
) -> Result<Vec<Architecture>, TargetError> {
    let unsupported = |requested: &str| TargetError::UnsupportedArchitecture {
        requested: requested.to_string(),
        os,
        supported: supported.to_vec(),
    };

    let mut resolved = Vec::new();
    for token in request.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let arch = token
            .parse::<Architecture>()
            .ok()
            .filter(|arch| supported.contains(arch))
            .ok_or_else(|| unsupported(token))?;

        if !resolved.contains(&arch) {
            resolved.push(arch);
        }
    }

    if resolved.is_empty() {
        let host = Architecture::host()?;
        if !supported.contains(&host) {
            return Err(unsupported(host.as_str()));
        }
        resolved.push(host);
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINUX: &[Architecture] = &[
        Architecture::Amd64,
        Architecture::I386,
        Architecture::Arm,
        Architecture::Arm64,
    ];

    #[test]
    fn test_resolve_preserves_request_order() {
        let resolved = resolve_architectures("arm64,amd64", TargetOs::Linux, LINUX);
        assert_eq!(resolved, Ok(vec![Architecture::Arm64, Architecture::Amd64]));
    }

    #[test]
    fn test_resolve_removes_duplicates() {
        let resolved = resolve_architectures("arm,386,arm, 386", TargetOs::Linux, LINUX);
        assert_eq!(resolved, Ok(vec![Architecture::Arm, Architecture::I386]));
    }

    #[test]
    fn test_resolve_ignores_blank_tokens() {
        let resolved = resolve_architectures(" amd64 ,, ", TargetOs::Linux, LINUX);
        assert_eq!(resolved, Ok(vec![Architecture::Amd64]));
    }

    #[test]
    fn test_resolve_rejects_unknown_token() {
        let err = resolve_architectures("amd64,riscv", TargetOs::Linux, LINUX).unwrap_err();
        assert_eq!(
            err,
            TargetError::UnsupportedArchitecture {
                requested: "riscv".to_string(),
                os: TargetOs::Linux,
                supported: LINUX.to_vec(),
            }
        );
        let message = err.to_string();
        assert!(message.contains("riscv"));
        assert!(message.contains("amd64, 386, arm, arm64"));
    }

    #[test]
    fn test_resolve_rejects_known_but_unsupported_token() {
        let result = resolve_architectures("arm", TargetOs::Linux, &[Architecture::Amd64]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_empty_defaults_to_host() {
        // Only meaningful on hosts the catalog knows about
        if let Ok(host) = Architecture::host() {
            assert_eq!(resolve_architectures("", TargetOs::Linux, LINUX), Ok(vec![host]));
            assert_eq!(resolve_architectures(" , ", TargetOs::Linux, LINUX), Ok(vec![host]));
        }
    }

    #[test]
    fn test_from_rust_arch() {
        assert_eq!(Architecture::from_rust_arch("x86_64"), Some(Architecture::Amd64));
        assert_eq!(Architecture::from_rust_arch("aarch64"), Some(Architecture::Arm64));
        assert_eq!(Architecture::from_rust_arch("riscv64"), None);
    }

    #[test]
    fn test_display_round_trips_go_names() {
        for arch in LINUX {
            assert_eq!(arch.as_str().parse::<Architecture>(), Ok(*arch));
        }
    }
}

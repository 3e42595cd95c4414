//! Static toolchain catalog.
//!
//! One [`Toolchain`] per supported (OS, architecture) pair. The environment a
//! build container receives is rendered from a shared set of templates, so a
//! new architecture is a new table row rather than a new code path.

use super::{Architecture, TargetOs};
use handlebars::{Handlebars, RenderError};
use serde::Serialize;

/// Default image for every Linux target
pub const LINUX_IMAGE: &str = "ghcr.io/herugen/fyne-cross-images-linux:latest";

/// Environment templates applied to every target, in order
const ENV_TEMPLATES: &[(&str, &str)] = &[
    ("GOARCH", "{{goarch}}"),
    ("CGO_ENABLED", "1"),
    (
        "CC",
        "zig cc -target {{triple}} -isystem /usr/include -L/usr/lib/{{lib_dir}}",
    ),
    (
        "CXX",
        "zig c++ -target {{triple}} -isystem /usr/include -L/usr/lib/{{lib_dir}}",
    ),
];

/// Only rendered for targets with an ARM variant
const ARM_VARIANT_TEMPLATE: (&str, &str) = ("GOARM", "{{arm_variant}}");

/// Toolchain parameters for one (OS, architecture) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Target operating system
    pub os: TargetOs,
    /// Target architecture
    pub arch: Architecture,
    /// Default container image reference
    pub image: &'static str,
    /// Compiler target triple passed to `zig cc`
    pub triple: &'static str,
    /// Multiarch library directory under `/usr/lib`
    pub lib_dir: &'static str,
    /// ARM architecture revision (`GOARM`)
    pub arm_variant: Option<u8>,
}

static LINUX_TOOLCHAINS: [Toolchain; 4] = [
    Toolchain {
        os: TargetOs::Linux,
        arch: Architecture::Amd64,
        image: LINUX_IMAGE,
        triple: "x86_64-linux-gnu",
        lib_dir: "x86_64-linux-gnu",
        arm_variant: None,
    },
    Toolchain {
        os: TargetOs::Linux,
        arch: Architecture::I386,
        image: LINUX_IMAGE,
        triple: "x86-linux-gnu",
        lib_dir: "i386-linux-gnu",
        arm_variant: None,
    },
    Toolchain {
        os: TargetOs::Linux,
        arch: Architecture::Arm,
        image: LINUX_IMAGE,
        triple: "arm-linux-gnueabihf",
        lib_dir: "arm-linux-gnueabihf",
        arm_variant: Some(7),
    },
    Toolchain {
        os: TargetOs::Linux,
        arch: Architecture::Arm64,
        image: LINUX_IMAGE,
        triple: "aarch64-linux-gnu",
        lib_dir: "aarch64-linux-gnu",
        arm_variant: None,
    },
];

fn toolchains(os: TargetOs) -> &'static [Toolchain] {
    match os {
        TargetOs::Linux => &LINUX_TOOLCHAINS,
    }
}

/// Looks up the toolchain for an (OS, architecture) pair.
pub fn lookup(os: TargetOs, arch: Architecture) -> Option<&'static Toolchain> {
    toolchains(os).iter().find(|toolchain| toolchain.arch == arch)
}

/// Architectures supported for `os`, in catalog order.
pub fn supported(os: TargetOs) -> Vec<Architecture> {
    toolchains(os).iter().map(|toolchain| toolchain.arch).collect()
}

#[derive(Serialize)]
struct TemplateData<'a> {
    goarch: &'a str,
    triple: &'a str,
    lib_dir: &'a str,
    arm_variant: Option<u8>,
}

impl Toolchain {
    /// Renders the environment for this target.
    ///
    /// Returns `(name, value)` pairs in template order. `GOOS` is not part of
    /// the result; callers set it last.
    pub fn environment(&self) -> Result<Vec<(String, String)>, RenderError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);

        let data = TemplateData {
            goarch: self.arch.as_str(),
            triple: self.triple,
            lib_dir: self.lib_dir,
            arm_variant: self.arm_variant,
        };

        let arm = self.arm_variant.map(|_| &ARM_VARIANT_TEMPLATE);
        ENV_TEMPLATES
            .iter()
            .chain(arm)
            .map(|(name, template)| -> Result<(String, String), RenderError> {
                let value = registry.render_template(template, &data)?;
                Ok((name.to_string(), value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(arch: Architecture) -> Vec<(String, String)> {
        let toolchain = lookup(TargetOs::Linux, arch);
        assert!(toolchain.is_some(), "missing catalog entry for {arch}");
        toolchain
            .map(|t| t.environment().unwrap_or_default())
            .unwrap_or_default()
    }

    fn value<'a>(env: &'a [(String, String)], key: &str) -> Option<&'a str> {
        env.iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn test_linux_supported_set() {
        assert_eq!(
            supported(TargetOs::Linux),
            vec![
                Architecture::Amd64,
                Architecture::I386,
                Architecture::Arm,
                Architecture::Arm64
            ]
        );
    }

    #[test]
    fn test_every_target_has_compilers() {
        for arch in supported(TargetOs::Linux) {
            let env = env_of(arch);
            assert!(value(&env, "CC").is_some_and(|cc| !cc.is_empty()));
            assert!(value(&env, "CXX").is_some_and(|cxx| !cxx.is_empty()));
            assert_eq!(value(&env, "GOARCH"), Some(arch.as_str()));
            assert_eq!(value(&env, "GOOS"), None);
        }
    }

    #[test]
    fn test_amd64_environment() {
        let env = env_of(Architecture::Amd64);
        assert_eq!(
            value(&env, "CC"),
            Some("zig cc -target x86_64-linux-gnu -isystem /usr/include -L/usr/lib/x86_64-linux-gnu")
        );
        assert_eq!(value(&env, "GOARM"), None);
    }

    #[test]
    fn test_386_uses_i386_libraries() {
        let env = env_of(Architecture::I386);
        assert_eq!(
            value(&env, "CXX"),
            Some("zig c++ -target x86-linux-gnu -isystem /usr/include -L/usr/lib/i386-linux-gnu")
        );
    }

    #[test]
    fn test_arm_sets_variant() {
        let env = env_of(Architecture::Arm);
        assert_eq!(value(&env, "GOARM"), Some("7"));
        assert!(value(&env, "CC").is_some_and(|cc| cc.contains("arm-linux-gnueabihf")));
    }

    #[test]
    fn test_keys_are_unique() {
        for arch in supported(TargetOs::Linux) {
            let env = env_of(arch);
            let mut keys: Vec<_> = env.iter().map(|(k, _)| k.clone()).collect();
            keys.sort();
            keys.dedup();
            assert_eq!(keys.len(), env.len());
        }
    }
}

//! Blueprint generation and parsing
//!
//! The `oscap` tool can render a profile's remediations as an image-builder
//! blueprint: structured TOML on stdout describing the packages, services,
//! kernel arguments, filesystems, and firewall rules a compliant image
//! needs. This module invokes that generation and parses the raw output
//! into [`Blueprint`].

use std::ffi::OsString;
use std::path::Path;

use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::tool::ExternalTool;

/// The OpenSCAP command-line tool
pub const OSCAP: &str = "oscap";

/// Blueprint document produced by `oscap xccdf generate fix`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Blueprint {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default)]
    pub customizations: Option<BlueprintCustomizations>,
}

/// A package the profile requires
#[derive(Debug, Clone, Deserialize)]
pub struct Package {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// The `[customizations]` table of a blueprint
#[derive(Debug, Clone, Deserialize, Default)]
pub struct BlueprintCustomizations {
    #[serde(default)]
    pub kernel: Option<Kernel>,
    #[serde(default)]
    pub services: Option<Services>,
    #[serde(default)]
    pub filesystem: Vec<Filesystem>,
    #[serde(default)]
    pub fips: Option<Fips>,
    #[serde(default)]
    pub firewall: Option<Firewall>,
}

/// Kernel command-line customization
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Kernel {
    #[serde(default)]
    pub append: Option<String>,
}

/// Systemd unit state customization
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Services {
    #[serde(default)]
    pub enabled: Vec<String>,
    #[serde(default)]
    pub disabled: Vec<String>,
    #[serde(default)]
    pub masked: Vec<String>,
}

/// A separate-mountpoint requirement
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Filesystem {
    #[serde(default)]
    pub mountpoint: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// FIPS mode requirement
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Fips {
    #[serde(default)]
    pub enabled: bool,
}

/// Firewall customization
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Firewall {
    #[serde(default)]
    pub services: Option<FirewallServices>,
}

/// Firewall service allow/deny lists
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FirewallServices {
    #[serde(default)]
    pub enabled: Vec<String>,
    #[serde(default)]
    pub disabled: Vec<String>,
}

/// Generate the raw blueprint for a profile
///
/// Invokes `oscap xccdf generate fix` with `--fix-type blueprint` against
/// the datastream and captures stdout. When a tailoring artifact is present
/// the invocation references it so generated fixes reflect the tailored
/// profile; otherwise the profile's default rule set applies. Any execution
/// failure or non-zero exit yields a generation error with no partial
/// output.
pub fn generate(
    tool: &dyn ExternalTool,
    profile: &str,
    datastream: &str,
    tailoring: Option<&Path>,
) -> Result<Vec<u8>> {
    let mut args = vec![
        OsString::from("xccdf"),
        OsString::from("generate"),
        OsString::from("fix"),
        OsString::from("--profile"),
        OsString::from(profile),
    ];

    if let Some(path) = tailoring {
        args.push(OsString::from("--tailoring-file"));
        args.push(path.into());
    }

    args.push(OsString::from("--fix-type"));
    args.push(OsString::from("blueprint"));
    args.push(OsString::from(datastream));

    let output = tool
        .invoke(OSCAP, &args)
        .map_err(|source| PipelineError::Generation { source })?;

    tracing::debug!(
        profile = %profile,
        tailored = tailoring.is_some(),
        bytes = output.len(),
        "Blueprint generated"
    );

    Ok(output)
}

/// Parse raw blueprint bytes into a [`Blueprint`]
pub fn parse(raw: &[u8]) -> Result<Blueprint> {
    let text = std::str::from_utf8(raw).map_err(|err| PipelineError::Parse {
        message: format!("blueprint output is not valid UTF-8: {}", err),
    })?;

    toml::from_str(text).map_err(|err| PipelineError::Parse {
        message: err.to_string(),
    })
}

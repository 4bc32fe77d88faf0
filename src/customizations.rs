//! Customizations document and normalization
//!
//! The final output schema consumed by the downstream image-building
//! system. [`normalize`] deterministically merges the parsed blueprint with
//! the profile identifier and its resolved description; a structurally
//! unusable blueprint fails the stage rather than producing a partial
//! document.

use serde::Serialize;

use crate::blueprint::Blueprint;
use crate::error::{PipelineError, Result};

/// Normalized customizations document
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Customizations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub packages: Option<Vec<String>>,

    pub openscap: OpenScapProfile,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel: Option<KernelCustomization>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<ServicesCustomization>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filesystem: Option<Vec<FilesystemCustomization>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fips: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub firewall: Option<FirewallCustomization>,
}

/// Profile identity carried through to the image definition
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OpenScapProfile {
    pub profile_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_description: Option<String>,
}

/// Kernel command-line arguments
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KernelCustomization {
    pub append: String,
}

/// Systemd unit states
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServicesCustomization {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enabled: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub masked: Vec<String>,
}

/// A required separate mountpoint with a minimum size
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FilesystemCustomization {
    pub mountpoint: String,
    pub min_size: u64,
}

/// Firewall rules
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FirewallCustomization {
    pub services: FirewallServicesCustomization,
}

/// Firewall service allow/deny lists
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FirewallServicesCustomization {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enabled: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled: Vec<String>,
}

/// Merge a blueprint with the profile identity into the target schema
pub fn normalize(
    profile: &str,
    description: &str,
    blueprint: &Blueprint,
) -> Result<Customizations> {
    let packages = map_packages(blueprint)?;
    let custom = blueprint.customizations.as_ref();

    let kernel = custom
        .and_then(|c| c.kernel.as_ref())
        .and_then(|k| k.append.as_ref())
        .filter(|append| !append.is_empty())
        .map(|append| KernelCustomization {
            append: append.clone(),
        });

    let services = custom.and_then(|c| c.services.as_ref()).and_then(|s| {
        if s.enabled.is_empty() && s.disabled.is_empty() && s.masked.is_empty() {
            None
        } else {
            Some(ServicesCustomization {
                enabled: s.enabled.clone(),
                disabled: s.disabled.clone(),
                masked: s.masked.clone(),
            })
        }
    });

    let filesystem = match custom {
        Some(c) if !c.filesystem.is_empty() => Some(map_filesystems(c)?),
        _ => None,
    };

    let fips = custom
        .and_then(|c| c.fips.as_ref())
        .map(|fips| fips.enabled);

    let firewall = custom
        .and_then(|c| c.firewall.as_ref())
        .and_then(|f| f.services.as_ref())
        .and_then(|s| {
            if s.enabled.is_empty() && s.disabled.is_empty() {
                None
            } else {
                Some(FirewallCustomization {
                    services: FirewallServicesCustomization {
                        enabled: s.enabled.clone(),
                        disabled: s.disabled.clone(),
                    },
                })
            }
        });

    Ok(Customizations {
        packages,
        openscap: OpenScapProfile {
            profile_id: profile.to_string(),
            profile_description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
        },
        kernel,
        services,
        filesystem,
        fips,
        firewall,
    })
}

fn map_packages(blueprint: &Blueprint) -> Result<Option<Vec<String>>> {
    if blueprint.packages.is_empty() {
        return Ok(None);
    }

    let names = blueprint
        .packages
        .iter()
        .map(|package| match package.name.as_deref() {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => Err(PipelineError::mapping("blueprint package without a name")),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(names))
}

fn map_filesystems(
    custom: &crate::blueprint::BlueprintCustomizations,
) -> Result<Vec<FilesystemCustomization>> {
    custom
        .filesystem
        .iter()
        .map(|entry| {
            let mountpoint = match entry.mountpoint.as_deref() {
                Some(mountpoint) if !mountpoint.is_empty() => mountpoint.to_string(),
                _ => {
                    return Err(PipelineError::mapping(
                        "blueprint filesystem entry without a mountpoint",
                    ))
                }
            };
            let min_size = entry.size.ok_or_else(|| {
                PipelineError::mapping(format!(
                    "blueprint filesystem entry for {} without a size",
                    mountpoint
                ))
            })?;
            Ok(FilesystemCustomization {
                mountpoint,
                min_size,
            })
        })
        .collect()
}

//! Tailoring translation
//!
//! A tailoring is a user-supplied customization of a compliance profile's
//! rules, supplied as JSON. The blueprint generator only accepts the XCCDF
//! XML tailoring format, so a non-empty payload is written to a temp file
//! and converted with the `autotailor` tool. An absent or empty payload is
//! resolved to [`Tailoring::Absent`] once at the boundary: a blank tailoring
//! would only produce a semantically meaningless XML file, so it always
//! takes the no-tailoring path.

use std::ffi::OsString;

use crate::artifact::{ArtifactKind, TempArtifact};
use crate::error::{PipelineError, Result};
use crate::tool::ExternalTool;

/// Program that converts JSON tailorings to XCCDF tailoring XML
pub const AUTOTAILOR: &str = "autotailor";

/// Optional tailoring payload, resolved once at the request boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tailoring {
    /// No tailoring: the profile's default rule set applies
    Absent,
    /// Raw JSON tailoring payload
    Payload(String),
}

impl Tailoring {
    /// Resolve a raw request field into a tailoring variant
    ///
    /// Absent and empty-string payloads are both `Absent`; downstream stages
    /// never re-interpret an empty string as a special case.
    pub fn from_request(raw: Option<&str>) -> Self {
        match raw {
            Some(payload) if !payload.is_empty() => Self::Payload(payload.to_string()),
            _ => Self::Absent,
        }
    }
}

/// Convert a tailoring into the XML artifact the blueprint generator needs
///
/// Returns `Ok(None)` for [`Tailoring::Absent`] — an explicit non-error skip.
/// Otherwise the payload is written to a temporary JSON file and
/// `autotailor` converts it against the datastream into a second temporary
/// XML file, which is returned as an owning handle. The JSON intermediate is
/// always deleted before this function returns; on any failure the XML
/// artifact is deleted too.
pub fn translate(
    tool: &dyn ExternalTool,
    tailoring: &Tailoring,
    datastream: &str,
) -> Result<Option<TempArtifact>> {
    let payload = match tailoring {
        Tailoring::Absent => return Ok(None),
        Tailoring::Payload(json) => json,
    };

    let mut json_artifact = TempArtifact::create(ArtifactKind::TailoringJson)?;
    json_artifact.write(payload.as_bytes())?;

    let xml_artifact = TempArtifact::create(ArtifactKind::TailoringXml)?;

    let args = vec![
        OsString::from("-j"),
        json_artifact.path().into(),
        OsString::from("-o"),
        xml_artifact.path().into(),
        OsString::from(datastream),
    ];

    tool.invoke(AUTOTAILOR, &args)
        .map_err(|source| PipelineError::Translation { source })?;

    tracing::debug!(
        xml = %xml_artifact.path().display(),
        "Tailoring translated to XML"
    );

    // json_artifact drops here; xml_artifact drops on the error path above
    Ok(Some(xml_artifact))
}

//! Profile description lookup
//!
//! The generated blueprint does not carry the profile's human-readable
//! description, so it is resolved separately from the datastream with
//! `oscap info`. The lookup is independent of tailoring; a failure here is
//! fatal to the run because the merge stage requires a description for a
//! complete document.

use std::ffi::OsString;

use crate::blueprint::OSCAP;
use crate::error::{PipelineError, Result};
use crate::tool::ExternalTool;

/// Resolve the human-readable description of a profile from the datastream
pub fn resolve_description(
    tool: &dyn ExternalTool,
    profile: &str,
    datastream: &str,
) -> Result<String> {
    let args = vec![
        OsString::from("info"),
        OsString::from("--profile"),
        OsString::from(profile),
        OsString::from(datastream),
    ];

    let stdout = tool
        .invoke(OSCAP, &args)
        .map_err(|source| PipelineError::Description { source })?;

    let description = extract_description(&String::from_utf8_lossy(&stdout));
    tracing::debug!(profile = %profile, "Profile description resolved");

    Ok(description)
}

/// Scrape the `Description:` block from `oscap info` output
///
/// The block is the remainder of the `Description:` line plus any following
/// lines indented deeper than it; wrapped lines are joined with single
/// spaces. Returns an empty string when the block is missing.
fn extract_description(output: &str) -> String {
    let mut description = String::new();
    let mut lines = output.lines();

    while let Some(line) = lines.next() {
        let trimmed = line.trim_start();
        let Some(rest) = trimmed.strip_prefix("Description:") else {
            continue;
        };

        let indent = line.len() - trimmed.len();
        description.push_str(rest.trim());

        for continuation in lines.by_ref() {
            let cont_trimmed = continuation.trim_start();
            let cont_indent = continuation.len() - cont_trimmed.len();
            if cont_trimmed.is_empty() || cont_indent <= indent {
                break;
            }
            if !description.is_empty() {
                description.push(' ');
            }
            description.push_str(cont_trimmed.trim_end());
        }
        break;
    }

    description
}

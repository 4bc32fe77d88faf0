//! Pipeline orchestration
//!
//! Sequences one customizations run: resolve the profile description,
//! translate the optional tailoring, generate the blueprint, parse it,
//! normalize, serialize. The first failing stage terminates the run; no
//! stage is retried or runs out of order. All temporary artifacts are owned
//! by the run scope, so they are released before any result — success or
//! failure — is surfaced.

use std::sync::Arc;

use serde::Deserialize;

use crate::blueprint;
use crate::customizations;
use crate::description::resolve_description;
use crate::error::Result;
use crate::tailoring::{self, Tailoring};
use crate::tool::{ExternalTool, ProcessTool};

/// One customizations request, immutable once received
#[derive(Debug, Clone, Deserialize)]
pub struct CustomizationsRequest {
    /// Compliance profile identifier
    pub profile: String,
    /// Path to the compliance datastream document
    pub datastream: String,
    /// Raw JSON tailoring payload, if any
    #[serde(default)]
    pub tailoring: Option<String>,
}

/// Converts customizations requests into serialized customizations documents
pub struct Pipeline {
    tool: Arc<dyn ExternalTool>,
}

impl Pipeline {
    /// Create a pipeline backed by the given tool runner
    pub fn new(tool: Arc<dyn ExternalTool>) -> Self {
        Self { tool }
    }

    /// Create a pipeline that spawns real child processes
    pub fn with_process_tool() -> Self {
        Self::new(Arc::new(ProcessTool))
    }

    /// Run the full conversion for one request
    ///
    /// Returns the JSON bytes of the customizations document. Each stage
    /// that shells out blocks until the child process exits; callers that
    /// need a deadline impose it at the request boundary.
    pub fn run(&self, request: &CustomizationsRequest) -> Result<Vec<u8>> {
        tracing::info!(
            profile = %request.profile,
            datastream = %request.datastream,
            tailored = request.tailoring.as_deref().is_some_and(|t| !t.is_empty()),
            "Starting customizations run"
        );

        // The blueprint doesn't carry the profile description, so it is
        // resolved separately from the datastream.
        let description =
            resolve_description(&*self.tool, &request.profile, &request.datastream)?;

        let tailoring = Tailoring::from_request(request.tailoring.as_deref());
        let xml_artifact = tailoring::translate(&*self.tool, &tailoring, &request.datastream)?;

        let raw_blueprint = blueprint::generate(
            &*self.tool,
            &request.profile,
            &request.datastream,
            xml_artifact.as_ref().map(|artifact| artifact.path()),
        )?;

        let parsed = blueprint::parse(&raw_blueprint)?;
        let document = customizations::normalize(&request.profile, &description, &parsed)?;
        let body = serde_json::to_vec(&document)?;

        tracing::info!(
            profile = %request.profile,
            bytes = body.len(),
            "Customizations run completed"
        );

        // xml_artifact is released here, on this and every earlier exit path
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::OSCAP;
    use crate::error::PipelineError;
    use crate::tailoring::AUTOTAILOR;
    use crate::tool::fake::FakeTool;
    use std::ffi::OsString;
    use std::path::PathBuf;

    const CIS_PROFILE: &str = "xccdf_org.ssgproject.content_profile_cis";

    const SAMPLE_BLUEPRINT: &str = r#"
[[packages]]
name = "aide"
version = "*"

[customizations.services]
enabled = ["auditd"]
"#;

    fn request(tailoring: Option<&str>) -> CustomizationsRequest {
        CustomizationsRequest {
            profile: CIS_PROFILE.to_string(),
            datastream: "/data/ssg.xml".to_string(),
            tailoring: tailoring.map(str::to_string),
        }
    }

    fn pipeline_with(tool: FakeTool) -> (Pipeline, Arc<FakeTool>) {
        let tool = Arc::new(tool);
        (Pipeline::new(tool.clone()), tool)
    }

    #[test]
    fn test_run_without_tailoring() {
        let tool = FakeTool::new();
        tool.respond(OSCAP, b"\tDescription: CIS hardening baseline\n");
        tool.respond(OSCAP, SAMPLE_BLUEPRINT.as_bytes());
        let (pipeline, tool) = pipeline_with(tool);

        let body = pipeline.run(&request(None)).unwrap();
        let document: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(document["openscap"]["profile_id"], CIS_PROFILE);
        assert_eq!(
            document["openscap"]["profile_description"],
            "CIS hardening baseline"
        );
        assert_eq!(document["packages"][0], "aide");
        assert_eq!(document["services"]["enabled"][0], "auditd");

        // No tailoring: autotailor never runs and the generator gets no
        // tailoring reference.
        assert!(tool.calls_for(AUTOTAILOR).is_empty());
        let oscap_calls = tool.calls_for(OSCAP);
        assert_eq!(oscap_calls.len(), 2);
        assert!(!oscap_calls[1].contains(&OsString::from("--tailoring-file")));
    }

    #[test]
    fn test_run_empty_tailoring_takes_no_tailoring_path() {
        let tool = FakeTool::new();
        tool.respond(OSCAP, b"Description: desc\n");
        tool.respond(OSCAP, SAMPLE_BLUEPRINT.as_bytes());
        let (pipeline, tool) = pipeline_with(tool);

        pipeline.run(&request(Some(""))).unwrap();

        assert!(tool.calls_for(AUTOTAILOR).is_empty());
    }

    #[test]
    fn test_run_with_tailoring_invokes_translation() {
        let tool = FakeTool::new();
        tool.respond(OSCAP, b"Description: desc\n");
        tool.respond(OSCAP, SAMPLE_BLUEPRINT.as_bytes());
        let (pipeline, tool) = pipeline_with(tool);

        // "{}" is semantically empty but non-empty text, so it still takes
        // the translation path.
        pipeline.run(&request(Some("{}"))).unwrap();

        let autotailor_calls = tool.calls_for(AUTOTAILOR);
        assert_eq!(autotailor_calls.len(), 1);

        let generate_args = &tool.calls_for(OSCAP)[1];
        let position = generate_args
            .iter()
            .position(|arg| arg == &OsString::from("--tailoring-file"))
            .expect("generation references the tailoring artifact");

        // The artifact handed to the generator is the one autotailor wrote,
        // and it is gone once the run has returned.
        let xml_path = PathBuf::from(&generate_args[position + 1]);
        assert_eq!(OsString::from(&xml_path), autotailor_calls[0][3]);
        assert!(!xml_path.exists());
    }

    #[test]
    fn test_description_failure_terminates_run_without_artifacts() {
        let tool = FakeTool::new();
        tool.fail(OSCAP, "cannot read datastream");
        let (pipeline, tool) = pipeline_with(tool);

        let err = pipeline.run(&request(Some("{}"))).unwrap_err();
        assert!(matches!(err, PipelineError::Description { .. }));

        // Description resolution runs first; translation never started.
        assert!(tool.calls_for(AUTOTAILOR).is_empty());
        assert_eq!(tool.call_count(), 1);
    }

    #[test]
    fn test_generation_failure_cleans_up_tailoring_artifact() {
        let tool = FakeTool::new();
        tool.respond(OSCAP, b"Description: desc\n");
        tool.fail(OSCAP, "fix generation failed");
        let (pipeline, tool) = pipeline_with(tool);

        let err = pipeline.run(&request(Some("{}"))).unwrap_err();
        assert!(matches!(err, PipelineError::Generation { .. }));

        let autotailor_calls = tool.calls_for(AUTOTAILOR);
        let json_path = PathBuf::from(&autotailor_calls[0][1]);
        let xml_path = PathBuf::from(&autotailor_calls[0][3]);
        assert!(!json_path.exists());
        assert!(!xml_path.exists());
    }

    #[test]
    fn test_translation_failure_is_terminal() {
        let tool = FakeTool::new();
        tool.respond(OSCAP, b"Description: desc\n");
        tool.fail(AUTOTAILOR, "bad tailoring payload");
        let (pipeline, tool) = pipeline_with(tool);

        let err = pipeline.run(&request(Some("{\"x\":1}"))).unwrap_err();
        assert!(matches!(err, PipelineError::Translation { .. }));

        // Generation never ran: only the description lookup hit oscap.
        assert_eq!(tool.calls_for(OSCAP).len(), 1);
    }

    #[test]
    fn test_unparseable_blueprint_is_parse_error() {
        let tool = FakeTool::new();
        tool.respond(OSCAP, b"Description: desc\n");
        tool.respond(OSCAP, b"not [valid toml");
        let (pipeline, _tool) = pipeline_with(tool);

        let err = pipeline.run(&request(None)).unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
    }

    #[test]
    fn test_run_is_deterministic_for_fixed_inputs() {
        let run_once = || {
            let tool = FakeTool::new();
            tool.respond(OSCAP, b"Description: desc\n");
            tool.respond(OSCAP, SAMPLE_BLUEPRINT.as_bytes());
            let (pipeline, _tool) = pipeline_with(tool);
            pipeline.run(&request(None)).unwrap()
        };

        assert_eq!(run_once(), run_once());
    }
}

//! # oscap-customizations
//!
//! Converts a security-compliance profile selection, optionally with a
//! user-supplied tailoring, into a normalized customizations document for a
//! downstream image-building system.
//!
//! The conversion pipeline is:
//!
//! 1. Resolve the profile's description from the datastream (`oscap info`)
//! 2. Translate the optional JSON tailoring to XCCDF XML (`autotailor`)
//! 3. Generate a TOML blueprint for the profile (`oscap xccdf generate fix`)
//! 4. Parse the blueprint and normalize it, merged with the profile
//!    identity, into the customizations schema
//! 5. Serialize the document to JSON
//!
//! Temporary artifacts created along the way are scoped to the run and
//! deleted on every exit path. Every stage failure is terminal and surfaces
//! as a single error with the failing stage and its cause attached.
//!
//! ## Usage
//!
//! ```ignore
//! use oscap_customizations::{CustomizationsRequest, Pipeline};
//!
//! let pipeline = Pipeline::with_process_tool();
//! let body = pipeline.run(&CustomizationsRequest {
//!     profile: "xccdf_org.ssgproject.content_profile_cis".to_string(),
//!     datastream: "/data/ssg.xml".to_string(),
//!     tailoring: None,
//! })?;
//! ```

mod artifact;
mod blueprint;
mod customizations;
mod description;
mod error;
mod pipeline;
pub mod server;
mod tailoring;
mod tool;

// Re-exports
pub use artifact::{ArtifactKind, TempArtifact};
pub use blueprint::{generate, parse, Blueprint};
pub use customizations::{normalize, Customizations, OpenScapProfile};
pub use description::resolve_description;
pub use error::{PipelineError, Result};
pub use pipeline::{CustomizationsRequest, Pipeline};
pub use tailoring::{translate, Tailoring};
pub use tool::{ExternalTool, ProcessTool, ToolError};

//! External tool invocation
//!
//! The pipeline shells out to the OpenSCAP toolchain (`oscap`, `autotailor`).
//! Process management is isolated behind the [`ExternalTool`] trait so every
//! stage can be exercised against a scripted fake in tests; [`ProcessTool`]
//! is the production implementation backed by synchronous child processes
//! with captured output.

use std::ffi::OsString;
use std::process::Command;

use thiserror::Error;

/// Errors from invoking an external tool
#[derive(Error, Debug)]
pub enum ToolError {
    /// The process could not be started at all
    #[error("failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited unsuccessfully
    #[error("{program} exited unsuccessfully (code {code}): {stderr}")]
    Failed {
        program: String,
        code: i32,
        stderr: String,
    },
}

/// Capability to invoke an external tool and capture its standard output
///
/// Implementations must be safe to share across concurrent pipeline runs;
/// nothing here holds state between invocations.
pub trait ExternalTool: Send + Sync {
    /// Run `program` with `args`, returning captured stdout on exit 0
    fn invoke(&self, program: &str, args: &[OsString]) -> Result<Vec<u8>, ToolError>;
}

/// Production tool runner using blocking child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessTool;

impl ExternalTool for ProcessTool {
    fn invoke(&self, program: &str, args: &[OsString]) -> Result<Vec<u8>, ToolError> {
        tracing::debug!(program = %program, "Invoking external tool");

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| ToolError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ToolError::Failed {
                program: program.to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        Ok(output.stdout)
    }
}

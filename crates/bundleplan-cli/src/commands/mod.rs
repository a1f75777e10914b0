pub mod build_plan;
pub mod explain;
pub mod fingerprint;
pub mod test_plan;
pub mod version;

use bundleplan_core::version::SCHEMA_VERSION;
use bundleplan_core::Project;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::Path;

/// Exit code for plan or project errors.
pub const EXIT_ERROR: i32 = 1;

#[derive(Serialize)]
struct ErrorJson<'a> {
    code: &'a str,
    message: String,
}

#[derive(Serialize)]
struct ErrorResult<'a> {
    schema_version: u32,
    ok: bool,
    error: ErrorJson<'a>,
    notes: Vec<String>,
}

/// Successful JSON output: `{schema_version, ok: true, ...payload}`.
#[derive(Serialize)]
pub struct OkResult<T: Serialize> {
    pub schema_version: u32,
    pub ok: bool,
    #[serde(flatten)]
    pub payload: T,
}

/// Print `payload` as a JSON success result on stdout.
pub fn print_ok<T: Serialize>(payload: T) -> Result<()> {
    let result = OkResult {
        schema_version: SCHEMA_VERSION,
        ok: true,
        payload,
    };
    println!("{}", serde_json::to_string(&result).into_diagnostic()?);
    Ok(())
}

/// Report a failure.
///
/// In JSON mode the error goes to stdout as a result object and the process
/// exits; otherwise the returned diagnostic is propagated by the caller.
pub fn fail(json: bool, code: &str, message: String, notes: Vec<String>) -> miette::Report {
    if json {
        let result = ErrorResult {
            schema_version: SCHEMA_VERSION,
            ok: false,
            error: ErrorJson { code, message },
            notes,
        };
        match serde_json::to_string(&result) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("error: failed to serialize error result: {e}"),
        }
        std::process::exit(EXIT_ERROR);
    }

    let mut report = format!("{code}: {message}");
    for note in notes {
        report.push_str("\n  ");
        report.push_str(&note);
    }
    miette::miette!("{report}")
}

/// Load the project, reporting failures in the command's output format.
pub fn load_project(cwd: &Path, json: bool) -> Result<Project> {
    Project::load(cwd).map_err(|e| {
        let notes = vec!["hint: run from a directory containing package.json".to_string()];
        fail(json, e.code(), e.to_string(), notes)
    })
}

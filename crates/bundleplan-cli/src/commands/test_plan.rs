//! `bundleplan test-plan` command implementation.

use super::{fail, load_project, print_ok};
use bundleplan_core::{make_test_plan, Config, TestPlan};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct TestPlanJson<'a> {
    plan: &'a TestPlan,
}

#[derive(Serialize)]
struct TestFilesJson {
    pattern: String,
    files: Vec<PathBuf>,
}

/// Run the test-plan command.
pub fn run(config: &Config, list_files: bool) -> Result<()> {
    let json = config.json_logs;
    let project = load_project(&config.cwd, json)?;
    let plan = make_test_plan(&project);

    if list_files {
        let files = match plan.discover_test_files(&project.root) {
            Ok(files) => files,
            Err(e) => return Err(fail(json, e.code(), e.to_string(), Vec::new())),
        };

        if json {
            return print_ok(TestFilesJson {
                pattern: plan.test_file_pattern().to_string(),
                files,
            });
        }

        if files.is_empty() {
            println!("No test files found.");
            println!("hint: create files matching {}", plan.test_file_pattern());
        }
        for file in files {
            println!("{}", file.display());
        }
        return Ok(());
    }

    if json {
        return print_ok(TestPlanJson { plan: &plan });
    }

    let browsers: Vec<_> = plan.browsers.iter().map(|b| b.as_str()).collect();
    println!("browsers: {}", browsers.join(", "));
    println!("tests:    {}", plan.test_file_pattern());
    println!("coverage: {}", plan.coverage_output_dir());
    println!("steps:");
    for step in plan.steps() {
        println!("  {}", step.kind());
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&plan).into_diagnostic()?);
    Ok(())
}

//! `bundleplan build-plan` command implementation.

use super::{load_project, print_ok};
use bundleplan_core::{make_build_plan, BuildPlan, Config, Mode};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
struct BuildPlanJson<'a> {
    plan: &'a BuildPlan,
    stylesheets: BTreeMap<&'a str, String>,
    constants: BTreeMap<&'static str, String>,
}

/// Run the build-plan command.
pub fn run(config: &Config, mode: Mode) -> Result<()> {
    let project = load_project(&config.cwd, config.json_logs)?;
    let plan = make_build_plan(mode, &project);

    tracing::debug!(%mode, steps = plan.plugins.len(), "built plan");

    if config.json_logs {
        return print_ok(BuildPlanJson {
            plan: &plan,
            stylesheets: plan.stylesheets(),
            constants: plan.constants(),
        });
    }

    print_summary(&plan);
    println!();
    println!("{}", serde_json::to_string_pretty(&plan).into_diagnostic()?);
    Ok(())
}

fn print_summary(plan: &BuildPlan) {
    println!("mode:     {}", plan.mode);
    println!("minimize: {}", plan.optimization.minimize);
    println!(
        "output:   {}/{}",
        plan.output.path.display(),
        plan.output.filename
    );
    let stylesheets = plan.stylesheets();
    for (name, files) in &plan.entry {
        println!("entry:    {name} <- {}", files.join(", "));
        if let Some(css) = stylesheets.get(name.as_str()) {
            println!("          {name} -> {css}");
        }
    }
    for (ident, literal) in plan.constants() {
        println!("define:   {ident} = {literal}");
    }
    println!("rules:");
    for rule in plan.rules() {
        let chain: Vec<_> = rule.handlers.iter().map(|h| h.loader_name()).collect();
        println!("  {:<32} {}", rule.test, chain.join(" -> "));
    }
    println!("steps:");
    for step in plan.steps() {
        println!("  {}", step.kind());
    }
}

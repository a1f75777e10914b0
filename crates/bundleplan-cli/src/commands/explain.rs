//! `bundleplan explain` command implementation.
//!
//! Shows which rules match a file and the handler chain they produce. For
//! extracted stylesheets it also shows the public path their asset URLs
//! resolve against.

use super::{fail, load_project, print_ok};
use bundleplan_core::naming::relative_public_path;
use bundleplan_core::plan::PublicPath;
use bundleplan_core::{make_build_plan, make_test_plan, CompiledRules, Config, Handler, Mode, Rule};
use miette::Result;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct ExplainJson<'a> {
    file: String,
    plan: &'static str,
    rules: Vec<&'a Rule>,
    handlers: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    public_path: Option<String>,
}

/// Run the explain command.
pub fn run(config: &Config, file: &Path, test: bool, mode: Mode) -> Result<()> {
    let json = config.json_logs;
    let project = load_project(&config.cwd, json)?;

    // Rule conditions match against full paths.
    let path = project.root.join(file);

    let (label, rules) = if test {
        ("test", make_test_plan(&project).bundle.module.rules)
    } else {
        (mode.as_str(), make_build_plan(mode, &project).module.rules)
    };

    let compiled = match CompiledRules::compile(&rules) {
        Ok(compiled) => compiled,
        Err(e) => return Err(fail(json, e.code(), e.to_string(), Vec::new())),
    };

    let matching = compiled.matching(&path);
    let chain = compiled.handlers_for(&path);
    let public_path = chain.iter().find_map(|h| match h {
        Handler::ExtractCss {
            public_path: PublicPath::RelativeToContext,
        } => Some(relative_public_path(&path, &project.root)),
        _ => None,
    });
    let handlers: Vec<&'static str> = chain.into_iter().map(Handler::loader_name).collect();

    if json {
        return print_ok(ExplainJson {
            file: path.display().to_string(),
            plan: label,
            rules: matching,
            handlers,
            public_path,
        });
    }

    println!("{} ({label})", path.display());
    if handlers.is_empty() {
        println!("  no rule matches; emitted unchanged");
    } else {
        println!("  {}", handlers.join(" -> "));
    }
    if let Some(public_path) = public_path {
        println!("  public path: {public_path}");
    }
    Ok(())
}

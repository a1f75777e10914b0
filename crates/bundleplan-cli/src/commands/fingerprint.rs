//! `bundleplan fingerprint` command implementation.

use super::{fail, print_ok};
use bundleplan_core::naming::render_filename_for_file;
use bundleplan_core::plan::OUTPUT_FILENAME;
use bundleplan_core::{codes, Config, Error};
use miette::Result;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct FingerprintJson {
    file: String,
    name: String,
    template: &'static str,
    output: String,
}

/// Run the fingerprint command.
pub fn run(config: &Config, file: &Path, name: Option<&str>) -> Result<()> {
    let json = config.json_logs;
    let path = config.cwd.join(file);

    let name = name.map_or_else(
        || {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        },
        str::to_string,
    );

    let output = match render_filename_for_file(OUTPUT_FILENAME, &name, &path) {
        Ok(output) => output,
        Err(Error::Io(e)) => {
            return Err(fail(
                json,
                codes::PLAN_IO_ERROR,
                format!("Failed to read {}: {e}", path.display()),
                Vec::new(),
            ))
        }
        Err(e) => return Err(fail(json, e.code(), e.to_string(), Vec::new())),
    };

    if json {
        return print_ok(FingerprintJson {
            file: path.display().to_string(),
            name,
            template: OUTPUT_FILENAME,
            output,
        });
    }

    println!("{output}");
    Ok(())
}

//! Project description read from `package.json`.
//!
//! The build plan embeds the package version as a global constant. Reading
//! it happens here, once, so plan construction itself stays free of I/O.

use crate::Error;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Package descriptor file name.
pub const PACKAGE_JSON: &str = "package.json";

/// The project a plan is built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    /// Absolute project root. Every path in a plan is anchored here.
    pub root: PathBuf,
    /// Package name, if declared.
    pub name: Option<String>,
    /// Package version, injected as `VERSION` into the bundle.
    pub version: String,
}

#[derive(Deserialize)]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
}

impl Project {
    /// Describe a project without reading anything from disk.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            name: None,
            version: version.into(),
        }
    }

    /// Load the project rooted at `root` from its `package.json`.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(PACKAGE_JSON);
        if !path.exists() {
            return Err(Error::PackageJsonNotFound { path });
        }

        let content = std::fs::read_to_string(&path)?;
        let pkg: PackageJson = serde_json::from_str(&content)
            .map_err(|source| Error::PackageJsonInvalid {
                path: path.clone(),
                source,
            })?;

        let version = pkg
            .version
            .ok_or_else(|| Error::VersionMissing { path: path.clone() })?;

        tracing::debug!(path = %path.display(), %version, "loaded package.json");

        Ok(Self {
            root: root.to_path_buf(),
            name: pkg.name,
            version,
        })
    }
}

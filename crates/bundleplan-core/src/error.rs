use crate::codes;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for bundleplan operations.
///
/// Plan construction itself never fails; these come from loading the
/// project, compiling rule patterns and rendering filenames.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("package.json not found at {path}")]
    PackageJsonNotFound { path: PathBuf },

    #[error("Failed to parse package.json at {path}: {source}")]
    PackageJsonInvalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("package.json at {path} has no \"version\" field")]
    VersionMissing { path: PathBuf },

    #[error("Invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex_lite::Error,
    },

    #[error("Invalid glob `{pattern}`: {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Filename template `{template}` has no [contenthash] token")]
    MissingContentHash { template: String },
}

impl Error {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => codes::PLAN_IO_ERROR,
            Self::PackageJsonNotFound { .. } => codes::PLAN_PACKAGE_JSON_NOT_FOUND,
            Self::PackageJsonInvalid { .. } => codes::PLAN_PACKAGE_JSON_INVALID,
            Self::VersionMissing { .. } => codes::PLAN_VERSION_MISSING,
            Self::InvalidPattern { .. } => codes::PLAN_INVALID_PATTERN,
            Self::InvalidGlob { .. } => codes::PLAN_INVALID_GLOB,
            Self::MissingContentHash { .. } => codes::PLAN_MISSING_CONTENT_HASH,
        }
    }
}

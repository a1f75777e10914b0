//! Stable error codes surfaced in JSON output.
//!
//! All codes are SCREAMING_SNAKE_CASE and stable across versions.

/// I/O error while reading project files or writing descriptors.
pub const PLAN_IO_ERROR: &str = "PLAN_IO_ERROR";

/// package.json not found in the project root.
pub const PLAN_PACKAGE_JSON_NOT_FOUND: &str = "PLAN_PACKAGE_JSON_NOT_FOUND";

/// package.json could not be parsed.
pub const PLAN_PACKAGE_JSON_INVALID: &str = "PLAN_PACKAGE_JSON_INVALID";

/// package.json has no "version" field.
pub const PLAN_VERSION_MISSING: &str = "PLAN_VERSION_MISSING";

/// A rule condition is not a valid regular expression.
pub const PLAN_INVALID_PATTERN: &str = "PLAN_INVALID_PATTERN";

/// A test file pattern is not a valid glob.
pub const PLAN_INVALID_GLOB: &str = "PLAN_INVALID_GLOB";

/// An output filename template lacks the content fingerprint token.
pub const PLAN_MISSING_CONTENT_HASH: &str = "PLAN_MISSING_CONTENT_HASH";

/// The external test runner could not be launched or died abnormally.
pub const PLAN_RUNNER_INFRASTRUCTURE_ERROR: &str = "PLAN_RUNNER_INFRASTRUCTURE_ERROR";

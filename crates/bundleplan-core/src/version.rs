use std::fmt::Write;

/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Schema version of the JSON descriptors and command output.
/// Bump this when changing the serialized shape of a plan.
pub const SCHEMA_VERSION: u32 = 1;

/// Returns a formatted version string including build metadata if available.
#[must_use]
pub fn version_string() -> String {
    let mut s = format!("bundleplan {VERSION}");

    if let Some(hash) = option_env!("BUNDLEPLAN_BUILD_GIT_HASH") {
        let _ = write!(s, " ({hash})");
    }

    s
}

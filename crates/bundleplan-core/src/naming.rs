//! Output naming rules.
//!
//! Filenames in a plan are templates. An external bundler fills them in;
//! these helpers apply the same substitutions so plans can be checked and
//! explained without running one.

use crate::Error;
use bundleplan_util::hash::{content_hash, content_hash_file};
use std::path::{Component, Path};

/// Placeholder for the entry or chunk name.
pub const NAME_TOKEN: &str = "[name]";

/// Placeholder for the content fingerprint.
pub const CONTENT_HASH_TOKEN: &str = "[contenthash]";

/// Hex characters of the digest kept in a rendered filename.
pub const CONTENT_HASH_LENGTH: usize = 20;

/// Whether `template` embeds a content fingerprint.
#[must_use]
pub fn has_content_hash(template: &str) -> bool {
    template.contains(CONTENT_HASH_TOKEN)
}

/// Render an output filename for a chunk called `name` with the given content.
///
/// Templates without a fingerprint token are rejected: two builds with
/// different content must never share a name.
pub fn render_filename(template: &str, name: &str, content: &[u8]) -> Result<String, Error> {
    check_template(template)?;
    Ok(fill(template, name, &content_hash(content, CONTENT_HASH_LENGTH)))
}

/// Like [`render_filename`], hashing the file at `path`.
///
/// The template is checked before the file is opened.
pub fn render_filename_for_file(
    template: &str,
    name: &str,
    path: &Path,
) -> Result<String, Error> {
    check_template(template)?;
    let hash = content_hash_file(path, CONTENT_HASH_LENGTH)?;
    Ok(fill(template, name, &hash))
}

fn check_template(template: &str) -> Result<(), Error> {
    if has_content_hash(template) {
        Ok(())
    } else {
        Err(Error::MissingContentHash {
            template: template.to_string(),
        })
    }
}

fn fill(template: &str, name: &str, hash: &str) -> String {
    template
        .replace(NAME_TOKEN, name)
        .replace(CONTENT_HASH_TOKEN, hash)
}

/// Filename of the stylesheet extracted from chunk `name`.
///
/// Script directories are mirrored into style directories: occurrences of
/// `from` in the chunk name become `to`.
#[must_use]
pub fn css_output_name(name: &str, from: &str, to: &str) -> String {
    format!("{}.css", name.replace(from, to))
}

/// Public path for assets referenced from an extracted stylesheet.
///
/// The path from the directory holding `resource` back to `context`, with a
/// trailing slash. Computed lexically; nothing is read from disk.
#[must_use]
pub fn relative_public_path(resource: &Path, context: &Path) -> String {
    let from: Vec<Component<'_>> = resource
        .parent()
        .map(|p| p.components().collect())
        .unwrap_or_default();
    let to: Vec<Component<'_>> = context.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".to_string());
    }
    for component in &to[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    let mut out = parts.join("/");
    out.push('/');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_filename() {
        let rendered = render_filename("[name].[contenthash].js", "boot", b"console.log(1)").unwrap();
        assert!(rendered.starts_with("boot."));
        assert!(rendered.ends_with(".js"));
        // "boot." + 20 hex chars + ".js"
        assert_eq!(rendered.len(), 5 + CONTENT_HASH_LENGTH + 3);
    }

    #[test]
    fn test_render_filename_changes_with_content() {
        let a = render_filename("[name].[contenthash].js", "boot", b"a").unwrap();
        let b = render_filename("[name].[contenthash].js", "boot", b"b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_render_filename_requires_hash() {
        let err = render_filename("[name].js", "boot", b"a").unwrap_err();
        assert!(matches!(err, Error::MissingContentHash { .. }));
    }

    #[test]
    fn test_render_filename_for_file_matches_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boot.js");
        std::fs::write(&path, "console.log(1)").unwrap();

        assert_eq!(
            render_filename_for_file("[name].[contenthash].js", "boot", &path).unwrap(),
            render_filename("[name].[contenthash].js", "boot", b"console.log(1)").unwrap()
        );
    }

    #[test]
    fn test_render_filename_for_file_errors() {
        let missing = Path::new("/nonexistent/boot.js");

        // Template problems win over a missing file.
        let err = render_filename_for_file("[name].js", "boot", missing).unwrap_err();
        assert!(matches!(err, Error::MissingContentHash { .. }));

        let err = render_filename_for_file("[name].[contenthash].js", "boot", missing).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_css_output_name() {
        assert_eq!(css_output_name("boot", "/js/", "/css/"), "boot.css");
        assert_eq!(
            css_output_name("app/js/editor", "/js/", "/css/"),
            "app/css/editor.css"
        );
    }

    #[test]
    fn test_relative_public_path() {
        assert_eq!(
            relative_public_path(Path::new("/app/assets/css/boot.css"), Path::new("/app")),
            "../../"
        );
        assert_eq!(
            relative_public_path(Path::new("/app/boot.css"), Path::new("/app")),
            "/"
        );
        assert_eq!(
            relative_public_path(Path::new("/app/css/boot.css"), Path::new("/app/fonts")),
            "../fonts/"
        );
    }
}

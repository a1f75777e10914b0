//! Post-processing steps.
//!
//! Steps are a closed set of variants, so removing a kind of step from a
//! plan is a structural match on [`StepKind`] rather than a type check.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Icon source for the web app manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestIcon {
    pub src: PathBuf,
    /// Square sizes (in pixels) rendered from `src`.
    pub sizes: Vec<u32>,
}

/// Progressive web app manifest contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WebManifest {
    pub name: String,
    pub short_name: String,
    pub description: String,
    pub start_url: String,
    pub display: String,
    pub background_color: String,
    pub theme_color: String,
    pub icons: Vec<ManifestIcon>,
}

/// A unit of work performed after module transformation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Step {
    /// Empty the output directory before emitting.
    CleanOutput,
    /// Write extracted styles to their own files. Chunk names have
    /// `rewrite_from` replaced by `rewrite_to`.
    ExtractStyles {
        rewrite_from: String,
        rewrite_to: String,
    },
    /// Render the HTML entry page from a template.
    InjectHtml {
        template: PathBuf,
        /// Whether the executor injects asset tags itself.
        inject: bool,
        /// Assets never referenced from the page.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        exclude_assets: Vec<String>,
    },
    /// Keep assets out of the emitted asset manifest.
    ExcludeAssetsFromManifest { paths: Vec<String> },
    /// Replace the global `VERSION` identifier at build time.
    DefineGlobalConstants { version: String },
    GenerateManifest(WebManifest),
    GenerateServiceWorker { entry: PathBuf, output_name: String },
    CopyAssets { from: PathBuf, to: PathBuf },
    GenerateFavicons {
        logo: PathBuf,
        output_path: String,
        inject: bool,
    },
    /// Recompress images whose path matches `test`.
    CompressImages { test: String, png_quality: String },
}

/// The tag of a [`Step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    CleanOutput,
    ExtractStyles,
    InjectHtml,
    ExcludeAssetsFromManifest,
    DefineGlobalConstants,
    GenerateManifest,
    GenerateServiceWorker,
    CopyAssets,
    GenerateFavicons,
    CompressImages,
}

impl Step {
    #[must_use]
    pub fn kind(&self) -> StepKind {
        match self {
            Self::CleanOutput => StepKind::CleanOutput,
            Self::ExtractStyles { .. } => StepKind::ExtractStyles,
            Self::InjectHtml { .. } => StepKind::InjectHtml,
            Self::ExcludeAssetsFromManifest { .. } => StepKind::ExcludeAssetsFromManifest,
            Self::DefineGlobalConstants { .. } => StepKind::DefineGlobalConstants,
            Self::GenerateManifest(_) => StepKind::GenerateManifest,
            Self::GenerateServiceWorker { .. } => StepKind::GenerateServiceWorker,
            Self::CopyAssets { .. } => StepKind::CopyAssets,
            Self::GenerateFavicons { .. } => StepKind::GenerateFavicons,
            Self::CompressImages { .. } => StepKind::CompressImages,
        }
    }

    /// Global constants this step injects, as `(identifier, JSON literal)`.
    #[must_use]
    pub fn constants(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::DefineGlobalConstants { version } => {
                vec![("VERSION", serde_json::Value::from(version.as_str()).to_string())]
            }
            _ => Vec::new(),
        }
    }
}

impl StepKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CleanOutput => "clean-output",
            Self::ExtractStyles => "extract-styles",
            Self::InjectHtml => "inject-html",
            Self::ExcludeAssetsFromManifest => "exclude-assets-from-manifest",
            Self::DefineGlobalConstants => "define-global-constants",
            Self::GenerateManifest => "generate-manifest",
            Self::GenerateServiceWorker => "generate-service-worker",
            Self::CopyAssets => "copy-assets",
            Self::GenerateFavicons => "generate-favicons",
            Self::CompressImages => "compress-images",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_tag_matches_kind_name() {
        let steps = [
            Step::CleanOutput,
            Step::DefineGlobalConstants {
                version: "1.2.3".to_string(),
            },
            Step::CopyAssets {
                from: PathBuf::from("/app/assets/svg"),
                to: PathBuf::from("/app/dist/assets/svg"),
            },
        ];

        for step in steps {
            let json = serde_json::to_value(&step).unwrap();
            assert_eq!(json["kind"], step.kind().as_str());
        }
    }

    #[test]
    fn test_manifest_fields_are_flattened() {
        let step = Step::GenerateManifest(WebManifest {
            name: "Suite".to_string(),
            short_name: "S".to_string(),
            description: String::new(),
            start_url: "index.html".to_string(),
            display: "standalone".to_string(),
            background_color: "#fff".to_string(),
            theme_color: "red".to_string(),
            icons: vec![],
        });

        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["kind"], "generate-manifest");
        assert_eq!(json["short_name"], "S");

        let back: Step = serde_json::from_value(json).unwrap();
        assert_eq!(back, step);
    }

    #[test]
    fn test_define_constants_are_json_literals() {
        let step = Step::DefineGlobalConstants {
            version: "7.0.1".to_string(),
        };
        assert_eq!(step.constants(), vec![("VERSION", "\"7.0.1\"".to_string())]);
        assert!(Step::CleanOutput.constants().is_empty());
    }

    const ALL_KINDS: [StepKind; 10] = [
        StepKind::CleanOutput,
        StepKind::ExtractStyles,
        StepKind::InjectHtml,
        StepKind::ExcludeAssetsFromManifest,
        StepKind::DefineGlobalConstants,
        StepKind::GenerateManifest,
        StepKind::GenerateServiceWorker,
        StepKind::CopyAssets,
        StepKind::GenerateFavicons,
        StepKind::CompressImages,
    ];

    #[test]
    fn test_all_kinds_are_distinct() {
        let names: std::collections::BTreeSet<_> =
            ALL_KINDS.iter().map(StepKind::as_str).collect();
        assert_eq!(names.len(), ALL_KINDS.len());
    }
}

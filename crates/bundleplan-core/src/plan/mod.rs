//! Build plans.
//!
//! A [`BuildPlan`] is a complete, serializable description of how an
//! external bundler packages the application: entry points, output naming,
//! chunk splitting, per-file-type handler chains and post-processing steps.
//!
//! ## Mode
//!
//! The plan is a pure function of the [`Mode`] and the [`Project`]. Mode only
//! toggles minification; the rule list and the step list are identical for
//! every mode, so a production build and the development build used for
//! tests run the same pipeline.

mod mode;
mod rules;
mod steps;

pub use mode::Mode;
pub use rules::{CompiledRules, Enforce, Handler, PublicPath, Rule};
pub use steps::{ManifestIcon, Step, StepKind, WebManifest};

use crate::naming;
use crate::Project;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Output directory, relative to the project root.
pub const OUTPUT_DIR: &str = "dist";

/// Output filename template. Always fingerprinted.
pub const OUTPUT_FILENAME: &str = "[name].[contenthash].js";

/// Where emitted files are served from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub path: PathBuf,
    pub public_path: String,
    pub filename: String,
}

impl Output {
    #[must_use]
    pub fn has_content_hash(&self) -> bool {
        naming::has_content_hash(&self.filename)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Minimizer {
    Terser,
    CssAssets,
}

/// How module ids are assigned. Hashed ids stay stable across builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleIds {
    Hashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeChunk {
    /// One runtime chunk shared by every entry.
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkSelection {
    All,
    Async,
    Initial,
}

/// A group of modules split into its own chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheGroup {
    pub test: String,
    pub name: String,
    pub chunks: ChunkSelection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitChunks {
    pub cache_groups: BTreeMap<String, CacheGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Optimization {
    pub minimize: bool,
    pub minimizers: Vec<Minimizer>,
    pub module_ids: ModuleIds,
    pub runtime_chunk: RuntimeChunk,
    pub split_chunks: SplitChunks,
}

/// Module transformation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub rules: Vec<Rule>,
}

/// Complete build description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub mode: Mode,
    pub entry: BTreeMap<String, Vec<String>>,
    pub output: Output,
    pub optimization: Optimization,
    pub module: Module,
    pub plugins: Vec<Step>,
}

impl BuildPlan {
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.module.rules
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.plugins
    }

    #[must_use]
    pub fn step_kinds(&self) -> Vec<StepKind> {
        self.plugins.iter().map(Step::kind).collect()
    }

    /// Stylesheet extracted from each entry chunk, keyed by entry name.
    /// Empty when the plan extracts no styles.
    #[must_use]
    pub fn stylesheets(&self) -> BTreeMap<&str, String> {
        self.plugins
            .iter()
            .find_map(|step| match step {
                Step::ExtractStyles {
                    rewrite_from,
                    rewrite_to,
                } => Some(
                    self.entry
                        .keys()
                        .map(|name| {
                            (
                                name.as_str(),
                                naming::css_output_name(name, rewrite_from, rewrite_to),
                            )
                        })
                        .collect(),
                ),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Global constants injected by the plan's steps.
    #[must_use]
    pub fn constants(&self) -> BTreeMap<&'static str, String> {
        self.plugins.iter().flat_map(Step::constants).collect()
    }

    /// Compile the plan's rule conditions for evaluation.
    pub fn compile_rules(&self) -> Result<CompiledRules<'_>, crate::Error> {
        CompiledRules::compile(&self.module.rules)
    }
}

/// Build the plan for `project` in `mode`.
///
/// Pure: no filesystem access, same inputs give structurally identical plans.
#[must_use]
pub fn make_build_plan(mode: Mode, project: &Project) -> BuildPlan {
    let root = &project.root;

    let mut entry = BTreeMap::new();
    entry.insert(
        "boot".to_string(),
        vec![
            "./src/boot.js".to_string(),
            "./assets/css/boot.css".to_string(),
        ],
    );

    let mut cache_groups = BTreeMap::new();
    cache_groups.insert(
        "vendor".to_string(),
        CacheGroup {
            test: r"[\\/]node_modules[\\/]".to_string(),
            name: "vendors".to_string(),
            chunks: ChunkSelection::All,
        },
    );

    BuildPlan {
        mode,
        entry,
        output: Output {
            path: root.join(OUTPUT_DIR),
            public_path: "/".to_string(),
            filename: OUTPUT_FILENAME.to_string(),
        },
        optimization: Optimization {
            minimize: !mode.is_development(),
            minimizers: vec![Minimizer::Terser, Minimizer::CssAssets],
            module_ids: ModuleIds::Hashed,
            runtime_chunk: RuntimeChunk::Single,
            split_chunks: SplitChunks { cache_groups },
        },
        module: Module {
            rules: default_rules(),
        },
        plugins: default_steps(project),
    }
}

fn default_rules() -> Vec<Rule> {
    vec![
        Rule::new(r"\.(js|jsx)$", vec![Handler::Babel]).with_exclude("node_modules"),
        Rule::new(
            r"(?i)\.css$",
            vec![
                Handler::ExtractCss {
                    public_path: PublicPath::RelativeToContext,
                },
                Handler::Css { modules: false },
            ],
        ),
        Rule::new(
            r"(?i)\.scss$",
            vec![Handler::Style, Handler::Css { modules: true }, Handler::Sass],
        ),
        Rule::new(r"\.(woff|woff2|eot|ttf|otf)$", vec![Handler::File]),
    ]
}

fn default_steps(project: &Project) -> Vec<Step> {
    let root = &project.root;
    let logo = root.join("assets/svg/logo.svg");

    vec![
        Step::CleanOutput,
        Step::ExtractStyles {
            rewrite_from: "/js/".to_string(),
            rewrite_to: "/css/".to_string(),
        },
        Step::InjectHtml {
            template: root.join("src/index.html"),
            inject: false,
            exclude_assets: vec!["boot.css".to_string()],
        },
        Step::DefineGlobalConstants {
            version: project.version.clone(),
        },
        Step::GenerateManifest(WebManifest {
            name: "Coding with Chrome Suite".to_string(),
            short_name: "Coding with Chrome".to_string(),
            description: "Educational Coding Development Environment".to_string(),
            start_url: "index.html".to_string(),
            display: "standalone".to_string(),
            background_color: "#fff".to_string(),
            theme_color: "red".to_string(),
            icons: vec![
                ManifestIcon {
                    src: logo.clone(),
                    sizes: vec![96, 128, 256, 384],
                },
                ManifestIcon {
                    src: root.join("assets/icons/1024x1024.png"),
                    sizes: vec![192, 512],
                },
            ],
        }),
        Step::GenerateServiceWorker {
            entry: root.join("src/service-worker/service-worker.js"),
            output_name: "service-worker.js".to_string(),
        },
        Step::CopyAssets {
            from: root.join("assets/svg"),
            to: root.join(OUTPUT_DIR).join("assets/svg"),
        },
        Step::GenerateFavicons {
            logo,
            output_path: "assets/favicons".to_string(),
            inject: false,
        },
        Step::CompressImages {
            test: r"(?i)\.(jpe?g|png|gif|svg)$".to_string(),
            png_quality: "95-100".to_string(),
        },
    ]
}

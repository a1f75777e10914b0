//! Test-session descriptors.
//!
//! A [`TestPlan`] is derived from a development [`BuildPlan`]: steps that only
//! matter for a shipped bundle are dropped, a coverage instrumentation rule
//! is appended, and the result is embedded in a fixed session declaration
//! (browsers, framework, file patterns, reporters) for an external runner.
//!
//! The base plan is never modified; the derived plan owns copies.

mod discover;

pub use discover::discover_test_files;

use crate::plan::{make_build_plan, BuildPlan, Enforce, Handler, Mode, Module, Rule, Step, StepKind};
use crate::{Error, Project};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

/// Test files end with this suffix.
pub const TEST_FILE_SUFFIX: &str = "_test.js";

/// Glob selecting test files, relative to the session base path.
pub const TEST_FILE_PATTERN: &str = "src/**/*_test.js";

/// Directory (relative to the project root) whose files are instrumented.
pub const SOURCE_ROOT: &str = "src";

/// Coverage reports are written here, relative to the base path.
pub const COVERAGE_DIR: &str = "coverage";

/// Step kinds that never reach a test session.
pub const EXCLUDED_STEP_KINDS: [StepKind; 4] = [
    StepKind::GenerateFavicons,
    StepKind::InjectHtml,
    StepKind::GenerateManifest,
    StepKind::DefineGlobalConstants,
];

/// Browser engines the session runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Browser {
    Chromium,
    Firefox,
    WebKit,
}

impl Browser {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chromium => "Chromium",
            Self::Firefox => "Firefox",
            Self::WebKit => "WebKit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Jasmine,
}

/// A set of files served to the browsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePattern {
    pub pattern: String,
    pub included: bool,
    pub served: bool,
    pub watched: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preprocessor {
    /// Bundle the test file with the session's [`TestBundle`].
    Bundle,
    Sourcemap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reporter {
    /// Human-readable console output.
    Mocha,
    Coverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Devtool {
    InlineSourceMap,
}

/// The bundling setup applied to each test file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestBundle {
    pub devtool: Devtool,
    pub mode: Mode,
    pub module: Module,
    pub plugins: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatsPreset {
    ErrorsOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleMiddleware {
    pub no_info: bool,
    pub stats: StatsPreset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageFormat {
    Html,
    Lcov,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IstanbulReporter {
    pub combine_browser_reports: bool,
    pub fix_webpack_source_paths: bool,
    pub reports: Vec<CoverageFormat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReporter {
    pub dir: String,
    pub reporters: Vec<CoverageFormat>,
}

impl CoverageReporter {
    /// Per-browser report subdirectory: the browser's reported name,
    /// lowercased, up to the first space, slash or dash.
    #[must_use]
    pub fn subdir(browser: &str) -> String {
        browser
            .to_lowercase()
            .split([' ', '/', '-'])
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// Where reports for `browser` land, relative to the base path.
    #[must_use]
    pub fn dir_for(&self, browser: &str) -> PathBuf {
        Path::new(&self.dir).join(Self::subdir(browser))
    }
}

/// Test-session descriptor consumed by the external runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPlan {
    /// Relative to the directory holding the session descriptor.
    pub base_path: String,
    pub browsers: BTreeSet<Browser>,
    pub auto_watch: bool,
    pub colors: bool,
    pub fail_on_empty_test_suite: bool,
    pub single_run: bool,
    pub frameworks: Vec<Framework>,
    pub files: Vec<FilePattern>,
    pub preprocessors: BTreeMap<String, Vec<Preprocessor>>,
    pub reporters: Vec<Reporter>,
    pub bundle: TestBundle,
    pub bundle_middleware: BundleMiddleware,
    pub coverage_istanbul_reporter: IstanbulReporter,
    pub coverage_reporter: CoverageReporter,
}

impl TestPlan {
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.bundle.module.rules
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.bundle.plugins
    }

    #[must_use]
    pub fn test_file_pattern(&self) -> &str {
        self.files
            .first()
            .map_or(TEST_FILE_PATTERN, |f| f.pattern.as_str())
    }

    #[must_use]
    pub fn coverage_output_dir(&self) -> &str {
        &self.coverage_reporter.dir
    }

    /// The base directory, given the directory the descriptor lives in.
    ///
    /// Resolved lexically, so `..` components are folded without touching
    /// the filesystem.
    #[must_use]
    pub fn resolved_base(&self, config_dir: &Path) -> PathBuf {
        let mut out = PathBuf::new();
        for component in config_dir.join(&self.base_path).components() {
            match component {
                Component::ParentDir => {
                    if !out.pop() {
                        out.push(component);
                    }
                }
                Component::CurDir => {}
                other => out.push(other),
            }
        }
        out
    }

    /// Test files under `root` selected by the session's file patterns.
    pub fn discover_test_files(&self, root: &Path) -> Result<Vec<PathBuf>, Error> {
        discover_test_files(root, &self.files)
    }
}

/// Whether a step of this kind is dropped from test sessions.
#[must_use]
pub fn is_excluded(kind: StepKind) -> bool {
    EXCLUDED_STEP_KINDS.contains(&kind)
}

/// The rule instrumenting project sources for coverage.
///
/// Runs before every other handler so counters land in untransformed
/// source. Dependencies and test files are never instrumented.
#[must_use]
pub fn coverage_rule(root: &Path) -> Rule {
    Rule::new(
        r"\.js$|\.jsx$",
        vec![Handler::IstanbulInstrumenter { es_modules: true }],
    )
    .with_exclude(r"node_modules|_test\.js$")
    .with_include(root.join(SOURCE_ROOT))
    .with_enforce(Enforce::Pre)
}

/// Derive the test-session descriptor from `base`.
///
/// Works for any base plan: steps are filtered by kind wherever they sit.
#[must_use]
pub fn derive_test_plan(base: &BuildPlan, project: &Project) -> TestPlan {
    let plugins: Vec<Step> = base
        .plugins
        .iter()
        .filter(|step| !is_excluded(step.kind()))
        .cloned()
        .collect();

    let mut rules = base.module.rules.clone();
    rules.push(coverage_rule(&project.root));

    tracing::debug!(
        removed = base.plugins.len() - plugins.len(),
        kept = plugins.len(),
        rules = rules.len(),
        "derived test plan"
    );

    let mut preprocessors = BTreeMap::new();
    preprocessors.insert(
        TEST_FILE_PATTERN.to_string(),
        vec![Preprocessor::Bundle, Preprocessor::Sourcemap],
    );

    TestPlan {
        base_path: "../".to_string(),
        browsers: [Browser::Chromium, Browser::Firefox, Browser::WebKit]
            .into_iter()
            .collect(),
        auto_watch: false,
        colors: true,
        fail_on_empty_test_suite: false,
        single_run: true,
        frameworks: vec![Framework::Jasmine],
        files: vec![FilePattern {
            pattern: TEST_FILE_PATTERN.to_string(),
            included: true,
            served: true,
            watched: false,
        }],
        preprocessors,
        reporters: vec![Reporter::Mocha, Reporter::Coverage],
        bundle: TestBundle {
            devtool: Devtool::InlineSourceMap,
            mode: Mode::Development,
            module: Module { rules },
            plugins,
        },
        bundle_middleware: BundleMiddleware {
            no_info: true,
            stats: StatsPreset::ErrorsOnly,
        },
        coverage_istanbul_reporter: IstanbulReporter {
            combine_browser_reports: true,
            fix_webpack_source_paths: true,
            reports: vec![CoverageFormat::Lcov, CoverageFormat::Text, CoverageFormat::Html],
        },
        coverage_reporter: CoverageReporter {
            dir: COVERAGE_DIR.to_string(),
            reporters: vec![CoverageFormat::Html, CoverageFormat::Lcov, CoverageFormat::Text],
        },
    }
}

/// Build the test-session descriptor from a fresh development build plan.
#[must_use]
pub fn make_test_plan(project: &Project) -> TestPlan {
    let base = make_build_plan(Mode::Development, project);
    derive_test_plan(&base, project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::WebManifest;

    fn project() -> Project {
        Project::new("/app", "7.0.1")
    }

    fn coverage_rules(plan: &TestPlan) -> Vec<&Rule> {
        plan.rules()
            .iter()
            .filter(|r| r.handlers.iter().any(Handler::is_coverage_instrumenter))
            .collect()
    }

    #[test]
    fn test_five_steps_remain() {
        let plan = make_test_plan(&project());
        let kinds: Vec<_> = plan.steps().iter().map(Step::kind).collect();
        assert_eq!(
            kinds,
            vec![
                StepKind::CleanOutput,
                StepKind::ExtractStyles,
                StepKind::GenerateServiceWorker,
                StepKind::CopyAssets,
                StepKind::CompressImages,
            ]
        );
    }

    #[test]
    fn test_one_rule_appended() {
        let p = project();
        let base = make_build_plan(Mode::Development, &p);
        let plan = make_test_plan(&p);
        assert_eq!(plan.rules().len(), base.rules().len() + 1);
        assert_eq!(plan.rules().last(), Some(&coverage_rule(&p.root)));
        assert_eq!(coverage_rules(&plan).len(), 1);
    }

    #[test]
    fn test_excluded_kinds_removed_from_any_base() {
        let p = project();
        let mut base = make_build_plan(Mode::Production, &p);
        // Excluded kinds scattered and repeated, plus a standalone exclusion step.
        base.plugins.insert(0, Step::GenerateFavicons {
            logo: PathBuf::from("/app/logo.svg"),
            output_path: "icons".to_string(),
            inject: true,
        });
        base.plugins.push(Step::DefineGlobalConstants {
            version: "0.0.0".to_string(),
        });
        base.plugins.push(Step::ExcludeAssetsFromManifest {
            paths: vec!["boot.css".to_string()],
        });
        base.plugins.push(Step::GenerateManifest(WebManifest {
            name: String::new(),
            short_name: String::new(),
            description: String::new(),
            start_url: String::new(),
            display: String::new(),
            background_color: String::new(),
            theme_color: String::new(),
            icons: vec![],
        }));

        let plan = derive_test_plan(&base, &p);
        for step in plan.steps() {
            assert!(!is_excluded(step.kind()), "{} survived", step.kind());
        }
        assert!(plan
            .steps()
            .iter()
            .any(|s| s.kind() == StepKind::ExcludeAssetsFromManifest));
    }

    #[test]
    fn test_derivation_leaves_base_untouched() {
        let p = project();
        let base = make_build_plan(Mode::Development, &p);
        let before = base.clone();
        let _ = derive_test_plan(&base, &p);
        assert_eq!(base, before);
    }

    #[test]
    fn test_coverage_rule_skips_test_files() {
        let p = project();
        let plan = make_test_plan(&p);
        let compiled = crate::CompiledRules::compile(plan.rules()).unwrap();

        let source = compiled.handlers_for(Path::new("/app/src/blocks/editor.js"));
        assert_eq!(
            source,
            vec![&Handler::IstanbulInstrumenter { es_modules: true }, &Handler::Babel]
        );

        let test = compiled.handlers_for(Path::new("/app/src/blocks/editor_test.js"));
        assert_eq!(test, vec![&Handler::Babel]);

        let dep = compiled.handlers_for(Path::new("/app/src/node_modules/x/index.js"));
        assert!(dep.is_empty());

        let outside = compiled.handlers_for(Path::new("/app/build/tool.js"));
        assert_eq!(outside, vec![&Handler::Babel]);
    }

    #[test]
    fn test_coverage_exclusion_matches_every_test_file() {
        let rule = coverage_rule(Path::new("/app"));
        let exclude = regex_lite::Regex::new(rule.exclude.as_deref().unwrap()).unwrap();
        for name in ["a_test.js", "/app/src/deep/dir/widget_test.js", "_test.js"] {
            assert!(exclude.is_match(name), "{name}");
            assert!(name.ends_with(TEST_FILE_SUFFIX));
        }
        assert!(!exclude.is_match("/app/src/test_helpers.js"));
    }

    #[test]
    fn test_session_block() {
        let plan = make_test_plan(&project());
        assert_eq!(plan.browsers.len(), 3);
        assert_eq!(plan.frameworks, vec![Framework::Jasmine]);
        assert_eq!(plan.test_file_pattern(), TEST_FILE_PATTERN);
        assert_eq!(plan.reporters, vec![Reporter::Mocha, Reporter::Coverage]);
        assert_eq!(plan.coverage_output_dir(), "coverage");
        assert_eq!(plan.bundle.mode, Mode::Development);
        assert_eq!(
            plan.preprocessors[TEST_FILE_PATTERN],
            vec![Preprocessor::Bundle, Preprocessor::Sourcemap]
        );
        assert!(plan.single_run);
        assert!(!plan.auto_watch);
    }

    #[test]
    fn test_coverage_subdir() {
        assert_eq!(CoverageReporter::subdir("Chrome Headless 90.0"), "chrome");
        assert_eq!(CoverageReporter::subdir("Firefox/85"), "firefox");
        assert_eq!(CoverageReporter::subdir("WebKit-Nightly"), "webkit");
        assert_eq!(CoverageReporter::subdir(""), "");

        let plan = make_test_plan(&project());
        assert_eq!(
            plan.coverage_reporter.dir_for("Chromium 90"),
            Path::new("coverage/chromium")
        );
    }

    #[test]
    fn test_resolved_base_is_parent_of_config_dir() {
        let plan = make_test_plan(&project());
        assert_eq!(plan.resolved_base(Path::new("/app/test")), Path::new("/app"));
    }

    #[test]
    fn test_serialized_session() {
        let plan = make_test_plan(&project());
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["browsers"], serde_json::json!(["Chromium", "Firefox", "WebKit"]));
        assert_eq!(json["bundle"]["devtool"], "inline-source-map");
        assert_eq!(json["bundle"]["module"]["rules"][4]["enforce"], "pre");
        assert_eq!(json["bundle_middleware"]["stats"], "errors-only");

        let back: TestPlan = serde_json::from_value(json).unwrap();
        assert_eq!(back, plan);
    }
}

//! Transformation rules and their evaluation.
//!
//! A rule pairs a file condition with an ordered handler chain. For a given
//! file, matching `pre` rules contribute first (in declaration order), then
//! the first matching normal rule, then matching `post` rules. A file no rule
//! matches passes through untouched.

use crate::Error;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Phase a rule runs in relative to normal rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Enforce {
    Pre,
    Post,
}

/// Where an extracted stylesheet resolves its asset URLs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublicPath {
    /// Relative path from the stylesheet's directory back to the build
    /// context. See [`crate::naming::relative_public_path`].
    RelativeToContext,
}

/// A single handler in a rule's chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "loader", rename_all = "kebab-case")]
pub enum Handler {
    /// Transpile modern script syntax.
    Babel,
    /// Pull styles out of the bundle into standalone files.
    ExtractCss { public_path: PublicPath },
    /// Resolve `@import` and `url()`; optionally scope class names.
    Css { modules: bool },
    /// Inject styles at runtime through `<style>` tags.
    Style,
    /// Compile SCSS to CSS.
    Sass,
    /// Emit the file as-is and return its public URL.
    File,
    /// Insert coverage counters into the source.
    IstanbulInstrumenter { es_modules: bool },
}

impl Handler {
    /// Loader name understood by the external bundler.
    #[must_use]
    pub fn loader_name(&self) -> &'static str {
        match self {
            Self::Babel => "babel-loader",
            Self::ExtractCss { .. } => "mini-css-extract-loader",
            Self::Css { .. } => "css-loader",
            Self::Style => "style-loader",
            Self::Sass => "sass-loader",
            Self::File => "file-loader",
            Self::IstanbulInstrumenter { .. } => "istanbul-instrumenter-loader",
        }
    }

    #[must_use]
    pub fn is_coverage_instrumenter(&self) -> bool {
        matches!(self, Self::IstanbulInstrumenter { .. })
    }
}

/// A transformation rule.
///
/// Conditions are regular expressions matched against the full file path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    /// Files this rule applies to.
    pub test: String,
    /// Files excluded even when `test` matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
    /// Only files under this directory are considered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce: Option<Enforce>,
    /// Handler chain, applied in order.
    #[serde(rename = "use")]
    pub handlers: Vec<Handler>,
}

impl Rule {
    /// Create a normal-phase rule.
    #[must_use]
    pub fn new(test: impl Into<String>, handlers: Vec<Handler>) -> Self {
        Self {
            test: test.into(),
            exclude: None,
            include: None,
            enforce: None,
            handlers,
        }
    }

    #[must_use]
    pub fn with_exclude(mut self, exclude: impl Into<String>) -> Self {
        self.exclude = Some(exclude.into());
        self
    }

    #[must_use]
    pub fn with_include(mut self, include: impl Into<PathBuf>) -> Self {
        self.include = Some(include.into());
        self
    }

    #[must_use]
    pub fn with_enforce(mut self, enforce: Enforce) -> Self {
        self.enforce = Some(enforce);
        self
    }
}

struct CompiledRule<'a> {
    rule: &'a Rule,
    test: Regex,
    exclude: Option<Regex>,
}

impl CompiledRule<'_> {
    fn matches(&self, path: &Path, path_str: &str) -> bool {
        if !self.test.is_match(path_str) {
            return false;
        }
        if self.exclude.as_ref().is_some_and(|re| re.is_match(path_str)) {
            return false;
        }
        self.rule
            .include
            .as_ref()
            .map_or(true, |include| path.starts_with(include))
    }
}

/// Rules with their conditions compiled, ready to be evaluated.
pub struct CompiledRules<'a> {
    rules: Vec<CompiledRule<'a>>,
}

impl<'a> CompiledRules<'a> {
    /// Compile every condition in `rules`.
    pub fn compile(rules: &'a [Rule]) -> Result<Self, Error> {
        let rules = rules
            .iter()
            .map(|rule| -> Result<CompiledRule<'a>, Error> {
                Ok(CompiledRule {
                    rule,
                    test: compile_pattern(&rule.test)?,
                    exclude: rule.exclude.as_deref().map(compile_pattern).transpose()?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rules })
    }

    /// Rules whose conditions match `path`, in declaration order.
    #[must_use]
    pub fn matching(&self, path: &Path) -> Vec<&'a Rule> {
        let path_str = path.to_string_lossy();
        self.rules
            .iter()
            .filter(|r| r.matches(path, &path_str))
            .map(|r| r.rule)
            .collect()
    }

    /// The full handler chain applied to `path`.
    ///
    /// Empty when no rule matches.
    #[must_use]
    pub fn handlers_for(&self, path: &Path) -> Vec<&'a Handler> {
        let mut pre = Vec::new();
        let mut normal: Option<&'a [Handler]> = None;
        let mut post = Vec::new();

        for rule in self.matching(path) {
            match rule.enforce {
                Some(Enforce::Pre) => pre.extend(rule.handlers.iter()),
                Some(Enforce::Post) => post.extend(rule.handlers.iter()),
                None => {
                    if normal.is_none() {
                        normal = Some(&rule.handlers);
                    }
                }
            }
        }

        pre.into_iter()
            .chain(normal.unwrap_or_default())
            .chain(post)
            .collect()
    }
}

pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, Error> {
    Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn js_rule() -> Rule {
        Rule::new(r"\.(js|jsx)$", vec![Handler::Babel]).with_exclude("node_modules")
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = vec![
            js_rule(),
            Rule::new(r"\.js$", vec![Handler::File]),
        ];
        let compiled = CompiledRules::compile(&rules).unwrap();

        assert_eq!(
            compiled.handlers_for(Path::new("/app/src/boot.js")),
            vec![&Handler::Babel]
        );
    }

    #[test]
    fn test_excluded_file_falls_through() {
        let rules = vec![
            js_rule(),
            Rule::new(r"\.js$", vec![Handler::File]),
        ];
        let compiled = CompiledRules::compile(&rules).unwrap();

        assert_eq!(
            compiled.handlers_for(Path::new("/app/node_modules/lib/index.js")),
            vec![&Handler::File]
        );
    }

    #[test]
    fn test_unmatched_file_is_identity() {
        let rules = vec![js_rule()];
        let compiled = CompiledRules::compile(&rules).unwrap();

        assert!(compiled.handlers_for(Path::new("/app/README.md")).is_empty());
    }

    #[test]
    fn test_pre_and_post_phases_wrap_normal_chain() {
        let rules = vec![
            Rule::new(r"\.js$", vec![Handler::File]).with_enforce(Enforce::Post),
            js_rule(),
            Rule::new(r"\.js$", vec![Handler::IstanbulInstrumenter { es_modules: true }])
                .with_enforce(Enforce::Pre),
        ];
        let compiled = CompiledRules::compile(&rules).unwrap();

        assert_eq!(
            compiled.handlers_for(Path::new("/app/src/boot.js")),
            vec![
                &Handler::IstanbulInstrumenter { es_modules: true },
                &Handler::Babel,
                &Handler::File,
            ]
        );
    }

    #[test]
    fn test_include_restricts_to_directory() {
        let rules = vec![Rule::new(r"\.js$", vec![Handler::Babel]).with_include("/app/src")];
        let compiled = CompiledRules::compile(&rules).unwrap();

        assert_eq!(compiled.matching(Path::new("/app/src/a/b.js")).len(), 1);
        assert!(compiled.matching(Path::new("/app/test/b.js")).is_empty());
        // Component-wise, not string prefix.
        assert!(compiled.matching(Path::new("/app/srcfoo/b.js")).is_empty());
    }

    #[test]
    fn test_case_insensitive_condition() {
        let rules = vec![Rule::new(r"(?i)\.css$", vec![Handler::Css { modules: false }])];
        let compiled = CompiledRules::compile(&rules).unwrap();

        assert_eq!(compiled.matching(Path::new("/app/BOOT.CSS")).len(), 1);
    }

    #[test]
    fn test_invalid_pattern() {
        let rules = vec![Rule::new(r"\.(js", vec![Handler::Babel])];
        let err = CompiledRules::compile(&rules).err().unwrap();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(js_rule()).unwrap();
        assert_eq!(json["test"], r"\.(js|jsx)$");
        assert_eq!(json["exclude"], "node_modules");
        assert_eq!(json["use"][0]["loader"], "babel");
        assert!(json.get("enforce").is_none());
    }
}

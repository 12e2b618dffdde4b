// Asset pipeline table: ordered (pattern -> stage chain) rules.
// Rules are tried top to bottom and the first match wins.

use crate::core::mode::ModeConfig;
use crate::core::pages::ProjectLayout;
use crate::utils::{Logger, MpaError, Result};
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Binary assets strictly below this size are inlined as data URIs
pub const INLINE_LIMIT_BYTES: u64 = 10_000;

/// Autoprefixer browser targets
pub const PREFIX_BROWSERS: [&str; 3] = ["ie >= 9", "last 2 versions", "> 1%"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Script,
    Stylesheet,
    Image,
    Media,
    Font,
}

impl AssetCategory {
    /// Output folder under `static/` for emitted binary files
    pub fn static_dir(&self) -> Option<&'static str> {
        match self {
            AssetCategory::Image => Some("img"),
            AssetCategory::Media => Some("media"),
            AssetCategory::Font => Some("fonts"),
            AssetCategory::Script | AssetCategory::Stylesheet => None,
        }
    }

    fn probe_extensions(&self) -> &'static [&'static str] {
        match self {
            AssetCategory::Script => &["js"],
            AssetCategory::Stylesheet => &["scss"],
            AssetCategory::Image => &["png", "jpg", "jpeg", "gif", "svg"],
            AssetCategory::Media => &["mp4", "webm", "ogg", "mp3", "wav", "flac", "aac"],
            AssetCategory::Font => &["woff", "woff2", "eot", "ttf", "otf"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageKind {
    /// Blocking pre-stage; a violation aborts the build
    Lint,
    Transpile,
    Sass,
    Postcss,
    Css,
    ExtractCss,
    /// Inline `<style>` injection, fallback for disabled extraction
    Style,
    /// Inline below the size limit, otherwise emit a hashed file
    Url,
}

impl StageKind {
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Lint => "lint",
            StageKind::Transpile => "transpile",
            StageKind::Sass => "sass",
            StageKind::Postcss => "postcss",
            StageKind::Css => "css",
            StageKind::ExtractCss => "extract-css",
            StageKind::Style => "style",
            StageKind::Url => "url",
        }
    }
}

/// Position of a stage relative to the rest of its chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Enforce {
    /// Runs before every normal stage, whatever its declaration position
    Pre,
    #[default]
    Normal,
}

impl Enforce {
    fn is_normal(&self) -> bool {
        *self == Enforce::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStage {
    pub kind: StageKind,
    #[serde(skip_serializing_if = "Enforce::is_normal")]
    pub enforce: Enforce,
    pub options: BTreeMap<String, Value>,
    pub source_map: bool,
    pub enabled: bool,
}

impl ProcessingStage {
    pub fn new(kind: StageKind) -> Self {
        Self {
            kind,
            enforce: Enforce::Normal,
            options: BTreeMap::new(),
            source_map: false,
            enabled: true,
        }
    }

    pub fn with_option(mut self, key: &str, value: Value) -> Self {
        self.options.insert(key.to_string(), value);
        self
    }

    pub fn enforce(mut self, enforce: Enforce) -> Self {
        self.enforce = enforce;
        self
    }

    pub fn with_source_map(mut self, enabled: bool) -> Self {
        self.source_map = enabled;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_lint(&self) -> bool {
        self.kind == StageKind::Lint
    }

    pub fn option_u64(&self, key: &str) -> Option<u64> {
        self.options.get(key).and_then(Value::as_u64)
    }

    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct AssetRule {
    category: AssetCategory,
    pattern: Regex,
    include: Option<PathBuf>,
    stages: Vec<ProcessingStage>,
    fallback: Option<ProcessingStage>,
    probes: Vec<String>,
}

impl AssetRule {
    /// New rule for `category`; probes default to one path per known extension.
    pub fn new(category: AssetCategory, pattern: &str) -> Result<Self> {
        Ok(Self {
            category,
            pattern: Regex::new(pattern)?,
            include: None,
            stages: Vec::new(),
            fallback: None,
            probes: category
                .probe_extensions()
                .iter()
                .map(|ext| format!("probe.{}", ext))
                .collect(),
        })
    }

    /// Restrict the rule to paths under `dir` (relative to the project root)
    pub fn include(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include = Some(dir.into());
        self
    }

    pub fn stage(mut self, stage: ProcessingStage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn fallback(mut self, stage: ProcessingStage) -> Self {
        self.fallback = Some(stage);
        self
    }

    /// Replace the sample paths used for overlap detection
    pub fn probes<I, S>(mut self, probes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.probes = probes.into_iter().map(Into::into).collect();
        self
    }

    pub fn category(&self) -> AssetCategory {
        self.category
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// `path` must already be relative to the project root for `include` to apply.
    pub fn matches(&self, path: &Path) -> bool {
        let normalized = normalize(path);
        if let Some(ref include) = self.include {
            if !Path::new(&normalized).starts_with(include) {
                return false;
            }
        }
        self.pattern.is_match(&normalized)
    }

    /// Stage chain in execution order: `pre` stages first, declaration order otherwise.
    /// The fallback takes the place of the first disabled stage and appears at most once.
    pub fn chain(&self) -> Vec<ProcessingStage> {
        let mut chain = Vec::with_capacity(self.stages.len());
        let mut fallback = self.fallback.as_ref();

        for stage in &self.stages {
            if stage.enabled {
                chain.push(stage.clone());
            } else if let Some(replacement) = fallback.take() {
                chain.push(replacement.clone());
            }
        }

        chain.sort_by_key(|stage| stage.enforce);
        chain
    }

    pub fn to_resolved(&self) -> ResolvedRule {
        ResolvedRule {
            category: self.category,
            test: self.pattern.as_str().to_string(),
            include: self.include.clone(),
            stages: self.chain(),
        }
    }

    fn probe_paths(&self) -> Vec<PathBuf> {
        self.probes
            .iter()
            .map(|probe| match self.include {
                Some(ref include) => include.join(probe),
                None => PathBuf::from(probe),
            })
            .collect()
    }
}

/// Strip a leading `./` and use forward slashes
fn normalize(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    raw.strip_prefix("./").unwrap_or(&raw).to_string()
}

/// Rule with its chain resolved to concrete stage configs, as emitted in the plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRule {
    pub category: AssetCategory,
    pub test: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<PathBuf>,
    pub stages: Vec<ProcessingStage>,
}

#[derive(Debug, Clone, Copy)]
pub enum Resolution<'a> {
    Chain(&'a AssetRule),
    PassThrough,
}

impl<'a> Resolution<'a> {
    pub fn rule(&self) -> Option<&'a AssetRule> {
        match self {
            Resolution::Chain(rule) => Some(rule),
            Resolution::PassThrough => None,
        }
    }

    pub fn stages(&self) -> Vec<ProcessingStage> {
        self.rule().map(AssetRule::chain).unwrap_or_default()
    }
}

/// An earlier rule also matches a path a later rule was written for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOverlap {
    pub earlier: usize,
    pub later: usize,
    pub probe: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AssetTable {
    rules: Vec<AssetRule>,
    overlaps: Vec<RuleOverlap>,
    root: Option<PathBuf>,
}

impl AssetTable {
    /// Precedence is declaration order. Overlapping patterns are recorded and logged.
    pub fn new(rules: Vec<AssetRule>) -> Self {
        let overlaps = detect_overlaps(&rules);
        for overlap in &overlaps {
            Logger::rule_overlap(
                rules[overlap.earlier].pattern(),
                rules[overlap.later].pattern(),
                &overlap.probe.display().to_string(),
            );
        }
        Self {
            rules,
            overlaps,
            root: None,
        }
    }

    /// Like `new`, but patterns must be mutually exclusive.
    pub fn strict(rules: Vec<AssetRule>) -> Result<Self> {
        let overlaps = detect_overlaps(&rules);
        if let Some(first) = overlaps.first() {
            return Err(MpaError::config(format!(
                "asset rule #{} ({}) shadows rule #{} ({}) for {}",
                first.earlier,
                rules[first.earlier].pattern(),
                first.later,
                rules[first.later].pattern(),
                first.probe.display()
            )));
        }
        Ok(Self {
            rules,
            overlaps,
            root: None,
        })
    }

    /// Project root; absolute paths under it are matched relative to it.
    pub fn rooted(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Script, stylesheet, image, media and font rules for the given mode.
    pub fn standard(mode: &ModeConfig, layout: &ProjectLayout) -> Result<Self> {
        let source_map = mode.source_maps;
        let prod = mode.mode.is_prod();

        let script = AssetRule::new(AssetCategory::Script, &format!(r"\.{}$", regex::escape(&layout.script_ext)))?
            .probes([format!("probe.{}", layout.script_ext)])
            .include(layout.src_dir.clone())
            .stage(
                ProcessingStage::new(StageKind::Lint)
                    .enforce(Enforce::Pre)
                    .with_option("formatter", json!("friendly"))
                    .with_source_map(source_map),
            )
            .stage(ProcessingStage::new(StageKind::Transpile).with_source_map(source_map));

        let stylesheet = AssetRule::new(AssetCategory::Stylesheet, r"\.scss$")?
            .stage(ProcessingStage::new(StageKind::Sass).with_source_map(source_map))
            .stage(
                ProcessingStage::new(StageKind::Postcss)
                    .with_option("plugins", json!(["autoprefixer"]))
                    .with_option("browsers", json!(PREFIX_BROWSERS))
                    .with_source_map(source_map),
            )
            .stage(ProcessingStage::new(StageKind::Css).with_source_map(source_map))
            .stage(
                ProcessingStage::new(StageKind::ExtractCss)
                    .with_option("filename", json!("css/[name].[contenthash].css"))
                    .enabled(prod),
            )
            .fallback(ProcessingStage::new(StageKind::Style).with_source_map(source_map));

        let image = binary_rule(AssetCategory::Image, r"\.(png|jpe?g|gif|svg)(\?.*)?$")?;
        let media = binary_rule(AssetCategory::Media, r"\.(mp4|webm|ogg|mp3|wav|flac|aac)(\?.*)?$")?;
        let font = binary_rule(AssetCategory::Font, r"\.(woff2?|eot|ttf|otf)(\?.*)?$")?;

        Self::strict(vec![script, stylesheet, image, media, font])
    }

    pub fn resolve(&self, path: &Path) -> Resolution<'_> {
        let relative = self.relative(path);
        self.rules
            .iter()
            .find(|rule| rule.matches(relative))
            .map(Resolution::Chain)
            .unwrap_or(Resolution::PassThrough)
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        self.root
            .as_deref()
            .and_then(|root| path.strip_prefix(root).ok())
            .unwrap_or(path)
    }

    pub fn rules(&self) -> &[AssetRule] {
        &self.rules
    }

    pub fn overlaps(&self) -> &[RuleOverlap] {
        &self.overlaps
    }

    pub fn resolved_rules(&self) -> Vec<ResolvedRule> {
        self.rules.iter().map(AssetRule::to_resolved).collect()
    }
}

fn binary_rule(category: AssetCategory, pattern: &str) -> Result<AssetRule> {
    let dir = category.static_dir().unwrap_or("assets");
    Ok(AssetRule::new(category, pattern)?.stage(
        ProcessingStage::new(StageKind::Url)
            .with_option("limit", json!(INLINE_LIMIT_BYTES))
            .with_option("name", json!(format!("static/{}/[name].[hash:7].[ext]", dir))),
    ))
}

fn detect_overlaps(rules: &[AssetRule]) -> Vec<RuleOverlap> {
    let mut overlaps = Vec::new();
    for (later, rule) in rules.iter().enumerate() {
        for probe in rule.probe_paths() {
            if let Some(earlier) = rules[..later].iter().position(|r| r.matches(&probe)) {
                overlaps.push(RuleOverlap {
                    earlier,
                    later,
                    probe,
                });
            }
        }
    }
    overlaps
}
